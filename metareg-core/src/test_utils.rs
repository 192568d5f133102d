// Copyright 2019-2021 Parity Technologies (UK) Ltd.
// This file is part of metareg.
//
// metareg is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// metareg is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with metareg.  If not, see <http://www.gnu.org/licenses/>.

//! Helpers for building lookups and metadata in unit tests.

#![allow(dead_code, non_camel_case_types)]

use crate::lookup::{Lookup, TypeId};
use crate::metadata::Metadata;
use codec::{Compact, Encode};
use frame_metadata::v14::{
	ExtrinsicMetadata, PalletCallMetadata, PalletConstantMetadata, PalletErrorMetadata, PalletEventMetadata,
	PalletMetadata, PalletStorageMetadata, SignedExtensionMetadata, StorageEntryMetadata, StorageEntryModifier,
	StorageEntryType, StorageHasher,
};
use frame_metadata::{v14::RuntimeMetadataV14, RuntimeMetadataPrefixed};
use scale_info::{meta_type, PortableRegistry, Registry, TypeInfo};
use std::marker::PhantomData;

/// A lookup holding `T` (and everything it refers to), along with the id of `T`.
pub fn lookup_for<T: TypeInfo + 'static>() -> (Lookup, TypeId) {
	let mut registry = Registry::new();
	let id = registry.register_type(&meta_type::<T>()).id;
	let portable: PortableRegistry = registry.into();
	(Lookup::from_portable(&portable).expect("valid registry"), TypeId::from(id))
}

#[derive(Encode, TypeInfo, Clone, Copy, Default, PartialEq, Debug)]
pub struct AccountId(pub [u8; 32]);

#[derive(Encode, TypeInfo, Clone, Copy, Default, PartialEq, Debug)]
pub struct H256(pub [u8; 32]);

#[allow(dead_code)]
#[derive(Encode, TypeInfo)]
pub enum MultiAddress {
	Id(AccountId),
	Index(#[codec(compact)] u32),
}

#[allow(dead_code)]
#[derive(Encode, TypeInfo)]
pub enum MultiSignature {
	Ed25519([u8; 64]),
	Sr25519([u8; 64]),
}

#[allow(dead_code)]
#[derive(Encode, TypeInfo)]
pub enum SystemCall {
	#[codec(index = 1)]
	remark { remark: Vec<u8> },
}

#[allow(dead_code)]
#[derive(Encode, TypeInfo)]
pub enum BalancesCall {
	transfer {
		dest: AccountId,
		#[codec(compact)]
		value: u128,
	},
}

#[allow(dead_code)]
#[derive(Encode, TypeInfo)]
pub enum RuntimeCall {
	#[codec(index = 0)]
	System(SystemCall),
	#[codec(index = 5)]
	Balances(BalancesCall),
}

#[derive(Encode, TypeInfo)]
pub struct CheckNonce(#[codec(compact)] pub u32);

#[derive(Encode, TypeInfo)]
pub struct ChargeTransactionPayment(#[codec(compact)] pub u128);

#[derive(TypeInfo)]
pub struct UncheckedExtrinsic<Address, Call, Signature, Extra>(PhantomData<(Address, Call, Signature, Extra)>);

#[allow(dead_code)]
#[derive(Encode, TypeInfo)]
pub enum Phase {
	ApplyExtrinsic(u32),
	Finalization,
	Initialization,
}

#[allow(dead_code)]
#[derive(Encode, TypeInfo)]
pub enum SystemEvent {
	ExtrinsicSuccess,
	ExtrinsicFailed { dispatch_error: DispatchError },
}

#[allow(dead_code)]
#[derive(Encode, TypeInfo)]
pub enum DispatchError {
	Other,
	BadOrigin,
	Module(ModuleError),
}

#[derive(Encode, TypeInfo)]
pub struct ModuleError {
	pub index: u8,
	pub error: [u8; 4],
}

#[allow(dead_code)]
#[derive(Encode, TypeInfo)]
pub enum BalancesEvent {
	Transfer { from: AccountId, to: AccountId, amount: u128 },
}

#[allow(dead_code)]
#[derive(Encode, TypeInfo)]
pub enum BalancesError {
	InsufficientBalance,
	ExistentialDeposit,
}

#[allow(dead_code)]
#[derive(Encode, TypeInfo)]
pub enum RuntimeEvent {
	#[codec(index = 0)]
	System(SystemEvent),
	#[codec(index = 5)]
	Balances(BalancesEvent),
}

#[derive(Encode, TypeInfo)]
pub struct EventRecord<E, T> {
	pub phase: Phase,
	pub event: E,
	pub topics: Vec<T>,
}

#[derive(Encode, TypeInfo, Default)]
pub struct AccountData {
	pub free: u128,
	pub reserved: u128,
}

#[derive(Encode, TypeInfo, Default)]
pub struct AccountInfo {
	pub nonce: u32,
	pub data: AccountData,
}

fn system_pallet() -> PalletMetadata {
	PalletMetadata {
		name: "System",
		storage: Some(PalletStorageMetadata {
			prefix: "System",
			entries: vec![
				StorageEntryMetadata {
					name: "Account",
					modifier: StorageEntryModifier::Default,
					ty: StorageEntryType::Map {
						hashers: vec![StorageHasher::Blake2_128Concat],
						key: meta_type::<AccountId>(),
						value: meta_type::<AccountInfo>(),
					},
					default: AccountInfo::default().encode(),
					docs: vec!["The full account information for a particular account ID."],
				},
				StorageEntryMetadata {
					name: "BlockHash",
					modifier: StorageEntryModifier::Default,
					ty: StorageEntryType::Map {
						hashers: vec![StorageHasher::Twox64Concat],
						key: meta_type::<u32>(),
						value: meta_type::<H256>(),
					},
					default: H256::default().encode(),
					docs: vec![],
				},
				StorageEntryMetadata {
					name: "Events",
					modifier: StorageEntryModifier::Default,
					ty: StorageEntryType::Plain(meta_type::<Vec<EventRecord<RuntimeEvent, H256>>>()),
					default: Vec::<u8>::new().encode(),
					docs: vec![],
				},
			],
		}),
		calls: Some(PalletCallMetadata { ty: meta_type::<SystemCall>() }),
		event: Some(PalletEventMetadata { ty: meta_type::<SystemEvent>() }),
		constants: vec![PalletConstantMetadata {
			name: "BlockHashCount",
			ty: meta_type::<u32>(),
			value: 2400u32.encode(),
			docs: vec![],
		}],
		error: None,
		index: 0,
	}
}

fn balances_pallet() -> PalletMetadata {
	PalletMetadata {
		name: "Balances",
		storage: None,
		calls: Some(PalletCallMetadata { ty: meta_type::<BalancesCall>() }),
		event: Some(PalletEventMetadata { ty: meta_type::<BalancesEvent>() }),
		constants: vec![PalletConstantMetadata {
			name: "ExistentialDeposit",
			ty: meta_type::<u128>(),
			value: 500u128.encode(),
			docs: vec![],
		}],
		error: Some(PalletErrorMetadata { ty: meta_type::<BalancesError>() }),
		index: 5,
	}
}

/// V14 metadata for a small runtime with `System` (index 0) and `Balances` (index 5) pallets.
pub fn test_runtime_metadata() -> RuntimeMetadataPrefixed {
	let extrinsic = ExtrinsicMetadata {
		ty: meta_type::<
			UncheckedExtrinsic<MultiAddress, RuntimeCall, MultiSignature, (CheckNonce, ChargeTransactionPayment)>,
		>(),
		version: 4,
		signed_extensions: vec![
			SignedExtensionMetadata {
				identifier: "CheckNonce",
				ty: meta_type::<CheckNonce>(),
				additional_signed: meta_type::<u32>(),
			},
			SignedExtensionMetadata {
				identifier: "ChargeTransactionPayment",
				ty: meta_type::<ChargeTransactionPayment>(),
				additional_signed: meta_type::<()>(),
			},
		],
	};
	RuntimeMetadataV14::new(vec![system_pallet(), balances_pallet()], extrinsic, meta_type::<()>()).into()
}

pub fn test_metadata() -> Metadata {
	let _ = pretty_env_logger::try_init();
	Metadata::from_bytes(&test_runtime_metadata().encode()).expect("valid metadata")
}

/// `Compact<u32>` encoded, as used by length prefixes.
pub fn compact_len(len: usize) -> Vec<u8> {
	Compact(len as u32).encode()
}
