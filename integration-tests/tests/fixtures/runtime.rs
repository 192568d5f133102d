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

//! A small runtime described with real Rust types, so that scale-info can produce the
//! type registry of its metadata and codec can produce test data.

#![allow(dead_code, non_camel_case_types)]

use codec::Encode;
use scale_info::TypeInfo;
use std::marker::PhantomData;

#[derive(Encode, TypeInfo, Clone, Copy, Default, PartialEq, Debug)]
pub struct AccountId32(pub [u8; 32]);

#[derive(Encode, TypeInfo, Clone, Copy, Default, PartialEq, Debug)]
pub struct H256(pub [u8; 32]);

#[derive(Encode, TypeInfo)]
pub enum MultiAddress {
	Id(AccountId32),
	Index(#[codec(compact)] u32),
}

#[derive(Encode, TypeInfo)]
pub enum MultiSignature {
	Ed25519([u8; 64]),
	Sr25519([u8; 64]),
}

#[derive(Encode, TypeInfo, Clone, Copy)]
pub enum DispatchClass {
	Normal,
	Operational,
	Mandatory,
}

#[derive(Encode, TypeInfo, Clone, Copy)]
pub enum Pays {
	Yes,
	No,
}

#[derive(Encode, TypeInfo, Clone, Copy)]
pub struct DispatchInfo {
	pub weight: u64,
	pub class: DispatchClass,
	pub pays_fee: Pays,
}

#[derive(Encode, TypeInfo)]
pub struct ModuleError {
	pub index: u8,
	pub error: [u8; 4],
}

#[derive(Encode, TypeInfo)]
pub enum DispatchError {
	Other,
	CannotLookup,
	BadOrigin,
	Module(ModuleError),
}

pub mod system {
	use super::*;

	#[derive(Encode, TypeInfo)]
	pub enum Call {
		#[codec(index = 0)]
		remark { remark: Vec<u8> },
		#[codec(index = 2)]
		set_heap_pages { pages: u64 },
	}

	#[derive(Encode, TypeInfo)]
	pub enum Event {
		ExtrinsicSuccess { dispatch_info: DispatchInfo },
		ExtrinsicFailed { dispatch_error: DispatchError, dispatch_info: DispatchInfo },
	}

	#[derive(Encode, TypeInfo, Default)]
	pub struct AccountData {
		pub free: u128,
		pub reserved: u128,
		pub frozen: u128,
	}

	#[derive(Encode, TypeInfo, Default)]
	pub struct AccountInfo {
		pub nonce: u32,
		pub consumers: u32,
		pub providers: u32,
		pub data: AccountData,
	}
}

pub mod utility {
	use super::*;

	#[derive(Encode, TypeInfo)]
	pub enum Call {
		batch { calls: Vec<RuntimeCall> },
	}
}

pub mod balances {
	use super::*;

	#[derive(Encode, TypeInfo)]
	pub enum Call {
		transfer {
			dest: MultiAddress,
			#[codec(compact)]
			value: u128,
		},
		#[codec(index = 3)]
		transfer_keep_alive {
			dest: MultiAddress,
			#[codec(compact)]
			value: u128,
		},
	}

	#[derive(Encode, TypeInfo)]
	pub enum Event {
		Transfer { from: AccountId32, to: AccountId32, amount: u128 },
		Deposit { who: AccountId32, amount: u128 },
	}

	#[derive(Encode, TypeInfo)]
	pub enum Error {
		VestingBalance,
		LiquidityRestrictions,
		InsufficientBalance,
		ExistentialDeposit,
	}
}

pub mod staking {
	use super::*;

	#[derive(Encode, TypeInfo, Default)]
	pub struct Exposure {
		#[codec(compact)]
		pub total: u128,
		#[codec(compact)]
		pub own: u128,
	}
}

#[derive(Encode, TypeInfo)]
pub enum RuntimeCall {
	#[codec(index = 0)]
	System(system::Call),
	#[codec(index = 1)]
	Utility(utility::Call),
	#[codec(index = 5)]
	Balances(balances::Call),
}

#[derive(Encode, TypeInfo)]
pub enum RuntimeEvent {
	#[codec(index = 0)]
	System(system::Event),
	#[codec(index = 5)]
	Balances(balances::Event),
}

#[derive(Encode, TypeInfo)]
pub enum RuntimeError {
	#[codec(index = 5)]
	Balances(balances::Error),
}

#[derive(Encode, TypeInfo)]
pub enum Phase {
	ApplyExtrinsic(u32),
	Finalization,
	Initialization,
}

#[derive(Encode, TypeInfo)]
pub struct EventRecord<E, T> {
	pub phase: Phase,
	pub event: E,
	pub topics: Vec<T>,
}

#[derive(Encode, TypeInfo)]
pub struct CheckSpecVersion;

#[derive(Encode, TypeInfo)]
pub struct CheckNonce(#[codec(compact)] pub u32);

#[derive(Encode, TypeInfo)]
pub struct CheckGenesis;

#[derive(Encode, TypeInfo)]
pub struct ChargeTransactionPayment(#[codec(compact)] pub u128);

pub type SignedExtra = (CheckSpecVersion, CheckNonce, CheckGenesis, ChargeTransactionPayment);

#[derive(TypeInfo)]
pub struct UncheckedExtrinsic<Address, Call, Signature, Extra>(PhantomData<(Address, Call, Signature, Extra)>);

#[derive(Encode, TypeInfo)]
pub struct RuntimeVersion {
	pub spec_name: String,
	pub spec_version: u32,
	pub transaction_version: u32,
}
