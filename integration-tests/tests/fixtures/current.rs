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

//! V14 and V15 metadata for the runtime in [`super::runtime`]. Pallets: System (0),
//! Utility (1), Balances (5) and Staking (7).

use super::runtime::*;
use codec::Encode;
use frame_metadata::{
	v14::{self, RuntimeMetadataV14},
	v15::{self, RuntimeMetadataV15},
	RuntimeMetadataPrefixed,
};
use scale_info::meta_type;
use std::collections::BTreeMap;

pub const ALICE: AccountId32 = AccountId32([1; 32]);
pub const BOB: AccountId32 = AccountId32([2; 32]);

fn entry(
	name: &'static str,
	modifier: v14::StorageEntryModifier,
	ty: v14::StorageEntryType,
	default: Vec<u8>,
) -> v14::StorageEntryMetadata {
	v14::StorageEntryMetadata { name, modifier, ty, default, docs: vec![] }
}

fn pallets() -> Vec<v14::PalletMetadata> {
	use v14::{StorageEntryModifier as Modifier, StorageEntryType, StorageHasher::*};

	let system = v14::PalletMetadata {
		name: "System",
		storage: Some(v14::PalletStorageMetadata {
			prefix: "System",
			entries: vec![
				entry(
					"Account",
					Modifier::Default,
					StorageEntryType::Map {
						hashers: vec![Blake2_128Concat],
						key: meta_type::<AccountId32>(),
						value: meta_type::<system::AccountInfo>(),
					},
					system::AccountInfo::default().encode(),
				),
				entry("Number", Modifier::Default, StorageEntryType::Plain(meta_type::<u32>()), 0u32.encode()),
				entry(
					"Events",
					Modifier::Default,
					StorageEntryType::Plain(meta_type::<Vec<EventRecord<RuntimeEvent, H256>>>()),
					Vec::<u8>::new().encode(),
				),
			],
		}),
		calls: Some(v14::PalletCallMetadata { ty: meta_type::<system::Call>() }),
		event: Some(v14::PalletEventMetadata { ty: meta_type::<system::Event>() }),
		constants: vec![v14::PalletConstantMetadata {
			name: "BlockHashCount",
			ty: meta_type::<u32>(),
			value: 4096u32.encode(),
			docs: vec![" Maximum number of block number to block hash mappings to keep."],
		}],
		error: None,
		index: 0,
	};

	let utility = v14::PalletMetadata {
		name: "Utility",
		storage: None,
		calls: Some(v14::PalletCallMetadata { ty: meta_type::<utility::Call>() }),
		event: None,
		constants: vec![],
		error: None,
		index: 1,
	};

	let balances = v14::PalletMetadata {
		name: "Balances",
		storage: None,
		calls: Some(v14::PalletCallMetadata { ty: meta_type::<balances::Call>() }),
		event: Some(v14::PalletEventMetadata { ty: meta_type::<balances::Event>() }),
		constants: vec![v14::PalletConstantMetadata {
			name: "ExistentialDeposit",
			ty: meta_type::<u128>(),
			value: 10_000_000_000u128.encode(),
			docs: vec![],
		}],
		error: Some(v14::PalletErrorMetadata { ty: meta_type::<balances::Error>() }),
		index: 5,
	};

	let staking = v14::PalletMetadata {
		name: "Staking",
		storage: Some(v14::PalletStorageMetadata {
			prefix: "Staking",
			entries: vec![
				entry(
					"Bonded",
					Modifier::Optional,
					StorageEntryType::Map {
						hashers: vec![Twox64Concat],
						key: meta_type::<AccountId32>(),
						value: meta_type::<AccountId32>(),
					},
					vec![0],
				),
				entry(
					"ErasStakers",
					Modifier::Default,
					StorageEntryType::Map {
						hashers: vec![Twox64Concat, Twox64Concat],
						key: meta_type::<(u32, AccountId32)>(),
						value: meta_type::<staking::Exposure>(),
					},
					staking::Exposure::default().encode(),
				),
			],
		}),
		calls: None,
		event: None,
		constants: vec![],
		error: None,
		index: 7,
	};

	vec![system, utility, balances, staking]
}

pub fn v14_metadata() -> RuntimeMetadataPrefixed {
	let extrinsic = v14::ExtrinsicMetadata {
		ty: meta_type::<UncheckedExtrinsic<MultiAddress, RuntimeCall, MultiSignature, SignedExtra>>(),
		version: 4,
		signed_extensions: vec![
			v14::SignedExtensionMetadata {
				identifier: "CheckSpecVersion",
				ty: meta_type::<CheckSpecVersion>(),
				additional_signed: meta_type::<u32>(),
			},
			v14::SignedExtensionMetadata {
				identifier: "CheckNonce",
				ty: meta_type::<CheckNonce>(),
				additional_signed: meta_type::<()>(),
			},
			v14::SignedExtensionMetadata {
				identifier: "CheckGenesis",
				ty: meta_type::<CheckGenesis>(),
				additional_signed: meta_type::<H256>(),
			},
			v14::SignedExtensionMetadata {
				identifier: "ChargeTransactionPayment",
				ty: meta_type::<ChargeTransactionPayment>(),
				additional_signed: meta_type::<()>(),
			},
		],
	};
	RuntimeMetadataV14::new(pallets(), extrinsic, meta_type::<()>()).into()
}

pub fn v15_metadata() -> RuntimeMetadataPrefixed {
	let pallets = pallets()
		.into_iter()
		.map(|p| v15::PalletMetadata {
			name: p.name,
			storage: p.storage,
			calls: p.calls,
			event: p.event,
			constants: p.constants,
			error: p.error,
			index: p.index,
			docs: vec![],
		})
		.collect();

	let extrinsic = v15::ExtrinsicMetadata {
		version: 4,
		address_ty: meta_type::<MultiAddress>(),
		call_ty: meta_type::<RuntimeCall>(),
		signature_ty: meta_type::<MultiSignature>(),
		extra_ty: meta_type::<SignedExtra>(),
		signed_extensions: vec![
			v15::SignedExtensionMetadata {
				identifier: "CheckSpecVersion",
				ty: meta_type::<CheckSpecVersion>(),
				additional_signed: meta_type::<u32>(),
			},
			v15::SignedExtensionMetadata {
				identifier: "CheckNonce",
				ty: meta_type::<CheckNonce>(),
				additional_signed: meta_type::<()>(),
			},
			v15::SignedExtensionMetadata {
				identifier: "CheckGenesis",
				ty: meta_type::<CheckGenesis>(),
				additional_signed: meta_type::<H256>(),
			},
			v15::SignedExtensionMetadata {
				identifier: "ChargeTransactionPayment",
				ty: meta_type::<ChargeTransactionPayment>(),
				additional_signed: meta_type::<()>(),
			},
		],
	};

	let apis = vec![
		v15::RuntimeApiMetadata {
			name: "Core",
			methods: vec![v15::RuntimeApiMethodMetadata {
				name: "version",
				inputs: vec![],
				output: meta_type::<RuntimeVersion>(),
				docs: vec![" Returns the version of the runtime."],
			}],
			docs: vec![],
		},
		v15::RuntimeApiMetadata {
			name: "AccountNonceApi",
			methods: vec![v15::RuntimeApiMethodMetadata {
				name: "account_nonce",
				inputs: vec![v15::RuntimeApiMethodParamMetadata { name: "account", ty: meta_type::<AccountId32>() }],
				output: meta_type::<u32>(),
				docs: vec![],
			}],
			docs: vec![],
		},
		v15::RuntimeApiMetadata {
			name: "Metadata",
			methods: vec![v15::RuntimeApiMethodMetadata {
				name: "metadata_at_version",
				inputs: vec![v15::RuntimeApiMethodParamMetadata { name: "version", ty: meta_type::<u32>() }],
				output: meta_type::<Option<Vec<u8>>>(),
				docs: vec![],
			}],
			docs: vec![],
		},
	];

	let outer_enums = v15::OuterEnums {
		call_enum_ty: meta_type::<RuntimeCall>(),
		event_enum_ty: meta_type::<RuntimeEvent>(),
		error_enum_ty: meta_type::<RuntimeError>(),
	};
	let custom = v15::CustomMetadata { map: BTreeMap::new() };

	RuntimeMetadataV15::new(pallets, extrinsic, meta_type::<()>(), apis, outer_enums, custom).into()
}
