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

//! Metadata of runtimes that predate V14, which only name their types.

use codec::Encode;
use frame_metadata::{
	decode_different::DecodeDifferent, v11, v13, RuntimeMetadata, RuntimeMetadataPrefixed, META_RESERVED,
};

fn d<B: 'static, O: 'static>(o: O) -> DecodeDifferent<B, O> {
	DecodeDifferent::Decoded(o)
}

fn s<B: 'static>(name: &str) -> DecodeDifferent<B, String> {
	d(name.to_string())
}

fn strings<B: 'static>(names: &[&str]) -> DecodeDifferent<B, Vec<String>> {
	d(names.iter().map(|n| n.to_string()).collect())
}

mod v11_items {
	use super::*;
	use frame_metadata::v11::*;

	pub fn call(name: &str, args: &[(&str, &str)]) -> FunctionMetadata {
		FunctionMetadata {
			name: s(name),
			arguments: d(args.iter().map(|(name, ty)| FunctionArgumentMetadata { name: s(name), ty: s(ty) }).collect()),
			documentation: strings(&[]),
		}
	}

	pub fn event(name: &str, args: &[&str]) -> EventMetadata {
		EventMetadata { name: s(name), arguments: strings(args), documentation: strings(&[]) }
	}

	pub fn error(name: &str) -> ErrorMetadata {
		ErrorMetadata { name: s(name), documentation: strings(&[]) }
	}

	pub fn entry(name: &str, ty: StorageEntryType, default: Vec<u8>) -> StorageEntryMetadata {
		StorageEntryMetadata {
			name: s(name),
			modifier: StorageEntryModifier::Default,
			ty,
			default: d(default),
			documentation: strings(&[]),
		}
	}
}

/// A kusama-like V11 runtime. V11 modules carry no index, so the call indexes are System 0,
/// Timestamp 1, Balances 2 (Staking has no calls and comes after), and the event indexes
/// System 0, Balances 1, Staking 2.
pub fn v11_metadata() -> RuntimeMetadataPrefixed {
	use frame_metadata::v11::*;
	use v11_items::*;

	let system = ModuleMetadata {
		name: s("System"),
		storage: Some(d(StorageMetadata {
			prefix: s("System"),
			entries: d(vec![
				entry(
					"Account",
					StorageEntryType::Map {
						hasher: StorageHasher::Blake2_128Concat,
						key: s("T::AccountId"),
						value: s("AccountInfo<T::Index, T::AccountData>"),
						unused: false,
					},
					vec![0; 4 + 4 + 4 + 64],
				),
				entry("Number", StorageEntryType::Plain(s("T::BlockNumber")), vec![0; 4]),
				entry("Events", StorageEntryType::Plain(s("Vec<EventRecord<T::Event, T::Hash>>")), vec![0]),
			]),
		})),
		calls: Some(d(vec![call("remark", &[("_remark", "Vec<u8>")])])),
		event: Some(d(vec![
			event("ExtrinsicSuccess", &["DispatchInfo"]),
			event("ExtrinsicFailed", &["DispatchError", "DispatchInfo"]),
		])),
		constants: d(vec![]),
		errors: d(vec![error("InvalidSpecName"), error("SpecVersionNotAllowedToDecrease")]),
	};

	let timestamp = ModuleMetadata {
		name: s("Timestamp"),
		storage: None,
		calls: Some(d(vec![call("set", &[("now", "Compact<T::Moment>")])])),
		event: None,
		constants: d(vec![]),
		errors: d(vec![]),
	};

	let balances = ModuleMetadata {
		name: s("Balances"),
		storage: None,
		calls: Some(d(vec![call(
			"transfer",
			&[("dest", "<T::Lookup as StaticLookup>::Source"), ("value", "Compact<T::Balance>")],
		)])),
		event: Some(d(vec![event("Transfer", &["AccountId", "AccountId", "Balance"])])),
		constants: d(vec![ModuleConstantMetadata {
			name: s("ExistentialDeposit"),
			ty: s("T::Balance"),
			value: d(1_000_000_000u128.encode()),
			documentation: strings(&[" The minimum amount required to keep an account open."]),
		}]),
		errors: d(vec![error("InsufficientBalance"), error("ExistentialDeposit")]),
	};

	let staking = ModuleMetadata {
		name: s("Staking"),
		storage: Some(d(StorageMetadata {
			prefix: s("Staking"),
			entries: d(vec![entry(
				"ErasStakers",
				StorageEntryType::DoubleMap {
					hasher: StorageHasher::Twox64Concat,
					key1: s("EraIndex"),
					key2: s("T::AccountId"),
					value: s("Exposure<T::AccountId, BalanceOf<T>>"),
					key2_hasher: StorageHasher::Twox64Concat,
				},
				vec![0, 0, 0],
			)]),
		})),
		calls: None,
		event: Some(d(vec![event("Reward", &["Balance", "Balance"])])),
		constants: d(vec![]),
		errors: d(vec![]),
	};

	let extrinsic = ExtrinsicMetadata {
		version: 4,
		signed_extensions: ["CheckSpecVersion", "CheckTxVersion", "CheckGenesis", "CheckMortality", "CheckNonce", "CheckWeight", "ChargeTransactionPayment"]
			.into_iter()
			.map(s)
			.collect(),
	};

	RuntimeMetadataPrefixed(
		META_RESERVED,
		RuntimeMetadata::V11(RuntimeMetadataV11 { modules: d(vec![system, timestamp, balances, staking]), extrinsic }),
	)
}

/// A V13 runtime with an `NMap` storage entry.
pub fn v13_metadata() -> RuntimeMetadataPrefixed {
	use v13::*;

	let assets = ModuleMetadata {
		name: s("Assets"),
		storage: Some(d(StorageMetadata {
			prefix: s("Assets"),
			entries: d(vec![StorageEntryMetadata {
				name: s("Approvals"),
				modifier: StorageEntryModifier::Optional,
				ty: StorageEntryType::NMap {
					keys: strings(&["u32", "T::AccountId", "T::AccountId"]),
					hashers: d(vec![
						StorageHasher::Blake2_128Concat,
						StorageHasher::Blake2_128Concat,
						StorageHasher::Blake2_128Concat,
					]),
					value: s("Balance"),
				},
				default: d(vec![0]),
				documentation: strings(&[]),
			}]),
		})),
		calls: Some(d(vec![FunctionMetadata {
			name: s("transfer"),
			arguments: d(vec![
				FunctionArgumentMetadata { name: s("id"), ty: s("Compact<u32>") },
				FunctionArgumentMetadata { name: s("target"), ty: s("<T::Lookup as StaticLookup>::Source") },
				FunctionArgumentMetadata { name: s("amount"), ty: s("Compact<T::Balance>") },
			]),
			documentation: strings(&[]),
		}])),
		event: None,
		constants: d(vec![]),
		errors: d(vec![]),
		index: 34,
	};

	let extrinsic = ExtrinsicMetadata { version: 4, signed_extensions: vec![s("CheckNonce")] };

	RuntimeMetadataPrefixed(META_RESERVED, RuntimeMetadata::V13(RuntimeMetadataV13 { modules: d(vec![assets]), extrinsic }))
}
