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

use crate::fixtures::{
	self,
	current::{ALICE, BOB},
	legacy::{v11_metadata, v13_metadata},
};
use codec::{Compact, Encode};
use frame_metadata::META_RESERVED;
use metareg::{metareg_core::encoder, Decoder, Definitions, Registry, Value, VersionedDefinitions};

fn registry_with(metadata: &[u8]) -> Registry {
	fixtures::init();
	let mut registry = Registry::new().unwrap();
	registry.set_metadata_bytes(metadata).unwrap();
	registry
}

fn address(who: [u8; 32]) -> Value {
	Value::named_composite(vec![("Id", Value::bytes(who))])
}

#[test]
fn v11_modules_are_numbered_by_position() {
	let registry = registry_with(&v11_metadata().encode());
	let metadata = registry.metadata().unwrap();

	let indexes: Vec<(&str, u8, u8)> =
		metadata.pallets().map(|p| (p.name.as_str(), p.index, p.event_index)).collect();
	assert_eq!(indexes, [("System", 0, 0), ("Timestamp", 1, 3), ("Balances", 2, 1), ("Staking", 3, 2)]);

	let transfer = registry.find_call([2, 0]).unwrap();
	assert_eq!((transfer.pallet.as_str(), transfer.name.as_str()), ("Balances", "transfer"));
	assert_eq!(registry.find_call([1, 0]).unwrap().name, "set");
	assert!(registry.find_call([3, 0]).is_none());

	assert_eq!(registry.find_event([1, 0]).unwrap().name, "Transfer");
	assert_eq!(registry.find_event([2, 0]).unwrap().pallet, "Staking");

	let error = registry.find_error(2, &[1]).unwrap();
	assert_eq!(error.name, "ExistentialDeposit");

	let deposit = registry.decorated().unwrap().constant("Balances", "ExistentialDeposit").unwrap();
	assert_eq!(deposit.decode().unwrap().as_u128(), Some(1_000_000_000));
	assert_eq!(deposit.docs, [" The minimum amount required to keep an account open."]);
}

#[test]
fn v11_extrinsics() {
	fixtures::init();
	let mut decoder = Decoder::new().unwrap();
	decoder.register_version(1062, &v11_metadata().encode()).unwrap();
	let metadata = decoder.metadata(1062).unwrap();

	let set = encoder::encode_call_data(metadata, "Timestamp", "set", &[Value::u64(1_600_000_000_000)]).unwrap();
	let mut expected = vec![1, 0];
	Compact(1_600_000_000_000u64).encode_to(&mut expected);
	assert_eq!(set, expected);

	let transfer = encoder::encode_call_data(metadata, "Balances", "transfer", &[address(BOB.0), Value::u128(5)]).unwrap();
	let mut expected = vec![2, 0, 0];
	expected.extend(BOB.0);
	Compact(5u128).encode_to(&mut expected);
	assert_eq!(transfer, expected);

	let extensions = vec![
		Value::unit(),
		Value::unit(),
		Value::unit(),
		Value::string("Immortal"),
		Value::u32(1),
		Value::unit(),
		Value::u128(0),
	];
	let signature = Value::named_composite(vec![("Sr25519", Value::bytes([7u8; 64]))]);
	let signed =
		encoder::encode_signed_extrinsic(metadata, &address(ALICE.0), &signature, &extensions, &transfer).unwrap();

	let mut expected = vec![0x84, 0];
	expected.extend(ALICE.0);
	expected.push(1);
	expected.extend([7u8; 64]);
	// immortal era, nonce and tip
	expected.extend([0, 4, 0]);
	expected.extend(&transfer);
	assert_eq!(signed, expected.encode());

	let mut block = Compact(2u32).encode();
	block.extend(encoder::encode_unsigned_extrinsic(&set));
	block.extend(&signed);

	let exts = decoder.decode_extrinsics(1062, &block).unwrap();
	assert_eq!(exts.len(), 2);
	assert_eq!(exts[0].call_data.pallet_name, "Timestamp");
	assert_eq!(exts[0].call_data.argument("now").and_then(|v| v.as_u128()), Some(1_600_000_000_000));
	assert!(exts[0].signature.is_none());

	assert_eq!(exts[1].call_data.ty.name(), "transfer");
	assert_eq!(exts[1].call_data.argument("dest").and_then(|v| v.variant_name()), Some("Id"));
	let sig = exts[1].signature.as_ref().unwrap();
	assert_eq!(sig.extensions.len(), 7);
	assert_eq!(sig.extensions[3].0, "CheckMortality");
	assert_eq!(sig.extensions[3].1.variant_name(), Some("Immortal"));
	assert_eq!(sig.extensions[4].1.as_u128(), Some(1));
}

#[test]
fn definitions_follow_the_spec_version() {
	fixtures::init();
	let versioned = VersionedDefinitions::from_json(
		r#"{ "types": [
			{ "minmax": [1000, 1061], "types": { "Balance": "u64" } },
			{ "minmax": [1062, null], "types": {} }
		] }"#,
	)
	.unwrap();
	let mut decoder = Decoder::with_types(Definitions::base().unwrap(), versioned);
	decoder.register_version(1055, &v11_metadata().encode()).unwrap();
	decoder.register_version(1062, &v11_metadata().encode()).unwrap();

	let deposit_type = |spec| {
		let metadata = decoder.metadata(spec).unwrap();
		let balances = metadata.pallet_by_name("Balances").unwrap();
		metadata.types().type_name(balances.constants[0].ty)
	};
	assert_eq!(deposit_type(1055), "u64");
	assert_eq!(deposit_type(1062), "u128");
	assert!(!decoder.has_version(&1070));
}

#[test]
fn v11_events_and_errors() {
	let registry = registry_with(&v11_metadata().encode());
	let decorated = registry.decorated().unwrap();

	let mut events = Compact(2u32).encode();
	// ApplyExtrinsic(0), Balances.Transfer(ALICE, BOB, 25), no topics
	events.extend([0, 0, 0, 0, 0, 1, 0]);
	events.extend(ALICE.0);
	events.extend(BOB.0);
	events.extend(25u128.encode());
	events.push(0);
	// ApplyExtrinsic(1), System.ExtrinsicFailed(Module { index: 2, error: 1 }, DispatchInfo), no topics
	events.extend([0, 1, 0, 0, 0, 0, 1, 3, 2, 1]);
	events.extend(10u64.encode());
	events.extend([0, 0, 0]);

	let records = decorated.decode_events(&events).unwrap();
	assert_eq!(records.len(), 2);

	let transfer = &records[0];
	assert_eq!((transfer.pallet.as_str(), transfer.name.as_str()), ("Balances", "Transfer"));
	let args: Vec<_> = transfer.fields.values().collect();
	assert_eq!(args.len(), 3);
	assert_eq!(args[1].as_bytes(), Some(BOB.0.to_vec()));
	assert_eq!(args[2].as_u128(), Some(25));
	assert!(transfer.topics.is_empty());

	let failed = &records[1];
	assert_eq!(failed.name, "ExtrinsicFailed");
	let dispatch_error = failed.fields.values().next().unwrap();
	let error = decorated.decode_dispatch_error(dispatch_error).unwrap();
	assert_eq!((error.pallet.as_str(), error.name.as_str()), ("Balances", "ExistentialDeposit"));
}

#[test]
fn double_map_storage() {
	let registry = registry_with(&v11_metadata().encode());
	let stakers = registry.decorated().unwrap().storage("Staking", "ErasStakers").unwrap();
	assert_eq!(stakers.key_count(), 2);

	let key = stakers.key(&[Value::u32(10), Value::bytes(ALICE.0)]).unwrap();
	assert_eq!(key.len(), 32 + 8 + 4 + 8 + 32);
	let entry = stakers.decode_key(&key).unwrap();
	let keys = entry.details.map_keys();
	assert_eq!(keys[0].value.as_ref().and_then(|v| v.as_u128()), Some(10));
	assert_eq!(keys[1].value.as_ref().and_then(|v| v.as_bytes()), Some(ALICE.0.to_vec()));

	let default = stakers.decode_value(None).unwrap().unwrap();
	assert_eq!(default.field("total").and_then(|v| v.as_u128()), Some(0));

	let exposure = (Compact(100u128), Compact(60u128), Compact(1u32), ALICE.0, Compact(40u128)).encode();
	let value = stakers.decode_value(Some(&exposure)).unwrap().unwrap();
	assert_eq!(value.field("own").and_then(|v| v.as_u128()), Some(60));
	let others = value.field("others").unwrap();
	let first = match &others.value {
		metareg::ValueDef::Composite(c) => c.values().next().unwrap(),
		_ => panic!("others should be a sequence"),
	};
	assert_eq!(first.field("who").and_then(|v| v.as_bytes()), Some(ALICE.0.to_vec()));
	assert_eq!(first.field("value").and_then(|v| v.as_u128()), Some(40));
}

#[test]
fn v13_nmap_storage_and_module_indexes() {
	let registry = registry_with(&v13_metadata().encode());
	let decorated = registry.decorated().unwrap();

	let transfer = registry.find_call([34, 0]).unwrap();
	assert_eq!(transfer.name, "transfer");
	let encoded = transfer.encode(&[Value::u32(1), address(BOB.0), Value::u128(10)]).unwrap();
	let mut expected = vec![34, 0, 4, 0];
	expected.extend(BOB.0);
	expected.push(40);
	assert_eq!(encoded, expected);

	let approvals = decorated.storage("Assets", "Approvals").unwrap();
	assert_eq!(approvals.key_count(), 3);
	let key = approvals.key(&[Value::u32(7), Value::bytes(ALICE.0), Value::bytes(BOB.0)]).unwrap();
	assert_eq!(key.len(), 32 + 3 * 16 + 4 + 32 + 32);

	let entry = approvals.decode_key(&key).unwrap();
	let keys = entry.details.map_keys();
	assert_eq!(keys.len(), 3);
	assert_eq!(keys[0].value.as_ref().and_then(|v| v.as_u128()), Some(7));
	assert_eq!(keys[2].value.as_ref().and_then(|v| v.as_bytes()), Some(BOB.0.to_vec()));

	assert!(approvals.decode_value(None).unwrap().is_none());
	assert!(approvals.prefix(&[Value::u32(7)]).unwrap().len() < key.len());
}

#[test]
fn bad_metadata_is_rejected() {
	fixtures::init();
	let mut registry = Registry::new().unwrap();
	assert!(registry.set_metadata_bytes(&[0; 5]).is_err());

	// V10 and earlier can no longer be decoded
	let mut old = META_RESERVED.encode();
	old.push(10);
	assert!(registry.set_metadata_bytes(&old).is_err());
	assert!(registry.metadata().is_none());
	assert!(registry.decorated().is_err());
}
