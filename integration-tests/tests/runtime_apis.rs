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
	current::{v15_metadata, ALICE},
	runtime::RuntimeVersion,
};
use codec::Encode;
use metareg::{metareg_core::encoder::EncodeError, Error, Registry, Value};

fn registry() -> Registry {
	fixtures::init();
	let mut registry = Registry::new().unwrap();
	registry.set_metadata_bytes(&v15_metadata().encode()).unwrap();
	registry
}

#[test]
fn v15_carries_extrinsic_types_and_outer_enums() {
	let registry = registry();
	let metadata = registry.metadata().unwrap();
	assert_eq!(metadata.version(), 15);

	let extrinsic = metadata.extrinsic();
	assert_eq!(extrinsic.version, 4);
	assert_eq!(registry.type_name(extrinsic.address_ty.unwrap()), "MultiAddress");
	assert_eq!(extrinsic.signed_extensions.len(), 4);

	let outer = metadata.outer_enums();
	assert_eq!(registry.type_name(outer.call.unwrap()), "RuntimeCall");
	assert_eq!(registry.type_name(outer.event.unwrap()), "RuntimeEvent");
	assert_eq!(registry.type_name(outer.error.unwrap()), "RuntimeError");

	assert_eq!(registry.find_call([5, 0]).unwrap().name, "transfer");
}

#[test]
fn runtime_calls() {
	let registry = registry();
	let decorated = registry.decorated().unwrap();
	assert_eq!(decorated.runtime_calls().len(), 3);

	let metadata_at = decorated.runtime_call("Metadata", "metadata_at_version").unwrap();
	assert_eq!(metadata_at.method_name(), "Metadata_metadata_at_version");
	assert_eq!(metadata_at.encode_args(&[Value::u32(15)]).unwrap(), 15u32.encode());
	let output = metadata_at.decode_output(&Some(vec![1u8, 2]).encode()).unwrap();
	assert_eq!(output.variant_name(), Some("Some"));
	assert!(matches!(
		metadata_at.encode_args::<()>(&[]),
		Err(Error::Encode(EncodeError::WrongNumberOfArguments { expected: 1, got: 0, .. }))
	));

	let nonce = decorated.runtime_call("AccountNonceApi", "account_nonce").unwrap();
	assert_eq!(nonce.encode_args(&[Value::bytes(ALICE.0)]).unwrap(), ALICE.encode());
	assert_eq!(nonce.decode_output(&7u32.encode()).unwrap().as_u128(), Some(7));

	let version = decorated.runtime_call("Core", "version").unwrap();
	assert!(!version.docs.is_empty());
	let bytes = RuntimeVersion { spec_name: "test".into(), spec_version: 9430, transaction_version: 24 }.encode();
	let output = version.decode_output(&bytes).unwrap();
	assert_eq!(output.field("spec_name").and_then(|v| v.as_str()), Some("test"));
	assert_eq!(output.field("spec_version").and_then(|v| v.as_u128()), Some(9430));

	assert!(decorated.runtime_call("Core", "missing").is_none());
}
