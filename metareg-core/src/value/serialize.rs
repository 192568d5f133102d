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

use super::{Composite, Primitive, Value, ValueDef, Variant};
use serde::{
	ser::{SerializeMap, SerializeSeq},
	Serialize,
};

// The context is deliberately left out; values serialize to plain JSON-like data.
impl<T> Serialize for Value<T> {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		match &self.value {
			ValueDef::Composite(val) => val.serialize(serializer),
			ValueDef::Variant(val) => val.serialize(serializer),
			ValueDef::BitSequence(val) => {
				let mut seq = serializer.serialize_seq(Some(val.len()))?;
				for bit in val.iter() {
					seq.serialize_element(&*bit)?;
				}
				seq.end()
			}
			ValueDef::Primitive(val) => val.serialize(serializer),
		}
	}
}

impl<T> Serialize for Composite<T> {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		match self {
			Composite::Named(vals) => {
				let mut map = serializer.serialize_map(Some(vals.len()))?;
				for (key, val) in vals {
					map.serialize_entry(key, val)?;
				}
				map.end()
			}
			Composite::Unnamed(vals) => {
				let mut seq = serializer.serialize_seq(Some(vals.len()))?;
				for val in vals {
					seq.serialize_element(val)?;
				}
				seq.end()
			}
		}
	}
}

impl Serialize for Primitive {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		match self {
			Primitive::Bool(v) => v.serialize(serializer),
			Primitive::Char(v) => v.serialize(serializer),
			Primitive::Str(v) => v.serialize(serializer),
			Primitive::U8(v) => v.serialize(serializer),
			Primitive::U16(v) => v.serialize(serializer),
			Primitive::U32(v) => v.serialize(serializer),
			Primitive::U64(v) => v.serialize(serializer),
			Primitive::U128(v) => v.serialize(serializer),
			Primitive::I8(v) => v.serialize(serializer),
			Primitive::I16(v) => v.serialize(serializer),
			Primitive::I32(v) => v.serialize(serializer),
			Primitive::I64(v) => v.serialize(serializer),
			Primitive::I128(v) => v.serialize(serializer),
			// Big endian hex reads like the number it is.
			Primitive::U256(v) | Primitive::I256(v) => {
				let mut be = *v;
				be.reverse();
				serializer.serialize_str(&format!("0x{}", hex::encode(be)))
			}
		}
	}
}

impl<T> Serialize for Variant<T> {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		// Runtime variants have no static names to hand to serde's enum support, so
		// `{ "Name": values }` it is. Fieldless variants are just the name.
		if self.values.is_empty() {
			return serializer.serialize_str(&self.name);
		}
		let mut map = serializer.serialize_map(Some(1))?;
		match &self.values {
			Composite::Unnamed(vals) if vals.len() == 1 => map.serialize_entry(&self.name, &vals[0])?,
			values => map.serialize_entry(&self.name, values)?,
		}
		map.end()
	}
}

#[cfg(test)]
mod test {

	use super::*;
	use crate::value::BitSequence;
	use serde_json::json;

	fn assert_value(value: Value, expected: serde_json::Value) {
		let val = serde_json::to_value(&value).expect("can serialize to serde_json::Value");
		assert_eq!(val, expected);
	}

	#[test]
	fn serialize_primitives() {
		assert_value(Value::u8(1), json!(1));
		assert_value(Value::u64(1), json!(1));
		assert_value(Value::bool(false), json!(false));
		assert_value(Value::string("hi"), json!("hi"));

		let mut n = [0u8; 32];
		n[0] = 0x10;
		n[1] = 0x01;
		assert_value(
			Value::new(ValueDef::Primitive(Primitive::U256(n))),
			json!("0x0000000000000000000000000000000000000000000000000000000000000110"),
		);
	}

	#[test]
	fn serialize_composites_and_bits() {
		assert_value(
			Value::named_composite(vec![("a", Value::bool(true)), ("b", Value::unit())]),
			json!({ "a": true, "b": [] }),
		);

		let mut bits = BitSequence::new();
		bits.push(true);
		bits.push(false);
		assert_value(Value::bit_sequence(bits), json!([true, false]));
	}

	#[test]
	fn serialize_variants() {
		assert_value(Value::variant("None", Composite::Unnamed(vec![])), json!("None"));
		assert_value(Value::variant("Some", Composite::Unnamed(vec![Value::u32(5)])), json!({ "Some": 5 }));
		assert_value(
			Value::variant(
				"Transfer",
				Composite::Named(vec![("to".to_string(), Value::u8(1)), ("amount".to_string(), Value::u8(2))]),
			),
			json!({ "Transfer": { "to": 1, "amount": 2 } }),
		);
	}
}
