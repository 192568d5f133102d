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

/*!
This module exposes the [`Value`] type and related subtypes, which are used as the runtime
representations of SCALE encoded data (much like `serde_json::Value` is a runtime representation
of JSON data).

There is no dedicated "null", "option" or "map" value: null is an empty unnamed composite,
options and results are variants (`None`/`Some`, `Ok`/`Err`) and maps are sequences of
2-tuples, which is exactly how they are described by the type information.
*/

mod json;
mod serialize;

use bitvec::{order::Lsb0, vec::BitVec};
use std::convert::From;
use std::fmt::Debug;

pub use json::JsonValueError;

/// [`Value`] holds a representation of some value that has been decoded, as well as some arbitrary context.
///
/// Values produced by the decoder carry the [`crate::TypeId`] they were decoded with as context.
/// Values built by hand to be encoded usually carry `()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Value<T = ()> {
	/// The shape and associated values for this Value
	pub value: ValueDef<T>,
	/// Some additional arbitrary context that can be associated with a value.
	pub context: T,
}

impl Value<()> {
	/// Create a new value without any context.
	pub fn new(value: ValueDef<()>) -> Value<()> {
		Value { value, context: () }
	}
	pub fn bool(b: bool) -> Value<()> {
		Value::new(ValueDef::Primitive(Primitive::Bool(b)))
	}
	pub fn char(c: char) -> Value<()> {
		Value::new(ValueDef::Primitive(Primitive::Char(c)))
	}
	pub fn string<S: Into<String>>(s: S) -> Value<()> {
		Value::new(ValueDef::Primitive(Primitive::Str(s.into())))
	}
	pub fn u8(n: u8) -> Value<()> {
		Value::new(ValueDef::Primitive(Primitive::U8(n)))
	}
	pub fn u16(n: u16) -> Value<()> {
		Value::new(ValueDef::Primitive(Primitive::U16(n)))
	}
	pub fn u32(n: u32) -> Value<()> {
		Value::new(ValueDef::Primitive(Primitive::U32(n)))
	}
	pub fn u64(n: u64) -> Value<()> {
		Value::new(ValueDef::Primitive(Primitive::U64(n)))
	}
	pub fn u128(n: u128) -> Value<()> {
		Value::new(ValueDef::Primitive(Primitive::U128(n)))
	}
	pub fn i64(n: i64) -> Value<()> {
		Value::new(ValueDef::Primitive(Primitive::I64(n)))
	}
	pub fn i128(n: i128) -> Value<()> {
		Value::new(ValueDef::Primitive(Primitive::I128(n)))
	}
	/// A sequence of `u8` values.
	pub fn bytes<B: AsRef<[u8]>>(bytes: B) -> Value<()> {
		Value::unnamed_composite(bytes.as_ref().iter().map(|b| Value::u8(*b)).collect())
	}
	/// The empty tuple, used for "null".
	pub fn unit() -> Value<()> {
		Value::unnamed_composite(Vec::new())
	}
	pub fn unnamed_composite(values: Vec<Value<()>>) -> Value<()> {
		Value::new(ValueDef::Composite(Composite::Unnamed(values)))
	}
	pub fn named_composite<S: Into<String>>(values: Vec<(S, Value<()>)>) -> Value<()> {
		Value::new(ValueDef::Composite(Composite::Named(values.into_iter().map(|(k, v)| (k.into(), v)).collect())))
	}
	pub fn variant<S: Into<String>>(name: S, values: Composite<()>) -> Value<()> {
		Value::new(ValueDef::Variant(Variant { name: name.into(), values }))
	}
	pub fn bit_sequence(bits: BitSequence) -> Value<()> {
		Value::new(ValueDef::BitSequence(bits))
	}
}

impl<T> Value<T> {
	/// Create a new value with some associated context.
	pub fn with_context(value: ValueDef<T>, context: T) -> Value<T> {
		Value { value, context }
	}

	/// Remove the context.
	pub fn without_context(self) -> Value<()> {
		self.map_context(|_| ())
	}

	/// Swap the context of this value (and every nested value) for something else.
	pub fn map_context<U, F: Fn(T) -> U + Clone>(self, f: F) -> Value<U> {
		Value { value: self.value.map_context(f.clone()), context: f(self.context) }
	}

	/// The unsigned integer held by this value, if it is one (or a non-negative signed integer).
	/// Single element composites are looked through, so that newtype wrappers work too.
	pub fn as_u128(&self) -> Option<u128> {
		match &self.value {
			ValueDef::Primitive(p) => p.as_u128(),
			ValueDef::Composite(c) if c.len() == 1 => c.values().next()?.as_u128(),
			_ => None,
		}
	}

	pub fn as_i128(&self) -> Option<i128> {
		match &self.value {
			ValueDef::Primitive(p) => p.as_i128(),
			ValueDef::Composite(c) if c.len() == 1 => c.values().next()?.as_i128(),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match &self.value {
			ValueDef::Primitive(Primitive::Bool(b)) => Some(*b),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match &self.value {
			ValueDef::Primitive(Primitive::Str(s)) => Some(s),
			_ => None,
		}
	}

	/// If this is a composite of `u8` values (or a newtype around one), return the bytes.
	pub fn as_bytes(&self) -> Option<Vec<u8>> {
		let ValueDef::Composite(c) = &self.value else {
			return None;
		};
		let bytes: Option<Vec<u8>> = c
			.values()
			.map(|v| match &v.value {
				ValueDef::Primitive(Primitive::U8(b)) => Some(*b),
				_ => None,
			})
			.collect();
		match bytes {
			Some(bytes) if !bytes.is_empty() || c.len() == 0 => Some(bytes),
			_ if c.len() == 1 => c.values().next()?.as_bytes(),
			_ => None,
		}
	}

	/// The named field of a composite or variant value.
	pub fn field(&self, name: &str) -> Option<&Value<T>> {
		let values = match &self.value {
			ValueDef::Composite(c) => c,
			ValueDef::Variant(v) => &v.values,
			_ => return None,
		};
		match values {
			Composite::Named(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
			Composite::Unnamed(_) => None,
		}
	}

	/// The name of the variant, if this value is one.
	pub fn variant_name(&self) -> Option<&str> {
		match &self.value {
			ValueDef::Variant(v) => Some(&v.name),
			_ => None,
		}
	}
}

/// The underlying shape of a given value.
#[derive(Clone, PartialEq)]
pub enum ValueDef<T> {
	/// A named or unnamed struct-like, array-like or tuple-like set of values.
	Composite(Composite<T>),
	/// An enum variant.
	Variant(Variant<T>),
	/// A sequence of bits (which is more compactly encoded using [`bitvec`])
	BitSequence(BitSequence),
	/// Any of the primitive values we can have.
	Primitive(Primitive),
}

impl<T> ValueDef<T> {
	fn map_context<U, F: Fn(T) -> U + Clone>(self, f: F) -> ValueDef<U> {
		match self {
			ValueDef::Composite(val) => ValueDef::Composite(val.map_context(f)),
			ValueDef::Variant(val) => ValueDef::Variant(Variant { name: val.name, values: val.values.map_context(f) }),
			ValueDef::BitSequence(val) => ValueDef::BitSequence(val),
			ValueDef::Primitive(val) => ValueDef::Primitive(val),
		}
	}
}

impl<T: Debug> Debug for ValueDef<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Composite(val) => Debug::fmt(val, f),
			Self::Variant(val) => Debug::fmt(val, f),
			Self::Primitive(val) => Debug::fmt(val, f),
			Self::BitSequence(val) => Debug::fmt(val, f),
		}
	}
}

/// A named or unnamed struct-like, array-like or tuple-like set of values.
/// This is used to represent a range of composite values on their own, or
/// as values for a specific [`Variant`].
#[derive(Clone, PartialEq)]
pub enum Composite<T> {
	/// Eg `{ foo: 2, bar: false }`
	Named(Vec<(String, Value<T>)>),
	/// Eg `(2, false)`
	Unnamed(Vec<Value<T>>),
}

impl<T> Composite<T> {
	/// Return the number of values stored in this composite type.
	pub fn len(&self) -> usize {
		match self {
			Composite::Named(values) => values.len(),
			Composite::Unnamed(values) => values.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Iterate over the values, ignoring any names.
	pub fn values(&self) -> Box<dyn Iterator<Item = &Value<T>> + '_> {
		match self {
			Composite::Named(values) => Box::new(values.iter().map(|(_, v)| v)),
			Composite::Unnamed(values) => Box::new(values.iter()),
		}
	}

	/// Drop the names and hand back the values in order.
	pub fn into_values(self) -> Vec<Value<T>> {
		match self {
			Composite::Named(values) => values.into_iter().map(|(_, v)| v).collect(),
			Composite::Unnamed(values) => values,
		}
	}

	/// Remove the context.
	pub fn without_context(self) -> Composite<()> {
		self.map_context(|_| ())
	}

	fn map_context<U, F: Fn(T) -> U + Clone>(self, f: F) -> Composite<U> {
		match self {
			Composite::Named(values) => {
				Composite::Named(values.into_iter().map(|(k, v)| (k, v.map_context(f.clone()))).collect())
			}
			Composite::Unnamed(values) => {
				Composite::Unnamed(values.into_iter().map(|v| v.map_context(f.clone())).collect())
			}
		}
	}
}

impl<T: Debug> Debug for Composite<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Composite::Named(fields) => {
				let mut struc = f.debug_struct("");
				for (name, val) in fields {
					struc.field(name, val);
				}
				struc.finish()
			}
			Composite::Unnamed(fields) => {
				let mut struc = f.debug_tuple("");
				for val in fields {
					struc.field(val);
				}
				struc.finish()
			}
		}
	}
}

impl<T> From<Composite<T>> for ValueDef<T> {
	fn from(val: Composite<T>) -> Self {
		ValueDef::Composite(val)
	}
}

/// This represents the value of a specific variant from an enum, and contains
/// the name of the variant, and the named/unnamed values associated with it.
#[derive(Clone, PartialEq)]
pub struct Variant<T> {
	/// The name of the variant.
	pub name: String,
	/// Values for each of the named or unnamed fields associated with this variant.
	pub values: Composite<T>,
}

impl<T: Debug> Debug for Variant<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.name)?;
		f.write_str(" ")?;
		Debug::fmt(&self.values, f)
	}
}

impl<T> From<Variant<T>> for ValueDef<T> {
	fn from(val: Variant<T>) -> Self {
		ValueDef::Variant(val)
	}
}

/// A "primitive" value (this includes strings). 256 bit integers are kept as
/// their little endian bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
	Bool(bool),
	Char(char),
	Str(String),
	U8(u8),
	U16(u16),
	U32(u32),
	U64(u64),
	U128(u128),
	U256([u8; 32]),
	I8(i8),
	I16(i16),
	I32(i32),
	I64(i64),
	I128(i128),
	I256([u8; 32]),
}

impl Primitive {
	/// Any integer that fits into a `u128`. Decimal strings are parsed too.
	pub fn as_u128(&self) -> Option<u128> {
		match self {
			Primitive::U8(n) => Some(*n as u128),
			Primitive::U16(n) => Some(*n as u128),
			Primitive::U32(n) => Some(*n as u128),
			Primitive::U64(n) => Some(*n as u128),
			Primitive::U128(n) => Some(*n),
			Primitive::U256(bytes) | Primitive::I256(bytes) => {
				if bytes[16..].iter().any(|b| *b != 0) {
					return None;
				}
				let mut low = [0u8; 16];
				low.copy_from_slice(&bytes[..16]);
				Some(u128::from_le_bytes(low))
			}
			Primitive::Str(s) => s.parse().ok(),
			_ => self.as_i128().and_then(|n| u128::try_from(n).ok()),
		}
	}

	/// Any integer that fits into an `i128`. Decimal strings are parsed too.
	pub fn as_i128(&self) -> Option<i128> {
		match self {
			Primitive::I8(n) => Some(*n as i128),
			Primitive::I16(n) => Some(*n as i128),
			Primitive::I32(n) => Some(*n as i128),
			Primitive::I64(n) => Some(*n as i128),
			Primitive::I128(n) => Some(*n),
			Primitive::Str(s) => s.parse().ok(),
			Primitive::U8(_)
			| Primitive::U16(_)
			| Primitive::U32(_)
			| Primitive::U64(_)
			| Primitive::U128(_)
			| Primitive::U256(_) => self.as_u128().and_then(|n| i128::try_from(n).ok()),
			Primitive::I256(bytes) => {
				let negative = bytes[31] & 0x80 != 0;
				let fill = if negative { 0xff } else { 0 };
				if bytes[16..].iter().any(|b| *b != fill) {
					return None;
				}
				let mut low = [0u8; 16];
				low.copy_from_slice(&bytes[..16]);
				let n = i128::from_le_bytes(low);
				// the sign of the low half has to agree with the sign of the whole
				(n.is_negative() == negative).then_some(n)
			}
			Primitive::Bool(_) | Primitive::Char(_) => None,
		}
	}
}

impl<T> From<Primitive> for ValueDef<T> {
	fn from(val: Primitive) -> Self {
		ValueDef::Primitive(val)
	}
}

/// A sequence of bits.
pub type BitSequence = BitVec<u8, Lsb0>;
