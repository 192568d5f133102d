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

use super::{bits, MAX_DEPTH};
use crate::lookup::{Field, Lookup, PrimitiveKind, TypeDef, TypeId, VariantDef};
use crate::value::{BitSequence, Composite, Primitive, Value, ValueDef};
use codec::{Compact, Encode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeValueError {
	#[error("cannot find type with ID {0}")]
	TypeIdNotFound(u32),
	#[error("type with ID {0} was reserved but never defined")]
	PendingType(u32),
	#[error("expected {expected} for type {ty}, got {got}")]
	WrongShape { expected: &'static str, got: String, ty: u32 },
	#[error("expected {expected} values for type {ty}, got {got}")]
	WrongLength { expected: usize, got: usize, ty: u32 },
	#[error("missing field '{name}' for type {ty}")]
	MissingField { name: String, ty: u32 },
	#[error("no variant named '{name}' in type {ty}")]
	VariantNotFound { name: String, ty: u32 },
	#[error("{value} does not fit into {kind}")]
	NumberOutOfRange { value: String, kind: &'static str },
	#[error("cannot compact encode type {0}")]
	CannotCompactEncode(u32),
	#[error("type {0} cannot be used to store bits")]
	UnsupportedBitStore(u32),
	#[error("invalid hex string '{0}'")]
	InvalidHex(String),
	#[error("values are nested too deeply")]
	DepthLimitExceeded,
}

/// SCALE encode a [`Value`] as the type with the given ID, appending the bytes to `out`.
///
/// The value does not have to mirror the type exactly. Single field structs are
/// transparent, integers are converted between widths when they fit, byte sequences
/// can be given as strings (`0x` prefixed hex is decoded) and enum variants can
/// be given by name alone when they have no fields, or as a single entry named
/// composite like `{ "Some": 1 }`.
pub fn encode_value_by_id<T, Id: Into<TypeId>>(
	value: &Value<T>,
	ty: Id,
	types: &Lookup,
	out: &mut Vec<u8>,
) -> Result<(), EncodeValueError> {
	Encoder { types }.encode(value, ty.into(), out, 0)
}

struct Encoder<'a> {
	types: &'a Lookup,
}

impl<'a> Encoder<'a> {
	fn encode<T>(&self, value: &Value<T>, id: TypeId, out: &mut Vec<u8>, depth: usize) -> Result<(), EncodeValueError> {
		if depth > MAX_DEPTH {
			return Err(EncodeValueError::DepthLimitExceeded);
		}
		let ty = self.types.resolve(id).ok_or(EncodeValueError::TypeIdNotFound(id.id()))?;

		match &ty.def {
			TypeDef::Composite(fields) => self.encode_fields(value, fields, id, out, depth),
			TypeDef::Variant(variants) => self.encode_variant(value, variants, id, out, depth),
			TypeDef::Sequence(inner) => {
				if let Some(bytes) = self.bytes_from_str(value, *inner)? {
					Compact(bytes.len() as u32).encode_to(out);
					out.extend_from_slice(&bytes);
					return Ok(());
				}
				let items = items_of(value, "a sequence", id)?;
				Compact(items.len() as u32).encode_to(out);
				items.into_iter().try_for_each(|item| self.encode(item, *inner, out, depth + 1))
			}
			TypeDef::Array { len, ty: inner } => {
				let len = *len as usize;
				if let Some(bytes) = self.bytes_from_str(value, *inner)? {
					if bytes.len() != len {
						return Err(EncodeValueError::WrongLength { expected: len, got: bytes.len(), ty: id.id() });
					}
					out.extend_from_slice(&bytes);
					return Ok(());
				}
				let items = items_of(value, "an array", id)?;
				if items.len() != len {
					return Err(EncodeValueError::WrongLength { expected: len, got: items.len(), ty: id.id() });
				}
				items.into_iter().try_for_each(|item| self.encode(item, *inner, out, depth + 1))
			}
			TypeDef::Tuple(ids) => {
				if ids.len() == 1 {
					return self.encode_single(value, ids[0], out, depth);
				}
				let items = items_of(value, "a tuple", id)?;
				if items.len() != ids.len() {
					return Err(EncodeValueError::WrongLength { expected: ids.len(), got: items.len(), ty: id.id() });
				}
				items.into_iter().zip(ids).try_for_each(|(item, ty)| self.encode(item, *ty, out, depth + 1))
			}
			TypeDef::Primitive(kind) => encode_primitive(value, *kind, id, out),
			TypeDef::Compact(inner) => self.encode_compact(value, *inner, out),
			TypeDef::BitSequence { store, order } => {
				let width = match self.types.resolve(*store).map(|t| &t.def) {
					Some(TypeDef::Primitive(p)) => bits::store_width(*p),
					_ => None,
				}
				.ok_or(EncodeValueError::UnsupportedBitStore(store.id()))?;
				let bits = bits_of(value, id)?;
				bits::encode_bits(&bits, width, *order, out);
				Ok(())
			}
			TypeDef::Pending => Err(EncodeValueError::PendingType(id.id())),
		}
	}

	// Encode a value as the only field of some wrapper: either the value is itself a
	// one element composite holding the field, or it is the field value directly.
	fn encode_single<T>(
		&self,
		value: &Value<T>,
		field_ty: TypeId,
		out: &mut Vec<u8>,
		depth: usize,
	) -> Result<(), EncodeValueError> {
		if let ValueDef::Composite(c) = &value.value {
			if let (1, Some(inner)) = (c.len(), c.values().next()) {
				let start = out.len();
				match self.encode(inner, field_ty, out, depth + 1) {
					Ok(()) => return Ok(()),
					Err(_) => out.truncate(start),
				}
			}
		}
		self.encode(value, field_ty, out, depth + 1)
	}

	fn encode_fields<T>(
		&self,
		value: &Value<T>,
		fields: &[Field],
		id: TypeId,
		out: &mut Vec<u8>,
		depth: usize,
	) -> Result<(), EncodeValueError> {
		match fields.len() {
			0 => match &value.value {
				ValueDef::Composite(c) if c.is_empty() => Ok(()),
				_ => Err(EncodeValueError::WrongShape { expected: "no values", got: describe(value), ty: id.id() }),
			},
			1 => self.encode_single(value, fields[0].ty, out, depth),
			_ => {
				let ValueDef::Composite(composite) = &value.value else {
					return Err(EncodeValueError::WrongShape {
						expected: "a composite",
						got: describe(value),
						ty: id.id(),
					});
				};
				self.encode_composite(composite, fields, id, out, depth)
			}
		}
	}

	fn encode_composite<T>(
		&self,
		composite: &Composite<T>,
		fields: &[Field],
		id: TypeId,
		out: &mut Vec<u8>,
		depth: usize,
	) -> Result<(), EncodeValueError> {
		if composite.len() != fields.len() {
			return Err(EncodeValueError::WrongLength { expected: fields.len(), got: composite.len(), ty: id.id() });
		}
		let all_named = fields.iter().all(|f| f.name.is_some());
		match composite {
			// Named values are matched to named fields regardless of the order they came in.
			Composite::Named(values) if all_named => {
				for field in fields {
					let name = field.name.as_deref().unwrap_or_default();
					let (_, value) = values
						.iter()
						.find(|(n, _)| n == name)
						.ok_or_else(|| EncodeValueError::MissingField { name: name.to_string(), ty: id.id() })?;
					self.encode(value, field.ty, out, depth + 1)?;
				}
				Ok(())
			}
			_ => composite.values().zip(fields).try_for_each(|(value, field)| self.encode(value, field.ty, out, depth + 1)),
		}
	}

	fn encode_variant<T>(
		&self,
		value: &Value<T>,
		variants: &[VariantDef],
		id: TypeId,
		out: &mut Vec<u8>,
		depth: usize,
	) -> Result<(), EncodeValueError> {
		let find = |name: &str| {
			variants
				.iter()
				.find(|v| v.name == name)
				.ok_or_else(|| EncodeValueError::VariantNotFound { name: name.to_string(), ty: id.id() })
		};

		match &value.value {
			ValueDef::Variant(v) => {
				let variant = find(&v.name)?;
				out.push(variant.index);
				if let (1, 1, Some(inner)) = (variant.fields.len(), v.values.len(), v.values.values().next()) {
					return self.encode_single(inner, variant.fields[0].ty, out, depth);
				}
				self.encode_composite(&v.values, &variant.fields, id, out, depth)
			}
			// `"None"`
			ValueDef::Primitive(Primitive::Str(name)) => {
				let variant = find(name)?;
				if !variant.fields.is_empty() {
					return Err(EncodeValueError::WrongLength { expected: variant.fields.len(), got: 0, ty: id.id() });
				}
				out.push(variant.index);
				Ok(())
			}
			// `null` for an `Option`
			ValueDef::Composite(c) if c.is_empty() && variants.iter().any(|v| v.name == "None") => {
				let variant = find("None")?;
				out.push(variant.index);
				Ok(())
			}
			// `{ "Some": value }`
			ValueDef::Composite(Composite::Named(entries)) if entries.len() == 1 => {
				let (name, inner) = &entries[0];
				let variant = find(name)?;
				out.push(variant.index);
				self.encode_fields(inner, &variant.fields, id, out, depth)
			}
			_ => Err(EncodeValueError::WrongShape { expected: "a variant", got: describe(value), ty: id.id() }),
		}
	}

	fn encode_compact<T>(&self, value: &Value<T>, inner: TypeId, out: &mut Vec<u8>) -> Result<(), EncodeValueError> {
		let mut current = inner;
		for _ in 0..MAX_DEPTH {
			let ty = self.types.resolve(current).ok_or(EncodeValueError::TypeIdNotFound(current.id()))?;
			match &ty.def {
				TypeDef::Primitive(kind) => {
					let n = value.as_u128().ok_or_else(|| EncodeValueError::WrongShape {
						expected: "an unsigned integer",
						got: describe(value),
						ty: current.id(),
					})?;
					return encode_compact_uint(n, *kind, current, out);
				}
				TypeDef::Composite(fields) if fields.len() == 1 => current = fields[0].ty,
				TypeDef::Compact(inner) => current = *inner,
				TypeDef::Tuple(ids) if ids.is_empty() => return Ok(()),
				_ => return Err(EncodeValueError::CannotCompactEncode(current.id())),
			}
		}
		Err(EncodeValueError::DepthLimitExceeded)
	}

	// Strings given for byte sequences: hex if `0x` prefixed, otherwise UTF8 bytes.
	fn bytes_from_str<T>(&self, value: &Value<T>, item_ty: TypeId) -> Result<Option<Vec<u8>>, EncodeValueError> {
		let ValueDef::Primitive(Primitive::Str(s)) = &value.value else {
			return Ok(None);
		};
		match self.types.resolve(item_ty).map(|t| &t.def) {
			Some(TypeDef::Primitive(PrimitiveKind::U8)) => {}
			_ => return Ok(None),
		}
		match s.strip_prefix("0x") {
			Some(hex_str) => hex::decode(hex_str).map(Some).map_err(|_| EncodeValueError::InvalidHex(s.clone())),
			None => Ok(Some(s.as_bytes().to_vec())),
		}
	}
}

fn items_of<'v, T>(value: &'v Value<T>, expected: &'static str, id: TypeId) -> Result<Vec<&'v Value<T>>, EncodeValueError> {
	match &value.value {
		ValueDef::Composite(c) => Ok(c.values().collect()),
		_ => Err(EncodeValueError::WrongShape { expected, got: describe(value), ty: id.id() }),
	}
}

fn bits_of<T>(value: &Value<T>, id: TypeId) -> Result<BitSequence, EncodeValueError> {
	match &value.value {
		ValueDef::BitSequence(bits) => Ok(bits.clone()),
		ValueDef::Composite(c) => c
			.values()
			.map(|v| v.as_bool())
			.collect::<Option<BitSequence>>()
			.ok_or_else(|| EncodeValueError::WrongShape { expected: "a sequence of bools", got: describe(value), ty: id.id() }),
		_ => Err(EncodeValueError::WrongShape { expected: "a bit sequence", got: describe(value), ty: id.id() }),
	}
}

fn encode_compact_uint(n: u128, kind: PrimitiveKind, id: TypeId, out: &mut Vec<u8>) -> Result<(), EncodeValueError> {
	let too_big = || EncodeValueError::NumberOutOfRange { value: n.to_string(), kind: kind.as_str() };
	match kind {
		PrimitiveKind::U8 => Compact(u8::try_from(n).map_err(|_| too_big())?).encode_to(out),
		PrimitiveKind::U16 => Compact(u16::try_from(n).map_err(|_| too_big())?).encode_to(out),
		PrimitiveKind::U32 => Compact(u32::try_from(n).map_err(|_| too_big())?).encode_to(out),
		PrimitiveKind::U64 => Compact(u64::try_from(n).map_err(|_| too_big())?).encode_to(out),
		PrimitiveKind::U128 => Compact(n).encode_to(out),
		_ => return Err(EncodeValueError::CannotCompactEncode(id.id())),
	}
	Ok(())
}

fn encode_primitive<T>(value: &Value<T>, kind: PrimitiveKind, id: TypeId, out: &mut Vec<u8>) -> Result<(), EncodeValueError> {
	let wrong = |expected| EncodeValueError::WrongShape { expected, got: describe(value), ty: id.id() };
	let out_of_range = |n: String| EncodeValueError::NumberOutOfRange { value: n, kind: kind.as_str() };

	match kind {
		PrimitiveKind::Bool => value.as_bool().ok_or_else(|| wrong("a bool"))?.encode_to(out),
		PrimitiveKind::Char => {
			let c = match &value.value {
				ValueDef::Primitive(Primitive::Char(c)) => Some(*c),
				ValueDef::Primitive(Primitive::Str(s)) if s.chars().count() == 1 => s.chars().next(),
				_ => None,
			}
			.ok_or_else(|| wrong("a char"))?;
			(c as u32).encode_to(out)
		}
		PrimitiveKind::Str => value.as_str().ok_or_else(|| wrong("a string"))?.encode_to(out),
		PrimitiveKind::U256 => match &value.value {
			ValueDef::Primitive(Primitive::U256(bytes)) => out.extend_from_slice(bytes),
			_ => {
				let n = unsigned(value).ok_or_else(|| wrong("an unsigned integer"))?;
				let mut bytes = [0u8; 32];
				bytes[..16].copy_from_slice(&n.to_le_bytes());
				out.extend_from_slice(&bytes);
			}
		},
		PrimitiveKind::I256 => match &value.value {
			ValueDef::Primitive(Primitive::I256(bytes)) => out.extend_from_slice(bytes),
			_ => {
				let n = signed(value).ok_or_else(|| wrong("an integer"))?;
				let mut bytes = if n < 0 { [0xffu8; 32] } else { [0u8; 32] };
				bytes[..16].copy_from_slice(&n.to_le_bytes());
				out.extend_from_slice(&bytes);
			}
		},
		PrimitiveKind::U8 | PrimitiveKind::U16 | PrimitiveKind::U32 | PrimitiveKind::U64 | PrimitiveKind::U128 => {
			let n = unsigned(value).ok_or_else(|| wrong("an unsigned integer"))?;
			match kind {
				PrimitiveKind::U8 => u8::try_from(n).map_err(|_| out_of_range(n.to_string()))?.encode_to(out),
				PrimitiveKind::U16 => u16::try_from(n).map_err(|_| out_of_range(n.to_string()))?.encode_to(out),
				PrimitiveKind::U32 => u32::try_from(n).map_err(|_| out_of_range(n.to_string()))?.encode_to(out),
				PrimitiveKind::U64 => u64::try_from(n).map_err(|_| out_of_range(n.to_string()))?.encode_to(out),
				_ => n.encode_to(out),
			}
		}
		PrimitiveKind::I8 | PrimitiveKind::I16 | PrimitiveKind::I32 | PrimitiveKind::I64 | PrimitiveKind::I128 => {
			let n = signed(value).ok_or_else(|| wrong("an integer"))?;
			match kind {
				PrimitiveKind::I8 => i8::try_from(n).map_err(|_| out_of_range(n.to_string()))?.encode_to(out),
				PrimitiveKind::I16 => i16::try_from(n).map_err(|_| out_of_range(n.to_string()))?.encode_to(out),
				PrimitiveKind::I32 => i32::try_from(n).map_err(|_| out_of_range(n.to_string()))?.encode_to(out),
				PrimitiveKind::I64 => i64::try_from(n).map_err(|_| out_of_range(n.to_string()))?.encode_to(out),
				_ => n.encode_to(out),
			}
		}
	}
	Ok(())
}

// `0x` prefixed strings are read as big endian hex numbers.
fn unsigned<T>(value: &Value<T>) -> Option<u128> {
	match &value.value {
		ValueDef::Primitive(Primitive::Str(s)) if s.starts_with("0x") => u128::from_str_radix(&s[2..], 16).ok(),
		_ => value.as_u128(),
	}
}

fn signed<T>(value: &Value<T>) -> Option<i128> {
	match &value.value {
		ValueDef::Primitive(Primitive::Str(s)) if s.starts_with("0x") => i128::from_str_radix(&s[2..], 16).ok(),
		_ => value.as_i128(),
	}
}

// A short description of a value's shape for error messages.
fn describe<T>(value: &Value<T>) -> String {
	match &value.value {
		ValueDef::Composite(Composite::Named(v)) => format!("a named composite of {} values", v.len()),
		ValueDef::Composite(Composite::Unnamed(v)) => format!("an unnamed composite of {} values", v.len()),
		ValueDef::Variant(v) => format!("variant '{}'", v.name),
		ValueDef::BitSequence(_) => "a bit sequence".to_string(),
		ValueDef::Primitive(p) => format!("{:?}", p),
	}
}
