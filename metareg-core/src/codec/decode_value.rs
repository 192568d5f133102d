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
use crate::lookup::{Field, Lookup, PrimitiveKind, TypeDef, TypeId};
use crate::value::{Composite, Primitive, Value, ValueDef, Variant};
use codec::{Compact, Decode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeValueError {
	#[error("{0}")]
	CodecError(#[from] codec::Error),
	#[error("cannot find type with ID {0}")]
	TypeIdNotFound(u32),
	#[error("type with ID {0} was reserved but never defined")]
	PendingType(u32),
	#[error("variant index {index} not found in type {ty}")]
	VariantNotFound { index: u8, ty: u32 },
	#[error("{0} is not a valid unicode scalar value")]
	InvalidChar(u32),
	#[error("cannot decode a compact encoded value into type {0}")]
	CannotDecodeCompactIntoType(u32),
	#[error("type {0} cannot be used to store bits")]
	UnsupportedBitStore(u32),
	#[error("values are nested too deeply")]
	DepthLimitExceeded,
}

/// Decode data according to the type ID provided. The provided data will be moved forwards as needed.
pub fn decode_value_by_id<Id: Into<TypeId>>(
	data: &mut &[u8],
	ty: Id,
	types: &Lookup,
) -> Result<Value<TypeId>, DecodeValueError> {
	decode_type(data, ty.into(), types, 0)
}

fn decode_type(data: &mut &[u8], id: TypeId, types: &Lookup, depth: usize) -> Result<Value<TypeId>, DecodeValueError> {
	if depth > MAX_DEPTH {
		return Err(DecodeValueError::DepthLimitExceeded);
	}
	let ty = types.resolve(id).ok_or(DecodeValueError::TypeIdNotFound(id.id()))?;

	let value = match &ty.def {
		TypeDef::Composite(fields) => ValueDef::Composite(decode_fields(data, fields, types, depth)?),
		TypeDef::Variant(variants) => {
			let index = u8::decode(data)?;
			let variant = variants
				.iter()
				.find(|v| v.index == index)
				.ok_or(DecodeValueError::VariantNotFound { index, ty: id.id() })?;
			let values = decode_fields(data, &variant.fields, types, depth)?;
			ValueDef::Variant(Variant { name: variant.name.clone(), values })
		}
		TypeDef::Sequence(inner) => {
			let len = <Compact<u32>>::decode(data)?.0 as usize;
			ValueDef::Composite(decode_items(data, *inner, len, types, depth)?)
		}
		TypeDef::Array { len, ty } => ValueDef::Composite(decode_items(data, *ty, *len as usize, types, depth)?),
		TypeDef::Tuple(ids) => {
			let values =
				ids.iter().map(|id| decode_type(data, *id, types, depth + 1)).collect::<Result<Vec<_>, _>>()?;
			ValueDef::Composite(Composite::Unnamed(values))
		}
		TypeDef::Primitive(p) => ValueDef::Primitive(decode_primitive(data, *p)?),
		TypeDef::Compact(inner) => {
			let mut value = decode_compact(data, *inner, types)?;
			value.context = id;
			return Ok(value);
		}
		TypeDef::BitSequence { store, order } => {
			let width = match types.resolve(*store).map(|t| &t.def) {
				Some(TypeDef::Primitive(p)) => bits::store_width(*p),
				_ => None,
			}
			.ok_or(DecodeValueError::UnsupportedBitStore(store.id()))?;
			ValueDef::BitSequence(bits::decode_bits(data, width, *order)?)
		}
		TypeDef::Pending => return Err(DecodeValueError::PendingType(id.id())),
	};

	Ok(Value::with_context(value, id))
}

fn decode_fields(
	data: &mut &[u8],
	fields: &[Field],
	types: &Lookup,
	depth: usize,
) -> Result<Composite<TypeId>, DecodeValueError> {
	let all_named = !fields.is_empty() && fields.iter().all(|f| f.name.is_some());
	if all_named {
		let values = fields
			.iter()
			.map(|f| Ok((f.name.clone().unwrap_or_default(), decode_type(data, f.ty, types, depth + 1)?)))
			.collect::<Result<Vec<_>, DecodeValueError>>()?;
		Ok(Composite::Named(values))
	} else {
		let values =
			fields.iter().map(|f| decode_type(data, f.ty, types, depth + 1)).collect::<Result<Vec<_>, _>>()?;
		Ok(Composite::Unnamed(values))
	}
}

fn decode_items(
	data: &mut &[u8],
	ty: TypeId,
	len: usize,
	types: &Lookup,
	depth: usize,
) -> Result<Composite<TypeId>, DecodeValueError> {
	// Don't trust the length for the allocation; every item needs at least a byte (almost).
	let mut values = Vec::with_capacity(len.min(data.len()));
	for _ in 0..len {
		values.push(decode_type(data, ty, types, depth + 1)?);
	}
	Ok(Composite::Unnamed(values))
}

fn decode_primitive(data: &mut &[u8], kind: PrimitiveKind) -> Result<Primitive, DecodeValueError> {
	let primitive = match kind {
		PrimitiveKind::Bool => Primitive::Bool(bool::decode(data)?),
		PrimitiveKind::Char => {
			let n = u32::decode(data)?;
			Primitive::Char(char::from_u32(n).ok_or(DecodeValueError::InvalidChar(n))?)
		}
		PrimitiveKind::Str => Primitive::Str(String::decode(data)?),
		PrimitiveKind::U8 => Primitive::U8(u8::decode(data)?),
		PrimitiveKind::U16 => Primitive::U16(u16::decode(data)?),
		PrimitiveKind::U32 => Primitive::U32(u32::decode(data)?),
		PrimitiveKind::U64 => Primitive::U64(u64::decode(data)?),
		PrimitiveKind::U128 => Primitive::U128(u128::decode(data)?),
		PrimitiveKind::U256 => Primitive::U256(<[u8; 32]>::decode(data)?),
		PrimitiveKind::I8 => Primitive::I8(i8::decode(data)?),
		PrimitiveKind::I16 => Primitive::I16(i16::decode(data)?),
		PrimitiveKind::I32 => Primitive::I32(i32::decode(data)?),
		PrimitiveKind::I64 => Primitive::I64(i64::decode(data)?),
		PrimitiveKind::I128 => Primitive::I128(i128::decode(data)?),
		PrimitiveKind::I256 => Primitive::I256(<[u8; 32]>::decode(data)?),
	};
	Ok(primitive)
}

// A compact value is an unsigned integer, possibly wrapped in any number of
// single field structs. The wrappers are preserved in the output.
fn decode_compact(data: &mut &[u8], inner: TypeId, types: &Lookup) -> Result<Value<TypeId>, DecodeValueError> {
	let mut wrappers: Vec<(TypeId, Option<String>)> = Vec::new();
	let mut current = inner;
	let mut steps = 0;
	let kind = loop {
		steps += 1;
		if steps > MAX_DEPTH {
			return Err(DecodeValueError::DepthLimitExceeded);
		}
		let ty = types.resolve(current).ok_or(DecodeValueError::TypeIdNotFound(current.id()))?;
		match &ty.def {
			TypeDef::Primitive(kind) => break *kind,
			TypeDef::Composite(fields) if fields.len() == 1 => {
				wrappers.push((current, fields[0].name.clone()));
				current = fields[0].ty;
			}
			TypeDef::Compact(inner) => current = *inner,
			// Compact<()> encodes to nothing at all.
			TypeDef::Tuple(ids) if ids.is_empty() => {
				return Ok(Value::with_context(ValueDef::Composite(Composite::Unnamed(Vec::new())), current))
			}
			_ => return Err(DecodeValueError::CannotDecodeCompactIntoType(current.id())),
		}
	};

	let primitive = match kind {
		PrimitiveKind::U8 => Primitive::U8(<Compact<u8>>::decode(data)?.0),
		PrimitiveKind::U16 => Primitive::U16(<Compact<u16>>::decode(data)?.0),
		PrimitiveKind::U32 => Primitive::U32(<Compact<u32>>::decode(data)?.0),
		PrimitiveKind::U64 => Primitive::U64(<Compact<u64>>::decode(data)?.0),
		PrimitiveKind::U128 => Primitive::U128(<Compact<u128>>::decode(data)?.0),
		_ => return Err(DecodeValueError::CannotDecodeCompactIntoType(current.id())),
	};

	let mut value = Value::with_context(ValueDef::Primitive(primitive), current);
	for (id, name) in wrappers.into_iter().rev() {
		let composite = match name {
			Some(name) => Composite::Named(vec![(name, value)]),
			None => Composite::Unnamed(vec![value]),
		};
		value = Value::with_context(ValueDef::Composite(composite), id);
	}
	Ok(value)
}
