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

use super::{BitOrder, Field, Lookup, LookupError, LookupType, PrimitiveKind, TypeDef, TypeId, TypeParam, VariantDef};
use scale_info::{form::PortableForm, PortableRegistry, TypeDefPrimitive};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("bit order type {0} is neither Lsb0 nor Msb0")]
pub struct BitOrderNotFound(pub u32);

pub(super) fn from_portable(registry: &PortableRegistry) -> Result<Lookup, LookupError> {
	let mut types = Vec::with_capacity(registry.types.len());
	for (position, portable) in registry.types.iter().enumerate() {
		if portable.id as usize != position {
			return Err(LookupError::NonSequentialId { position, found: portable.id });
		}
		let ty = &portable.ty;
		let params = ty
			.type_params
			.iter()
			.map(|p| TypeParam { name: p.name.clone(), ty: p.ty.as_ref().map(|t| TypeId(t.id)) })
			.collect();

		types.push(LookupType {
			id: TypeId(portable.id),
			path: ty.path.segments.clone(),
			params,
			def: match collection_item(registry, ty) {
				Some(item) => TypeDef::Sequence(item),
				None => convert_def(registry, &ty.type_def)?,
			},
			docs: ty.docs.clone(),
		});
	}
	log::trace!("converted {} portable types", types.len());
	Ok(Lookup { types })
}

/// `BTreeMap` and `BTreeSet` are described as a composite wrapping a sequence, but encode as
/// the bare sequence.
fn collection_item(registry: &PortableRegistry, ty: &scale_info::Type<PortableForm>) -> Option<TypeId> {
	if !matches!(ty.path.segments.as_slice(), [name] if name == "BTreeMap" || name == "BTreeSet") {
		return None;
	}
	let scale_info::TypeDef::Composite(c) = &ty.type_def else { return None };
	let [field] = c.fields.as_slice() else { return None };
	match &registry.resolve(field.ty.id)?.type_def {
		scale_info::TypeDef::Sequence(s) => Some(TypeId(s.type_param.id)),
		_ => None,
	}
}

fn convert_def(registry: &PortableRegistry, def: &scale_info::TypeDef<PortableForm>) -> Result<TypeDef, LookupError> {
	use scale_info::TypeDef as S;
	let def = match def {
		S::Composite(c) => TypeDef::Composite(c.fields.iter().map(convert_field).collect()),
		S::Variant(v) => TypeDef::Variant(
			v.variants
				.iter()
				.map(|var| VariantDef {
					name: var.name.clone(),
					index: var.index,
					fields: var.fields.iter().map(convert_field).collect(),
					docs: var.docs.clone(),
				})
				.collect(),
		),
		S::Sequence(s) => TypeDef::Sequence(TypeId(s.type_param.id)),
		S::Array(a) => TypeDef::Array { len: a.len, ty: TypeId(a.type_param.id) },
		S::Tuple(t) => TypeDef::Tuple(t.fields.iter().map(|f| TypeId(f.id)).collect()),
		S::Primitive(p) => TypeDef::Primitive(convert_primitive(p)),
		S::Compact(c) => TypeDef::Compact(TypeId(c.type_param.id)),
		S::BitSequence(b) => {
			let order_id = b.bit_order_type.id;
			let order = registry
				.resolve(order_id)
				.and_then(|ty| ty.path.segments.last())
				.and_then(|name| match name.as_str() {
					"Lsb0" => Some(BitOrder::Lsb0),
					"Msb0" => Some(BitOrder::Msb0),
					_ => None,
				})
				.ok_or(BitOrderNotFound(order_id))?;
			TypeDef::BitSequence { store: TypeId(b.bit_store_type.id), order }
		}
	};
	Ok(def)
}

fn convert_field(f: &scale_info::Field<PortableForm>) -> Field {
	Field { name: f.name.clone(), ty: TypeId(f.ty.id), type_name: f.type_name.clone(), docs: f.docs.clone() }
}

fn convert_primitive(p: &TypeDefPrimitive) -> PrimitiveKind {
	match p {
		TypeDefPrimitive::Bool => PrimitiveKind::Bool,
		TypeDefPrimitive::Char => PrimitiveKind::Char,
		TypeDefPrimitive::Str => PrimitiveKind::Str,
		TypeDefPrimitive::U8 => PrimitiveKind::U8,
		TypeDefPrimitive::U16 => PrimitiveKind::U16,
		TypeDefPrimitive::U32 => PrimitiveKind::U32,
		TypeDefPrimitive::U64 => PrimitiveKind::U64,
		TypeDefPrimitive::U128 => PrimitiveKind::U128,
		TypeDefPrimitive::U256 => PrimitiveKind::U256,
		TypeDefPrimitive::I8 => PrimitiveKind::I8,
		TypeDefPrimitive::I16 => PrimitiveKind::I16,
		TypeDefPrimitive::I32 => PrimitiveKind::I32,
		TypeDefPrimitive::I64 => PrimitiveKind::I64,
		TypeDefPrimitive::I128 => PrimitiveKind::I128,
		TypeDefPrimitive::I256 => PrimitiveKind::I256,
	}
}
