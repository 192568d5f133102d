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
The [`Lookup`] maps the numeric type ids that metadata refers to onto structural
type definitions. It starts life either as a conversion of the `scale-info`
registry shipped with V14+ metadata, or empty (for legacy metadata, where types are
only known by name and get added one by one as the names are resolved).

Ids are handed out in order and never reused, so any [`TypeId`] obtained from a
lookup stays valid for as long as that lookup (or a clone of it that has only
been appended to) is around.
*/

mod display;
mod portable;

use serde::Serialize;
use std::fmt;

pub use portable::BitOrderNotFound;

/// The id of a type in a [`Lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TypeId(u32);

impl TypeId {
	pub fn from_u32(id: u32) -> TypeId {
		TypeId(id)
	}
	pub fn id(&self) -> u32 {
		self.0
	}
}

impl From<u32> for TypeId {
	fn from(id: u32) -> Self {
		TypeId(id)
	}
}

impl From<&TypeId> for TypeId {
	fn from(id: &TypeId) -> Self {
		*id
	}
}

impl fmt::Display for TypeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupError {
	#[error("type {0} does not exist in the lookup")]
	TypeNotFound(u32),
	#[error("type {0} has already been defined")]
	AlreadyDefined(u32),
	#[error("portable registry ids must be sequential; found id {found} at position {position}")]
	NonSequentialId { position: usize, found: u32 },
	#[error(transparent)]
	BitOrder(#[from] BitOrderNotFound),
}

/// A single entry in the [`Lookup`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupType {
	pub id: TypeId,
	/// Path segments, eg `["sp_runtime", "multiaddress", "MultiAddress"]`. Empty for
	/// anonymous types such as tuples and sequences.
	pub path: Vec<String>,
	pub params: Vec<TypeParam>,
	pub def: TypeDef,
	pub docs: Vec<String>,
}

impl LookupType {
	/// The last segment of the path, if there is one.
	pub fn name(&self) -> Option<&str> {
		self.path.last().map(|s| s.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeParam {
	pub name: String,
	pub ty: Option<TypeId>,
}

/// The shape of a type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeDef {
	/// A struct (named fields) or tuple struct (unnamed fields).
	Composite(Vec<Field>),
	/// An enum.
	Variant(Vec<VariantDef>),
	/// A length prefixed sequence of some type.
	Sequence(TypeId),
	/// A fixed length array.
	Array { len: u32, ty: TypeId },
	Tuple(Vec<TypeId>),
	Primitive(PrimitiveKind),
	/// A compact encoded value of the inner type.
	Compact(TypeId),
	BitSequence { store: TypeId, order: BitOrder },
	/// Reserved but not defined yet (used while building recursive types).
	Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
	pub name: Option<String>,
	pub ty: TypeId,
	pub type_name: Option<String>,
	pub docs: Vec<String>,
}

impl Field {
	pub fn named(name: impl Into<String>, ty: TypeId) -> Field {
		Field { name: Some(name.into()), ty, type_name: None, docs: Vec::new() }
	}
	pub fn unnamed(ty: TypeId) -> Field {
		Field { name: None, ty, type_name: None, docs: Vec::new() }
	}
	pub fn with_type_name(mut self, type_name: impl Into<String>) -> Field {
		self.type_name = Some(type_name.into());
		self
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantDef {
	pub name: String,
	pub index: u8,
	pub fields: Vec<Field>,
	pub docs: Vec<String>,
}

impl VariantDef {
	pub fn new(name: impl Into<String>, index: u8, fields: Vec<Field>) -> VariantDef {
		VariantDef { name: name.into(), index, fields, docs: Vec::new() }
	}
	pub fn name(&self) -> &str {
		&self.name
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PrimitiveKind {
	Bool,
	Char,
	Str,
	U8,
	U16,
	U32,
	U64,
	U128,
	U256,
	I8,
	I16,
	I32,
	I64,
	I128,
	I256,
}

impl PrimitiveKind {
	/// The unsigned primitive with the given bit width.
	pub fn unsigned(bits: u32) -> Option<PrimitiveKind> {
		Some(match bits {
			8 => PrimitiveKind::U8,
			16 => PrimitiveKind::U16,
			32 => PrimitiveKind::U32,
			64 => PrimitiveKind::U64,
			128 => PrimitiveKind::U128,
			256 => PrimitiveKind::U256,
			_ => return None,
		})
	}

	/// The signed primitive with the given bit width.
	pub fn signed(bits: u32) -> Option<PrimitiveKind> {
		Some(match bits {
			8 => PrimitiveKind::I8,
			16 => PrimitiveKind::I16,
			32 => PrimitiveKind::I32,
			64 => PrimitiveKind::I64,
			128 => PrimitiveKind::I128,
			256 => PrimitiveKind::I256,
			_ => return None,
		})
	}

	/// Rust-ish name of the primitive.
	pub fn as_str(&self) -> &'static str {
		match self {
			PrimitiveKind::Bool => "bool",
			PrimitiveKind::Char => "char",
			PrimitiveKind::Str => "str",
			PrimitiveKind::U8 => "u8",
			PrimitiveKind::U16 => "u16",
			PrimitiveKind::U32 => "u32",
			PrimitiveKind::U64 => "u64",
			PrimitiveKind::U128 => "u128",
			PrimitiveKind::U256 => "u256",
			PrimitiveKind::I8 => "i8",
			PrimitiveKind::I16 => "i16",
			PrimitiveKind::I32 => "i32",
			PrimitiveKind::I64 => "i64",
			PrimitiveKind::I128 => "i128",
			PrimitiveKind::I256 => "i256",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BitOrder {
	Lsb0,
	Msb0,
}

/// An append-only store of types, addressed by [`TypeId`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lookup {
	types: Vec<LookupType>,
}

impl Lookup {
	pub fn new() -> Lookup {
		Lookup::default()
	}

	/// Convert a [`scale_info::PortableRegistry`] into a [`Lookup`]. Type ids are preserved.
	pub fn from_portable(registry: &scale_info::PortableRegistry) -> Result<Lookup, LookupError> {
		portable::from_portable(registry)
	}

	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	pub fn resolve<Id: Into<TypeId>>(&self, id: Id) -> Option<&LookupType> {
		self.types.get(id.into().0 as usize)
	}

	pub fn types(&self) -> impl Iterator<Item = &LookupType> {
		self.types.iter()
	}

	/// Append a new type and return its id.
	pub fn add(&mut self, path: Vec<String>, def: TypeDef) -> TypeId {
		self.add_with_params(path, Vec::new(), def)
	}

	pub fn add_with_params(&mut self, path: Vec<String>, params: Vec<TypeParam>, def: TypeDef) -> TypeId {
		let id = TypeId(self.types.len() as u32);
		self.types.push(LookupType { id, path, params, def, docs: Vec::new() });
		id
	}

	/// Reserve an id whose definition is provided later via [`Lookup::fill`].
	pub fn reserve(&mut self, path: Vec<String>) -> TypeId {
		self.add(path, TypeDef::Pending)
	}

	/// Provide the definition for a previously reserved id.
	pub fn fill(&mut self, id: TypeId, def: TypeDef) -> Result<(), LookupError> {
		let ty = self.types.get_mut(id.0 as usize).ok_or(LookupError::TypeNotFound(id.0))?;
		if ty.def != TypeDef::Pending {
			return Err(LookupError::AlreadyDefined(id.0));
		}
		ty.def = def;
		Ok(())
	}

	/// Find the first type whose path matches exactly.
	pub fn find_by_path(&self, segments: &[&str]) -> Option<TypeId> {
		self.types
			.iter()
			.find(|ty| ty.path.len() == segments.len() && ty.path.iter().zip(segments).all(|(a, b)| a == b))
			.map(|ty| ty.id)
	}

	/// Find the variant type with the given id, if that's what it is.
	pub fn variants<Id: Into<TypeId>>(&self, id: Id) -> Option<&[VariantDef]> {
		match &self.resolve(id)?.def {
			TypeDef::Variant(variants) => Some(variants),
			_ => None,
		}
	}

	/// A readable name for the type, in the style of Rust type syntax.
	pub fn type_name<Id: Into<TypeId>>(&self, id: Id) -> String {
		display::type_name(self, id.into())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reserved_types_can_be_filled_once() {
		let mut lookup = Lookup::new();
		let u8_id = lookup.add(vec![], TypeDef::Primitive(PrimitiveKind::U8));
		let list = lookup.reserve(vec!["List".into()]);
		let next = lookup.add(vec![], TypeDef::Sequence(list));

		assert_eq!(lookup.resolve(list).map(|t| &t.def), Some(&TypeDef::Pending));
		lookup
			.fill(list, TypeDef::Composite(vec![Field::named("value", u8_id), Field::named("next", next)]))
			.unwrap();
		assert!(matches!(lookup.resolve(list).unwrap().def, TypeDef::Composite(_)));
		assert_eq!(lookup.fill(list, TypeDef::Tuple(vec![])), Err(LookupError::AlreadyDefined(list.id())));
		assert_eq!(lookup.fill(TypeId::from_u32(99), TypeDef::Tuple(vec![])), Err(LookupError::TypeNotFound(99)));
	}

	#[test]
	fn ids_are_positional() {
		let mut lookup = Lookup::new();
		let a = lookup.add(vec![], TypeDef::Primitive(PrimitiveKind::Bool));
		let b = lookup.add(vec!["Foo".into()], TypeDef::Tuple(vec![a]));
		assert_eq!((a.id(), b.id()), (0, 1));
		assert_eq!(lookup.find_by_path(&["Foo"]), Some(b));
		assert_eq!(lookup.resolve(b).and_then(|t| t.name()), Some("Foo"));
		assert_eq!(lookup.len(), 2);
	}
}
