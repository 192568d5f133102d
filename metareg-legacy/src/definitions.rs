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
Type definitions in the JSON format popularized by polkadot-js. A definition file is a
map from type name to one of:

- a string, aliasing another type name: `"Balance": "u128"`;
- an object of fields, a struct: `"AccountData": { "free": "Balance", "reserved": "Balance" }`;
- `{ "_enum": [..] }` or `{ "_enum": { .. } }`, an enum whose variants are either
  unit variants, variants holding one type, variants holding a struct, or (when every value
  is a number) unit variants with explicit indexes;
- `{ "_set": { .. } }`, a bit flag set encoded as an unsigned integer of `_bitLength` bits.

Definitions for a range of runtime spec versions can be bundled together, see
[`VersionedDefinitions`].
*/

use crate::{sanitize::sanitize, type_expr::{TypeExpr, TypeExprError}};
use metareg_common::SpecVersion;
use serde::{
	de::{self, Deserializer, MapAccess, Visitor},
	Deserialize,
};
use serde_json::{map::Map, Value};
use std::{collections::HashMap, fmt};

const BASE_DEFINITIONS: &str = include_str!("./definitions/base.json");

#[derive(Debug, thiserror::Error)]
pub enum DefinitionsError {
	#[error(transparent)]
	Json(#[from] serde_json::Error),
	#[error("could not parse the type name of `{name}`: {source}")]
	TypeName { name: String, source: TypeExprError },
	#[error("unexpected JSON for type `{0}`")]
	UnexpectedType(String),
	#[error("variant index {index} of enum `{name}` does not fit in a u8")]
	InvalidVariantIndex { name: String, index: u64 },
	#[error("set `{name}` has an unsupported bit length of {bits}")]
	InvalidBitLength { name: String, bits: u64 },
}

/// How a single type is defined.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefinition {
	/// Another type name.
	Alias(TypeExpr),
	Struct(Vec<(String, TypeDefinition)>),
	Tuple(Vec<TypeDefinition>),
	Enum(Vec<EnumVariant>),
	/// Named bit flags, encoded as an unsigned integer.
	Set { bit_length: u32, flags: Vec<(String, u64)> },
	/// Nothing at all; the unit type.
	Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
	pub name: String,
	pub index: u8,
	/// [`TypeDefinition::Null`] for variants without data.
	pub fields: TypeDefinition,
}

impl EnumVariant {
	pub fn new(name: impl Into<String>, index: u8, fields: TypeDefinition) -> Self {
		EnumVariant { name: name.into(), index, fields }
	}
}

/// A set of named type definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
	types: HashMap<String, TypeDefinition>,
}

impl Definitions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Construct definitions from JSON.
	pub fn from_json(json: &str) -> Result<Self, DefinitionsError> {
		let value: Value = serde_json::from_str(json)?;
		Self::from_value(&value)
	}

	/// Construct definitions from an already parsed JSON object.
	pub fn from_value(value: &Value) -> Result<Self, DefinitionsError> {
		let obj = value.as_object().ok_or_else(|| DefinitionsError::UnexpectedType("<root>".into()))?;
		let mut types = HashMap::new();
		for (name, val) in obj.iter() {
			match (name.as_str(), val) {
				("types", Value::Object(inner)) => parse_types(&mut types, inner)?,
				(name, val) => {
					types.insert(name.to_string(), parse_type(name, val)?);
				}
			}
		}
		Ok(Definitions { types })
	}

	/// The definitions of common substrate types that ship with this crate.
	pub fn base() -> Result<Self, DefinitionsError> {
		Self::from_json(BASE_DEFINITIONS)
	}

	pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
		self.types.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.types.contains_key(name)
	}

	pub fn insert(&mut self, name: impl Into<String>, definition: TypeDefinition) {
		self.types.insert(name.into(), definition);
	}

	/// Parse and add a single definition, replacing any existing one of the same name.
	pub fn register(&mut self, name: &str, definition: &Value) -> Result<(), DefinitionsError> {
		let definition = parse_type(name, definition)?;
		self.types.insert(name.to_string(), definition);
		Ok(())
	}

	/// Add every definition in `other`. `other` takes priority if there are conflicts.
	pub fn extend(&mut self, other: Definitions) {
		self.types.extend(other.types);
	}

	/// Merge with another set of definitions to create a new one.
	/// The `other` definitions take priority if there are conflicts.
	pub fn merge(&self, other: &Definitions) -> Definitions {
		let mut types = self.types.clone();
		types.extend(other.types.iter().map(|(k, v)| (k.clone(), v.clone())));
		Definitions { types }
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.types.keys().map(|s| s.as_str())
	}

	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}
}

impl<'de> Deserialize<'de> for Definitions {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_map(DefinitionsVisitor)
	}
}

struct DefinitionsVisitor;

impl<'de> Visitor<'de> for DefinitionsVisitor {
	type Value = Definitions;

	fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
		formatter.write_str("a map of type definitions")
	}

	fn visit_map<V>(self, mut map: V) -> Result<Definitions, V::Error>
	where
		V: MapAccess<'de>,
	{
		let mut types = HashMap::new();
		while let Some(key) = map.next_key::<String>()? {
			let val: Value = map.next_value()?;
			match (key.as_str(), &val) {
				// the types we care about may be wrapped in a "types" object
				("types", Value::Object(obj)) => parse_types(&mut types, obj).map_err(de::Error::custom)?,
				(name, val) => {
					types.insert(name.to_string(), parse_type(name, val).map_err(de::Error::custom)?);
				}
			}
		}
		Ok(Definitions { types })
	}
}

/// Definitions that apply to a range of runtime spec versions. Either end may be open.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TypeRange {
	pub minmax: [Option<SpecVersion>; 2],
	pub types: Definitions,
}

impl TypeRange {
	pub fn contains(&self, spec: SpecVersion) -> bool {
		is_in_range(spec, self)
	}
}

/// A bundle of [`TypeRange`]s, as found in `{ "types": [{ "minmax": [..], "types": {..} }] }`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VersionedDefinitions {
	types: Vec<TypeRange>,
}

impl VersionedDefinitions {
	pub fn from_json(json: &str) -> Result<Self, DefinitionsError> {
		serde_json::from_str(json).map_err(Into::into)
	}

	pub fn ranges(&self) -> &[TypeRange] {
		&self.types
	}

	/// All the definitions that apply to `spec`. Later ranges take priority over earlier ones.
	pub fn for_spec(&self, spec: SpecVersion) -> Definitions {
		self.types.iter().filter(|range| range.contains(spec)).fold(Definitions::new(), |acc, range| {
			acc.merge(&range.types)
		})
	}
}

fn is_in_range(spec: SpecVersion, range: &TypeRange) -> bool {
	match range.minmax {
		[Some(min), Some(max)] => spec >= min && spec <= max,
		[Some(min), None] => spec >= min,
		[None, Some(max)] => spec <= max,
		[None, None] => true,
	}
}

fn parse_types(types: &mut HashMap<String, TypeDefinition>, obj: &Map<String, Value>) -> Result<(), DefinitionsError> {
	for (name, val) in obj.iter() {
		types.insert(name.clone(), parse_type(name, val)?);
	}
	Ok(())
}

fn parse_expr(name: &str, ty: &str) -> Result<TypeDefinition, DefinitionsError> {
	if ty == "Null" {
		return Ok(TypeDefinition::Null);
	}
	TypeExpr::parse(&sanitize(ty))
		.map(TypeDefinition::Alias)
		.map_err(|source| DefinitionsError::TypeName { name: name.to_string(), source })
}

/// In Polkadot-JS Definitions, an _object_ can be:
/// - Struct (no identifier),
/// - Enum (`_enum` identifier)
/// - Set (`_set`)
///
/// This function decides which is what and dispatches a call
/// to the appropriate parse fn.
fn parse_type(name: &str, val: &Value) -> Result<TypeDefinition, DefinitionsError> {
	match val {
		Value::String(s) => parse_expr(name, s),
		Value::Null => Ok(TypeDefinition::Null),
		Value::Array(items) => parse_tuple(name, items),
		Value::Object(obj) => {
			// aliases and fallbacks only matter to javascript
			let fields = obj.iter().filter(|(k, _)| *k != "_alias" && *k != "_fallback").collect::<Vec<_>>();
			match fields.as_slice() {
				[(k, v)] if *k == "_enum" => parse_enum(name, v),
				[(k, Value::Object(set))] if *k == "_set" => parse_set(name, set),
				_ => parse_struct(name, &fields),
			}
		}
		_ => Err(DefinitionsError::UnexpectedType(name.to_string())),
	}
}

fn is_unused(variant: &str) -> bool {
	variant.starts_with("__Unused")
}

fn variant_index(name: &str, index: u64) -> Result<u8, DefinitionsError> {
	u8::try_from(index).map_err(|_| DefinitionsError::InvalidVariantIndex { name: name.to_string(), index })
}

fn parse_enum(name: &str, value: &Value) -> Result<TypeDefinition, DefinitionsError> {
	let mut variants = Vec::new();
	match value {
		Value::Array(names) => {
			for (index, variant) in names.iter().enumerate() {
				let variant = variant.as_str().ok_or_else(|| DefinitionsError::UnexpectedType(name.to_string()))?;
				if !is_unused(variant) {
					variants.push(EnumVariant::new(variant, variant_index(name, index as u64)?, TypeDefinition::Null));
				}
			}
		}
		// Some enums (`ProxyType` for instance) differ from chain to chain, so each
		// variant is given its index explicitly.
		Value::Object(obj) if !obj.is_empty() && obj.values().all(Value::is_number) => {
			for (variant, index) in obj.iter() {
				let index = index.as_u64().ok_or_else(|| DefinitionsError::UnexpectedType(name.to_string()))?;
				variants.push(EnumVariant::new(variant.as_str(), variant_index(name, index)?, TypeDefinition::Null));
			}
			variants.sort_by_key(|v| v.index);
		}
		Value::Object(obj) => {
			for (index, (variant, fields)) in obj.iter().enumerate() {
				if is_unused(variant) {
					continue;
				}
				let fields = parse_type(&format!("{}::{}", name, variant), fields)?;
				variants.push(EnumVariant::new(variant.as_str(), variant_index(name, index as u64)?, fields));
			}
		}
		_ => return Err(DefinitionsError::UnexpectedType(name.to_string())),
	}
	Ok(TypeDefinition::Enum(variants))
}

fn parse_set(name: &str, obj: &Map<String, Value>) -> Result<TypeDefinition, DefinitionsError> {
	let mut bit_length = 8;
	let mut flags = Vec::new();
	for (key, value) in obj.iter() {
		let num = value.as_u64().ok_or_else(|| DefinitionsError::UnexpectedType(name.to_string()))?;
		if key == "_bitLength" {
			bit_length = num;
		} else {
			flags.push((key.clone(), num));
		}
	}
	match bit_length {
		8 | 16 | 32 | 64 | 128 => Ok(TypeDefinition::Set { bit_length: bit_length as u32, flags }),
		bits => Err(DefinitionsError::InvalidBitLength { name: name.to_string(), bits }),
	}
}

/// Parses a rust struct representation from a JSON Map.
fn parse_struct(name: &str, fields: &[(&String, &Value)]) -> Result<TypeDefinition, DefinitionsError> {
	let fields = fields
		.iter()
		.map(|(field, ty)| Ok(((*field).clone(), parse_type(&format!("{}.{}", name, field), ty)?)))
		.collect::<Result<Vec<_>, DefinitionsError>>()?;
	Ok(TypeDefinition::Struct(fields))
}

fn parse_tuple(name: &str, items: &[Value]) -> Result<TypeDefinition, DefinitionsError> {
	let items = items.iter().map(|item| parse_type(name, item)).collect::<Result<Vec<_>, _>>()?;
	Ok(TypeDefinition::Tuple(items))
}
