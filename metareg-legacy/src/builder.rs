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

//! Build types into a [`Lookup`] from their names, using [`Definitions`] to find out
//! what the names mean.

use crate::{
	definitions::{Definitions, TypeDefinition},
	sanitize::sanitize,
	type_expr::{TypeExpr, TypeExprError},
};
use metareg_core::lookup::{BitOrder, Field, Lookup, LookupError, PrimitiveKind, TypeDef, TypeParam, VariantDef};
use metareg_core::TypeId;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
	#[error("could not find a definition for type `{0}`")]
	UnknownType(String),
	#[error("type `{0}` is an alias of itself")]
	AliasCycle(String),
	#[error(transparent)]
	Parse(#[from] TypeExprError),
	#[error("`{0}` is not a valid integer bit width")]
	InvalidBitWidth(String),
	#[error(transparent)]
	Lookup(#[from] LookupError),
}

/// Somewhere type names can be looked up. Sources are consulted in the order
/// they were given to the [`TypeBuilder`].
#[derive(Debug, Clone, Copy)]
pub enum TypeSource<'a> {
	/// Names defined in JSON.
	Definitions(&'a Definitions),
	/// Names of types that already exist in the lookup.
	Known(&'a HashMap<String, TypeId>),
}

pub struct TypeBuilder<'a> {
	lookup: &'a mut Lookup,
	/// Canonical type name -> id. Kept by the caller so that types are only built once.
	cache: &'a mut HashMap<String, TypeId>,
	sources: Vec<TypeSource<'a>>,
	/// Aliases currently being resolved.
	resolving: Vec<String>,
}

impl<'a> TypeBuilder<'a> {
	pub fn new(lookup: &'a mut Lookup, cache: &'a mut HashMap<String, TypeId>) -> Self {
		TypeBuilder { lookup, cache, sources: Vec::new(), resolving: Vec::new() }
	}

	pub fn with_definitions(mut self, definitions: &'a Definitions) -> Self {
		self.sources.push(TypeSource::Definitions(definitions));
		self
	}

	pub fn with_known(mut self, known: &'a HashMap<String, TypeId>) -> Self {
		self.sources.push(TypeSource::Known(known));
		self
	}

	pub fn lookup(&self) -> &Lookup {
		self.lookup
	}

	/// Sanitize, parse and build a type name.
	pub fn resolve(&mut self, name: &str) -> Result<TypeId, TypeError> {
		if let Some(id) = self.cache.get(name) {
			return Ok(*id);
		}
		let expr = TypeExpr::parse(&sanitize(name))?;
		let id = self.build(&expr)?;
		self.cache.insert(name.to_string(), id);
		Ok(id)
	}

	/// Build the type an expression refers to, or return it if it's already been built.
	pub fn build(&mut self, expr: &TypeExpr) -> Result<TypeId, TypeError> {
		let key = expr.to_string();
		if let Some(id) = self.cache.get(&key) {
			return Ok(*id);
		}
		let id = match expr {
			TypeExpr::Tuple(items) => {
				let items = items.iter().map(|item| self.build(item)).collect::<Result<Vec<_>, _>>()?;
				self.lookup.add(vec![], TypeDef::Tuple(items))
			}
			TypeExpr::Array { ty, len } => {
				let ty = self.build(ty)?;
				self.lookup.add(vec![], TypeDef::Array { len: *len, ty })
			}
			TypeExpr::Name(name) => self.named(expr, name, &[])?,
			TypeExpr::Generic { name, params } => self.named(expr, name, params)?,
		};
		self.cache.insert(key, id);
		Ok(id)
	}

	/// Build a definition that has no name of its own.
	pub fn build_definition(&mut self, name: &str, definition: &TypeDefinition) -> Result<TypeId, TypeError> {
		self.definition(name, definition)
	}

	/// Reserve a named type to be filled in later with [`TypeBuilder::fill`]. Until then,
	/// references to the name resolve to the reserved id.
	pub fn reserve(&mut self, name: &str) -> TypeId {
		let id = self.lookup.reserve(vec![name.to_string()]);
		self.cache.insert(name.to_string(), id);
		id
	}

	pub fn fill(&mut self, id: TypeId, def: TypeDef) -> Result<(), TypeError> {
		self.lookup.fill(id, def).map_err(Into::into)
	}

	/// Add an unnamed type.
	pub fn add(&mut self, path: Vec<String>, def: TypeDef) -> TypeId {
		self.lookup.add(path, def)
	}

	/// Stand in for a type that can't be resolved. The type exists, but it can never be
	/// encoded or decoded.
	pub fn placeholder(&mut self, name: &str) -> TypeId {
		log::warn!("No definition found for `{}`; values of this type can not be decoded", name);
		self.reserve(name)
	}

	fn named(&mut self, expr: &TypeExpr, name: &str, params: &[TypeExpr]) -> Result<TypeId, TypeError> {
		if params.is_empty() {
			if let Some(kind) = primitive_kind(name) {
				return Ok(self.primitive(kind));
			}
		}

		// A definition of the exact name wins over the built in meaning of it.
		let full = expr.to_string();
		if let Some(id) = self.from_sources(&full)? {
			return Ok(id);
		}
		if let Some(id) = self.builtin(name, params)? {
			return Ok(id);
		}
		// `BalanceOf<T>` may be defined as is, but is more likely to be defined as `BalanceOf`.
		if !params.is_empty() {
			if let Some(id) = self.from_sources(name)? {
				return Ok(id);
			}
		}
		Err(TypeError::UnknownType(full))
	}

	fn from_sources(&mut self, key: &str) -> Result<Option<TypeId>, TypeError> {
		for source in self.sources.clone() {
			match source {
				TypeSource::Known(known) => {
					if let Some(id) = known.get(key) {
						return Ok(Some(*id));
					}
				}
				TypeSource::Definitions(defs) => {
					if let Some(def) = defs.get(key) {
						log::trace!("resolving {} through its definition", key);
						return self.definition(key, def).map(Some);
					}
				}
			}
		}
		Ok(None)
	}

	fn primitive(&mut self, kind: PrimitiveKind) -> TypeId {
		self.lookup.add(vec![], TypeDef::Primitive(kind))
	}

	fn unit(&mut self) -> Result<TypeId, TypeError> {
		self.build(&TypeExpr::unit())
	}

	fn builtin(&mut self, name: &str, params: &[TypeExpr]) -> Result<Option<TypeId>, TypeError> {
		let id = match (name, params) {
			("Null", []) => self.unit()?,
			("PhantomData" | "PhantomPinned", _) => self.unit()?,
			("Box" | "Arc" | "Rc" | "Cow", [ty]) => self.build(ty)?,
			("Vec" | "VecDeque" | "BTreeSet" | "HashSet", [ty]) => {
				let ty = self.build(ty)?;
				self.lookup.add(vec![], TypeDef::Sequence(ty))
			}
			("BTreeMap" | "HashMap", [k, v]) => {
				let entry = self.build(&TypeExpr::Tuple(vec![k.clone(), v.clone()]))?;
				self.lookup.add(vec![], TypeDef::Sequence(entry))
			}
			("Compact", [ty]) => {
				let ty = self.build(ty)?;
				self.lookup.add(vec![], TypeDef::Compact(ty))
			}
			("Option", [ty]) => {
				let ty = self.build(ty)?;
				let variants = vec![VariantDef::new("None", 0, vec![]), VariantDef::new("Some", 1, vec![Field::unnamed(ty)])];
				self.lookup.add_with_params(vec!["Option".into()], vec![param("T", ty)], TypeDef::Variant(variants))
			}
			("Result", [ok, err]) => {
				let (ok, err) = (self.build(ok)?, self.build(err)?);
				let variants =
					vec![VariantDef::new("Ok", 0, vec![Field::unnamed(ok)]), VariantDef::new("Err", 1, vec![Field::unnamed(err)])];
				self.lookup.add_with_params(
					vec!["Result".into()],
					vec![param("T", ok), param("E", err)],
					TypeDef::Variant(variants),
				)
			}
			("BitVec", _) => self.bit_vec(params)?,
			("Era", []) => self.era()?,
			("Int" | "UInt", [bits, ..]) => self.sized_int(name, bits)?,
			_ => return Ok(None),
		};
		Ok(Some(id))
	}

	/// `BitVec<Store, Order>`, or `BitVec<Order, Store>` as older names have it. Missing
	/// parameters default to `u8` and `Lsb0`.
	fn bit_vec(&mut self, params: &[TypeExpr]) -> Result<TypeId, TypeError> {
		let mut order = BitOrder::Lsb0;
		let mut store = TypeExpr::Name("u8".into());
		for param in params {
			match param.name() {
				Some("Lsb0") => order = BitOrder::Lsb0,
				Some("Msb0") => order = BitOrder::Msb0,
				_ => store = param.clone(),
			}
		}
		let store = self.build(&store)?;
		Ok(self.lookup.add(vec![], TypeDef::BitSequence { store, order }))
	}

	/// An era is a single zero byte when immortal, and two bytes otherwise.
	fn era(&mut self) -> Result<TypeId, TypeError> {
		let byte = self.build(&TypeExpr::Name("u8".into()))?;
		let variants = std::iter::once(VariantDef::new("Immortal", 0, vec![]))
			.chain((1..=255u8).map(|i| VariantDef::new(format!("Mortal{}", i), i, vec![Field::unnamed(byte)])))
			.collect();
		Ok(self.lookup.add(vec!["Era".into()], TypeDef::Variant(variants)))
	}

	/// `UInt<64>` is a `u64`; widths without a matching primitive become a byte array.
	fn sized_int(&mut self, name: &str, bits: &TypeExpr) -> Result<TypeId, TypeError> {
		let invalid = || TypeError::InvalidBitWidth(bits.to_string());
		let width = bits.name().and_then(|b| b.parse::<u32>().ok()).ok_or_else(invalid)?;
		let kind = if name == "Int" { PrimitiveKind::signed(width) } else { PrimitiveKind::unsigned(width) };
		match kind {
			Some(kind) => self.build(&TypeExpr::Name(kind.as_str().into())),
			None if width > 0 && width % 8 == 0 => {
				self.build(&TypeExpr::Array { ty: Box::new(TypeExpr::Name("u8".into())), len: width / 8 })
			}
			None => Err(invalid()),
		}
	}

	fn definition(&mut self, name: &str, definition: &TypeDefinition) -> Result<TypeId, TypeError> {
		match definition {
			TypeDefinition::Alias(expr) => {
				if self.resolving.iter().any(|n| n == name) {
					return Err(TypeError::AliasCycle(name.to_string()));
				}
				self.resolving.push(name.to_string());
				let id = self.build(expr);
				self.resolving.pop();
				id
			}
			TypeDefinition::Null => self.unit(),
			TypeDefinition::Set { bit_length, .. } => {
				self.build(&TypeExpr::Name(format!("u{}", bit_length)))
			}
			TypeDefinition::Tuple(items) => {
				let items = items.iter().map(|item| self.definition(name, item)).collect::<Result<Vec<_>, _>>()?;
				Ok(self.lookup.add(vec![], TypeDef::Tuple(items)))
			}
			TypeDefinition::Struct(_) | TypeDefinition::Enum(_) => {
				// Reserve first, so that the type can refer to itself.
				let id = self.reserve(name);
				match self.composite_or_variant(name, definition) {
					Ok(def) => {
						self.fill(id, def)?;
						Ok(id)
					}
					Err(e) => {
						self.cache.remove(name);
						Err(e)
					}
				}
			}
		}
	}

	fn composite_or_variant(&mut self, name: &str, definition: &TypeDefinition) -> Result<TypeDef, TypeError> {
		match definition {
			TypeDefinition::Enum(variants) => {
				let variants = variants
					.iter()
					.map(|v| {
						let fields = self.fields(&format!("{}::{}", name, v.name), &v.fields)?;
						Ok(VariantDef::new(v.name.as_str(), v.index, fields))
					})
					.collect::<Result<Vec<_>, TypeError>>()?;
				Ok(TypeDef::Variant(variants))
			}
			other => Ok(TypeDef::Composite(self.fields(name, other)?)),
		}
	}

	/// The fields of a struct, or of an enum variant.
	fn fields(&mut self, name: &str, definition: &TypeDefinition) -> Result<Vec<Field>, TypeError> {
		match definition {
			TypeDefinition::Null => Ok(Vec::new()),
			TypeDefinition::Struct(fields) => fields
				.iter()
				.map(|(field, def)| {
					let ty = self.definition(&format!("{}.{}", name, field), def)?;
					Ok(with_type_name(Field::named(field.as_str(), ty), def))
				})
				.collect(),
			TypeDefinition::Tuple(items) => items
				.iter()
				.map(|def| Ok(with_type_name(Field::unnamed(self.definition(name, def)?), def)))
				.collect(),
			other => Ok(vec![with_type_name(Field::unnamed(self.definition(name, other)?), other)]),
		}
	}
}

fn with_type_name(field: Field, definition: &TypeDefinition) -> Field {
	match definition {
		TypeDefinition::Alias(expr) => field.with_type_name(expr.to_string()),
		_ => field,
	}
}

fn param(name: &str, ty: TypeId) -> TypeParam {
	TypeParam { name: name.to_string(), ty: Some(ty) }
}

fn primitive_kind(name: &str) -> Option<PrimitiveKind> {
	Some(match name {
		"bool" => PrimitiveKind::Bool,
		"char" => PrimitiveKind::Char,
		"str" | "String" => PrimitiveKind::Str,
		"u8" => PrimitiveKind::U8,
		"u16" => PrimitiveKind::U16,
		"u32" => PrimitiveKind::U32,
		"u64" => PrimitiveKind::U64,
		"u128" => PrimitiveKind::U128,
		"u256" | "U256" => PrimitiveKind::U256,
		"i8" => PrimitiveKind::I8,
		"i16" => PrimitiveKind::I16,
		"i32" => PrimitiveKind::I32,
		"i64" => PrimitiveKind::I64,
		"i128" => PrimitiveKind::I128,
		"i256" | "I256" => PrimitiveKind::I256,
		_ => return None,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn definitions(json: serde_json::Value) -> Definitions {
		Definitions::from_value(&json).unwrap()
	}

	#[test]
	fn should_build_builtin_types() {
		let (mut lookup, mut cache) = (Lookup::new(), HashMap::new());
		let mut builder = TypeBuilder::new(&mut lookup, &mut cache);

		let id = builder.resolve("Vec<(u32, Option<bool>)>").unwrap();
		assert_eq!(builder.lookup().type_name(id), "Vec<(u32, Option<bool>)>");

		let id = builder.resolve("BTreeMap<u8, Compact<u128>>").unwrap();
		assert_eq!(builder.lookup().type_name(id), "Vec<(u8, Compact<u128>)>");

		let id = builder.resolve("Box<<T as Trait>::Foo<[u8; 4]>>");
		assert_eq!(id, Err(TypeError::UnknownType("Foo<[u8; 4]>".into())));

		let id = builder.resolve("UInt<64>").unwrap();
		assert_eq!(builder.lookup().type_name(id), "u64");
		let id = builder.resolve("Int<24>").unwrap();
		assert_eq!(builder.lookup().type_name(id), "[u8; 3]");
		assert_eq!(builder.resolve("UInt<x>"), Err(TypeError::InvalidBitWidth("x".into())));

		let id = builder.resolve("Era").unwrap();
		assert_eq!(builder.lookup().variants(id).map(|v| v.len()), Some(256));
	}

	#[test]
	fn definitions_replace_builtin_meanings() {
		let (mut lookup, mut cache) = (Lookup::new(), HashMap::new());
		let defs = definitions(json!({ "Era": "u64", "Option<Weight>": "u32", "u32": "u8" }));
		let mut builder = TypeBuilder::new(&mut lookup, &mut cache).with_definitions(&defs);

		let era = builder.resolve("Era").unwrap();
		assert_eq!(builder.lookup().type_name(era), "u64");
		let weight = builder.resolve("Option<Weight>").unwrap();
		assert_eq!(builder.lookup().type_name(weight), "u32");
		let id = builder.resolve("Option<u8>").unwrap();
		assert_eq!(builder.lookup().variants(id).map(|v| v.len()), Some(2));
		// primitives can't be redefined
		let id = builder.resolve("u32").unwrap();
		assert_eq!(builder.lookup().resolve(id).unwrap().def, TypeDef::Primitive(PrimitiveKind::U32));
	}

	#[test]
	fn bit_vecs_keep_their_store_and_order() {
		let (mut lookup, mut cache) = (Lookup::new(), HashMap::new());
		let mut builder = TypeBuilder::new(&mut lookup, &mut cache);

		for (name, width, expected) in [
			("BitVec", PrimitiveKind::U8, BitOrder::Lsb0),
			("BitVec<u32, Msb0>", PrimitiveKind::U32, BitOrder::Msb0),
			("BitVec<Msb0, u16>", PrimitiveKind::U16, BitOrder::Msb0),
			("BitVec<bitvec::order::Lsb0, u64>", PrimitiveKind::U64, BitOrder::Lsb0),
		] {
			let id = builder.resolve(name).unwrap();
			let TypeDef::BitSequence { store, order } = builder.lookup().resolve(id).unwrap().def else {
				panic!("{} should be a bit sequence", name)
			};
			assert_eq!(order, expected, "{}", name);
			assert_eq!(builder.lookup().resolve(store).unwrap().def, TypeDef::Primitive(width), "{}", name);
		}
	}

	#[test]
	fn types_are_only_built_once() {
		let (mut lookup, mut cache) = (Lookup::new(), HashMap::new());
		let defs = definitions(json!({ "Balance": "u128", "BalanceOf": "Balance" }));
		let mut builder = TypeBuilder::new(&mut lookup, &mut cache).with_definitions(&defs);

		let a = builder.resolve("T::Balance").unwrap();
		let b = builder.resolve("BalanceOf<T>").unwrap();
		let c = builder.resolve("u128").unwrap();
		assert_eq!(a, b);
		assert_eq!(b, c);
		assert_eq!(lookup.len(), 1);
	}

	#[test]
	fn sources_are_consulted_in_order() {
		let (mut lookup, mut cache) = (Lookup::new(), HashMap::new());
		let user = definitions(json!({ "Balance": "u64" }));
		let base = definitions(json!({ "Balance": "u128", "Hash": "[u8; 32]", "Index": "u32" }));
		let known = HashMap::from([("Index".to_string(), TypeId::from_u32(1234))]);
		let mut builder = TypeBuilder::new(&mut lookup, &mut cache).with_definitions(&user).with_known(&known).with_definitions(&base);

		let balance = builder.resolve("Balance").unwrap();
		assert_eq!(builder.lookup().type_name(balance), "u64");
		let hash = builder.resolve("Hash").unwrap();
		assert_eq!(builder.lookup().type_name(hash), "[u8; 32]");
		assert_eq!(builder.resolve("Index"), Ok(TypeId::from_u32(1234)));
	}

	#[test]
	fn structs_and_enums() {
		let (mut lookup, mut cache) = (Lookup::new(), HashMap::new());
		let defs = definitions(json!({
			"AccountData": { "free": "u128", "flags": { "_set": { "A": 1, "B": 2 } } },
			"Phase": { "_enum": { "ApplyExtrinsic": "u32", "Finalization": "Null", "Pair": "(u8, u8)" } }
		}));
		let mut builder = TypeBuilder::new(&mut lookup, &mut cache).with_definitions(&defs);

		let data = builder.resolve("AccountData").unwrap();
		let phase = builder.resolve("Phase").unwrap();

		let TypeDef::Composite(fields) = &lookup.resolve(data).unwrap().def else { panic!("expected a struct") };
		assert_eq!(fields[0].name.as_deref(), Some("free"));
		assert_eq!(fields[0].type_name.as_deref(), Some("u128"));
		assert_eq!(lookup.type_name(fields[1].ty), "u8");

		let variants = lookup.variants(phase).unwrap();
		assert_eq!(variants.len(), 3);
		assert_eq!(variants[0].fields.len(), 1);
		assert!(variants[1].fields.is_empty());
		assert_eq!(lookup.type_name(variants[2].fields[0].ty), "(u8, u8)");
	}

	#[test]
	fn recursive_types_resolve() {
		let (mut lookup, mut cache) = (Lookup::new(), HashMap::new());
		let defs = definitions(json!({
			"Node": { "value": "u32", "next": "Option<Node>" },
			"Ping": "Pong",
			"Pong": "Ping"
		}));
		let mut builder = TypeBuilder::new(&mut lookup, &mut cache).with_definitions(&defs);

		let node = builder.resolve("Node").unwrap();
		let TypeDef::Composite(fields) = &builder.lookup().resolve(node).unwrap().def else { panic!("expected a struct") };
		let next = builder.lookup().variants(fields[1].ty).unwrap();
		assert_eq!(next[1].fields[0].ty, node);

		assert!(matches!(builder.resolve("Ping"), Err(TypeError::AliasCycle(_))));
	}

	#[test]
	fn reserved_names_resolve_before_being_filled() {
		let (mut lookup, mut cache) = (Lookup::new(), HashMap::new());
		let mut builder = TypeBuilder::new(&mut lookup, &mut cache);

		let call = builder.reserve("Call");
		let batch = builder.resolve("Vec<<T as Trait>::Call>").unwrap();
		builder.fill(call, TypeDef::Variant(vec![])).unwrap();
		assert_eq!(lookup.resolve(batch).unwrap().def, TypeDef::Sequence(call));

		let unknown = TypeBuilder::new(&mut lookup, &mut cache).placeholder("Mystery");
		assert_eq!(lookup.resolve(unknown).unwrap().def, TypeDef::Pending);
	}
}
