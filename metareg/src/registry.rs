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

//! A [`Registry`] knows types by name. Names resolve, in order, against user supplied
//! definitions, the types described by the current metadata and finally a base set of
//! substrate types. Resolved names are cached.

use crate::{decorate::Decorated, Error};
use metareg_core::{
	codec::{decode_value_by_id, encode_value_by_id},
	Lookup, Metadata, TypeId, Value,
};
use metareg_legacy::{metadata as legacy, Definitions, TypeBuilder, TypeDefinition};
use std::{collections::HashMap, sync::Arc};

pub struct Registry {
	user: Definitions,
	base: Definitions,
	lookup: Lookup,
	names: HashMap<String, TypeId>,
	known: HashMap<String, TypeId>,
	decorated: Option<Decorated>,
}

impl Registry {
	/// A registry on top of the built-in substrate types.
	pub fn new() -> Result<Self, Error> {
		Ok(Self::with_base(Definitions::base()?))
	}

	/// A registry with a custom set of fallback definitions in place of the built-in ones.
	pub fn with_base(base: Definitions) -> Self {
		Self {
			user: Definitions::new(),
			base,
			lookup: Lookup::new(),
			names: HashMap::new(),
			known: HashMap::new(),
			decorated: None,
		}
	}

	/// Register a single definition in the polkadot-js JSON format.
	pub fn register(&mut self, name: &str, definition: &serde_json::Value) -> Result<(), Error> {
		self.user.register(name, definition)?;
		self.names.clear();
		Ok(())
	}

	/// Register a JSON object of definitions (optionally wrapped in `{"types": ..}`).
	pub fn register_json(&mut self, json: &str) -> Result<(), Error> {
		self.register_definitions(Definitions::from_json(json)?);
		Ok(())
	}

	pub fn register_definitions(&mut self, definitions: Definitions) {
		log::debug!("Registering {} type definitions", definitions.len());
		self.user.extend(definitions);
		self.names.clear();
	}

	pub fn register_type(&mut self, name: &str, definition: TypeDefinition) {
		self.user.insert(name, definition);
		self.names.clear();
	}

	/// Can `name` be resolved to a type?
	pub fn has_type(&mut self, name: &str) -> bool {
		self.type_id(name).is_ok()
	}

	/// Resolve a type name to its id, building it if it hasn't been seen before.
	pub fn type_id(&mut self, name: &str) -> Result<TypeId, Error> {
		if let Some(id) = self.names.get(name) {
			return Ok(*id);
		}
		let mut builder = TypeBuilder::new(&mut self.lookup, &mut self.names)
			.with_definitions(&self.user)
			.with_known(&self.known)
			.with_definitions(&self.base);
		Ok(builder.resolve(name)?)
	}

	pub fn encode<T>(&mut self, name: &str, value: &Value<T>) -> Result<Vec<u8>, Error> {
		let ty = self.type_id(name)?;
		let mut out = Vec::new();
		encode_value_by_id(value, ty, &self.lookup, &mut out)?;
		Ok(out)
	}

	/// Decode a value of the named type from the front of `data`, leaving the cursor after it.
	pub fn decode(&mut self, name: &str, data: &mut &[u8]) -> Result<Value<TypeId>, Error> {
		let ty = self.type_id(name)?;
		Ok(decode_value_by_id(data, ty, &self.lookup)?)
	}

	/// Like [`Registry::decode`], but every byte must be consumed.
	pub fn decode_all(&mut self, name: &str, bytes: &[u8]) -> Result<Value<TypeId>, Error> {
		let data = &mut &*bytes;
		let value = self.decode(name, data)?;
		if !data.is_empty() {
			return Err(Error::TrailingBytes(data.len()));
		}
		Ok(value)
	}

	/// Use `metadata` from now on. Its types become resolvable by name and ids handed out
	/// by it are valid in this registry.
	pub fn set_metadata(&mut self, metadata: Metadata) {
		log::debug!("Setting V{} metadata with {} types", metadata.version(), metadata.types().len());
		self.lookup = metadata.types().clone();
		self.known = metadata_names(&self.lookup);
		self.names.clear();
		self.decorated = Some(Decorated::new(Arc::new(metadata)));
	}

	/// Decode SCALE encoded metadata of any supported version and use it. V11 to V13
	/// metadata names its types, which are resolved through the registered definitions.
	pub fn set_metadata_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
		let definitions = self.base.merge(&self.user);
		let metadata = legacy::from_bytes(bytes, &definitions)?;
		self.set_metadata(metadata);
		Ok(())
	}

	pub fn metadata(&self) -> Option<&Metadata> {
		self.decorated.as_ref().map(|d| d.metadata())
	}

	/// Accessors for the calls, events, errors, storage and constants of the current metadata.
	pub fn decorated(&self) -> Result<&Decorated, Error> {
		self.decorated.as_ref().ok_or(Error::NoMetadata)
	}

	/// Find a call by its `[pallet index, call index]`.
	pub fn find_call(&self, index: [u8; 2]) -> Option<&crate::decorate::CallFunction> {
		self.decorated.as_ref()?.find_call(index)
	}

	/// Find an event by its `[pallet event index, event index]`.
	pub fn find_event(&self, index: [u8; 2]) -> Option<&crate::decorate::EventItem> {
		self.decorated.as_ref()?.find_event(index)
	}

	/// Find an error by pallet index and the encoded module error.
	pub fn find_error(&self, pallet_index: u8, error: &[u8]) -> Option<&crate::decorate::ErrorItem> {
		self.decorated.as_ref()?.find_error(pallet_index, error)
	}

	pub fn type_name(&self, id: TypeId) -> String {
		self.lookup.type_name(id)
	}

	pub fn lookup(&self) -> &Lookup {
		&self.lookup
	}
}

// Metadata types by name and by full path. Names shared by more than one type are
// left out; those need a path or a definition.
fn metadata_names(lookup: &Lookup) -> HashMap<String, TypeId> {
	let mut candidates: HashMap<String, Option<TypeId>> = HashMap::new();
	let mut paths: HashMap<String, Option<TypeId>> = HashMap::new();
	for ty in lookup.types() {
		let Some(name) = ty.name() else {
			continue;
		};
		candidates.entry(name.to_string()).and_modify(|id| *id = None).or_insert(Some(ty.id));
		if ty.path.len() > 1 {
			paths.entry(ty.path.join("::")).and_modify(|id| *id = None).or_insert(Some(ty.id));
		}
	}
	candidates.extend(paths);
	candidates.into_iter().filter_map(|(name, id)| Some((name, id?))).collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use metareg_core::{value::Composite, ValueDef};
	use serde_json::json;

	fn registry() -> Registry {
		let _ = pretty_env_logger::try_init();
		Registry::new().unwrap()
	}

	#[test]
	fn structs_resolve_from_json() {
		let mut registry = registry();
		registry.register_json(r#"{ "Point": { "x": "u32", "y": "Option<u8>" } }"#).unwrap();

		let value = Value::named_composite(vec![
			("y", Value::named_composite(vec![("Some", Value::u8(2))])),
			("x", Value::u32(1)),
		]);
		let bytes = registry.encode("Point", &value).unwrap();
		assert_eq!(bytes, vec![1, 0, 0, 0, 1, 2]);

		let decoded = registry.decode_all("Point", &bytes).unwrap();
		assert_eq!(decoded.field("x").and_then(|v| v.as_u128()), Some(1));
		assert_eq!(decoded.field("y").and_then(|v| v.variant_name()), Some("Some"));
	}

	#[test]
	fn user_definitions_shadow_base_types() {
		let mut registry = registry();
		assert_eq!(registry.encode("Balance", &Value::u32(5)).unwrap().len(), 16);

		registry.register("Balance", &json!("u64")).unwrap();
		assert_eq!(registry.encode("Balance", &Value::u32(5)).unwrap(), 5u64.to_le_bytes().to_vec());
	}

	#[test]
	fn user_definitions_shadow_builtin_types() {
		let mut registry = registry();
		assert_eq!(registry.encode("Era", &Value::variant("Immortal", Composite::Unnamed(vec![]))).unwrap(), vec![0]);

		registry.register("Era", &json!("u64")).unwrap();
		assert_eq!(registry.encode("Era", &Value::u64(5)).unwrap(), 5u64.to_le_bytes().to_vec());
		assert_eq!(registry.decode_all("Era", &5u64.to_le_bytes()).unwrap().as_u128(), Some(5));
	}

	#[test]
	fn recursive_types() {
		let mut registry = registry();
		registry.register("Tree", &json!({ "value": "u8", "children": "Vec<Tree>" })).unwrap();

		let leaf = |n| Value::named_composite(vec![("value", Value::u8(n)), ("children", Value::unnamed_composite(vec![]))]);
		let tree = Value::named_composite(vec![
			("value", Value::u8(1)),
			("children", Value::unnamed_composite(vec![leaf(2), leaf(3)])),
		]);
		let bytes = registry.encode("Tree", &tree).unwrap();
		assert_eq!(bytes, vec![1, 8, 2, 0, 3, 0]);

		let decoded = registry.decode_all("Tree", &bytes).unwrap();
		let ValueDef::Composite(children) = &decoded.field("children").unwrap().value else {
			panic!("children should be a sequence")
		};
		assert_eq!(children.len(), 2);
	}

	#[test]
	fn unknown_names_and_trailing_bytes() {
		let mut registry = registry();
		assert!(!registry.has_type("NotAType"));
		assert!(registry.has_type("Vec<AccountId>"));
		assert!(registry.has_type("<T as frame_system::Config>::BlockNumber"));

		assert!(matches!(registry.decode_all("u16", &[1, 0, 0]), Err(Error::TrailingBytes(1))));
		assert!(matches!(registry.decorated(), Err(Error::NoMetadata)));
	}

	#[test]
	fn generic_names_render() {
		let mut registry = registry();
		let id = registry.type_id("BTreeMap<u32, bool>").unwrap();
		assert_eq!(registry.type_name(id), "Vec<(u32, bool)>");
		assert_eq!(registry.type_id("BTreeMap<u32, bool>").unwrap(), id);
	}
}
