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

//! Decode SCALE encoded metadata from a substrate node into one normalized
//! [`Metadata`] shape, whichever version it was originally encoded as.
//!
//! V14 and V15 metadata are understood here. Older versions carry no type
//! information of their own; see the `metareg-legacy` crate for those, which
//! build the same [`Metadata`] via [`Metadata::from_parts`].

mod readonly_array;
mod u8_map;
mod version_14;
mod version_15;

use crate::lookup::{Lookup, LookupError, TypeDef, TypeId, VariantDef};
use codec::Decode;
use frame_metadata::{RuntimeMetadata, RuntimeMetadataPrefixed};
use metareg_common::StorageHasher;
use readonly_array::ReadonlyArray;
use serde::Serialize;
use std::collections::HashMap;
use u8_map::U8Map;

/// An enum of the possible errors that can be returned from attempting to construct
/// a [`Metadata`] struct.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MetadataError {
	#[error("metadata version {0} is not supported")]
	UnsupportedVersion(u32),
	#[error("{0}")]
	CodecError(#[from] codec::Error),
	#[error("unexpected type {ty} for {pallet} {kind}; expecting a Variant type, but got {got}")]
	ExpectedVariantType { pallet: String, kind: &'static str, ty: u32, got: String },
	#[error("could not find type with ID {0}")]
	TypeNotFound(u32),
	#[error(transparent)]
	Lookup(#[from] LookupError),
}

/// The metadata of a runtime, normalized to the latest shape regardless of the
/// version it was decoded from.
#[derive(Debug, Clone)]
pub struct Metadata {
	version: u32,
	types: Lookup,
	pallets: ReadonlyArray<PalletMetadata>,
	/// Position in `pallets`, keyed by the index calls and errors are addressed with.
	pallets_by_index: U8Map<usize>,
	/// Position in `pallets`, keyed by the index events are addressed with.
	pallets_by_event_index: U8Map<usize>,
	pallets_by_name: HashMap<String, usize>,
	extrinsic: ExtrinsicMetadata,
	apis: Vec<RuntimeApiMetadata>,
	outer_enums: OuterEnums,
}

impl Metadata {
	/// Attempt to convert some SCALE encoded bytes into Metadata, returning an
	/// error if something goes wrong in doing so. Here's an example command using
	/// `curl` and `jq` to download this from a locally running node (on the default port)
	/// and save it as `node_metadata.scale`.
	///
	/// ```sh
	/// curl -sX POST -H "Content-Type: application/json" --data '{"jsonrpc":"2.0","method":"state_getMetadata", "id": 1}' localhost:9933 \
	///     | jq .result \
	///     | cut -d '"' -f 2 \
	///     | xxd -r -p > node_metadata.scale
	/// ```
	///
	/// This file can then be read and passed directly to this method.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, MetadataError> {
		log::trace!("Decoding metadata");
		let meta = RuntimeMetadataPrefixed::decode(&mut &*bytes)?;
		Self::from_runtime_metadata(meta.1)
	}

	/// Convert the substrate runtime metadata into our Metadata.
	pub fn from_runtime_metadata(metadata: RuntimeMetadata) -> Result<Self, MetadataError> {
		match metadata {
			RuntimeMetadata::V14(meta_v14) => {
				log::trace!("V14 metadata found.");
				version_14::decode(meta_v14)
			}
			RuntimeMetadata::V15(meta_v15) => {
				log::trace!("V15 metadata found.");
				version_15::decode(meta_v15)
			}
			unsupported_meta => Err(MetadataError::UnsupportedVersion(unsupported_meta.version())),
		}
	}

	/// Assemble metadata from its normalized parts. Every call, event and error type
	/// that a pallet points to has to exist in `types` and be a variant.
	pub fn from_parts(
		version: u32,
		types: Lookup,
		pallets: Vec<PalletMetadata>,
		extrinsic: ExtrinsicMetadata,
		apis: Vec<RuntimeApiMetadata>,
		outer_enums: OuterEnums,
	) -> Result<Self, MetadataError> {
		let mut pallets_by_index = U8Map::new();
		let mut pallets_by_event_index = U8Map::new();
		let mut pallets_by_name = HashMap::new();

		for (pos, pallet) in pallets.iter().enumerate() {
			for (kind, ty) in [("calls", pallet.calls), ("events", pallet.event), ("errors", pallet.error)] {
				let Some(ty) = ty else { continue };
				let resolved = types.resolve(ty).ok_or(MetadataError::TypeNotFound(ty.id()))?;
				if !matches!(resolved.def, TypeDef::Variant(_)) {
					return Err(MetadataError::ExpectedVariantType {
						pallet: pallet.name.clone(),
						kind,
						ty: ty.id(),
						got: types.type_name(ty),
					});
				}
			}
			if pallets_by_index.insert(pallet.index, pos).is_some() {
				log::warn!("More than one pallet has index {}; {} takes precedence", pallet.index, pallet.name);
			}
			pallets_by_event_index.insert(pallet.event_index, pos);
			pallets_by_name.insert(pallet.name.clone(), pos);
		}

		Ok(Metadata {
			version,
			types,
			pallets: pallets.into(),
			pallets_by_index,
			pallets_by_event_index,
			pallets_by_name,
			extrinsic,
			apis,
			outer_enums,
		})
	}

	/// The metadata version this was decoded from.
	pub fn version(&self) -> u32 {
		self.version
	}

	/// Type information lives inside this.
	pub fn types(&self) -> &Lookup {
		&self.types
	}

	/// Return details about the type of extrinsic supported by this metadata.
	pub fn extrinsic(&self) -> &ExtrinsicMetadata {
		&self.extrinsic
	}

	pub fn pallets(&self) -> impl Iterator<Item = &PalletMetadata> {
		self.pallets.iter()
	}

	pub fn pallet_by_name(&self, name: &str) -> Option<&PalletMetadata> {
		self.pallets_by_name.get(name).map(|pos| &self.pallets[*pos])
	}

	/// The pallet that calls and module errors with this index belong to.
	pub fn pallet_by_index(&self, index: u8) -> Option<&PalletMetadata> {
		self.pallets_by_index.get(index).map(|pos| &self.pallets[*pos])
	}

	/// The pallet that events with this index belong to. Only differs from
	/// [`Metadata::pallet_by_index`] for V11 metadata.
	pub fn pallet_by_event_index(&self, index: u8) -> Option<&PalletMetadata> {
		self.pallets_by_event_index.get(index).map(|pos| &self.pallets[*pos])
	}

	pub fn runtime_apis(&self) -> &[RuntimeApiMetadata] {
		&self.apis
	}

	pub fn runtime_api(&self, name: &str) -> Option<&RuntimeApiMetadata> {
		self.apis.iter().find(|api| api.name == name)
	}

	pub fn outer_enums(&self) -> &OuterEnums {
		&self.outer_enums
	}

	/// Given the `u8` variant index of a pallet and call, this returns the pallet and the call variant
	/// if found, or `None` if no such call exists at those indexes.
	pub fn call_variant_by_enum_index(&self, pallet: u8, call: u8) -> Option<(&PalletMetadata, &VariantDef)> {
		let pallet = self.pallet_by_index(pallet)?;
		Some((pallet, self.variant_by_index(pallet.calls?, call)?))
	}

	pub fn event_variant_by_enum_index(&self, pallet: u8, event: u8) -> Option<(&PalletMetadata, &VariantDef)> {
		let pallet = self.pallet_by_event_index(pallet)?;
		Some((pallet, self.variant_by_index(pallet.event?, event)?))
	}

	pub fn error_variant_by_enum_index(&self, pallet: u8, error: u8) -> Option<(&PalletMetadata, &VariantDef)> {
		let pallet = self.pallet_by_index(pallet)?;
		Some((pallet, self.variant_by_index(pallet.error?, error)?))
	}

	/// Find a storage entry by pallet and entry name.
	pub fn storage_entry(&self, pallet: &str, entry: &str) -> Option<(&PalletStorage, &StorageEntryMetadata)> {
		let storage = self.pallet_by_name(pallet)?.storage.as_ref()?;
		let entry = storage.entries.iter().find(|e| e.name == entry)?;
		Some((storage, entry))
	}

	/// In order to generate a lookup table to decode storage entries, we need to be able to
	/// iterate over them along with a stable location for each.
	pub(crate) fn storage_entries(&self) -> impl Iterator<Item = (StorageLocation, &PalletStorage, &StorageEntryMetadata)> {
		self.pallets.iter().enumerate().flat_map(|(pallet_index, pallet)| {
			pallet.storage.iter().flat_map(move |storage| {
				storage.entries.iter().enumerate().map(move |(entry_index, entry)| {
					(StorageLocation { pallet_index, entry_index }, storage, entry)
				})
			})
		})
	}

	/// Retrieve the storage entry at a location handed out by [`Metadata::storage_entries`].
	pub(crate) fn storage_entry_at(&self, loc: StorageLocation) -> Option<(&PalletStorage, &StorageEntryMetadata)> {
		let storage = self.pallets.get(loc.pallet_index)?.storage.as_ref()?;
		Some((storage, storage.entries.get(loc.entry_index)?))
	}

	fn variant_by_index(&self, ty: TypeId, index: u8) -> Option<&VariantDef> {
		self.types.variants(ty)?.iter().find(|v| v.index == index)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PalletMetadata {
	pub name: String,
	/// The index calls and module errors are addressed with.
	pub index: u8,
	/// The index events are addressed with. Identical to `index` from V12 onwards.
	pub event_index: u8,
	pub storage: Option<PalletStorage>,
	pub calls: Option<TypeId>,
	pub event: Option<TypeId>,
	pub error: Option<TypeId>,
	pub constants: Vec<ConstantMetadata>,
	pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PalletStorage {
	/// The storage prefix (normally identical to the pallet name,
	/// although they are distinct values in the metadata).
	pub prefix: String,
	pub entries: Vec<StorageEntryMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageEntryMetadata {
	pub name: String,
	pub modifier: StorageEntryModifier,
	pub ty: StorageEntryType,
	/// SCALE encoded value returned when nothing is stored under a `Default` entry.
	pub default: Vec<u8>,
	pub docs: Vec<String>,
}

impl StorageEntryMetadata {
	/// The type of the stored value.
	pub fn value_ty(&self) -> TypeId {
		match &self.ty {
			StorageEntryType::Plain(ty) => *ty,
			StorageEntryType::Map { value, .. } => *value,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StorageEntryModifier {
	Optional,
	Default,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StorageEntryType {
	Plain(TypeId),
	/// A map of one or more keys. With more than one hasher, `key` is a tuple
	/// with one element per hasher.
	Map { hashers: Vec<StorageHasher>, key: TypeId, value: TypeId },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstantMetadata {
	pub name: String,
	pub ty: TypeId,
	/// SCALE encoded value.
	pub value: Vec<u8>,
	pub docs: Vec<String>,
}

/// Information about the extrinsic format supported on the substrate node
/// that the metadata was obtained from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtrinsicMetadata {
	/// The version of the extrinsic format in use by the node.
	pub version: u8,
	pub address_ty: Option<TypeId>,
	pub call_ty: Option<TypeId>,
	pub signature_ty: Option<TypeId>,
	pub extra_ty: Option<TypeId>,
	/// Part of the extrinsic signature area can be varied to include whatever information
	/// a node decides is important. This describes that part.
	pub signed_extensions: Vec<SignedExtensionMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedExtensionMetadata {
	pub identifier: String,
	/// The type included in the extrinsic itself.
	pub ty: TypeId,
	/// The type that is only part of the signer payload.
	pub additional_signed: TypeId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeApiMetadata {
	pub name: String,
	pub methods: Vec<RuntimeApiMethodMetadata>,
	pub docs: Vec<String>,
}

impl RuntimeApiMetadata {
	pub fn method(&self, name: &str) -> Option<&RuntimeApiMethodMetadata> {
		self.methods.iter().find(|m| m.name == name)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeApiMethodMetadata {
	pub name: String,
	pub inputs: Vec<RuntimeApiParam>,
	pub output: TypeId,
	pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeApiParam {
	pub name: String,
	pub ty: TypeId,
}

/// The aggregate enums of the runtime: every pallet's calls, events and errors
/// wrapped in one variant per pallet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OuterEnums {
	pub call: Option<TypeId>,
	pub event: Option<TypeId>,
	pub error: Option<TypeId>,
}

/// An opaque location of a storage entry; see [`Metadata::storage_entry_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct StorageLocation {
	pub pallet_index: usize,
	pub entry_index: usize,
}

/// Pre-V15 metadata has no outer event enum; find it through the event records
/// that `System.Events` holds.
fn event_enum_from_system_events(types: &Lookup, pallets: &[PalletMetadata]) -> Option<TypeId> {
	let system = pallets.iter().find(|p| p.name == "System")?;
	let entry = system.storage.as_ref()?.entries.iter().find(|e| e.name == "Events")?;
	let record = match &types.resolve(entry.value_ty())?.def {
		TypeDef::Sequence(record) => *record,
		_ => return None,
	};
	types.resolve(record)?.params.iter().find(|p| p.name == "E")?.ty
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::lookup::{Field, PrimitiveKind};

	fn pallet(name: &str, index: u8, calls: Option<TypeId>) -> PalletMetadata {
		PalletMetadata {
			name: name.into(),
			index,
			event_index: index,
			storage: None,
			calls,
			event: None,
			error: None,
			constants: vec![],
			docs: vec![],
		}
	}

	fn extrinsic() -> ExtrinsicMetadata {
		ExtrinsicMetadata {
			version: 4,
			address_ty: None,
			call_ty: None,
			signature_ty: None,
			extra_ty: None,
			signed_extensions: vec![],
		}
	}

	#[test]
	fn call_types_must_be_variants() {
		let mut types = Lookup::new();
		let u8_ty = types.add(vec![], TypeDef::Primitive(PrimitiveKind::U8));
		let calls = types.add(
			vec!["Call".into()],
			TypeDef::Variant(vec![VariantDef::new("remark", 7, vec![Field::named("n", u8_ty)])]),
		);

		let meta = Metadata::from_parts(
			14,
			types.clone(),
			vec![pallet("System", 0, None), pallet("Foo", 5, Some(calls))],
			extrinsic(),
			vec![],
			OuterEnums::default(),
		)
		.unwrap();

		let (p, call) = meta.call_variant_by_enum_index(5, 7).unwrap();
		assert_eq!((p.name.as_str(), call.name()), ("Foo", "remark"));
		assert!(meta.call_variant_by_enum_index(5, 8).is_none());
		assert!(meta.call_variant_by_enum_index(0, 0).is_none());
		assert_eq!(meta.pallet_by_name("System").map(|p| p.index), Some(0));

		let err = Metadata::from_parts(
			14,
			types,
			vec![pallet("Foo", 5, Some(u8_ty))],
			extrinsic(),
			vec![],
			OuterEnums::default(),
		)
		.unwrap_err();
		assert!(matches!(err, MetadataError::ExpectedVariantType { ty: 0, .. }));
	}
}
