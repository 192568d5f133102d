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
Convert V11, V12 and V13 metadata into the same [`Metadata`] that V14+ metadata decodes to.

Legacy metadata describes types only by their Rust names, so every name is resolved through
[`Definitions`] into a freshly built [`Lookup`]. Alongside the named types, we synthesize what
V14 metadata would have provided: a variant type for the calls, events and errors of each
module, and outer `Call`, `Event` and `RuntimeError` enums wrapping those.
*/

mod version_11;
mod version_12;
mod version_13;

use crate::{
	builder::{TypeBuilder, TypeError},
	definitions::Definitions,
	LegacyError,
};
use codec::Decode;
use frame_metadata::{decode_different::DecodeDifferent, RuntimeMetadata, RuntimeMetadataPrefixed, META_RESERVED};
use metareg_common::StorageHasher;
use metareg_core::{
	lookup::{Field, Lookup, TypeDef, VariantDef},
	metadata::{
		ConstantMetadata, ExtrinsicMetadata, OuterEnums, PalletMetadata, PalletStorage, SignedExtensionMetadata,
		StorageEntryMetadata, StorageEntryModifier, StorageEntryType,
	},
	Metadata, TypeId,
};
use std::collections::HashMap;

/// Decode SCALE encoded metadata of any version we support. Legacy metadata
/// resolves its type names through `definitions`.
pub fn from_bytes(bytes: &[u8], definitions: &Definitions) -> Result<Metadata, LegacyError> {
	let meta = RuntimeMetadataPrefixed::decode(&mut &*bytes)?;
	if meta.0 != META_RESERVED {
		return Err(LegacyError::InvalidPrefix);
	}
	from_runtime_metadata(meta.1, definitions)
}

/// Convert runtime metadata into our Metadata. V14 and V15 metadata carries its own
/// types, so `definitions` are only consulted for V11 to V13.
pub fn from_runtime_metadata(metadata: RuntimeMetadata, definitions: &Definitions) -> Result<Metadata, LegacyError> {
	match metadata {
		RuntimeMetadata::V11(meta) => {
			log::trace!("V11 metadata found.");
			version_11::decode(meta, definitions)
		}
		RuntimeMetadata::V12(meta) => {
			log::trace!("V12 metadata found.");
			version_12::decode(meta, definitions)
		}
		RuntimeMetadata::V13(meta) => {
			log::trace!("V13 metadata found.");
			version_13::decode(meta, definitions)
		}
		current @ (RuntimeMetadata::V14(_) | RuntimeMetadata::V15(_)) => Ok(Metadata::from_runtime_metadata(current)?),
		unsupported => Err(LegacyError::UnsupportedVersion(unsupported.version())),
	}
}

fn convert<B: 'static, O: 'static>(dd: DecodeDifferent<B, O>) -> Result<O, LegacyError> {
	match dd {
		DecodeDifferent::Decoded(value) => Ok(value),
		_ => Err(LegacyError::ExpectedDecoded),
	}
}

// What each legacy version is converted to before types are resolved. Names are
// still exactly as the metadata gives them.

struct Module {
	name: String,
	/// Not present before V12.
	index: Option<u8>,
	storage: Option<ModuleStorage>,
	calls: Option<Vec<Function>>,
	events: Option<Vec<Event>>,
	constants: Vec<Constant>,
	errors: Vec<ModuleError>,
}

struct ModuleStorage {
	prefix: String,
	entries: Vec<StorageEntry>,
}

struct StorageEntry {
	name: String,
	modifier: StorageEntryModifier,
	ty: StorageEntryKind,
	default: Vec<u8>,
	docs: Vec<String>,
}

enum StorageEntryKind {
	Plain(String),
	/// Every map flavour: one key per hasher.
	Map { hashers: Vec<StorageHasher>, keys: Vec<String>, value: String },
}

struct Function {
	name: String,
	arguments: Vec<(String, String)>,
	docs: Vec<String>,
}

struct Event {
	name: String,
	arguments: Vec<String>,
	docs: Vec<String>,
}

struct Constant {
	name: String,
	ty: String,
	value: Vec<u8>,
	docs: Vec<String>,
}

struct ModuleError {
	name: String,
	docs: Vec<String>,
}

struct Extrinsic {
	version: u8,
	signed_extensions: Vec<String>,
}

/// The types that a signed extension adds to the extrinsic and to the signer payload.
fn signed_extension_types(identifier: &str) -> (&'static str, &'static str) {
	match identifier {
		"CheckSpecVersion" | "CheckTxVersion" | "CheckVersion" => ("()", "u32"),
		"CheckGenesis" => ("()", "Hash"),
		"CheckMortality" | "CheckEra" => ("Era", "Hash"),
		"CheckNonce" => ("Compact<Index>", "()"),
		"ChargeTransactionPayment" => ("Compact<Balance>", "()"),
		"CheckWeight" | "CheckNonZeroSender" | "CheckBlockGasLimit" | "PrevalidateAttests" | "LockStakingStatus"
		| "ValidateDoubleVoteReports" | "RestrictFunctionality" | "LimitParathreadCommits" => ("()", "()"),
		other => {
			log::warn!("Unknown signed extension {}; assuming it adds nothing to the extrinsic", other);
			("()", "()")
		}
	}
}

/// Resolve a name, standing in a placeholder if nothing defines it. One unknown type
/// shouldn't make the rest of the metadata unusable.
fn resolve(builder: &mut TypeBuilder, ty: &str) -> Result<TypeId, LegacyError> {
	match builder.resolve(ty) {
		Ok(id) => Ok(id),
		Err(TypeError::UnknownType(_) | TypeError::Parse(_)) => Ok(builder.placeholder(ty)),
		Err(e) => Err(e.into()),
	}
}

/// Index and event index of each module. From V12 both are the module index. Before that,
/// calls are indexed by position among the modules that have calls, and events by
/// position among the modules that have events; modules without either are numbered after those.
fn module_indexes(modules: &[Module]) -> Vec<(u8, u8)> {
	let with_calls = modules.iter().filter(|m| m.calls.is_some()).count();
	let with_events = modules.iter().filter(|m| m.events.is_some()).count();
	let (mut calls, mut no_calls, mut events, mut no_events) = (0, with_calls, 0, with_events);
	modules
		.iter()
		.map(|m| match m.index {
			Some(index) => (index, index),
			None => (
				if m.calls.is_some() { take(&mut calls) } else { take(&mut no_calls) },
				if m.events.is_some() { take(&mut events) } else { take(&mut no_events) },
			),
		})
		.collect()
}

fn take(counter: &mut usize) -> u8 {
	let index = *counter as u8;
	*counter += 1;
	index
}

fn into_metadata(
	version: u32,
	modules: Vec<Module>,
	extrinsic: Extrinsic,
	definitions: &Definitions,
) -> Result<Metadata, LegacyError> {
	let mut lookup = Lookup::new();
	let mut cache = HashMap::new();
	let mut builder = TypeBuilder::new(&mut lookup, &mut cache).with_definitions(definitions);

	// Calls may contain calls (`Box<<T as Trait>::Call>`) and event records refer to the
	// outer event, so both exist before anything else is resolved.
	let outer_call = builder.reserve("Call");
	let outer_event = builder.reserve("Event");

	let indexes = module_indexes(&modules);
	let mut pallets = Vec::with_capacity(modules.len());
	for (module, (index, event_index)) in modules.into_iter().zip(indexes) {
		pallets.push(pallet(&mut builder, module, index, event_index)?);
	}

	let wrap = |pallet: &PalletMetadata, ty: Option<TypeId>, index: u8| {
		ty.map(|ty| VariantDef::new(pallet.name.as_str(), index, vec![Field::unnamed(ty)]))
	};
	let calls = pallets.iter().filter_map(|p| wrap(p, p.calls, p.index)).collect();
	let events = pallets.iter().filter_map(|p| wrap(p, p.event, p.event_index)).collect();
	let errors = pallets.iter().filter_map(|p| wrap(p, p.error, p.index)).collect();
	builder.fill(outer_call, TypeDef::Variant(calls))?;
	builder.fill(outer_event, TypeDef::Variant(events))?;
	let outer_error = builder.add(vec!["RuntimeError".into()], TypeDef::Variant(errors));

	let mut signed_extensions = Vec::with_capacity(extrinsic.signed_extensions.len());
	for identifier in extrinsic.signed_extensions {
		let (ty, additional_signed) = signed_extension_types(&identifier);
		let ty = resolve(&mut builder, ty)?;
		let additional_signed = resolve(&mut builder, additional_signed)?;
		signed_extensions.push(SignedExtensionMetadata { identifier, ty, additional_signed });
	}
	let extra_ty = builder.add(vec![], TypeDef::Tuple(signed_extensions.iter().map(|e| e.ty).collect()));
	let extrinsic = ExtrinsicMetadata {
		version: extrinsic.version,
		address_ty: Some(resolve(&mut builder, "Address")?),
		call_ty: Some(outer_call),
		signature_ty: Some(resolve(&mut builder, "ExtrinsicSignature")?),
		extra_ty: Some(extra_ty),
		signed_extensions,
	};
	let outer_enums = OuterEnums { call: Some(outer_call), event: Some(outer_event), error: Some(outer_error) };

	Ok(Metadata::from_parts(version, lookup, pallets, extrinsic, Vec::new(), outer_enums)?)
}

fn pallet(builder: &mut TypeBuilder, module: Module, index: u8, event_index: u8) -> Result<PalletMetadata, LegacyError> {
	let path = |kind: &str| vec![module.name.clone(), kind.to_string()];

	let calls = match &module.calls {
		Some(calls) => {
			let mut variants = Vec::with_capacity(calls.len());
			for (i, call) in calls.iter().enumerate() {
				let mut fields = Vec::with_capacity(call.arguments.len());
				for (name, ty) in &call.arguments {
					fields.push(Field::named(name.as_str(), resolve(builder, ty)?).with_type_name(ty.as_str()));
				}
				variants.push(VariantDef { name: call.name.clone(), index: i as u8, fields, docs: call.docs.clone() });
			}
			Some(builder.add(path("Call"), TypeDef::Variant(variants)))
		}
		None => None,
	};

	let event = match &module.events {
		Some(events) => {
			let mut variants = Vec::with_capacity(events.len());
			for (i, event) in events.iter().enumerate() {
				let mut fields = Vec::with_capacity(event.arguments.len());
				for ty in &event.arguments {
					fields.push(Field::unnamed(resolve(builder, ty)?).with_type_name(ty.as_str()));
				}
				variants.push(VariantDef { name: event.name.clone(), index: i as u8, fields, docs: event.docs.clone() });
			}
			Some(builder.add(path("Event"), TypeDef::Variant(variants)))
		}
		None => None,
	};

	let error = if module.errors.is_empty() {
		None
	} else {
		let variants = module
			.errors
			.iter()
			.enumerate()
			.map(|(i, e)| VariantDef { name: e.name.clone(), index: i as u8, fields: Vec::new(), docs: e.docs.clone() })
			.collect();
		Some(builder.add(path("Error"), TypeDef::Variant(variants)))
	};

	let storage = match module.storage {
		Some(storage) => {
			let mut entries = Vec::with_capacity(storage.entries.len());
			for entry in storage.entries {
				entries.push(storage_entry(builder, entry)?);
			}
			Some(PalletStorage { prefix: storage.prefix, entries })
		}
		None => None,
	};

	let mut constants = Vec::with_capacity(module.constants.len());
	for constant in module.constants {
		let ty = resolve(builder, &constant.ty)?;
		constants.push(ConstantMetadata { name: constant.name, ty, value: constant.value, docs: constant.docs });
	}

	Ok(PalletMetadata {
		name: module.name,
		index,
		event_index,
		storage,
		calls,
		event,
		error,
		constants,
		docs: Vec::new(),
	})
}

fn storage_entry(builder: &mut TypeBuilder, entry: StorageEntry) -> Result<StorageEntryMetadata, LegacyError> {
	let ty = match entry.ty {
		StorageEntryKind::Plain(ty) => StorageEntryType::Plain(resolve(builder, &ty)?),
		StorageEntryKind::Map { hashers, keys, value } => {
			let mut key_tys = Vec::with_capacity(keys.len());
			for key in &keys {
				key_tys.push(resolve(builder, key)?);
			}
			let key = match key_tys.as_slice() {
				[key] => *key,
				_ => builder.add(vec![], TypeDef::Tuple(key_tys)),
			};
			StorageEntryType::Map { hashers, key, value: resolve(builder, &value)? }
		}
	};
	Ok(StorageEntryMetadata { name: entry.name, modifier: entry.modifier, ty, default: entry.default, docs: entry.docs })
}
