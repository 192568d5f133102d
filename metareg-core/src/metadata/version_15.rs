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

use super::version_14::hasher;
use super::{
	ConstantMetadata, ExtrinsicMetadata, Metadata, MetadataError, OuterEnums, PalletMetadata, PalletStorage,
	RuntimeApiMetadata, RuntimeApiMethodMetadata, RuntimeApiParam, SignedExtensionMetadata, StorageEntryMetadata,
	StorageEntryModifier, StorageEntryType,
};
use crate::lookup::Lookup;
use frame_metadata::v15::{self, RuntimeMetadataV15};
use scale_info::form::PortableForm;

/// Decode V15 metadata into our general Metadata struct. Unlike V14, the extrinsic
/// parts, runtime APIs and outer enums are all spelled out.
pub fn decode(meta: RuntimeMetadataV15) -> Result<Metadata, MetadataError> {
	let types = Lookup::from_portable(&meta.types)?;
	let pallets = meta.pallets.into_iter().map(pallet).collect();

	let ext = meta.extrinsic;
	let extrinsic = ExtrinsicMetadata {
		version: ext.version,
		address_ty: Some(ext.address_ty.id.into()),
		call_ty: Some(ext.call_ty.id.into()),
		signature_ty: Some(ext.signature_ty.id.into()),
		extra_ty: Some(ext.extra_ty.id.into()),
		signed_extensions: ext
			.signed_extensions
			.into_iter()
			.map(|s| SignedExtensionMetadata {
				identifier: s.identifier,
				ty: s.ty.id.into(),
				additional_signed: s.additional_signed.id.into(),
			})
			.collect(),
	};

	let apis = meta.apis.into_iter().map(runtime_api).collect();
	let outer_enums = OuterEnums {
		call: Some(meta.outer_enums.call_enum_ty.id.into()),
		event: Some(meta.outer_enums.event_enum_ty.id.into()),
		error: Some(meta.outer_enums.error_enum_ty.id.into()),
	};

	Metadata::from_parts(15, types, pallets, extrinsic, apis, outer_enums)
}

fn pallet(pallet: v15::PalletMetadata<PortableForm>) -> PalletMetadata {
	PalletMetadata {
		name: pallet.name,
		index: pallet.index,
		event_index: pallet.index,
		storage: pallet.storage.map(|s| PalletStorage {
			prefix: s.prefix,
			entries: s.entries.into_iter().map(storage_entry).collect(),
		}),
		calls: pallet.calls.map(|c| c.ty.id.into()),
		event: pallet.event.map(|e| e.ty.id.into()),
		error: pallet.error.map(|e| e.ty.id.into()),
		constants: pallet
			.constants
			.into_iter()
			.map(|c| ConstantMetadata { name: c.name, ty: c.ty.id.into(), value: c.value, docs: c.docs })
			.collect(),
		docs: pallet.docs,
	}
}

fn storage_entry(entry: v15::StorageEntryMetadata<PortableForm>) -> StorageEntryMetadata {
	let ty = match entry.ty {
		v15::StorageEntryType::Plain(ty) => StorageEntryType::Plain(ty.id.into()),
		v15::StorageEntryType::Map { hashers, key, value } => StorageEntryType::Map {
			hashers: hashers.iter().map(hasher).collect(),
			key: key.id.into(),
			value: value.id.into(),
		},
	};
	let modifier = match entry.modifier {
		v15::StorageEntryModifier::Optional => StorageEntryModifier::Optional,
		v15::StorageEntryModifier::Default => StorageEntryModifier::Default,
	};
	StorageEntryMetadata { name: entry.name, modifier, ty, default: entry.default, docs: entry.docs }
}

fn runtime_api(api: v15::RuntimeApiMetadata<PortableForm>) -> RuntimeApiMetadata {
	RuntimeApiMetadata {
		name: api.name,
		methods: api
			.methods
			.into_iter()
			.map(|m| RuntimeApiMethodMetadata {
				name: m.name,
				inputs: m.inputs.into_iter().map(|i| RuntimeApiParam { name: i.name, ty: i.ty.id.into() }).collect(),
				output: m.output.id.into(),
				docs: m.docs,
			})
			.collect(),
		docs: api.docs,
	}
}
