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

use super::{
	event_enum_from_system_events, ConstantMetadata, ExtrinsicMetadata, Metadata, MetadataError, OuterEnums,
	PalletMetadata, PalletStorage, SignedExtensionMetadata, StorageEntryMetadata, StorageEntryModifier,
	StorageEntryType,
};
use crate::lookup::{Lookup, TypeId};
use frame_metadata::v14;
use frame_metadata::v14::RuntimeMetadataV14;
use metareg_common::StorageHasher;
use scale_info::form::PortableForm;

/// Decode V14 metadata into our general Metadata struct
pub fn decode(meta: RuntimeMetadataV14) -> Result<Metadata, MetadataError> {
	let types = Lookup::from_portable(&meta.types)?;
	let pallets: Vec<_> = meta.pallets.into_iter().map(pallet).collect();

	// V14 only names the extrinsic type; the parts we need are its type parameters.
	let extrinsic_ty = TypeId::from(meta.extrinsic.ty.id);
	let param = |name: &str| {
		types.resolve(extrinsic_ty).and_then(|ty| ty.params.iter().find(|p| p.name == name)).and_then(|p| p.ty)
	};
	let extrinsic = ExtrinsicMetadata {
		version: meta.extrinsic.version,
		address_ty: param("Address"),
		call_ty: param("Call"),
		signature_ty: param("Signature"),
		extra_ty: param("Extra"),
		signed_extensions: meta.extrinsic.signed_extensions.into_iter().map(signed_extension).collect(),
	};
	let outer_enums =
		OuterEnums { call: extrinsic.call_ty, event: event_enum_from_system_events(&types, &pallets), error: None };

	Metadata::from_parts(14, types, pallets, extrinsic, Vec::new(), outer_enums)
}

fn pallet(pallet: v14::PalletMetadata<PortableForm>) -> PalletMetadata {
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
		constants: pallet.constants.into_iter().map(constant).collect(),
		docs: Vec::new(),
	}
}

fn storage_entry(entry: v14::StorageEntryMetadata<PortableForm>) -> StorageEntryMetadata {
	let ty = match entry.ty {
		v14::StorageEntryType::Plain(ty) => StorageEntryType::Plain(ty.id.into()),
		v14::StorageEntryType::Map { hashers, key, value } => StorageEntryType::Map {
			hashers: hashers.iter().map(hasher).collect(),
			key: key.id.into(),
			value: value.id.into(),
		},
	};
	let modifier = match entry.modifier {
		v14::StorageEntryModifier::Optional => StorageEntryModifier::Optional,
		v14::StorageEntryModifier::Default => StorageEntryModifier::Default,
	};
	StorageEntryMetadata { name: entry.name, modifier, ty, default: entry.default, docs: entry.docs }
}

pub(super) fn hasher(hasher: &v14::StorageHasher) -> StorageHasher {
	match hasher {
		v14::StorageHasher::Blake2_128 => StorageHasher::Blake2_128,
		v14::StorageHasher::Blake2_256 => StorageHasher::Blake2_256,
		v14::StorageHasher::Blake2_128Concat => StorageHasher::Blake2_128Concat,
		v14::StorageHasher::Twox128 => StorageHasher::Twox128,
		v14::StorageHasher::Twox256 => StorageHasher::Twox256,
		v14::StorageHasher::Twox64Concat => StorageHasher::Twox64Concat,
		v14::StorageHasher::Identity => StorageHasher::Identity,
	}
}

fn constant(constant: v14::PalletConstantMetadata<PortableForm>) -> ConstantMetadata {
	ConstantMetadata { name: constant.name, ty: constant.ty.id.into(), value: constant.value, docs: constant.docs }
}

fn signed_extension(ext: v14::SignedExtensionMetadata<PortableForm>) -> SignedExtensionMetadata {
	SignedExtensionMetadata {
		identifier: ext.identifier,
		ty: ext.ty.id.into(),
		additional_signed: ext.additional_signed.id.into(),
	}
}
