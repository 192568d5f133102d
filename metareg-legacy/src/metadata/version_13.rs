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
	convert, into_metadata, Constant, Event, Extrinsic, Function, Module, ModuleError, ModuleStorage, StorageEntry,
	StorageEntryKind,
};
use crate::{definitions::Definitions, LegacyError};
use frame_metadata::v13::{self, RuntimeMetadataV13};
use metareg_common::StorageHasher;
use metareg_core::{metadata::StorageEntryModifier, Metadata};

pub(super) fn decode(meta: RuntimeMetadataV13, definitions: &Definitions) -> Result<Metadata, LegacyError> {
	let modules = convert(meta.modules)?.into_iter().map(module).collect::<Result<Vec<_>, _>>()?;
	let extrinsic = Extrinsic {
		version: meta.extrinsic.version,
		signed_extensions: meta.extrinsic.signed_extensions.into_iter().map(convert).collect::<Result<_, _>>()?,
	};
	into_metadata(13, modules, extrinsic, definitions)
}

fn module(module: v13::ModuleMetadata) -> Result<Module, LegacyError> {
	let storage = match module.storage {
		Some(storage) => {
			let storage = convert(storage)?;
			let entries = convert(storage.entries)?.into_iter().map(storage_entry).collect::<Result<_, _>>()?;
			Some(ModuleStorage { prefix: convert(storage.prefix)?, entries })
		}
		None => None,
	};
	let calls = match module.calls {
		Some(calls) => Some(convert(calls)?.into_iter().map(function).collect::<Result<_, _>>()?),
		None => None,
	};
	let events = match module.event {
		Some(events) => Some(convert(events)?.into_iter().map(event).collect::<Result<_, _>>()?),
		None => None,
	};
	let constants = convert(module.constants)?.into_iter().map(constant).collect::<Result<_, _>>()?;
	let errors = convert(module.errors)?
		.into_iter()
		.map(|e| Ok(ModuleError { name: convert(e.name)?, docs: convert(e.documentation)? }))
		.collect::<Result<_, LegacyError>>()?;

	Ok(Module {
		name: convert(module.name)?,
		index: Some(module.index),
		storage,
		calls,
		events,
		constants,
		errors,
	})
}

fn function(call: v13::FunctionMetadata) -> Result<Function, LegacyError> {
	let arguments = convert(call.arguments)?
		.into_iter()
		.map(|arg| Ok((convert(arg.name)?, convert(arg.ty)?)))
		.collect::<Result<_, LegacyError>>()?;
	Ok(Function { name: convert(call.name)?, arguments, docs: convert(call.documentation)? })
}

fn event(event: v13::EventMetadata) -> Result<Event, LegacyError> {
	Ok(Event {
		name: convert(event.name)?,
		arguments: convert(event.arguments)?,
		docs: convert(event.documentation)?,
	})
}

fn constant(constant: v13::ModuleConstantMetadata) -> Result<Constant, LegacyError> {
	Ok(Constant {
		name: convert(constant.name)?,
		ty: convert(constant.ty)?,
		value: convert(constant.value)?,
		docs: convert(constant.documentation)?,
	})
}

fn storage_entry(entry: v13::StorageEntryMetadata) -> Result<StorageEntry, LegacyError> {
	let ty = match entry.ty {
		v13::StorageEntryType::Plain(ty) => StorageEntryKind::Plain(convert(ty)?),
		v13::StorageEntryType::Map { hasher: h, key, value, .. } => {
			StorageEntryKind::Map { hashers: vec![hasher(&h)], keys: vec![convert(key)?], value: convert(value)? }
		}
		v13::StorageEntryType::DoubleMap { hasher: h1, key1, key2, value, key2_hasher: h2 } => StorageEntryKind::Map {
			hashers: vec![hasher(&h1), hasher(&h2)],
			keys: vec![convert(key1)?, convert(key2)?],
			value: convert(value)?,
		},
		v13::StorageEntryType::NMap { keys, hashers, value } => StorageEntryKind::Map {
			hashers: convert(hashers)?.iter().map(hasher).collect(),
			keys: convert(keys)?,
			value: convert(value)?,
		},
	};
	let modifier = match entry.modifier {
		v13::StorageEntryModifier::Optional => StorageEntryModifier::Optional,
		v13::StorageEntryModifier::Default => StorageEntryModifier::Default,
	};
	Ok(StorageEntry {
		name: convert(entry.name)?,
		modifier,
		ty,
		default: convert(entry.default)?,
		docs: convert(entry.documentation)?,
	})
}

fn hasher(hasher: &v13::StorageHasher) -> StorageHasher {
	match hasher {
		v13::StorageHasher::Blake2_128 => StorageHasher::Blake2_128,
		v13::StorageHasher::Blake2_256 => StorageHasher::Blake2_256,
		v13::StorageHasher::Blake2_128Concat => StorageHasher::Blake2_128Concat,
		v13::StorageHasher::Twox128 => StorageHasher::Twox128,
		v13::StorageHasher::Twox256 => StorageHasher::Twox256,
		v13::StorageHasher::Twox64Concat => StorageHasher::Twox64Concat,
		v13::StorageHasher::Identity => StorageHasher::Identity,
	}
}
