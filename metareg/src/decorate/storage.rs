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

use super::decode_all;
use crate::Error;
use metareg_core::{
	decoder::{self, StorageDecoder, StorageEntry},
	encoder,
	metadata::{PalletMetadata, StorageEntryModifier, StorageEntryType},
	Metadata, TypeId, Value,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// A single storage entry of a pallet.
#[derive(Debug, Clone)]
pub struct StorageItem {
	metadata: Arc<Metadata>,
	decoder: Arc<OnceCell<StorageDecoder>>,
	pub pallet: String,
	pub prefix: String,
	pub name: String,
	pub modifier: StorageEntryModifier,
	pub ty: StorageEntryType,
	pub default: Vec<u8>,
	pub docs: Vec<String>,
}

pub(super) fn decorate(
	metadata: &Arc<Metadata>,
	decoder: &Arc<OnceCell<StorageDecoder>>,
	pallet: &PalletMetadata,
) -> Vec<StorageItem> {
	let Some(storage) = &pallet.storage else {
		return Vec::new();
	};
	storage
		.entries
		.iter()
		.map(|entry| StorageItem {
			metadata: metadata.clone(),
			decoder: decoder.clone(),
			pallet: pallet.name.clone(),
			prefix: storage.prefix.clone(),
			name: entry.name.clone(),
			modifier: entry.modifier,
			ty: entry.ty.clone(),
			default: entry.default.clone(),
			docs: entry.docs.clone(),
		})
		.collect()
}

impl StorageItem {
	/// The type of the stored value.
	pub fn value_ty(&self) -> TypeId {
		match &self.ty {
			StorageEntryType::Plain(ty) => *ty,
			StorageEntryType::Map { value, .. } => *value,
		}
	}

	/// The number of keys needed to address a single value.
	pub fn key_count(&self) -> usize {
		match &self.ty {
			StorageEntryType::Plain(_) => 0,
			StorageEntryType::Map { hashers, .. } => hashers.len(),
		}
	}

	/// The full key of one value. Plain entries take no keys.
	pub fn key<T>(&self, keys: &[Value<T>]) -> Result<Vec<u8>, Error> {
		Ok(encoder::storage_key(&self.metadata, &self.pallet, &self.name, keys)?)
	}

	/// The key prefix shared by every value whose leading keys are `keys`.
	pub fn prefix<T>(&self, keys: &[Value<T>]) -> Result<Vec<u8>, Error> {
		Ok(encoder::storage_prefix(&self.metadata, &self.pallet, &self.name, keys)?)
	}

	/// Decode a stored value. Nothing stored means the default for `Default` entries,
	/// and `None` for `Optional` ones.
	pub fn decode_value(&self, bytes: Option<&[u8]>) -> Result<Option<Value<TypeId>>, Error> {
		match (bytes, self.modifier) {
			(Some(bytes), _) => decode_all(&self.metadata, self.value_ty(), bytes).map(Some),
			(None, StorageEntryModifier::Default) => self.default_value().map(Some),
			(None, StorageEntryModifier::Optional) => Ok(None),
		}
	}

	pub fn default_value(&self) -> Result<Value<TypeId>, Error> {
		decode_all(&self.metadata, self.value_ty(), &self.default)
	}

	/// Decode a full storage key of this entry back into its parts.
	pub fn decode_key(&self, key: &[u8]) -> Result<StorageEntry<'static, 'static>, Error> {
		let decoder = self.decoder.get_or_init(|| decoder::decode_storage(&self.metadata));
		let data = &mut &*key;
		let entry = decoder.decode_key(&self.metadata, data)?;
		if entry.prefix != self.prefix || entry.name != self.name {
			return Err(Error::Mismatch { pallet: self.pallet.clone(), item: self.name.clone() });
		}
		if !data.is_empty() {
			return Err(Error::TrailingBytes(data.len()));
		}
		Ok(entry.into_owned())
	}
}
