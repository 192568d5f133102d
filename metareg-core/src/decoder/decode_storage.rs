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

use super::DecodeValueError;
use crate::lookup::{TypeDef, TypeId};
use crate::metadata::{Metadata, StorageEntryType, StorageLocation};
use crate::value::Value;
use metareg_common::{twox_128, StorageHasher};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;

/// This struct is capable of decoding SCALE encoded storage keys, given the [`Metadata`]
/// it was generated from. See [`super::decode_storage`] to build one.
#[derive(Debug, Clone)]
pub struct StorageDecoder {
	entries_by_hashed_prefix: HashMap<[u8; 16], StorageEntries>,
}

#[derive(Debug, Clone)]
struct StorageEntries {
	/// Within this pallet/prefix, we can find the location of each storage entry
	/// if we know the twox_128 hash of its name:
	entry_by_hashed_name: HashMap<[u8; 16], StorageLocation>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StorageDecodeError {
	#[error("Not enough bytes in the input data to decode the storage prefix and name; got {0} bytes but expected 32")]
	NotEnoughBytesForPrefixAndName(usize),
	#[error("Not enough bytes left for the {hasher} hash of key {key}")]
	NotEnoughBytesForHash { hasher: StorageHasher, key: usize },
	#[error("Expecting the same number of keys and hashers, but got {num_keys} keys and {num_hashers} hashers")]
	KeysAndHashersDontLineUp { num_keys: usize, num_hashers: usize },
	#[error("Type with id {0} expected in the metadata but not found")]
	TypeNotFound(u32),
	#[error("Couldn't decode the value associated with the hasher {0}: {1}")]
	CouldNotDecodeHasherValue(StorageHasher, DecodeValueError),
	#[error("Couldn't find a storage entry corresponding to the prefix hash provided in the data")]
	PrefixNotFound,
	#[error("Couldn't find a storage entry corresponding to the name hash provided in the data")]
	NameNotFound,
}

impl StorageDecoder {
	/// Call [`super::decode_storage`] to construct a [`StorageDecoder`].
	pub(super) fn generate_from_metadata(metadata: &Metadata) -> StorageDecoder {
		let mut entries_by_hashed_prefix: HashMap<[u8; 16], StorageEntries> = HashMap::new();
		for (location, storage, entry) in metadata.storage_entries() {
			entries_by_hashed_prefix
				.entry(twox_128(storage.prefix.as_bytes()))
				.or_insert_with(|| StorageEntries { entry_by_hashed_name: HashMap::new() })
				.entry_by_hashed_name
				.insert(twox_128(entry.name.as_bytes()), location);
		}
		StorageDecoder { entries_by_hashed_prefix }
	}

	/// Decode the SCALE encoded bytes representing a storage entry lookup. These conceptually take the
	/// form `twox_128(prefix) + twox_128(name) + rest`, where `rest` is one hash (optionally followed
	/// by the SCALE encoded key itself) per map key.
	pub fn decode_key<'m, 'b>(
		&self,
		metadata: &'m Metadata,
		bytes: &mut &'b [u8],
	) -> Result<StorageEntry<'m, 'b>, StorageDecodeError> {
		let location = self.decode_prefix_and_name_to_location(bytes)?;
		let (storage, entry) = metadata.storage_entry_at(location).ok_or(StorageDecodeError::NameNotFound)?;

		let (hashers, key, value) = match &entry.ty {
			// No more work to do here; our storage entry is a plain prefix+name entry.
			StorageEntryType::Plain(ty) => {
				return Ok(StorageEntry {
					prefix: Cow::Borrowed(&storage.prefix),
					name: Cow::Borrowed(&entry.name),
					ty: *ty,
					details: StorageEntryDetails::Plain,
				})
			}
			StorageEntryType::Map { hashers, key, value } => (hashers, *key, *value),
		};

		let keys = storage_map_key_to_type_id_vec(metadata, key, hashers.len())?;
		if keys.len() != hashers.len() {
			return Err(StorageDecodeError::KeysAndHashersDontLineUp {
				num_keys: keys.len(),
				num_hashers: hashers.len(),
			});
		}

		// Work through the hashers and type info we have to generate our output
		// data, and consume bytes from the input cursor as we go.
		let mut storage_keys = Vec::with_capacity(keys.len());
		for (n, (hasher, ty)) in hashers.iter().zip(keys).enumerate() {
			let hash_len = hasher.hash_len();
			if bytes.len() < hash_len {
				return Err(StorageDecodeError::NotEnoughBytesForHash { hasher: *hasher, key: n });
			}

			// Don't consume our `bytes` here; decode from a new cursor and count the length
			// of the value, so that the input is only moved forwards in one place below.
			let (value, consumed) = if hasher.is_concat() {
				let value_bytes = &mut &bytes[hash_len..];
				let start_len = value_bytes.len();
				let value = super::decode_value_by_id(metadata, ty, value_bytes)
					.map_err(|e| StorageDecodeError::CouldNotDecodeHasherValue(*hasher, e))?;
				(Some(value), hash_len + start_len - value_bytes.len())
			} else {
				(None, hash_len)
			};

			let (key_bytes, rest) = bytes.split_at(consumed);
			*bytes = rest;
			storage_keys.push(StorageMapKey { bytes: Cow::Borrowed(key_bytes), ty, hasher: *hasher, value });
		}

		Ok(StorageEntry {
			prefix: Cow::Borrowed(&storage.prefix),
			name: Cow::Borrowed(&entry.name),
			ty: value,
			details: StorageEntryDetails::Map(storage_keys),
		})
	}

	// Reverse the prefix+name hashing (which takes the form of `twox_128(prefix) + twox_128(name)`)
	// into a specific storage location, which we can lookup in the Metadata to decode the remaining
	// bytes.
	fn decode_prefix_and_name_to_location(&self, data: &mut &[u8]) -> Result<StorageLocation, StorageDecodeError> {
		if data.len() < 32 {
			return Err(StorageDecodeError::NotEnoughBytesForPrefixAndName(data.len()));
		}
		let mut prefix_hash = [0u8; 16];
		prefix_hash.copy_from_slice(&data[..16]);
		let mut name_hash = [0u8; 16];
		name_hash.copy_from_slice(&data[16..32]);

		let entries = self.entries_by_hashed_prefix.get(&prefix_hash).ok_or(StorageDecodeError::PrefixNotFound)?;
		let location = entries.entry_by_hashed_name.get(&name_hash).ok_or(StorageDecodeError::NameNotFound)?;

		// Successfully consumed the prefix and name bytes, so move our cursor.
		// In the case of errors, we leave the data "unconsumed".
		*data = &data[32..];
		Ok(*location)
	}
}

// Storage maps list one hasher per key, and a single key type. With more than
// one hasher that key type is a tuple holding the individual keys.
fn storage_map_key_to_type_id_vec(
	metadata: &Metadata,
	key: TypeId,
	num_hashers: usize,
) -> Result<Vec<TypeId>, StorageDecodeError> {
	if num_hashers == 1 {
		return Ok(vec![key]);
	}
	let key_ty = metadata.types().resolve(key).ok_or(StorageDecodeError::TypeNotFound(key.id()))?;
	match &key_ty.def {
		TypeDef::Tuple(ids) => Ok(ids.clone()),
		_ => Ok(vec![key]),
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageEntry<'m, 'b> {
	pub prefix: Cow<'m, str>,
	pub name: Cow<'m, str>,
	/// The type of the value stored at this location.
	pub ty: TypeId,
	pub details: StorageEntryDetails<'b>,
}

impl<'m, 'b> StorageEntry<'m, 'b> {
	pub fn into_owned(self) -> StorageEntry<'static, 'static> {
		StorageEntry {
			prefix: Cow::Owned(self.prefix.into_owned()),
			name: Cow::Owned(self.name.into_owned()),
			ty: self.ty,
			details: self.details.into_owned(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StorageEntryDetails<'b> {
	Plain,
	Map(Vec<StorageMapKey<'b>>),
}

impl<'b> StorageEntryDetails<'b> {
	pub fn into_owned(self) -> StorageEntryDetails<'static> {
		match self {
			Self::Plain => StorageEntryDetails::Plain,
			Self::Map(keys) => StorageEntryDetails::Map(keys.into_iter().map(|k| k.into_owned()).collect()),
		}
	}

	/// The map keys, or nothing for plain entries.
	pub fn map_keys(&self) -> &[StorageMapKey<'b>] {
		match self {
			Self::Plain => &[],
			Self::Map(keys) => keys,
		}
	}
}

/// One key of a storage map lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageMapKey<'b> {
	/// The hash bytes, followed by the encoded key for concat hashers.
	pub bytes: Cow<'b, [u8]>,
	pub ty: TypeId,
	pub hasher: StorageHasher,
	/// The decoded key, for hashers that keep it.
	pub value: Option<Value<TypeId>>,
}

impl<'b> StorageMapKey<'b> {
	pub fn into_owned(self) -> StorageMapKey<'static> {
		StorageMapKey { bytes: Cow::Owned(self.bytes.into_owned()), ty: self.ty, hasher: self.hasher, value: self.value }
	}
}
