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

use crate::{Error, SpecVersion};
use metareg_core::{
	decoder::{self, Extrinsic, StorageEntry},
	Metadata,
};
use metareg_legacy::{metadata as legacy, Definitions, VersionedDefinitions};
use std::collections::HashMap;

/// Decodes extrinsics and storage keys for every runtime version it has metadata for.
pub struct Decoder {
	base: Definitions,
	versioned: VersionedDefinitions,
	metadata: HashMap<SpecVersion, Metadata>,
}

impl Decoder {
	pub fn new() -> Result<Self, Error> {
		Ok(Self::with_types(Definitions::base()?, VersionedDefinitions::default()))
	}

	/// Create a decoder that resolves the type names of pre-V14 metadata with `base`,
	/// overridden by whatever in `versioned` applies to the spec version being registered.
	pub fn with_types(base: Definitions, versioned: VersionedDefinitions) -> Self {
		Self { base, versioned, metadata: HashMap::new() }
	}

	/// Register a runtime version with the decoder.
	pub fn register_version(&mut self, version: SpecVersion, metadata: &[u8]) -> Result<(), Error> {
		let definitions = self.base.merge(&self.versioned.for_spec(version));
		let meta = legacy::from_bytes(metadata, &definitions)?;
		log::debug!("Registered spec version {} with V{} metadata", version, meta.version());
		self.metadata.insert(version, meta);
		Ok(())
	}

	pub fn has_version(&self, version: &SpecVersion) -> bool {
		self.metadata.contains_key(version)
	}

	pub fn metadata(&self, version: SpecVersion) -> Option<&Metadata> {
		self.metadata.get(&version)
	}

	/// Decode the extrinsics of a block: a compact count followed by length prefixed extrinsics.
	pub fn decode_extrinsics(&self, version: SpecVersion, mut data: &[u8]) -> Result<Vec<Extrinsic<'static>>, Error> {
		let metadata = self.version(version)?;
		match decoder::decode_extrinsics(metadata, &mut data) {
			Ok(v) => Ok(v.into_iter().map(Extrinsic::into_owned).collect()),
			Err((ext, e)) => Err(Error::Extrinsics { source: e, ext: ext.into_iter().map(Extrinsic::into_owned).collect() }),
		}
	}

	/// Decode a single length prefixed extrinsic.
	pub fn decode_extrinsic(&self, version: SpecVersion, mut data: &[u8]) -> Result<Extrinsic<'static>, Error> {
		let metadata = self.version(version)?;
		Ok(decoder::decode_extrinsic(metadata, &mut data)?.into_owned())
	}

	pub fn decode_storage_key(&self, version: SpecVersion, mut key: &[u8]) -> Result<StorageEntry<'static, 'static>, Error> {
		let metadata = self.version(version)?;
		let entry = decoder::decode_storage(metadata).decode_key(metadata, &mut key)?;
		Ok(entry.into_owned())
	}

	fn version(&self, version: SpecVersion) -> Result<&Metadata, Error> {
		self.metadata(version).ok_or(Error::SpecVersionNotFound(version))
	}
}
