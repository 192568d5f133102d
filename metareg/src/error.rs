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

use metareg_common::SpecVersion;
use metareg_core::{
	codec::{DecodeValueError, EncodeValueError},
	decoder::{DecodeError, Extrinsic, StorageDecodeError},
	encoder::EncodeError,
	metadata::MetadataError,
};
use metareg_legacy::{DefinitionsError, LegacyError, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("Decoding extrinsics failed {source}")]
	Extrinsics {
		#[source]
		source: DecodeError,
		ext: Vec<Extrinsic<'static>>,
	},
	#[error(transparent)]
	Decode(#[from] DecodeError),
	#[error(transparent)]
	DecodeValue(#[from] DecodeValueError),
	#[error(transparent)]
	EncodeValue(#[from] EncodeValueError),
	#[error(transparent)]
	Encode(#[from] EncodeError),
	#[error(transparent)]
	Storage(#[from] StorageDecodeError),
	#[error(transparent)]
	Metadata(#[from] MetadataError),
	#[error(transparent)]
	Legacy(#[from] LegacyError),
	#[error(transparent)]
	Definitions(#[from] DefinitionsError),
	#[error(transparent)]
	Type(#[from] TypeError),
	#[error("{0} bytes were left over after decoding")]
	TrailingBytes(usize),
	#[error("No metadata has been registered")]
	NoMetadata,
	#[error("Spec Version {0} not registered with decoder")]
	SpecVersionNotFound(SpecVersion),
	#[error("{0} not found in the metadata")]
	NotFound(String),
	#[error("Bytes do not belong to {pallet}.{item}")]
	Mismatch { pallet: String, item: String },
	#[error("Unexpected shape while decoding {0}")]
	UnexpectedShape(&'static str),
}
