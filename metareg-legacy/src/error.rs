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

use crate::{builder::TypeError, definitions::DefinitionsError};
use metareg_core::metadata::MetadataError;

/// Everything that can go wrong turning legacy metadata into [`metareg_core::Metadata`].
#[derive(Debug, thiserror::Error)]
pub enum LegacyError {
	#[error("metadata version {0} is not supported")]
	UnsupportedVersion(u32),
	#[error("metadata does not start with the expected magic number")]
	InvalidPrefix,
	#[error("expected metadata in its decoded form")]
	ExpectedDecoded,
	#[error("{0}")]
	Codec(#[from] codec::Error),
	#[error(transparent)]
	Type(#[from] TypeError),
	#[error(transparent)]
	Definitions(#[from] DefinitionsError),
	#[error(transparent)]
	Metadata(#[from] MetadataError),
}
