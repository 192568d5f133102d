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

//! Decode and encode SCALE values, extrinsics and storage keys for substrate based chains,
//! driven entirely by the type information in V14+ metadata.
//!
//! - [`lookup`] holds the type information itself, addressed by [`TypeId`].
//! - [`value`] and [`codec`] turn SCALE bytes into [`Value`]s and back again.
//! - [`metadata`] normalizes the metadata of a runtime into one shape.
//! - [`decoder`] and [`encoder`] deal with extrinsics, signer payloads and storage keys.

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod lookup;
pub mod metadata;
pub mod value;

#[cfg(test)]
mod test_utils;

pub use lookup::{Lookup, TypeId};
pub use metadata::Metadata;
pub use value::{Value, ValueDef};

/// A re-export of the [`scale_info`] crate, since V14+ metadata hands its types to us in that form.
pub use scale_info;
