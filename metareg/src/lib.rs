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

//! Facade crate for working with the types of any substrate runtime (metadata V11+).
//!
//! A [`Registry`] resolves type names and encodes or decodes values of those types. Once
//! it is given metadata, [`Registry::decorated`] hands out accessors for the calls,
//! events, errors, storage entries, constants and runtime APIs of that runtime. The
//! [`Decoder`] keeps metadata for many runtime versions at once.

#![forbid(unsafe_code)]

pub mod decorate;
mod decoder;
mod error;
mod registry;

pub use self::decoder::Decoder;
pub use self::error::Error;
pub use self::registry::Registry;
pub use decorate::Decorated;
pub use metareg_common::SpecVersion;
pub use metareg_core::{Metadata, TypeId, Value, ValueDef};
pub use metareg_legacy::{Definitions, VersionedDefinitions};

pub use metareg_core;
pub use metareg_legacy;
