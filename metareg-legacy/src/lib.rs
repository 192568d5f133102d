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

//! Support for chains whose metadata predates V14, and so only knows types by name.
//!
//! - [`sanitize`] and [`type_expr`] turn the Rust type names found in that metadata
//!   into something that can be looked up.
//! - [`definitions`] holds JSON type definitions, keyed by name.
//! - [`builder`] builds the named types into a [`metareg_core::Lookup`].
//! - [`metadata`] converts V11, V12 and V13 metadata into [`metareg_core::Metadata`].

#![forbid(unsafe_code)]

pub mod builder;
pub mod definitions;
mod error;
pub mod metadata;
pub mod sanitize;
pub mod type_expr;

pub use builder::{TypeBuilder, TypeError, TypeSource};
pub use definitions::{Definitions, DefinitionsError, TypeDefinition, VersionedDefinitions};
pub use error::LegacyError;
pub use type_expr::TypeExpr;
