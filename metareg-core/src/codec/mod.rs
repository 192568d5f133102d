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

//! Encode and decode [`crate::Value`]s against the types in a [`crate::Lookup`].

mod bits;
mod decode_value;
mod encode_value;

pub use decode_value::{decode_value_by_id, DecodeValueError};
pub use encode_value::{encode_value_by_id, EncodeValueError};

/// How deep values may nest before we give up. Recursive types that consume no
/// input would otherwise never terminate.
pub(crate) const MAX_DEPTH: usize = 256;
