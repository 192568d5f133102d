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

//! Split a SCALE encoded `Vec<(Compact<u32>, Extrinsic)>` into the bytes of each
//! extrinsic, without knowing anything about what those bytes contain.

use codec::{Compact, Decode};

/// An error containing the index into the byte slice at which splitting failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Expected a compact length prefixed extrinsic at byte index {index}, but did not find one")]
pub struct ExtrinsicBytesError {
	pub index: usize,
}

/// The length prefixed extrinsics in a block body. Running out of bytes before the
/// advertised count has been reached is an error.
#[derive(Debug, Clone)]
pub struct ExtrinsicChunks<'a> {
	advertised: usize,
	remaining: usize,
	data: &'a [u8],
	offset: usize,
	failed: bool,
}

impl<'a> ExtrinsicChunks<'a> {
	pub fn new(data: &'a [u8]) -> Result<ExtrinsicChunks<'a>, ExtrinsicBytesError> {
		let cursor = &mut &*data;
		let count = <Compact<u32>>::decode(cursor).map_err(|_| ExtrinsicBytesError { index: 0 })?.0 as usize;
		let offset = data.len() - cursor.len();
		Ok(ExtrinsicChunks { advertised: count, remaining: count, data, offset, failed: false })
	}

	/// The number of extrinsics the input claims to hold.
	pub fn len(&self) -> usize {
		self.advertised
	}

	/// Everything after the last extrinsic handed out, or from the point of failure.
	pub fn remaining_bytes(&self) -> &'a [u8] {
		&self.data[self.offset..]
	}
}

impl<'a> Iterator for ExtrinsicChunks<'a> {
	type Item = Result<&'a [u8], ExtrinsicBytesError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.failed || self.remaining == 0 {
			return None;
		}
		if self.offset >= self.data.len() {
			self.failed = true;
			return Some(Err(ExtrinsicBytesError { index: self.data.len() }));
		}
		self.remaining -= 1;

		let cursor = &mut &self.data[self.offset..];
		let Ok(Compact(len)) = <Compact<u32>>::decode(cursor) else {
			self.failed = true;
			return Some(Err(ExtrinsicBytesError { index: self.offset }));
		};
		let len = len as usize;
		if cursor.len() < len {
			self.failed = true;
			return Some(Err(ExtrinsicBytesError { index: self.data.len() }));
		}

		let (extrinsic, rest) = cursor.split_at(len);
		log::trace!("Extrinsic of {} bytes at offset {}", len, self.offset);
		self.offset = self.data.len() - rest.len();
		Some(Ok(extrinsic))
	}
}
