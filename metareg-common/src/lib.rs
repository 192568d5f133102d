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

//! Common types shared between the current and legacy metadata crates.

#![forbid(unsafe_code)]
use serde::{Deserialize, Serialize};

pub use sp_crypto_hashing::{blake2_128, blake2_256, twox_128, twox_256, twox_64};

/// Spec Version type defined in the runtime of a chain.
pub type SpecVersion = u32;

/// The hashers a storage map can use for its keys. Identical across every
/// metadata version we understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum StorageHasher {
	Blake2_128,
	Blake2_256,
	Blake2_128Concat,
	Twox128,
	Twox256,
	Twox64Concat,
	Identity,
}

impl StorageHasher {
	/// Number of hash bytes that precede the (optional) raw key.
	pub fn hash_len(&self) -> usize {
		match self {
			StorageHasher::Blake2_128 | StorageHasher::Twox128 | StorageHasher::Blake2_128Concat => 16,
			StorageHasher::Blake2_256 | StorageHasher::Twox256 => 32,
			StorageHasher::Twox64Concat => 8,
			StorageHasher::Identity => 0,
		}
	}

	/// Whether the SCALE encoded key follows the hash, making the key recoverable.
	pub fn is_concat(&self) -> bool {
		matches!(self, StorageHasher::Blake2_128Concat | StorageHasher::Twox64Concat | StorageHasher::Identity)
	}

	/// Hash some SCALE encoded key bytes.
	pub fn hash(&self, encoded: &[u8]) -> Vec<u8> {
		match self {
			StorageHasher::Blake2_128 => blake2_128(encoded).to_vec(),
			StorageHasher::Blake2_256 => blake2_256(encoded).to_vec(),
			StorageHasher::Blake2_128Concat => [&blake2_128(encoded)[..], encoded].concat(),
			StorageHasher::Twox128 => twox_128(encoded).to_vec(),
			StorageHasher::Twox256 => twox_256(encoded).to_vec(),
			StorageHasher::Twox64Concat => [&twox_64(encoded)[..], encoded].concat(),
			StorageHasher::Identity => encoded.to_vec(),
		}
	}
}

/// `twox_128(pallet) ++ twox_128(entry)`: the root of every storage key.
pub fn storage_prefix(pallet: &str, entry: &str) -> [u8; 32] {
	let mut out = [0u8; 32];
	out[..16].copy_from_slice(&twox_128(pallet.as_bytes()));
	out[16..].copy_from_slice(&twox_128(entry.as_bytes()));
	out
}
