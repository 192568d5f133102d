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

/// A map with `u8` keys, backed by a fixed array of 256 slots. Pallet, call and
/// event indexes are all single bytes on the wire, so lookups are a plain index.
#[derive(Debug, Clone, PartialEq)]
pub struct U8Map<V> {
	slots: Box<[Option<V>; 256]>,
	len: usize,
}

impl<V> Default for U8Map<V> {
	fn default() -> Self {
		U8Map::new()
	}
}

impl<V> U8Map<V> {
	pub fn new() -> U8Map<V> {
		U8Map { slots: Box::new(std::array::from_fn(|_| None)), len: 0 }
	}

	/// Insert a value, handing back whatever was at that key before.
	pub fn insert(&mut self, key: u8, value: V) -> Option<V> {
		let old = self.slots[key as usize].replace(value);
		if old.is_none() {
			self.len += 1;
		}
		old
	}

	pub fn get(&self, key: u8) -> Option<&V> {
		self.slots[key as usize].as_ref()
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}
}

impl<V> FromIterator<(u8, V)> for U8Map<V> {
	fn from_iter<I: IntoIterator<Item = (u8, V)>>(iter: I) -> Self {
		let mut map = U8Map::new();
		for (k, v) in iter {
			map.insert(k, v);
		}
		map
	}
}
