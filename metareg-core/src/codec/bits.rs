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

// Bit sequences are encoded as a compact bit count followed by whole store
// elements (u8/u16/u32/u64, little endian). Bit `i` of an element is counted
// from the least significant end for Lsb0 and from the most significant end for Msb0.

use crate::lookup::{BitOrder, PrimitiveKind};
use crate::value::BitSequence;
use codec::{Compact, Decode, Encode};

pub(super) fn store_width(store: PrimitiveKind) -> Option<usize> {
	match store {
		PrimitiveKind::U8 => Some(8),
		PrimitiveKind::U16 => Some(16),
		PrimitiveKind::U32 => Some(32),
		PrimitiveKind::U64 => Some(64),
		_ => None,
	}
}

fn bit_position(i: usize, width: usize, order: BitOrder) -> usize {
	match order {
		BitOrder::Lsb0 => i % width,
		BitOrder::Msb0 => width - 1 - (i % width),
	}
}

pub(super) fn decode_bits(data: &mut &[u8], width: usize, order: BitOrder) -> Result<BitSequence, codec::Error> {
	let bits = <Compact<u32>>::decode(data)?.0 as usize;
	let element_bytes = width / 8;
	let byte_len = ((bits + width - 1) / width) * element_bytes;
	if data.len() < byte_len {
		return Err("Not enough data to fill bit sequence".into());
	}
	let (bytes, rest) = data.split_at(byte_len);

	let mut out = BitSequence::with_capacity(bits);
	for i in 0..bits {
		let start = (i / width) * element_bytes;
		let mut element = [0u8; 8];
		element[..element_bytes].copy_from_slice(&bytes[start..start + element_bytes]);
		let element = u64::from_le_bytes(element);
		out.push((element >> bit_position(i, width, order)) & 1 == 1);
	}
	*data = rest;
	Ok(out)
}

pub(super) fn encode_bits(bits: &BitSequence, width: usize, order: BitOrder, out: &mut Vec<u8>) {
	Compact(bits.len() as u32).encode_to(out);
	let element_bytes = width / 8;
	let elements = (bits.len() + width - 1) / width;
	for e in 0..elements {
		let mut element = 0u64;
		for i in e * width..((e + 1) * width).min(bits.len()) {
			if bits[i] {
				element |= 1u64 << bit_position(i, width, order);
			}
		}
		out.extend_from_slice(&element.to_le_bytes()[..element_bytes]);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bitvec::{
		order::{Lsb0, Msb0},
		vec::BitVec,
	};

	#[test]
	fn matches_codec_for_lsb0_u8() {
		let bits: BitVec<u8, Lsb0> = [true, false, true, true, false, false, false, false, true].into_iter().collect();
		let encoded = bits.encode();

		let decoded = decode_bits(&mut &*encoded, 8, BitOrder::Lsb0).unwrap();
		assert_eq!(decoded, bits);

		let mut out = Vec::new();
		encode_bits(&decoded, 8, BitOrder::Lsb0, &mut out);
		assert_eq!(out, encoded);
	}

	#[test]
	fn matches_codec_for_msb0_u32() {
		let bits: BitVec<u32, Msb0> = [true, true, false, true, false].into_iter().collect();
		let encoded = bits.encode();
		// compact(5) + one u32 element
		assert_eq!(encoded.len(), 1 + 4);

		let decoded = decode_bits(&mut &*encoded, 32, BitOrder::Msb0).unwrap();
		assert_eq!(decoded.iter().map(|b| *b).collect::<Vec<_>>(), vec![true, true, false, true, false]);

		let mut out = Vec::new();
		encode_bits(&decoded, 32, BitOrder::Msb0, &mut out);
		assert_eq!(out, encoded);
	}

	fn pattern(len: usize) -> Vec<bool> {
		(0..len).map(|i| i % 3 == 0 || i % 7 == 1).collect()
	}

	fn assert_matches(encoded: Vec<u8>, width: usize, order: BitOrder, expected: &[bool]) {
		let decoded = decode_bits(&mut &*encoded, width, order).unwrap();
		assert_eq!(decoded.iter().map(|b| *b).collect::<Vec<_>>(), expected);

		let mut out = Vec::new();
		encode_bits(&decoded, width, order, &mut out);
		assert_eq!(out, encoded);
	}

	#[test]
	fn matches_codec_for_u16_and_u64_stores() {
		// spills into a second element
		let bits = pattern(21);
		let lsb0 = bits.iter().copied().collect::<BitVec<u16, Lsb0>>().encode();
		let msb0 = bits.iter().copied().collect::<BitVec<u16, Msb0>>().encode();
		assert_eq!(lsb0.len(), 1 + 2 * 2);
		assert_ne!(lsb0, msb0);
		assert_matches(lsb0, 16, BitOrder::Lsb0, &bits);
		assert_matches(msb0, 16, BitOrder::Msb0, &bits);

		let bits = pattern(70);
		let lsb0 = bits.iter().copied().collect::<BitVec<u64, Lsb0>>().encode();
		let msb0 = bits.iter().copied().collect::<BitVec<u64, Msb0>>().encode();
		assert_eq!(msb0.len(), 1 + 2 * 8);
		assert_matches(lsb0, 64, BitOrder::Lsb0, &bits);
		assert_matches(msb0, 64, BitOrder::Msb0, &bits);
	}

	#[test]
	fn short_input_is_an_error() {
		let mut data: &[u8] = &[Compact(16u32).encode()[0], 0xff];
		assert!(decode_bits(&mut data, 8, BitOrder::Lsb0).is_err());
	}
}
