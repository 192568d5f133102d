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

use super::decode_all;
use crate::Error;
use metareg_core::{
	codec::decode_value_by_id,
	encoder,
	lookup::Field,
	metadata::PalletMetadata,
	Metadata, TypeId, Value,
};
use std::sync::Arc;

/// A single call of a pallet.
#[derive(Debug, Clone)]
pub struct CallFunction {
	metadata: Arc<Metadata>,
	pub pallet: String,
	pub pallet_index: u8,
	pub name: String,
	pub index: u8,
	pub fields: Vec<Field>,
	pub docs: Vec<String>,
}

pub(super) fn decorate(metadata: &Arc<Metadata>, pallet: &PalletMetadata) -> Vec<CallFunction> {
	let Some(variants) = pallet.calls.and_then(|ty| metadata.types().variants(ty)) else {
		return Vec::new();
	};
	log::trace!("Decorating {} calls of {}", variants.len(), pallet.name);
	variants
		.iter()
		.map(|v| CallFunction {
			metadata: metadata.clone(),
			pallet: pallet.name.clone(),
			pallet_index: pallet.index,
			name: v.name.clone(),
			index: v.index,
			fields: v.fields.clone(),
			docs: v.docs.clone(),
		})
		.collect()
}

impl CallFunction {
	pub fn call_index(&self) -> [u8; 2] {
		[self.pallet_index, self.index]
	}

	/// Encode call data for this call. Arguments are given in declaration order.
	pub fn encode<T>(&self, args: &[Value<T>]) -> Result<Vec<u8>, Error> {
		Ok(encoder::encode_call_data(&self.metadata, &self.pallet, &self.name, args)?)
	}

	/// Does this call data belong to this call?
	pub fn is(&self, call: &[u8]) -> bool {
		call.get(..2) == Some(&self.call_index()[..])
	}

	/// Decode the arguments from some call data, including its two index bytes.
	pub fn decode_args(&self, call: &[u8]) -> Result<Vec<Value<TypeId>>, Error> {
		if !self.is(call) {
			return Err(Error::Mismatch { pallet: self.pallet.clone(), item: self.name.clone() });
		}
		let data = &mut &call[2..];
		let args = self
			.fields
			.iter()
			.map(|f| decode_value_by_id(data, f.ty, self.metadata.types()))
			.collect::<Result<Vec<_>, _>>()?;
		if !data.is_empty() {
			return Err(Error::TrailingBytes(data.len()));
		}
		Ok(args)
	}

	/// Decode a single argument on its own.
	pub fn decode_arg(&self, name: &str, bytes: &[u8]) -> Result<Value<TypeId>, Error> {
		let field = self
			.fields
			.iter()
			.find(|f| f.name.as_deref() == Some(name))
			.ok_or_else(|| Error::NotFound(format!("{}.{} argument {}", self.pallet, self.name, name)))?;
		decode_all(&self.metadata, field.ty, bytes)
	}

	/// A readable signature, eg `transfer(dest: MultiAddress<AccountId32, ()>, value: Compact<u128>)`.
	pub fn signature(&self) -> String {
		let args: Vec<String> = self
			.fields
			.iter()
			.map(|f| {
				let ty = self.metadata.types().type_name(f.ty);
				match &f.name {
					Some(name) => format!("{}: {}", name, ty),
					None => ty,
				}
			})
			.collect();
		format!("{}({})", self.name, args.join(", "))
	}
}
