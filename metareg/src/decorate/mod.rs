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

//! Typed accessors for the calls, events, errors, storage entries, constants and runtime
//! APIs described by some [`Metadata`], keyed by pallet and item name.
//!
//! Nothing is built up front. The accessors for one kind of item in one pallet are
//! created the first time they are asked for, and kept from then on.

mod calls;
mod constants;
mod errors;
mod events;
mod runtime_apis;
mod storage;

pub use calls::CallFunction;
pub use constants::ConstantItem;
pub use errors::ErrorItem;
pub use events::{EventItem, EventRecord};
pub use runtime_apis::RuntimeCall;
pub use storage::StorageItem;

use crate::Error;
use metareg_core::{codec::decode_value_by_id, decoder::StorageDecoder, metadata::PalletMetadata, Metadata, TypeId, Value};
use once_cell::sync::OnceCell;
use std::{collections::HashMap, sync::Arc};

#[derive(Debug, Default)]
struct PalletItems {
	calls: OnceCell<Vec<CallFunction>>,
	events: OnceCell<Vec<EventItem>>,
	errors: OnceCell<Vec<ErrorItem>>,
	storage: OnceCell<Vec<StorageItem>>,
	constants: OnceCell<Vec<ConstantItem>>,
}

#[derive(Debug)]
pub struct Decorated {
	metadata: Arc<Metadata>,
	pallets: Vec<PalletItems>,
	by_name: HashMap<String, usize>,
	runtime_calls: OnceCell<Vec<RuntimeCall>>,
	storage_decoder: Arc<OnceCell<StorageDecoder>>,
}

impl Decorated {
	pub fn new(metadata: Arc<Metadata>) -> Self {
		let by_name = metadata.pallets().enumerate().map(|(i, p)| (p.name.clone(), i)).collect();
		let pallets = metadata.pallets().map(|_| PalletItems::default()).collect();
		Self { metadata, pallets, by_name, runtime_calls: OnceCell::new(), storage_decoder: Default::default() }
	}

	pub fn metadata(&self) -> &Metadata {
		&self.metadata
	}

	pub fn calls(&self, pallet: &str) -> Option<&[CallFunction]> {
		let (meta, items) = self.pallet(pallet)?;
		Some(items.calls.get_or_init(|| calls::decorate(&self.metadata, meta)))
	}

	pub fn call(&self, pallet: &str, name: &str) -> Option<&CallFunction> {
		self.calls(pallet)?.iter().find(|c| c.name == name)
	}

	pub fn events(&self, pallet: &str) -> Option<&[EventItem]> {
		let (meta, items) = self.pallet(pallet)?;
		Some(items.events.get_or_init(|| events::decorate(&self.metadata, meta)))
	}

	pub fn event(&self, pallet: &str, name: &str) -> Option<&EventItem> {
		self.events(pallet)?.iter().find(|e| e.name == name)
	}

	pub fn errors(&self, pallet: &str) -> Option<&[ErrorItem]> {
		let (meta, items) = self.pallet(pallet)?;
		Some(items.errors.get_or_init(|| errors::decorate(&self.metadata, meta)))
	}

	pub fn error(&self, pallet: &str, name: &str) -> Option<&ErrorItem> {
		self.errors(pallet)?.iter().find(|e| e.name == name)
	}

	pub fn storage_items(&self, pallet: &str) -> Option<&[StorageItem]> {
		let (meta, items) = self.pallet(pallet)?;
		Some(items.storage.get_or_init(|| storage::decorate(&self.metadata, &self.storage_decoder, meta)))
	}

	pub fn storage(&self, pallet: &str, name: &str) -> Option<&StorageItem> {
		self.storage_items(pallet)?.iter().find(|s| s.name == name)
	}

	pub fn constants(&self, pallet: &str) -> Option<&[ConstantItem]> {
		let (meta, items) = self.pallet(pallet)?;
		Some(items.constants.get_or_init(|| constants::decorate(&self.metadata, meta)))
	}

	pub fn constant(&self, pallet: &str, name: &str) -> Option<&ConstantItem> {
		self.constants(pallet)?.iter().find(|c| c.name == name)
	}

	/// Every method of every runtime API. Empty before V15.
	pub fn runtime_calls(&self) -> &[RuntimeCall] {
		self.runtime_calls.get_or_init(|| runtime_apis::decorate(&self.metadata))
	}

	pub fn runtime_call(&self, api: &str, method: &str) -> Option<&RuntimeCall> {
		self.runtime_calls().iter().find(|c| c.api == api && c.method == method)
	}

	/// The call at `[pallet index, call index]`.
	pub fn find_call(&self, index: [u8; 2]) -> Option<&CallFunction> {
		let pallet = self.metadata.pallet_by_index(index[0])?;
		self.calls(&pallet.name)?.iter().find(|c| c.index == index[1])
	}

	/// The event at `[pallet event index, event index]`.
	pub fn find_event(&self, index: [u8; 2]) -> Option<&EventItem> {
		let pallet = self.metadata.pallet_by_event_index(index[0])?;
		self.events(&pallet.name)?.iter().find(|e| e.index == index[1])
	}

	/// The error a pallet reports with `error`. Only the first byte identifies the error;
	/// newer runtimes append further detail after it.
	pub fn find_error(&self, pallet_index: u8, error: &[u8]) -> Option<&ErrorItem> {
		let index = *error.first()?;
		let pallet = self.metadata.pallet_by_index(pallet_index)?;
		self.errors(&pallet.name)?.iter().find(|e| e.index == index)
	}

	/// The pallet error behind a decoded `DispatchError::Module`, if that's what `value` is.
	pub fn decode_dispatch_error<T>(&self, value: &Value<T>) -> Option<&ErrorItem> {
		let (index, error) = errors::module_error(value)?;
		self.find_error(index, &error)
	}

	/// Decode the SCALE encoded contents of `System.Events`.
	pub fn decode_events(&self, bytes: &[u8]) -> Result<Vec<EventRecord>, Error> {
		events::decode_events(&self.metadata, bytes)
	}

	fn pallet(&self, name: &str) -> Option<(&PalletMetadata, &PalletItems)> {
		let index = *self.by_name.get(name)?;
		Some((self.metadata.pallets().nth(index)?, self.pallets.get(index)?))
	}
}

// Decode a value that must take up all of `bytes`.
fn decode_all(metadata: &Metadata, ty: TypeId, bytes: &[u8]) -> Result<Value<TypeId>, Error> {
	let data = &mut &*bytes;
	let value = decode_value_by_id(data, ty, metadata.types())?;
	if !data.is_empty() {
		return Err(Error::TrailingBytes(data.len()));
	}
	Ok(value)
}
