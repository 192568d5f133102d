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
	lookup::Field,
	metadata::PalletMetadata,
	value::{Composite, Variant},
	Metadata, TypeId, Value, ValueDef,
};
use serde::Serialize;
use std::sync::Arc;

/// A single event of a pallet.
#[derive(Debug, Clone)]
pub struct EventItem {
	pub pallet: String,
	/// The index of the pallet within the outer event enum.
	pub pallet_index: u8,
	pub name: String,
	pub index: u8,
	pub fields: Vec<Field>,
	pub docs: Vec<String>,
}

impl EventItem {
	pub fn event_index(&self) -> [u8; 2] {
		[self.pallet_index, self.index]
	}

	/// Is this record an instance of this event?
	pub fn is(&self, record: &EventRecord) -> bool {
		record.pallet == self.pallet && record.name == self.name
	}
}

/// One entry of `System.Events`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
	pub phase: Value<TypeId>,
	pub pallet: String,
	pub name: String,
	pub fields: Composite<TypeId>,
	pub topics: Vec<Value<TypeId>>,
}

impl EventRecord {
	pub fn field(&self, name: &str) -> Option<&Value<TypeId>> {
		match &self.fields {
			Composite::Named(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
			Composite::Unnamed(_) => None,
		}
	}
}

pub(super) fn decorate(metadata: &Arc<Metadata>, pallet: &PalletMetadata) -> Vec<EventItem> {
	let Some(variants) = pallet.event.and_then(|ty| metadata.types().variants(ty)) else {
		return Vec::new();
	};
	variants
		.iter()
		.map(|v| EventItem {
			pallet: pallet.name.clone(),
			pallet_index: pallet.event_index,
			name: v.name.clone(),
			index: v.index,
			fields: v.fields.clone(),
			docs: v.docs.clone(),
		})
		.collect()
}

pub(super) fn decode_events(metadata: &Metadata, bytes: &[u8]) -> Result<Vec<EventRecord>, Error> {
	let (_, entry) =
		metadata.storage_entry("System", "Events").ok_or_else(|| Error::NotFound("System.Events".into()))?;
	let value = decode_all(metadata, entry.value_ty(), bytes)?;
	let ValueDef::Composite(records) = value.value else {
		return Err(Error::UnexpectedShape("event records"));
	};
	log::debug!("Decoded {} event records", records.len());
	records.into_values().into_iter().map(event_record).collect()
}

fn event_record(record: Value<TypeId>) -> Result<EventRecord, Error> {
	let ValueDef::Composite(Composite::Named(fields)) = record.value else {
		return Err(Error::UnexpectedShape("event record"));
	};

	let (mut phase, mut event, mut topics) = (None, None, Vec::new());
	for (name, value) in fields {
		match name.as_str() {
			"phase" => phase = Some(value),
			"event" => event = Some(value),
			"topics" => {
				if let ValueDef::Composite(t) = value.value {
					topics = t.into_values();
				}
			}
			_ => {}
		}
	}
	let phase = phase.ok_or(Error::UnexpectedShape("event record phase"))?;
	let event = event.ok_or(Error::UnexpectedShape("event record event"))?;

	// The outer event wraps the pallet event: `Balances(Transfer { .. })`.
	let Variant { name: pallet, values } = into_variant(event)?;
	let inner = values.into_values().into_iter().next().ok_or(Error::UnexpectedShape("pallet event"))?;
	let Variant { name, values } = into_variant(inner)?;

	Ok(EventRecord { phase, pallet, name, fields: values, topics })
}

fn into_variant(value: Value<TypeId>) -> Result<Variant<TypeId>, Error> {
	match value.value {
		ValueDef::Variant(v) => Ok(v),
		_ => Err(Error::UnexpectedShape("event")),
	}
}
