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

use metareg_core::{metadata::PalletMetadata, value::Composite, Metadata, Value, ValueDef};
use std::sync::Arc;

/// A single error of a pallet.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorItem {
	pub pallet: String,
	pub pallet_index: u8,
	pub name: String,
	pub index: u8,
	pub docs: Vec<String>,
}

impl ErrorItem {
	/// The documentation, joined into one line.
	pub fn description(&self) -> String {
		self.docs.iter().map(|d| d.trim()).filter(|d| !d.is_empty()).collect::<Vec<_>>().join(" ")
	}
}

pub(super) fn decorate(metadata: &Arc<Metadata>, pallet: &PalletMetadata) -> Vec<ErrorItem> {
	let Some(variants) = pallet.error.and_then(|ty| metadata.types().variants(ty)) else {
		return Vec::new();
	};
	variants
		.iter()
		.map(|v| ErrorItem {
			pallet: pallet.name.clone(),
			pallet_index: pallet.index,
			name: v.name.clone(),
			index: v.index,
			docs: v.docs.clone(),
		})
		.collect()
}

/// The pallet index and error bytes of a `DispatchError::Module`. The module error
/// is either a struct of its own (`Module(ModuleError { .. })`) or the named fields of
/// the variant itself; the error is a single `u8` or a byte array.
pub(super) fn module_error<T>(value: &Value<T>) -> Option<(u8, Vec<u8>)> {
	let ValueDef::Variant(variant) = &value.value else {
		return None;
	};
	if variant.name != "Module" {
		return None;
	}
	let module = match &variant.values {
		Composite::Unnamed(values) if values.len() == 1 => &values[0],
		_ => value,
	};

	let index = u8::try_from(module.field("index")?.as_u128()?).ok()?;
	let error = module.field("error")?;
	let error = match error.as_u128() {
		Some(e) => vec![u8::try_from(e).ok()?],
		None => error.as_bytes()?,
	};
	Some((index, error))
}
