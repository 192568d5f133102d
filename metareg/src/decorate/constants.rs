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
use metareg_core::{metadata::PalletMetadata, Metadata, TypeId, Value};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ConstantItem {
	metadata: Arc<Metadata>,
	pub pallet: String,
	pub name: String,
	pub ty: TypeId,
	pub value: Vec<u8>,
	pub docs: Vec<String>,
}

pub(super) fn decorate(metadata: &Arc<Metadata>, pallet: &PalletMetadata) -> Vec<ConstantItem> {
	pallet
		.constants
		.iter()
		.map(|c| ConstantItem {
			metadata: metadata.clone(),
			pallet: pallet.name.clone(),
			name: c.name.clone(),
			ty: c.ty,
			value: c.value.clone(),
			docs: c.docs.clone(),
		})
		.collect()
}

impl ConstantItem {
	pub fn decode(&self) -> Result<Value<TypeId>, Error> {
		decode_all(&self.metadata, self.ty, &self.value)
	}
}
