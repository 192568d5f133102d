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
	codec::encode_value_by_id, encoder::EncodeError, metadata::RuntimeApiParam, Metadata, TypeId, Value,
};
use std::sync::Arc;

/// A method of a runtime API, as called through `state_call`.
#[derive(Debug, Clone)]
pub struct RuntimeCall {
	metadata: Arc<Metadata>,
	pub api: String,
	pub method: String,
	pub inputs: Vec<RuntimeApiParam>,
	pub output: TypeId,
	pub docs: Vec<String>,
}

pub(super) fn decorate(metadata: &Arc<Metadata>) -> Vec<RuntimeCall> {
	metadata
		.runtime_apis()
		.iter()
		.flat_map(|api| {
			api.methods.iter().map(move |m| RuntimeCall {
				metadata: metadata.clone(),
				api: api.name.clone(),
				method: m.name.clone(),
				inputs: m.inputs.clone(),
				output: m.output,
				docs: m.docs.clone(),
			})
		})
		.collect()
}

impl RuntimeCall {
	/// The name the node knows this method by, eg `Core_version`.
	pub fn method_name(&self) -> String {
		format!("{}_{}", self.api, self.method)
	}

	/// The arguments, encoded one after another.
	pub fn encode_args<T>(&self, args: &[Value<T>]) -> Result<Vec<u8>, Error> {
		if args.len() != self.inputs.len() {
			return Err(EncodeError::WrongNumberOfArguments {
				call: self.method_name(),
				expected: self.inputs.len(),
				got: args.len(),
			}
			.into());
		}
		let mut out = Vec::new();
		for (arg, input) in args.iter().zip(&self.inputs) {
			encode_value_by_id(arg, input.ty, self.metadata.types(), &mut out)?;
		}
		Ok(out)
	}

	pub fn decode_output(&self, bytes: &[u8]) -> Result<Value<TypeId>, Error> {
		decode_all(&self.metadata, self.output, bytes)
	}
}
