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

//! Turn untyped JSON into a [`Value`]. The result is shaped only by the JSON
//! itself; the encoder does the work of fitting it to a concrete type.

use super::{Composite, Primitive, Value, ValueDef};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JsonValueError {
	#[error("fractional numbers cannot be SCALE encoded: {0}")]
	Fractional(String),
	#[error("number {0} is out of range")]
	OutOfRange(String),
}

impl TryFrom<&serde_json::Value> for Value<()> {
	type Error = JsonValueError;

	fn try_from(json: &serde_json::Value) -> Result<Self, Self::Error> {
		use serde_json::Value as Json;
		let value = match json {
			Json::Null => Value::unit(),
			Json::Bool(b) => Value::bool(*b),
			Json::Number(n) => Value::new(ValueDef::Primitive(number(n)?)),
			Json::String(s) => Value::string(s.clone()),
			Json::Array(items) => {
				let values = items.iter().map(Value::try_from).collect::<Result<Vec<_>, _>>()?;
				Value::new(ValueDef::Composite(Composite::Unnamed(values)))
			}
			Json::Object(fields) => {
				let values = fields
					.iter()
					.map(|(k, v)| Ok((k.clone(), Value::try_from(v)?)))
					.collect::<Result<Vec<_>, JsonValueError>>()?;
				Value::new(ValueDef::Composite(Composite::Named(values)))
			}
		};
		Ok(value)
	}
}

impl TryFrom<serde_json::Value> for Value<()> {
	type Error = JsonValueError;

	fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
		Value::try_from(&json)
	}
}

fn number(n: &serde_json::Number) -> Result<Primitive, JsonValueError> {
	if let Some(n) = n.as_u64() {
		return Ok(Primitive::U64(n));
	}
	if let Some(n) = n.as_i64() {
		return Ok(Primitive::I64(n));
	}
	// Anything bigger only survives parsing thanks to arbitrary precision numbers.
	let repr = n.to_string();
	if repr.contains(['.', 'e', 'E']) {
		return Err(JsonValueError::Fractional(repr));
	}
	if let Ok(n) = repr.parse::<u128>() {
		return Ok(Primitive::U128(n));
	}
	repr.parse::<i128>().map(Primitive::I128).map_err(|_| JsonValueError::OutOfRange(repr))
}
