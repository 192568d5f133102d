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

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use metareg::{metareg_core::decoder, Registry, Value};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Opts {
	/// SCALE encoded metadata (any version from V11), either raw or as 0x prefixed hex
	#[arg(short, long, value_name = "FILE")]
	metadata: PathBuf,
	/// Extra JSON type definitions, used for V11 to V13 metadata and type names
	#[arg(short, long, value_name = "FILE")]
	types: Option<PathBuf>,
	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// List the pallets with their calls, events, storage entries and constants
	Pallets,
	/// Decode a length prefixed extrinsic
	DecodeExtrinsic { hex: String },
	/// Decode the contents of System.Events
	DecodeEvents { hex: String },
	/// Decode a full storage key
	DecodeStorageKey { hex: String },
	/// Decode a value of some named type, eg `AccountInfo` or `Vec<u32>`
	DecodeType { name: String, hex: String },
	/// Encode a JSON value as some named type
	EncodeType { name: String, json: String },
	/// Encode call data from a JSON array of arguments
	EncodeCall { pallet: String, call: String, args: String },
	/// Build a storage key (or a prefix, given fewer keys) from a JSON array of keys
	StorageKey {
		pallet: String,
		entry: String,
		#[arg(default_value = "[]")]
		keys: String,
	},
}

fn main() -> Result<(), anyhow::Error> {
	let opts = Opts::parse();
	pretty_env_logger::init();

	let mut registry = Registry::new()?;
	if let Some(types) = &opts.types {
		let json = std::fs::read_to_string(types).with_context(|| format!("Cannot read {}", types.display()))?;
		registry.register_json(&json)?;
	}
	let metadata = std::fs::read(&opts.metadata).with_context(|| format!("Cannot read {}", opts.metadata.display()))?;
	let metadata = match metadata.strip_prefix(b"0x") {
		Some(hex) => hex::decode(String::from_utf8_lossy(hex).trim())?,
		None => metadata,
	};
	registry.set_metadata_bytes(&metadata)?;
	log::info!("Loaded V{} metadata", registry.metadata().map(|m| m.version()).unwrap_or_default());

	match opts.command {
		Command::Pallets => pallets(&registry),
		Command::DecodeExtrinsic { hex } => {
			let bytes = from_hex(&hex)?;
			let metadata = registry.metadata().ok_or_else(|| anyhow!("No metadata"))?;
			let ext = decoder::decode_extrinsic(metadata, &mut &*bytes)
				.map_err(|e| anyhow!("Cannot decode extrinsic: {}", e))?;
			print(&ext)
		}
		Command::DecodeEvents { hex } => print(&registry.decorated()?.decode_events(&from_hex(&hex)?)?),
		Command::DecodeStorageKey { hex } => {
			let bytes = from_hex(&hex)?;
			let metadata = registry.metadata().ok_or_else(|| anyhow!("No metadata"))?;
			let entry = decoder::decode_storage(metadata).decode_key(metadata, &mut &*bytes)?;
			print(&entry)
		}
		Command::DecodeType { name, hex } => print(&registry.decode_all(&name, &from_hex(&hex)?)?),
		Command::EncodeType { name, json } => {
			let value = from_json(&json)?;
			println!("0x{}", hex::encode(registry.encode(&name, &value)?));
			Ok(())
		}
		Command::EncodeCall { pallet, call, args } => {
			let call = registry
				.decorated()?
				.call(&pallet, &call)
				.ok_or_else(|| anyhow!("No call {}.{}", pallet, call))?;
			let args = from_json_list(&args)?;
			println!("0x{}", hex::encode(call.encode(&args)?));
			Ok(())
		}
		Command::StorageKey { pallet, entry, keys } => {
			let item = registry
				.decorated()?
				.storage(&pallet, &entry)
				.ok_or_else(|| anyhow!("No storage entry {}.{}", pallet, entry))?;
			let keys = from_json_list(&keys)?;
			let key = if keys.len() == item.key_count() { item.key(&keys)? } else { item.prefix(&keys)? };
			println!("0x{}", hex::encode(key));
			Ok(())
		}
	}
}

fn pallets(registry: &Registry) -> Result<(), anyhow::Error> {
	let decorated = registry.decorated()?;
	for pallet in decorated.metadata().pallets() {
		println!("{} (index {})", pallet.name, pallet.index);
		for call in decorated.calls(&pallet.name).unwrap_or_default() {
			println!("  call     {}", call.signature());
		}
		for event in decorated.events(&pallet.name).unwrap_or_default() {
			println!("  event    {}", event.name);
		}
		for item in decorated.storage_items(&pallet.name).unwrap_or_default() {
			println!("  storage  {}: {}", item.name, registry.type_name(item.value_ty()));
		}
		for constant in decorated.constants(&pallet.name).unwrap_or_default() {
			println!("  constant {}: {}", constant.name, registry.type_name(constant.ty));
		}
	}
	Ok(())
}

fn print<T: Serialize>(value: &T) -> Result<(), anyhow::Error> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

fn from_hex(s: &str) -> Result<Vec<u8>, anyhow::Error> {
	let Some(s) = s.strip_prefix("0x") else {
		bail!("Hex input should start with 0x");
	};
	hex::decode(s).map_err(|e| anyhow!("Cannot decode hex string into bytes: {}", e))
}

fn from_json(s: &str) -> Result<Value, anyhow::Error> {
	let json: serde_json::Value = serde_json::from_str(s)?;
	Ok(Value::try_from(json)?)
}

fn from_json_list(s: &str) -> Result<Vec<Value>, anyhow::Error> {
	let json: serde_json::Value = serde_json::from_str(s)?;
	let serde_json::Value::Array(items) = json else {
		bail!("Expected a JSON array, got {}", s);
	};
	items.into_iter().map(|item| Value::try_from(item).map_err(Into::into)).collect()
}
