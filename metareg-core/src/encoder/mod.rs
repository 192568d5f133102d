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

//! The inverse of [`crate::decoder`]: build call data, extrinsics, signer payloads
//! and storage keys from [`Value`]s, given some [`Metadata`].
//!
//! Nothing here signs anything. Signatures are produced elsewhere (over the bytes
//! from [`encode_signer_payload`]) and handed to [`encode_signed_extrinsic`] as values.

use crate::codec::{encode_value_by_id, EncodeValueError};
use crate::lookup::{TypeDef, TypeId};
use crate::metadata::{Metadata, StorageEntryType};
use crate::value::Value;
use codec::{Compact, Encode};
use metareg_common::{blake2_256, storage_prefix as hashed_prefix};

/// The extrinsic format version this module produces.
pub const EXTRINSIC_VERSION: u8 = 4;

/// Signer payloads longer than this are hashed with blake2-256 before they are signed.
pub const MAX_UNHASHED_PAYLOAD_LEN: usize = 256;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
	#[error(transparent)]
	EncodeValue(#[from] EncodeValueError),
	#[error("No pallet named '{0}' exists in the metadata")]
	PalletNotFound(String),
	#[error("Pallet '{0}' has no calls")]
	NoCalls(String),
	#[error("Pallet '{pallet}' has no call named '{call}'")]
	CallNotFound { pallet: String, call: String },
	#[error("'{call}' takes {expected} arguments but {got} were given")]
	WrongNumberOfArguments { call: String, expected: usize, got: usize },
	#[error("The metadata does not describe the extrinsic {0} type")]
	MissingExtrinsicType(&'static str),
	#[error("Expected {expected} signed extension values but got {got}")]
	WrongNumberOfExtensions { expected: usize, got: usize },
	#[error("No storage entry {pallet}.{entry} exists in the metadata")]
	StorageEntryNotFound { pallet: String, entry: String },
	#[error("Storage entry takes {expected} keys but {got} were given")]
	WrongNumberOfKeys { expected: usize, got: usize },
	#[error("Type with id {0} expected in the metadata but not found")]
	TypeNotFound(u32),
}

/// Encode a call as `pallet index ++ call index ++ arguments`. Arguments are given in the
/// order the call declares them.
pub fn encode_call_data<T>(
	metadata: &Metadata,
	pallet: &str,
	call: &str,
	args: &[Value<T>],
) -> Result<Vec<u8>, EncodeError> {
	let pallet_meta = metadata.pallet_by_name(pallet).ok_or_else(|| EncodeError::PalletNotFound(pallet.into()))?;
	let calls = pallet_meta
		.calls
		.and_then(|ty| metadata.types().variants(ty))
		.ok_or_else(|| EncodeError::NoCalls(pallet.into()))?;
	let variant = calls
		.iter()
		.find(|v| v.name == call)
		.ok_or_else(|| EncodeError::CallNotFound { pallet: pallet.into(), call: call.into() })?;

	if variant.fields.len() != args.len() {
		return Err(EncodeError::WrongNumberOfArguments {
			call: format!("{}.{}", pallet, call),
			expected: variant.fields.len(),
			got: args.len(),
		});
	}

	let mut out = vec![pallet_meta.index, variant.index];
	for (field, arg) in variant.fields.iter().zip(args) {
		encode_value_by_id(arg, field.ty, metadata.types(), &mut out)?;
	}
	log::trace!("Encoded {}.{} into {} bytes", pallet, call, out.len());
	Ok(out)
}

/// Wrap call data into a length prefixed, unsigned extrinsic.
pub fn encode_unsigned_extrinsic(call_data: &[u8]) -> Vec<u8> {
	let mut inner = Vec::with_capacity(call_data.len() + 1);
	inner.push(EXTRINSIC_VERSION);
	inner.extend_from_slice(call_data);
	inner.encode()
}

/// Assemble a length prefixed, signed extrinsic:
/// `0x84 ++ address ++ signature ++ signed extensions ++ call data`.
pub fn encode_signed_extrinsic<T>(
	metadata: &Metadata,
	address: &Value<T>,
	signature: &Value<T>,
	extensions: &[Value<T>],
	call_data: &[u8],
) -> Result<Vec<u8>, EncodeError> {
	let extrinsic = metadata.extrinsic();
	let address_ty = extrinsic.address_ty.ok_or(EncodeError::MissingExtrinsicType("address"))?;
	let signature_ty = extrinsic.signature_ty.ok_or(EncodeError::MissingExtrinsicType("signature"))?;

	let mut inner = vec![0b1000_0000 | EXTRINSIC_VERSION];
	encode_value_by_id(address, address_ty, metadata.types(), &mut inner)?;
	encode_value_by_id(signature, signature_ty, metadata.types(), &mut inner)?;
	encode_extensions(metadata, extensions, |ext| ext.ty, &mut inner)?;
	inner.extend_from_slice(call_data);
	Ok(inner.encode())
}

/// The bytes that a signer signs: `call data ++ signed extensions ++ additional signed`,
/// hashed with blake2-256 if that comes to more than 256 bytes.
pub fn encode_signer_payload<T>(
	metadata: &Metadata,
	call_data: &[u8],
	extensions: &[Value<T>],
	additional_signed: &[Value<T>],
) -> Result<Vec<u8>, EncodeError> {
	let mut out = call_data.to_vec();
	encode_extensions(metadata, extensions, |ext| ext.ty, &mut out)?;
	encode_extensions(metadata, additional_signed, |ext| ext.additional_signed, &mut out)?;
	if out.len() > MAX_UNHASHED_PAYLOAD_LEN {
		return Ok(blake2_256(&out).to_vec());
	}
	Ok(out)
}

fn encode_extensions<T>(
	metadata: &Metadata,
	values: &[Value<T>],
	ty: impl Fn(&crate::metadata::SignedExtensionMetadata) -> TypeId,
	out: &mut Vec<u8>,
) -> Result<(), EncodeError> {
	let exts = &metadata.extrinsic().signed_extensions;
	if exts.len() != values.len() {
		return Err(EncodeError::WrongNumberOfExtensions { expected: exts.len(), got: values.len() });
	}
	for (ext, value) in exts.iter().zip(values) {
		encode_value_by_id(value, ty(ext), metadata.types(), out)?;
	}
	Ok(())
}

/// The full storage key of an entry: `twox128(prefix) ++ twox128(name)`, followed by one
/// hashed key per hasher for maps.
pub fn storage_key<T>(metadata: &Metadata, pallet: &str, entry: &str, keys: &[Value<T>]) -> Result<Vec<u8>, EncodeError> {
	let expected = key_types(metadata, pallet, entry)?.len();
	if keys.len() != expected {
		return Err(EncodeError::WrongNumberOfKeys { expected, got: keys.len() });
	}
	storage_prefix(metadata, pallet, entry, keys)
}

/// Like [`storage_key`], but any number of leading map keys may be given, producing a
/// prefix under which all matching entries live.
pub fn storage_prefix<T>(
	metadata: &Metadata,
	pallet: &str,
	entry: &str,
	keys: &[Value<T>],
) -> Result<Vec<u8>, EncodeError> {
	let key_types = key_types(metadata, pallet, entry)?;
	if keys.len() > key_types.len() {
		return Err(EncodeError::WrongNumberOfKeys { expected: key_types.len(), got: keys.len() });
	}
	let (storage, _) = metadata.storage_entry(pallet, entry).ok_or_else(|| not_found(pallet, entry))?;

	let mut out = hashed_prefix(&storage.prefix, entry).to_vec();
	for ((hasher, ty), key) in key_types.iter().zip(keys) {
		let mut encoded = Vec::new();
		encode_value_by_id(key, *ty, metadata.types(), &mut encoded)?;
		out.extend(hasher.hash(&encoded));
	}
	Ok(out)
}

// One `(hasher, key type)` per map key; nothing for plain entries.
fn key_types(
	metadata: &Metadata,
	pallet: &str,
	entry: &str,
) -> Result<Vec<(metareg_common::StorageHasher, TypeId)>, EncodeError> {
	let (_, entry_meta) = metadata.storage_entry(pallet, entry).ok_or_else(|| not_found(pallet, entry))?;
	let (hashers, key) = match &entry_meta.ty {
		StorageEntryType::Plain(_) => return Ok(Vec::new()),
		StorageEntryType::Map { hashers, key, .. } => (hashers, *key),
	};
	if hashers.len() == 1 {
		return Ok(vec![(hashers[0], key)]);
	}
	match &metadata.types().resolve(key).ok_or(EncodeError::TypeNotFound(key.id()))?.def {
		TypeDef::Tuple(ids) if ids.len() == hashers.len() => Ok(hashers.iter().copied().zip(ids.iter().copied()).collect()),
		_ => Err(EncodeError::WrongNumberOfKeys { expected: hashers.len(), got: 1 }),
	}
}

fn not_found(pallet: &str, entry: &str) -> EncodeError {
	EncodeError::StorageEntryNotFound { pallet: pallet.into(), entry: entry.into() }
}
