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

use super::{BitOrder, Lookup, TypeDef, TypeId};

// Deeply nested anonymous types are cut off rather than rendered in full.
const MAX_DEPTH: usize = 16;

pub(super) fn type_name(lookup: &Lookup, id: TypeId) -> String {
	let mut out = String::new();
	write_name(lookup, id, 0, &mut out);
	out
}

fn write_name(lookup: &Lookup, id: TypeId, depth: usize, out: &mut String) {
	if depth > MAX_DEPTH {
		out.push_str("..");
		return;
	}
	let Some(ty) = lookup.resolve(id) else {
		out.push_str(&format!("<unknown {}>", id));
		return;
	};

	// Named types are rendered by name, with any resolved type parameters.
	if let Some(name) = ty.name() {
		out.push_str(name);
		let params: Vec<TypeId> = ty.params.iter().filter_map(|p| p.ty).collect();
		if !params.is_empty() {
			out.push('<');
			write_list(lookup, &params, depth, out);
			out.push('>');
		}
		return;
	}

	match &ty.def {
		TypeDef::Primitive(p) => out.push_str(p.as_str()),
		TypeDef::Sequence(inner) => {
			out.push_str("Vec<");
			write_name(lookup, *inner, depth + 1, out);
			out.push('>');
		}
		TypeDef::Array { len, ty } => {
			out.push('[');
			write_name(lookup, *ty, depth + 1, out);
			out.push_str(&format!("; {}]", len));
		}
		TypeDef::Tuple(fields) => {
			out.push('(');
			write_list(lookup, fields, depth, out);
			out.push(')');
		}
		TypeDef::Compact(inner) => {
			out.push_str("Compact<");
			write_name(lookup, *inner, depth + 1, out);
			out.push('>');
		}
		TypeDef::BitSequence { store, order } => {
			out.push_str("BitVec<");
			write_name(lookup, *store, depth + 1, out);
			out.push_str(match order {
				BitOrder::Lsb0 => ", Lsb0>",
				BitOrder::Msb0 => ", Msb0>",
			});
		}
		TypeDef::Composite(_) | TypeDef::Variant(_) => out.push_str(&format!("<anonymous {}>", id)),
		TypeDef::Pending => out.push_str(&format!("<pending {}>", id)),
	}
}

fn write_list(lookup: &Lookup, ids: &[TypeId], depth: usize, out: &mut String) {
	for (i, id) in ids.iter().enumerate() {
		if i > 0 {
			out.push_str(", ");
		}
		write_name(lookup, *id, depth + 1, out);
	}
}
