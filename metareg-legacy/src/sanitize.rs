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

//! Type names as they appear in legacy metadata are Rust source fragments, such as
//! `<T as Trait<I>>::Balance` or `Vec<schedule::Period<T::BlockNumber>>`. These
//! functions strip them down to names that type definitions can be found under.

use onig::{Captures, Regex};

/// `<T::Lookup as StaticLookup>::Source`, the usual address type of calls.
fn static_lookup_source() -> Regex {
	Regex::new(r"<\s*(?:\w+::)*Lookup\s+as\s+(?:\w+::)*StaticLookup\s*>::Source")
		.expect("Regex expression should be infallible; qed")
}

/// `<T as Trait>::`, `<T as frame_system::Config>::` and `<T as Trait<I>>::`.
fn trait_qualifier() -> Regex {
	Regex::new(r"<\s*[\w:]+\s+as\s+[\w:]+(?:<[\w\s,:]*>)?\s*>::").expect("Regex expression should be infallible; qed")
}

/// Leading path segments, eg `T::`, `schedule::` or `sp_runtime::generic::`.
fn path_segments() -> Regex {
	Regex::new(r"\b(?:\w+::)+").expect("Regex expression should be infallible; qed")
}

/// A generic type instantiated with the unit type, eg `Releases<()>`.
fn empty_generic() -> Regex {
	Regex::new(r"(\w+)\s*<\s*\(\s*\)\s*>").expect("Regex expression should be infallible; qed")
}

/// A borrowed slice, eg `&'static [u8]`.
fn slice_reference() -> Regex {
	Regex::new(r"&\s*(?:'\w+\s+)?\[\s*([^;\[\]]+?)\s*\]").expect("Regex expression should be infallible; qed")
}

/// Any other reference, with or without a lifetime.
fn reference() -> Regex {
	Regex::new(r"&\s*(?:'\w+\s+)?(?:mut\s+)?").expect("Regex expression should be infallible; qed")
}

fn whitespace() -> Regex {
	Regex::new(r"\s+").expect("Regex expression should be infallible; qed")
}

/// Remove the trait qualifier preceding a type.
/// I.E `<T as Trait>::Call` becomes `Call`. Lookup sources become `LookupSource`.
pub fn remove_trait<S: AsRef<str>>(s: S) -> String {
	let s = static_lookup_source().replace_all(s.as_ref(), "LookupSource");
	trait_qualifier().replace_all(&s, "")
}

/// Remove module paths and generic prefixes.
/// I.E `schedule::Period<T::BlockNumber>` becomes `Period<BlockNumber>`.
pub fn remove_path<S: AsRef<str>>(s: S) -> String {
	path_segments().replace_all(s.as_ref(), "")
}

/// `Releases<()>` becomes `Releases`.
pub fn remove_empty_generic<S: AsRef<str>>(s: S) -> String {
	empty_generic().replace_all(s.as_ref(), |caps: &Captures| caps.at(1).unwrap_or_default().to_string())
}

/// `&'static [u8]` becomes `Vec<u8>`, `&'a str` becomes `str`.
pub fn remove_references<S: AsRef<str>>(s: S) -> String {
	let s = slice_reference()
		.replace_all(s.as_ref(), |caps: &Captures| format!("Vec<{}>", caps.at(1).unwrap_or_default()));
	reference().replace_all(&s, "")
}

/// Sanitize a type name from metadata into something type definitions are keyed by.
pub fn sanitize(ty: &str) -> String {
	let s = remove_trait(ty);
	let s = remove_path(s);
	let s = remove_empty_generic(s);
	let s = remove_references(s);
	let s = whitespace().replace_all(s.trim(), " ");
	if s != ty {
		log::trace!("sanitized {} into {}", ty, s);
	}
	s
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn should_remove_trait_qualifiers() {
		assert_eq!(sanitize("<T as Trait>::Call"), "Call");
		assert_eq!(sanitize("<T as Trait<I>>::Balance"), "Balance");
		assert_eq!(sanitize("Vec<<T as frame_system::Config>::AccountId>"), "Vec<AccountId>");
		assert_eq!(sanitize("Box<<T as Config>::Call>"), "Box<Call>");
		assert_eq!(sanitize("<T::Lookup as StaticLookup>::Source"), "LookupSource");
		assert_eq!(sanitize("<T::Currency as Currency<T::AccountId>>::Balance"), "Balance");
	}

	#[test]
	fn should_remove_paths() {
		assert_eq!(sanitize("T::Moment"), "Moment");
		assert_eq!(sanitize("schedule::Period<T::BlockNumber>"), "Period<BlockNumber>");
		assert_eq!(sanitize("sp_runtime::generic::Era"), "Era");
		assert_eq!(sanitize("(T::AccountId, BalanceOf<T>)"), "(AccountId, BalanceOf<T>)");
	}

	#[test]
	fn should_remove_empty_generics_and_references() {
		assert_eq!(sanitize("Releases<()>"), "Releases");
		assert_eq!(sanitize("&'static [u8]"), "Vec<u8>");
		assert_eq!(sanitize("&[T::AccountId]"), "Vec<AccountId>");
		assert_eq!(sanitize("&'a str"), "str");
	}

	#[test]
	fn should_leave_plain_names_alone() {
		for ty in ["u32", "Vec<u8>", "[u8; 32]", "Option<(u32, bool)>", "Compact<Balance>"] {
			assert_eq!(sanitize(ty), ty);
		}
		assert_eq!(sanitize(" Vec<\n u8 >  "), "Vec< u8 >");
	}
}
