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

//! Parse (sanitized) type names into a small expression tree.

use std::fmt;
use std::str::FromStr;

/// A parsed type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
	/// A plain name such as `u32` or `AccountId`.
	Name(String),
	/// A name with type parameters, such as `Vec<u8>` or `Int<64>`.
	Generic { name: String, params: Vec<TypeExpr> },
	/// `()` is the empty tuple.
	Tuple(Vec<TypeExpr>),
	/// `[u8; 32]`
	Array { ty: Box<TypeExpr>, len: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeExprError {
	#[error("unexpected end of type name `{0}`")]
	UnexpectedEnd(String),
	#[error("unexpected `{found}` at position {pos} in type name `{input}`")]
	Unexpected { input: String, pos: usize, found: char },
	#[error("invalid array length `{len}` in type name `{input}`")]
	InvalidArrayLength { input: String, len: String },
}

impl TypeExpr {
	pub fn parse(s: &str) -> Result<TypeExpr, TypeExprError> {
		let mut parser = Parser { input: s, chars: s.chars().collect(), pos: 0 };
		let expr = parser.expr()?;
		parser.skip_whitespace();
		match parser.peek() {
			None => Ok(expr),
			Some(c) => Err(parser.unexpected(c)),
		}
	}

	/// The name of a `Name` or `Generic` expression.
	pub fn name(&self) -> Option<&str> {
		match self {
			TypeExpr::Name(name) | TypeExpr::Generic { name, .. } => Some(name),
			_ => None,
		}
	}

	/// The type parameters of a `Generic` expression; empty otherwise.
	pub fn params(&self) -> &[TypeExpr] {
		match self {
			TypeExpr::Generic { params, .. } => params,
			_ => &[],
		}
	}

	pub fn unit() -> TypeExpr {
		TypeExpr::Tuple(Vec::new())
	}
}

impl FromStr for TypeExpr {
	type Err = TypeExprError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		TypeExpr::parse(s)
	}
}

impl fmt::Display for TypeExpr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TypeExpr::Name(name) => f.write_str(name),
			TypeExpr::Generic { name, params } => {
				write!(f, "{}<", name)?;
				write_list(f, params)?;
				f.write_str(">")
			}
			TypeExpr::Tuple(items) => {
				f.write_str("(")?;
				write_list(f, items)?;
				if items.len() == 1 {
					f.write_str(",")?;
				}
				f.write_str(")")
			}
			TypeExpr::Array { ty, len } => write!(f, "[{}; {}]", ty, len),
		}
	}
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeExpr]) -> fmt::Result {
	for (i, item) in items.iter().enumerate() {
		if i > 0 {
			f.write_str(", ")?;
		}
		write!(f, "{}", item)?;
	}
	Ok(())
}

struct Parser<'a> {
	input: &'a str,
	chars: Vec<char>,
	pos: usize,
}

impl<'a> Parser<'a> {
	fn peek(&self) -> Option<char> {
		self.chars.get(self.pos).copied()
	}

	fn skip_whitespace(&mut self) {
		while self.peek().map_or(false, char::is_whitespace) {
			self.pos += 1;
		}
	}

	fn unexpected(&self, found: char) -> TypeExprError {
		TypeExprError::Unexpected { input: self.input.to_string(), pos: self.pos, found }
	}

	fn eof(&self) -> TypeExprError {
		TypeExprError::UnexpectedEnd(self.input.to_string())
	}

	fn expect(&mut self, c: char) -> Result<(), TypeExprError> {
		self.skip_whitespace();
		match self.peek() {
			Some(found) if found == c => {
				self.pos += 1;
				Ok(())
			}
			Some(found) => Err(self.unexpected(found)),
			None => Err(self.eof()),
		}
	}

	/// Consume `c` if it's next, ignoring whitespace.
	fn eat(&mut self, c: char) -> bool {
		self.skip_whitespace();
		if self.peek() == Some(c) {
			self.pos += 1;
			true
		} else {
			false
		}
	}

	fn ident(&mut self) -> Result<String, TypeExprError> {
		self.skip_whitespace();
		let start = self.pos;
		while self.peek().map_or(false, |c| c.is_alphanumeric() || c == '_') {
			self.pos += 1;
		}
		if start == self.pos {
			return Err(match self.peek() {
				Some(c) => self.unexpected(c),
				None => self.eof(),
			});
		}
		Ok(self.chars[start..self.pos].iter().collect())
	}

	fn expr(&mut self) -> Result<TypeExpr, TypeExprError> {
		self.skip_whitespace();
		match self.peek() {
			Some('(') => self.tuple(),
			Some('[') => self.array(),
			Some(_) => {
				let name = self.ident()?;
				if self.eat('<') {
					let params = self.list('>')?;
					Ok(TypeExpr::Generic { name, params })
				} else {
					Ok(TypeExpr::Name(name))
				}
			}
			None => Err(self.eof()),
		}
	}

	fn tuple(&mut self) -> Result<TypeExpr, TypeExprError> {
		self.expect('(')?;
		let mut items = Vec::new();
		let mut trailing_comma = false;
		while !self.eat(')') {
			items.push(self.expr()?);
			trailing_comma = self.eat(',');
			if !trailing_comma {
				self.expect(')')?;
				break;
			}
		}
		// `(T)` is just `T`, while `(T,)` is a 1-tuple.
		if items.len() == 1 && !trailing_comma {
			return Ok(items.remove(0));
		}
		Ok(TypeExpr::Tuple(items))
	}

	fn array(&mut self) -> Result<TypeExpr, TypeExprError> {
		self.expect('[')?;
		let ty = self.expr()?;
		self.expect(';')?;
		let len = self.ident()?;
		self.expect(']')?;
		let len = len
			.parse::<u32>()
			.map_err(|_| TypeExprError::InvalidArrayLength { input: self.input.to_string(), len })?;
		Ok(TypeExpr::Array { ty: Box::new(ty), len })
	}

	/// Comma separated expressions up to `close`.
	fn list(&mut self, close: char) -> Result<Vec<TypeExpr>, TypeExprError> {
		let mut items = Vec::new();
		loop {
			if self.eat(close) {
				return Ok(items);
			}
			items.push(self.expr()?);
			if !self.eat(',') {
				self.expect(close)?;
				return Ok(items);
			}
		}
	}
}
