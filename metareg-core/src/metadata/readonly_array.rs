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

use serde::Serialize;
use std::ops::Deref;

/// A `Vec<T>` that can no longer be added to or removed from once built, so that
/// positions handed out (see [`super::StorageLocation`]) stay valid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReadonlyArray<T>(Box<[T]>);

impl<T> From<Vec<T>> for ReadonlyArray<T> {
	fn from(v: Vec<T>) -> Self {
		ReadonlyArray(v.into_boxed_slice())
	}
}

impl<T> Deref for ReadonlyArray<T> {
	type Target = [T];
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
