// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use core::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::common::Object;
use crate::common::Url;

/// A reference to a JSON-LD context.
///
/// [More Info](https://www.w3.org/TR/vc-data-model/#contexts)
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Context {
  /// A JSON-LD context expressed as a Url.
  Url(Url),
  /// A JSON-LD context expressed as a JSON object.
  Obj(Object),
}

impl fmt::Debug for Context {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Url(inner) => fmt::Debug::fmt(inner, f),
      Self::Obj(inner) => fmt::Debug::fmt(inner, f),
    }
  }
}

impl From<Url> for Context {
  fn from(other: Url) -> Self {
    Self::Url(other)
  }
}

impl From<Object> for Context {
  fn from(other: Object) -> Self {
    Self::Obj(other)
  }
}
