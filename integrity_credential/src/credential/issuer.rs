// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use serde::Serialize;

use integrity_core::common::Object;
use integrity_core::common::Url;

/// An identifier representing the issuer of a credential.
///
/// [More Info](https://www.w3.org/TR/vc-data-model-2.0/#issuer)
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Issuer {
  /// A credential issuer expressed as a Url.
  Url(Url),
  /// A credential issuer expressed as a JSON object.
  Obj {
    /// A Url identifying the credential issuer.
    id: Url,
    /// Additional properties of the credential issuer.
    #[serde(flatten)]
    properties: Object,
  },
}

impl Issuer {
  /// Returns a reference to the issuer Url.
  pub fn url(&self) -> &Url {
    match self {
      Self::Url(url) => url,
      Self::Obj { id, .. } => id,
    }
  }
}

impl From<Url> for Issuer {
  fn from(other: Url) -> Self {
    Self::Url(other)
  }
}
