// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Display;

/// The discriminator domains a [`Tag`][crate::tag::Tag] may carry values for.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum ContextKind {
  /// The cryptographic algorithm of the tagged material.
  Algorithm,
  /// What the tagged material is used for.
  Purpose,
  /// The serialization format of the tagged bytes.
  EncodingScheme,
  /// How the tagged bytes relate to the actual key material, e.g. raw bytes
  /// versus a hardware handle.
  MaterialSemantics,
}

impl Display for ContextKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let kind: &str = match self {
      Self::Algorithm => "Algorithm",
      Self::Purpose => "Purpose",
      Self::EncodingScheme => "EncodingScheme",
      Self::MaterialSemantics => "MaterialSemantics",
    };
    write!(f, "{kind}")
  }
}
