// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

pub use multibase::Base;

use crate::error::Error;
use crate::error::Result;

/// Utilities for encoding binary text with support for multiple encodings.
pub struct BaseEncoding;

impl BaseEncoding {
  /// Encodes `data` as `base` text, without a multibase prefix character.
  pub fn encode<T>(data: &T, base: Base) -> String
  where
    T: AsRef<[u8]> + ?Sized,
  {
    base.encode(data)
  }

  /// Decodes `base`-encoded text without a multibase prefix character.
  pub fn decode<T>(data: &T, base: Base) -> Result<Vec<u8>>
  where
    T: AsRef<str> + ?Sized,
  {
    base.decode(data).map_err(|_| Error::InvalidMultibase)
  }

  /// Encodes `data` as [multibase](https://datatracker.ietf.org/doc/html/draft-multiformats-multibase)
  /// text with the given `base`, defaulting to [`Base::Base58Btc`].
  pub fn encode_multibase<T>(data: &T, base: Option<Base>) -> String
  where
    T: AsRef<[u8]> + ?Sized,
  {
    multibase::encode(base.unwrap_or(Base::Base58Btc), data)
  }

  /// Decodes multibase-encoded text, identifying the base from its leading
  /// character.
  pub fn decode_multibase<T>(data: &T) -> Result<(Base, Vec<u8>)>
  where
    T: AsRef<str> + ?Sized,
  {
    multibase::decode(data).map_err(|error| match error {
      multibase::Error::UnknownBase(_) => Error::UnknownMultibase,
      _ => Error::InvalidMultibase,
    })
  }
}
