// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Hash algorithms shared by the proof and selective-disclosure engines.

use sha2::Digest;
use sha2::Sha256;
use sha2::Sha384;
use sha2::Sha512;

/// A supported digest algorithm.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum HashAlgorithm {
  /// SHA-256.
  Sha256,
  /// SHA-384.
  Sha384,
  /// SHA-512.
  Sha512,
}

impl HashAlgorithm {
  /// Resolves a wire or runtime name.
  ///
  /// Names are normalized by stripping hyphens and case-folding before
  /// lookup, so `SHA-256`, `sha-256` and `SHA256` all resolve to
  /// [`HashAlgorithm::Sha256`].
  pub fn from_name(name: &str) -> Option<Self> {
    let normalized: String = name.replace('-', "").to_ascii_lowercase();
    match normalized.as_str() {
      "sha256" => Some(Self::Sha256),
      "sha384" => Some(Self::Sha384),
      "sha512" => Some(Self::Sha512),
      _ => None,
    }
  }

  /// Returns the hyphenated wire name, e.g. `SHA-256`.
  pub const fn name(&self) -> &'static str {
    match self {
      Self::Sha256 => "SHA-256",
      Self::Sha384 => "SHA-384",
      Self::Sha512 => "SHA-512",
    }
  }

  /// Returns the lowercase IANA hash name used by `_sd_alg`, e.g. `sha-256`.
  pub const fn ietf_name(&self) -> &'static str {
    match self {
      Self::Sha256 => "sha-256",
      Self::Sha384 => "sha-384",
      Self::Sha512 => "sha-512",
    }
  }

  /// Returns the COSE algorithm identifier carried by the `sd_alg` header.
  pub const fn cose_identifier(&self) -> i64 {
    match self {
      Self::Sha256 => -16,
      Self::Sha384 => -43,
      Self::Sha512 => -44,
    }
  }

  /// Resolves a COSE algorithm identifier.
  pub fn from_cose_identifier(identifier: i64) -> Option<Self> {
    match identifier {
      -16 => Some(Self::Sha256),
      -43 => Some(Self::Sha384),
      -44 => Some(Self::Sha512),
      _ => None,
    }
  }

  /// Returns the digest length in bytes.
  pub const fn output_len(&self) -> usize {
    match self {
      Self::Sha256 => 32,
      Self::Sha384 => 48,
      Self::Sha512 => 64,
    }
  }

  /// Hashes `data`.
  pub fn digest(&self, data: &[u8]) -> Vec<u8> {
    match self {
      Self::Sha256 => Sha256::digest(data).to_vec(),
      Self::Sha384 => Sha384::digest(data).to_vec(),
      Self::Sha512 => Sha512::digest(data).to_vec(),
    }
  }
}
