// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Display;

use once_cell::sync::Lazy;

use crate::error::DispatchError;
use crate::error::DispatchErrorKind;
use crate::error::DispatchResult;

use super::context_kind::ContextKind;
use super::registry::KindRegistry;

/// First code available for user-defined context values. Codes below this
/// are reserved for the library.
pub const CUSTOM_RANGE_START: u32 = 1000;

static ALGORITHMS: Lazy<KindRegistry> = Lazy::new(|| {
  KindRegistry::new(&[
    (0, "P256"),
    (1, "P384"),
    (2, "P521"),
    (3, "RSA-2048"),
    (4, "RSA-4096"),
    (5, "Ed25519"),
    (6, "X25519"),
    (7, "Secp256k1"),
    (8, "BLS12-381-G1"),
    (9, "BLS12-381-G2"),
    (10, "BLS12-381-G1G2"),
  ])
});

static PURPOSES: Lazy<KindRegistry> = Lazy::new(|| {
  KindRegistry::new(&[
    (0, "Signing"),
    (1, "Verification"),
    (2, "Exchange"),
    (3, "Wrapped"),
    (4, "Signature"),
    (5, "Encryption"),
    (6, "Nonce"),
    (7, "Auth"),
    (8, "Digest"),
    (9, "Transport"),
    (10, "Data"),
  ])
});

static ENCODING_SCHEMES: Lazy<KindRegistry> = Lazy::new(|| {
  KindRegistry::new(&[
    (0, "Der"),
    (1, "Pem"),
    (2, "EcCompressed"),
    (3, "EcUncompressed"),
    (4, "Pkcs1"),
    (5, "Pkcs8"),
    (6, "Raw"),
  ])
});

static MATERIAL_SEMANTICS: Lazy<KindRegistry> = Lazy::new(|| KindRegistry::new(&[(0, "Direct"), (1, "TpmHandle")]));

pub(crate) fn is_registered(kind: ContextKind, code: u32) -> bool {
  registry_of(kind).contains(code)
}

pub(crate) fn name_of(kind: ContextKind, code: u32) -> Option<String> {
  registry_of(kind).name_of(code)
}

fn registry_of(kind: ContextKind) -> &'static KindRegistry {
  match kind {
    ContextKind::Algorithm => &ALGORITHMS,
    ContextKind::Purpose => &PURPOSES,
    ContextKind::EncodingScheme => &ENCODING_SCHEMES,
    ContextKind::MaterialSemantics => &MATERIAL_SEMANTICS,
  }
}

fn try_from_code(kind: ContextKind, code: u32) -> DispatchResult<u32> {
  if registry_of(kind).contains(code) {
    Ok(code)
  } else {
    Err(DispatchError::new(DispatchErrorKind::UnregisteredValue).with_message(format!("{kind} code {code}")))
  }
}

macro_rules! context_value_type {
  ($(#[$doc:meta])* $name:ident, $kind:expr) => {
    $(#[$doc])*
    #[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
    pub struct $name(u32);

    impl $name {
      /// Returns the integer code of this value.
      pub const fn code(&self) -> u32 {
        self.0
      }

      /// Returns the value registered under `code`.
      ///
      /// # Errors
      ///
      /// Fails when `code` has not been registered for this kind.
      pub fn try_from_code(code: u32) -> DispatchResult<Self> {
        try_from_code($kind, code).map(Self)
      }

      /// Registers a custom value under `code` and returns it.
      ///
      /// Intended to be called during process initialization only. `code`
      /// must be at least [`CUSTOM_RANGE_START`]; duplicate codes fail.
      pub fn register(code: u32, name: &'static str) -> DispatchResult<Self> {
        registry_of($kind).register(code, name)?;
        Ok(Self(code))
      }

      /// Returns the registered display name, if any.
      pub fn name(&self) -> Option<String> {
        name_of($kind, self.0)
      }

      pub(crate) const fn from_code_unchecked(code: u32) -> Self {
        Self(code)
      }
    }

    impl Display for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
          Some(name) => write!(f, "{name}"),
          None => write!(f, "{}#{}", $kind, self.0),
        }
      }
    }
  };
}

context_value_type! {
  /// A cryptographic algorithm discriminator.
  Algorithm, ContextKind::Algorithm
}

context_value_type! {
  /// The purpose of a tagged byte buffer.
  Purpose, ContextKind::Purpose
}

context_value_type! {
  /// The serialization format of tagged bytes.
  EncodingScheme, ContextKind::EncodingScheme
}

context_value_type! {
  /// How tagged bytes relate to the actual key material.
  MaterialSemantics, ContextKind::MaterialSemantics
}

impl Algorithm {
  /// NIST P-256 (secp256r1).
  pub const P256: Self = Self(0);
  /// NIST P-384 (secp384r1).
  pub const P384: Self = Self(1);
  /// NIST P-521 (secp521r1).
  pub const P521: Self = Self(2);
  /// RSA with a 2048-bit modulus.
  pub const RSA_2048: Self = Self(3);
  /// RSA with a 4096-bit modulus.
  pub const RSA_4096: Self = Self(4);
  /// Ed25519 (EdDSA over Curve25519).
  pub const ED25519: Self = Self(5);
  /// X25519 (ECDH over Curve25519).
  pub const X25519: Self = Self(6);
  /// secp256k1.
  pub const SECP256K1: Self = Self(7);
  /// BLS12-381 in the G1 group.
  pub const BLS12_381_G1: Self = Self(8);
  /// BLS12-381 in the G2 group.
  pub const BLS12_381_G2: Self = Self(9);
  /// BLS12-381 with both group elements.
  pub const BLS12_381_G1G2: Self = Self(10);
}

impl Purpose {
  /// Private signing material.
  pub const SIGNING: Self = Self(0);
  /// Public verification material.
  pub const VERIFICATION: Self = Self(1);
  /// Key-exchange material.
  pub const EXCHANGE: Self = Self(2);
  /// Material wrapped by another key.
  pub const WRAPPED: Self = Self(3);
  /// A signature value.
  pub const SIGNATURE: Self = Self(4);
  /// Encryption material.
  pub const ENCRYPTION: Self = Self(5);
  /// A nonce.
  pub const NONCE: Self = Self(6);
  /// Authentication material.
  pub const AUTH: Self = Self(7);
  /// A digest value.
  pub const DIGEST: Self = Self(8);
  /// Transport-protection material.
  pub const TRANSPORT: Self = Self(9);
  /// Uninterpreted payload data.
  pub const DATA: Self = Self(10);
}

impl EncodingScheme {
  /// DER-encoded bytes.
  pub const DER: Self = Self(0);
  /// PEM-encoded text.
  pub const PEM: Self = Self(1);
  /// A compressed SEC1 elliptic-curve point.
  pub const EC_COMPRESSED: Self = Self(2);
  /// An uncompressed SEC1 elliptic-curve point.
  pub const EC_UNCOMPRESSED: Self = Self(3);
  /// PKCS#1 structure.
  pub const PKCS1: Self = Self(4);
  /// PKCS#8 structure.
  pub const PKCS8: Self = Self(5);
  /// Raw algorithm-defined bytes.
  pub const RAW: Self = Self(6);
}

impl MaterialSemantics {
  /// The buffer holds the key material itself.
  pub const DIRECT: Self = Self(0);
  /// The buffer holds a TPM key handle; the material never leaves the TPM.
  pub const TPM_HANDLE: Self = Self(1);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_values_are_registered() {
    assert!(is_registered(ContextKind::Algorithm, Algorithm::ED25519.code()));
    assert!(is_registered(ContextKind::Purpose, Purpose::SIGNING.code()));
    assert!(is_registered(ContextKind::MaterialSemantics, MaterialSemantics::TPM_HANDLE.code()));
    assert_eq!(Algorithm::ED25519.name().as_deref(), Some("Ed25519"));
  }

  #[test]
  fn custom_codes_below_range_are_rejected() {
    let error: DispatchError = Algorithm::register(999, "reject-me").unwrap_err();
    assert_eq!(error.kind(), &DispatchErrorKind::ReservedCode);
  }

  #[test]
  fn duplicate_custom_codes_are_rejected() {
    Algorithm::register(7001, "first").unwrap();
    let error: DispatchError = Algorithm::register(7001, "second").unwrap_err();
    assert_eq!(error.kind(), &DispatchErrorKind::DuplicateRegistration);
  }

  #[test]
  fn unregistered_codes_are_rejected() {
    assert!(Purpose::try_from_code(42).is_err());
    assert!(Purpose::try_from_code(Purpose::DIGEST.code()).is_ok());
  }
}
