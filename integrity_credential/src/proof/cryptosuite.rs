// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use integrity_crypto::hash::HashAlgorithm;
use integrity_crypto::tag::Algorithm;

use crate::error::Error;
use crate::error::Result;

/// The canonicalization algorithm a cryptosuite hashes under.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum CanonicalizationKind {
  /// RDF Dataset Canonicalization (RDFC-1.0) over the JSON-LD document.
  Rdfc10,
  /// JSON Canonicalization Scheme (RFC 8785) over the plain JSON document.
  Jcs,
}

/// An immutable descriptor of a Data Integrity cryptosuite.
///
/// Consumers may define additional suites and add them to a
/// [`CryptosuiteCatalog`].
#[derive(Clone, Debug)]
pub struct CryptosuiteInfo {
  name: String,
  canonicalization: CanonicalizationKind,
  hash: String,
  signature_algorithm: Algorithm,
  required_contexts: Vec<String>,
  method_compatibility: fn(&str) -> bool,
}

impl CryptosuiteInfo {
  /// Creates a new suite descriptor.
  ///
  /// `hash` is the wire name of the digest algorithm, e.g. `SHA-256`; it is
  /// normalized (hyphens stripped, case-folded) when resolved at run time.
  pub fn new(
    name: impl Into<String>,
    canonicalization: CanonicalizationKind,
    hash: impl Into<String>,
    signature_algorithm: Algorithm,
    required_contexts: Vec<String>,
    method_compatibility: fn(&str) -> bool,
  ) -> Self {
    Self {
      name: name.into(),
      canonicalization,
      hash: hash.into(),
      signature_algorithm,
      required_contexts,
      method_compatibility,
    }
  }

  /// The `eddsa-rdfc-2022` suite.
  pub fn eddsa_rdfc_2022() -> Self {
    Self::new(
      "eddsa-rdfc-2022",
      CanonicalizationKind::Rdfc10,
      "SHA-256",
      Algorithm::ED25519,
      vec!["https://www.w3.org/ns/credentials/v2".to_owned()],
      compatible_with_eddsa_methods,
    )
  }

  /// The `eddsa-jcs-2022` suite.
  pub fn eddsa_jcs_2022() -> Self {
    Self::new(
      "eddsa-jcs-2022",
      CanonicalizationKind::Jcs,
      "SHA-256",
      Algorithm::ED25519,
      vec!["https://www.w3.org/ns/credentials/v2".to_owned()],
      compatible_with_eddsa_methods,
    )
  }

  /// The `ecdsa-rdfc-2019` suite.
  pub fn ecdsa_rdfc_2019() -> Self {
    Self::new(
      "ecdsa-rdfc-2019",
      CanonicalizationKind::Rdfc10,
      "SHA-256",
      Algorithm::P256,
      vec!["https://www.w3.org/ns/credentials/v2".to_owned()],
      compatible_with_ecdsa_methods,
    )
  }

  /// The `ecdsa-jcs-2019` suite.
  pub fn ecdsa_jcs_2019() -> Self {
    Self::new(
      "ecdsa-jcs-2019",
      CanonicalizationKind::Jcs,
      "SHA-256",
      Algorithm::P256,
      vec!["https://www.w3.org/ns/credentials/v2".to_owned()],
      compatible_with_ecdsa_methods,
    )
  }

  /// Returns the suite name, e.g. `eddsa-rdfc-2022`.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Returns the canonicalization algorithm.
  pub fn canonicalization(&self) -> CanonicalizationKind {
    self.canonicalization
  }

  /// Returns the wire name of the digest algorithm.
  pub fn hash_name(&self) -> &str {
    &self.hash
  }

  /// Resolves the runtime digest implementation.
  ///
  /// # Errors
  ///
  /// [`Error::UnknownHashAlgorithm`] when no implementation matches the
  /// normalized name.
  pub fn hash_algorithm(&self) -> Result<HashAlgorithm> {
    HashAlgorithm::from_name(&self.hash).ok_or_else(|| Error::UnknownHashAlgorithm(self.hash.clone()))
  }

  /// Returns the signature algorithm tag.
  pub fn signature_algorithm(&self) -> Algorithm {
    self.signature_algorithm
  }

  /// Returns the JSON-LD contexts a conforming document must carry.
  pub fn required_contexts(&self) -> &[String] {
    &self.required_contexts
  }

  /// Returns whether the suite can verify proofs referencing a verification
  /// method of the given type.
  pub fn is_compatible_method(&self, method_type: &str) -> bool {
    (self.method_compatibility)(method_type)
  }
}

fn compatible_with_eddsa_methods(method_type: &str) -> bool {
  matches!(method_type, "Multikey" | "Ed25519VerificationKey2020")
}

fn compatible_with_ecdsa_methods(method_type: &str) -> bool {
  matches!(method_type, "Multikey" | "EcdsaSecp256r1VerificationKey2019")
}

/// A catalog of registered cryptosuites, append-only at startup.
#[derive(Debug)]
pub struct CryptosuiteCatalog {
  suites: HashMap<String, CryptosuiteInfo>,
}

impl CryptosuiteCatalog {
  /// Creates an empty catalog.
  pub fn new() -> Self {
    Self { suites: HashMap::new() }
  }

  /// Registers `suite`, failing on a name collision.
  pub fn register(&mut self, suite: CryptosuiteInfo) -> Result<()> {
    if self.suites.contains_key(suite.name()) {
      return Err(Error::DuplicateCryptosuite(suite.name().to_owned()));
    }
    self.suites.insert(suite.name().to_owned(), suite);
    Ok(())
  }

  /// Looks up a suite by name.
  pub fn get(&self, name: &str) -> Option<&CryptosuiteInfo> {
    self.suites.get(name)
  }
}

impl Default for CryptosuiteCatalog {
  /// A catalog pre-registered with the standard EdDSA and ECDSA suites.
  fn default() -> Self {
    let mut catalog: Self = Self::new();
    for suite in [
      CryptosuiteInfo::eddsa_rdfc_2022(),
      CryptosuiteInfo::eddsa_jcs_2022(),
      CryptosuiteInfo::ecdsa_rdfc_2019(),
      CryptosuiteInfo::ecdsa_jcs_2019(),
    ] {
      catalog.register(suite).expect("standard suite names are distinct");
    }
    catalog
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn standard_suites_are_registered() {
    let catalog: CryptosuiteCatalog = CryptosuiteCatalog::default();
    let suite: &CryptosuiteInfo = catalog.get("eddsa-rdfc-2022").unwrap();
    assert_eq!(suite.canonicalization(), CanonicalizationKind::Rdfc10);
    assert_eq!(suite.hash_algorithm().unwrap(), HashAlgorithm::Sha256);
    assert_eq!(suite.signature_algorithm(), Algorithm::ED25519);
    assert!(suite.is_compatible_method("Multikey"));
    assert!(!suite.is_compatible_method("JsonWebKey2020"));
  }

  #[test]
  fn duplicate_names_are_rejected() {
    let mut catalog: CryptosuiteCatalog = CryptosuiteCatalog::default();
    assert!(matches!(
      catalog.register(CryptosuiteInfo::eddsa_jcs_2022()),
      Err(Error::DuplicateCryptosuite(_))
    ));
  }

  #[test]
  fn hash_names_resolve_after_normalization() {
    let suite: CryptosuiteInfo = CryptosuiteInfo::new(
      "custom-suite",
      CanonicalizationKind::Jcs,
      "sha256",
      Algorithm::ED25519,
      Vec::new(),
      |_| true,
    );
    assert_eq!(suite.hash_algorithm().unwrap(), HashAlgorithm::Sha256);
  }
}
