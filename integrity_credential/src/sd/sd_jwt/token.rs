// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use core::fmt;
use core::str::FromStr;

use itertools::Itertools;
use tokio_util::sync::CancellationToken;

use integrity_core::common::Value;
use integrity_crypto::hash::HashAlgorithm;
use integrity_crypto::memory::PublicKeyMemory;
use integrity_crypto::memory::SensitiveMemoryPool;
use integrity_crypto::registry::CryptoFunctionRegistry;
use integrity_crypto::tag::Algorithm;

use crate::error::Error;
use crate::error::Result;
use crate::sd::sd_jwt::jws;
use crate::sd::CredentialPath;
use crate::sd::Disclosure;
use crate::sd::PathLattice;

/// An issued SD-JWT: issuer-signed JWT, ordered disclosures, optional key
/// binding JWT.
///
/// The wire form is `<jwt>~<disclosure>~…~[<kb-jwt>]`; an empty trailing
/// token denotes the absence of key binding. Disclosures are stored in
/// their encoded form so the bytes that were issued are the bytes that are
/// hashed and presented.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SdJwtToken {
  jwt: String,
  disclosures: Vec<String>,
  key_binding_jwt: Option<String>,
}

impl SdJwtToken {
  /// Creates a token from an issuer JWT and encoded disclosures.
  pub fn new(jwt: String, disclosures: Vec<String>) -> Result<Self> {
    check_jwt_structure(&jwt)?;
    Ok(Self {
      jwt,
      disclosures,
      key_binding_jwt: None,
    })
  }

  /// Parses the `~`-separated wire form.
  pub fn parse(wire: &str) -> Result<Self> {
    let mut parts: Vec<&str> = wire.split('~').collect();
    if parts.len() < 2 {
      return Err(Error::InvalidJwtStructure);
    }
    let key_binding: &str = parts.pop().expect("at least two parts");
    let jwt: &str = parts.remove(0);
    check_jwt_structure(jwt)?;
    if parts.iter().any(|disclosure| disclosure.is_empty()) {
      return Err(Error::InvalidJwtStructure);
    }
    let key_binding_jwt: Option<String> = if key_binding.is_empty() {
      None
    } else {
      check_jwt_structure(key_binding)?;
      Some(key_binding.to_owned())
    };
    Ok(Self {
      jwt: jwt.to_owned(),
      disclosures: parts.into_iter().map(str::to_owned).collect(),
      key_binding_jwt,
    })
  }

  /// Returns the issuer-signed JWT.
  pub fn jwt(&self) -> &str {
    &self.jwt
  }

  /// Returns the encoded disclosures in issuance order.
  pub fn disclosures(&self) -> &[String] {
    &self.disclosures
  }

  /// Returns the key binding JWT, if attached.
  pub fn key_binding_jwt(&self) -> Option<&str> {
    self.key_binding_jwt.as_deref()
  }

  /// Attaches a key binding JWT.
  pub fn with_key_binding(mut self, kb_jwt: String) -> Result<Self> {
    check_jwt_structure(&kb_jwt)?;
    self.key_binding_jwt = Some(kb_jwt);
    Ok(self)
  }

  /// Returns the full wire form.
  pub fn presentation(&self) -> String {
    format!(
      "{}{}",
      self.sd_hash_payload(),
      self.key_binding_jwt.as_deref().unwrap_or_default()
    )
  }

  /// Returns the prefix covered by a key-binding `sd_hash`: the issuer JWT
  /// and every disclosure, each followed by `~`, without any KB-JWT.
  pub fn sd_hash_payload(&self) -> String {
    if self.disclosures.is_empty() {
      format!("{}~", self.jwt)
    } else {
      format!("{}~{}~", self.jwt, self.disclosures.iter().join("~"))
    }
  }

  /// Decodes the issuer JWT claims.
  pub fn claims(&self) -> Result<Value> {
    Ok(jws::decode_compact(&self.jwt)?.claims)
  }

  /// Verifies the issuer JWT signature through the registry.
  pub async fn verify_signature(
    &self,
    public_key: &PublicKeyMemory,
    algorithm: Algorithm,
    registry: &CryptoFunctionRegistry,
    pool: &SensitiveMemoryPool,
    cancel: &CancellationToken,
  ) -> Result<bool> {
    jws::verify_compact(&self.jwt, public_key, algorithm, registry, pool, cancel).await
  }

  /// Returns the digest algorithm named by `_sd_alg`, defaulting to
  /// `sha-256`.
  pub fn hash_algorithm(&self) -> Result<HashAlgorithm> {
    match self.claims()?.get(crate::sd::disclosure::SD_ALG_KEY) {
      Some(Value::String(name)) => {
        HashAlgorithm::from_name(name).ok_or_else(|| Error::UnknownHashAlgorithm(name.clone()))
      }
      Some(_) => Err(Error::UnknownHashAlgorithm("non-string _sd_alg".to_owned())),
      None => Ok(HashAlgorithm::Sha256),
    }
  }

  /// Parses the carried disclosures.
  pub fn parsed_disclosures(&self) -> Result<Vec<Disclosure>> {
    self.disclosures.iter().map(|encoded| Disclosure::parse_json(encoded)).collect()
  }

  /// Builds the path lattice of this token.
  pub fn lattice(&self) -> Result<PathLattice> {
    PathLattice::analyze_json(&self.claims()?, &self.disclosures, self.hash_algorithm()?)
  }

  /// Builds a presentation revealing exactly the disclosures needed for
  /// `targets`, ancestors included.
  ///
  /// Any existing key binding is removed; it must be recomputed over the
  /// new disclosure set.
  pub fn select(&self, targets: &[CredentialPath]) -> Result<Self> {
    let hash: HashAlgorithm = self.hash_algorithm()?;
    let lattice: PathLattice = self.lattice()?;
    let needed: Vec<String> = lattice.minimum_disclosure(targets)?;
    let disclosures: Vec<String> = self
      .disclosures
      .iter()
      .filter(|encoded| needed.contains(&crate::sd::disclosure::digest_encoded(encoded, hash)))
      .cloned()
      .collect();
    Ok(Self {
      jwt: self.jwt.clone(),
      disclosures,
      key_binding_jwt: None,
    })
  }

  /// Builds a presentation from an explicit subset of encoded disclosures,
  /// enforcing that no descendant is revealed before its ancestor.
  pub fn retain(&self, keep: &[String]) -> Result<Self> {
    let hash: HashAlgorithm = self.hash_algorithm()?;
    let lattice: PathLattice = self.lattice()?;
    for encoded in keep {
      if !self.disclosures.contains(encoded) {
        return Err(Error::DisclosureNotInToken);
      }
    }
    let selected: std::collections::BTreeSet<String> = keep
      .iter()
      .map(|encoded| crate::sd::disclosure::digest_encoded(encoded, hash))
      .collect();
    lattice.validate_selection(&selected)?;
    let disclosures: Vec<String> = self
      .disclosures
      .iter()
      .filter(|disclosure| keep.contains(*disclosure))
      .cloned()
      .collect();
    Ok(Self {
      jwt: self.jwt.clone(),
      disclosures,
      key_binding_jwt: None,
    })
  }
}

impl fmt::Display for SdJwtToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.presentation())
  }
}

impl FromStr for SdJwtToken {
  type Err = Error;

  fn from_str(string: &str) -> Result<Self, Self::Err> {
    Self::parse(string)
  }
}

fn check_jwt_structure(jwt: &str) -> Result<()> {
  if jwt.split('.').count() != 3 || jwt.split('.').any(str::is_empty) {
    return Err(Error::InvalidJwtStructure);
  }
  Ok(())
}
