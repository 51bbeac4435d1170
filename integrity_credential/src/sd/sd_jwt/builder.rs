// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use serde_json::json;
use tokio_util::sync::CancellationToken;

use integrity_core::common::Value;
use integrity_crypto::hash::HashAlgorithm;
use integrity_crypto::memory::PrivateKeyMemory;
use integrity_crypto::memory::SensitiveMemoryPool;
use integrity_crypto::registry::CryptoFunctionRegistry;
use integrity_crypto::tag::Algorithm;

use crate::error::Result;
use crate::sd::sd_jwt::jws;
use crate::sd::sd_jwt::SdJwtToken;
use crate::sd::sd_jwt::SdObjectEncoder;
use crate::sd::CredentialPath;
use crate::sd::Disclosure;
use crate::sd::SaltGenerator;

/// The `typ` header of an issuer-signed SD-JWT.
const HEADER_TYP: &str = "sd-jwt";

/// Builder structure to create an issuable SD-JWT.
pub struct SdJwtBuilder<'a> {
  encoder: SdObjectEncoder<'a>,
  disclosures: Vec<Disclosure>,
  confirmation_key: Option<Value>,
}

impl<'a> SdJwtBuilder<'a> {
  /// Creates a new builder over the claims `object`.
  pub fn new(object: Value, hash: HashAlgorithm, salt_generator: &'a dyn SaltGenerator) -> Result<Self> {
    Ok(Self {
      encoder: SdObjectEncoder::new(object, hash, salt_generator)?,
      disclosures: Vec::new(),
      confirmation_key: None,
    })
  }

  /// Substitutes the value at `path` with the digest of its disclosure.
  pub fn make_concealable(mut self, path: &CredentialPath) -> Result<Self> {
    let disclosure: Disclosure = self.encoder.conceal(path)?;
    self.disclosures.push(disclosure);
    Ok(self)
  }

  /// Adds `count` decoy digests to the object at `path`.
  pub fn add_decoys(mut self, path: &CredentialPath, count: usize) -> Result<Self> {
    self.encoder.add_decoys(path, count)?;
    Ok(self)
  }

  /// Requires proof of possession of `confirmation_key` from the holder by
  /// embedding it as the `cnf` claim.
  pub fn require_key_binding(mut self, confirmation_key: Value) -> Self {
    self.confirmation_key = Some(confirmation_key);
    self
  }

  /// Signs the payload through the registry and assembles the token.
  pub async fn finish(
    self,
    private_key: &PrivateKeyMemory,
    algorithm: Algorithm,
    registry: &CryptoFunctionRegistry,
    pool: &SensitiveMemoryPool,
    cancel: &CancellationToken,
  ) -> Result<SdJwtToken> {
    let SdJwtBuilder {
      mut encoder,
      disclosures,
      confirmation_key,
    } = self;
    encoder.add_sd_alg_property();

    let mut object: Value = encoder.into_object();
    if let Some(confirmation_key) = confirmation_key {
      object
        .as_object_mut()
        .expect("encoder payloads are objects")
        .insert("cnf".to_owned(), confirmation_key);
    }

    let header: Value = json!({
      "typ": HEADER_TYP,
      "alg": jws::algorithm_name(algorithm)?,
    });
    let jwt: String = jws::sign_compact(&header, &object, private_key, registry, pool, cancel).await?;

    let encoded: Vec<String> = disclosures.iter().map(Disclosure::encode_json).collect::<Result<_>>()?;
    SdJwtToken::new(jwt, encoded)
  }
}
