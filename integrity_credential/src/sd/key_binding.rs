// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Key binding JWTs: proof of possession of the key bound in the
//! issuer-signed `cnf` claim.

use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use integrity_core::common::Timestamp;
use integrity_core::common::Value;
use integrity_core::encoding::Base;
use integrity_core::encoding::BaseEncoding;
use integrity_crypto::hash::HashAlgorithm;
use integrity_crypto::memory::PrivateKeyMemory;
use integrity_crypto::memory::PublicKeyMemory;
use integrity_crypto::memory::SensitiveMemoryPool;
use integrity_crypto::registry::CryptoFunctionRegistry;
use integrity_crypto::tag::Algorithm;

use crate::error::Result;
use crate::sd::sd_jwt::jws;
use crate::sd::sd_jwt::SdJwtToken;

/// The `typ` header of a key binding JWT.
pub const KB_JWT_TYP: &str = "kb+jwt";

/// The claims of a key binding JWT.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyBindingClaims {
  /// Issuance time, seconds since the Unix epoch.
  pub iat: i64,
  /// The intended audience (the verifier).
  pub aud: String,
  /// The verifier-supplied nonce.
  pub nonce: String,
  /// Base64url of the digest over the presentation prefix.
  pub sd_hash: String,
}

/// The outcome of validating a key binding token.
///
/// Produced as a value: every variant, including the failures, is an
/// expected outcome of untrusted input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[non_exhaustive]
pub enum KeyBindingValidation {
  /// All required checks passed.
  Valid,
  /// The `aud` claim does not match the expected audience.
  AudienceMismatch,
  /// The `nonce` claim does not match the expected nonce.
  NonceMismatch,
  /// The token carries no `iat` claim.
  MissingIat,
  /// `iat` lies beyond the allowed clock skew.
  IatInFuture,
  /// The recomputed presentation digest does not match `sd_hash`.
  SdHashMismatch,
}

/// Caller-supplied expectations for key binding validation.
///
/// `now` is explicit: the engine never reads the system clock.
#[derive(Clone, Debug)]
pub struct KeyBindingValidationOptions<'a> {
  /// The audience the token must name, when required.
  pub expected_audience: Option<&'a str>,
  /// The nonce the token must carry, when required.
  pub expected_nonce: Option<&'a str>,
  /// The validation instant.
  pub now: Timestamp,
  /// Tolerated clock skew, in seconds.
  pub allowed_clock_skew_seconds: i64,
}

/// Builds and signs KB-JWTs over the dispatch registry.
#[derive(Clone, Debug)]
pub struct KeyBindingJwtBuilder {
  audience: String,
  nonce: String,
  issued_at: Timestamp,
}

impl KeyBindingJwtBuilder {
  /// Creates a builder for the given audience, nonce, and issuance time.
  pub fn new(audience: impl Into<String>, nonce: impl Into<String>, issued_at: Timestamp) -> Self {
    Self {
      audience: audience.into(),
      nonce: nonce.into(),
      issued_at,
    }
  }

  /// Signs a KB-JWT binding `token`'s current presentation.
  ///
  /// The `sd_hash` covers the issuer JWT and every selected disclosure,
  /// each followed by `~`, without any previous KB-JWT.
  pub async fn sign(
    &self,
    token: &SdJwtToken,
    hash: HashAlgorithm,
    holder_key: &PrivateKeyMemory,
    algorithm: Algorithm,
    registry: &CryptoFunctionRegistry,
    pool: &SensitiveMemoryPool,
    cancel: &CancellationToken,
  ) -> Result<String> {
    let sd_hash: String = presentation_digest(token, hash);
    let header: Value = json!({
      "typ": KB_JWT_TYP,
      "alg": jws::algorithm_name(algorithm)?,
    });
    let claims: Value = serde_json::to_value(KeyBindingClaims {
      iat: self.issued_at.to_unix(),
      aud: self.audience.clone(),
      nonce: self.nonce.clone(),
      sd_hash,
    })
    .map_err(integrity_core::Error::EncodeJSON)?;
    jws::sign_compact(&header, &claims, holder_key, registry, pool, cancel).await
  }
}

/// Validates the key binding JWT attached to `token`.
///
/// Checks run in order: JWT structure, audience, nonce, `iat` presence,
/// `iat` against `now` plus skew, and finally the recomputed `sd_hash`.
/// Signature verification is separate, see
/// [`verify_key_binding_signature`].
pub fn validate_key_binding(
  token: &SdJwtToken,
  hash: HashAlgorithm,
  options: &KeyBindingValidationOptions<'_>,
) -> Result<KeyBindingValidation> {
  let kb_jwt: &str = token.key_binding_jwt().ok_or(crate::error::Error::InvalidJwtStructure)?;
  let decoded: jws::DecodedJwt = jws::decode_compact(kb_jwt)?;

  if let Some(expected) = options.expected_audience {
    if decoded.claims.get("aud").and_then(Value::as_str) != Some(expected) {
      return Ok(KeyBindingValidation::AudienceMismatch);
    }
  }
  if let Some(expected) = options.expected_nonce {
    if decoded.claims.get("nonce").and_then(Value::as_str) != Some(expected) {
      return Ok(KeyBindingValidation::NonceMismatch);
    }
  }
  let Some(issued_at) = decoded.claims.get("iat").and_then(Value::as_i64) else {
    return Ok(KeyBindingValidation::MissingIat);
  };
  if issued_at > options.now.to_unix() + options.allowed_clock_skew_seconds {
    return Ok(KeyBindingValidation::IatInFuture);
  }
  let expected_sd_hash: String = presentation_digest(token, hash);
  if decoded.claims.get("sd_hash").and_then(Value::as_str) != Some(expected_sd_hash.as_str()) {
    return Ok(KeyBindingValidation::SdHashMismatch);
  }
  Ok(KeyBindingValidation::Valid)
}

/// Verifies the KB-JWT signature with the holder's public key.
pub async fn verify_key_binding_signature(
  token: &SdJwtToken,
  holder_key: &PublicKeyMemory,
  algorithm: Algorithm,
  registry: &CryptoFunctionRegistry,
  pool: &SensitiveMemoryPool,
  cancel: &CancellationToken,
) -> Result<bool> {
  let kb_jwt: &str = token.key_binding_jwt().ok_or(crate::error::Error::InvalidJwtStructure)?;
  jws::verify_compact(kb_jwt, holder_key, algorithm, registry, pool, cancel).await
}

fn presentation_digest(token: &SdJwtToken, hash: HashAlgorithm) -> String {
  BaseEncoding::encode(&hash.digest(token.sd_hash_payload().as_bytes()), Base::Base64Url)
}
