// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Key binding CWTs, the COSE mirror of KB-JWTs.

use ciborium::value::Value as CoseValue;
use coset::iana;
use coset::CborSerializable;
use coset::CoseSign1;
use coset::CoseSign1Builder;
use coset::HeaderBuilder;
use coset::ProtectedHeader;
use coset::SignatureContext;
use coset::TaggedCborSerializable;
use tokio_util::sync::CancellationToken;

use integrity_core::common::Timestamp;
use integrity_crypto::hash::HashAlgorithm;
use integrity_crypto::memory::PrivateKeyMemory;
use integrity_crypto::memory::SensitiveMemoryPool;
use integrity_crypto::memory::SignatureMemory;
use integrity_crypto::registry::CryptoFunctionRegistry;
use integrity_crypto::tag::Algorithm;

use crate::error::Error;
use crate::error::Result;
use crate::sd::sd_cwt::CborValue;
use crate::sd::sd_cwt::SdCwtToken;
use crate::sd::KeyBindingValidation;
use crate::sd::KeyBindingValidationOptions;

/// The `typ` (header 16) of a key binding CWT.
pub const KB_CWT_TYP: &str = "kb+cwt";

/// CWT claim keys used by key binding.
const CLAIM_AUD: i128 = 3;
const CLAIM_IAT: i128 = 6;
const CLAIM_NONCE: i128 = 10;
const CLAIM_SD_HASH: i128 = 11;

/// Builds and signs KB-CWTs over the dispatch registry.
#[derive(Clone, Debug)]
pub struct KeyBindingCwtBuilder {
  audience: String,
  nonce: String,
  issued_at: Timestamp,
}

impl KeyBindingCwtBuilder {
  /// Creates a builder for the given audience, nonce, and issuance time.
  pub fn new(audience: impl Into<String>, nonce: impl Into<String>, issued_at: Timestamp) -> Self {
    Self {
      audience: audience.into(),
      nonce: nonce.into(),
      issued_at,
    }
  }

  /// Signs a KB-CWT binding `token`'s current presentation.
  pub async fn sign(
    &self,
    token: &SdCwtToken,
    hash: HashAlgorithm,
    holder_key: &PrivateKeyMemory,
    algorithm: Algorithm,
    registry: &CryptoFunctionRegistry,
    pool: &SensitiveMemoryPool,
    cancel: &CancellationToken,
  ) -> Result<Vec<u8>> {
    let sd_hash: Vec<u8> = hash.digest(&token.sd_hash_payload());
    let claims: CborValue = CborValue::Map(vec![
      (CborValue::Integer(CLAIM_AUD), CborValue::Text(self.audience.clone())),
      (CborValue::Integer(CLAIM_IAT), CborValue::Integer(self.issued_at.to_unix() as i128)),
      (CborValue::Integer(CLAIM_NONCE), CborValue::Text(self.nonce.clone())),
      (CborValue::Integer(CLAIM_SD_HASH), CborValue::Bytes(sd_hash)),
    ]);
    let payload: Vec<u8> = claims.to_bytes();

    let protected: coset::Header = HeaderBuilder::new()
      .algorithm(cose_algorithm(algorithm)?)
      .value(16, CoseValue::Text(KB_CWT_TYP.to_owned()))
      .build();
    let to_be_signed: Vec<u8> = coset::sig_structure_data(
      SignatureContext::CoseSign1,
      ProtectedHeader {
        original_data: None,
        header: protected.clone(),
      },
      None,
      &[],
      &payload,
    );
    let signature: SignatureMemory = registry.sign(holder_key, &to_be_signed, pool, cancel).await?;

    CoseSign1Builder::new()
      .protected(protected)
      .payload(payload)
      .signature(signature.as_slice().to_vec())
      .build()
      .to_tagged_vec()
      .map_err(|error| Error::InvalidCbor(error.to_string()))
  }
}

/// Validates the KB-CWT attached to `token`.
///
/// Checks mirror the KB-JWT order: structure, audience, nonce, `iat`
/// presence, `iat` against `now` plus skew, recomputed `sd_hash`.
pub fn validate_key_binding_cwt(
  token: &SdCwtToken,
  hash: HashAlgorithm,
  options: &KeyBindingValidationOptions<'_>,
) -> Result<KeyBindingValidation> {
  let kb_bytes: &[u8] = token
    .key_binding()
    .ok_or_else(|| Error::InvalidCbor("token carries no key binding".to_owned()))?;
  let cose: CoseSign1 = CoseSign1::from_tagged_slice(kb_bytes)
    .or_else(|_| CoseSign1::from_slice(kb_bytes))
    .map_err(|error| Error::InvalidCbor(error.to_string()))?;
  let payload: Vec<u8> = cose
    .payload
    .ok_or_else(|| Error::InvalidCbor("key binding has no payload".to_owned()))?;
  let CborValue::Map(claims) = CborValue::from_slice(&payload)? else {
    return Err(Error::InvalidCbor("key binding claims must be a map".to_owned()));
  };

  let claim = |key: i128| -> Option<&CborValue> {
    claims
      .iter()
      .find(|(candidate, _)| matches!(candidate, CborValue::Integer(code) if *code == key))
      .map(|(_, value)| value)
  };

  if let Some(expected) = options.expected_audience {
    if !matches!(claim(CLAIM_AUD), Some(CborValue::Text(aud)) if aud == expected) {
      return Ok(KeyBindingValidation::AudienceMismatch);
    }
  }
  if let Some(expected) = options.expected_nonce {
    if !matches!(claim(CLAIM_NONCE), Some(CborValue::Text(nonce)) if nonce == expected) {
      return Ok(KeyBindingValidation::NonceMismatch);
    }
  }
  let Some(CborValue::Integer(issued_at)) = claim(CLAIM_IAT) else {
    return Ok(KeyBindingValidation::MissingIat);
  };
  if *issued_at > (options.now.to_unix() + options.allowed_clock_skew_seconds) as i128 {
    return Ok(KeyBindingValidation::IatInFuture);
  }
  let expected_sd_hash: Vec<u8> = hash.digest(&token.sd_hash_payload());
  if !matches!(claim(CLAIM_SD_HASH), Some(CborValue::Bytes(sd_hash)) if *sd_hash == expected_sd_hash) {
    return Ok(KeyBindingValidation::SdHashMismatch);
  }
  Ok(KeyBindingValidation::Valid)
}

fn cose_algorithm(algorithm: Algorithm) -> Result<iana::Algorithm> {
  match algorithm {
    Algorithm::ED25519 => Ok(iana::Algorithm::EdDSA),
    Algorithm::P256 => Ok(iana::Algorithm::ES256),
    other => Err(Error::Dispatch(
      integrity_crypto::DispatchError::new(integrity_crypto::DispatchErrorKind::UnsupportedAlgorithm)
        .with_message(format!("no COSE algorithm for {other}")),
    )),
  }
}
