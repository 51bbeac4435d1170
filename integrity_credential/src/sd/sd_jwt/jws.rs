// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! A minimal JWS compact serialization over the dispatch registry.

use tokio_util::sync::CancellationToken;

use integrity_core::common::Value;
use integrity_core::encoding::Base;
use integrity_core::encoding::BaseEncoding;
use integrity_crypto::memory::PrivateKeyMemory;
use integrity_crypto::memory::PublicKeyMemory;
use integrity_crypto::memory::SensitiveMemoryPool;
use integrity_crypto::memory::SignatureMemory;
use integrity_crypto::registry::CryptoFunctionRegistry;
use integrity_crypto::tag::Algorithm;

use crate::error::Error;
use crate::error::Result;

/// Returns the JOSE `alg` value for a signing algorithm.
pub(crate) fn algorithm_name(algorithm: Algorithm) -> Result<&'static str> {
  match algorithm {
    Algorithm::ED25519 => Ok("EdDSA"),
    Algorithm::P256 => Ok("ES256"),
    Algorithm::P384 => Ok("ES384"),
    Algorithm::SECP256K1 => Ok("ES256K"),
    other => Err(Error::Dispatch(
      integrity_crypto::DispatchError::new(integrity_crypto::DispatchErrorKind::UnsupportedAlgorithm)
        .with_message(format!("no JOSE algorithm name for {other}")),
    )),
  }
}

/// Signs `header`/`payload` into a compact JWT through the registry.
pub(crate) async fn sign_compact(
  header: &Value,
  payload: &Value,
  private_key: &PrivateKeyMemory,
  registry: &CryptoFunctionRegistry,
  pool: &SensitiveMemoryPool,
  cancel: &CancellationToken,
) -> Result<String> {
  let header: Vec<u8> = serde_json::to_vec(header).map_err(integrity_core::Error::EncodeJSON)?;
  let payload: Vec<u8> = serde_json::to_vec(payload).map_err(integrity_core::Error::EncodeJSON)?;
  let signing_input: String = format!(
    "{}.{}",
    BaseEncoding::encode(&header, Base::Base64Url),
    BaseEncoding::encode(&payload, Base::Base64Url)
  );
  let signature: SignatureMemory = registry.sign(private_key, signing_input.as_bytes(), pool, cancel).await?;
  let encoded_signature: String = BaseEncoding::encode(signature.as_slice(), Base::Base64Url);
  Ok(format!("{signing_input}.{encoded_signature}"))
}

/// The decoded segments of a compact JWT.
pub(crate) struct DecodedJwt {
  pub(crate) header: Value,
  pub(crate) claims: Value,
  pub(crate) signature: Vec<u8>,
  pub(crate) signing_input: String,
}

/// Splits and decodes a compact JWT.
///
/// # Errors
///
/// [`Error::InvalidJwtStructure`] unless the input consists of exactly
/// three `.`-separated base64url segments.
pub(crate) fn decode_compact(jwt: &str) -> Result<DecodedJwt> {
  let mut parts = jwt.split('.');
  let (Some(header), Some(claims), Some(signature), None) = (parts.next(), parts.next(), parts.next(), parts.next())
  else {
    return Err(Error::InvalidJwtStructure);
  };
  let header_bytes: Vec<u8> = BaseEncoding::decode(header, Base::Base64Url).map_err(|_| Error::InvalidJwtStructure)?;
  let claims_bytes: Vec<u8> = BaseEncoding::decode(claims, Base::Base64Url).map_err(|_| Error::InvalidJwtStructure)?;
  let signature: Vec<u8> = BaseEncoding::decode(signature, Base::Base64Url).map_err(|_| Error::InvalidJwtStructure)?;
  Ok(DecodedJwt {
    header: serde_json::from_slice(&header_bytes).map_err(|_| Error::InvalidJwtStructure)?,
    claims: serde_json::from_slice(&claims_bytes).map_err(|_| Error::InvalidJwtStructure)?,
    signature,
    signing_input: format!("{header}.{claims}"),
  })
}

/// Verifies the signature of a compact JWT through the registry.
pub(crate) async fn verify_compact(
  jwt: &str,
  public_key: &PublicKeyMemory,
  algorithm: Algorithm,
  registry: &CryptoFunctionRegistry,
  pool: &SensitiveMemoryPool,
  cancel: &CancellationToken,
) -> Result<bool> {
  let decoded: DecodedJwt = decode_compact(jwt)?;
  let signature: SignatureMemory = SignatureMemory::rent(pool, &decoded.signature, algorithm)?;
  registry
    .verify(decoded.signing_input.as_bytes(), &signature, public_key, cancel)
    .await
    .map_err(Error::Dispatch)
}
