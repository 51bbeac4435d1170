// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::Signature;
use p256::ecdsa::SigningKey;
use p256::ecdsa::VerifyingKey;
use tokio_util::sync::CancellationToken;

use crate::error::DispatchError;
use crate::error::DispatchErrorKind;
use crate::error::DispatchResult;
use crate::memory::PrivateKeyMemory;
use crate::memory::PublicKeyMemory;
use crate::memory::SensitiveMemoryPool;
use crate::memory::SignatureMemory;
use crate::registry::SigningBackend;
use crate::registry::VerifyingBackend;
use crate::tag::Algorithm;

use super::ensure_not_cancelled;

/// Software ECDSA over NIST P-256 (secp256r1).
///
/// Private keys are 32-byte scalars; public keys are SEC1-encoded points
/// (compressed or uncompressed); signatures are fixed-size `r || s`.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct P256Backend;

impl P256Backend {
  /// Derives the compressed SEC1 public key of a scalar secret key.
  pub fn derive_public(private_key: &PrivateKeyMemory, pool: &SensitiveMemoryPool) -> DispatchResult<PublicKeyMemory> {
    let signing_key: SigningKey = signing_key_from(private_key)?;
    let encoded = VerifyingKey::from(&signing_key).to_encoded_point(true);
    PublicKeyMemory::rent(pool, encoded.as_bytes(), Algorithm::P256)
  }
}

fn signing_key_from(private_key: &PrivateKeyMemory) -> DispatchResult<SigningKey> {
  if private_key.as_slice().len() != 32 {
    return Err(DispatchError::new(DispatchErrorKind::InvalidKeyMaterial).with_message("expected a 32-byte scalar"));
  }
  SigningKey::from_bytes(p256::FieldBytes::from_slice(private_key.as_slice()))
    .map_err(|error| DispatchError::new(DispatchErrorKind::InvalidKeyMaterial).with_source(error))
}

#[async_trait]
impl SigningBackend for P256Backend {
  async fn sign(
    &self,
    private_key: &PrivateKeyMemory,
    data: &[u8],
    pool: &SensitiveMemoryPool,
    cancel: &CancellationToken,
  ) -> DispatchResult<SignatureMemory> {
    ensure_not_cancelled(cancel)?;
    let signature: Signature = signing_key_from(private_key)?.sign(data);
    SignatureMemory::rent(pool, signature.to_bytes().as_slice(), Algorithm::P256)
  }
}

#[async_trait]
impl VerifyingBackend for P256Backend {
  async fn verify(
    &self,
    data: &[u8],
    signature: &SignatureMemory,
    public_key: &PublicKeyMemory,
    cancel: &CancellationToken,
  ) -> DispatchResult<bool> {
    ensure_not_cancelled(cancel)?;
    let verifying_key: VerifyingKey = VerifyingKey::from_sec1_bytes(public_key.as_slice())
      .map_err(|error| DispatchError::new(DispatchErrorKind::InvalidKeyMaterial).with_source(error))?;
    let signature: Signature = Signature::try_from(signature.as_slice())
      .map_err(|error| DispatchError::new(DispatchErrorKind::InvalidKeyMaterial).with_source(error))?;
    Ok(verifying_key.verify(data, &signature).is_ok())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn sign_verify_round_trip() {
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let cancel: CancellationToken = CancellationToken::new();
    // Any nonzero scalar below the group order works as a test key.
    let mut scalar: [u8; 32] = [0u8; 32];
    scalar[31] = 7;
    let private_key: PrivateKeyMemory = PrivateKeyMemory::rent(&pool, &scalar, Algorithm::P256).unwrap();
    let public_key: PublicKeyMemory = P256Backend::derive_public(&private_key, &pool).unwrap();

    let signature: SignatureMemory = P256Backend.sign(&private_key, b"payload", &pool, &cancel).await.unwrap();
    assert!(P256Backend.verify(b"payload", &signature, &public_key, &cancel).await.unwrap());
    assert!(!P256Backend.verify(b"other", &signature, &public_key, &cancel).await.unwrap());
  }

  #[tokio::test]
  async fn zero_scalar_is_rejected() {
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let cancel: CancellationToken = CancellationToken::new();
    let private_key: PrivateKeyMemory = PrivateKeyMemory::rent(&pool, &[0u8; 32], Algorithm::P256).unwrap();

    let error: DispatchError = P256Backend.sign(&private_key, b"payload", &pool, &cancel).await.unwrap_err();
    assert_eq!(error.kind(), &DispatchErrorKind::InvalidKeyMaterial);
  }
}
