// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use ed25519_dalek::Signature;
use ed25519_dalek::Signer;
use ed25519_dalek::SigningKey;
use ed25519_dalek::Verifier;
use ed25519_dalek::VerifyingKey;
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

/// Software Ed25519 signing and verification.
///
/// Private keys are 32-byte seeds in compliance with
/// [RFC 8032](https://datatracker.ietf.org/doc/html/rfc8032#section-3.2);
/// signatures are 64 bytes.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct Ed25519Backend;

impl Ed25519Backend {
  /// Derives the public key of a seed secret key into pooled memory.
  pub fn derive_public(private_key: &PrivateKeyMemory, pool: &SensitiveMemoryPool) -> DispatchResult<PublicKeyMemory> {
    let signing_key: SigningKey = signing_key_from(private_key)?;
    PublicKeyMemory::rent(pool, signing_key.verifying_key().as_bytes(), Algorithm::ED25519)
  }
}

fn signing_key_from(private_key: &PrivateKeyMemory) -> DispatchResult<SigningKey> {
  let seed: [u8; 32] = private_key
    .as_slice()
    .try_into()
    .map_err(|_| DispatchError::new(DispatchErrorKind::InvalidKeyMaterial).with_message("expected a 32-byte seed"))?;
  Ok(SigningKey::from_bytes(&seed))
}

#[async_trait]
impl SigningBackend for Ed25519Backend {
  async fn sign(
    &self,
    private_key: &PrivateKeyMemory,
    data: &[u8],
    pool: &SensitiveMemoryPool,
    cancel: &CancellationToken,
  ) -> DispatchResult<SignatureMemory> {
    ensure_not_cancelled(cancel)?;
    let signature: Signature = signing_key_from(private_key)?.sign(data);
    SignatureMemory::rent(pool, &signature.to_bytes(), Algorithm::ED25519)
  }
}

#[async_trait]
impl VerifyingBackend for Ed25519Backend {
  async fn verify(
    &self,
    data: &[u8],
    signature: &SignatureMemory,
    public_key: &PublicKeyMemory,
    cancel: &CancellationToken,
  ) -> DispatchResult<bool> {
    ensure_not_cancelled(cancel)?;
    let key_bytes: [u8; 32] = public_key
      .as_slice()
      .try_into()
      .map_err(|_| DispatchError::new(DispatchErrorKind::InvalidKeyMaterial).with_message("expected a 32-byte key"))?;
    let verifying_key: VerifyingKey = VerifyingKey::from_bytes(&key_bytes)
      .map_err(|error| DispatchError::new(DispatchErrorKind::InvalidKeyMaterial).with_source(error))?;
    let signature_bytes: [u8; 64] = signature.as_slice().try_into().map_err(|_| {
      DispatchError::new(DispatchErrorKind::InvalidKeyMaterial).with_message("expected a 64-byte signature")
    })?;
    Ok(verifying_key.verify(data, &Signature::from_bytes(&signature_bytes)).is_ok())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn signatures_are_deterministic() {
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let cancel: CancellationToken = CancellationToken::new();
    let private_key: PrivateKeyMemory = PrivateKeyMemory::rent(&pool, &[3u8; 32], Algorithm::ED25519).unwrap();

    let first: SignatureMemory = Ed25519Backend.sign(&private_key, b"payload", &pool, &cancel).await.unwrap();
    let second: SignatureMemory = Ed25519Backend.sign(&private_key, b"payload", &pool, &cancel).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.as_slice().len(), 64);
  }

  #[tokio::test]
  async fn truncated_keys_are_rejected() {
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let cancel: CancellationToken = CancellationToken::new();
    let short_key: PrivateKeyMemory = PrivateKeyMemory::rent(&pool, &[3u8; 16], Algorithm::ED25519).unwrap();

    let error: DispatchError = Ed25519Backend.sign(&short_key, b"payload", &pool, &cancel).await.unwrap_err();
    assert_eq!(error.kind(), &DispatchErrorKind::InvalidKeyMaterial);
  }
}
