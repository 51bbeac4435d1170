// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Dispatch of signing and verification to registered backends.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::backends::Ed25519Backend;
use crate::backends::P256Backend;
use crate::error::DispatchError;
use crate::error::DispatchErrorKind;
use crate::error::DispatchResult;
use crate::memory::PrivateKeyMemory;
use crate::memory::PublicKeyMemory;
use crate::memory::SensitiveMemoryPool;
use crate::memory::SignatureMemory;
use crate::tag::Algorithm;
use crate::tag::MaterialSemantics;
use crate::tag::Purpose;
use crate::tag::Tag;

/// The discriminator a backend is registered under.
///
/// An entry may be qualified by [`MaterialSemantics`]: a `TpmHandle`-tagged
/// key routes to the TPM-qualified entry even when a software entry exists
/// for the same algorithm and purpose, so the same high-level code drives
/// software and hardware uniformly.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct DispatchKey {
  algorithm: Algorithm,
  purpose: Purpose,
  semantics: Option<MaterialSemantics>,
}

impl DispatchKey {
  /// A discriminator that applies to directly held material.
  pub fn new(algorithm: Algorithm, purpose: Purpose) -> Self {
    Self {
      algorithm,
      purpose,
      semantics: None,
    }
  }

  /// A discriminator qualified by material semantics.
  pub fn qualified(algorithm: Algorithm, purpose: Purpose, semantics: MaterialSemantics) -> Self {
    Self {
      algorithm,
      purpose,
      semantics: Some(semantics),
    }
  }
}

/// A backend that produces signatures.
///
/// Operations are asynchronous so that implementations may cross process or
/// hardware boundaries; the registry itself never suspends.
#[async_trait]
pub trait SigningBackend: Send + Sync {
  /// Signs `data` with `private_key`, renting the result from `pool`.
  async fn sign(
    &self,
    private_key: &PrivateKeyMemory,
    data: &[u8],
    pool: &SensitiveMemoryPool,
    cancel: &CancellationToken,
  ) -> DispatchResult<SignatureMemory>;
}

/// A backend that checks signatures.
#[async_trait]
pub trait VerifyingBackend: Send + Sync {
  /// Returns whether `signature` is valid for `data` under `public_key`.
  async fn verify(
    &self,
    data: &[u8],
    signature: &SignatureMemory,
    public_key: &PublicKeyMemory,
    cancel: &CancellationToken,
  ) -> DispatchResult<bool>;
}

/// Routes opaque key and signature buffers to concrete cryptographic
/// implementations using the [`Tag`] on the supplied key.
///
/// Registration is append-only and takes `&mut self`, separating the
/// initialization phase from dispatch by construction; once the registry is
/// shared (e.g. behind an [`Arc`]), concurrent readers need no locking.
/// Callers never observe which backend was selected, only its output.
#[derive(Default)]
pub struct CryptoFunctionRegistry {
  signers: HashMap<DispatchKey, Arc<dyn SigningBackend>>,
  verifiers: HashMap<DispatchKey, Arc<dyn VerifyingBackend>>,
}

impl CryptoFunctionRegistry {
  /// Creates an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a registry with the software Ed25519 and ECDSA P-256 backends
  /// registered for directly held material.
  pub fn with_software_backends() -> Self {
    let mut registry: Self = Self::new();
    let ed25519: Arc<Ed25519Backend> = Arc::new(Ed25519Backend);
    let p256: Arc<P256Backend> = Arc::new(P256Backend);
    registry
      .register_signer(DispatchKey::new(Algorithm::ED25519, Purpose::SIGNING), ed25519.clone())
      .expect("fresh registry has no duplicate entries");
    registry
      .register_verifier(DispatchKey::new(Algorithm::ED25519, Purpose::VERIFICATION), ed25519)
      .expect("fresh registry has no duplicate entries");
    registry
      .register_signer(DispatchKey::new(Algorithm::P256, Purpose::SIGNING), p256.clone())
      .expect("fresh registry has no duplicate entries");
    registry
      .register_verifier(DispatchKey::new(Algorithm::P256, Purpose::VERIFICATION), p256)
      .expect("fresh registry has no duplicate entries");
    registry
  }

  /// Registers a signing backend under `key`.
  ///
  /// # Errors
  ///
  /// [`DispatchErrorKind::DuplicateRegistration`] when `key` is taken.
  pub fn register_signer(&mut self, key: DispatchKey, backend: Arc<dyn SigningBackend>) -> DispatchResult<()> {
    if self.signers.contains_key(&key) {
      return Err(DispatchError::new(DispatchErrorKind::DuplicateRegistration).with_message(format!("{key:?}")));
    }
    tracing::debug!(?key, "registering signing backend");
    self.signers.insert(key, backend);
    Ok(())
  }

  /// Registers a verifying backend under `key`.
  ///
  /// # Errors
  ///
  /// [`DispatchErrorKind::DuplicateRegistration`] when `key` is taken.
  pub fn register_verifier(&mut self, key: DispatchKey, backend: Arc<dyn VerifyingBackend>) -> DispatchResult<()> {
    if self.verifiers.contains_key(&key) {
      return Err(DispatchError::new(DispatchErrorKind::DuplicateRegistration).with_message(format!("{key:?}")));
    }
    tracing::debug!(?key, "registering verifying backend");
    self.verifiers.insert(key, backend);
    Ok(())
  }

  /// Signs `data` with the backend selected by the tag of `private_key`.
  pub async fn sign(
    &self,
    private_key: &PrivateKeyMemory,
    data: &[u8],
    pool: &SensitiveMemoryPool,
    cancel: &CancellationToken,
  ) -> DispatchResult<SignatureMemory> {
    let backend: &Arc<dyn SigningBackend> = resolve(&self.signers, private_key.tag(), Purpose::SIGNING)?;
    backend.sign(private_key, data, pool, cancel).await
  }

  /// Verifies `signature` over `data` with the backend selected by the tag
  /// of `public_key`.
  pub async fn verify(
    &self,
    data: &[u8],
    signature: &SignatureMemory,
    public_key: &PublicKeyMemory,
    cancel: &CancellationToken,
  ) -> DispatchResult<bool> {
    let backend: &Arc<dyn VerifyingBackend> = resolve(&self.verifiers, public_key.tag(), Purpose::VERIFICATION)?;
    backend.verify(data, signature, public_key, cancel).await
  }
}

impl PrivateKeyMemory {
  /// Signs `data` through `registry`, routed by this key's tag.
  pub async fn sign(
    &self,
    data: &[u8],
    registry: &CryptoFunctionRegistry,
    pool: &SensitiveMemoryPool,
    cancel: &CancellationToken,
  ) -> DispatchResult<SignatureMemory> {
    registry.sign(self, data, pool, cancel).await
  }
}

/// Composes the discriminator from a key tag and resolves the backend.
///
/// For identical tags the same entry is always chosen: the qualified entry
/// first, then the unqualified entry, but only for `Direct` material.
fn resolve<'a, T: ?Sized>(
  table: &'a HashMap<DispatchKey, Arc<T>>,
  tag: &Tag,
  expected_purpose: Purpose,
) -> DispatchResult<&'a Arc<T>> {
  let algorithm: Algorithm = tag
    .algorithm()
    .ok_or_else(|| DispatchError::new(DispatchErrorKind::UnsupportedAlgorithm).with_message("tag carries no algorithm"))?;
  let purpose: Purpose = tag
    .purpose()
    .ok_or_else(|| DispatchError::new(DispatchErrorKind::UnsupportedAlgorithm).with_message("tag carries no purpose"))?;
  if purpose != expected_purpose {
    return Err(
      DispatchError::new(DispatchErrorKind::UnsupportedAlgorithm)
        .with_message(format!("key purpose {purpose} does not allow {expected_purpose}")),
    );
  }
  let semantics: MaterialSemantics = tag.material_semantics().unwrap_or(MaterialSemantics::DIRECT);

  if let Some(backend) = table.get(&DispatchKey::qualified(algorithm, purpose, semantics)) {
    tracing::trace!(%algorithm, %purpose, %semantics, "dispatching to qualified backend");
    return Ok(backend);
  }
  if semantics == MaterialSemantics::DIRECT {
    if let Some(backend) = table.get(&DispatchKey::new(algorithm, purpose)) {
      tracing::trace!(%algorithm, %purpose, "dispatching to backend");
      return Ok(backend);
    }
  }
  Err(DispatchError::new(DispatchErrorKind::NoBackendRegistered).with_message(format!("{algorithm}/{purpose}")))
}

#[cfg(test)]
mod tests {
  use super::*;

  struct StubTpmBackend;

  #[async_trait]
  impl SigningBackend for StubTpmBackend {
    async fn sign(
      &self,
      _private_key: &PrivateKeyMemory,
      _data: &[u8],
      pool: &SensitiveMemoryPool,
      _cancel: &CancellationToken,
    ) -> DispatchResult<SignatureMemory> {
      SignatureMemory::rent(pool, &[0xA5; 4], Algorithm::ED25519)
    }
  }

  fn tpm_key(pool: &SensitiveMemoryPool) -> PrivateKeyMemory {
    let tag: Tag = Tag::builder()
      .algorithm(Algorithm::ED25519)
      .purpose(Purpose::SIGNING)
      .material_semantics(MaterialSemantics::TPM_HANDLE)
      .build()
      .unwrap();
    PrivateKeyMemory::new(pool.rent_init(&0x8100_0001u32.to_be_bytes(), tag).unwrap())
  }

  #[tokio::test]
  async fn ed25519_sign_verify_round_trip() {
    let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let cancel: CancellationToken = CancellationToken::new();

    let private_key: PrivateKeyMemory = PrivateKeyMemory::rent(&pool, &[7u8; 32], Algorithm::ED25519).unwrap();
    let public_key: PublicKeyMemory = Ed25519Backend::derive_public(&private_key, &pool).unwrap();

    let signature: SignatureMemory = private_key.sign(b"material", &registry, &pool, &cancel).await.unwrap();
    assert!(registry.verify(b"material", &signature, &public_key, &cancel).await.unwrap());
    assert!(!registry.verify(b"tampered", &signature, &public_key, &cancel).await.unwrap());
  }

  #[tokio::test]
  async fn identical_tags_select_the_same_backend() {
    let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let cancel: CancellationToken = CancellationToken::new();
    let private_key: PrivateKeyMemory = PrivateKeyMemory::rent(&pool, &[1u8; 32], Algorithm::ED25519).unwrap();

    let first: SignatureMemory = private_key.sign(b"same", &registry, &pool, &cancel).await.unwrap();
    let second: SignatureMemory = private_key.sign(b"same", &registry, &pool, &cancel).await.unwrap();
    assert_eq!(first, second);
  }

  #[tokio::test]
  async fn verification_purpose_cannot_sign() {
    let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let cancel: CancellationToken = CancellationToken::new();
    let mistagged: PrivateKeyMemory =
      PrivateKeyMemory::new(pool.rent_init(&[1u8; 32], Tag::verification(Algorithm::ED25519)).unwrap());

    let error: DispatchError = mistagged.sign(b"data", &registry, &pool, &cancel).await.unwrap_err();
    assert_eq!(error.kind(), &DispatchErrorKind::UnsupportedAlgorithm);
  }

  #[tokio::test]
  async fn unknown_algorithm_has_no_backend() {
    let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let cancel: CancellationToken = CancellationToken::new();
    let private_key: PrivateKeyMemory = PrivateKeyMemory::rent(&pool, &[1u8; 32], Algorithm::X25519).unwrap();

    let error: DispatchError = private_key.sign(b"data", &registry, &pool, &cancel).await.unwrap_err();
    assert_eq!(error.kind(), &DispatchErrorKind::NoBackendRegistered);
  }

  #[tokio::test]
  async fn tpm_tagged_keys_route_to_the_qualified_backend() {
    let mut registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    registry
      .register_signer(
        DispatchKey::qualified(Algorithm::ED25519, Purpose::SIGNING, MaterialSemantics::TPM_HANDLE),
        Arc::new(StubTpmBackend),
      )
      .unwrap();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let cancel: CancellationToken = CancellationToken::new();

    let signature: SignatureMemory = tpm_key(&pool).sign(b"data", &registry, &pool, &cancel).await.unwrap();
    assert_eq!(signature.as_slice(), &[0xA5; 4]);
  }

  #[tokio::test]
  async fn tpm_tagged_keys_do_not_fall_back_to_software() {
    let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let cancel: CancellationToken = CancellationToken::new();

    let error: DispatchError = tpm_key(&pool).sign(b"data", &registry, &pool, &cancel).await.unwrap_err();
    assert_eq!(error.kind(), &DispatchErrorKind::NoBackendRegistered);
  }

  #[test]
  fn duplicate_registration_is_rejected() {
    let mut registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let error: DispatchError = registry
      .register_signer(DispatchKey::new(Algorithm::ED25519, Purpose::SIGNING), Arc::new(StubTpmBackend))
      .unwrap_err();
    assert_eq!(error.kind(), &DispatchErrorKind::DuplicateRegistration);
  }

  #[tokio::test]
  async fn cancelled_token_aborts_the_backend() {
    let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let cancel: CancellationToken = CancellationToken::new();
    cancel.cancel();
    let private_key: PrivateKeyMemory = PrivateKeyMemory::rent(&pool, &[1u8; 32], Algorithm::ED25519).unwrap();

    let error: DispatchError = private_key.sign(b"data", &registry, &pool, &cancel).await.unwrap_err();
    assert_eq!(error.kind(), &DispatchErrorKind::Cancelled);
  }
}
