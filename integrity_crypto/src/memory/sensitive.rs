// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Debug;
use std::sync::Weak;

use zeroize::Zeroize;

use crate::tag::Algorithm;
use crate::tag::Tag;

use super::pool::PoolInner;
use super::pool::SensitiveMemoryPool;

use crate::error::DispatchResult;

/// A pooled byte buffer paired with the [`Tag`] that gives it meaning.
///
/// The buffer is owned uniquely for the lifetime of this value; Rust's move
/// semantics make use-after-release unrepresentable. Dropping (or explicitly
/// [releasing][SensitiveMemory::release]) the value zeroes the storage
/// before it returns to the pool.
pub struct SensitiveMemory {
  buffer: Option<Box<[u8]>>,
  tag: Tag,
  pool: Weak<PoolInner>,
}

impl SensitiveMemory {
  pub(crate) fn new(buffer: Box<[u8]>, tag: Tag, pool: Weak<PoolInner>) -> Self {
    Self {
      buffer: Some(buffer),
      tag,
      pool,
    }
  }

  /// Returns a read-only view of the buffer contents.
  pub fn as_slice(&self) -> &[u8] {
    self.buffer.as_deref().expect("buffer held until release")
  }

  /// Returns the context tag describing the contents.
  pub fn tag(&self) -> &Tag {
    &self.tag
  }

  /// Returns the buffer length in bytes.
  pub fn len(&self) -> usize {
    self.as_slice().len()
  }

  /// Returns `true` if the buffer is empty.
  pub fn is_empty(&self) -> bool {
    self.as_slice().is_empty()
  }

  /// Ends the lease explicitly. Equivalent to dropping the value.
  pub fn release(self) {}
}

impl Drop for SensitiveMemory {
  fn drop(&mut self) {
    if let Some(mut buffer) = self.buffer.take() {
      match self.pool.upgrade() {
        Some(pool) => pool.reclaim(buffer),
        // The pool is gone; still scrub the storage before freeing it.
        None => buffer.zeroize(),
      }
    }
  }
}

impl Debug for SensitiveMemory {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SensitiveMemory")
      .field("len", &self.len())
      .field("tag", &self.tag)
      .finish_non_exhaustive()
  }
}

// =============================================================================
// =============================================================================

/// Public-key bytes (or a public-key handle) in pooled memory.
#[derive(Debug)]
pub struct PublicKeyMemory(SensitiveMemory);

impl PublicKeyMemory {
  /// Wraps already-rented memory as a public key.
  pub fn new(memory: SensitiveMemory) -> Self {
    Self(memory)
  }

  /// Rents pooled memory for raw public-key bytes of `algorithm`.
  pub fn rent(pool: &SensitiveMemoryPool, bytes: &[u8], algorithm: Algorithm) -> DispatchResult<Self> {
    pool.rent_init(bytes, Tag::verification(algorithm)).map(Self)
  }

  /// Returns the key bytes.
  pub fn as_slice(&self) -> &[u8] {
    self.0.as_slice()
  }

  /// Returns the context tag.
  pub fn tag(&self) -> &Tag {
    self.0.tag()
  }
}

/// Private-key bytes (or a hardware handle) in pooled memory.
#[derive(Debug)]
pub struct PrivateKeyMemory(SensitiveMemory);

impl PrivateKeyMemory {
  /// Wraps already-rented memory as a private key.
  pub fn new(memory: SensitiveMemory) -> Self {
    Self(memory)
  }

  /// Rents pooled memory for raw private-key bytes of `algorithm`.
  pub fn rent(pool: &SensitiveMemoryPool, bytes: &[u8], algorithm: Algorithm) -> DispatchResult<Self> {
    pool.rent_init(bytes, Tag::signing(algorithm)).map(Self)
  }

  /// Returns the key bytes.
  pub fn as_slice(&self) -> &[u8] {
    self.0.as_slice()
  }

  /// Returns the context tag.
  pub fn tag(&self) -> &Tag {
    self.0.tag()
  }
}

/// A signature value in pooled memory.
///
/// Compares by value over (bytes, tag).
#[derive(Debug)]
pub struct SignatureMemory(SensitiveMemory);

impl SignatureMemory {
  /// Wraps already-rented memory as a signature.
  pub fn new(memory: SensitiveMemory) -> Self {
    Self(memory)
  }

  /// Rents pooled memory for raw signature bytes produced under `algorithm`.
  pub fn rent(pool: &SensitiveMemoryPool, bytes: &[u8], algorithm: Algorithm) -> DispatchResult<Self> {
    pool.rent_init(bytes, Tag::signature(algorithm)).map(Self)
  }

  /// Returns the signature bytes.
  pub fn as_slice(&self) -> &[u8] {
    self.0.as_slice()
  }

  /// Returns the context tag.
  pub fn tag(&self) -> &Tag {
    self.0.tag()
  }
}

impl PartialEq for SignatureMemory {
  fn eq(&self, other: &Self) -> bool {
    self.as_slice() == other.as_slice() && self.tag() == other.tag()
  }
}

impl Eq for SignatureMemory {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn signatures_compare_by_bytes_and_tag() {
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let left: SignatureMemory = SignatureMemory::rent(&pool, &[9; 64], Algorithm::ED25519).unwrap();
    let right: SignatureMemory = SignatureMemory::rent(&pool, &[9; 64], Algorithm::ED25519).unwrap();
    let other_algorithm: SignatureMemory = SignatureMemory::rent(&pool, &[9; 64], Algorithm::P256).unwrap();
    assert_eq!(left, right);
    assert_ne!(left, other_algorithm);
  }

  #[test]
  fn memory_outlives_its_pool_safely() {
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let memory: SensitiveMemory = pool.rent_init(&[5; 4], Tag::signing(Algorithm::ED25519)).unwrap();
    drop(pool);
    assert_eq!(memory.as_slice(), &[5; 4]);
    memory.release();
  }
}
