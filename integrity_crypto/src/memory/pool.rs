// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use zeroize::Zeroize;

use crate::error::DispatchError;
use crate::error::DispatchErrorKind;
use crate::error::DispatchResult;
use crate::tag::Tag;

use super::sensitive::SensitiveMemory;

/// A concurrent, exact-size allocator for sensitive byte buffers.
///
/// Buffers are rented at exactly the requested length, never right-padded.
/// Released storage is overwritten with zeros before it re-enters the free
/// lists, so recycled buffers only ever expose zero bytes. Allocation and
/// wrapping into a [`SensitiveMemory`] is a single step; there is no way to
/// obtain a raw lease that could leak on an error path.
#[derive(Clone)]
pub struct SensitiveMemoryPool {
  inner: Arc<PoolInner>,
}

impl SensitiveMemoryPool {
  /// Creates a pool without a bound on outstanding buffers.
  pub fn new() -> Self {
    Self::with_limit(None)
  }

  /// Creates a pool that rejects rentals once `max_outstanding` buffers are
  /// simultaneously held.
  pub fn bounded(max_outstanding: usize) -> Self {
    Self::with_limit(Some(max_outstanding))
  }

  fn with_limit(max_outstanding: Option<usize>) -> Self {
    Self {
      inner: Arc::new(PoolInner {
        free: Mutex::new(HashMap::new()),
        outstanding: AtomicUsize::new(0),
        max_outstanding,
      }),
    }
  }

  /// Copies `bytes` into a pooled buffer and wraps it with `tag`.
  ///
  /// # Errors
  ///
  /// [`DispatchErrorKind::PoolExhaustion`] when the pool bound would be
  /// exceeded.
  pub fn rent_init(&self, bytes: &[u8], tag: Tag) -> DispatchResult<SensitiveMemory> {
    let mut buffer: Box<[u8]> = self.inner.take(bytes.len())?;
    buffer.copy_from_slice(bytes);
    Ok(SensitiveMemory::new(buffer, tag, Arc::downgrade(&self.inner)))
  }

  /// Returns the number of buffers currently rented out.
  pub fn outstanding(&self) -> usize {
    self.inner.outstanding.load(Ordering::Relaxed)
  }
}

impl Default for SensitiveMemoryPool {
  fn default() -> Self {
    Self::new()
  }
}

pub(crate) struct PoolInner {
  free: Mutex<HashMap<usize, Vec<Box<[u8]>>>>,
  outstanding: AtomicUsize,
  max_outstanding: Option<usize>,
}

impl PoolInner {
  fn take(&self, len: usize) -> DispatchResult<Box<[u8]>> {
    let rented: usize = self.outstanding.load(Ordering::Relaxed);
    if self.max_outstanding.is_some_and(|max| rented >= max) {
      return Err(DispatchError::new(DispatchErrorKind::PoolExhaustion).with_message(format!("{rented} outstanding")));
    }
    let recycled: Option<Box<[u8]>> = self
      .free
      .lock()
      .expect("pool lock poisoned")
      .get_mut(&len)
      .and_then(Vec::pop);
    self.outstanding.fetch_add(1, Ordering::Relaxed);
    Ok(recycled.unwrap_or_else(|| vec![0u8; len].into_boxed_slice()))
  }

  /// Zeroes `buffer` and returns its storage to the free list.
  pub(crate) fn reclaim(&self, mut buffer: Box<[u8]>) {
    buffer.zeroize();
    self
      .free
      .lock()
      .expect("pool lock poisoned")
      .entry(buffer.len())
      .or_default()
      .push(buffer);
    self.outstanding.fetch_sub(1, Ordering::Relaxed);
  }
}
