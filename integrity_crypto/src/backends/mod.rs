// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Software backends for directly held key material.

mod ed25519;
mod p256;

pub use self::ed25519::Ed25519Backend;
pub use self::p256::P256Backend;

use tokio_util::sync::CancellationToken;

use crate::error::DispatchError;
use crate::error::DispatchErrorKind;
use crate::error::DispatchResult;

/// Observes a cancellation request before doing any work.
pub(crate) fn ensure_not_cancelled(cancel: &CancellationToken) -> DispatchResult<()> {
  if cancel.is_cancelled() {
    Err(DispatchError::new(DispatchErrorKind::Cancelled))
  } else {
    Ok(())
  }
}
