// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Errors for dispatch and pooled-memory operations.

use std::borrow::Cow;
use std::fmt::Display;

/// Alias for a `Result` with the error type [`DispatchError`].
pub type DispatchResult<T> = Result<T, DispatchError>;

/// The error type for crypto dispatch, tag registration, and pooled-memory
/// operations.
///
/// Instances always carry a [`DispatchErrorKind`]; a custom message and a
/// source error may be attached for additional context.
#[derive(Debug)]
pub struct DispatchError {
  kind: DispatchErrorKind,
  message: Option<Cow<'static, str>>,
  source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl DispatchError {
  /// Constructs a new [`DispatchError`] of the given `kind`.
  pub fn new(kind: DispatchErrorKind) -> Self {
    Self {
      kind,
      message: None,
      source: None,
    }
  }

  /// Attaches a custom message.
  pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
    self.message = Some(message.into());
    self
  }

  /// Attaches a source error.
  pub fn with_source(mut self, source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
    self.source = Some(source.into());
    self
  }

  /// Returns the cause of the failed operation.
  pub fn kind(&self) -> &DispatchErrorKind {
    &self.kind
  }
}

impl Display for DispatchError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.kind.description())?;
    if let Some(message) = &self.message {
      write!(f, " message: {message}")?;
    }
    Ok(())
  }
}

impl std::error::Error for DispatchError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    self
      .source
      .as_deref()
      .map(|source| source as &(dyn std::error::Error + 'static))
  }
}

impl From<DispatchErrorKind> for DispatchError {
  fn from(kind: DispatchErrorKind) -> Self {
    Self::new(kind)
  }
}

/// The cause of a failed dispatch or pooled-memory operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DispatchErrorKind {
  /// No backend has been registered for the requested discriminator.
  NoBackendRegistered,
  /// The key's tag does not match the requested operation.
  UnsupportedAlgorithm,
  /// An entry with the same code or discriminator already exists.
  DuplicateRegistration,
  /// The code lies inside the range reserved for library-defined values.
  ReservedCode,
  /// A context value code that was never registered for its kind.
  UnregisteredValue,
  /// The key or signature bytes could not be interpreted by the backend.
  InvalidKeyMaterial,
  /// The backend failed internally, e.g. a hardware call did not complete.
  BackendFailure,
  /// The memory pool cannot satisfy the request.
  PoolExhaustion,
  /// A pooled buffer was returned to the pool twice.
  AlreadyReleased,
  /// The operation observed a cancellation request.
  Cancelled,
}

impl DispatchErrorKind {
  /// Returns a report-friendly description of the error kind.
  pub const fn description(&self) -> &'static str {
    match self {
      Self::NoBackendRegistered => "no backend registered for discriminator",
      Self::UnsupportedAlgorithm => "key tag does not support the requested operation",
      Self::DuplicateRegistration => "entry already registered",
      Self::ReservedCode => "codes below 1000 are reserved for library-defined values",
      Self::UnregisteredValue => "context value is not registered for its kind",
      Self::InvalidKeyMaterial => "key or signature bytes rejected by backend",
      Self::BackendFailure => "backend operation failed",
      Self::PoolExhaustion => "sensitive memory pool exhausted",
      Self::AlreadyReleased => "pooled buffer already released",
      Self::Cancelled => "operation cancelled",
    }
  }
}

impl Display for DispatchErrorKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.description())
  }
}
