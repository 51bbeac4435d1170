// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Errors produced when working with credentials, proofs, and disclosures.

/// Alias for a `Result` with the error type [`Error`].
pub type Result<T, E = Error> = ::core::result::Result<T, E>;

/// This type represents all possible errors that can occur in the crate.
///
/// Cryptographically *invalid* outcomes are not errors: proof verification
/// returns a [`ProofVerificationStatus`][crate::proof::ProofVerificationStatus]
/// and key-binding validation returns a
/// [`KeyBindingValidation`][crate::sd::KeyBindingValidation]. The variants
/// here cover configuration and input-validation failures that surface
/// immediately to the caller.
#[derive(Debug, thiserror::Error, strum::IntoStaticStr)]
#[non_exhaustive]
pub enum Error {
  /// Caused by a credential without an issuer.
  #[error("missing credential issuer")]
  MissingIssuer,
  /// Caused by a credential whose first `@context` entry is not the base
  /// context.
  #[error("missing base context")]
  MissingBaseContext,
  /// Caused by a credential whose first `type` entry is not the base type.
  #[error("missing base type")]
  MissingBaseType,
  /// Caused by registering a cryptosuite under a name that is taken.
  #[error("cryptosuite already registered: {0}")]
  DuplicateCryptosuite(String),
  /// Caused by a cryptosuite naming a hash algorithm with no runtime
  /// implementation.
  #[error("unknown hash algorithm: {0}")]
  UnknownHashAlgorithm(String),
  /// Caused by a canonicalization delegate failing or being absent.
  #[error("canonicalization failed")]
  CanonicalizationFailed(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
  /// Caused by an RDFC cryptosuite used without a context resolver.
  #[error("canonicalization requires a context resolver")]
  MissingContextResolver,
  /// Caused by a compact JWT that does not consist of exactly three
  /// `.`-separated segments, or an SD-JWT missing its `~` separators.
  #[error("invalid JWT structure")]
  InvalidJwtStructure,
  /// Caused by a disclosure with an empty salt.
  #[error("disclosure salt is empty")]
  EmptySalt,
  /// Caused by a disclosure salt below the 128-bit minimum.
  #[error("disclosure salt is shorter than 16 bytes")]
  SaltTooShort,
  /// Caused by concealing a claim under a name the redaction protocol
  /// reserves for itself.
  #[error("reserved claim name: {0}")]
  ReservedClaimName(String),
  /// Caused by a disclosure that is not a well-formed `[salt, name?, value]`
  /// array.
  #[error("invalid disclosure: {0}")]
  InvalidDisclosure(String),
  /// Caused by a digest carried in a token that is not a plausible hash
  /// value under the token's digest algorithm.
  #[error("digest does not match the declared hash algorithm")]
  HashMismatch,
  /// Caused by querying the lattice for a digest it never observed.
  #[error("unknown disclosure digest: {0}")]
  DisclosureDigestUnknown(String),
  /// Caused by a disclosure whose digest appears nowhere in the token
  /// payload.
  #[error("disclosure is not referenced by the token")]
  DisclosureNotInToken,
  /// Caused by selecting a disclosure whose ancestor remains redacted.
  #[error("cannot reveal a descendant before its ancestor: {0}")]
  DescendantRevealedBeforeAncestor(String),
  /// Caused by requesting a path that is not present in the lattice.
  #[error("path not present in the credential: {0}")]
  UnknownTargetPath(String),
  /// Caused by a concealment path that does not point into the payload.
  #[error("invalid concealment path: {0}")]
  InvalidPath(String),
  /// Caused by a value that does not have the expected JSON data type.
  #[error("unexpected data type: {0}")]
  DataTypeMismatch(String),
  /// Caused by malformed CBOR or COSE framing in an SD-CWT.
  #[error("invalid CBOR structure: {0}")]
  InvalidCbor(String),
  /// Caused by invalid or truncated multibase/multicodec data, timestamps,
  /// or JSON.
  #[error(transparent)]
  Core(#[from] integrity_core::Error),
  /// Forwarded from the crypto dispatch registry or the memory pool.
  #[error(transparent)]
  Dispatch(#[from] integrity_crypto::DispatchError),
}
