// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Errors produced by the core types.

/// Alias for a `Result` with the error type [`Error`].
pub type Result<T, E = Error> = ::core::result::Result<T, E>;

/// This type represents all possible errors that can occur in the crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
  /// Caused by a failure to encode Rust types as JSON.
  #[error("failed to encode JSON")]
  EncodeJSON(#[source] serde_json::Error),
  /// Caused by a failure to decode Rust types from JSON.
  #[error("failed to decode JSON")]
  DecodeJSON(#[source] serde_json::Error),
  /// Caused by attempting to parse an invalid XML Schema `dateTimeStamp`.
  ///
  /// The accepted form is `YYYY-MM-DDTHH:MM:SS[.fraction]` followed by a
  /// mandatory time-zone designator (`Z` or `±HH:MM`).
  #[error("invalid dateTimeStamp: {0}")]
  InvalidDateTimeStamp(String),
  /// Caused by an input string whose leading character does not identify a
  /// supported multibase encoding.
  #[error("unknown multibase prefix")]
  UnknownMultibase,
  /// Caused by a string that is not valid under the selected base encoding.
  #[error("invalid multibase encoding")]
  InvalidMultibase,
  /// Caused by a multicodec varint that is not in the supported table.
  #[error("unknown multicodec prefix: {0:#x}")]
  UnknownMulticodec(u64),
  /// Caused by multicodec input that ends before the varint or payload is
  /// complete.
  #[error("truncated multicodec input")]
  TruncatedInput,
  /// Caused by an invalid URL.
  #[error("invalid url")]
  InvalidUrl(#[source] url::ParseError),
}
