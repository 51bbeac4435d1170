// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![doc = include_str!("./../README.md")]
#![warn(
  rust_2018_idioms,
  unreachable_pub,
  // missing_docs,
  rustdoc::missing_crate_level_docs,
  rustdoc::broken_intra_doc_links,
  rustdoc::private_intra_doc_links,
  rustdoc::private_doc_tests,
  clippy::missing_safety_doc,
)]

pub mod backends;
pub mod error;
pub mod hash;
pub mod memory;
pub mod registry;
pub mod tag;

pub use self::error::DispatchError;
pub use self::error::DispatchErrorKind;
pub use self::error::DispatchResult;
