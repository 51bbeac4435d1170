// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Normalized, extensible context tags that make opaque byte buffers
//! meaningful.
//!
//! Every tag maps [context kinds][ContextKind] to small-integer values drawn
//! from per-kind registries. The registries ship with named members and stay
//! open for third-party extension in the custom range (codes >= 1000)
//! without modification of this crate.

mod context_kind;
mod registry;
mod tag_map;
mod values;

pub use self::context_kind::ContextKind;
pub use self::tag_map::Tag;
pub use self::tag_map::TagBuilder;
pub use self::values::Algorithm;
pub use self::values::EncodingScheme;
pub use self::values::MaterialSemantics;
pub use self::values::Purpose;
pub use self::values::CUSTOM_RANGE_START;
