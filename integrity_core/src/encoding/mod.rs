// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Self-describing byte encodings for key identifiers and proof values.

mod base_encoding;
mod multicodec;

pub use self::base_encoding::Base;
pub use self::base_encoding::BaseEncoding;
pub use self::multicodec::Multicodec;
