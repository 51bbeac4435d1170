// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Traits for JSON conversions between types.

mod json;

pub use self::json::FmtJson;
pub use self::json::FromJson;
pub use self::json::ToJson;
