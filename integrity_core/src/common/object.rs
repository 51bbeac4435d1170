// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

/// An alias for an ordered map of key-[value][Value] pairs.
pub type Object = serde_json::Map<String, Value>;

/// An alias for [`serde_json::Value`].
pub type Value = serde_json::Value;
