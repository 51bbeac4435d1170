// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use core::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;

/// A convenience-trait for types that can be serialized as JSON.
pub trait ToJson: Serialize {
  /// Serialize `self` as a string of JSON.
  fn to_json(&self) -> Result<String> {
    serde_json::to_string(self).map_err(Error::EncodeJSON)
  }

  /// Serialize `self` as a JSON byte vector.
  fn to_json_vec(&self) -> Result<Vec<u8>> {
    serde_json::to_vec(self).map_err(Error::EncodeJSON)
  }

  /// Serialize `self` as a [`serde_json::Value`].
  fn to_json_value(&self) -> Result<serde_json::Value> {
    serde_json::to_value(self).map_err(Error::EncodeJSON)
  }

  /// Serialize `self` as a pretty-printed string of JSON.
  fn to_json_pretty(&self) -> Result<String> {
    serde_json::to_string_pretty(self).map_err(Error::EncodeJSON)
  }

  /// Serialize `self` as a JSON byte vector, normalized using the JSON
  /// Canonicalization Scheme (JCS).
  fn to_jcs(&self) -> Result<Vec<u8>> {
    serde_jcs::to_vec(self).map_err(Error::EncodeJSON)
  }
}

impl<T> ToJson for T where T: Serialize {}

// =============================================================================
// =============================================================================

/// A convenience-trait for types that can be deserialized from JSON.
pub trait FromJson: DeserializeOwned + Sized {
  /// Deserialize `Self` from a string of JSON text.
  fn from_json(json: &(impl AsRef<str> + ?Sized)) -> Result<Self> {
    serde_json::from_str(json.as_ref()).map_err(Error::DecodeJSON)
  }

  /// Deserialize `Self` from bytes of JSON text.
  fn from_json_slice(json: &(impl AsRef<[u8]> + ?Sized)) -> Result<Self> {
    serde_json::from_slice(json.as_ref()).map_err(Error::DecodeJSON)
  }

  /// Deserialize `Self` from a [`serde_json::Value`].
  fn from_json_value(json: serde_json::Value) -> Result<Self> {
    serde_json::from_value(json).map_err(Error::DecodeJSON)
  }
}

impl<T> FromJson for T where T: DeserializeOwned + Sized {}

// =============================================================================
// =============================================================================

/// A convenience-trait to format types as JSON strings for display.
pub trait FmtJson: ToJson {
  /// Format `self` as a (pretty-printed) JSON string.
  fn fmt_json(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if f.alternate() {
      f.write_str(&self.to_json_pretty().map_err(|_| fmt::Error)?)
    } else {
      f.write_str(&self.to_json().map_err(|_| fmt::Error)?)
    }
  }
}

impl<T> FmtJson for T where T: ToJson {}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn jcs_sorts_object_keys_lexicographically() {
    let value: serde_json::Value = json!({"b": 1, "a": {"d": true, "c": null}});
    let canonical: Vec<u8> = value.to_jcs().unwrap();
    assert_eq!(canonical, br#"{"a":{"c":null,"d":true},"b":1}"#.to_vec());
  }
}
