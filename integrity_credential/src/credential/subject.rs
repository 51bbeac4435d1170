// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use serde::Serialize;

use integrity_core::common::Object;
use integrity_core::common::Url;

/// An entity who is the target of a set of claims.
///
/// [More Info](https://www.w3.org/TR/vc-data-model-2.0/#credential-subject)
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Subject {
  /// A Url identifying the credential subject.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<Url>,
  /// Additional properties of the credential subject.
  #[serde(flatten)]
  pub properties: Object,
}

impl Subject {
  /// Creates a new `Subject` with the given `id` and no claims.
  pub fn with_id(id: Url) -> Self {
    Self {
      id: Some(id),
      properties: Object::new(),
    }
  }

  /// Creates a new `Subject` from a set of claims.
  pub fn with_properties(properties: Object) -> Self {
    Self { id: None, properties }
  }
}
