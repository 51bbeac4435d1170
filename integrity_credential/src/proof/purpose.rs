// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use serde::Serialize;

/// Associates a purpose with a [`DataIntegrityProof`][crate::proof::DataIntegrityProof].
///
/// [More Info](https://www.w3.org/TR/vc-data-integrity/#proof-purposes)
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Deserialize, Serialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ProofPurpose {
  /// Purpose is to assert a claim.
  AssertionMethod,
  /// Purpose is to authenticate the signer.
  Authentication,
  /// Purpose is to invoke a capability.
  CapabilityInvocation,
  /// Purpose is to delegate a capability.
  CapabilityDelegation,
  /// Purpose is to derive a shared secret.
  KeyAgreement,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn purposes_serialize_in_camel_case() {
    assert_eq!(
      serde_json::to_string(&ProofPurpose::AssertionMethod).unwrap(),
      r#""assertionMethod""#
    );
    assert_eq!(ProofPurpose::CapabilityInvocation.to_string(), "capabilityInvocation");
  }
}
