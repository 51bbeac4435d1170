// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use serde::Serialize;

use integrity_core::common::Timestamp;

use crate::proof::ProofPurpose;

/// An embedded Data Integrity proof.
///
/// Compares by value across all fields.
///
/// [More Info](https://www.w3.org/TR/vc-data-integrity/#proofs)
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DataIntegrityProof {
  /// An optional proof identifier.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  /// The proof type; always `"DataIntegrityProof"`.
  #[serde(rename = "type")]
  pub proof_type: String,
  /// The name of the cryptosuite that produced this proof.
  pub cryptosuite: String,
  /// A DID URL referencing the verification method, or an embedded method
  /// identifier typed by the proof purpose.
  #[serde(rename = "verificationMethod")]
  pub verification_method: String,
  /// The relationship the proof asserts.
  #[serde(rename = "proofPurpose")]
  pub proof_purpose: ProofPurpose,
  /// When the proof was created.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub created: Option<Timestamp>,
  /// When the proof expires.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expires: Option<Timestamp>,
  /// The domain the proof is restricted to.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub domain: Option<String>,
  /// A verifier-supplied challenge.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub challenge: Option<String>,
  /// A nonce.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub nonce: Option<String>,
  /// The proof this proof extends in a proof chain.
  #[serde(rename = "previousProof", skip_serializing_if = "Option::is_none")]
  pub previous_proof: Option<String>,
  /// The multibase-encoded signature bytes.
  #[serde(rename = "proofValue")]
  pub proof_value: String,
}

impl DataIntegrityProof {
  /// The value of the `type` property.
  pub const TYPE: &'static str = "DataIntegrityProof";
}

#[cfg(test)]
mod tests {
  use integrity_core::convert::FromJson;
  use integrity_core::convert::ToJson;

  use super::*;

  const JSON: &str = r#"{
    "type": "DataIntegrityProof",
    "cryptosuite": "eddsa-rdfc-2022",
    "created": "2023-02-24T23:36:38Z",
    "verificationMethod": "did:key:z6MkrJVnaZkeFzdQyMZu1cgjg7k1pZZ6pvBQ7XJPt4swbTQ2#z6MkrJVnaZkeFzdQyMZu1cgjg7k1pZZ6pvBQ7XJPt4swbTQ2",
    "proofPurpose": "assertionMethod",
    "proofValue": "z2YwC8z3ap7yx1nZYCg4L3j3ApHsF8kgPdSb5xoS1VR7vPG3F561B52hYnQF9iseabecm3ijx4K1FBTQsCZahKZme"
  }"#;

  #[test]
  fn round_trip_preserves_value_equality() {
    let proof: DataIntegrityProof = DataIntegrityProof::from_json(JSON).unwrap();
    assert_eq!(proof.proof_type, DataIntegrityProof::TYPE);
    assert_eq!(proof.proof_purpose, ProofPurpose::AssertionMethod);
    let reparsed: DataIntegrityProof = DataIntegrityProof::from_json(&proof.to_json().unwrap()).unwrap();
    assert_eq!(proof, reparsed);
  }

  #[test]
  fn differing_proof_values_compare_unequal() {
    let proof: DataIntegrityProof = DataIntegrityProof::from_json(JSON).unwrap();
    let mut altered: DataIntegrityProof = proof.clone();
    altered.proof_value = "zAltered".to_owned();
    assert_ne!(proof, altered);
  }
}
