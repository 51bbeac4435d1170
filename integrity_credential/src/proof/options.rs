// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

use integrity_core::common::Context;
use integrity_core::common::OneOrMany;
use integrity_core::common::Timestamp;

use crate::proof::DataIntegrityProof;
use crate::proof::ProofPurpose;

/// The proof configuration that is canonicalized and hashed alongside the
/// credential.
///
/// The `@context` entry is present only for RDFC-based cryptosuites;
/// verification must rebuild this object structurally identical to its
/// sign-time form, including that conditional entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProofOptions {
  /// The credential's context, carried for RDFC canonicalization only.
  #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
  pub context: Option<OneOrMany<Context>>,
  /// Always `"DataIntegrityProof"`.
  #[serde(rename = "type")]
  pub proof_type: String,
  /// The cryptosuite name.
  pub cryptosuite: String,
  /// The proof creation timestamp.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub created: Option<Timestamp>,
  /// The verification method reference.
  #[serde(rename = "verificationMethod")]
  pub verification_method: String,
  /// The proof purpose.
  #[serde(rename = "proofPurpose")]
  pub proof_purpose: ProofPurpose,
  /// The domain restriction, when present.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub domain: Option<String>,
  /// The verifier-supplied challenge, when present.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub challenge: Option<String>,
  /// The nonce, when present.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub nonce: Option<String>,
}

impl ProofOptions {
  /// Completes these options into a [`DataIntegrityProof`] carrying
  /// `proof_value`.
  pub fn into_proof(self, proof_value: String) -> DataIntegrityProof {
    DataIntegrityProof {
      id: None,
      proof_type: self.proof_type,
      cryptosuite: self.cryptosuite,
      verification_method: self.verification_method,
      proof_purpose: self.proof_purpose,
      created: self.created,
      expires: None,
      domain: self.domain,
      challenge: self.challenge,
      nonce: self.nonce,
      previous_proof: None,
      proof_value,
    }
  }
}
