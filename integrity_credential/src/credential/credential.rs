// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use core::fmt;

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde::Serialize;

use integrity_core::common::Context;
use integrity_core::common::Object;
use integrity_core::common::OneOrMany;
use integrity_core::common::Timestamp;
use integrity_core::common::Url;
use integrity_core::convert::FmtJson;

use crate::credential::CredentialBuilder;
use crate::credential::Issuer;
use crate::credential::Subject;
use crate::error::Error;
use crate::error::Result;
use crate::proof::DataIntegrityProof;

static BASE_CONTEXT: Lazy<Context> =
  Lazy::new(|| Context::Url(Url::parse("https://www.w3.org/ns/credentials/v2").expect("valid url")));

/// A [VC Data Model](https://www.w3.org/TR/vc-data-model-2.0/) 2.0
/// Verifiable Credential.
///
/// The `proof` entry holds zero or more embedded [`DataIntegrityProof`]s;
/// signing appends exactly one entry per invocation.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Credential {
  /// The JSON-LD context(s) applicable to the `Credential`.
  #[serde(rename = "@context")]
  pub context: OneOrMany<Context>,
  /// A unique `URI` that may be used to identify the `Credential`.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<Url>,
  /// One or more URIs defining the type of the `Credential`.
  #[serde(rename = "type")]
  pub types: OneOrMany<String>,
  /// A reference to the issuer of the `Credential`.
  pub issuer: Issuer,
  /// A timestamp of when the `Credential` becomes valid.
  #[serde(rename = "validFrom", skip_serializing_if = "Option::is_none")]
  pub valid_from: Option<Timestamp>,
  /// A timestamp of when the `Credential` should no longer be considered
  /// valid. The proof engine never judges validity windows; that is caller
  /// policy.
  #[serde(rename = "validUntil", skip_serializing_if = "Option::is_none")]
  pub valid_until: Option<Timestamp>,
  /// One or more `Object`s representing the `Credential` subject(s).
  #[serde(rename = "credentialSubject")]
  pub credential_subject: OneOrMany<Subject>,
  /// Miscellaneous properties.
  #[serde(flatten)]
  pub properties: Object,
  /// Embedded cryptographic proofs.
  #[serde(default, skip_serializing_if = "OneOrMany::is_empty")]
  pub proof: OneOrMany<DataIntegrityProof>,
}

impl Credential {
  /// Returns the base JSON-LD context for `Credential`s.
  pub fn base_context() -> &'static Context {
    &BASE_CONTEXT
  }

  /// Returns the base type for `Credential`s.
  pub fn base_type() -> &'static str {
    "VerifiableCredential"
  }

  /// Creates a new [`CredentialBuilder`].
  pub fn builder() -> CredentialBuilder {
    CredentialBuilder::new()
  }

  /// Validates the semantic structure of the `Credential`.
  pub fn check_structure(&self) -> Result<()> {
    // The base context must be present and in the first position.
    match self.context.first() {
      Some(context) if context == Self::base_context() => {}
      Some(_) | None => return Err(Error::MissingBaseContext),
    }

    // The base type must be present.
    if !self.types.iter().any(|type_| type_ == Self::base_type()) {
      return Err(Error::MissingBaseType);
    }

    Ok(())
  }

  /// Returns a copy of this credential with its `proof` entries removed.
  pub fn without_proof(&self) -> Self {
    Self {
      proof: OneOrMany::default(),
      ..self.clone()
    }
  }

  /// Returns a copy of this credential with `proof` appended to its proof
  /// entries.
  pub fn with_proof(&self, proof: DataIntegrityProof) -> Self {
    let mut proofs: Vec<DataIntegrityProof> = self.proof.clone().into_vec();
    proofs.push(proof);
    Self {
      proof: OneOrMany::Many(proofs),
      ..self.clone()
    }
  }
}

impl fmt::Display for Credential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.fmt_json(f)
  }
}
