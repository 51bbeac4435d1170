// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use integrity_core::common::Context;
use integrity_core::common::Object;
use integrity_core::common::OneOrMany;
use integrity_core::common::Timestamp;
use integrity_core::common::Url;
use integrity_core::common::Value;

use crate::credential::Credential;
use crate::credential::Issuer;
use crate::credential::Subject;
use crate::error::Error;
use crate::error::Result;
use crate::proof::DataIntegrityProof;

/// A `CredentialBuilder` is used to create a customized [`Credential`].
#[derive(Clone, Debug, Default)]
pub struct CredentialBuilder {
  context: Vec<Context>,
  id: Option<Url>,
  types: Vec<String>,
  issuer: Option<Issuer>,
  valid_from: Option<Timestamp>,
  valid_until: Option<Timestamp>,
  subject: Vec<Subject>,
  properties: Object,
  proof: Vec<DataIntegrityProof>,
}

impl CredentialBuilder {
  /// Creates a new `CredentialBuilder`.
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a value to the `Credential` context set.
  pub fn context(mut self, value: impl Into<Context>) -> Self {
    self.context.push(value.into());
    self
  }

  /// Sets the unique identifier of the `Credential`.
  pub fn id(mut self, value: Url) -> Self {
    self.id = Some(value);
    self
  }

  /// Adds a value to the `Credential` type set.
  pub fn type_(mut self, value: impl Into<String>) -> Self {
    self.types.push(value.into());
    self
  }

  /// Sets the issuer of the `Credential`.
  pub fn issuer(mut self, value: impl Into<Issuer>) -> Self {
    self.issuer = Some(value.into());
    self
  }

  /// Sets the timestamp the `Credential` becomes valid.
  pub fn valid_from(mut self, value: Timestamp) -> Self {
    self.valid_from = Some(value);
    self
  }

  /// Sets the timestamp the `Credential` expires.
  pub fn valid_until(mut self, value: Timestamp) -> Self {
    self.valid_until = Some(value);
    self
  }

  /// Adds a value to the `credentialSubject` set.
  pub fn subject(mut self, value: Subject) -> Self {
    self.subject.push(value);
    self
  }

  /// Adds a top-level property to the `Credential`.
  pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.properties.insert(key.into(), value.into());
    self
  }

  /// Adds an embedded proof to the `Credential`.
  pub fn proof(mut self, value: DataIntegrityProof) -> Self {
    self.proof.push(value);
    self
  }

  /// Returns a new `Credential` based on the builder configuration.
  pub fn build(mut self) -> Result<Credential> {
    if self.context.first() != Some(Credential::base_context()) {
      self.context.insert(0, Credential::base_context().clone());
    }
    if self.types.first().map(String::as_str) != Some(Credential::base_type()) {
      self.types.insert(0, Credential::base_type().to_owned());
    }

    let credential: Credential = Credential {
      context: OneOrMany::Many(self.context),
      id: self.id,
      types: self.types.into(),
      issuer: self.issuer.ok_or(Error::MissingIssuer)?,
      valid_from: self.valid_from,
      valid_until: self.valid_until,
      credential_subject: self.subject.into(),
      properties: self.properties,
      proof: self.proof.into(),
    };

    credential.check_structure()?;

    Ok(credential)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builder_inserts_base_context_and_type() {
    let credential: Credential = CredentialBuilder::new()
      .issuer(Url::parse("https://vc.example/issuers/5678").unwrap())
      .type_("AlumniCredential")
      .subject(Subject::with_id(Url::parse("did:example:abcdefgh").unwrap()))
      .build()
      .unwrap();

    assert_eq!(credential.context.first(), Some(Credential::base_context()));
    assert_eq!(credential.types.first().map(String::as_str), Some("VerifiableCredential"));
    assert_eq!(credential.types.len(), 2);
  }

  #[test]
  fn missing_issuer_is_rejected() {
    assert!(matches!(CredentialBuilder::new().build(), Err(Error::MissingIssuer)));
  }
}
