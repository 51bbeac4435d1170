// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use serde::Serialize;

/// An optional callback deriving the fragment identifier of a verification
/// method, e.g. from its key material.
pub type FragmentGenerator = dyn Fn(&VerificationMethod) -> String + Send + Sync;

/// A verification method embedded in an issuer document.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerificationMethod {
  /// The method identifier, usually a DID URL with a fragment.
  pub id: String,
  /// The method type, e.g. `Multikey`.
  #[serde(rename = "type")]
  pub method_type: String,
  /// The DID of the controller.
  pub controller: String,
  /// The multibase-encoded, multicodec-wrapped public key.
  #[serde(rename = "publicKeyMultibase", skip_serializing_if = "Option::is_none")]
  pub public_key_multibase: Option<String>,
}

impl VerificationMethod {
  /// Returns a copy whose id fragment is produced by `generator`.
  pub fn with_generated_fragment(&self, generator: &FragmentGenerator) -> Self {
    let fragment: String = generator(self);
    let base: &str = self.id.split('#').next().unwrap_or_default();
    Self {
      id: format!("{base}#{fragment}"),
      ..self.clone()
    }
  }
}

/// The subset of an issuer DID document the proof engine consumes.
///
/// Resolution of this document (HTTP fetching, DID method plumbing) happens
/// outside the engine; verification only looks methods up by reference.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct IssuerDocument {
  /// The document identifier.
  pub id: String,
  /// The verification methods of the issuer.
  #[serde(rename = "verificationMethod", default)]
  pub verification_method: Vec<VerificationMethod>,
  /// Method references authorized for assertions.
  #[serde(rename = "assertionMethod", default, skip_serializing_if = "Vec::is_empty")]
  pub assertion_method: Vec<String>,
}

impl IssuerDocument {
  /// Resolves a verification method by its full id or fragment reference.
  pub fn resolve_method(&self, reference: &str) -> Option<&VerificationMethod> {
    self.verification_method.iter().find(|method| {
      method.id == reference
        || reference
          .split_once('#')
          .is_some_and(|(_, fragment)| method.id.split_once('#').is_some_and(|(_, own)| own == fragment))
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn document() -> IssuerDocument {
    IssuerDocument {
      id: "did:key:z6MkrJVnaZkeFzdQyMZu1cgjg7k1pZZ6pvBQ7XJPt4swbTQ2".to_owned(),
      verification_method: vec![VerificationMethod {
        id: "did:key:z6MkrJVnaZkeFzdQyMZu1cgjg7k1pZZ6pvBQ7XJPt4swbTQ2#z6MkrJVnaZkeFzdQyMZu1cgjg7k1pZZ6pvBQ7XJPt4swbTQ2"
          .to_owned(),
        method_type: "Multikey".to_owned(),
        controller: "did:key:z6MkrJVnaZkeFzdQyMZu1cgjg7k1pZZ6pvBQ7XJPt4swbTQ2".to_owned(),
        public_key_multibase: Some("z6MkrJVnaZkeFzdQyMZu1cgjg7k1pZZ6pvBQ7XJPt4swbTQ2".to_owned()),
      }],
      assertion_method: Vec::new(),
    }
  }

  #[test]
  fn methods_resolve_by_full_id() {
    let document: IssuerDocument = document();
    let id: String = document.verification_method[0].id.clone();
    assert!(document.resolve_method(&id).is_some());
  }

  #[test]
  fn fragment_generators_rewrite_only_the_fragment() {
    let method: VerificationMethod = document().verification_method[0].clone();
    let rewritten: VerificationMethod =
      method.with_generated_fragment(&|method: &VerificationMethod| method.method_type.to_lowercase());
    assert_eq!(
      rewritten.id,
      "did:key:z6MkrJVnaZkeFzdQyMZu1cgjg7k1pZZ6pvBQ7XJPt4swbTQ2#multikey"
    );
    assert_eq!(rewritten.controller, method.controller);
  }

  #[test]
  fn methods_resolve_by_fragment() {
    let document: IssuerDocument = document();
    assert!(document
      .resolve_method("did:example:mirror#z6MkrJVnaZkeFzdQyMZu1cgjg7k1pZZ6pvBQ7XJPt4swbTQ2")
      .is_some());
    assert!(document.resolve_method("did:example:mirror#unknown").is_none());
  }
}
