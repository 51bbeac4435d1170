// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The partial order over credential locations used for wallet-side
//! disclosure selection.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use integrity_core::common::Value;
use integrity_core::encoding::Base;
use integrity_core::encoding::BaseEncoding;
use integrity_crypto::hash::HashAlgorithm;

use crate::error::Error;
use crate::error::Result;
use crate::sd::disclosure::digest_encoded;
use crate::sd::disclosure::ARRAY_MARKER_KEY;
use crate::sd::disclosure::SD_ALG_KEY;
use crate::sd::disclosure::SD_KEY;
use crate::sd::sd_cwt::CborValue;
use crate::sd::sd_cwt::REDACTED_CLAIM_ELEMENT_TAGS;
use crate::sd::sd_cwt::REDACTED_CLAIM_KEYS;
use crate::sd::CredentialPath;
use crate::sd::Disclosure;

/// The path lattice of an issued token.
///
/// Holds every reachable node location, the mandatory (never redacted)
/// locations, and the mapping from disclosure digests to the paths they
/// populate when revealed. Digests present in the payload with no matching
/// disclosure are tolerated: those locations stay permanently redacted and
/// appear in no set.
#[derive(Debug)]
pub struct PathLattice {
  all_paths: BTreeSet<CredentialPath>,
  mandatory_paths: BTreeSet<CredentialPath>,
  disclosure_paths: BTreeMap<String, CredentialPath>,
  gates: BTreeMap<CredentialPath, String>,
}

impl PathLattice {
  /// Analyzes an SD-JWT payload with its encoded disclosures.
  pub fn analyze_json(payload: &Value, encoded_disclosures: &[String], hash: HashAlgorithm) -> Result<Self> {
    let mut by_digest: BTreeMap<String, ParsedDisclosure> = BTreeMap::new();
    for encoded in encoded_disclosures {
      let disclosure: Disclosure = Disclosure::parse_json(encoded)?;
      by_digest.insert(
        digest_encoded(encoded, hash),
        ParsedDisclosure {
          claim_name: disclosure.claim_name().map(str::to_owned),
          claim_value: disclosure.claim_value().clone(),
        },
      );
    }
    Self::analyze(payload, by_digest, hash)
  }

  /// Analyzes an SD-CWT payload with its CBOR-encoded disclosures.
  ///
  /// Digest bytes are keyed by their base64url form so that both token
  /// families share one lattice.
  pub fn analyze_cbor(payload: &CborValue, disclosures: &[Vec<u8>], hash: HashAlgorithm) -> Result<Self> {
    let mut by_digest: BTreeMap<String, ParsedDisclosure> = BTreeMap::new();
    for encoded in disclosures {
      let parsed: ParsedDisclosure = parse_cbor_disclosure(encoded)?;
      let digest: String = BaseEncoding::encode(&hash.digest(encoded), Base::Base64Url);
      by_digest.insert(digest, parsed);
    }
    Self::analyze(&project_cbor(payload), by_digest, hash)
  }

  fn analyze(payload: &Value, by_digest: BTreeMap<String, ParsedDisclosure>, hash: HashAlgorithm) -> Result<Self> {
    let mut walker: Walker = Walker {
      hash,
      by_digest,
      used: BTreeSet::new(),
      all_paths: BTreeSet::new(),
      mandatory_paths: BTreeSet::new(),
      disclosure_paths: BTreeMap::new(),
      gates: BTreeMap::new(),
    };
    walker.all_paths.insert(CredentialPath::root());
    walker.mandatory_paths.insert(CredentialPath::root());
    walker.walk(payload, &CredentialPath::root(), false)?;

    if let Some(unused) = walker.by_digest.keys().find(|digest| !walker.used.contains(*digest)) {
      tracing::warn!(digest = unused.as_str(), "disclosure digest absent from token payload");
      return Err(Error::DisclosureNotInToken);
    }

    Ok(Self {
      all_paths: walker.all_paths,
      mandatory_paths: walker.mandatory_paths,
      disclosure_paths: walker.disclosure_paths,
      gates: walker.gates,
    })
  }

  /// Returns every node location reachable by property or index traversal.
  pub fn all_paths(&self) -> &BTreeSet<CredentialPath> {
    &self.all_paths
  }

  /// Returns the locations that are present regardless of disclosure.
  pub fn mandatory_paths(&self) -> &BTreeSet<CredentialPath> {
    &self.mandatory_paths
  }

  /// Returns the path a disclosure digest would populate if revealed.
  pub fn disclosure_path(&self, digest: &str) -> Result<&CredentialPath> {
    self
      .disclosure_paths
      .get(digest)
      .ok_or_else(|| Error::DisclosureDigestUnknown(digest.to_owned()))
  }

  /// Returns the digest-to-path mapping for every carried disclosure.
  pub fn disclosure_paths(&self) -> &BTreeMap<String, CredentialPath> {
    &self.disclosure_paths
  }

  /// Returns whether `path` is present in the lattice.
  pub fn contains(&self, path: &CredentialPath) -> bool {
    self.all_paths.contains(path)
  }

  /// Returns the immediate children of `path`.
  pub fn children<'a>(&'a self, path: &'a CredentialPath) -> impl Iterator<Item = &'a CredentialPath> + 'a {
    self
      .all_paths
      .iter()
      .filter(move |candidate| candidate.parent().as_ref() == Some(path))
  }

  /// Returns every strict descendant of `path`.
  pub fn descendants<'a>(&'a self, path: &'a CredentialPath) -> impl Iterator<Item = &'a CredentialPath> + 'a {
    self.all_paths.iter().filter(move |candidate| path.is_ancestor_of(candidate))
  }

  /// Computes the minimum set of disclosure digests whose revelation makes
  /// every target path present.
  ///
  /// Ancestors are pulled in automatically: a descendant is never revealed
  /// while its ancestor stays redacted. The result is sorted
  /// lexicographically by digest, making the output deterministic.
  pub fn minimum_disclosure(&self, targets: &[CredentialPath]) -> Result<Vec<String>> {
    let mut needed: BTreeSet<String> = BTreeSet::new();
    for target in targets {
      if !self.all_paths.contains(target) {
        return Err(Error::UnknownTargetPath(target.to_string()));
      }
      if let Some(digest) = self.gates.get(target) {
        needed.insert(digest.clone());
      }
      for ancestor in target.ancestors() {
        if let Some(digest) = self.gates.get(&ancestor) {
          needed.insert(digest.clone());
        }
      }
    }
    Ok(needed.into_iter().collect())
  }

  /// Checks that `selected` digests form a closed selection: every gate on
  /// an ancestor of a selected disclosure is itself selected.
  pub fn validate_selection(&self, selected: &BTreeSet<String>) -> Result<()> {
    for digest in selected {
      let path: &CredentialPath = self
        .disclosure_paths
        .get(digest)
        .ok_or_else(|| Error::DisclosureDigestUnknown(digest.clone()))?;
      for ancestor in path.ancestors() {
        if let Some(gate) = self.gates.get(&ancestor) {
          if !selected.contains(gate) {
            return Err(Error::DescendantRevealedBeforeAncestor(path.to_string()));
          }
        }
      }
    }
    Ok(())
  }
}

#[derive(Clone, Debug)]
struct ParsedDisclosure {
  claim_name: Option<String>,
  claim_value: Value,
}

struct Walker {
  hash: HashAlgorithm,
  by_digest: BTreeMap<String, ParsedDisclosure>,
  used: BTreeSet<String>,
  all_paths: BTreeSet<CredentialPath>,
  mandatory_paths: BTreeSet<CredentialPath>,
  disclosure_paths: BTreeMap<String, CredentialPath>,
  gates: BTreeMap<CredentialPath, String>,
}

impl Walker {
  fn walk(&mut self, value: &Value, path: &CredentialPath, gated: bool) -> Result<()> {
    if !path.is_empty() {
      self.all_paths.insert(path.clone());
      if !gated {
        self.mandatory_paths.insert(path.clone());
      }
    }
    match value {
      Value::Object(map) => {
        for (key, child) in map {
          if key == SD_ALG_KEY {
            continue;
          }
          if key == SD_KEY {
            self.walk_sd_array(child, path)?;
            continue;
          }
          self.walk(child, &path.join_property(key), gated)?;
        }
      }
      Value::Array(items) => {
        for (index, item) in items.iter().enumerate() {
          let child: CredentialPath = path.join_index(index);
          match array_marker_digest(item) {
            Some(digest) => {
              self.check_digest(digest)?;
              if let Some(parsed) = self.by_digest.get(digest).cloned() {
                if parsed.claim_name.is_some() {
                  return Err(Error::InvalidDisclosure(
                    "object-property disclosure referenced by an array marker".to_owned(),
                  ));
                }
                self.reveal(digest, &child, &parsed.claim_value)?;
              }
            }
            None => self.walk(item, &child, gated)?,
          }
        }
      }
      _ => {}
    }
    Ok(())
  }

  fn walk_sd_array(&mut self, digests: &Value, path: &CredentialPath) -> Result<()> {
    let Value::Array(digests) = digests else {
      return Err(Error::InvalidDisclosure("_sd must be an array of digests".to_owned()));
    };
    for digest in digests {
      let Some(digest) = digest.as_str() else {
        return Err(Error::InvalidDisclosure("_sd digests must be strings".to_owned()));
      };
      self.check_digest(digest)?;
      if let Some(parsed) = self.by_digest.get(digest).cloned() {
        let Some(name) = parsed.claim_name.clone() else {
          return Err(Error::InvalidDisclosure(
            "array-element disclosure referenced by an _sd digest".to_owned(),
          ));
        };
        let child: CredentialPath = path.join_property(name);
        self.reveal(digest, &child, &parsed.claim_value)?;
      }
    }
    Ok(())
  }

  fn reveal(&mut self, digest: &str, path: &CredentialPath, value: &Value) -> Result<()> {
    self.used.insert(digest.to_owned());
    self.gates.insert(path.clone(), digest.to_owned());
    self.disclosure_paths.insert(digest.to_owned(), path.clone());
    self.walk(value, path, true)
  }

  fn check_digest(&self, digest: &str) -> Result<()> {
    let decoded: Vec<u8> = BaseEncoding::decode(digest, Base::Base64Url).map_err(|_| Error::HashMismatch)?;
    if decoded.len() != self.hash.output_len() {
      return Err(Error::HashMismatch);
    }
    Ok(())
  }
}

/// Returns the digest of an `{"...": digest}` array marker.
fn array_marker_digest(value: &Value) -> Option<&str> {
  let map = value.as_object()?;
  if map.len() == 1 {
    map.get(ARRAY_MARKER_KEY).and_then(Value::as_str)
  } else {
    None
  }
}

/// Projects a CBOR payload into the JSON redaction dialect so both token
/// families share one walker: simple-value-59 keys become `_sd`, redaction
/// tags become `{"...": digest}` markers, byte strings become base64url
/// text, and integer keys become their decimal strings.
fn project_cbor(value: &CborValue) -> Value {
  match value {
    CborValue::Map(entries) => {
      let mut object = serde_json::Map::new();
      for (key, entry) in entries {
        match key {
          CborValue::Simple(simple) if *simple == REDACTED_CLAIM_KEYS => {
            let digests: Vec<Value> = match entry {
              CborValue::Array(items) => items
                .iter()
                .map(|item| match item {
                  CborValue::Bytes(bytes) => Value::String(BaseEncoding::encode(bytes, Base::Base64Url)),
                  other => project_cbor(other),
                })
                .collect(),
              _ => Vec::new(),
            };
            object.insert(SD_KEY.to_owned(), Value::Array(digests));
          }
          CborValue::Text(name) => {
            object.insert(name.clone(), project_cbor(entry));
          }
          CborValue::Integer(code) => {
            object.insert(code.to_string(), project_cbor(entry));
          }
          other => {
            object.insert(format!("{other:?}"), project_cbor(entry));
          }
        }
      }
      Value::Object(object)
    }
    CborValue::Array(items) => Value::Array(items.iter().map(project_cbor).collect()),
    CborValue::Tag(tag, inner) if REDACTED_CLAIM_ELEMENT_TAGS.contains(tag) => {
      if let CborValue::Bytes(bytes) = inner.as_ref() {
        let mut marker = serde_json::Map::new();
        marker.insert(
          ARRAY_MARKER_KEY.to_owned(),
          Value::String(BaseEncoding::encode(bytes, Base::Base64Url)),
        );
        Value::Object(marker)
      } else {
        project_cbor(inner)
      }
    }
    CborValue::Tag(_, inner) => project_cbor(inner),
    CborValue::Bytes(bytes) => Value::String(BaseEncoding::encode(bytes, Base::Base64Url)),
    other => other.to_json().unwrap_or(Value::Null),
  }
}

fn parse_cbor_disclosure(encoded: &[u8]) -> Result<ParsedDisclosure> {
  let value: CborValue = CborValue::from_slice(encoded)?;
  let CborValue::Array(items) = value else {
    return Err(Error::InvalidCbor("disclosure must be an array".to_owned()));
  };
  match items.as_slice() {
    [CborValue::Bytes(_), value] => Ok(ParsedDisclosure {
      claim_name: None,
      claim_value: project_cbor(value),
    }),
    [CborValue::Bytes(_), CborValue::Text(name), value] => Ok(ParsedDisclosure {
      claim_name: Some(name.clone()),
      claim_value: project_cbor(value),
    }),
    _ => Err(Error::InvalidCbor("disclosure must be [salt, name?, value]".to_owned())),
  }
}
