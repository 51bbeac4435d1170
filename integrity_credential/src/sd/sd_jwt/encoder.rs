// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use serde_json::json;

use integrity_core::common::Value;
use integrity_crypto::hash::HashAlgorithm;

use crate::error::Error;
use crate::error::Result;
use crate::sd::disclosure::digest_encoded;
use crate::sd::disclosure::ARRAY_MARKER_KEY;
use crate::sd::disclosure::SD_ALG_KEY;
use crate::sd::disclosure::SD_KEY;
use crate::sd::CredentialPath;
use crate::sd::Disclosure;
use crate::sd::PathSegment;
use crate::sd::SaltGenerator;
use crate::sd::MIN_SALT_LEN;

/// Transforms a JSON object into its selectively disclosable form.
///
/// Concealing a map key moves its digest into the parent's `_sd` array;
/// concealing an array element replaces it with the `{"...": digest}`
/// marker. Digest arrays are kept sorted so the output does not leak
/// concealment order.
pub struct SdObjectEncoder<'a> {
  object: Value,
  hash: HashAlgorithm,
  salt_generator: &'a dyn SaltGenerator,
  salt_len: usize,
}

impl<'a> SdObjectEncoder<'a> {
  /// Creates an encoder over `object`.
  ///
  /// # Errors
  ///
  /// [`Error::DataTypeMismatch`] when `object` is not a JSON object.
  pub fn new(object: Value, hash: HashAlgorithm, salt_generator: &'a dyn SaltGenerator) -> Result<Self> {
    if !object.is_object() {
      return Err(Error::DataTypeMismatch("payload must be a JSON object".to_owned()));
    }
    Ok(Self {
      object,
      hash,
      salt_generator,
      salt_len: MIN_SALT_LEN,
    })
  }

  /// Returns the digest algorithm in use.
  pub fn hash(&self) -> HashAlgorithm {
    self.hash
  }

  /// Substitutes the value at `path` with the digest of its disclosure.
  pub fn conceal(&mut self, path: &CredentialPath) -> Result<Disclosure> {
    let Some((last, parents)) = path.segments().split_last() else {
      return Err(Error::InvalidPath("cannot conceal the payload root".to_owned()));
    };
    let salt: Vec<u8> = self.salt_generator.generate(self.salt_len);
    let hash: HashAlgorithm = self.hash;
    let parent: &mut Value = navigate_mut(&mut self.object, parents, path)?;

    match (parent, last) {
      (Value::Object(map), PathSegment::Property(name)) => {
        let value: Value = map.remove(name).ok_or_else(|| Error::InvalidPath(path.to_string()))?;
        let disclosure: Disclosure = Disclosure::object_property(salt, name.clone(), value)?;
        let digest: String = disclosure.digest_json(hash)?;
        push_sorted_digest(map, digest);
        Ok(disclosure)
      }
      (Value::Array(items), PathSegment::Index(index)) => {
        let slot: &mut Value = items.get_mut(*index).ok_or_else(|| Error::InvalidPath(path.to_string()))?;
        let disclosure: Disclosure = Disclosure::array_element(salt, slot.take())?;
        let digest: String = disclosure.digest_json(hash)?;
        *slot = json!({ ARRAY_MARKER_KEY: digest });
        Ok(disclosure)
      }
      _ => Err(Error::InvalidPath(path.to_string())),
    }
  }

  /// Adds `count` decoy digests to the `_sd` array of the object at `path`.
  pub fn add_decoys(&mut self, path: &CredentialPath, count: usize) -> Result<()> {
    let hash: HashAlgorithm = self.hash;
    let salts: Vec<Vec<u8>> = (0..count).map(|_| self.salt_generator.generate(self.salt_len)).collect();
    let target: &mut Value = navigate_mut(&mut self.object, path.segments(), path)?;
    let Value::Object(map) = target else {
      return Err(Error::DataTypeMismatch(format!("decoy target {path} is not an object")));
    };
    for salt in salts {
      let decoy: String = digest_encoded(&multibase_b64(&salt), hash);
      push_sorted_digest(map, decoy);
    }
    Ok(())
  }

  /// Sets the `_sd_alg` property at the payload root.
  pub fn add_sd_alg_property(&mut self) {
    if let Value::Object(map) = &mut self.object {
      map.insert(SD_ALG_KEY.to_owned(), Value::String(self.hash.ietf_name().to_owned()));
    }
  }

  /// Returns the transformed payload.
  pub fn into_object(self) -> Value {
    self.object
  }

  /// Returns a view of the transformed payload.
  pub fn object(&self) -> &Value {
    &self.object
  }
}

fn multibase_b64(bytes: &[u8]) -> String {
  integrity_core::encoding::BaseEncoding::encode(bytes, integrity_core::encoding::Base::Base64Url)
}

fn push_sorted_digest(map: &mut serde_json::Map<String, Value>, digest: String) {
  let digests: &mut Value = map.entry(SD_KEY.to_owned()).or_insert_with(|| Value::Array(Vec::new()));
  if let Value::Array(items) = digests {
    items.push(Value::String(digest));
    items.sort_by(|left, right| left.as_str().cmp(&right.as_str()));
  }
}

fn navigate_mut<'v>(value: &'v mut Value, segments: &[PathSegment], path: &CredentialPath) -> Result<&'v mut Value> {
  let mut current: &mut Value = value;
  for segment in segments {
    current = match (current, segment) {
      (Value::Object(map), PathSegment::Property(name)) => {
        map.get_mut(name).ok_or_else(|| Error::InvalidPath(path.to_string()))?
      }
      (Value::Array(items), PathSegment::Index(index)) => {
        items.get_mut(*index).ok_or_else(|| Error::InvalidPath(path.to_string()))?
      }
      _ => return Err(Error::InvalidPath(path.to_string())),
    };
  }
  Ok(current)
}

#[cfg(test)]
mod tests {
  use crate::sd::CsprngSaltGenerator;

  use super::*;

  fn encoder(value: Value) -> SdObjectEncoder<'static> {
    static SALTS: CsprngSaltGenerator = CsprngSaltGenerator;
    SdObjectEncoder::new(value, HashAlgorithm::Sha256, &SALTS).unwrap()
  }

  #[test]
  fn concealing_a_map_key_moves_its_digest_into_sd() {
    let mut encoder = encoder(json!({"given_name": "John", "family_name": "Doe"}));
    let disclosure: Disclosure = encoder.conceal(&CredentialPath::parse("/given_name").unwrap()).unwrap();
    let digest: String = disclosure.digest_json(HashAlgorithm::Sha256).unwrap();

    let object: Value = encoder.into_object();
    assert!(object.get("given_name").is_none());
    assert_eq!(object["_sd"], json!([digest]));
    assert_eq!(object["family_name"], "Doe");
  }

  #[test]
  fn concealing_an_array_element_leaves_a_marker() {
    let mut encoder = encoder(json!({"nationalities": ["DE", "FR"]}));
    let disclosure: Disclosure = encoder.conceal(&CredentialPath::parse("/nationalities/0").unwrap()).unwrap();
    let digest: String = disclosure.digest_json(HashAlgorithm::Sha256).unwrap();

    let object: Value = encoder.into_object();
    assert_eq!(object["nationalities"][0], json!({"...": digest}));
    assert_eq!(object["nationalities"][1], "FR");
    assert!(disclosure.is_array_element());
  }

  #[test]
  fn nested_paths_conceal_inside_their_parent() {
    let mut encoder = encoder(json!({"address": {"street": "Main", "city": "Metropolis"}}));
    encoder.conceal(&CredentialPath::parse("/address/city").unwrap()).unwrap();

    let object: Value = encoder.into_object();
    assert!(object["address"].get("city").is_none());
    assert!(object["address"]["_sd"].is_array());
    assert_eq!(object["address"]["street"], "Main");
  }

  #[test]
  fn sd_arrays_stay_sorted() {
    let mut encoder = encoder(json!({"a": 1, "b": 2, "c": 3}));
    for name in ["a", "b", "c"] {
      encoder.conceal(&CredentialPath::root().join_property(name)).unwrap();
    }
    let object: Value = encoder.into_object();
    let digests: Vec<&str> = object["_sd"].as_array().unwrap().iter().filter_map(Value::as_str).collect();
    let mut sorted: Vec<&str> = digests.clone();
    sorted.sort_unstable();
    assert_eq!(digests, sorted);
  }

  #[test]
  fn decoys_are_indistinguishable_entries() {
    let mut encoder = encoder(json!({"a": 1}));
    encoder.conceal(&CredentialPath::parse("/a").unwrap()).unwrap();
    encoder.add_decoys(&CredentialPath::root(), 2).unwrap();
    let object: Value = encoder.into_object();
    assert_eq!(object["_sd"].as_array().unwrap().len(), 3);
  }

  #[test]
  fn sd_alg_lands_at_the_root() {
    let mut encoder = encoder(json!({"a": 1}));
    encoder.add_sd_alg_property();
    assert_eq!(encoder.object()["_sd_alg"], "sha-256");
  }

  #[test]
  fn missing_paths_are_rejected() {
    let mut encoder = encoder(json!({"a": 1}));
    assert!(matches!(
      encoder.conceal(&CredentialPath::parse("/missing").unwrap()),
      Err(Error::InvalidPath(_))
    ));
    assert!(matches!(encoder.conceal(&CredentialPath::root()), Err(Error::InvalidPath(_))));
  }
}
