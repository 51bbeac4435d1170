// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use integrity_core::common::Value;
use integrity_crypto::hash::HashAlgorithm;

use crate::error::Error;
use crate::error::Result;
use crate::sd::CredentialPath;
use crate::sd::Disclosure;
use crate::sd::PathSegment;
use crate::sd::SaltGenerator;
use crate::sd::MIN_SALT_LEN;

use super::CborValue;
use super::REDACTED_CLAIM_ELEMENT_TAG;
use super::REDACTED_CLAIM_KEYS;

/// Transforms a CBOR claims map into its selectively disclosable form.
///
/// Concealing a map entry moves its digest into the byte-string array keyed
/// by simple value 59; concealing an array element replaces it with tag 60
/// wrapping the digest. Digest arrays are kept sorted.
pub struct SdCwtEncoder<'a> {
  claims: CborValue,
  hash: HashAlgorithm,
  salt_generator: &'a dyn SaltGenerator,
  salt_len: usize,
}

impl<'a> SdCwtEncoder<'a> {
  /// Creates an encoder over a JSON claims object.
  pub fn new(claims: Value, hash: HashAlgorithm, salt_generator: &'a dyn SaltGenerator) -> Result<Self> {
    if !claims.is_object() {
      return Err(Error::DataTypeMismatch("claims must be a JSON object".to_owned()));
    }
    Ok(Self {
      claims: CborValue::from_json(&claims),
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
      return Err(Error::InvalidPath("cannot conceal the claims root".to_owned()));
    };
    let salt: Vec<u8> = self.salt_generator.generate(self.salt_len);
    let hash: HashAlgorithm = self.hash;
    let parent: &mut CborValue = navigate_mut(&mut self.claims, parents, path)?;

    match (parent, last) {
      (CborValue::Map(entries), PathSegment::Property(name)) => {
        let position: usize = entries
          .iter()
          .position(|(key, _)| matches!(key, CborValue::Text(text) if text == name))
          .ok_or_else(|| Error::InvalidPath(path.to_string()))?;
        let (_, value): (CborValue, CborValue) = entries.remove(position);
        let value: Value = value
          .to_json()
          .ok_or_else(|| Error::InvalidCbor(format!("value at {path} is not representable")))?;
        let disclosure: Disclosure = Disclosure::object_property(salt, name.clone(), value)?;
        push_sorted_digest(entries, disclosure.digest_cbor(hash));
        Ok(disclosure)
      }
      (CborValue::Array(items), PathSegment::Index(index)) => {
        let slot: &mut CborValue = items.get_mut(*index).ok_or_else(|| Error::InvalidPath(path.to_string()))?;
        let value: Value = slot
          .to_json()
          .ok_or_else(|| Error::InvalidCbor(format!("value at {path} is not representable")))?;
        let disclosure: Disclosure = Disclosure::array_element(salt, value)?;
        let digest: Vec<u8> = disclosure.digest_cbor(hash);
        *slot = CborValue::Tag(REDACTED_CLAIM_ELEMENT_TAG, Box::new(CborValue::Bytes(digest)));
        Ok(disclosure)
      }
      _ => Err(Error::InvalidPath(path.to_string())),
    }
  }

  /// Returns the transformed claims map.
  pub fn into_claims(self) -> CborValue {
    self.claims
  }

  /// Returns a view of the transformed claims map.
  pub fn claims(&self) -> &CborValue {
    &self.claims
  }
}

fn push_sorted_digest(entries: &mut Vec<(CborValue, CborValue)>, digest: Vec<u8>) {
  let position: Option<usize> = entries
    .iter()
    .position(|(key, _)| matches!(key, CborValue::Simple(value) if *value == REDACTED_CLAIM_KEYS));
  let index: usize = match position {
    Some(index) => index,
    None => {
      entries.push((CborValue::Simple(REDACTED_CLAIM_KEYS), CborValue::Array(Vec::new())));
      entries.len() - 1
    }
  };
  if let CborValue::Array(digests) = &mut entries[index].1 {
    digests.push(CborValue::Bytes(digest));
    digests.sort_by(|left, right| match (left, right) {
      (CborValue::Bytes(left), CborValue::Bytes(right)) => left.cmp(right),
      _ => core::cmp::Ordering::Equal,
    });
  }
}

fn navigate_mut<'v>(
  value: &'v mut CborValue,
  segments: &[PathSegment],
  path: &CredentialPath,
) -> Result<&'v mut CborValue> {
  let mut current: &mut CborValue = value;
  for segment in segments {
    current = match (current, segment) {
      (CborValue::Map(entries), PathSegment::Property(name)) => entries
        .iter_mut()
        .find(|(key, _)| matches!(key, CborValue::Text(text) if text == name))
        .map(|(_, value)| value)
        .ok_or_else(|| Error::InvalidPath(path.to_string()))?,
      (CborValue::Array(items), PathSegment::Index(index)) => {
        items.get_mut(*index).ok_or_else(|| Error::InvalidPath(path.to_string()))?
      }
      _ => return Err(Error::InvalidPath(path.to_string())),
    };
  }
  Ok(current)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use crate::sd::sd_cwt::is_redacted_claim_keys_entry;
  use crate::sd::sd_cwt::redacted_array_digest;
  use crate::sd::CsprngSaltGenerator;

  use super::*;

  static SALTS: CsprngSaltGenerator = CsprngSaltGenerator;

  #[test]
  fn concealing_a_map_entry_adds_a_simple_59_keyed_digest() {
    let mut encoder: SdCwtEncoder<'_> = SdCwtEncoder::new(
      json!({"given_name": "John", "family_name": "Doe"}),
      HashAlgorithm::Sha256,
      &SALTS,
    )
    .unwrap();
    let disclosure: Disclosure = encoder.conceal(&CredentialPath::parse("/given_name").unwrap()).unwrap();
    let digest: Vec<u8> = disclosure.digest_cbor(HashAlgorithm::Sha256);

    let CborValue::Map(entries) = encoder.into_claims() else { panic!("claims must be a map") };
    let redacted: &(CborValue, CborValue) = entries
      .iter()
      .find(|(key, _)| is_redacted_claim_keys_entry(key))
      .unwrap();
    assert_eq!(redacted.1, CborValue::Array(vec![CborValue::Bytes(digest)]));
    assert!(!entries.iter().any(|(key, _)| matches!(key, CborValue::Text(t) if t == "given_name")));
  }

  #[test]
  fn concealing_an_array_element_wraps_the_digest_in_tag_60() {
    let mut encoder: SdCwtEncoder<'_> =
      SdCwtEncoder::new(json!({"nationalities": ["DE", "FR"]}), HashAlgorithm::Sha256, &SALTS).unwrap();
    let disclosure: Disclosure = encoder.conceal(&CredentialPath::parse("/nationalities/0").unwrap()).unwrap();
    let digest: Vec<u8> = disclosure.digest_cbor(HashAlgorithm::Sha256);

    let CborValue::Map(entries) = encoder.into_claims() else { panic!("claims must be a map") };
    let (_, nationalities): &(CborValue, CborValue) = entries
      .iter()
      .find(|(key, _)| matches!(key, CborValue::Text(t) if t == "nationalities"))
      .unwrap();
    let CborValue::Array(items) = nationalities else { panic!("expected an array") };
    assert_eq!(redacted_array_digest(&items[0]), Some(digest.as_slice()));
    assert_eq!(items[1], CborValue::Text("FR".to_owned()));
  }

  #[test]
  fn digest_arrays_stay_sorted() {
    let mut encoder: SdCwtEncoder<'_> =
      SdCwtEncoder::new(json!({"a": 1, "b": 2, "c": 3}), HashAlgorithm::Sha256, &SALTS).unwrap();
    for name in ["a", "b", "c"] {
      encoder.conceal(&CredentialPath::root().join_property(name)).unwrap();
    }
    let CborValue::Map(entries) = encoder.into_claims() else { panic!("claims must be a map") };
    let (_, digests): &(CborValue, CborValue) = entries
      .iter()
      .find(|(key, _)| is_redacted_claim_keys_entry(key))
      .unwrap();
    let CborValue::Array(digests) = digests else { panic!("expected an array") };
    let bytes: Vec<&[u8]> = digests
      .iter()
      .filter_map(|digest| match digest {
        CborValue::Bytes(bytes) => Some(bytes.as_slice()),
        _ => None,
      })
      .collect();
    let mut sorted: Vec<&[u8]> = bytes.clone();
    sorted.sort_unstable();
    assert_eq!(bytes, sorted);
  }
}
