// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use core::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use serde_json::json;

use integrity_core::common::Value;
use integrity_core::encoding::Base;
use integrity_core::encoding::BaseEncoding;
use integrity_crypto::hash::HashAlgorithm;

use crate::error::Error;
use crate::error::Result;
use crate::sd::sd_cwt::CborValue;

/// The minimum salt length (128 bit) for locally created disclosures.
pub const MIN_SALT_LEN: usize = 16;

/// The array of digests a redacted map key moves into.
pub(crate) const SD_KEY: &str = "_sd";
/// The root property naming the digest algorithm.
pub(crate) const SD_ALG_KEY: &str = "_sd_alg";
/// The single key of an array-element redaction marker.
pub(crate) const ARRAY_MARKER_KEY: &str = "...";

/// Claim names the redaction protocol reserves for itself.
const RESERVED_CLAIM_NAMES: &[&str] = &[SD_KEY, ARRAY_MARKER_KEY, SD_ALG_KEY];

/// An immutable record of `(salt, claim name?, claim value)`.
///
/// Object-property disclosures carry a claim name; array-element
/// disclosures do not. Two disclosures compare equal iff their salts are
/// equal.
#[derive(Clone)]
pub struct Disclosure {
  salt: Vec<u8>,
  claim_name: Option<String>,
  claim_value: Value,
}

impl Disclosure {
  /// Creates an object-property disclosure.
  ///
  /// # Errors
  ///
  /// [`Error::SaltTooShort`] below the 128-bit minimum;
  /// [`Error::ReservedClaimName`] for `_sd`, `...`, and `_sd_alg`.
  pub fn object_property(salt: Vec<u8>, claim_name: impl Into<String>, claim_value: Value) -> Result<Self> {
    let claim_name: String = claim_name.into();
    check_salt(&salt, true)?;
    if RESERVED_CLAIM_NAMES.contains(&claim_name.as_str()) {
      return Err(Error::ReservedClaimName(claim_name));
    }
    Ok(Self {
      salt,
      claim_name: Some(claim_name),
      claim_value,
    })
  }

  /// Creates an array-element disclosure.
  pub fn array_element(salt: Vec<u8>, claim_value: Value) -> Result<Self> {
    check_salt(&salt, true)?;
    Ok(Self {
      salt,
      claim_name: None,
      claim_value,
    })
  }

  /// Returns the salt bytes.
  pub fn salt(&self) -> &[u8] {
    &self.salt
  }

  /// Returns the claim name for object-property disclosures.
  pub fn claim_name(&self) -> Option<&str> {
    self.claim_name.as_deref()
  }

  /// Returns the claim value.
  pub fn claim_value(&self) -> &Value {
    &self.claim_value
  }

  /// Returns `true` for array-element disclosures.
  pub fn is_array_element(&self) -> bool {
    self.claim_name.is_none()
  }

  /// Serializes to the SD-JWT wire form: the JSON array
  /// `[salt, name, value]` (or `[salt, value]`), base64url-encoded.
  pub fn encode_json(&self) -> Result<String> {
    let salt: String = BaseEncoding::encode(&self.salt, Base::Base64Url);
    let array: Value = match &self.claim_name {
      Some(name) => json!([salt, name, self.claim_value]),
      None => json!([salt, self.claim_value]),
    };
    let serialized: Vec<u8> = serde_json::to_vec(&array).map_err(integrity_core::Error::EncodeJSON)?;
    Ok(BaseEncoding::encode(&serialized, Base::Base64Url))
  }

  /// Parses the SD-JWT wire form.
  ///
  /// Salts shorter than [`MIN_SALT_LEN`] are accepted here for
  /// interoperability with external issuers; only empty salts are rejected.
  pub fn parse_json(encoded: &str) -> Result<Self> {
    let decoded: Vec<u8> = BaseEncoding::decode(encoded, Base::Base64Url)?;
    let array: Value = serde_json::from_slice(&decoded).map_err(integrity_core::Error::DecodeJSON)?;
    let items: &Vec<Value> = match &array {
      Value::Array(items) if (2..=3).contains(&items.len()) => items,
      _ => return Err(Error::InvalidDisclosure("expected a two or three element array".to_owned())),
    };
    let salt: Vec<u8> = items[0]
      .as_str()
      .map(|text| BaseEncoding::decode(text, Base::Base64Url))
      .transpose()?
      .ok_or_else(|| Error::InvalidDisclosure("salt must be a base64url string".to_owned()))?;
    check_salt(&salt, false)?;
    let (claim_name, claim_value): (Option<String>, Value) = if items.len() == 3 {
      let name: &str = items[1]
        .as_str()
        .ok_or_else(|| Error::InvalidDisclosure("claim name must be a string".to_owned()))?;
      (Some(name.to_owned()), items[2].clone())
    } else {
      (None, items[1].clone())
    };
    Ok(Self {
      salt,
      claim_name,
      claim_value,
    })
  }

  /// Serializes to the SD-CWT wire form: the CBOR array
  /// `[salt, name, value]` (or `[salt, value]`).
  pub fn encode_cbor(&self) -> Vec<u8> {
    let mut items: Vec<CborValue> = vec![CborValue::Bytes(self.salt.clone())];
    if let Some(name) = &self.claim_name {
      items.push(CborValue::Text(name.clone()));
    }
    items.push(CborValue::from_json(&self.claim_value));
    CborValue::Array(items).to_bytes()
  }

  /// Parses the SD-CWT wire form.
  pub fn parse_cbor(bytes: &[u8]) -> Result<Self> {
    let value: CborValue = CborValue::from_slice(bytes)?;
    let CborValue::Array(items) = value else {
      return Err(Error::InvalidCbor("disclosure must be an array".to_owned()));
    };
    if !(2..=3).contains(&items.len()) {
      return Err(Error::InvalidCbor("disclosure must have two or three elements".to_owned()));
    }
    let CborValue::Bytes(salt) = &items[0] else {
      return Err(Error::InvalidCbor("disclosure salt must be a byte string".to_owned()));
    };
    check_salt(salt, false)?;
    let (claim_name, value_index): (Option<String>, usize) = if items.len() == 3 {
      let CborValue::Text(name) = &items[1] else {
        return Err(Error::InvalidCbor("disclosure claim name must be a text string".to_owned()));
      };
      (Some(name.clone()), 2)
    } else {
      (None, 1)
    };
    let claim_value: Value = items[value_index]
      .to_json()
      .ok_or_else(|| Error::InvalidCbor("disclosure value is not representable".to_owned()))?;
    Ok(Self {
      salt: salt.clone(),
      claim_name,
      claim_value,
    })
  }

  /// Computes the SD-JWT digest: base64url of the hash over the ASCII bytes
  /// of the encoded disclosure.
  pub fn digest_json(&self, hash: HashAlgorithm) -> Result<String> {
    Ok(digest_encoded(&self.encode_json()?, hash))
  }

  /// Computes the SD-CWT digest: the raw hash over the CBOR encoding.
  pub fn digest_cbor(&self, hash: HashAlgorithm) -> Vec<u8> {
    hash.digest(&self.encode_cbor())
  }
}

/// Digests an already-encoded SD-JWT disclosure string.
pub(crate) fn digest_encoded(encoded: &str, hash: HashAlgorithm) -> String {
  BaseEncoding::encode(&hash.digest(encoded.as_bytes()), Base::Base64Url)
}

fn check_salt(salt: &[u8], enforce_minimum: bool) -> Result<()> {
  if salt.is_empty() {
    return Err(Error::EmptySalt);
  }
  if enforce_minimum && salt.len() < MIN_SALT_LEN {
    return Err(Error::SaltTooShort);
  }
  Ok(())
}

impl PartialEq for Disclosure {
  fn eq(&self, other: &Self) -> bool {
    self.salt == other.salt
  }
}

impl Eq for Disclosure {}

impl fmt::Debug for Disclosure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Disclosure")
      .field("claim_name", &self.claim_name)
      .field("claim_value", &self.claim_value)
      .finish_non_exhaustive()
  }
}

/// A source of disclosure salts.
pub trait SaltGenerator: Send + Sync {
  /// Produces `len` bytes of salt.
  fn generate(&self, len: usize) -> Vec<u8>;
}

/// CSPRNG-backed salt generation.
#[derive(Clone, Copy, Debug, Default)]
pub struct CsprngSaltGenerator;

impl SaltGenerator for CsprngSaltGenerator {
  fn generate(&self, len: usize) -> Vec<u8> {
    let mut salt: Vec<u8> = vec![0u8; len];
    OsRng.fill_bytes(&mut salt);
    salt
  }
}
