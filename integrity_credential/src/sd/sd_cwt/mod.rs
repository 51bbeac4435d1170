// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! SD-CWT issuance and presentation over COSE_Sign1.

mod encoder;
mod token;
mod value;

pub use self::encoder::SdCwtEncoder;
pub use self::token::SdCwtBuilder;
pub use self::token::SdCwtToken;
pub use self::value::CborValue;

/// The CBOR simple value keying the array of redacted map-entry digests.
pub const REDACTED_CLAIM_KEYS: u8 = 59;

/// The CBOR tag wrapping the digest of a redacted array element.
pub const REDACTED_CLAIM_ELEMENT_TAG: u64 = 60;

/// Tags accepted as array-element redaction markers when parsing; 58 was
/// assigned to the marker in earlier drafts.
pub const REDACTED_CLAIM_ELEMENT_TAGS: [u64; 2] = [REDACTED_CLAIM_ELEMENT_TAG, 58];

/// The unprotected header parameter carrying the CBOR-encoded disclosures.
pub const SD_CLAIMS_HEADER: i64 = 17;

/// The protected header parameter carrying the COSE hash identifier.
pub const SD_ALG_HEADER: i64 = 18;

/// Returns whether a payload map key marks the `redacted_claim_keys` entry.
pub fn is_redacted_claim_keys_entry(key: &CborValue) -> bool {
  matches!(key, CborValue::Simple(value) if *value == REDACTED_CLAIM_KEYS)
}

/// Returns the digest bytes of an array element redaction marker.
pub fn redacted_array_digest(value: &CborValue) -> Option<&[u8]> {
  match value {
    CborValue::Tag(tag, inner) if REDACTED_CLAIM_ELEMENT_TAGS.contains(tag) => match inner.as_ref() {
      CborValue::Bytes(bytes) => Some(bytes),
      _ => None,
    },
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn simple_value_59_marks_redacted_claim_keys() {
    let payload: CborValue = CborValue::Map(vec![(
      CborValue::Simple(59),
      CborValue::Array(vec![CborValue::Bytes(vec![0xAF, 0x37, 0x5D, 0xC3])]),
    )]);
    let CborValue::Map(entries) = &payload else { unreachable!() };
    assert!(is_redacted_claim_keys_entry(&entries[0].0));
    assert!(!is_redacted_claim_keys_entry(&CborValue::Integer(59)));
  }

  #[test]
  fn tag_60_marks_a_redacted_array_element() {
    let digest: Vec<u8> = vec![0x1B, 0x7F, 0xC8, 0xEC];
    let element: CborValue = CborValue::Tag(60, Box::new(CborValue::Bytes(digest.clone())));
    assert_eq!(redacted_array_digest(&element), Some(digest.as_slice()));
    assert_eq!(redacted_array_digest(&CborValue::Tag(61, Box::new(CborValue::Bytes(digest)))), None);
  }
}
