// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use crate::error::Error;
use crate::error::Result;

/// Supported [multicodec](https://github.com/multiformats/multicodec) table
/// entries for key material.
///
/// A multicodec-wrapped key is the unsigned-varint encoding of the code
/// followed by the raw key bytes. Unknown codes are rejected.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum Multicodec {
  /// `ed25519-pub`.
  Ed25519Pub,
  /// `ed25519-priv`.
  Ed25519Priv,
  /// `x25519-pub`.
  X25519Pub,
  /// `p256-pub`.
  P256Pub,
  /// `p384-pub`.
  P384Pub,
  /// `p521-pub`.
  P521Pub,
  /// `secp256k1-pub`.
  Secp256k1Pub,
  /// `bls12_381-g1-pub`.
  Bls12381G1Pub,
  /// `bls12_381-g2-pub`.
  Bls12381G2Pub,
  /// `bls12_381-g1g2-pub`.
  Bls12381G1G2Pub,
  /// `rsa-pub`.
  RsaPub,
}

impl Multicodec {
  /// All table entries, used for exhaustive decoding and tests.
  pub const ALL: &'static [Multicodec] = &[
    Multicodec::Ed25519Pub,
    Multicodec::Ed25519Priv,
    Multicodec::X25519Pub,
    Multicodec::P256Pub,
    Multicodec::P384Pub,
    Multicodec::P521Pub,
    Multicodec::Secp256k1Pub,
    Multicodec::Bls12381G1Pub,
    Multicodec::Bls12381G2Pub,
    Multicodec::Bls12381G1G2Pub,
    Multicodec::RsaPub,
  ];

  /// Returns the varint code of this table entry.
  pub const fn code(&self) -> u64 {
    match self {
      Self::Ed25519Pub => 0xed,
      Self::Ed25519Priv => 0x1300,
      Self::X25519Pub => 0xec,
      Self::P256Pub => 0x1200,
      Self::P384Pub => 0x1201,
      Self::P521Pub => 0x1202,
      Self::Secp256k1Pub => 0xe7,
      Self::Bls12381G1Pub => 0xea,
      Self::Bls12381G2Pub => 0xeb,
      Self::Bls12381G1G2Pub => 0xee,
      Self::RsaPub => 0x1205,
    }
  }

  /// Looks up the table entry for `code`.
  ///
  /// # Errors
  ///
  /// [`Error::UnknownMulticodec`] when `code` is not in the table.
  pub fn from_code(code: u64) -> Result<Self> {
    Self::ALL
      .iter()
      .copied()
      .find(|entry| entry.code() == code)
      .ok_or(Error::UnknownMulticodec(code))
  }

  /// Prefixes `bytes` with this entry's varint code.
  pub fn wrap(&self, bytes: &[u8]) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::with_capacity(bytes.len() + 2);
    write_varint(self.code(), &mut output);
    output.extend_from_slice(bytes);
    output
  }

  /// Splits multicodec-wrapped `data` into its table entry and payload.
  ///
  /// # Errors
  ///
  /// [`Error::TruncatedInput`] when `data` ends inside the varint or carries
  /// no payload; [`Error::UnknownMulticodec`] for codes not in the table.
  pub fn unwrap(data: &[u8]) -> Result<(Self, &[u8])> {
    let (code, read): (u64, usize) = read_varint(data)?;
    let codec: Self = Self::from_code(code)?;
    let payload: &[u8] = &data[read..];
    if payload.is_empty() {
      return Err(Error::TruncatedInput);
    }
    Ok((codec, payload))
  }
}

/// Appends `value` as an unsigned LEB128 varint.
fn write_varint(mut value: u64, output: &mut Vec<u8>) {
  loop {
    let mut byte: u8 = (value & 0x7f) as u8;
    value >>= 7;
    if value != 0 {
      byte |= 0x80;
    }
    output.push(byte);
    if value == 0 {
      break;
    }
  }
}

/// Reads an unsigned LEB128 varint, returning the value and bytes consumed.
fn read_varint(data: &[u8]) -> Result<(u64, usize)> {
  let mut value: u64 = 0;
  for (index, byte) in data.iter().copied().enumerate() {
    // Nine varint bytes exceed every code in the table.
    if index >= 9 {
      return Err(Error::UnknownMulticodec(value));
    }
    value |= u64::from(byte & 0x7f) << (7 * index);
    if byte & 0x80 == 0 {
      return Ok((value, index + 1));
    }
  }
  Err(Error::TruncatedInput)
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;

  #[test]
  fn ed25519_pub_wraps_to_the_known_prefix() {
    let wrapped: Vec<u8> = Multicodec::Ed25519Pub.wrap(&[0u8; 32]);
    assert_eq!(&wrapped[..2], &[0xed, 0x01]);
    assert_eq!(wrapped.len(), 34);
  }

  #[test]
  fn unknown_code_is_rejected() {
    assert!(matches!(
      Multicodec::unwrap(&[0x01, 0xaa]),
      Err(Error::UnknownMulticodec(0x01))
    ));
  }

  #[test]
  fn truncated_varint_is_rejected() {
    assert!(matches!(Multicodec::unwrap(&[0x80]), Err(Error::TruncatedInput)));
  }

  #[test]
  fn missing_payload_is_rejected() {
    let prefix_only: Vec<u8> = Multicodec::Ed25519Pub.wrap(&[]);
    assert!(matches!(Multicodec::unwrap(&prefix_only), Err(Error::TruncatedInput)));
  }

  proptest! {
    #[test]
    fn wrap_unwrap_round_trip(
      index in 0usize..Multicodec::ALL.len(),
      bytes in proptest::collection::vec(any::<u8>(), 1..128),
    ) {
      let codec: Multicodec = Multicodec::ALL[index];
      let wrapped = codec.wrap(&bytes);
      let (decoded, payload) = Multicodec::unwrap(&wrapped).unwrap();
      prop_assert_eq!(decoded, codec);
      prop_assert_eq!(payload, bytes.as_slice());
    }
  }
}
