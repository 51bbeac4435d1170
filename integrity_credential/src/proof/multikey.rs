// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Multibase/multicodec wrapping of raw key material ("Multikey").

use integrity_core::encoding::BaseEncoding;
use integrity_core::encoding::Multicodec;
use integrity_crypto::error::DispatchError;
use integrity_crypto::error::DispatchErrorKind;
use integrity_crypto::memory::PrivateKeyMemory;
use integrity_crypto::memory::PublicKeyMemory;
use integrity_crypto::memory::SensitiveMemoryPool;
use integrity_crypto::tag::Algorithm;

use crate::error::Error;
use crate::error::Result;

/// Decodes a `publicKeyMultibase` value into pooled memory.
pub fn decode_public_multikey(value: &str, pool: &SensitiveMemoryPool) -> Result<(Algorithm, PublicKeyMemory)> {
  let (codec, bytes): (Multicodec, Vec<u8>) = unwrap_multikey(value)?;
  let algorithm: Algorithm = public_algorithm(codec)?;
  let memory: PublicKeyMemory = PublicKeyMemory::rent(pool, &bytes, algorithm)?;
  Ok((algorithm, memory))
}

/// Decodes a `secretKeyMultibase` value into pooled memory.
pub fn decode_private_multikey(value: &str, pool: &SensitiveMemoryPool) -> Result<(Algorithm, PrivateKeyMemory)> {
  let (codec, bytes): (Multicodec, Vec<u8>) = unwrap_multikey(value)?;
  let algorithm: Algorithm = match codec {
    Multicodec::Ed25519Priv => Algorithm::ED25519,
    other => {
      return Err(unsupported(format!("{other:?} does not identify secret key material")));
    }
  };
  let memory: PrivateKeyMemory = PrivateKeyMemory::rent(pool, &bytes, algorithm)?;
  Ok((algorithm, memory))
}

/// Encodes raw public-key bytes as a base58-btc multikey.
pub fn encode_public_multikey(algorithm: Algorithm, bytes: &[u8]) -> Result<String> {
  let codec: Multicodec = match algorithm {
    Algorithm::ED25519 => Multicodec::Ed25519Pub,
    Algorithm::X25519 => Multicodec::X25519Pub,
    Algorithm::P256 => Multicodec::P256Pub,
    Algorithm::P384 => Multicodec::P384Pub,
    Algorithm::P521 => Multicodec::P521Pub,
    Algorithm::SECP256K1 => Multicodec::Secp256k1Pub,
    Algorithm::BLS12_381_G1 => Multicodec::Bls12381G1Pub,
    Algorithm::BLS12_381_G2 => Multicodec::Bls12381G2Pub,
    Algorithm::BLS12_381_G1G2 => Multicodec::Bls12381G1G2Pub,
    Algorithm::RSA_2048 | Algorithm::RSA_4096 => Multicodec::RsaPub,
    other => return Err(unsupported(format!("no multicodec entry for algorithm {other}"))),
  };
  Ok(BaseEncoding::encode_multibase(&codec.wrap(bytes), None))
}

fn unwrap_multikey(value: &str) -> Result<(Multicodec, Vec<u8>)> {
  let (_, data): (_, Vec<u8>) = BaseEncoding::decode_multibase(value)?;
  let (codec, payload): (Multicodec, &[u8]) = Multicodec::unwrap(&data)?;
  Ok((codec, payload.to_vec()))
}

fn public_algorithm(codec: Multicodec) -> Result<Algorithm> {
  match codec {
    Multicodec::Ed25519Pub => Ok(Algorithm::ED25519),
    Multicodec::X25519Pub => Ok(Algorithm::X25519),
    Multicodec::P256Pub => Ok(Algorithm::P256),
    Multicodec::P384Pub => Ok(Algorithm::P384),
    Multicodec::P521Pub => Ok(Algorithm::P521),
    Multicodec::Secp256k1Pub => Ok(Algorithm::SECP256K1),
    Multicodec::Bls12381G1Pub => Ok(Algorithm::BLS12_381_G1),
    Multicodec::Bls12381G2Pub => Ok(Algorithm::BLS12_381_G2),
    Multicodec::Bls12381G1G2Pub => Ok(Algorithm::BLS12_381_G1G2),
    Multicodec::RsaPub => Ok(Algorithm::RSA_2048),
    other => Err(unsupported(format!("{other:?} does not identify public key material"))),
  }
}

fn unsupported(message: String) -> Error {
  Error::Dispatch(DispatchError::new(DispatchErrorKind::UnsupportedAlgorithm).with_message(message))
}
