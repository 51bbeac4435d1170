// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use ciborium::value::Value as CoseValue;
use coset::iana;
use coset::CborSerializable;
use coset::CoseSign1;
use coset::CoseSign1Builder;
use coset::HeaderBuilder;
use coset::Label;
use coset::ProtectedHeader;
use coset::SignatureContext;
use coset::TaggedCborSerializable;
use tokio_util::sync::CancellationToken;

use integrity_core::common::Value;
use integrity_core::encoding::Base;
use integrity_core::encoding::BaseEncoding;
use integrity_crypto::hash::HashAlgorithm;
use integrity_crypto::memory::PrivateKeyMemory;
use integrity_crypto::memory::PublicKeyMemory;
use integrity_crypto::memory::SensitiveMemoryPool;
use integrity_crypto::memory::SignatureMemory;
use integrity_crypto::registry::CryptoFunctionRegistry;
use integrity_crypto::tag::Algorithm;

use crate::error::Error;
use crate::error::Result;
use crate::sd::CredentialPath;
use crate::sd::Disclosure;
use crate::sd::PathLattice;
use crate::sd::SaltGenerator;

use super::CborValue;
use super::SdCwtEncoder;
use super::SD_ALG_HEADER;
use super::SD_CLAIMS_HEADER;

/// An issued SD-CWT: COSE_Sign1 envelope bytes, CBOR-encoded disclosures,
/// optional KB-CWT bytes.
///
/// The envelope's protected header carries the COSE hash identifier at key
/// 18 (`sd_alg`); the unprotected header carries the disclosure array at
/// key 17 (`sd_claims`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SdCwtToken {
  envelope: Vec<u8>,
  disclosures: Vec<Vec<u8>>,
  key_binding: Option<Vec<u8>>,
}

impl SdCwtToken {
  /// Creates a token, checking that `envelope` parses as COSE_Sign1.
  pub fn new(envelope: Vec<u8>, disclosures: Vec<Vec<u8>>) -> Result<Self> {
    parse_cose_sign1(&envelope)?;
    Ok(Self {
      envelope,
      disclosures,
      key_binding: None,
    })
  }

  /// Returns the COSE_Sign1 envelope bytes.
  pub fn envelope(&self) -> &[u8] {
    &self.envelope
  }

  /// Returns the CBOR-encoded disclosures in issuance order.
  pub fn disclosures(&self) -> &[Vec<u8>] {
    &self.disclosures
  }

  /// Returns the KB-CWT bytes, if attached.
  pub fn key_binding(&self) -> Option<&[u8]> {
    self.key_binding.as_deref()
  }

  /// Attaches a KB-CWT.
  pub fn with_key_binding(mut self, kb_cwt: Vec<u8>) -> Result<Self> {
    parse_cose_sign1(&kb_cwt)?;
    self.key_binding = Some(kb_cwt);
    Ok(self)
  }

  /// Parses the envelope.
  pub fn cose_sign1(&self) -> Result<CoseSign1> {
    parse_cose_sign1(&self.envelope)
  }

  /// Decodes the claims payload.
  pub fn claims(&self) -> Result<CborValue> {
    let cose: CoseSign1 = self.cose_sign1()?;
    let payload: Vec<u8> = cose.payload.ok_or_else(|| Error::InvalidCbor("envelope has no payload".to_owned()))?;
    CborValue::from_slice(&payload)
  }

  /// Returns the digest algorithm from the protected `sd_alg` header,
  /// defaulting to SHA-256.
  pub fn hash_algorithm(&self) -> Result<HashAlgorithm> {
    let cose: CoseSign1 = self.cose_sign1()?;
    let identifier: Option<i64> = cose
      .protected
      .header
      .rest
      .iter()
      .find(|(label, _)| *label == Label::Int(SD_ALG_HEADER))
      .and_then(|(_, value)| value.as_integer())
      .and_then(|integer| i64::try_from(i128::from(integer)).ok());
    match identifier {
      Some(identifier) => {
        HashAlgorithm::from_cose_identifier(identifier).ok_or_else(|| Error::UnknownHashAlgorithm(identifier.to_string()))
      }
      None => Ok(HashAlgorithm::Sha256),
    }
  }

  /// Builds the path lattice of this token.
  pub fn lattice(&self) -> Result<PathLattice> {
    PathLattice::analyze_cbor(&self.claims()?, &self.disclosures, self.hash_algorithm()?)
  }

  /// Builds a presentation revealing exactly the disclosures needed for
  /// `targets`. Any existing key binding is removed.
  pub fn select(&self, targets: &[CredentialPath]) -> Result<Self> {
    let hash: HashAlgorithm = self.hash_algorithm()?;
    let lattice: PathLattice = self.lattice()?;
    let needed: Vec<String> = lattice.minimum_disclosure(targets)?;
    let disclosures: Vec<Vec<u8>> = self
      .disclosures
      .iter()
      .filter(|encoded| needed.contains(&BaseEncoding::encode(&hash.digest(encoded), Base::Base64Url)))
      .cloned()
      .collect();
    Ok(Self {
      envelope: self.envelope.clone(),
      disclosures,
      key_binding: None,
    })
  }

  /// Returns the bytes covered by a key-binding `sd_hash`: the CBOR array
  /// `[envelope, disclosure…]` without any KB-CWT.
  pub fn sd_hash_payload(&self) -> Vec<u8> {
    let mut items: Vec<CborValue> = vec![CborValue::Bytes(self.envelope.clone())];
    items.extend(self.disclosures.iter().cloned().map(CborValue::Bytes));
    CborValue::Array(items).to_bytes()
  }

  /// Verifies the envelope signature through the registry.
  pub async fn verify_signature(
    &self,
    public_key: &PublicKeyMemory,
    algorithm: Algorithm,
    registry: &CryptoFunctionRegistry,
    pool: &SensitiveMemoryPool,
    cancel: &CancellationToken,
  ) -> Result<bool> {
    let cose: CoseSign1 = self.cose_sign1()?;
    let payload: Vec<u8> = cose
      .payload
      .clone()
      .ok_or_else(|| Error::InvalidCbor("envelope has no payload".to_owned()))?;
    let to_be_signed: Vec<u8> =
      coset::sig_structure_data(SignatureContext::CoseSign1, cose.protected.clone(), None, &[], &payload);
    let signature: SignatureMemory = SignatureMemory::rent(pool, &cose.signature, algorithm)?;
    registry
      .verify(&to_be_signed, &signature, public_key, cancel)
      .await
      .map_err(Error::Dispatch)
  }
}

/// Builder structure to create an issuable SD-CWT.
pub struct SdCwtBuilder<'a> {
  encoder: SdCwtEncoder<'a>,
  disclosures: Vec<Disclosure>,
  confirmation_key: Option<CborValue>,
}

impl<'a> SdCwtBuilder<'a> {
  /// Creates a new builder over the claims `object`.
  pub fn new(claims: Value, hash: HashAlgorithm, salt_generator: &'a dyn SaltGenerator) -> Result<Self> {
    Ok(Self {
      encoder: SdCwtEncoder::new(claims, hash, salt_generator)?,
      disclosures: Vec::new(),
      confirmation_key: None,
    })
  }

  /// Substitutes the value at `path` with the digest of its disclosure.
  pub fn make_concealable(mut self, path: &CredentialPath) -> Result<Self> {
    let disclosure: Disclosure = self.encoder.conceal(path)?;
    self.disclosures.push(disclosure);
    Ok(self)
  }

  /// Embeds `confirmation_key` as the `cnf` claim (key 8).
  pub fn require_key_binding(mut self, confirmation_key: CborValue) -> Self {
    self.confirmation_key = Some(confirmation_key);
    self
  }

  /// Signs the claims through the registry and assembles the token.
  pub async fn finish(
    self,
    private_key: &PrivateKeyMemory,
    algorithm: Algorithm,
    registry: &CryptoFunctionRegistry,
    pool: &SensitiveMemoryPool,
    cancel: &CancellationToken,
  ) -> Result<SdCwtToken> {
    let SdCwtBuilder {
      encoder,
      disclosures,
      confirmation_key,
    } = self;
    let hash: HashAlgorithm = encoder.hash();

    let mut claims: CborValue = encoder.into_claims();
    if let Some(confirmation_key) = confirmation_key {
      if let CborValue::Map(entries) = &mut claims {
        entries.push((CborValue::Integer(8), confirmation_key));
      }
    }
    let payload: Vec<u8> = claims.to_bytes();

    let protected: coset::Header = HeaderBuilder::new()
      .algorithm(cose_algorithm(algorithm)?)
      .value(SD_ALG_HEADER, CoseValue::from(hash.cose_identifier()))
      .build();
    let encoded_disclosures: Vec<Vec<u8>> = disclosures.iter().map(Disclosure::encode_cbor).collect();
    let unprotected: coset::Header = HeaderBuilder::new()
      .value(
        SD_CLAIMS_HEADER,
        CoseValue::Array(encoded_disclosures.iter().cloned().map(CoseValue::Bytes).collect()),
      )
      .build();

    let to_be_signed: Vec<u8> = coset::sig_structure_data(
      SignatureContext::CoseSign1,
      ProtectedHeader {
        original_data: None,
        header: protected.clone(),
      },
      None,
      &[],
      &payload,
    );
    let signature: SignatureMemory = registry.sign(private_key, &to_be_signed, pool, cancel).await?;

    let envelope: CoseSign1 = CoseSign1Builder::new()
      .protected(protected)
      .unprotected(unprotected)
      .payload(payload)
      .signature(signature.as_slice().to_vec())
      .build();
    let envelope: Vec<u8> = envelope
      .to_tagged_vec()
      .map_err(|error| Error::InvalidCbor(error.to_string()))?;

    SdCwtToken::new(envelope, encoded_disclosures)
  }
}

fn cose_algorithm(algorithm: Algorithm) -> Result<iana::Algorithm> {
  match algorithm {
    Algorithm::ED25519 => Ok(iana::Algorithm::EdDSA),
    Algorithm::P256 => Ok(iana::Algorithm::ES256),
    other => Err(Error::Dispatch(
      integrity_crypto::DispatchError::new(integrity_crypto::DispatchErrorKind::UnsupportedAlgorithm)
        .with_message(format!("no COSE algorithm for {other}")),
    )),
  }
}

fn parse_cose_sign1(bytes: &[u8]) -> Result<CoseSign1> {
  CoseSign1::from_tagged_slice(bytes)
    .or_else(|_| CoseSign1::from_slice(bytes))
    .map_err(|error| Error::InvalidCbor(error.to_string()))
}
