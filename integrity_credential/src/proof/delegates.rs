// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Injection points for canonicalization, serialization, and proof-value
//! encoding.
//!
//! The proof engine is strictly serialization-agnostic: every
//! format-specific step goes through one of these delegates. JSON and JCS
//! implementations ship with the crate; RDFC-1.0 is supplied by the caller.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use integrity_core::common::Value;
use integrity_core::convert::FromJson;
use integrity_core::convert::ToJson;
use integrity_core::encoding::Base;
use integrity_core::encoding::BaseEncoding;
use integrity_crypto::memory::SensitiveMemoryPool;
use integrity_crypto::memory::SignatureMemory;
use integrity_crypto::tag::Algorithm;

use crate::credential::Credential;
use crate::error::Error;
use crate::error::Result;
use crate::proof::CanonicalizationKind;
use crate::proof::ProofOptions;

/// Produces a canonical string from a serialized document.
///
/// Canonicalization may involve substantial CPU work or remote context
/// resolution, so it is an asynchronous suspension point.
#[async_trait]
pub trait Canonicalizer: Send + Sync {
  /// The canonicalization algorithm this delegate implements.
  fn kind(&self) -> CanonicalizationKind;

  /// Canonicalizes `serialized`.
  ///
  /// `context_resolver` is consulted for remote JSON-LD contexts during
  /// RDFC-1.0; JCS implementations ignore it.
  async fn canonicalize(
    &self,
    serialized: &str,
    context_resolver: Option<&dyn ContextResolver>,
    cancel: &CancellationToken,
  ) -> Result<String>;
}

/// Resolves a JSON-LD context IRI to its document.
#[async_trait]
pub trait ContextResolver: Send + Sync {
  /// Returns the context document for `iri`.
  async fn resolve(&self, iri: &str) -> Result<Value>;
}

/// Encodes signature bytes into a proof value string and back.
pub trait ProofValueCodec: Send + Sync {
  /// Encodes `signature` for embedding in a proof.
  fn encode(&self, signature: &SignatureMemory) -> String;

  /// Decodes `proof_value` into pooled memory tagged with `algorithm`.
  fn decode(&self, proof_value: &str, algorithm: Algorithm, pool: &SensitiveMemoryPool) -> Result<SignatureMemory>;
}

/// Serializes a credential to its wire string.
pub trait CredentialSerializer: Send + Sync {
  /// Returns the wire form of `credential`.
  fn serialize(&self, credential: &Credential) -> Result<String>;
}

/// Deserializes a credential from its wire string.
pub trait CredentialDeserializer: Send + Sync {
  /// Parses `data` into a credential.
  fn deserialize(&self, data: &str) -> Result<Credential>;
}

/// Serializes proof options to the same wire format as the credential.
pub trait ProofOptionsSerializer: Send + Sync {
  /// Returns the wire form of `options`.
  fn serialize(&self, options: &ProofOptions) -> Result<String>;
}

// =============================================================================
// Shipped implementations
// =============================================================================

/// JSON Canonicalization Scheme (RFC 8785) over a JSON wire string.
#[derive(Clone, Copy, Debug, Default)]
pub struct JcsCanonicalizer;

#[async_trait]
impl Canonicalizer for JcsCanonicalizer {
  fn kind(&self) -> CanonicalizationKind {
    CanonicalizationKind::Jcs
  }

  async fn canonicalize(
    &self,
    serialized: &str,
    _context_resolver: Option<&dyn ContextResolver>,
    _cancel: &CancellationToken,
  ) -> Result<String> {
    let value: Value =
      serde_json::from_str(serialized).map_err(|error| Error::CanonicalizationFailed(error.into()))?;
    serde_jcs::to_string(&value).map_err(|error| Error::CanonicalizationFailed(error.into()))
  }
}

/// Multibase encoding of raw signature bytes, base58-btc by default.
#[derive(Clone, Copy, Debug)]
pub struct MultibaseProofValueCodec {
  base: Base,
}

impl MultibaseProofValueCodec {
  /// The base58-btc codec producing `z`-prefixed proof values.
  pub const fn base58_btc() -> Self {
    Self { base: Base::Base58Btc }
  }

  /// A codec for the given multibase alphabet.
  pub const fn with_base(base: Base) -> Self {
    Self { base }
  }
}

impl Default for MultibaseProofValueCodec {
  fn default() -> Self {
    Self::base58_btc()
  }
}

impl ProofValueCodec for MultibaseProofValueCodec {
  fn encode(&self, signature: &SignatureMemory) -> String {
    BaseEncoding::encode_multibase(signature.as_slice(), Some(self.base))
  }

  fn decode(&self, proof_value: &str, algorithm: Algorithm, pool: &SensitiveMemoryPool) -> Result<SignatureMemory> {
    let (_, bytes): (Base, Vec<u8>) = BaseEncoding::decode_multibase(proof_value)?;
    SignatureMemory::rent(pool, &bytes, algorithm).map_err(Error::Dispatch)
  }
}

/// JSON wire format for credentials and proof options.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCredentialCodec;

impl CredentialSerializer for JsonCredentialCodec {
  fn serialize(&self, credential: &Credential) -> Result<String> {
    credential.to_json().map_err(Error::Core)
  }
}

impl CredentialDeserializer for JsonCredentialCodec {
  fn deserialize(&self, data: &str) -> Result<Credential> {
    Credential::from_json(data).map_err(Error::Core)
  }
}

/// JSON wire format for proof options.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonProofOptionsSerializer;

impl ProofOptionsSerializer for JsonProofOptionsSerializer {
  fn serialize(&self, options: &ProofOptions) -> Result<String> {
    options.to_json().map_err(Error::Core)
  }
}
