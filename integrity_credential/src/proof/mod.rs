// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Data Integrity proofs: the proof object, cryptosuite metadata, and the
//! canonicalize-hash-sign/verify pipeline.

mod cryptosuite;
mod delegates;
mod document;
mod engine;
mod multikey;
mod options;
#[allow(clippy::module_inception)]
mod proof;
mod purpose;

pub use self::cryptosuite::CanonicalizationKind;
pub use self::cryptosuite::CryptosuiteCatalog;
pub use self::cryptosuite::CryptosuiteInfo;
pub use self::delegates::Canonicalizer;
pub use self::delegates::ContextResolver;
pub use self::delegates::CredentialDeserializer;
pub use self::delegates::CredentialSerializer;
pub use self::delegates::JcsCanonicalizer;
pub use self::delegates::JsonCredentialCodec;
pub use self::delegates::JsonProofOptionsSerializer;
pub use self::delegates::MultibaseProofValueCodec;
pub use self::delegates::ProofOptionsSerializer;
pub use self::delegates::ProofValueCodec;
pub use self::document::IssuerDocument;
pub use self::document::VerificationMethod;
pub use self::engine::DataIntegrityEngine;
pub use self::engine::ProofDelegates;
pub use self::engine::ProofSigningOptions;
pub use self::engine::ProofVerificationStatus;
pub use self::multikey::decode_private_multikey;
pub use self::multikey::decode_public_multikey;
pub use self::multikey::encode_public_multikey;
pub use self::options::ProofOptions;
pub use self::proof::DataIntegrityProof;
pub use self::purpose::ProofPurpose;
