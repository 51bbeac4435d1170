// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use tokio_util::sync::CancellationToken;

use integrity_core::common::Context;
use integrity_core::common::OneOrMany;
use integrity_core::common::Timestamp;
use integrity_crypto::memory::PrivateKeyMemory;
use integrity_crypto::memory::PublicKeyMemory;
use integrity_crypto::memory::SensitiveMemoryPool;
use integrity_crypto::memory::SignatureMemory;
use integrity_crypto::registry::CryptoFunctionRegistry;
use integrity_crypto::tag::Algorithm;

use crate::credential::Credential;
use crate::error::Error;
use crate::error::Result;
use crate::proof::decode_public_multikey;
use crate::proof::CanonicalizationKind;
use crate::proof::Canonicalizer;
use crate::proof::ContextResolver;
use crate::proof::CredentialSerializer;
use crate::proof::CryptosuiteCatalog;
use crate::proof::CryptosuiteInfo;
use crate::proof::DataIntegrityProof;
use crate::proof::IssuerDocument;
use crate::proof::JcsCanonicalizer;
use crate::proof::JsonCredentialCodec;
use crate::proof::JsonProofOptionsSerializer;
use crate::proof::MultibaseProofValueCodec;
use crate::proof::ProofOptions;
use crate::proof::ProofOptionsSerializer;
use crate::proof::ProofPurpose;
use crate::proof::ProofValueCodec;

/// The outcome of verifying an embedded proof.
///
/// Invalid signatures are an expected outcome and are returned, not raised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[non_exhaustive]
pub enum ProofVerificationStatus {
  /// The proof checks out.
  Success,
  /// The credential carries no proof entry.
  NoProof,
  /// The proof names a cryptosuite absent from the catalog.
  MissingCryptosuite,
  /// The proof carries no verification-method reference.
  MissingVerificationMethod,
  /// The referenced method is absent from the issuer document, carries no
  /// key material, or is incompatible with the cryptosuite.
  VerificationMethodNotFound,
  /// The signature does not match the signed bytes.
  SignatureInvalid,
}

/// Per-signature inputs of the sign pipeline.
#[derive(Debug)]
pub struct ProofSigningOptions<'a> {
  /// The cryptosuite to sign under.
  pub cryptosuite: &'a CryptosuiteInfo,
  /// The verification-method reference embedded in the proof.
  pub verification_method: String,
  /// The caller-supplied creation timestamp. The engine never reads the
  /// system clock.
  pub created: Option<Timestamp>,
  /// The proof purpose, typically [`ProofPurpose::AssertionMethod`].
  pub proof_purpose: ProofPurpose,
  /// An optional domain restriction.
  pub domain: Option<String>,
  /// An optional verifier challenge.
  pub challenge: Option<String>,
  /// An optional nonce.
  pub nonce: Option<String>,
}

/// The injected collaborators of the proof pipeline.
#[derive(Clone, Copy)]
pub struct ProofDelegates<'a> {
  /// Canonicalizes serialized documents (JCS or RDFC-1.0).
  pub canonicalizer: &'a dyn Canonicalizer,
  /// Resolves remote JSON-LD contexts; mandatory for RDFC suites.
  pub context_resolver: Option<&'a dyn ContextResolver>,
  /// Encodes and decodes the proof value.
  pub proof_value: &'a dyn ProofValueCodec,
  /// Serializes the credential to its wire string.
  pub credential_serializer: &'a dyn CredentialSerializer,
  /// Serializes proof options to the same wire format.
  pub proof_options_serializer: &'a dyn ProofOptionsSerializer,
}

static JCS: JcsCanonicalizer = JcsCanonicalizer;
static PROOF_VALUE_CODEC: MultibaseProofValueCodec = MultibaseProofValueCodec::base58_btc();
static JSON_CODEC: JsonCredentialCodec = JsonCredentialCodec;
static JSON_OPTIONS: JsonProofOptionsSerializer = JsonProofOptionsSerializer;

impl ProofDelegates<'static> {
  /// All-JSON delegates with JCS canonicalization and base58-btc proof
  /// values. Suitable for the `*-jcs-*` suites out of the box.
  pub fn json_jcs() -> Self {
    Self {
      canonicalizer: &JCS,
      context_resolver: None,
      proof_value: &PROOF_VALUE_CODEC,
      credential_serializer: &JSON_CODEC,
      proof_options_serializer: &JSON_OPTIONS,
    }
  }
}

/// The canonicalize-hash-sign/verify pipeline over credentials.
///
/// The engine is serialization-agnostic: every format-specific step runs
/// through [`ProofDelegates`]. It never reads the system clock and never
/// judges `validFrom`/`validUntil`.
pub struct DataIntegrityEngine<'a> {
  registry: &'a CryptoFunctionRegistry,
  catalog: &'a CryptosuiteCatalog,
  pool: &'a SensitiveMemoryPool,
}

impl<'a> DataIntegrityEngine<'a> {
  /// Creates an engine over the given registry, suite catalog, and pool.
  pub fn new(registry: &'a CryptoFunctionRegistry, catalog: &'a CryptosuiteCatalog, pool: &'a SensitiveMemoryPool) -> Self {
    Self { registry, catalog, pool }
  }

  /// Signs `credential`, returning a copy with exactly one proof appended.
  pub async fn sign(
    &self,
    credential: &Credential,
    private_key: &PrivateKeyMemory,
    options: ProofSigningOptions<'_>,
    delegates: &ProofDelegates<'_>,
    cancel: &CancellationToken,
  ) -> Result<Credential> {
    let suite: &CryptosuiteInfo = options.cryptosuite;
    ensure_canonicalizer_matches(suite, delegates)?;

    let proof_options: ProofOptions = ProofOptions {
      context: rdfc_context(suite, credential),
      proof_type: DataIntegrityProof::TYPE.to_owned(),
      cryptosuite: suite.name().to_owned(),
      created: options.created,
      verification_method: options.verification_method,
      proof_purpose: options.proof_purpose,
      domain: options.domain,
      challenge: options.challenge,
      nonce: options.nonce,
    };

    let signed_bytes: Vec<u8> = self.transform(credential, &proof_options, suite, delegates, cancel).await?;
    let signature: SignatureMemory = self.registry.sign(private_key, &signed_bytes, self.pool, cancel).await?;
    let proof_value: String = delegates.proof_value.encode(&signature);
    tracing::debug!(suite = suite.name(), "credential signed");

    Ok(credential.with_proof(proof_options.into_proof(proof_value)))
  }

  /// Verifies the first proof of `credential` against `issuer`.
  ///
  /// Returns a status rather than an error for every cryptographically
  /// expected outcome; errors are reserved for configuration and input
  /// failures.
  pub async fn verify(
    &self,
    credential: &Credential,
    issuer: &IssuerDocument,
    delegates: &ProofDelegates<'_>,
    cancel: &CancellationToken,
  ) -> Result<ProofVerificationStatus> {
    // TODO: iterate the full proof set and walk `previousProof` chains.
    let Some(proof) = credential.proof.first() else {
      return Ok(ProofVerificationStatus::NoProof);
    };
    let Some(suite) = self.catalog.get(&proof.cryptosuite) else {
      return Ok(ProofVerificationStatus::MissingCryptosuite);
    };
    ensure_canonicalizer_matches(suite, delegates)?;

    if proof.verification_method.is_empty() {
      return Ok(ProofVerificationStatus::MissingVerificationMethod);
    }
    let Some(method) = issuer.resolve_method(&proof.verification_method) else {
      return Ok(ProofVerificationStatus::VerificationMethodNotFound);
    };
    if !suite.is_compatible_method(&method.method_type) {
      return Ok(ProofVerificationStatus::VerificationMethodNotFound);
    }
    let Some(multikey) = method.public_key_multibase.as_deref() else {
      return Ok(ProofVerificationStatus::VerificationMethodNotFound);
    };
    let (algorithm, public_key): (Algorithm, PublicKeyMemory) = decode_public_multikey(multikey, self.pool)?;
    if algorithm != suite.signature_algorithm() {
      tracing::warn!(suite = suite.name(), %algorithm, "verification method key does not match the cryptosuite");
      return Ok(ProofVerificationStatus::SignatureInvalid);
    }

    // Rebuild the proof options structurally identical to their sign-time
    // form, including the conditional `@context` for RDFC suites.
    let proof_options: ProofOptions = ProofOptions {
      context: rdfc_context(suite, credential),
      proof_type: proof.proof_type.clone(),
      cryptosuite: proof.cryptosuite.clone(),
      created: proof.created,
      verification_method: proof.verification_method.clone(),
      proof_purpose: proof.proof_purpose,
      domain: proof.domain.clone(),
      challenge: proof.challenge.clone(),
      nonce: proof.nonce.clone(),
    };

    let signed_bytes: Vec<u8> = self.transform(credential, &proof_options, suite, delegates, cancel).await?;
    let signature: SignatureMemory =
      delegates.proof_value.decode(&proof.proof_value, suite.signature_algorithm(), self.pool)?;

    if self.registry.verify(&signed_bytes, &signature, &public_key, cancel).await? {
      Ok(ProofVerificationStatus::Success)
    } else {
      tracing::warn!(suite = suite.name(), "proof signature invalid");
      Ok(ProofVerificationStatus::SignatureInvalid)
    }
  }

  /// Canonicalizes and hashes the proofless credential and the proof
  /// options, returning `H(options) || H(credential)`.
  ///
  /// Both the sign and verify paths go through here, so the signed byte
  /// sequence is identical by construction.
  async fn transform(
    &self,
    credential: &Credential,
    proof_options: &ProofOptions,
    suite: &CryptosuiteInfo,
    delegates: &ProofDelegates<'_>,
    cancel: &CancellationToken,
  ) -> Result<Vec<u8>> {
    if suite.canonicalization() == CanonicalizationKind::Rdfc10 && delegates.context_resolver.is_none() {
      return Err(Error::MissingContextResolver);
    }
    let hash = suite.hash_algorithm()?;

    let serialized_credential: String = delegates.credential_serializer.serialize(&credential.without_proof())?;
    let serialized_options: String = delegates.proof_options_serializer.serialize(proof_options)?;

    let canonical_credential: String = delegates
      .canonicalizer
      .canonicalize(&serialized_credential, delegates.context_resolver, cancel)
      .await?;
    let canonical_options: String = delegates
      .canonicalizer
      .canonicalize(&serialized_options, delegates.context_resolver, cancel)
      .await?;

    let mut signed_bytes: Vec<u8> = hash.digest(canonical_options.as_bytes());
    signed_bytes.extend(hash.digest(canonical_credential.as_bytes()));
    tracing::trace!(len = signed_bytes.len(), "transformed credential into signable bytes");
    Ok(signed_bytes)
  }
}

fn rdfc_context(suite: &CryptosuiteInfo, credential: &Credential) -> Option<OneOrMany<Context>> {
  (suite.canonicalization() == CanonicalizationKind::Rdfc10).then(|| credential.context.clone())
}

fn ensure_canonicalizer_matches(suite: &CryptosuiteInfo, delegates: &ProofDelegates<'_>) -> Result<()> {
  if delegates.canonicalizer.kind() != suite.canonicalization() {
    return Err(Error::CanonicalizationFailed(
      format!(
        "canonicalizer implements {:?} but suite {} requires {:?}",
        delegates.canonicalizer.kind(),
        suite.name(),
        suite.canonicalization()
      )
      .into(),
    ));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use async_trait::async_trait;

  use integrity_core::common::Value;
  use integrity_core::convert::FromJson;
  use integrity_core::convert::ToJson;

  use crate::proof::decode_private_multikey;
  use crate::proof::VerificationMethod;

  use super::*;

  const SECRET_MULTIKEY: &str = "z3u2en7t5LR2WtQH5PfFqMqwVHBeXouLzo6haApm8XHqvjxq";
  const VERIFICATION_METHOD: &str =
    "did:key:z6MkrJVnaZkeFzdQyMZu1cgjg7k1pZZ6pvBQ7XJPt4swbTQ2#z6MkrJVnaZkeFzdQyMZu1cgjg7k1pZZ6pvBQ7XJPt4swbTQ2";

  const CREDENTIAL_JSON: &str = r#"{
    "@context": [
      "https://www.w3.org/ns/credentials/v2",
      "https://www.w3.org/ns/credentials/examples/v2"
    ],
    "id": "urn:uuid:58172aac-d8ba-11ed-83dd-0b3aef56cc33",
    "type": ["VerifiableCredential", "AlumniCredential"],
    "name": "Alumni Credential",
    "description": "A minimum viable example of an Alumni Credential.",
    "issuer": "https://vc.example/issuers/5678",
    "validFrom": "2023-01-01T00:00:00Z",
    "credentialSubject": {
      "id": "did:example:abcdefgh",
      "alumniOf": "The School of Examples"
    }
  }"#;

  fn issuer_document() -> IssuerDocument {
    IssuerDocument {
      id: "did:key:z6MkrJVnaZkeFzdQyMZu1cgjg7k1pZZ6pvBQ7XJPt4swbTQ2".to_owned(),
      verification_method: vec![VerificationMethod {
        id: VERIFICATION_METHOD.to_owned(),
        method_type: "Multikey".to_owned(),
        controller: "did:key:z6MkrJVnaZkeFzdQyMZu1cgjg7k1pZZ6pvBQ7XJPt4swbTQ2".to_owned(),
        public_key_multibase: Some("z6MkrJVnaZkeFzdQyMZu1cgjg7k1pZZ6pvBQ7XJPt4swbTQ2".to_owned()),
      }],
      assertion_method: vec![VERIFICATION_METHOD.to_owned()],
    }
  }

  fn signing_options(suite: &CryptosuiteInfo) -> ProofSigningOptions<'_> {
    ProofSigningOptions {
      cryptosuite: suite,
      verification_method: VERIFICATION_METHOD.to_owned(),
      created: Some(Timestamp::parse("2023-02-24T23:36:38Z").unwrap()),
      proof_purpose: ProofPurpose::AssertionMethod,
      domain: None,
      challenge: None,
      nonce: None,
    }
  }

  async fn signed_credential(
    engine: &DataIntegrityEngine<'_>,
    pool: &SensitiveMemoryPool,
    suite: &CryptosuiteInfo,
    delegates: &ProofDelegates<'_>,
  ) -> Credential {
    let credential: Credential = Credential::from_json(CREDENTIAL_JSON).unwrap();
    let (_, private_key) = decode_private_multikey(SECRET_MULTIKEY, pool).unwrap();
    engine
      .sign(
        &credential,
        &private_key,
        signing_options(suite),
        delegates,
        &CancellationToken::new(),
      )
      .await
      .unwrap()
  }

  #[tokio::test]
  async fn jcs_sign_appends_exactly_one_proof() {
    let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let catalog: CryptosuiteCatalog = CryptosuiteCatalog::default();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let engine: DataIntegrityEngine<'_> = DataIntegrityEngine::new(&registry, &catalog, &pool);
    let suite: CryptosuiteInfo = CryptosuiteInfo::eddsa_jcs_2022();

    let signed: Credential = signed_credential(&engine, &pool, &suite, &ProofDelegates::json_jcs()).await;
    assert_eq!(signed.proof.len(), 1);
    let proof: &DataIntegrityProof = signed.proof.first().unwrap();
    assert_eq!(proof.proof_type, "DataIntegrityProof");
    assert_eq!(proof.cryptosuite, "eddsa-jcs-2022");
    assert!(proof.proof_value.starts_with('z'));
  }

  #[tokio::test]
  async fn signing_is_deterministic_for_ed25519() {
    let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let catalog: CryptosuiteCatalog = CryptosuiteCatalog::default();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let engine: DataIntegrityEngine<'_> = DataIntegrityEngine::new(&registry, &catalog, &pool);
    let suite: CryptosuiteInfo = CryptosuiteInfo::eddsa_jcs_2022();
    let delegates: ProofDelegates<'static> = ProofDelegates::json_jcs();

    let first: Credential = signed_credential(&engine, &pool, &suite, &delegates).await;
    let second: Credential = signed_credential(&engine, &pool, &suite, &delegates).await;
    assert_eq!(
      first.proof.first().unwrap().proof_value,
      second.proof.first().unwrap().proof_value
    );
  }

  #[tokio::test]
  async fn verification_round_trip_succeeds() {
    let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let catalog: CryptosuiteCatalog = CryptosuiteCatalog::default();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let engine: DataIntegrityEngine<'_> = DataIntegrityEngine::new(&registry, &catalog, &pool);
    let suite: CryptosuiteInfo = CryptosuiteInfo::eddsa_jcs_2022();
    let delegates: ProofDelegates<'static> = ProofDelegates::json_jcs();

    let signed: Credential = signed_credential(&engine, &pool, &suite, &delegates).await;
    let status: ProofVerificationStatus = engine
      .verify(&signed, &issuer_document(), &delegates, &CancellationToken::new())
      .await
      .unwrap();
    assert_eq!(status, ProofVerificationStatus::Success);
  }

  #[tokio::test]
  async fn tampering_with_the_subject_invalidates_the_proof() {
    let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let catalog: CryptosuiteCatalog = CryptosuiteCatalog::default();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let engine: DataIntegrityEngine<'_> = DataIntegrityEngine::new(&registry, &catalog, &pool);
    let suite: CryptosuiteInfo = CryptosuiteInfo::eddsa_jcs_2022();
    let delegates: ProofDelegates<'static> = ProofDelegates::json_jcs();

    let signed: Credential = signed_credential(&engine, &pool, &suite, &delegates).await;
    let tampered: Credential =
      Credential::from_json(&signed.to_json().unwrap().replace("The School of Examples", "Tampered School")).unwrap();

    let status: ProofVerificationStatus = engine
      .verify(&tampered, &issuer_document(), &delegates, &CancellationToken::new())
      .await
      .unwrap();
    assert_eq!(status, ProofVerificationStatus::SignatureInvalid);
  }

  #[tokio::test]
  async fn unsigned_credentials_report_no_proof() {
    let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let catalog: CryptosuiteCatalog = CryptosuiteCatalog::default();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let engine: DataIntegrityEngine<'_> = DataIntegrityEngine::new(&registry, &catalog, &pool);

    let credential: Credential = Credential::from_json(CREDENTIAL_JSON).unwrap();
    let status: ProofVerificationStatus = engine
      .verify(&credential, &issuer_document(), &ProofDelegates::json_jcs(), &CancellationToken::new())
      .await
      .unwrap();
    assert_eq!(status, ProofVerificationStatus::NoProof);
  }

  #[tokio::test]
  async fn unknown_cryptosuites_are_reported() {
    let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let catalog: CryptosuiteCatalog = CryptosuiteCatalog::default();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let engine: DataIntegrityEngine<'_> = DataIntegrityEngine::new(&registry, &catalog, &pool);
    let suite: CryptosuiteInfo = CryptosuiteInfo::eddsa_jcs_2022();
    let delegates: ProofDelegates<'static> = ProofDelegates::json_jcs();

    let mut signed: Credential = signed_credential(&engine, &pool, &suite, &delegates).await;
    let mut proof: DataIntegrityProof = signed.proof.first().unwrap().clone();
    proof.cryptosuite = "eddsa-unknown-9999".to_owned();
    signed.proof = proof.into();

    let status: ProofVerificationStatus = engine
      .verify(&signed, &issuer_document(), &delegates, &CancellationToken::new())
      .await
      .unwrap();
    assert_eq!(status, ProofVerificationStatus::MissingCryptosuite);
  }

  #[tokio::test]
  async fn unresolvable_methods_are_reported() {
    let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let catalog: CryptosuiteCatalog = CryptosuiteCatalog::default();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let engine: DataIntegrityEngine<'_> = DataIntegrityEngine::new(&registry, &catalog, &pool);
    let suite: CryptosuiteInfo = CryptosuiteInfo::eddsa_jcs_2022();
    let delegates: ProofDelegates<'static> = ProofDelegates::json_jcs();

    let mut signed: Credential = signed_credential(&engine, &pool, &suite, &delegates).await;
    let mut proof: DataIntegrityProof = signed.proof.first().unwrap().clone();
    proof.verification_method = "did:example:elsewhere#missing".to_owned();
    signed.proof = proof.into();

    let status: ProofVerificationStatus = engine
      .verify(&signed, &issuer_document(), &delegates, &CancellationToken::new())
      .await
      .unwrap();
    assert_eq!(status, ProofVerificationStatus::VerificationMethodNotFound);
  }

  // A line-per-property canonicalizer standing in for RDFC-1.0: stable under
  // key reordering, sensitive to every value, and honest about its kind.
  struct FauxRdfCanonicalizer;

  #[async_trait]
  impl Canonicalizer for FauxRdfCanonicalizer {
    fn kind(&self) -> CanonicalizationKind {
      CanonicalizationKind::Rdfc10
    }

    async fn canonicalize(
      &self,
      serialized: &str,
      _context_resolver: Option<&dyn ContextResolver>,
      _cancel: &CancellationToken,
    ) -> Result<String> {
      let value: Value = serde_json::from_str(serialized).map_err(|error| Error::CanonicalizationFailed(error.into()))?;
      let object = value
        .as_object()
        .ok_or_else(|| Error::CanonicalizationFailed("expected an object".into()))?;
      let mut lines: Vec<String> = object
        .iter()
        .map(|(key, value)| format!("<{key}> {} .", serde_jcs::to_string(value).unwrap_or_default()))
        .collect();
      lines.sort();
      Ok(lines.join("\n"))
    }
  }

  struct NoopResolver;

  #[async_trait]
  impl ContextResolver for NoopResolver {
    async fn resolve(&self, _iri: &str) -> Result<Value> {
      Ok(Value::Null)
    }
  }

  #[tokio::test]
  async fn rdfc_suites_round_trip_with_context_in_proof_options() {
    let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let catalog: CryptosuiteCatalog = CryptosuiteCatalog::default();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let engine: DataIntegrityEngine<'_> = DataIntegrityEngine::new(&registry, &catalog, &pool);
    let suite: CryptosuiteInfo = CryptosuiteInfo::eddsa_rdfc_2022();

    let canonicalizer: FauxRdfCanonicalizer = FauxRdfCanonicalizer;
    let resolver: NoopResolver = NoopResolver;
    let mut delegates: ProofDelegates<'_> = ProofDelegates::json_jcs();
    delegates.canonicalizer = &canonicalizer;
    delegates.context_resolver = Some(&resolver);

    let signed: Credential = signed_credential(&engine, &pool, &suite, &delegates).await;
    assert_eq!(signed.proof.first().unwrap().cryptosuite, "eddsa-rdfc-2022");

    let status: ProofVerificationStatus = engine
      .verify(&signed, &issuer_document(), &delegates, &CancellationToken::new())
      .await
      .unwrap();
    assert_eq!(status, ProofVerificationStatus::Success);
  }

  #[tokio::test]
  async fn rdfc_suites_require_a_context_resolver() {
    let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let catalog: CryptosuiteCatalog = CryptosuiteCatalog::default();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let engine: DataIntegrityEngine<'_> = DataIntegrityEngine::new(&registry, &catalog, &pool);
    let suite: CryptosuiteInfo = CryptosuiteInfo::eddsa_rdfc_2022();

    let canonicalizer: FauxRdfCanonicalizer = FauxRdfCanonicalizer;
    let mut delegates: ProofDelegates<'_> = ProofDelegates::json_jcs();
    delegates.canonicalizer = &canonicalizer;

    let credential: Credential = Credential::from_json(CREDENTIAL_JSON).unwrap();
    let (_, private_key) = decode_private_multikey(SECRET_MULTIKEY, &pool).unwrap();
    let error: Error = engine
      .sign(
        &credential,
        &private_key,
        signing_options(&suite),
        &delegates,
        &CancellationToken::new(),
      )
      .await
      .unwrap_err();
    assert!(matches!(error, Error::MissingContextResolver));
  }

  #[tokio::test]
  async fn mismatched_canonicalizer_is_a_configuration_error() {
    let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
    let catalog: CryptosuiteCatalog = CryptosuiteCatalog::default();
    let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
    let engine: DataIntegrityEngine<'_> = DataIntegrityEngine::new(&registry, &catalog, &pool);
    let suite: CryptosuiteInfo = CryptosuiteInfo::eddsa_rdfc_2022();

    let credential: Credential = Credential::from_json(CREDENTIAL_JSON).unwrap();
    let (_, private_key) = decode_private_multikey(SECRET_MULTIKEY, &pool).unwrap();
    let error: Error = engine
      .sign(
        &credential,
        &private_key,
        signing_options(&suite),
        &ProofDelegates::json_jcs(),
        &CancellationToken::new(),
      )
      .await
      .unwrap_err();
    assert!(matches!(error, Error::CanonicalizationFailed(_)));
  }
}
