// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! End-to-end wallet flow: issue an SD-JWT, select a minimal presentation,
//! bind it to the holder's key, and validate everything on the verifier
//! side.

use serde_json::json;
use tokio_util::sync::CancellationToken;

use integrity_core::common::Timestamp;
use integrity_crypto::backends::Ed25519Backend;
use integrity_crypto::hash::HashAlgorithm;
use integrity_crypto::memory::PrivateKeyMemory;
use integrity_crypto::memory::PublicKeyMemory;
use integrity_crypto::memory::SensitiveMemoryPool;
use integrity_crypto::registry::CryptoFunctionRegistry;
use integrity_crypto::tag::Algorithm;

use integrity_credential::sd::sd_jwt::SdJwtBuilder;
use integrity_credential::sd::sd_jwt::SdJwtToken;
use integrity_credential::sd::validate_key_binding;
use integrity_credential::sd::verify_key_binding_signature;
use integrity_credential::sd::CredentialPath;
use integrity_credential::sd::CsprngSaltGenerator;
use integrity_credential::sd::KeyBindingJwtBuilder;
use integrity_credential::sd::KeyBindingValidation;
use integrity_credential::sd::KeyBindingValidationOptions;

static SALTS: CsprngSaltGenerator = CsprngSaltGenerator;

const VERIFIER: &str = "https://verifier.example";
const NONCE: &str = "b3d19c2e";

#[tokio::test]
async fn issue_select_bind_and_validate() {
  let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
  let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
  let cancel: CancellationToken = CancellationToken::new();

  let issuer_key: PrivateKeyMemory = PrivateKeyMemory::rent(&pool, &[11u8; 32], Algorithm::ED25519).unwrap();
  let issuer_public: PublicKeyMemory = Ed25519Backend::derive_public(&issuer_key, &pool).unwrap();
  let holder_key: PrivateKeyMemory = PrivateKeyMemory::rent(&pool, &[22u8; 32], Algorithm::ED25519).unwrap();
  let holder_public: PublicKeyMemory = Ed25519Backend::derive_public(&holder_key, &pool).unwrap();

  // Issuance: conceal three claims, require key binding.
  let issued: SdJwtToken = SdJwtBuilder::new(
    json!({
      "iss": "https://issuer.example",
      "given_name": "John",
      "family_name": "Doe",
      "address": {"street": "Main", "city": "Metropolis"},
      "nationalities": ["DE", "FR"]
    }),
    HashAlgorithm::Sha256,
    &SALTS,
  )
  .unwrap()
  .make_concealable(&CredentialPath::parse("/given_name").unwrap())
  .unwrap()
  .make_concealable(&CredentialPath::parse("/address/city").unwrap())
  .unwrap()
  .make_concealable(&CredentialPath::parse("/nationalities/1").unwrap())
  .unwrap()
  .require_key_binding(json!({"jwk": {"kty": "OKP", "crv": "Ed25519"}}))
  .finish(&issuer_key, Algorithm::ED25519, &registry, &pool, &cancel)
  .await
  .unwrap();
  assert_eq!(issued.disclosures().len(), 3);

  // The wallet receives the wire form.
  let received: SdJwtToken = SdJwtToken::parse(&issued.presentation()).unwrap();
  assert_eq!(received, issued);

  // Selection: the verifier asked for the city only.
  let presentation: SdJwtToken = received.select(&[CredentialPath::parse("/address/city").unwrap()]).unwrap();
  assert_eq!(presentation.disclosures().len(), 1);
  let disclosed = presentation.parsed_disclosures().unwrap();
  assert_eq!(disclosed[0].claim_name(), Some("city"));

  // Key binding over the selected presentation.
  let issued_at: Timestamp = Timestamp::parse("2025-06-01T12:00:00Z").unwrap();
  let kb_jwt: String = KeyBindingJwtBuilder::new(VERIFIER, NONCE, issued_at)
    .sign(&presentation, HashAlgorithm::Sha256, &holder_key, Algorithm::ED25519, &registry, &pool, &cancel)
    .await
    .unwrap();
  let presentation: SdJwtToken = presentation.with_key_binding(kb_jwt).unwrap();

  // Verifier side, from the wire form.
  let verified: SdJwtToken = SdJwtToken::parse(&presentation.presentation()).unwrap();
  assert!(verified
    .verify_signature(&issuer_public, Algorithm::ED25519, &registry, &pool, &cancel)
    .await
    .unwrap());

  let now: Timestamp = issued_at.checked_add_seconds(30).unwrap();
  let options: KeyBindingValidationOptions<'_> = KeyBindingValidationOptions {
    expected_audience: Some(VERIFIER),
    expected_nonce: Some(NONCE),
    now,
    allowed_clock_skew_seconds: 60,
  };
  assert_eq!(
    validate_key_binding(&verified, HashAlgorithm::Sha256, &options).unwrap(),
    KeyBindingValidation::Valid
  );
  assert!(verify_key_binding_signature(
    &verified,
    &holder_public,
    Algorithm::ED25519,
    &registry,
    &pool,
    &cancel
  )
  .await
  .unwrap());

  // Claims the holder kept concealed never reach the verifier.
  let payload = verified.claims().unwrap();
  assert!(payload.get("given_name").is_none());
  assert_eq!(payload["family_name"], "Doe");
  assert!(payload["cnf"].is_object());
}

#[tokio::test]
async fn a_modified_presentation_fails_key_binding() {
  let registry: CryptoFunctionRegistry = CryptoFunctionRegistry::with_software_backends();
  let pool: SensitiveMemoryPool = SensitiveMemoryPool::new();
  let cancel: CancellationToken = CancellationToken::new();
  let issuer_key: PrivateKeyMemory = PrivateKeyMemory::rent(&pool, &[11u8; 32], Algorithm::ED25519).unwrap();
  let holder_key: PrivateKeyMemory = PrivateKeyMemory::rent(&pool, &[22u8; 32], Algorithm::ED25519).unwrap();

  let issued: SdJwtToken = SdJwtBuilder::new(
    json!({"iss": "https://issuer.example", "given_name": "John", "family_name": "Doe"}),
    HashAlgorithm::Sha256,
    &SALTS,
  )
  .unwrap()
  .make_concealable(&CredentialPath::parse("/given_name").unwrap())
  .unwrap()
  .make_concealable(&CredentialPath::parse("/family_name").unwrap())
  .unwrap()
  .finish(&issuer_key, Algorithm::ED25519, &registry, &pool, &cancel)
  .await
  .unwrap();

  // Bind only the first disclosure, then smuggle the second one in.
  let narrow: SdJwtToken = issued.retain(&issued.disclosures()[..1].to_vec()).unwrap();
  let issued_at: Timestamp = Timestamp::parse("2025-06-01T12:00:00Z").unwrap();
  let kb_jwt: String = KeyBindingJwtBuilder::new(VERIFIER, NONCE, issued_at)
    .sign(&narrow, HashAlgorithm::Sha256, &holder_key, Algorithm::ED25519, &registry, &pool, &cancel)
    .await
    .unwrap();

  let widened: SdJwtToken = issued.retain(issued.disclosures()).unwrap().with_key_binding(kb_jwt).unwrap();
  let options: KeyBindingValidationOptions<'_> = KeyBindingValidationOptions {
    expected_audience: Some(VERIFIER),
    expected_nonce: Some(NONCE),
    now: issued_at,
    allowed_clock_skew_seconds: 60,
  };
  assert_eq!(
    validate_key_binding(&widened, HashAlgorithm::Sha256, &options).unwrap(),
    KeyBindingValidation::SdHashMismatch
  );
}
