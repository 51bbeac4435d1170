// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![doc = include_str!("./../README.md")]
#![warn(
  rust_2018_idioms,
  unreachable_pub,
  // missing_docs,
  rustdoc::missing_crate_level_docs,
  rustdoc::broken_intra_doc_links,
  rustdoc::private_intra_doc_links,
  rustdoc::private_doc_tests,
  clippy::missing_safety_doc,
)]

mod assessor;
mod claim;
mod composite;
mod issuer;

pub use self::assessor::AllClaimsSucceedAssessor;
pub use self::assessor::AssessmentResult;
pub use self::assessor::Assessor;
pub use self::assessor::TraceContext;
pub use self::claim::Claim;
pub use self::claim::ClaimOutcome;
pub use self::composite::AggregationStrategy;
pub use self::composite::ChildAssessment;
pub use self::composite::CompositeAssessment;
pub use self::composite::CompositeAssessor;
pub use self::issuer::ClaimIssueResult;
pub use self::issuer::ClaimIssuer;
pub use self::issuer::ClaimRule;
pub use self::issuer::CompletionStatus;
pub use self::issuer::FnClaimRule;
pub use self::issuer::RuleError;
