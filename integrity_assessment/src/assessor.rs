// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use async_trait::async_trait;
use uuid::Uuid;

use integrity_core::common::Timestamp;

use crate::claim::Claim;
use crate::issuer::ClaimIssueResult;
use crate::issuer::CompletionStatus;

/// Distributed-tracing identifiers carried by an assessment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraceContext {
  /// The trace identifier.
  pub trace_id: String,
  /// The span identifier.
  pub span_id: String,
  /// W3C-baggage style key/value pairs.
  pub baggage: BTreeMap<String, String>,
}

impl TraceContext {
  /// Captures a fresh context with generated identifiers.
  pub fn capture() -> Self {
    Self {
      trace_id: Uuid::new_v4().simple().to_string(),
      span_id: Uuid::new_v4().simple().to_string()[..16].to_owned(),
      baggage: BTreeMap::new(),
    }
  }

  /// Adds a baggage entry.
  pub fn with_baggage(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.baggage.insert(key.into(), value.into());
    self
  }
}

/// The outcome of one assessor over one claim issue result.
#[derive(Clone, Debug)]
pub struct AssessmentResult {
  /// Whether the assessor considers the claims acceptable.
  pub success: bool,
  /// A correlation identifier for log and audit trails.
  pub correlation_id: Uuid,
  /// When the assessment was produced.
  pub timestamp: Timestamp,
  /// Tracing identifiers and baggage.
  pub trace: TraceContext,
  /// The claims the assessment was computed over.
  pub claims: Vec<Claim>,
  /// The completion status carried over from evaluation.
  pub status: CompletionStatus,
}

/// Consumes a [`ClaimIssueResult`] and yields an [`AssessmentResult`].
#[async_trait]
pub trait Assessor: Send + Sync {
  /// Assesses the carried claims.
  async fn assess(&self, result: &ClaimIssueResult) -> AssessmentResult;
}

/// An assessor that succeeds iff the issue run completed and every claim
/// holds.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllClaimsSucceedAssessor;

#[async_trait]
impl Assessor for AllClaimsSucceedAssessor {
  async fn assess(&self, result: &ClaimIssueResult) -> AssessmentResult {
    AssessmentResult {
      success: result.all_succeeded(),
      correlation_id: Uuid::new_v4(),
      timestamp: Timestamp::now_utc(),
      trace: TraceContext::capture(),
      claims: result.claims.clone(),
      status: result.status,
    }
  }
}
