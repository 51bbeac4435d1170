// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

use integrity_core::common::Timestamp;

use crate::assessor::AssessmentResult;
use crate::assessor::Assessor;
use crate::issuer::ClaimIssueResult;
use crate::issuer::CompletionStatus;

/// How a composite combines its children's verdicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum AggregationStrategy {
  /// Every child must succeed.
  AllMustSucceed,
  /// At least one child must succeed.
  AnyMustSucceed,
  /// More than half of the children must succeed.
  MajorityMustSucceed,
  /// At least `n` children must succeed.
  QuorumMustSucceed(usize),
}

impl AggregationStrategy {
  fn evaluate(&self, successes: usize, total: usize) -> bool {
    match self {
      Self::AllMustSucceed => successes == total,
      Self::AnyMustSucceed => successes >= 1,
      Self::MajorityMustSucceed => successes * 2 > total,
      Self::QuorumMustSucceed(quorum) => successes >= *quorum,
    }
  }
}

/// One child's contribution to a composite assessment.
#[derive(Debug)]
pub struct ChildAssessment {
  /// The child's position in the composite's input order.
  pub index: usize,
  /// How the child terminated.
  pub status: CompletionStatus,
  /// The child's result, absent when it timed out or panicked.
  pub result: Option<AssessmentResult>,
  /// A description of the fault, when `status` is `Faulted`.
  pub fault: Option<String>,
}

impl ChildAssessment {
  fn succeeded(&self) -> bool {
    self.status == CompletionStatus::Complete && self.result.as_ref().is_some_and(|result| result.success)
  }
}

/// The aggregated outcome of a composite assessment.
#[derive(Debug)]
pub struct CompositeAssessment {
  /// The aggregated verdict under the configured strategy.
  pub success: bool,
  /// A correlation identifier for the composite run.
  pub correlation_id: Uuid,
  /// When aggregation finished.
  pub timestamp: Timestamp,
  /// Child outcomes in input order, regardless of completion order.
  pub children: Vec<ChildAssessment>,
}

impl CompositeAssessment {
  /// Counts children that ran to termination.
  pub fn completed_count(&self) -> usize {
    self.count(CompletionStatus::Complete)
  }

  /// Counts children that panicked or faulted.
  pub fn faulted_count(&self) -> usize {
    self.count(CompletionStatus::Faulted)
  }

  /// Counts children that exceeded the per-child timeout.
  pub fn timed_out_count(&self) -> usize {
    self.count(CompletionStatus::TimedOut)
  }

  /// Counts children that observed cancellation.
  pub fn cancelled_count(&self) -> usize {
    self.count(CompletionStatus::Cancelled)
  }

  fn count(&self, status: CompletionStatus) -> usize {
    self.children.iter().filter(|child| child.status == status).count()
  }
}

enum ChildOutcome {
  Done(AssessmentResult),
  TimedOut,
}

/// Runs many assessors concurrently over one claim issue result.
///
/// A child that faults, times out, or observes cancellation never prevents
/// the other children from reaching their own terminal state; its outcome
/// is carried in the aggregated result. Outputs are aggregated in input
/// order regardless of completion order.
pub struct CompositeAssessor {
  assessors: Vec<Arc<dyn Assessor>>,
  strategy: AggregationStrategy,
  child_timeout: Option<Duration>,
}

impl CompositeAssessor {
  /// Creates a composite with the given aggregation strategy.
  pub fn new(strategy: AggregationStrategy) -> Self {
    Self {
      assessors: Vec::new(),
      strategy,
      child_timeout: None,
    }
  }

  /// Appends a child assessor.
  pub fn assessor(mut self, assessor: Arc<dyn Assessor>) -> Self {
    self.assessors.push(assessor);
    self
  }

  /// Applies a timeout to each child individually.
  pub fn with_child_timeout(mut self, timeout: Duration) -> Self {
    self.child_timeout = Some(timeout);
    self
  }

  /// Runs every child concurrently and aggregates their verdicts.
  pub async fn assess(&self, input: Arc<ClaimIssueResult>) -> CompositeAssessment {
    let handles: Vec<JoinHandle<ChildOutcome>> = self
      .assessors
      .iter()
      .map(|assessor| {
        let assessor: Arc<dyn Assessor> = Arc::clone(assessor);
        let input: Arc<ClaimIssueResult> = Arc::clone(&input);
        let child_timeout: Option<Duration> = self.child_timeout;
        tokio::spawn(async move {
          match child_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, assessor.assess(&input)).await {
              Ok(result) => ChildOutcome::Done(result),
              Err(_) => ChildOutcome::TimedOut,
            },
            None => ChildOutcome::Done(assessor.assess(&input).await),
          }
        })
      })
      .collect();

    let mut children: Vec<ChildAssessment> = Vec::with_capacity(handles.len());
    for (index, handle) in handles.into_iter().enumerate() {
      let child: ChildAssessment = match handle.await {
        Ok(ChildOutcome::Done(result)) => ChildAssessment {
          index,
          status: if result.status == CompletionStatus::Cancelled {
            CompletionStatus::Cancelled
          } else {
            CompletionStatus::Complete
          },
          result: Some(result),
          fault: None,
        },
        Ok(ChildOutcome::TimedOut) => ChildAssessment {
          index,
          status: CompletionStatus::TimedOut,
          result: None,
          fault: None,
        },
        Err(join_error) => {
          tracing::warn!(%join_error, index, "child assessor faulted");
          ChildAssessment {
            index,
            status: CompletionStatus::Faulted,
            result: None,
            fault: Some(join_error.to_string()),
          }
        }
      };
      children.push(child);
    }

    let successes: usize = children.iter().filter(|child| child.succeeded()).count();
    let success: bool = self.strategy.evaluate(successes, children.len());

    CompositeAssessment {
      success,
      correlation_id: Uuid::new_v4(),
      timestamp: Timestamp::now_utc(),
      children,
    }
  }
}

#[cfg(test)]
mod tests {
  use async_trait::async_trait;

  use crate::assessor::TraceContext;
  use crate::claim::Claim;

  use super::*;

  struct FixedAssessor(bool);

  #[async_trait]
  impl Assessor for FixedAssessor {
    async fn assess(&self, result: &ClaimIssueResult) -> AssessmentResult {
      AssessmentResult {
        success: self.0,
        correlation_id: Uuid::new_v4(),
        timestamp: Timestamp::now_utc(),
        trace: TraceContext::capture(),
        claims: result.claims.clone(),
        status: CompletionStatus::Complete,
      }
    }
  }

  struct BlockingAssessor;

  #[async_trait]
  impl Assessor for BlockingAssessor {
    async fn assess(&self, _result: &ClaimIssueResult) -> AssessmentResult {
      loop {
        tokio::time::sleep(Duration::from_secs(3600)).await;
      }
    }
  }

  struct PanickingAssessor;

  #[async_trait]
  impl Assessor for PanickingAssessor {
    async fn assess(&self, _result: &ClaimIssueResult) -> AssessmentResult {
      panic!("assessor exploded");
    }
  }

  fn issue_result() -> Arc<ClaimIssueResult> {
    Arc::new(ClaimIssueResult {
      claims: vec![Claim::success("present")],
      status: CompletionStatus::Complete,
      correlation_id: Uuid::new_v4(),
      started_at: Timestamp::now_utc(),
      finished_at: Timestamp::now_utc(),
      fault: None,
    })
  }

  #[tokio::test]
  async fn any_must_succeed_tolerates_faulted_and_timed_out_siblings() {
    let composite: CompositeAssessor = CompositeAssessor::new(AggregationStrategy::AnyMustSucceed)
      .assessor(Arc::new(FixedAssessor(true)))
      .assessor(Arc::new(BlockingAssessor))
      .assessor(Arc::new(PanickingAssessor))
      .with_child_timeout(Duration::from_millis(1));

    let assessment: CompositeAssessment = composite.assess(issue_result()).await;
    assert!(assessment.success);
    assert_eq!(assessment.completed_count(), 1);
    assert_eq!(assessment.faulted_count(), 1);
    assert_eq!(assessment.timed_out_count(), 1);
    assert_eq!(assessment.cancelled_count(), 0);
    // Input order survives arbitrary completion order.
    assert_eq!(
      assessment.children.iter().map(|child| child.index).collect::<Vec<usize>>(),
      vec![0, 1, 2]
    );
  }

  #[tokio::test]
  async fn all_must_succeed_fails_on_a_single_failure() {
    let composite: CompositeAssessor = CompositeAssessor::new(AggregationStrategy::AllMustSucceed)
      .assessor(Arc::new(FixedAssessor(true)))
      .assessor(Arc::new(FixedAssessor(false)));

    assert!(!composite.assess(issue_result()).await.success);
  }

  #[tokio::test]
  async fn majority_needs_strictly_more_than_half() {
    let half: CompositeAssessor = CompositeAssessor::new(AggregationStrategy::MajorityMustSucceed)
      .assessor(Arc::new(FixedAssessor(true)))
      .assessor(Arc::new(FixedAssessor(false)));
    assert!(!half.assess(issue_result()).await.success);

    let majority: CompositeAssessor = CompositeAssessor::new(AggregationStrategy::MajorityMustSucceed)
      .assessor(Arc::new(FixedAssessor(true)))
      .assessor(Arc::new(FixedAssessor(true)))
      .assessor(Arc::new(FixedAssessor(false)));
    assert!(majority.assess(issue_result()).await.success);
  }

  #[tokio::test]
  async fn quorum_counts_successes_exactly() {
    let composite: CompositeAssessor = CompositeAssessor::new(AggregationStrategy::QuorumMustSucceed(2))
      .assessor(Arc::new(FixedAssessor(true)))
      .assessor(Arc::new(FixedAssessor(true)))
      .assessor(Arc::new(FixedAssessor(false)));
    assert!(composite.assess(issue_result()).await.success);

    let short: CompositeAssessor = CompositeAssessor::new(AggregationStrategy::QuorumMustSucceed(3))
      .assessor(Arc::new(FixedAssessor(true)))
      .assessor(Arc::new(FixedAssessor(true)))
      .assessor(Arc::new(FixedAssessor(false)));
    assert!(!short.assess(issue_result()).await.success);
  }
}
