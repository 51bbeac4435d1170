// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use integrity_core::common::Timestamp;

use crate::claim::Claim;

/// The error type claim rules may raise. Raised errors become
/// [`CompletionStatus::Faulted`] in the carried result, never an `Err` to
/// the caller.
pub type RuleError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// How an evaluation terminated.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompletionStatus {
  /// Every rule (or child) ran to termination.
  Complete,
  /// Cancellation was observed between rules.
  Cancelled,
  /// A rule raised or a child panicked.
  Faulted,
  /// A child exceeded its timeout.
  TimedOut,
}

/// A pure evaluation from an input to a list of claims.
#[async_trait]
pub trait ClaimRule<I: Send + Sync>: Send + Sync {
  /// Evaluates `input` into zero or more claims.
  async fn issue(&self, input: &I) -> Result<Vec<Claim>, RuleError>;
}

/// Adapts a plain function into a [`ClaimRule`].
pub struct FnClaimRule<F>(pub F);

#[async_trait]
impl<I, F> ClaimRule<I> for FnClaimRule<F>
where
  I: Send + Sync,
  F: Fn(&I) -> Result<Vec<Claim>, RuleError> + Send + Sync,
{
  async fn issue(&self, input: &I) -> Result<Vec<Claim>, RuleError> {
    (self.0)(input)
  }
}

/// The carried output of a claim issuer run: the claims gathered so far and
/// how the run terminated.
#[derive(Debug)]
pub struct ClaimIssueResult {
  /// Claims gathered before termination.
  pub claims: Vec<Claim>,
  /// How the run terminated.
  pub status: CompletionStatus,
  /// A correlation identifier shared by all records of this run.
  pub correlation_id: Uuid,
  /// When the run started.
  pub started_at: Timestamp,
  /// When the run terminated.
  pub finished_at: Timestamp,
  /// A description of the fault, when `status` is `Faulted`.
  pub fault: Option<String>,
}

impl ClaimIssueResult {
  /// Returns `true` if the run completed and every claim holds.
  pub fn all_succeeded(&self) -> bool {
    self.status == CompletionStatus::Complete && self.claims.iter().all(Claim::is_success)
  }
}

/// Composes claim rules in declared order.
///
/// Cancellation is observed between rule invocations and propagates as
/// [`CompletionStatus::Cancelled`] in the carried result, not as an error.
/// A raising rule terminates the fold with [`CompletionStatus::Faulted`],
/// keeping the claims gathered so far.
pub struct ClaimIssuer<I> {
  rules: Vec<Box<dyn ClaimRule<I>>>,
}

impl<I: Send + Sync> ClaimIssuer<I> {
  /// Creates an issuer with no rules.
  pub fn new() -> Self {
    Self { rules: Vec::new() }
  }

  /// Appends a rule to the fold.
  pub fn rule(mut self, rule: impl ClaimRule<I> + 'static) -> Self {
    self.rules.push(Box::new(rule));
    self
  }

  /// Runs every rule in declared order.
  pub async fn issue(&self, input: &I, cancel: &CancellationToken) -> ClaimIssueResult {
    let started_at: Timestamp = Timestamp::now_utc();
    let correlation_id: Uuid = Uuid::new_v4();
    let mut claims: Vec<Claim> = Vec::new();

    for rule in &self.rules {
      if cancel.is_cancelled() {
        tracing::debug!(%correlation_id, gathered = claims.len(), "claim issue cancelled between rules");
        return ClaimIssueResult {
          claims,
          status: CompletionStatus::Cancelled,
          correlation_id,
          started_at,
          finished_at: Timestamp::now_utc(),
          fault: None,
        };
      }
      match rule.issue(input).await {
        Ok(mut issued) => claims.append(&mut issued),
        Err(error) => {
          tracing::warn!(%correlation_id, %error, "claim rule faulted");
          return ClaimIssueResult {
            claims,
            status: CompletionStatus::Faulted,
            correlation_id,
            started_at,
            finished_at: Timestamp::now_utc(),
            fault: Some(error.to_string()),
          };
        }
      }
    }

    ClaimIssueResult {
      claims,
      status: CompletionStatus::Complete,
      correlation_id,
      started_at,
      finished_at: Timestamp::now_utc(),
      fault: None,
    }
  }
}

impl<I: Send + Sync> Default for ClaimIssuer<I> {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn success_rule(id: &'static str) -> FnClaimRule<impl Fn(&u32) -> Result<Vec<Claim>, RuleError> + Send + Sync> {
    FnClaimRule(move |_: &u32| Ok(vec![Claim::success(id)]))
  }

  #[tokio::test]
  async fn rules_run_in_declared_order() {
    let issuer: ClaimIssuer<u32> = ClaimIssuer::new().rule(success_rule("first")).rule(success_rule("second"));
    let result: ClaimIssueResult = issuer.issue(&7, &CancellationToken::new()).await;

    assert_eq!(result.status, CompletionStatus::Complete);
    assert_eq!(
      result.claims.iter().map(|claim| claim.id.as_str()).collect::<Vec<&str>>(),
      vec!["first", "second"]
    );
    assert!(result.all_succeeded());
    assert!(result.started_at <= result.finished_at);
  }

  #[tokio::test]
  async fn a_raising_rule_faults_the_fold_and_keeps_prior_claims() {
    let issuer: ClaimIssuer<u32> = ClaimIssuer::new()
      .rule(success_rule("kept"))
      .rule(FnClaimRule(|_: &u32| Err("rule exploded".into())))
      .rule(success_rule("never-reached"));
    let result: ClaimIssueResult = issuer.issue(&7, &CancellationToken::new()).await;

    assert_eq!(result.status, CompletionStatus::Faulted);
    assert_eq!(result.claims.len(), 1);
    assert_eq!(result.fault.as_deref(), Some("rule exploded"));
  }

  #[tokio::test]
  async fn cancellation_between_rules_is_carried_not_raised() {
    let cancel: CancellationToken = CancellationToken::new();
    cancel.cancel();
    let issuer: ClaimIssuer<u32> = ClaimIssuer::new().rule(success_rule("unreached"));
    let result: ClaimIssueResult = issuer.issue(&7, &cancel).await;

    assert_eq!(result.status, CompletionStatus::Cancelled);
    assert!(result.claims.is_empty());
  }
}
