// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

/// The outcome a claim rule assigned to one claim.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ClaimOutcome {
  /// The claim holds.
  Success,
  /// The claim does not hold.
  Failure,
  /// The rule could not decide.
  Unknown,
}

/// A single evaluated claim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Claim {
  /// The claim identifier.
  pub id: String,
  /// The evaluated outcome.
  pub outcome: ClaimOutcome,
}

impl Claim {
  /// Creates a claim with the given outcome.
  pub fn new(id: impl Into<String>, outcome: ClaimOutcome) -> Self {
    Self {
      id: id.into(),
      outcome,
    }
  }

  /// Creates a successful claim.
  pub fn success(id: impl Into<String>) -> Self {
    Self::new(id, ClaimOutcome::Success)
  }

  /// Creates a failed claim.
  pub fn failure(id: impl Into<String>) -> Self {
    Self::new(id, ClaimOutcome::Failure)
  }

  /// Creates an undecided claim.
  pub fn unknown(id: impl Into<String>) -> Self {
    Self::new(id, ClaimOutcome::Unknown)
  }

  /// Returns `true` if the claim holds.
  pub fn is_success(&self) -> bool {
    self.outcome == ClaimOutcome::Success
  }
}
