//! Mutable company state and the updates import passes write into it

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::policy::{
  DEFERRAL_POLICY, DEFERRAL_REASON_POLICY, DISQUALIFIED_POLICY, DISQUALIFIED_REASON_POLICY,
  QUARTER_LOSS_POLICY,
};

/// Exclusion-relevant attributes of a company
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyFlags {
  pub is_disqualified: bool,
  pub disqualified_reason: Option<String>,
  /// Deferral horizon; `None` means always considerable
  pub dont_consider_until: Option<NaiveDateTime>,
  pub dont_consider_reason: Option<String>,
  pub had_quarter_loss: bool,
}

/// The fields one source wants to write. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyUpdate {
  pub is_disqualified: Option<bool>,
  pub disqualified_reason: Option<String>,
  pub dont_consider_until: Option<NaiveDateTime>,
  pub dont_consider_reason: Option<String>,
  pub had_quarter_loss: Option<bool>,
}

impl CompanyUpdate {
  /// Touches nothing; used to guarantee the company record exists
  pub fn none() -> Self {
    Self::default()
  }

  pub fn deferred(until: NaiveDateTime, reason: &str) -> Self {
    Self {
      dont_consider_until: Some(until),
      dont_consider_reason: Some(reason.to_string()),
      ..Self::default()
    }
  }

  pub fn disqualified(reason: &str) -> Self {
    Self {
      is_disqualified: Some(true),
      disqualified_reason: Some(reason.to_string()),
      ..Self::default()
    }
  }

  pub fn quarter_loss(flag: bool) -> Self {
    Self { had_quarter_loss: Some(flag), ..Self::default() }
  }

  pub fn is_empty(&self) -> bool {
    *self == Self::default()
  }
}

impl CompanyFlags {
  /// Merge `update` into these flags using the per-field policies.
  /// Returns true if anything changed.
  pub fn apply(&mut self, update: &CompanyUpdate) -> bool {
    let merged = CompanyFlags {
      // false is the unset state of a sticky flag
      is_disqualified: DISQUALIFIED_POLICY
        .merge(self.is_disqualified.then_some(true), update.is_disqualified)
        .unwrap_or(false),
      disqualified_reason: DISQUALIFIED_REASON_POLICY
        .merge(self.disqualified_reason.clone(), update.disqualified_reason.clone()),
      dont_consider_until: DEFERRAL_POLICY
        .merge(self.dont_consider_until, update.dont_consider_until),
      dont_consider_reason: DEFERRAL_REASON_POLICY
        .merge(self.dont_consider_reason.clone(), update.dont_consider_reason.clone()),
      had_quarter_loss: QUARTER_LOSS_POLICY
        .merge(Some(self.had_quarter_loss), update.had_quarter_loss)
        .unwrap_or(false),
    };

    let changed = merged != *self;
    *self = merged;
    changed
  }

  /// Deferral horizon strictly after `at`
  pub fn is_deferred_at(&self, at: NaiveDateTime) -> bool {
    self.dont_consider_until.is_some_and(|until| until > at)
  }

  /// Disqualified or deferred; market and portfolio state are not company flags
  pub fn is_excluded_at(&self, at: NaiveDateTime) -> bool {
    self.is_disqualified || self.is_deferred_at(at)
  }
}
