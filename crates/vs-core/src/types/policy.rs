//! Per-field merge policies
//!
//! Every mutable company attribute is written by one or more import passes.
//! Which write survives is decided here, field by field, rather than in the
//! SQL of each pass.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergePolicy {
  /// A value already present is never replaced
  FirstWriteWins,
  /// A value supplied by the current write replaces the stored one
  LastWriteWins,
}

impl MergePolicy {
  /// Merge an incoming value into an existing one. `None` means "no value":
  /// absent from storage, or not supplied by the writer.
  pub fn merge<T>(self, existing: Option<T>, incoming: Option<T>) -> Option<T> {
    match self {
      MergePolicy::FirstWriteWins => existing.or(incoming),
      MergePolicy::LastWriteWins => incoming.or(existing),
    }
  }
}

/// `is_disqualified` is sticky: once true it stays true.
pub const DISQUALIFIED_POLICY: MergePolicy = MergePolicy::FirstWriteWins;
pub const DISQUALIFIED_REASON_POLICY: MergePolicy = MergePolicy::FirstWriteWins;
pub const DEFERRAL_POLICY: MergePolicy = MergePolicy::FirstWriteWins;
pub const DEFERRAL_REASON_POLICY: MergePolicy = MergePolicy::FirstWriteWins;
/// The quarterly-loss flag is advisory and always reflects the latest source.
pub const QUARTER_LOSS_POLICY: MergePolicy = MergePolicy::LastWriteWins;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_first_write_wins_keeps_existing() {
    assert_eq!(MergePolicy::FirstWriteWins.merge(Some(1), Some(2)), Some(1));
    assert_eq!(MergePolicy::FirstWriteWins.merge(None, Some(2)), Some(2));
    assert_eq!(MergePolicy::FirstWriteWins.merge(Some(1), None), Some(1));
  }

  #[test]
  fn test_last_write_wins_replaces_existing() {
    assert_eq!(MergePolicy::LastWriteWins.merge(Some(1), Some(2)), Some(2));
    assert_eq!(MergePolicy::LastWriteWins.merge(Some(1), None), Some(1));
    assert_eq!(MergePolicy::LastWriteWins.merge::<i32>(None, None), None);
  }

  #[test]
  fn test_field_policies() {
    assert_eq!(DISQUALIFIED_POLICY, MergePolicy::FirstWriteWins);
    assert_eq!(DEFERRAL_POLICY, MergePolicy::FirstWriteWins);
    assert_eq!(QUARTER_LOSS_POLICY, MergePolicy::LastWriteWins);
  }
}
