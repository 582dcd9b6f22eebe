// core/src/inventory/strategy.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::store::RowLock;

/// Concurrency discipline, selected per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockStrategy {
  /// No lock; the store's conditional decrement rejects a stale read.
  #[default]
  Optimistic,
  /// `FOR UPDATE` row locks held until the transaction ends.
  Pessimistic,
}

impl LockStrategy {
  pub fn as_str(&self) -> &'static str {
    match self {
      LockStrategy::Optimistic => "optimistic",
      LockStrategy::Pessimistic => "pessimistic",
    }
  }

  pub fn row_lock(&self) -> RowLock {
    match self {
      LockStrategy::Optimistic => RowLock::None,
      LockStrategy::Pessimistic => RowLock::ForUpdate,
    }
  }
}

impl fmt::Display for LockStrategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for LockStrategy {
  type Err = CoreError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "optimistic" => Ok(LockStrategy::Optimistic),
      "pessimistic" => Ok(LockStrategy::Pessimistic),
      other => Err(CoreError::validation(format!(
        "lock_type must be \"optimistic\" or \"pessimistic\", got \"{}\"",
        other
      ))),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_both_disciplines() {
    assert_eq!("optimistic".parse::<LockStrategy>().unwrap(), LockStrategy::Optimistic);
    assert_eq!("pessimistic".parse::<LockStrategy>().unwrap(), LockStrategy::Pessimistic);
    assert_eq!(LockStrategy::default(), LockStrategy::Optimistic);
  }

  #[test]
  fn rejects_unknown_discipline() {
    assert!(matches!("serializable".parse::<LockStrategy>(), Err(CoreError::Validation(_))));
  }

  #[test]
  fn only_pessimistic_locks_rows() {
    assert_eq!(LockStrategy::Optimistic.row_lock(), RowLock::None);
    assert_eq!(LockStrategy::Pessimistic.row_lock(), RowLock::ForUpdate);
  }
}
