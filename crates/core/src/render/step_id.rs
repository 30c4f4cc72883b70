//! Identifiers that bind a step checkbox to its label.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::Serialize;

/// Process-unique identifier for a rendered step item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of step identifiers. Ids must be monotonic and never reused.
pub trait StepIdGenerator: Send + Sync {
    fn next(&self) -> StepId;
}

/// Wall-clock seed plus a counter, for live sessions.
#[derive(Debug)]
pub struct SessionStepIds {
    seed: i64,
    counter: AtomicU64,
}

impl SessionStepIds {
    pub fn new() -> Self {
        Self {
            seed: Utc::now().timestamp_millis(),
            counter: AtomicU64::new(0),
        }
    }
}

impl Default for SessionStepIds {
    fn default() -> Self {
        Self::new()
    }
}

impl StepIdGenerator for SessionStepIds {
    fn next(&self) -> StepId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        StepId(format!("step-{}-{}", self.seed, n))
    }
}

/// Deterministic `step-1`, `step-2`, ... ids.
#[derive(Debug, Default)]
pub struct SequentialStepIds {
    counter: AtomicU64,
}

impl SequentialStepIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StepIdGenerator for SequentialStepIds {
    fn next(&self) -> StepId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        StepId(format!("step-{n}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialStepIds::new();
        assert_eq!(ids.next().as_str(), "step-1");
        assert_eq!(ids.next().as_str(), "step-2");
    }

    #[test]
    fn test_session_ids_never_repeat() {
        let ids = SessionStepIds::new();
        let seen: HashSet<StepId> = (0..100).map(|_| ids.next()).collect();
        assert_eq!(seen.len(), 100);
        assert!(ids.next().as_str().starts_with("step-"));
    }
}
