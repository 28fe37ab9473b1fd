//! Failure tracking — decide what to notify by diffing failure sets.
//!
//! The tracker holds no state of its own. The caller passes the previous
//! cycle's [`FailureSet`] in and keeps [`CycleOutcome::new_state`] for the
//! next call.

use tracing::debug;

use vigil_core::{CycleReport, FailureKey, FailureSet};

/// What the cycle should announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyAction {
    /// At least one failure key is new. Carries every current detail line,
    /// not only those of the new keys.
    AlertNewFailures { detail_lines: Vec<String> },
    /// Everything that failed last cycle is passing now.
    AlertRecovery,
    /// Nothing worth announcing.
    NoOp,
}

/// Implicit tracker state, derived from the retained failure set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerStatus {
    Healthy,
    Degraded,
}

impl TrackerStatus {
    pub fn of(failures: &FailureSet) -> Self {
        if failures.is_empty() {
            TrackerStatus::Healthy
        } else {
            TrackerStatus::Degraded
        }
    }
}

/// Result of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Failure set to retain for the next cycle.
    pub new_state: FailureSet,
    pub action: NotifyAction,
    /// Keys failing now that did not fail in the previous cycle.
    pub new_failures: Vec<FailureKey>,
    /// Keys that failed in the previous cycle and no longer do.
    pub recovered: Vec<FailureKey>,
    /// Merged report of the cycle, detail lines in target order.
    pub report: CycleReport,
}

impl CycleOutcome {
    pub fn status(&self) -> TrackerStatus {
        TrackerStatus::of(&self.new_state)
    }
}

/// Merge this cycle's per-target fragments and diff them against `prior`.
///
/// Fragments must be supplied in target declaration order; their detail lines
/// are concatenated in that order.
pub fn process_cycle<I>(fragments: I, prior: FailureSet) -> CycleOutcome
where
    I: IntoIterator<Item = CycleReport>,
{
    let report: CycleReport = fragments.into_iter().collect();
    let current = &report.failures;

    let new_failures: Vec<FailureKey> = current.difference(&prior).cloned().collect();
    let recovered: Vec<FailureKey> = prior.difference(current).cloned().collect();

    let action = if !new_failures.is_empty() {
        NotifyAction::AlertNewFailures {
            detail_lines: report.detail_lines.clone(),
        }
    } else if current.is_empty() && !prior.is_empty() {
        NotifyAction::AlertRecovery
    } else {
        NotifyAction::NoOp
    };

    debug!(
        current = current.len(),
        prior = prior.len(),
        new = new_failures.len(),
        recovered = recovered.len(),
        ?action,
        "cycle diffed"
    );

    CycleOutcome {
        new_state: current.clone(),
        action,
        new_failures,
        recovered,
        report,
    }
}
