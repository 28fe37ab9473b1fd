//! Domain types shared by the probe, evaluator, tracker and scheduler.
//!
//! A cycle produces one [`CycleReport`] per target; the reports are merged in
//! target declaration order and diffed by [`FailureKey`] against the previous
//! cycle's [`FailureSet`].

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Status value a check must carry to count as healthy.
pub const PASSING: &str = "passing";

// ── Target ─────────────────────────────────────────────────────────

/// One monitored health endpoint. Identity is the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub url: String,
}

impl Target {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

// ── CheckResult ────────────────────────────────────────────────────

/// One entry of a target's health document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub id: String,
    /// Human-readable check name. May be empty.
    pub name: String,
    /// Reported status. `None` when the entry carried no status at all.
    pub status: Option<String>,
}

impl CheckResult {
    /// Label for an entry carrying neither a name nor an id.
    pub const UNNAMED: &'static str = "undefined";

    pub fn is_failing(&self) -> bool {
        self.status.as_deref() != Some(PASSING)
    }

    /// The name, or the id when the name is empty.
    /// Name, falling back to the id, then to [`CheckResult::UNNAMED`].
    pub fn label(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.id.is_empty() {
            &self.id
        } else {
            Self::UNNAMED
        }
    }

    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or("unknown")
    }
}

// ── FailureKey ─────────────────────────────────────────────────────

/// Stable identity of one failing condition, used as the unit of diffing
/// between cycles.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureKey(String);

impl FailureKey {
    pub const CONNECTION_ERROR: &'static str = "ConnectionError";
    pub const UNEXPECTED_FORMAT: &'static str = "UnexpectedFormat";

    /// `<target>:<check name or id>`.
    pub fn for_check(target: &str, check: &CheckResult) -> Self {
        Self::compose(target, check.label())
    }

    /// `<target>:ConnectionError`, for transport and parse failures.
    pub fn connection_error(target: &str) -> Self {
        Self::compose(target, Self::CONNECTION_ERROR)
    }

    /// `<target>:UnexpectedFormat`, for documents violating the schema.
    pub fn unexpected_format(target: &str) -> Self {
        Self::compose(target, Self::UNEXPECTED_FORMAT)
    }

    fn compose(target: &str, condition: &str) -> Self {
        Self(format!("{target}:{condition}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FailureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The failing conditions observed in one cycle.
pub type FailureSet = BTreeSet<FailureKey>;

// ── CycleReport ────────────────────────────────────────────────────

/// Failure keys plus ordered, human-readable detail lines.
///
/// Used both for a single target's fragment and for the whole cycle once the
/// fragments have been merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub failures: FailureSet,
    pub detail_lines: Vec<String>,
}

impl CycleReport {
    /// A fragment for a target with nothing to report.
    pub fn healthy() -> Self {
        Self::default()
    }

    /// A fragment with exactly one failure and one detail line.
    pub fn single(key: FailureKey, line: impl Into<String>) -> Self {
        let mut report = Self::default();
        report.push(key, line);
        report
    }

    pub fn push(&mut self, key: FailureKey, line: impl Into<String>) {
        self.failures.insert(key);
        self.detail_lines.push(line.into());
    }

    /// Append another fragment, keeping its detail lines after ours.
    pub fn merge(&mut self, other: CycleReport) {
        self.failures.extend(other.failures);
        self.detail_lines.extend(other.detail_lines);
    }

    pub fn is_healthy(&self) -> bool {
        self.failures.is_empty()
    }
}

impl FromIterator<CycleReport> for CycleReport {
    fn from_iter<I: IntoIterator<Item = CycleReport>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), |mut acc, fragment| {
            acc.merge(fragment);
            acc
        })
    }
}
