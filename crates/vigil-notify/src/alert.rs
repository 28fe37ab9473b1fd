//! Alert model and the fixed messages the monitor sends.

use std::time::Duration;

use chrono::{DateTime, Utc};

pub const STARTUP_TITLE: &str = "🚀 Monitoring started";
pub const FAILURE_TITLE: &str = "🚨 Failure detected";
pub const RECOVERY_TITLE: &str = "✅ All systems recovered";
pub const RECOVERY_MESSAGE: &str =
    "All previously reported failures have cleared.\nThe system is operating normally.";

/// How an alert should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Critical,
    Resolved,
}

impl Severity {
    /// Attachment colour for the severity.
    pub fn color(self) -> &'static str {
        match self {
            Severity::Info => "#439FE0",
            Severity::Critical => "#ff4d4d",
            Severity::Resolved => "#36a64f",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    /// Body text; supports chat-style markdown (`*bold*`, `` `code` ``).
    pub body: String,
    pub severity: Severity,
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(title: impl Into<String>, body: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            severity,
            raised_at: Utc::now(),
        }
    }

    /// Sent once when monitoring begins.
    pub fn startup(target_count: usize, interval: Duration) -> Self {
        Self::new(
            STARTUP_TITLE,
            format!(
                "Monitoring has started.\nTargets: *{target_count}*\nInterval: *{}s*",
                interval.as_secs()
            ),
            Severity::Info,
        )
    }

    /// Lists every failing detail line of the cycle, one bullet each.
    pub fn failures<S: AsRef<str>>(detail_lines: &[S]) -> Self {
        let body = detail_lines
            .iter()
            .map(|line| format!("• {}", line.as_ref()))
            .collect::<Vec<_>>()
            .join("\n");
        Self::new(FAILURE_TITLE, body, Severity::Critical)
    }

    pub fn recovery() -> Self {
        Self::new(RECOVERY_TITLE, RECOVERY_MESSAGE, Severity::Resolved)
    }
}
