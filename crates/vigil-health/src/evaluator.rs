//! Status evaluation: turn a target's document (or probe failure) into a
//! report fragment of failure keys and detail lines.
//!
//! Expected document shape:
//!
//! ```json
//! { "data": [ { "id": "1", "attributes": { "name": "db", "status": "passing" } } ] }
//! ```

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use vigil_core::{CheckResult, CycleReport, FailureKey, Target};

use crate::probe::ProbeError;

/// The document does not follow the expected schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("document is not a JSON object")]
    NotAnObject,

    #[error("document has no `data` field")]
    MissingData,

    #[error("`data` is not an array")]
    DataNotArray,

    #[error("`data[{0}]` is not an object")]
    EntryNotAnObject(usize),
}

/// Extract the check entries from a document.
///
/// Every entry must be an object. Its fields are read leniently: a missing
/// id or name becomes an empty string and a missing status becomes `None`
/// (which counts as failing).
pub fn parse_checks(document: &Value) -> Result<Vec<CheckResult>, FormatError> {
    let object = document.as_object().ok_or(FormatError::NotAnObject)?;
    let data = object.get("data").ok_or(FormatError::MissingData)?;
    let items = data.as_array().ok_or(FormatError::DataNotArray)?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if item.is_object() {
                Ok(parse_check(item))
            } else {
                Err(FormatError::EntryNotAnObject(index))
            }
        })
        .collect()
}

fn parse_check(item: &Value) -> CheckResult {
    let attributes = item.get("attributes");
    CheckResult {
        id: item.get("id").map(scalar_text).unwrap_or_default(),
        name: attributes
            .and_then(|a| a.get("name"))
            .map(scalar_text)
            .unwrap_or_default(),
        status: attributes
            .and_then(|a| a.get("status"))
            .filter(|s| !s.is_null())
            .map(scalar_text),
    }
}

/// Strings verbatim, anything else as compact JSON.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Evaluate a successfully fetched document.
pub fn evaluate(target: &Target, document: &Value) -> CycleReport {
    let checks = match parse_checks(document) {
        Ok(checks) => checks,
        Err(e) => {
            warn!(target = %target.name, error = %e, "unexpected health document format");
            return CycleReport::single(
                FailureKey::unexpected_format(&target.name),
                format!("{}: Unexpected JSON format", target.name),
            );
        }
    };

    let mut report = CycleReport::healthy();
    for check in checks.iter().filter(|c| c.is_failing()) {
        let line = format!(
            "{} → {}: {}",
            target.name,
            check.label(),
            check.status_label()
        );
        warn!(target = %target.name, check = %check.label(), status = %check.status_label(), "check failing");
        report.push(FailureKey::for_check(&target.name, check), line);
    }

    if report.is_healthy() {
        info!(target = %target.name, checks = checks.len(), "all checks passing");
    }
    report
}

/// Evaluate a target whose document could not be fetched.
pub fn evaluate_probe_error(target: &Target, error: &ProbeError) -> CycleReport {
    warn!(target = %target.name, error = %error, "error fetching health");
    CycleReport::single(
        FailureKey::connection_error(&target.name),
        format!("{}: Error fetching health ({error})", target.name),
    )
}
