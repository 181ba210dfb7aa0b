//! Status report printed by `rewrite --report`.

use serde::Serialize;

use crate::error::CliError;

/// Outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// The document was rewritten and written out.
    Success,
    /// The run failed; nothing was written.
    Failed,
}

/// Machine-readable summary of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Outcome.
    pub status: Status,
    /// Error code on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Human-readable error on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Where the document was written on success (`-` for stdout).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Report {
    /// Report for a successful run.
    pub fn success(output: impl Into<String>) -> Self {
        Report {
            status: Status::Success,
            reason: None,
            message: None,
            output: Some(output.into()),
        }
    }

    /// Report for a failed run.
    pub fn failure(err: &CliError) -> Self {
        Report {
            status: Status::Failed,
            reason: Some(err.reason().to_string()),
            message: Some(err.to_string()),
            output: None,
        }
    }

    /// Renders the report as a single JSON line.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            let reason = self.reason.as_deref().unwrap_or("Failed");
            format!("{{\"status\":\"FAILED\",\"reason\":\"{}\"}}", reason)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use spec_rewrite_core::RewriteError;

    #[test]
    fn test_success_shape() {
        let report = Report::success("out/api.yaml");
        let value: Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(value, json!({"status": "SUCCESS", "output": "out/api.yaml"}));
    }

    #[test]
    fn test_failure_shape() {
        let err = CliError::from(RewriteError::UnresolvedIntegration {
            path: "/widgets".into(),
            method: "post".into(),
        });
        let value: Value = serde_json::from_str(&Report::failure(&err).to_json()).unwrap();
        assert_eq!(value["status"], "FAILED");
        assert_eq!(value["reason"], "UnresolvedIntegration");
        assert!(value.get("output").is_none());
    }
}
