//! Export response handling

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque file handle returned by an export, passed back to the download
/// endpoint as-is
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportHandle(String);

impl ExportHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, used as a file name when the server sends none
    pub fn file_name(&self) -> &str {
        self.0
            .rsplit(['/', '\\'])
            .find(|segment| !segment.is_empty())
            .unwrap_or("export")
    }
}

impl fmt::Display for ExportHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an export response was read
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// `file` present and non-empty
    Ready(ExportHandle),
    /// Anything else; the raw body as compact JSON text
    Diagnostic(String),
}

impl ExportOutcome {
    /// Best-effort reading of an export body; never fails
    pub fn from_body(body: &Value) -> Self {
        match body.get("file").and_then(Value::as_str) {
            Some(file) if !file.is_empty() => ExportOutcome::Ready(ExportHandle::new(file)),
            _ => ExportOutcome::Diagnostic(body.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_becomes_handle() {
        let outcome = ExportOutcome::from_body(&json!({"file": "exports/out.csv", "message": "ok"}));
        assert_eq!(outcome, ExportOutcome::Ready(ExportHandle::new("exports/out.csv")));
    }

    #[test]
    fn test_missing_file_is_diagnostic() {
        let outcome = ExportOutcome::from_body(&json!({"message": "Excel export failed"}));
        assert_eq!(
            outcome,
            ExportOutcome::Diagnostic(r#"{"message":"Excel export failed"}"#.to_string())
        );
    }

    #[test]
    fn test_empty_or_non_string_file_is_diagnostic() {
        assert!(matches!(
            ExportOutcome::from_body(&json!({"file": ""})),
            ExportOutcome::Diagnostic(_)
        ));
        assert!(matches!(
            ExportOutcome::from_body(&json!({"file": 12})),
            ExportOutcome::Diagnostic(_)
        ));
        assert!(matches!(
            ExportOutcome::from_body(&json!([1, 2])),
            ExportOutcome::Diagnostic(_)
        ));
    }

    #[test]
    fn test_handle_file_name() {
        assert_eq!(ExportHandle::new("/tmp/Employee_export.xlsx").file_name(), "Employee_export.xlsx");
        assert_eq!(ExportHandle::new(r"C:\temp\out.xlsx").file_name(), "out.xlsx");
        assert_eq!(ExportHandle::new("token-123").file_name(), "token-123");
        assert_eq!(ExportHandle::new("/").file_name(), "export");
    }
}
