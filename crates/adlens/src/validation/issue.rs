//! Validation issue and result types.

use serde::{Deserialize, Serialize};

/// Severity of a validation issue. Errors block analysis; warnings are
/// recorded and analysis proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Warning,
    Error,
}

impl IssueSeverity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            IssueSeverity::Warning => "Warning",
            IssueSeverity::Error => "Error",
        }
    }
}

/// A single validation finding, tied to a field and optionally a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Affected column or field name.
    pub field: String,
    /// Human-readable description.
    pub message: String,
    /// 1-based CSV line number, when the issue is row-specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// The offending value, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Severity.
    pub severity: IssueSeverity,
}

impl ValidationIssue {
    /// Create an error-severity issue.
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            row: None,
            value: None,
            severity: IssueSeverity::Error,
        }
    }

    /// Create a warning-severity issue.
    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            row: None,
            value: None,
            severity: IssueSeverity::Warning,
        }
    }

    /// Attach a CSV line number.
    pub fn at_line(mut self, line: usize) -> Self {
        self.row = Some(line);
        self
    }

    /// Attach the offending value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Outcome of validating one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// False iff at least one issue has error severity.
    pub is_valid: bool,
    /// All findings, in detection order.
    pub issues: Vec<ValidationIssue>,
    /// Number of data rows examined.
    pub rows_processed: usize,
}

impl ValidationResult {
    /// Build a result from collected issues; `is_valid` is derived, never
    /// set independently.
    pub fn from_issues(issues: Vec<ValidationIssue>, rows_processed: usize) -> Self {
        let is_valid = !issues
            .iter()
            .any(|i| i.severity == IssueSeverity::Error);
        Self {
            is_valid,
            issues,
            rows_processed,
        }
    }

    /// Error-severity issues only.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Error)
    }

    /// Warning-severity issues only.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_derived_from_severity() {
        let clean = ValidationResult::from_issues(vec![], 3);
        assert!(clean.is_valid);

        let warned = ValidationResult::from_issues(
            vec![ValidationIssue::warning("cpa", "outlier")],
            3,
        );
        assert!(warned.is_valid);

        let failed = ValidationResult::from_issues(
            vec![
                ValidationIssue::warning("cpa", "outlier"),
                ValidationIssue::error("clicks", "clicks cannot exceed impressions"),
            ],
            3,
        );
        assert!(!failed.is_valid);
        assert_eq!(failed.errors().count(), 1);
        assert_eq!(failed.warnings().count(), 1);
    }

    #[test]
    fn test_issue_builder() {
        let issue = ValidationIssue::error("ctr", "CTR must be between 0 and 100%")
            .at_line(4)
            .with_value("150.0");

        assert_eq!(issue.row, Some(4));
        assert_eq!(issue.value.as_deref(), Some("150.0"));
        assert_eq!(issue.severity, IssueSeverity::Error);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(IssueSeverity::Warning < IssueSeverity::Error);
    }
}
