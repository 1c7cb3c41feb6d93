//! Command implementations.

pub mod analyze;
pub mod validate;

use colored::Colorize;

use adlens::{IssueSeverity, ValidationResult};

/// Print a validation result as a colored issue listing.
pub fn print_issues(result: &ValidationResult) {
    for issue in &result.issues {
        let tag = match issue.severity {
            IssueSeverity::Error => "error".red().bold(),
            IssueSeverity::Warning => "warning".yellow().bold(),
        };
        let location = issue
            .row
            .map(|line| format!(" (line {line})"))
            .unwrap_or_default();
        let value = issue
            .value
            .as_deref()
            .map(|v| format!(" [value: {v}]"))
            .unwrap_or_default();
        eprintln!("{tag}: {}{location}: {}{value}", issue.field, issue.message);
    }

    let summary = format!(
        "{} error(s), {} warning(s) across {} row(s)",
        result.errors().count(),
        result.warnings().count(),
        result.rows_processed
    );
    eprintln!("{}", summary.bold());
}
