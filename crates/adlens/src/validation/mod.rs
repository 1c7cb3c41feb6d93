//! Validation: structural and semantic checks over parsed tables.

mod issue;
mod validator;

pub use issue::{IssueSeverity, ValidationIssue, ValidationResult};
pub use validator::Validator;
