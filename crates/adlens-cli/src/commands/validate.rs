//! `adlens validate` - validation only, no analysis.

use std::path::PathBuf;

use colored::Colorize;

use adlens::{Loader, Result, Validator};

pub fn run(file: PathBuf) -> Result<i32> {
    let table = Loader::new().parse_file(&file)?;
    let result = Validator::new().validate(&table);

    if result.is_valid {
        println!(
            "{} {} row(s), {} warning(s)",
            "Valid:".green().bold(),
            result.rows_processed,
            result.warnings().count()
        );
    } else {
        eprintln!("{}", "Validation failed:".red().bold());
    }

    if !result.issues.is_empty() {
        super::print_issues(&result);
    }

    Ok(if result.is_valid { 0 } else { 2 })
}
