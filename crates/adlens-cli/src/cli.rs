//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Adlens: campaign performance diagnostics
#[derive(Parser)]
#[command(name = "adlens")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a campaign export and produce the full report
    Analyze {
        /// Path to the export file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path for the report JSON (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Generation backend for the narrative sections
        #[arg(long, default_value = "fallback")]
        backend: BackendChoice,

        /// Model to use (provider-specific, e.g. "gpt-4o-mini")
        #[arg(long)]
        model: Option<String>,
    },

    /// Validate a campaign export without running the analysis
    Validate {
        /// Path to the export file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Generation backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendChoice {
    /// OpenAI API (requires OPENAI_API_KEY)
    Openai,
    /// Anthropic API (requires ANTHROPIC_API_KEY)
    Anthropic,
    /// Google Gemini API (requires GOOGLE_API_KEY)
    Gemini,
    /// Deterministic rule-based insights, no network
    Fallback,
}
