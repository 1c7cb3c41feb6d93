//! `adlens analyze` - run the full pipeline and emit the report.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;

use adlens::{
    AdlensError, AnalysisOutcome, Analyst, AnalystConfig, AnthropicBackend, BackendKind,
    GeminiBackend, GenerationBackend, GenerationConfig, OpenAiBackend, Result,
};

use crate::cli::BackendChoice;

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    backend: BackendChoice,
    model: Option<String>,
) -> Result<i32> {
    let kind = match backend {
        BackendChoice::Openai => BackendKind::OpenAi,
        BackendChoice::Anthropic => BackendKind::Anthropic,
        BackendChoice::Gemini => BackendKind::Gemini,
        BackendChoice::Fallback => BackendKind::Fallback,
    };

    let mut analyst = Analyst::with_config(AnalystConfig::new().with_backend(kind));
    match build_backend(kind, model) {
        Ok(Some(backend)) => analyst = analyst.with_shared_backend(backend),
        Ok(None) => {}
        Err(e) => {
            eprintln!(
                "{} {e}; using deterministic fallback insights",
                "warning:".yellow().bold()
            );
        }
    }

    match analyst.analyze_file(&file)? {
        AnalysisOutcome::Rejected(result) => {
            eprintln!("{}", "Validation failed:".red().bold());
            super::print_issues(&result);
            Ok(2)
        }
        AnalysisOutcome::Report(report) => {
            let json = serde_json::to_string_pretty(&report)?;
            match output {
                Some(path) => {
                    fs::write(&path, json).map_err(|e| AdlensError::Io {
                        path: path.clone(),
                        source: e,
                    })?;
                    eprintln!("Report written to {}", path.display());
                }
                None => println!("{json}"),
            }

            eprintln!(
                "{} {} campaign(s), {} issue(s), {} recommendation(s)",
                "Analyzed".green().bold(),
                report.metrics_summary.total_campaigns,
                report.key_issues.len(),
                report.recommendations.len()
            );
            Ok(0)
        }
    }
}

/// Construct the selected network backend.
///
/// The CLI is the composition root: environment keys are read here, never
/// inside the pipeline. `Ok(None)` means the fallback was selected
/// explicitly; an error means a backend was requested but cannot be built.
fn build_backend(
    kind: BackendKind,
    model: Option<String>,
) -> Result<Option<Arc<dyn GenerationBackend>>> {
    let config = |default_model: &str| GenerationConfig {
        model: model.clone().unwrap_or_else(|| default_model.to_string()),
        ..GenerationConfig::default()
    };

    let backend: Arc<dyn GenerationBackend> = match kind {
        BackendKind::Fallback => return Ok(None),
        BackendKind::OpenAi => Arc::new(OpenAiBackend::with_config(
            env_key("OPENAI_API_KEY")?,
            config("gpt-4o-mini"),
        )?),
        BackendKind::Anthropic => Arc::new(AnthropicBackend::with_config(
            env_key("ANTHROPIC_API_KEY")?,
            config("claude-3-5-sonnet-20241022"),
        )?),
        BackendKind::Gemini => Arc::new(GeminiBackend::with_config(
            env_key("GOOGLE_API_KEY")?,
            config("gemini-2.0-flash"),
        )?),
    };

    Ok(Some(backend))
}

fn env_key(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| AdlensError::Config(format!("{name} environment variable not set")))
}
