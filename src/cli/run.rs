//! Run command - process one comment event end to end

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, cross};
use anstream::println;
use merge_gate::config::ConfigOverrides;
use merge_gate::error::Result;
use merge_gate::pipeline::{MergeOutcome, PipelineReport, run_merge_command};
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options for the run command
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Optional TOML config file
    pub config_path: Option<PathBuf>,
    /// CLI/env overrides on top of the file
    pub overrides: ConfigOverrides,
    /// Path to the event payload
    pub event_path: Option<PathBuf>,
    /// `owner/repo`
    pub repository: Option<String>,
    /// API base URL
    pub api_url: String,
    /// Step output file (`GITHUB_OUTPUT`)
    pub output_path: Option<PathBuf>,
    /// Suppress progress messages
    pub quiet: bool,
}

/// Run the merge pipeline for the configured event
pub async fn run_command(options: &RunOptions) -> Result<PipelineReport> {
    let ctx = CommandContext::new(options).await?;

    let progress = if options.quiet {
        CliProgress::quiet()
    } else {
        CliProgress::verbose()
    };

    let report =
        run_merge_command(&ctx.event, &ctx.config, ctx.platform.as_ref(), &progress).await?;

    print_summary(ctx.event.pr_number, &report);

    if let Some(path) = &options.output_path {
        write_outputs(path, &report)?;
        debug!(path = %path.display(), "wrote step outputs");
    }

    Ok(report)
}

fn print_summary(pr_number: u64, report: &PipelineReport) {
    let pr = format!("#{pr_number}").accent();
    match &report.outcome {
        MergeOutcome::Merged { method, sha } => {
            let sha = sha.as_deref().map_or_else(String::new, |s| {
                format!(" ({})", merge_gate::types::short_sha(s).muted())
            });
            println!("{} Merged {pr} with {}{sha}", check(), method.emphasis());
        }
        MergeOutcome::AlreadyMerged => {
            println!("{} {pr} {}", check(), "was already merged".muted());
        }
        MergeOutcome::Skipped => {
            println!("{}", format!("Skipped: {}", report.message).muted());
        }
        MergeOutcome::Failed => {
            println!("{} {pr}: {}", cross(), report.message.warn());
        }
    }
}

/// Append `result`, `merge-method` and `merge-sha` to a step output file
pub fn write_outputs(path: &Path, report: &PipelineReport) -> Result<()> {
    let mut content = String::new();
    let _ = writeln!(content, "result={}", report.outcome.as_str());
    let method = report
        .outcome
        .method()
        .map_or_else(String::new, |m| m.to_string());
    let _ = writeln!(content, "merge-method={method}");
    let sha = match &report.outcome {
        MergeOutcome::Merged { sha: Some(sha), .. } => sha.as_str(),
        _ => "",
    };
    let _ = writeln!(content, "merge-sha={sha}");

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
