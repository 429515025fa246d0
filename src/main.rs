//! merge-gate CLI

mod cli;

use anstream::println;
use clap::{Args, Parser, Subcommand};
use cli::style::{Stylize, check, cross};
use cli::{RunOptions, run_command};
use merge_gate::checks::is_conventional_title;
use merge_gate::config::{ConfigOverrides, resolve_config};
use merge_gate::merge::resolve_merge_method;
use merge_gate::pipeline::MergeOutcome;
use merge_gate::platform::DEFAULT_API_URL;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "merge-gate")]
#[command(about = "Merge pull requests from a /merge comment, safely")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Log filter (e.g. `debug`, `merge_gate=trace`)
    #[arg(long, global = true, env = "MERGE_GATE_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    subcommand: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Process the comment event that triggered this workflow run (default)
    Run(RunArgs),

    /// Check whether a pull request title follows Conventional Commits
    CheckTitle {
        /// Title to check
        title: String,
    },

    /// Show the merge method chosen for a head/base branch pair
    ResolveMethod {
        /// Head (source) branch
        #[arg(long)]
        head: String,

        /// Base (target) branch
        #[arg(long)]
        base: String,

        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// TOML config file
    #[arg(long, env = "MERGE_GATE_CONFIG")]
    config: Option<PathBuf>,

    /// Trigger word for merge commands
    #[arg(long, env = "INPUT_COMMAND")]
    command: Option<String>,

    /// Prefix identifying release branches
    #[arg(long, env = "INPUT_RELEASE_BRANCH_PREFIX")]
    release_branch_prefix: Option<String>,

    /// Prefix identifying back-merge branches
    #[arg(long, env = "INPUT_SYNC_BRANCH_PREFIX")]
    sync_branch_prefix: Option<String>,

    /// Integration branch name
    #[arg(long, env = "INPUT_DEVELOP_BRANCH")]
    develop_branch: Option<String>,

    /// Extra fetches while GitHub computes mergeability
    #[arg(long, env = "INPUT_MAX_RETRIES")]
    max_retries: Option<String>,

    /// Seconds between those fetches
    #[arg(long, env = "INPUT_RETRY_INTERVAL_SECS")]
    retry_interval_secs: Option<String>,
}

impl ConfigArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            command: self.command.clone(),
            release_branch_prefix: self.release_branch_prefix.clone(),
            sync_branch_prefix: self.sync_branch_prefix.clone(),
            develop_branch: self.develop_branch.clone(),
            max_retries: self.max_retries.clone(),
            retry_interval_secs: self.retry_interval_secs.clone(),
        }
    }
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Path to the webhook event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Repository as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// File receiving step outputs
    #[arg(long, env = "GITHUB_OUTPUT")]
    output: Option<PathBuf>,

    /// Suppress progress messages
    #[arg(long, short)]
    quiet: bool,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let command = cli.subcommand.unwrap_or(Commands::Run(cli.run));

    match command {
        Commands::Run(args) => run(args).await,
        Commands::CheckTitle { title } => check_title(&title),
        Commands::ResolveMethod { head, base, config } => {
            match resolve_method(&head, &base, &config) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    anstream::eprintln!("{} {e:#}", "error:".error());
                    ExitCode::from(2)
                }
            }
        }
    }
}

async fn run(args: RunArgs) -> ExitCode {
    let options = RunOptions {
        config_path: args.config.config.clone(),
        overrides: args.config.overrides(),
        event_path: args.event_path,
        repository: args.repository,
        api_url: args.api_url,
        output_path: args.output,
        quiet: args.quiet,
    };

    match run_command(&options).await {
        Ok(report) => match report.outcome {
            MergeOutcome::Failed => ExitCode::FAILURE,
            _ => ExitCode::SUCCESS,
        },
        Err(e) => {
            anstream::eprintln!("{} {e}", "error:".error());
            if e.is_config() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn check_title(title: &str) -> ExitCode {
    if is_conventional_title(title) {
        println!("{} {}", check(), "title follows Conventional Commits".success());
        ExitCode::SUCCESS
    } else {
        println!(
            "{} {}",
            cross(),
            "title does not follow Conventional Commits (`type(scope)!: description`)".warn()
        );
        ExitCode::FAILURE
    }
}

fn resolve_method(head: &str, base: &str, args: &ConfigArgs) -> anyhow::Result<()> {
    let config = resolve_config(args.config.as_deref(), &args.overrides())?;

    let decision = resolve_merge_method(head, base, &config.branch_policy());
    println!("{}", decision.method);
    println!("{}", decision.reason.muted());
    Ok(())
}
