mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use config::{ConfigMerger, PinOverrides};
use pinfix_core::PinError;
use pinfix_core::adapters::{FsWritePort, GhCliPort, ShellGitPort};
use pinfix_core::health::check_repo_health;
use pinfix_core::pipeline::{run_pin, write_pin_artifacts};
use pinfix_render::{render_health_text, render_pin_text};
use pinfix_types::report::ToolInfo;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pinfix",
    version,
    about = "Pin a dependency in package.json and publish the fix through git."
)]
struct Cli {
    /// Log line format on stderr.
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pin the target package, then branch, commit, push and open a PR.
    Pin(PinArgs),
    /// Check the repository for conventional files and declared dependencies.
    Check(CheckArgs),
}

#[derive(Debug, Parser)]
struct PinArgs {
    /// Repository root (default: current directory).
    #[arg(long, default_value = ".")]
    repo_root: Utf8PathBuf,

    /// Manifest path relative to the repository root (default: package.json).
    #[arg(long)]
    manifest: Option<Utf8PathBuf>,

    /// Package to pin (overrides [pin].package).
    #[arg(long)]
    package: Option<String>,

    /// Required version constraint (overrides [pin].version).
    #[arg(long = "to", value_name = "VERSION")]
    pin_version: Option<String>,

    /// Preview the change without writing the manifest or touching git.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Rewrite the manifest but skip branch/commit/push/PR.
    #[arg(long, default_value_t = false)]
    no_publish: bool,

    /// Branch to create for the change.
    #[arg(long)]
    branch: Option<String>,

    /// Commit message for the change.
    #[arg(long)]
    commit_message: Option<String>,

    /// Remote to push the branch to.
    #[arg(long)]
    remote: Option<String>,

    /// Switch to the branch if it already exists instead of failing.
    #[arg(long, default_value_t = false)]
    reuse_branch: bool,

    /// Write report.json, summary.md and patch.diff into this directory.
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct CheckArgs {
    /// Repository root (default: current directory).
    #[arg(long, default_value = ".")]
    repo_root: Utf8PathBuf,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

fn real_main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    match cli.cmd {
        Command::Pin(args) => cmd_pin(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn cmd_pin(args: PinArgs) -> anyhow::Result<ExitCode> {
    let file_config =
        config::load_or_default(&args.repo_root).context("load pinfix.toml config")?;
    let settings = ConfigMerger::new(file_config).merge_pin_args(PinOverrides {
        repo_root: args.repo_root,
        manifest: args.manifest,
        package: args.package,
        version: args.pin_version,
        dry_run: args.dry_run,
        no_publish: args.no_publish,
        branch: args.branch,
        commit_message: args.commit_message,
        remote: args.remote,
        reuse_branch: args.reuse_branch,
    })?;
    debug!(?settings, "merged settings");

    let git = ShellGitPort::default();
    let pr = GhCliPort::with_program(settings.publish.pr_command.clone());

    let outcome = match run_pin(&settings, &git, &pr, tool_info()) {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("{err}");
            return Ok(ExitCode::from(err.exit_code()));
        }
    };

    if let Some(failure) = &outcome.failure {
        let err = PinError::from(failure.clone());
        warn!(exit_code = err.exit_code(), "{err}");
    }

    if let Some(out_dir) = &args.out_dir {
        write_pin_artifacts(&outcome, out_dir, &FsWritePort)
            .with_context(|| format!("write artifacts to {}", out_dir))?;
        info!("wrote pin artifacts to {}", out_dir);
    }

    match args.format {
        OutputFormat::Text => {
            if settings.dry_run && !outcome.patch.is_empty() {
                print!("{}", outcome.patch);
            }
            print!("{}", render_pin_text(&outcome.report));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome.report)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<ExitCode> {
    let report = check_repo_health(&args.repo_root);

    match args.format {
        OutputFormat::Text => print!("{}", render_health_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(if report.is_healthy() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "pinfix".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
