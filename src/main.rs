use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use release_train::cli::{run_release_workflow, ReleaseWorkflowArgs, WorkflowResult};
use release_train::config;
use release_train::context::{ContextOverrides, TriggerContext};
use release_train::git::SystemGit;
use release_train::ui;

#[derive(clap::Parser)]
#[command(
    name = "release-train",
    about = "Bump and propagate versions across the alpha, beta and main branches"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long = "ref", help = "Trigger ref, defaults to GITHUB_REF")]
    git_ref: Option<String>,

    #[arg(long, help = "Webhook payload file, defaults to GITHUB_EVENT_PATH")]
    event_path: Option<String>,

    #[arg(long, help = "Pull request source ref, overrides the payload")]
    head_ref: Option<String>,

    #[arg(short, long = "label", help = "Pull request label, may be repeated")]
    labels: Vec<String>,

    #[arg(short, long, help = "Manifest path relative to the repository root")]
    manifest: Option<PathBuf>,

    #[arg(long, help = "Compute the next version without committing or pushing")]
    dry_run: bool,

    #[arg(short = 'C', long, default_value = ".", help = "Repository to operate on")]
    repo: PathBuf,

    #[arg(short, long, help = "Print version information")]
    version: bool,
}

fn main() {
    init_tracing();

    let args = Args::parse();

    if args.version {
        println!("release-train {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Err(e) = run(args) {
        ui::report_failure(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = config::load_config(args.config.as_deref()).context("Error loading config")?;
    if let Some(manifest) = args.manifest {
        config.manifest = manifest;
    }

    let trigger = TriggerContext::load(&ContextOverrides {
        git_ref: args.git_ref,
        event_path: args.event_path,
        head_ref: args.head_ref,
        labels: args.labels,
    })?;

    let vcs = SystemGit::open(&args.repo)
        .context("Git repository error")?
        .with_identity(config.git.identity());

    let workflow_args = ReleaseWorkflowArgs {
        dry_run: args.dry_run,
    };
    let result = run_release_workflow(&workflow_args, &config, &trigger, &vcs)?;

    match &result {
        WorkflowResult::Released {
            next, warnings, ..
        } => {
            ui::set_output(ui::NEXT_VERSION_OUTPUT, &next.to_string())?;
            if !warnings.is_empty() {
                tracing::warn!(count = warnings.len(), "release finished with sync warnings");
            }
        }
        WorkflowResult::Skipped(reason) => {
            tracing::info!(%reason, "nothing to release");
        }
    }

    Ok(())
}

/// Console logging on stderr, controlled by RUST_LOG (default: warn).
/// A debug-enabled Actions run (`RUNNER_DEBUG=1`) logs at debug level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if std::env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1") {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();
}
