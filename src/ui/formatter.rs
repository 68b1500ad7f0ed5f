//! Pure formatting functions for run log output.
//!
//! Inside GitHub Actions warnings and errors become workflow commands
//! (`::warning::`, `::error::`) so they surface as annotations on the run.

use console::style;

use crate::boundary::{SkipReason, SyncWarning};
use crate::sync::{ConflictResolution, PushOutcome, SyncOutcome};

/// Whether we are running as a GitHub Actions step
pub fn in_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// Escape data for a workflow command
pub fn escape_command_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Format a workflow command line
pub fn workflow_command(command: &str, message: &str) -> String {
    format!("::{}::{}", command, escape_command_data(message))
}

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    if in_github_actions() {
        println!("{}", workflow_command("error", message));
    } else {
        eprintln!("{} {}", style("ERROR:").red().bold(), message);
    }
}

/// Format and print a warning message in yellow.
pub fn display_warning(message: &str) {
    if in_github_actions() {
        println!("{}", workflow_command("warning", message));
    } else {
        eprintln!("{} {}", style("WARNING:").yellow().bold(), message);
    }
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Report why the run ended without a bump
pub fn display_skip(reason: &SkipReason) {
    match reason {
        SkipReason::UnmanagedBranch { .. } => display_status(&reason.to_string()),
        SkipReason::NoReleaseLabel { .. } => display_warning(&reason.to_string()),
    }
}

/// Report a non-fatal propagation problem
pub fn display_sync_warning(warning: &SyncWarning) {
    match warning {
        SyncWarning::Divergence { .. } => display_error(&warning.to_string()),
        _ => display_warning(&warning.to_string()),
    }
}

/// Display the version change for a branch.
pub fn display_version_change(branch: &str, current: &str, next: &str) {
    println!("\n{}", style(format!("Version for '{}'", branch)).bold());
    println!("  From: {}", style(current).dim());
    println!("  To:   {}", style(next).green().bold());
}

/// Summarize a propagation attempt
pub fn display_sync_outcome(outcome: &SyncOutcome) {
    let how = match outcome.resolution {
        ConflictResolution::None if outcome.merged => "merged",
        ConflictResolution::None => "unchanged",
        ConflictResolution::ForceSync => "reset to upstream",
        ConflictResolution::Discarded => "kept its own version",
        ConflictResolution::Escalated => "needs a manual merge",
    };

    let message = format!("Sync {} -> {}: {}", outcome.target, outcome.neighbor, how);
    match (&outcome.resolution, &outcome.push) {
        (ConflictResolution::Escalated, _) => display_status(&message),
        (_, PushOutcome::Pushed) => display_success(&format!("{} and pushed", message)),
        (_, PushOutcome::Rejected { .. }) => display_status(&format!("{}, push rejected", message)),
        (_, PushOutcome::Skipped) => display_status(&message),
    }
}
