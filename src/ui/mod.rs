//! User interface module - run log and step outputs.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Step output and failure reporting

use std::fs::OpenOptions;
use std::io::Write;

use anyhow::Result;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_error, display_skip, display_status, display_success, display_sync_outcome,
    display_sync_warning, display_version_change, display_warning,
};

/// Name of the step output carrying the computed version
pub const NEXT_VERSION_OUTPUT: &str = "next-version";

/// Format a step output line.
///
/// Multi-line values use the heredoc form GitHub expects.
pub fn format_output(name: &str, value: &str) -> String {
    if value.contains('\n') {
        format!("{}<<EOF\n{}\nEOF\n", name, value)
    } else {
        format!("{}={}\n", name, value)
    }
}

/// Expose a named value to later steps.
///
/// Appends to the file named by `GITHUB_OUTPUT`; outside Actions the line is
/// printed to stdout instead.
///
/// # Returns
/// * `Ok(())` - Output recorded
/// * `Err` - If the output file cannot be written
pub fn set_output(name: &str, value: &str) -> Result<()> {
    let line = format_output(name, value);

    match std::env::var("GITHUB_OUTPUT") {
        Ok(path) if !path.is_empty() => {
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            file.write_all(line.as_bytes())?;
        }
        _ => print!("{}", line),
    }

    Ok(())
}

/// Report a fatal failure of the run
pub fn report_failure(message: &str) {
    display_error(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::NamedTempFile;

    #[test]
    fn test_format_output_single_line() {
        assert_eq!(format_output("next-version", "1.2.4"), "next-version=1.2.4\n");
    }

    #[test]
    fn test_format_output_multi_line() {
        assert_eq!(format_output("notes", "a\nb"), "notes<<EOF\na\nb\nEOF\n");
    }

    #[test]
    #[serial]
    fn test_set_output_appends_to_github_output() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "existing=1\n").unwrap();
        std::env::set_var("GITHUB_OUTPUT", file.path());

        set_output(NEXT_VERSION_OUTPUT, "2.0.1-alpha.0").unwrap();
        std::env::remove_var("GITHUB_OUTPUT");

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, "existing=1\nnext-version=2.0.1-alpha.0\n");
    }
}
