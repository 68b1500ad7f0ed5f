//! Trigger context read from the CI platform
//!
//! In GitHub Actions the ref comes from `GITHUB_REF` and the pull request
//! from the webhook payload stored at `GITHUB_EVENT_PATH`. Both can be
//! overridden from the command line for local runs.

use crate::error::{ReleaseTrainError, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Read-only snapshot of the pull request that triggered the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestContext {
    pub number: u64,
    /// Source (head) branch ref of the pull request
    pub source_ref: String,
    pub labels: BTreeSet<String>,
}

/// Everything the engine needs to know about the trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerContext {
    pub git_ref: String,
    pub pull_request: Option<PullRequestContext>,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default)]
    pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
    #[serde(default)]
    labels: Vec<LabelPayload>,
    head: HeadPayload,
}

#[derive(Debug, Deserialize)]
struct LabelPayload {
    name: String,
}

#[derive(Debug, Deserialize)]
struct HeadPayload {
    #[serde(rename = "ref")]
    ref_name: String,
}

/// Explicit values that take precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct ContextOverrides {
    pub git_ref: Option<String>,
    pub event_path: Option<String>,
    pub head_ref: Option<String>,
    pub labels: Vec<String>,
}

impl TriggerContext {
    /// Build the trigger context from overrides and the GitHub Actions environment
    ///
    /// # Returns
    /// * `Ok(TriggerContext)` - Context with an optional pull request
    /// * `Err` - If no ref is known or the event payload cannot be read
    pub fn load(overrides: &ContextOverrides) -> Result<Self> {
        let git_ref = overrides
            .git_ref
            .clone()
            .or_else(|| std::env::var("GITHUB_REF").ok())
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                ReleaseTrainError::context("No trigger ref: pass --ref or set GITHUB_REF")
            })?;

        let event_path = overrides
            .event_path
            .clone()
            .or_else(|| std::env::var("GITHUB_EVENT_PATH").ok())
            .filter(|p| !p.is_empty());

        let mut pull_request = match event_path {
            Some(path) => read_pull_request(Path::new(&path))?,
            None => None,
        };

        if let Some(head_ref) = &overrides.head_ref {
            let pr = pull_request.get_or_insert_with(|| PullRequestContext {
                number: 0,
                source_ref: String::new(),
                labels: BTreeSet::new(),
            });
            pr.source_ref = head_ref.clone();
        }

        if !overrides.labels.is_empty() {
            if let Some(pr) = pull_request.as_mut() {
                pr.labels.extend(overrides.labels.iter().cloned());
            } else {
                return Err(ReleaseTrainError::context(
                    "--label requires a pull request (event payload or --head-ref)",
                ));
            }
        }

        Ok(TriggerContext {
            git_ref,
            pull_request,
        })
    }
}

/// Extract the pull request snapshot from a webhook payload file
pub fn read_pull_request(path: &Path) -> Result<Option<PullRequestContext>> {
    let content = fs::read_to_string(path).map_err(|e| {
        ReleaseTrainError::context(format!(
            "Cannot read event payload '{}': {}",
            path.display(),
            e
        ))
    })?;
    parse_pull_request(&content)
}

/// Parse the pull request part of a webhook payload
pub fn parse_pull_request(payload: &str) -> Result<Option<PullRequestContext>> {
    let event: EventPayload = serde_json::from_str(payload)?;

    Ok(event.pull_request.map(|pr| PullRequestContext {
        number: pr.number,
        source_ref: pr.head.ref_name,
        labels: pr.labels.into_iter().map(|label| label.name).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pull_request_payload() {
        let payload = r#"{
            "action": "closed",
            "pull_request": {
                "number": 42,
                "merged": true,
                "labels": [{"id": 1, "name": "minor"}, {"id": 2, "name": "docs"}],
                "head": {"ref": "alpha/hotfix", "sha": "abc"},
                "base": {"ref": "alpha"}
            }
        }"#;

        let pr = parse_pull_request(payload).unwrap().unwrap();
        assert_eq!(pr.number, 42);
        assert_eq!(pr.source_ref, "alpha/hotfix");
        assert!(pr.labels.contains("minor"));
        assert!(pr.labels.contains("docs"));
    }

    #[test]
    fn test_parse_push_payload_has_no_pull_request() {
        let payload = r#"{"ref": "refs/heads/main", "commits": []}"#;
        assert_eq!(parse_pull_request(payload).unwrap(), None);
    }

    #[test]
    fn test_parse_pull_request_without_labels() {
        let payload = r#"{"pull_request": {"number": 1, "head": {"ref": "beta"}}}"#;
        let pr = parse_pull_request(payload).unwrap().unwrap();
        assert!(pr.labels.is_empty());
    }

    #[test]
    fn test_parse_invalid_payload() {
        assert!(parse_pull_request("not json").is_err());
    }

    #[test]
    fn test_load_with_overrides_only() {
        let overrides = ContextOverrides {
            git_ref: Some("refs/heads/feature/x".to_string()),
            event_path: Some(String::new()),
            head_ref: Some("refs/heads/alpha".to_string()),
            labels: vec!["patch".to_string()],
        };

        let context = TriggerContext::load(&overrides).unwrap();
        assert_eq!(context.git_ref, "refs/heads/feature/x");
        let pr = context.pull_request.unwrap();
        assert_eq!(pr.source_ref, "refs/heads/alpha");
        assert!(pr.labels.contains("patch"));
    }
}
