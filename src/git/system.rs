//! System git backend
//!
//! Porcelain writes (merge, commit, push, stash, ...) go through the `git`
//! binary so they honor hooks, credential helpers and `--force-with-lease`.
//! Reads go through `git2`.

use crate::error::Result;
use crate::git::{FailureKind, GitFailure, GitResult, MergeStrategy, VersionControl};
use git2::{Repository as Git2Repo, StatusOptions};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Version control backed by the system `git` binary and libgit2
pub struct SystemGit {
    repo: Git2Repo,
    work_tree: PathBuf,
    identity: Option<(String, String)>,
}

impl SystemGit {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        let work_tree = repo
            .workdir()
            .ok_or_else(|| git2::Error::from_str("bare repositories have no working tree"))?
            .to_path_buf();

        Ok(SystemGit {
            repo,
            work_tree,
            identity: None,
        })
    }

    /// Commit as the given author instead of git's configured user
    pub fn with_identity(mut self, identity: Option<(String, String)>) -> Self {
        self.identity = identity;
        self
    }

    /// Create a git command rooted at the working tree
    fn git_cmd(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.work_tree);
        cmd.env("GIT_TERMINAL_PROMPT", "0");

        if let Some((name, email)) = &self.identity {
            cmd.arg("-c").arg(format!("user.name={}", name));
            cmd.arg("-c").arg(format!("user.email={}", email));
        }
        cmd.arg("-c").arg("core.quotePath=false");

        cmd
    }

    /// Run git with arguments, returning stdout
    fn run(&self, args: &[&str]) -> GitResult<String> {
        let command = args.join(" ");
        tracing::debug!(%command, "running git");

        let output = self.git_cmd().args(args).output().map_err(|e| {
            GitFailure::new(command.clone(), FailureKind::Command, e.to_string())
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let kind = classify_failure(args.first().copied().unwrap_or_default(), &stdout, &stderr);
        tracing::debug!(%command, ?kind, %stderr, "git failed");

        let detail = if stderr.is_empty() {
            stdout.trim().to_string()
        } else {
            stderr
        };
        Err(GitFailure::new(command, kind, detail))
    }

    fn read_failure(&self, command: String, e: git2::Error) -> GitFailure {
        GitFailure::new(command, FailureKind::Command, e.message().to_string())
    }
}

/// Map a failed git invocation onto a failure kind
fn classify_failure(subcommand: &str, stdout: &str, stderr: &str) -> FailureKind {
    match subcommand {
        "merge"
            if stdout.contains("CONFLICT")
                || stdout.contains("Automatic merge failed")
                || stderr.contains("CONFLICT") =>
        {
            FailureKind::Conflict
        }
        "push" if stderr.contains("[rejected]") || stderr.contains("stale info") => {
            FailureKind::Rejected
        }
        _ => FailureKind::Command,
    }
}

impl VersionControl for SystemGit {
    fn workdir(&self) -> &Path {
        &self.work_tree
    }

    fn fetch(&self, remote: &str, branches: &[&str]) -> GitResult<()> {
        let refspecs: Vec<String> = branches
            .iter()
            .map(|b| format!("+refs/heads/{}:refs/remotes/{}/{}", b, remote, b))
            .collect();

        let mut args = vec!["fetch", remote];
        args.extend(refspecs.iter().map(String::as_str));
        self.run(&args).map(|_| ())
    }

    fn rev_parse(&self, rev: &str) -> GitResult<String> {
        let object = self
            .repo
            .revparse_single(rev)
            .map_err(|e| self.read_failure(format!("rev-parse {}", rev), e))?;
        let commit = object
            .peel_to_commit()
            .map_err(|e| self.read_failure(format!("rev-parse {}", rev), e))?;
        Ok(commit.id().to_string())
    }

    fn show_file(&self, rev: &str, path: &Path) -> GitResult<String> {
        let spec = format!("{}:{}", rev, path.to_string_lossy().replace('\\', "/"));
        let command = format!("show {}", spec);

        let blob = self
            .repo
            .revparse_single(&spec)
            .and_then(|object| object.peel_to_blob())
            .map_err(|e| self.read_failure(command.clone(), e))?;

        String::from_utf8(blob.content().to_vec())
            .map_err(|e| GitFailure::new(command, FailureKind::Command, e.to_string()))
    }

    fn is_dirty(&self) -> GitResult<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut options))
            .map_err(|e| self.read_failure("status".to_string(), e))?;
        Ok(!statuses.is_empty())
    }

    fn checkout(&self, branch: &str, start_point: &str) -> GitResult<()> {
        self.run(&["checkout", "-B", branch, start_point]).map(|_| ())
    }

    fn merge(&self, rev: &str, message: &str, strategy: MergeStrategy) -> GitResult<()> {
        let mut args = vec!["merge", "--no-ff", "--no-edit", "-m", message];
        if strategy == MergeStrategy::PreferOurs {
            args.extend(["-X", "ours"]);
        }
        args.push(rev);
        self.run(&args).map(|_| ())
    }

    fn abort_merge(&self) -> GitResult<()> {
        self.run(&["merge", "--abort"]).map(|_| ())
    }

    fn reset_hard(&self, rev: &str) -> GitResult<()> {
        self.run(&["reset", "--hard", rev]).map(|_| ())
    }

    fn add(&self, path: &Path) -> GitResult<()> {
        let path = path.to_string_lossy().into_owned();
        self.run(&["add", "--", path.as_str()]).map(|_| ())
    }

    fn commit(&self, message: &str, allow_empty: bool) -> GitResult<()> {
        let mut args = vec!["commit", "-m", message];
        if allow_empty {
            args.push("--allow-empty");
        }
        self.run(&args).map(|_| ())
    }

    fn push(&self, remote: &str, branch: &str, lease: Option<&str>) -> GitResult<()> {
        let refspec = format!("refs/heads/{}:refs/heads/{}", branch, branch);
        match lease {
            Some(expected) => {
                let lease_arg = format!("--force-with-lease=refs/heads/{}:{}", branch, expected);
                self.run(&["push", lease_arg.as_str(), remote, refspec.as_str()]).map(|_| ())
            }
            None => self.run(&["push", remote, refspec.as_str()]).map(|_| ()),
        }
    }

    fn stash(&self) -> GitResult<bool> {
        let stdout = self.run(&["stash", "push", "-m", "release-train"])?;
        Ok(!stdout.contains("No local changes to save"))
    }

    fn stash_pop(&self) -> GitResult<()> {
        self.run(&["stash", "pop"]).map(|_| ())
    }
}
