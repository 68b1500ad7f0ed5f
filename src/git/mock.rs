use crate::git::{FailureKind, GitFailure, GitResult, MergeStrategy, VersionControl};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

/// Mock version control for testing without actual git operations
///
/// Mutating calls are recorded in git argv form (`"checkout -B beta origin/beta"`),
/// reads are not. Failures are scripted per operation and consumed in order.
/// The working tree is a real directory so manifests can be read and written.
pub struct MockVersionControl {
    workdir: PathBuf,
    state: RefCell<MockState>,
}

#[derive(Default)]
struct MockState {
    calls: Vec<String>,
    commit_messages: Vec<String>,
    merge_messages: Vec<String>,
    failures: HashMap<&'static str, VecDeque<Option<FailureKind>>>,
    revs: HashMap<String, String>,
    files_at: HashMap<(String, PathBuf), String>,
    branch_files: HashMap<String, Vec<(PathBuf, String)>>,
    merge_writes: VecDeque<(PathBuf, String)>,
    dirty: bool,
    stash_finds_nothing: bool,
}

impl MockVersionControl {
    /// Create a mock rooted at an existing directory
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        MockVersionControl {
            workdir: workdir.into(),
            state: RefCell::new(MockState::default()),
        }
    }

    /// Make the next call of `op` fail
    ///
    /// `op` is one of `fetch`, `checkout`, `merge`, `abort_merge`, `reset`,
    /// `add`, `commit`, `push`, `stash`, `stash_pop`.
    pub fn fail_on(&self, op: &'static str, kind: FailureKind) {
        self.state
            .borrow_mut()
            .failures
            .entry(op)
            .or_default()
            .push_back(Some(kind));
    }

    /// Let the next call of `op` succeed before any later scripted failure
    pub fn pass_on(&self, op: &'static str) {
        self.state
            .borrow_mut()
            .failures
            .entry(op)
            .or_default()
            .push_back(None);
    }

    /// Commit id returned by `rev_parse` for a revision
    pub fn set_rev(&self, rev: impl Into<String>, sha: impl Into<String>) {
        self.state.borrow_mut().revs.insert(rev.into(), sha.into());
    }

    /// File content returned by `show_file`
    pub fn set_file_at(
        &self,
        rev: impl Into<String>,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
    ) {
        self.state
            .borrow_mut()
            .files_at
            .insert((rev.into(), path.into()), content.into());
    }

    /// File written into the working tree whenever `branch` is checked out
    pub fn set_branch_file(
        &self,
        branch: impl Into<String>,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
    ) {
        self.state
            .borrow_mut()
            .branch_files
            .entry(branch.into())
            .or_default()
            .push((path.into(), content.into()));
    }

    /// File written into the working tree by the next successful merge
    pub fn write_on_merge(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.state
            .borrow_mut()
            .merge_writes
            .push_back((path.into(), content.into()));
    }

    pub fn set_dirty(&self, dirty: bool) {
        self.state.borrow_mut().dirty = dirty;
    }

    /// Simulate `git stash` reporting "No local changes to save"
    pub fn set_stash_finds_nothing(&self, nothing: bool) {
        self.state.borrow_mut().stash_finds_nothing = nothing;
    }

    /// Recorded mutating calls, in order
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn commit_messages(&self) -> Vec<String> {
        self.state.borrow().commit_messages.clone()
    }

    pub fn merge_messages(&self) -> Vec<String> {
        self.state.borrow().merge_messages.clone()
    }

    fn record(&self, op: &'static str, call: String) -> GitResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call.clone());
        match state.failures.get_mut(op).and_then(VecDeque::pop_front).flatten() {
            Some(kind) => Err(GitFailure::new(call, kind, format!("scripted {:?} failure", kind))),
            None => Ok(()),
        }
    }

    fn write(&self, path: &Path, content: &str) -> GitResult<()> {
        std::fs::write(self.workdir.join(path), content).map_err(|e| {
            GitFailure::new(
                format!("write {}", path.display()),
                FailureKind::Command,
                e.to_string(),
            )
        })
    }
}

impl VersionControl for MockVersionControl {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn fetch(&self, remote: &str, branches: &[&str]) -> GitResult<()> {
        self.record("fetch", format!("fetch {} {}", remote, branches.join(" ")))
    }

    fn rev_parse(&self, rev: &str) -> GitResult<String> {
        Ok(self
            .state
            .borrow()
            .revs
            .get(rev)
            .cloned()
            .unwrap_or_else(|| format!("sha-{}", rev)))
    }

    fn show_file(&self, rev: &str, path: &Path) -> GitResult<String> {
        self.state
            .borrow()
            .files_at
            .get(&(rev.to_string(), path.to_path_buf()))
            .cloned()
            .ok_or_else(|| {
                GitFailure::new(
                    format!("show {}:{}", rev, path.display()),
                    FailureKind::Command,
                    "path does not exist",
                )
            })
    }

    fn is_dirty(&self) -> GitResult<bool> {
        Ok(self.state.borrow().dirty)
    }

    fn checkout(&self, branch: &str, start_point: &str) -> GitResult<()> {
        self.record("checkout", format!("checkout -B {} {}", branch, start_point))?;
        let files = self
            .state
            .borrow()
            .branch_files
            .get(branch)
            .cloned()
            .unwrap_or_default();
        for (path, content) in files {
            self.write(&path, &content)?;
        }
        Ok(())
    }

    fn merge(&self, rev: &str, message: &str, strategy: MergeStrategy) -> GitResult<()> {
        let call = match strategy {
            MergeStrategy::Default => format!("merge --no-ff {}", rev),
            MergeStrategy::PreferOurs => format!("merge --no-ff -X ours {}", rev),
        };
        self.state.borrow_mut().merge_messages.push(message.to_string());
        self.record("merge", call)?;

        let pending: Vec<_> = self.state.borrow_mut().merge_writes.drain(..).collect();
        for (path, content) in pending {
            self.write(&path, &content)?;
        }
        Ok(())
    }

    fn abort_merge(&self) -> GitResult<()> {
        self.record("abort_merge", "merge --abort".to_string())
    }

    fn reset_hard(&self, rev: &str) -> GitResult<()> {
        self.record("reset", format!("reset --hard {}", rev))
    }

    fn add(&self, path: &Path) -> GitResult<()> {
        self.record("add", format!("add {}", path.display()))
    }

    fn commit(&self, message: &str, allow_empty: bool) -> GitResult<()> {
        let call = if allow_empty {
            "commit --allow-empty".to_string()
        } else {
            "commit".to_string()
        };
        self.record("commit", call)?;
        self.state
            .borrow_mut()
            .commit_messages
            .push(message.to_string());
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str, lease: Option<&str>) -> GitResult<()> {
        let call = match lease {
            Some(expected) => format!(
                "push --force-with-lease={}:{} {} {}",
                branch, expected, remote, branch
            ),
            None => format!("push {} {}", remote, branch),
        };
        self.record("push", call)
    }

    fn stash(&self) -> GitResult<bool> {
        self.record("stash", "stash push".to_string())?;
        let mut state = self.state.borrow_mut();
        if state.stash_finds_nothing {
            return Ok(false);
        }
        state.dirty = false;
        Ok(true)
    }

    fn stash_pop(&self) -> GitResult<()> {
        self.record("stash_pop", "stash pop".to_string())?;
        self.state.borrow_mut().dirty = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mock_records_mutating_calls_only() {
        let temp = TempDir::new().unwrap();
        let vcs = MockVersionControl::new(temp.path());

        vcs.fetch("origin", &["main", "beta"]).unwrap();
        let _ = vcs.rev_parse("origin/beta").unwrap();
        vcs.push("origin", "beta", Some("abc")).unwrap();

        assert_eq!(
            vcs.calls(),
            vec![
                "fetch origin main beta",
                "push --force-with-lease=beta:abc origin beta"
            ]
        );
    }

    #[test]
    fn test_mock_scripted_failure_is_consumed_once() {
        let temp = TempDir::new().unwrap();
        let vcs = MockVersionControl::new(temp.path());
        vcs.fail_on("merge", FailureKind::Conflict);

        let first = vcs.merge("origin/beta", "msg", MergeStrategy::Default);
        assert!(first.unwrap_err().is_conflict());
        assert!(vcs.merge("origin/beta", "msg", MergeStrategy::PreferOurs).is_ok());
    }

    #[test]
    fn test_mock_pass_on_delays_failure() {
        let temp = TempDir::new().unwrap();
        let vcs = MockVersionControl::new(temp.path());
        vcs.pass_on("push");
        vcs.fail_on("push", FailureKind::Rejected);

        assert!(vcs.push("origin", "main", None).is_ok());
        assert!(vcs.push("origin", "beta", Some("abc")).unwrap_err().is_rejected());
        assert!(vcs.push("origin", "beta", Some("abc")).is_ok());
    }

    #[test]
    fn test_mock_rev_parse_defaults() {
        let temp = TempDir::new().unwrap();
        let vcs = MockVersionControl::new(temp.path());
        vcs.set_rev("origin/alpha", "1234");

        assert_eq!(vcs.rev_parse("origin/alpha").unwrap(), "1234");
        assert_eq!(vcs.rev_parse("origin/beta").unwrap(), "sha-origin/beta");
    }

    #[test]
    fn test_mock_branch_files_written_on_checkout() {
        let temp = TempDir::new().unwrap();
        let vcs = MockVersionControl::new(temp.path());
        vcs.set_branch_file("alpha", "package.json", "{}");

        vcs.checkout("alpha", "origin/alpha").unwrap();

        assert_eq!(
            std::fs::read_to_string(temp.path().join("package.json")).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_mock_show_file_missing() {
        let temp = TempDir::new().unwrap();
        let vcs = MockVersionControl::new(temp.path());
        assert!(vcs
            .show_file("origin/beta", Path::new("package.json"))
            .is_err());
    }
}
