//! Port traits abstracting external processes away from the pipeline.

use camino::Utf8Path;

/// Version-control operations, each observed only through success or failure.
pub trait GitPort {
    /// Whether `repo_root` is inside a work tree. Errors mean "cannot tell".
    fn is_repository(&self, repo_root: &Utf8Path) -> anyhow::Result<bool>;
    fn branch_exists(&self, repo_root: &Utf8Path, branch: &str) -> anyhow::Result<bool>;
    /// Create `branch` and switch to it.
    fn create_branch(&self, repo_root: &Utf8Path, branch: &str) -> anyhow::Result<()>;
    /// Switch to an existing `branch`.
    fn switch_branch(&self, repo_root: &Utf8Path, branch: &str) -> anyhow::Result<()>;
    fn stage(&self, repo_root: &Utf8Path, path: &Utf8Path) -> anyhow::Result<()>;
    fn commit(&self, repo_root: &Utf8Path, message: &str) -> anyhow::Result<()>;
    /// Push `branch` to `remote` and set it as upstream.
    fn push_upstream(&self, repo_root: &Utf8Path, remote: &str, branch: &str)
    -> anyhow::Result<()>;
}

/// Pull request to open for a pushed branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
}

/// Result of a best-effort PR attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrOutcome {
    Created { url: Option<String> },
    /// The PR tool is not installed.
    ToolUnavailable { tool: String },
    /// The tool ran and failed (auth, no remote, PR already open...).
    Failed { message: String },
}

/// Optional PR-creation capability. Never fails the run.
pub trait PullRequestPort {
    fn open_pull_request(&self, repo_root: &Utf8Path, request: &PullRequest) -> PrOutcome;
}

/// File-system write operations for run artifacts.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
