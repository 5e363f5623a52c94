//! Default process- and filesystem-backed port implementations.

use crate::error::CommandError;
use crate::ports::{GitPort, PrOutcome, PullRequest, PullRequestPort, WritePort};
use anyhow::Context;
use camino::Utf8Path;
use fs_err as fs;
use std::io::ErrorKind;
use std::process::Command;
use tracing::debug;

/// Run `program args..` in `cwd`, returning stdout on a zero exit status.
///
/// Blocks until the program exits.
pub fn run_command(program: &str, args: &[&str], cwd: &Utf8Path) -> Result<String, CommandError> {
    debug!(program, ?args, cwd = %cwd, "run");
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                CommandError::NotFound {
                    program: program.to_string(),
                }
            } else {
                CommandError::Spawn {
                    program: program.to_string(),
                    source,
                }
            }
        })?;

    if !output.status.success() {
        return Err(CommandError::Exit {
            program: program.to_string(),
            args: args.join(" "),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Git operations via the `git` CLI.
#[derive(Debug, Clone)]
pub struct ShellGitPort {
    program: String,
}

impl Default for ShellGitPort {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl ShellGitPort {
    fn git(&self, repo_root: &Utf8Path, args: &[&str]) -> Result<String, CommandError> {
        run_command(&self.program, args, repo_root)
    }
}

impl GitPort for ShellGitPort {
    fn is_repository(&self, repo_root: &Utf8Path) -> anyhow::Result<bool> {
        match self.git(repo_root, &["rev-parse", "--is-inside-work-tree"]) {
            Ok(out) => Ok(out.trim() == "true"),
            Err(CommandError::Exit { stderr, .. }) => {
                debug!(%stderr, "not a git work tree");
                Ok(false)
            }
            Err(e) if e.is_not_found() => {
                debug!("git not installed");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn branch_exists(&self, repo_root: &Utf8Path, branch: &str) -> anyhow::Result<bool> {
        let reference = format!("refs/heads/{branch}");
        match self.git(repo_root, &["rev-parse", "--verify", "--quiet", &reference]) {
            Ok(_) => Ok(true),
            Err(CommandError::Exit { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn create_branch(&self, repo_root: &Utf8Path, branch: &str) -> anyhow::Result<()> {
        self.git(repo_root, &["checkout", "-b", branch])?;
        Ok(())
    }

    fn switch_branch(&self, repo_root: &Utf8Path, branch: &str) -> anyhow::Result<()> {
        self.git(repo_root, &["checkout", branch])?;
        Ok(())
    }

    fn stage(&self, repo_root: &Utf8Path, path: &Utf8Path) -> anyhow::Result<()> {
        self.git(repo_root, &["add", "--", path.as_str()])?;
        Ok(())
    }

    fn commit(&self, repo_root: &Utf8Path, message: &str) -> anyhow::Result<()> {
        self.git(repo_root, &["commit", "-m", message])?;
        Ok(())
    }

    fn push_upstream(
        &self,
        repo_root: &Utf8Path,
        remote: &str,
        branch: &str,
    ) -> anyhow::Result<()> {
        self.git(repo_root, &["push", "-u", remote, branch])?;
        Ok(())
    }
}

/// Pull requests via the GitHub CLI.
///
/// Availability is probed on `PATH` before each attempt.
#[derive(Debug, Clone)]
pub struct GhCliPort {
    program: String,
}

impl Default for GhCliPort {
    fn default() -> Self {
        Self::with_program("gh")
    }
}

impl GhCliPort {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }
}

impl PullRequestPort for GhCliPort {
    fn open_pull_request(&self, repo_root: &Utf8Path, request: &PullRequest) -> PrOutcome {
        if !self.is_available() {
            return PrOutcome::ToolUnavailable {
                tool: self.program.clone(),
            };
        }

        let args = [
            "pr",
            "create",
            "--title",
            request.title.as_str(),
            "--body",
            request.body.as_str(),
            "--head",
            request.head.as_str(),
        ];
        match run_command(&self.program, &args, repo_root) {
            Ok(stdout) => PrOutcome::Created {
                url: stdout
                    .lines()
                    .map(str::trim)
                    .rfind(|l| l.starts_with("http"))
                    .map(str::to_string),
            },
            Err(e) if e.is_not_found() => PrOutcome::ToolUnavailable {
                tool: self.program.clone(),
            },
            Err(e) => PrOutcome::Failed {
                message: e.to_string(),
            },
        }
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}
