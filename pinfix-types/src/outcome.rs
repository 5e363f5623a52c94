use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal result of one pin run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealingOutcome {
    /// Target absent, or already pinned.
    NoChangeNeeded,
    /// Manifest rewritten; nothing committed.
    ManifestUpdated,
    /// Manifest rewritten, committed and pushed; no PR was opened.
    ManifestUpdatedAndCommitted,
    ManifestUpdatedPrCreated,
    /// Manifest rewritten, but a version-control step failed.
    PartialFailure,
}

impl HealingOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealingOutcome::NoChangeNeeded => "no_change_needed",
            HealingOutcome::ManifestUpdated => "manifest_updated",
            HealingOutcome::ManifestUpdatedAndCommitted => "manifest_updated_and_committed",
            HealingOutcome::ManifestUpdatedPrCreated => "manifest_updated_pr_created",
            HealingOutcome::PartialFailure => "partial_failure",
        }
    }

    /// True when the manifest on disk was (or in dry-run, would be) changed.
    pub fn manifest_changed(&self) -> bool {
        !matches!(self, HealingOutcome::NoChangeNeeded)
    }
}

impl fmt::Display for HealingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The externally observed version-control chain, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStep {
    VerifyRepository,
    CreateBranch,
    StageManifest,
    Commit,
    Push,
    OpenPullRequest,
}

impl PublishStep {
    pub const ALL: [PublishStep; 6] = [
        PublishStep::VerifyRepository,
        PublishStep::CreateBranch,
        PublishStep::StageManifest,
        PublishStep::Commit,
        PublishStep::Push,
        PublishStep::OpenPullRequest,
    ];

    /// 1-based position in the chain.
    pub fn index(&self) -> u8 {
        match self {
            PublishStep::VerifyRepository => 1,
            PublishStep::CreateBranch => 2,
            PublishStep::StageManifest => 3,
            PublishStep::Commit => 4,
            PublishStep::Push => 5,
            PublishStep::OpenPullRequest => 6,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PublishStep::VerifyRepository => "verify repository",
            PublishStep::CreateBranch => "create branch",
            PublishStep::StageManifest => "stage manifest",
            PublishStep::Commit => "commit",
            PublishStep::Push => "push",
            PublishStep::OpenPullRequest => "open pull request",
        }
    }

    /// Best-effort steps never turn the outcome into a failure.
    pub fn is_best_effort(&self) -> bool {
        matches!(self, PublishStep::OpenPullRequest)
    }
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.index(), self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded,
    Failed,
    Skipped,
}
