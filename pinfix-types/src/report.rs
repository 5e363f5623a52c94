use crate::outcome::{HealingOutcome, PublishStep, StepStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinReport {
    pub schema: String,
    pub run_id: String,
    pub tool: ToolInfo,
    pub run: RunInfo,
    pub target: PinTarget,
    pub outcome: HealingOutcome,

    #[serde(default)]
    pub dry_run: bool,

    /// Dependency sections that were rewritten (`dependencies`, `devDependencies`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_change: Option<FileChange>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<PublishStepRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
}

impl PinReport {
    pub fn new(tool: ToolInfo, target: PinTarget) -> Self {
        Self {
            schema: crate::schema::PINFIX_REPORT_V1.to_string(),
            run_id: uuid::Uuid::new_v4().to_string(),
            tool,
            run: RunInfo {
                started_at: Some(Utc::now()),
                ended_at: None,
            },
            target,
            outcome: HealingOutcome::NoChangeNeeded,
            dry_run: false,
            sections: vec![],
            manifest_change: None,
            steps: vec![],
            pr_url: None,
        }
    }

    /// The first non-best-effort step that failed, if any.
    pub fn failed_step(&self) -> Option<&PublishStepRecord> {
        self.steps
            .iter()
            .find(|s| s.status == StepStatus::Failed && !s.step.is_best_effort())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinTarget {
    pub manifest: String,
    pub package: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub sha256_before: String,
    pub sha256_after: String,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishStepRecord {
    pub step: PublishStep,
    pub index: u8,
    pub status: StepStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PublishStepRecord {
    pub fn new(step: PublishStep, status: StepStatus, message: Option<String>) -> Self {
        Self {
            step,
            index: step.index(),
            status,
            message,
        }
    }
}
