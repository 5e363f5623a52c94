use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub schema: String,
    pub root: String,

    #[serde(default)]
    pub issues: Vec<HealthIssue>,
}

impl HealthReport {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            schema: crate::schema::PINFIX_HEALTH_V1.to_string(),
            root: root.into(),
            issues: vec![],
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthIssue {
    pub kind: HealthIssueKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthIssueKind {
    MissingFile,
    NoDependencies,
    UnreadableManifest,
}
