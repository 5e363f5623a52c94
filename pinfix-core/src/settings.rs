//! Clap-free settings for the pin pipeline.

use camino::{Utf8Path, Utf8PathBuf};
use pinfix_edit::PinSpec;

pub const DEFAULT_MANIFEST: &str = "package.json";
pub const DEFAULT_BRANCH: &str = "pinfix/pin-dependency";
pub const DEFAULT_COMMIT_MESSAGE: &str = "chore(deps): pin dependency";
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_PR_COMMAND: &str = "gh";

/// Settings for one pin run.
#[derive(Debug, Clone)]
pub struct PinSettings {
    pub repo_root: Utf8PathBuf,
    /// Manifest path, relative to `repo_root` unless absolute.
    pub manifest: Utf8PathBuf,
    pub pin: PinSpec,

    /// Compute and preview the change without writing or publishing.
    pub dry_run: bool,
    pub publish: PublishSettings,
}

impl PinSettings {
    pub fn new(pin: PinSpec) -> Self {
        Self {
            repo_root: Utf8PathBuf::from("."),
            manifest: Utf8PathBuf::from(DEFAULT_MANIFEST),
            pin,
            dry_run: false,
            publish: PublishSettings::default(),
        }
    }

    pub fn manifest_path(&self) -> Utf8PathBuf {
        abs_path(&self.repo_root, &self.manifest)
    }
}

/// Settings for the version-control chain that follows a rewrite.
#[derive(Debug, Clone)]
pub struct PublishSettings {
    pub enabled: bool,
    pub branch: String,
    pub commit_message: String,
    pub remote: String,
    pub pr_title: Option<String>,
    pub pr_body: Option<String>,
    /// Switch to the branch if it already exists instead of failing.
    pub reuse_existing_branch: bool,
    pub pr_command: String,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            branch: DEFAULT_BRANCH.to_string(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            remote: DEFAULT_REMOTE.to_string(),
            pr_title: None,
            pr_body: None,
            reuse_existing_branch: false,
            pr_command: DEFAULT_PR_COMMAND.to_string(),
        }
    }
}

impl PublishSettings {
    pub fn pr_title(&self) -> &str {
        self.pr_title.as_deref().unwrap_or(&self.commit_message)
    }

    pub fn pr_body(&self, pin: &PinSpec) -> String {
        match &self.pr_body {
            Some(body) => body.clone(),
            None => format!(
                "Pins `{}` to `{}` in the package manifest.",
                pin.package, pin.version
            ),
        }
    }
}

pub(crate) fn abs_path(repo_root: &Utf8Path, rel: &Utf8Path) -> Utf8PathBuf {
    if rel.is_absolute() {
        rel.to_path_buf()
    } else {
        repo_root.join(rel)
    }
}
