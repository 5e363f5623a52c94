//! Configuration file loading for pinfix.
//!
//! Discovers and loads `pinfix.toml` from the repository root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use pinfix_core::PinSpec;
use pinfix_core::settings::{PinSettings, PublishSettings};
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "pinfix.toml";

/// Top-level configuration from pinfix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PinfixConfig {
    /// What to pin.
    pub pin: PinConfig,

    /// How to publish the change.
    pub publish: PublishConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PinConfig {
    pub package: Option<String>,
    pub version: Option<String>,
    /// Manifest path relative to the repository root.
    pub manifest: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    pub enabled: Option<bool>,
    pub branch: Option<String>,
    pub commit_message: Option<String>,
    pub remote: Option<String>,
    pub pr_title: Option<String>,
    pub pr_body: Option<String>,
    pub reuse_existing_branch: bool,
    /// Program used to open pull requests (default `gh`).
    pub pr_command: Option<String>,
}

/// Discover the pinfix.toml config file.
///
/// Returns `None` if no config file is found in the repository root.
pub fn discover_config(repo_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = repo_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<PinfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<PinfixConfig> {
    let config: PinfixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from repo root, or return default if not found.
pub fn load_or_default(repo_root: &Utf8Path) -> anyhow::Result<PinfixConfig> {
    match discover_config(repo_root) {
        Some(path) => load_config(&path),
        None => Ok(PinfixConfig::default()),
    }
}

/// CLI values that override the config file when present.
#[derive(Debug, Clone, Default)]
pub struct PinOverrides {
    pub repo_root: Utf8PathBuf,
    pub manifest: Option<Utf8PathBuf>,
    pub package: Option<String>,
    pub version: Option<String>,
    pub dry_run: bool,
    pub no_publish: bool,
    pub branch: Option<String>,
    pub commit_message: Option<String>,
    pub remote: Option<String>,
    pub reuse_branch: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: PinfixConfig,
}

impl ConfigMerger {
    pub fn new(config: PinfixConfig) -> Self {
        Self { config }
    }

    /// Merge with `pin` command arguments.
    ///
    /// Fails when neither source names the package and version to pin.
    pub fn merge_pin_args(self, cli: PinOverrides) -> anyhow::Result<PinSettings> {
        let PinfixConfig { pin, publish } = self.config;

        let package = cli.package.or(pin.package).context(
            "no target package configured; pass --package or set [pin].package in pinfix.toml",
        )?;
        let version = cli.version.or(pin.version).context(
            "no target version configured; pass --to or set [pin].version in pinfix.toml",
        )?;

        let defaults = PublishSettings::default();
        let publish = PublishSettings {
            enabled: !cli.no_publish && publish.enabled.unwrap_or(defaults.enabled),
            branch: cli.branch.or(publish.branch).unwrap_or(defaults.branch),
            commit_message: cli
                .commit_message
                .or(publish.commit_message)
                .unwrap_or(defaults.commit_message),
            remote: cli.remote.or(publish.remote).unwrap_or(defaults.remote),
            pr_title: publish.pr_title,
            pr_body: publish.pr_body,
            reuse_existing_branch: cli.reuse_branch || publish.reuse_existing_branch,
            pr_command: publish.pr_command.unwrap_or(defaults.pr_command),
        };

        let mut settings = PinSettings::new(PinSpec::new(package, version));
        settings.repo_root = cli.repo_root;
        if let Some(manifest) = cli.manifest.or(pin.manifest) {
            settings.manifest = manifest;
        }
        settings.dry_run = cli.dry_run;
        settings.publish = publish;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinfix_core::settings::{DEFAULT_BRANCH, DEFAULT_MANIFEST, DEFAULT_REMOTE};
    use tempfile::TempDir;

    fn overrides() -> PinOverrides {
        PinOverrides {
            repo_root: Utf8PathBuf::from("."),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_full_config() {
        let contents = r#"
[pin]
package = "target-pkg"
version = "^3.0.80"
manifest = "web/package.json"

[publish]
enabled = true
branch = "deps/pin-target"
commit_message = "fix(deps): pin target-pkg"
remote = "upstream"
pr_title = "Pin target-pkg"
pr_body = "Automated pin."
reuse_existing_branch = true
pr_command = "gh"
"#;
        let config = parse_config(contents).unwrap();
        assert_eq!(config.pin.package.as_deref(), Some("target-pkg"));
        assert_eq!(config.pin.manifest.as_deref(), Some(Utf8Path::new("web/package.json")));
        assert_eq!(config.publish.remote.as_deref(), Some("upstream"));
        assert!(config.publish.reuse_existing_branch);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert!(config.pin.package.is_none());
        assert!(config.publish.enabled.is_none());
        assert!(!config.publish.reuse_existing_branch);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = parse_config("[pin]\npackages = \"x\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("invalid TOML"));
    }

    #[test]
    fn test_merge_uses_defaults() {
        let mut cli = overrides();
        cli.package = Some("a".to_string());
        cli.version = Some("1.0.0".to_string());
        let settings = ConfigMerger::new(PinfixConfig::default())
            .merge_pin_args(cli)
            .unwrap();
        assert_eq!(settings.manifest, Utf8PathBuf::from(DEFAULT_MANIFEST));
        assert_eq!(settings.publish.branch, DEFAULT_BRANCH);
        assert_eq!(settings.publish.remote, DEFAULT_REMOTE);
        assert!(settings.publish.enabled);
        assert!(!settings.dry_run);
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = parse_config(
            r#"
[pin]
package = "from-config"
version = "1.0.0"

[publish]
branch = "config-branch"
enabled = true
"#,
        )
        .unwrap();
        let mut cli = overrides();
        cli.package = Some("from-cli".to_string());
        cli.branch = Some("cli-branch".to_string());
        cli.no_publish = true;

        let settings = ConfigMerger::new(config).merge_pin_args(cli).unwrap();
        assert_eq!(settings.pin.package, "from-cli");
        assert_eq!(settings.pin.version, "1.0.0");
        assert_eq!(settings.publish.branch, "cli-branch");
        assert!(!settings.publish.enabled);
    }

    #[test]
    fn test_missing_package_is_an_error() {
        let mut cli = overrides();
        cli.version = Some("1.0.0".to_string());
        let err = ConfigMerger::new(PinfixConfig::default())
            .merge_pin_args(cli)
            .unwrap_err();
        assert!(err.to_string().contains("no target package configured"));
    }

    #[test]
    fn test_missing_version_is_an_error() {
        let mut cli = overrides();
        cli.package = Some("a".to_string());
        let err = ConfigMerger::new(PinfixConfig::default())
            .merge_pin_args(cli)
            .unwrap_err();
        assert!(err.to_string().contains("no target version configured"));
    }

    #[test]
    fn test_discover_config_some_and_none() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        assert!(discover_config(&root).is_none());

        std::fs::write(root.join(CONFIG_FILE_NAME), "").expect("write config");
        assert!(discover_config(&root).is_some());
    }

    #[test]
    fn test_load_or_default_returns_default_when_missing() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let cfg = load_or_default(&root).expect("load default");
        assert!(cfg.pin.package.is_none());
        assert!(cfg.publish.branch.is_none());
    }
}
