//! Repository health checks: conventional files and a non-empty manifest.

use camino::Utf8Path;
use fs_err as fs;
use pinfix_types::health::{HealthIssue, HealthIssueKind, HealthReport};
use serde_json::Value;
use tracing::debug;

/// Files every repository is expected to carry.
pub const REQUIRED_FILES: [&str; 3] = [".gitignore", "README.md", "package.json"];

pub fn check_repo_health(repo_root: &Utf8Path) -> HealthReport {
    let mut report = HealthReport::new(repo_root.as_str());
    report.issues.extend(check_required_files(repo_root));
    report.issues.extend(check_dependencies(repo_root));
    debug!(issues = report.issues.len(), "health check finished");
    report
}

fn check_required_files(repo_root: &Utf8Path) -> Vec<HealthIssue> {
    REQUIRED_FILES
        .iter()
        .filter(|name| !repo_root.join(name).exists())
        .map(|name| HealthIssue {
            kind: HealthIssueKind::MissingFile,
            message: format!("Missing required file: {name}"),
        })
        .collect()
}

fn check_dependencies(repo_root: &Utf8Path) -> Option<HealthIssue> {
    let path = repo_root.join("package.json");
    if !path.exists() {
        return None;
    }

    let parsed = fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str::<Value>(&s).map_err(|e| e.to_string()));
    match parsed {
        Ok(pkg) => {
            let declares = |key: &str| pkg.get(key).is_some();
            if declares("dependencies") || declares("devDependencies") {
                None
            } else {
                Some(HealthIssue {
                    kind: HealthIssueKind::NoDependencies,
                    message: "No dependencies defined in package.json".to_string(),
                })
            }
        }
        Err(e) => Some(HealthIssue {
            kind: HealthIssueKind::UnreadableManifest,
            message: format!("Error reading package.json: {e}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        (temp, root)
    }

    fn kinds(report: &HealthReport) -> Vec<HealthIssueKind> {
        report.issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn empty_dir_reports_every_missing_file() {
        let (_temp, root) = temp_root();
        let report = check_repo_health(&root);
        assert_eq!(kinds(&report), vec![HealthIssueKind::MissingFile; 3]);
        assert_eq!(report.issues[0].message, "Missing required file: .gitignore");
    }

    #[test]
    fn complete_repo_is_healthy() {
        let (_temp, root) = temp_root();
        std::fs::write(root.join(".gitignore"), "node_modules\n").unwrap();
        std::fs::write(root.join("README.md"), "# app\n").unwrap();
        std::fs::write(root.join("package.json"), r#"{"devDependencies": {}}"#).unwrap();
        assert!(check_repo_health(&root).is_healthy());
    }

    #[test]
    fn manifest_without_dependency_sections_is_flagged() {
        let (_temp, root) = temp_root();
        std::fs::write(root.join("package.json"), r#"{"name": "app"}"#).unwrap();
        let report = check_repo_health(&root);
        assert!(kinds(&report).contains(&HealthIssueKind::NoDependencies));
    }

    #[test]
    fn malformed_manifest_is_unreadable() {
        let (_temp, root) = temp_root();
        std::fs::write(root.join("package.json"), "{").unwrap();
        let report = check_repo_health(&root);
        let issue = report
            .issues
            .iter()
            .find(|i| i.kind == HealthIssueKind::UnreadableManifest)
            .expect("unreadable issue");
        assert!(issue.message.starts_with("Error reading package.json:"));
    }
}
