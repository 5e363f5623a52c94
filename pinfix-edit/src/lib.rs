//! Edit engine for pinfix.
//!
//! Responsibilities:
//! - Load a `package.json` manifest, preserving key order.
//! - Detect whether a dependency is pinned to a required constraint.
//! - Apply the pin in memory and persist it (two-space indent, one trailing newline).
//! - Generate a unified diff preview.

pub mod error;

pub use error::{ManifestError, ManifestResult};

use camino::{Utf8Path, Utf8PathBuf};
use diffy::PatchFormatter;
use fs_err as fs;
use pinfix_types::report::FileChange;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use tracing::debug;

/// Dependency sections inspected and rewritten, in this order.
pub const DEPENDENCY_SECTIONS: [&str; 2] = ["dependencies", "devDependencies"];

/// A package name and the exact constraint it must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinSpec {
    pub package: String,
    pub version: String,
}

impl PinSpec {
    pub fn new(package: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            version: version.into(),
        }
    }
}

/// A parsed manifest plus the bytes it was loaded from.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: Utf8PathBuf,
    original: String,
    doc: Map<String, Value>,
}

/// Read and parse the manifest at `path`.
pub fn load_manifest(path: &Utf8Path) -> ManifestResult<Manifest> {
    let original = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ManifestError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(source) => return Err(ManifestError::Io { source }),
    };
    Manifest::parse(path, original)
}

impl Manifest {
    /// Parse manifest contents that were read from `path`.
    pub fn parse(path: &Utf8Path, original: String) -> ManifestResult<Self> {
        let value: Value =
            serde_json::from_str(&original).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let Value::Object(doc) = value else {
            return Err(ManifestError::NotAnObject {
                path: path.to_path_buf(),
            });
        };
        debug!(path = %path, bytes = original.len(), "loaded manifest");
        Ok(Self {
            path: path.to_path_buf(),
            original,
            doc,
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The contents as they were on disk when loaded.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Current constraint for `package` in `section`, if that section is an
    /// object containing the key.
    pub fn constraint(&self, section: &str, package: &str) -> Option<&Value> {
        self.doc.get(section)?.as_object()?.get(package)
    }

    /// Sections (of [`DEPENDENCY_SECTIONS`]) that declare `package`.
    pub fn sections_declaring(&self, package: &str) -> Vec<&'static str> {
        DEPENDENCY_SECTIONS
            .into_iter()
            .filter(|section| self.constraint(section, package).is_some())
            .collect()
    }

    /// True iff the package is declared in some section with a value other
    /// than the required constraint.
    pub fn detect_mismatch(&self, pin: &PinSpec) -> bool {
        DEPENDENCY_SECTIONS.into_iter().any(|section| {
            self.constraint(section, &pin.package)
                .is_some_and(|v| v.as_str() != Some(pin.version.as_str()))
        })
    }

    /// Overwrite the package's constraint in every section that declares it.
    ///
    /// In-memory only. Returns the sections that were written.
    pub fn apply_pin(&mut self, pin: &PinSpec) -> Vec<&'static str> {
        let mut touched = Vec::new();
        for section in DEPENDENCY_SECTIONS {
            let Some(deps) = self.doc.get_mut(section).and_then(Value::as_object_mut) else {
                continue;
            };
            if let Some(slot) = deps.get_mut(&pin.package) {
                debug!(section, package = %pin.package, from = %slot, to = %pin.version, "pin");
                *slot = Value::String(pin.version.clone());
                touched.push(section);
            }
        }
        touched
    }

    /// Serialized form: two-space indentation and exactly one trailing newline.
    pub fn render(&self) -> ManifestResult<String> {
        let mut out =
            serde_json::to_string_pretty(&self.doc).map_err(|source| ManifestError::Serialize {
                path: self.path.clone(),
                source,
            })?;
        out.push('\n');
        Ok(out)
    }

    /// Write the current document back to the path it was loaded from.
    ///
    /// Overwrites unconditionally.
    pub fn persist(&self) -> ManifestResult<FileChange> {
        let rendered = self.render()?;
        fs::write(&self.path, &rendered).map_err(|source| ManifestError::Io { source })?;
        debug!(path = %self.path, bytes = rendered.len(), "wrote manifest");
        Ok(file_change(&self.path, &self.original, &rendered))
    }
}

/// Describe a change from `before` to `after` for reporting.
pub fn file_change(path: &Utf8Path, before: &str, after: &str) -> FileChange {
    FileChange {
        path: path.to_string(),
        sha256_before: sha256_hex(before.as_bytes()),
        sha256_after: sha256_hex(after.as_bytes()),
        bytes_before: before.len() as u64,
        bytes_after: after.len() as u64,
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Unified diff between two versions of one file; empty when they are equal.
pub fn render_patch(path: &Utf8Path, before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
    out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

    let patch = diffy::create_patch(before, after);
    let formatted = PatchFormatter::new().fmt_patch(&patch).to_string();
    // diffy repeats the ---/+++ header; keep only the hunks.
    let hunks = formatted
        .find("\n@@")
        .map(|i| &formatted[i + 1..])
        .unwrap_or(formatted.as_str());
    out.push_str(hunks);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn manifest(src: &str) -> Manifest {
        Manifest::parse(Utf8Path::new("package.json"), src.to_string()).expect("parse")
    }

    fn pin() -> PinSpec {
        PinSpec::new("target-pkg", "^3.0.80")
    }

    #[test]
    fn mismatch_in_dependencies() {
        let m = manifest(r#"{"dependencies": {"target-pkg": "^1.0.0"}}"#);
        assert!(m.detect_mismatch(&pin()));
    }

    #[test]
    fn mismatch_in_dev_dependencies_only() {
        let m = manifest(r#"{"devDependencies": {"target-pkg": "~2"}}"#);
        assert!(m.detect_mismatch(&pin()));
        assert_eq!(m.sections_declaring("target-pkg"), vec!["devDependencies"]);
    }

    #[test]
    fn absent_package_is_not_a_mismatch() {
        let m = manifest(r#"{"dependencies": {"other": "1.0.0"}}"#);
        assert!(!m.detect_mismatch(&pin()));
    }

    #[test]
    fn already_pinned_is_not_a_mismatch() {
        let m = manifest(
            r#"{"dependencies": {"target-pkg": "^3.0.80"}, "devDependencies": {"target-pkg": "^3.0.80"}}"#,
        );
        assert!(!m.detect_mismatch(&pin()));
    }

    #[test]
    fn non_string_constraint_is_a_mismatch() {
        let m = manifest(r#"{"dependencies": {"target-pkg": 3}}"#);
        assert!(m.detect_mismatch(&pin()));
    }

    #[test]
    fn non_object_section_is_treated_as_absent() {
        let mut m = manifest(r#"{"dependencies": ["target-pkg"]}"#);
        assert!(!m.detect_mismatch(&pin()));
        assert!(m.apply_pin(&pin()).is_empty());
    }

    #[test]
    fn apply_pin_rewrites_both_sections() {
        let mut m = manifest(
            r#"{"dependencies": {"target-pkg": "^1.0.0"}, "devDependencies": {"target-pkg": "^2.0.0"}}"#,
        );
        let touched = m.apply_pin(&pin());
        assert_eq!(touched, vec!["dependencies", "devDependencies"]);
        assert_eq!(
            m.constraint("dependencies", "target-pkg"),
            Some(&Value::String("^3.0.80".to_string()))
        );
        assert_eq!(
            m.constraint("devDependencies", "target-pkg"),
            Some(&Value::String("^3.0.80".to_string()))
        );
        assert!(!m.detect_mismatch(&pin()));
    }

    #[test]
    fn render_uses_two_spaces_and_one_newline() {
        let mut m = manifest(r#"{"dependencies": {"target-pkg": "^1.0.0"}}"#);
        m.apply_pin(&pin());
        assert_eq!(
            m.render().unwrap(),
            "{\n  \"dependencies\": {\n    \"target-pkg\": \"^3.0.80\"\n  }\n}\n"
        );
    }

    #[test]
    fn unrelated_numbers_survive_a_pin() {
        let mut m = manifest(
            r#"{"x": 123456789012345678901234, "ratio": 2.50, "dependencies": {"target-pkg": "^1.0.0"}}"#,
        );
        m.apply_pin(&pin());
        let out = m.render().unwrap();
        assert!(out.contains("\"x\": 123456789012345678901234,"), "{out}");
        assert!(out.contains("\"ratio\": 2.50,"), "{out}");
    }

    #[test]
    fn render_preserves_key_order() {
        let m = manifest(
            r#"{"name": "x", "version": "1.0.0", "dependencies": {"z": "1", "a": "2"}}"#,
        );
        let out = m.render().unwrap();
        let name = out.find("\"name\"").unwrap();
        let version = out.find("\"version\"").unwrap();
        let z = out.find("\"z\"").unwrap();
        let a = out.find("\"a\"").unwrap();
        assert!(name < version);
        assert!(z < a);
    }

    #[test]
    fn top_level_array_is_rejected() {
        let err = Manifest::parse(Utf8Path::new("package.json"), "[]".to_string()).unwrap_err();
        assert!(matches!(err, ManifestError::NotAnObject { .. }));
        assert!(err.is_input_error());
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err =
            Manifest::parse(Utf8Path::new("package.json"), "{ nope".to_string()).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn patch_is_empty_for_identical_content() {
        assert_eq!(render_patch(Utf8Path::new("package.json"), "a\n", "a\n"), "");
    }

    #[test]
    fn patch_shows_the_pinned_line() {
        let before = "{\n  \"dependencies\": {\n    \"target-pkg\": \"^1.0.0\"\n  }\n}\n";
        let after = "{\n  \"dependencies\": {\n    \"target-pkg\": \"^3.0.80\"\n  }\n}\n";
        let patch = render_patch(Utf8Path::new("package.json"), before, after);
        assert!(patch.starts_with("diff --git a/package.json b/package.json\n"));
        assert!(patch.contains("-    \"target-pkg\": \"^1.0.0\""));
        assert!(patch.contains("+    \"target-pkg\": \"^3.0.80\""));
        assert_eq!(patch.matches("+++ b/package.json").count(), 1);
    }

    #[test]
    fn file_change_hashes_differ_after_edit() {
        let change = file_change(Utf8Path::new("package.json"), "a", "b");
        assert_ne!(change.sha256_before, change.sha256_after);
        assert_eq!(change.bytes_before, 1);
        assert_eq!(change.sha256_before.len(), 64);
    }
}
