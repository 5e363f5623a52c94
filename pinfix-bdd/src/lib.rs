//! BDD harness (cucumber-rs).
//!
//! Scenario tests drive the `pinfix` binary against throwaway repositories.

/// Manifest used by scenarios that need the target package out of range.
pub const MISMATCHED_MANIFEST: &str =
    r#"{"name": "app", "dependencies": {"target-pkg": "^1.0.0"}}"#;
