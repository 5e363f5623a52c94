//! Embeddable core library for pinfix.
//!
//! Provides a clap-free entry point that pins one dependency in a package
//! manifest and publishes the change through version control.
//!
//! # Port traits
//!
//! All external processes are abstracted behind port traits in [`ports`]:
//! - [`GitPort`](ports::GitPort): branch, stage, commit, push
//! - [`PullRequestPort`](ports::PullRequestPort): best-effort PR creation
//! - [`WritePort`](ports::WritePort): write run artifacts
//!
//! The [`adapters`] module provides the `git`/`gh` shell implementations.
//!
//! # Entry points
//!
//! - [`run_pin`](pipeline::run_pin): detect, pin, persist, publish
//! - [`check_repo_health`](health::check_repo_health): conventional file checks

pub mod adapters;
pub mod error;
pub mod health;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use error::{CommandError, PinError, StepFailure};

// Re-export so embedders don't need pinfix-edit directly.
pub use pinfix_edit::PinSpec;
