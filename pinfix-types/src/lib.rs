//! Shared DTOs (schemas-as-code) for the pinfix workspace.
//!
//! # Design constraints
//! - These types are serialized to disk as run artifacts.
//! - Prefer adding optional fields over changing semantics.

pub mod health;
pub mod outcome;
pub mod report;

/// Schema identifiers.
pub mod schema {
    pub const PINFIX_REPORT_V1: &str = "pinfix.report.v1";
    pub const PINFIX_HEALTH_V1: &str = "pinfix.health.v1";
}
