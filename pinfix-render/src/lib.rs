//! Rendering helpers (terminal text and markdown) for pinfix reports.

use pinfix_types::health::HealthReport;
use pinfix_types::outcome::{HealingOutcome, StepStatus};
use pinfix_types::report::PinReport;

fn status_mark(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Succeeded => "✓",
        StepStatus::Failed => "✗",
        StepStatus::Skipped => "ℹ",
    }
}

/// A markdown table cell: one line, pipes escaped.
fn table_cell(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

fn outcome_line(report: &PinReport) -> String {
    let t = &report.target;
    match report.outcome {
        HealingOutcome::NoChangeNeeded => format!(
            "✓ {} does not declare or already pins {}@{}; nothing to do",
            t.manifest, t.package, t.version
        ),
        HealingOutcome::ManifestUpdated if report.dry_run => format!(
            "ℹ dry-run: would pin {} to {} in {}",
            t.package, t.version, t.manifest
        ),
        HealingOutcome::ManifestUpdated => format!(
            "✓ pinned {} to {} in {} (not committed)",
            t.package, t.version, t.manifest
        ),
        HealingOutcome::ManifestUpdatedAndCommitted => format!(
            "✓ pinned {} to {}; change committed and pushed",
            t.package, t.version
        ),
        HealingOutcome::ManifestUpdatedPrCreated => format!(
            "✓ pinned {} to {}; pull request opened",
            t.package, t.version
        ),
        HealingOutcome::PartialFailure => format!(
            "⚠ pinned {} to {} in {}, but publishing stopped",
            t.package, t.version, t.manifest
        ),
    }
}

/// Progress lines for stdout.
pub fn render_pin_text(report: &PinReport) -> String {
    let mut out = String::new();
    for step in &report.steps {
        out.push_str(&format!(
            "{} [{}] {}",
            status_mark(step.status),
            step.index,
            step.step.label()
        ));
        if let Some(msg) = &step.message {
            out.push_str(&format!(": {}", msg));
        }
        out.push('\n');
    }
    out.push_str(&outcome_line(report));
    out.push('\n');
    if let Some(url) = &report.pr_url {
        out.push_str(&format!("  {}\n", url));
    }
    out
}

pub fn render_pin_md(report: &PinReport) -> String {
    let mut out = String::new();
    out.push_str("# pinfix run\n\n");
    out.push_str(&format!("- Outcome: `{}`\n", report.outcome));
    out.push_str(&format!(
        "- Target: `{}@{}` in `{}`\n",
        report.target.package, report.target.version, report.target.manifest
    ));
    out.push_str(&format!("- Dry-run: `{}`\n", report.dry_run));
    if !report.sections.is_empty() {
        out.push_str(&format!("- Sections: {}\n", report.sections.join(", ")));
    }
    if let Some(url) = &report.pr_url {
        out.push_str(&format!("- Pull request: {}\n", url));
    }
    out.push('\n');

    out.push_str("## Publish steps\n\n");
    if report.steps.is_empty() {
        out.push_str("_No publish steps ran._\n");
        return out;
    }
    out.push_str("| # | Step | Status | Detail |\n");
    out.push_str("|---|------|--------|--------|\n");
    for step in &report.steps {
        let status = match step.status {
            StepStatus::Succeeded => "succeeded",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
        };
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            step.index,
            step.step.label(),
            status,
            table_cell(step.message.as_deref().unwrap_or(""))
        ));
    }
    out
}

pub fn render_health_text(report: &HealthReport) -> String {
    if report.is_healthy() {
        return "✓ Repository is healthy!\n".to_string();
    }
    let mut out = format!("⚠ Found {} issue(s):\n", report.issues.len());
    for issue in &report.issues {
        out.push_str(&format!("  - {}\n", issue.message));
    }
    out
}
