//! The pin pipeline, extracted from the CLI.
//!
//! ```text
//! Start -> ManifestLoaded -> NoChangeNeeded
//!                         -> MismatchDetected -> Pinned -> Persisted
//!                              -> NoRepoContext
//!                              -> BranchCreated -> Staged -> Committed -> Pushed
//!                                   -> PrCreated | PrSkipped
//! ```
//!
//! Any version-control step after `Persisted` may end in `PartialFailure`;
//! the rewritten manifest stays on disk.

use crate::error::{PinError, StepFailure};
use crate::ports::{GitPort, PrOutcome, PullRequest, PullRequestPort, WritePort};
use crate::settings::PinSettings;
use anyhow::Context;
use camino::Utf8Path;
use chrono::Utc;
use pinfix_edit::{file_change, load_manifest, render_patch};
use pinfix_render::render_pin_md;
use pinfix_types::outcome::{HealingOutcome, PublishStep, StepStatus};
use pinfix_types::report::{PinReport, PinTarget, PublishStepRecord, ToolInfo};
use tracing::{debug, info, warn};

/// Outcome of `run_pin`.
#[derive(Debug, Clone)]
pub struct PinOutcome {
    pub report: PinReport,
    /// Unified diff of the manifest change (empty when nothing changed).
    pub patch: String,
    /// The version-control step that stopped publishing, if any.
    pub failure: Option<StepFailure>,
}

impl PinOutcome {
    pub fn outcome(&self) -> HealingOutcome {
        self.report.outcome
    }
}

/// Where the publish chain stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishState {
    NoRepoContext,
    PrCreated { url: Option<String> },
    PrSkipped,
    PartialFailure(StepFailure),
}

impl PublishState {
    pub fn outcome(&self) -> HealingOutcome {
        match self {
            PublishState::NoRepoContext => HealingOutcome::ManifestUpdated,
            PublishState::PrCreated { .. } => HealingOutcome::ManifestUpdatedPrCreated,
            PublishState::PrSkipped => HealingOutcome::ManifestUpdatedAndCommitted,
            PublishState::PartialFailure(_) => HealingOutcome::PartialFailure,
        }
    }
}

/// Run the pin pipeline.
///
/// Only a missing or malformed manifest, or an unexpected I/O error, is
/// returned as `Err`. Version-control failures are recorded in the outcome.
pub fn run_pin(
    settings: &PinSettings,
    git: &dyn GitPort,
    pr: &dyn PullRequestPort,
    tool: ToolInfo,
) -> Result<PinOutcome, PinError> {
    let manifest_path = settings.manifest_path();
    let mut report = PinReport::new(
        tool,
        PinTarget {
            manifest: settings.manifest.to_string(),
            package: settings.pin.package.clone(),
            version: settings.pin.version.clone(),
        },
    );
    report.dry_run = settings.dry_run;

    let mut manifest = load_manifest(&manifest_path)?;

    if !manifest.detect_mismatch(&settings.pin) {
        info!(
            package = %settings.pin.package,
            path = %manifest_path,
            "no change needed"
        );
        report.outcome = HealingOutcome::NoChangeNeeded;
        report.run.ended_at = Some(Utc::now());
        return Ok(PinOutcome {
            report,
            patch: String::new(),
            failure: None,
        });
    }

    let sections = manifest.apply_pin(&settings.pin);
    report.sections = sections.iter().map(|s| s.to_string()).collect();
    let rendered = manifest.render()?;
    let patch = render_patch(&settings.manifest, manifest.original(), &rendered);

    if settings.dry_run {
        info!(package = %settings.pin.package, "dry-run: manifest not written");
        report.manifest_change = Some(file_change(
            &settings.manifest,
            manifest.original(),
            &rendered,
        ));
        report.outcome = HealingOutcome::ManifestUpdated;
        report.run.ended_at = Some(Utc::now());
        return Ok(PinOutcome {
            report,
            patch,
            failure: None,
        });
    }

    let mut change = manifest.persist()?;
    change.path = settings.manifest.to_string();
    report.manifest_change = Some(change);
    info!(
        package = %settings.pin.package,
        version = %settings.pin.version,
        sections = ?sections,
        "manifest updated"
    );

    let state = if settings.publish.enabled {
        publish_change(settings, git, pr, &mut report.steps)
    } else {
        debug!("publishing disabled");
        PublishState::NoRepoContext
    };

    report.outcome = state.outcome();
    let failure = match state {
        PublishState::PrCreated { url } => {
            report.pr_url = url;
            None
        }
        PublishState::PartialFailure(f) => Some(f),
        PublishState::NoRepoContext | PublishState::PrSkipped => None,
    };
    report.run.ended_at = Some(Utc::now());

    Ok(PinOutcome {
        report,
        patch,
        failure,
    })
}

/// Branch, stage, commit, push, then attempt a PR.
///
/// Each step runs only if the previous one succeeded.
pub fn publish_change(
    settings: &PinSettings,
    git: &dyn GitPort,
    pr: &dyn PullRequestPort,
    steps: &mut Vec<PublishStepRecord>,
) -> PublishState {
    let root = settings.repo_root.as_path();
    let publish = &settings.publish;

    match git.is_repository(root) {
        Ok(true) => steps.push(PublishStepRecord::new(
            PublishStep::VerifyRepository,
            StepStatus::Succeeded,
            None,
        )),
        Ok(false) => {
            info!(root = %root, "no git repository; skipping publish");
            steps.push(PublishStepRecord::new(
                PublishStep::VerifyRepository,
                StepStatus::Skipped,
                Some("not a git repository".to_string()),
            ));
            return PublishState::NoRepoContext;
        }
        Err(e) => {
            info!(
                root = %root,
                error = %format!("{e:#}"),
                "cannot inspect repository; skipping publish"
            );
            steps.push(PublishStepRecord::new(
                PublishStep::VerifyRepository,
                StepStatus::Skipped,
                Some(format!("{e:#}")),
            ));
            return PublishState::NoRepoContext;
        }
    }

    if let Err(failure) = commit_and_push(settings, git, steps) {
        let err = PinError::from(failure.clone());
        warn!(step = failure.step.index(), "{err}; manifest change kept");
        return PublishState::PartialFailure(failure);
    }

    let request = PullRequest {
        title: publish.pr_title().to_string(),
        body: publish.pr_body(&settings.pin),
        head: publish.branch.clone(),
    };
    match pr.open_pull_request(root, &request) {
        PrOutcome::Created { url } => {
            info!(url = url.as_deref().unwrap_or("-"), "pull request created");
            steps.push(PublishStepRecord::new(
                PublishStep::OpenPullRequest,
                StepStatus::Succeeded,
                url.clone(),
            ));
            PublishState::PrCreated { url }
        }
        PrOutcome::ToolUnavailable { tool } => {
            info!(tool = %tool, "PR tool not available; skipping pull request");
            steps.push(PublishStepRecord::new(
                PublishStep::OpenPullRequest,
                StepStatus::Skipped,
                Some(format!("`{tool}` not available")),
            ));
            PublishState::PrSkipped
        }
        PrOutcome::Failed { message } => {
            info!(%message, "pull request not created");
            steps.push(PublishStepRecord::new(
                PublishStep::OpenPullRequest,
                StepStatus::Failed,
                Some(message),
            ));
            PublishState::PrSkipped
        }
    }
}

fn commit_and_push(
    settings: &PinSettings,
    git: &dyn GitPort,
    steps: &mut Vec<PublishStepRecord>,
) -> Result<(), StepFailure> {
    let root = settings.repo_root.as_path();
    let publish = &settings.publish;

    record(
        steps,
        PublishStep::CreateBranch,
        switch_to_branch(git, root, &publish.branch, publish.reuse_existing_branch),
    )?;
    record(
        steps,
        PublishStep::StageManifest,
        git.stage(root, &settings.manifest),
    )?;
    record(
        steps,
        PublishStep::Commit,
        git.commit(root, &publish.commit_message),
    )?;
    record(
        steps,
        PublishStep::Push,
        git.push_upstream(root, &publish.remote, &publish.branch),
    )?;
    Ok(())
}

fn record(
    steps: &mut Vec<PublishStepRecord>,
    step: PublishStep,
    result: anyhow::Result<()>,
) -> Result<(), StepFailure> {
    match result {
        Ok(()) => {
            debug!(step = step.index(), "{} ok", step.label());
            steps.push(PublishStepRecord::new(step, StepStatus::Succeeded, None));
            Ok(())
        }
        Err(e) => {
            let message = format!("{e:#}");
            steps.push(PublishStepRecord::new(
                step,
                StepStatus::Failed,
                Some(message.clone()),
            ));
            Err(StepFailure { step, message })
        }
    }
}

fn switch_to_branch(
    git: &dyn GitPort,
    root: &Utf8Path,
    branch: &str,
    reuse_existing: bool,
) -> anyhow::Result<()> {
    match git.create_branch(root, branch) {
        Ok(()) => Ok(()),
        Err(err) if reuse_existing => {
            if !git.branch_exists(root, branch).unwrap_or(false) {
                return Err(err);
            }
            info!(branch, "branch already exists; reusing it");
            git.switch_branch(root, branch)
                .with_context(|| format!("switch to existing branch {branch}"))
        }
        Err(err) => Err(err),
    }
}

/// Write `report.json`, `summary.md` and `patch.diff` into `out_dir`.
pub fn write_pin_artifacts(
    outcome: &PinOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let json = serde_json::to_string_pretty(&outcome.report).context("serialize report")?;
    writer.write_file(&out_dir.join("report.json"), json.as_bytes())?;
    writer.write_file(
        &out_dir.join("summary.md"),
        render_pin_md(&outcome.report).as_bytes(),
    )?;
    writer.write_file(&out_dir.join("patch.diff"), outcome.patch.as_bytes())?;

    debug!(out_dir = %out_dir, "wrote pin artifacts");
    Ok(())
}
