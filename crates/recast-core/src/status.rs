//! Aggregate status computation and pipeline gating predicates.
//!
//! All functions here are pure and total over their inputs: they never touch
//! storage and never fail. [`compute_aggregate_status`] is the single source
//! of truth for `recording.status` and must be re-run after every stage or
//! target mutation; the gating predicates must be consulted before starting
//! the corresponding pipeline step.

use recast_events::{ProcessingStatus, StageStatus, StageType, TargetStatus, TargetType};

use crate::model::Recording;

/// Compute the single aggregate status summarizing a recording's pipeline
/// position from its stage and target children.
///
/// A recording with no stage children keeps its stored status when that
/// status belongs to the legacy linear chain (`Initialized` through
/// `Processed`); any other stored status collapses to `Processed`, treating
/// the recording as ready for legacy processing.
#[must_use]
pub fn compute_aggregate_status(recording: &Recording) -> ProcessingStatus {
    if recording.stages.is_empty() {
        return match recording.status {
            ProcessingStatus::Initialized
            | ProcessingStatus::Downloading
            | ProcessingStatus::Downloaded
            | ProcessingStatus::Processing
            | ProcessingStatus::Processed => recording.status,
            _ => ProcessingStatus::Processed,
        };
    }

    let stages = &recording.stages;
    if stages.iter().all(|s| s.status == StageStatus::Pending) {
        // Configured but nothing has started.
        return ProcessingStatus::Processed;
    }
    if stages.iter().any(|s| s.status == StageStatus::InProgress) {
        return ProcessingStatus::Preparing;
    }
    if stages.iter().all(|s| s.status == StageStatus::Completed) {
        return aggregate_targets(recording);
    }

    // Mixed stage statuses (completed/pending/failed) with nothing running.
    ProcessingStatus::Preparing
}

fn aggregate_targets(recording: &Recording) -> ProcessingStatus {
    if recording.targets.is_empty() {
        return ProcessingStatus::Transcribed;
    }
    if recording
        .targets
        .iter()
        .any(|t| t.status == TargetStatus::Uploading)
    {
        return ProcessingStatus::Uploading;
    }
    if recording
        .targets
        .iter()
        .all(|t| t.status == TargetStatus::Uploaded)
    {
        return ProcessingStatus::Ready;
    }
    ProcessingStatus::Transcribed
}

/// Whether the download step may start.
#[must_use]
pub fn may_download(recording: &Recording, allow_skipped: bool) -> bool {
    match recording.status {
        ProcessingStatus::Skipped => allow_skipped,
        ProcessingStatus::Initialized => true,
        _ => false,
    }
}

/// Whether the processing step may start.
///
/// `Processed` recordings remain eligible so processing can be re-run
/// idempotently.
#[must_use]
pub fn may_process(recording: &Recording, allow_skipped: bool) -> bool {
    match recording.status {
        ProcessingStatus::Skipped => allow_skipped,
        ProcessingStatus::Downloaded | ProcessingStatus::Processed => true,
        _ => false,
    }
}

/// Whether the transcription step may start.
#[must_use]
pub fn may_transcribe(recording: &Recording, allow_skipped: bool) -> bool {
    match recording.status {
        ProcessingStatus::Skipped if !allow_skipped => return false,
        ProcessingStatus::Processed
        | ProcessingStatus::Transcribed
        | ProcessingStatus::Preparing
        | ProcessingStatus::Skipped => {}
        _ => return false,
    }
    if recording.stages.is_empty() {
        return true;
    }
    if recording
        .stages
        .iter()
        .any(|s| s.stage_type != StageType::Transcribe && s.status == StageStatus::InProgress)
    {
        return false;
    }
    recording.stage(StageType::Transcribe).is_none_or(|stage| {
        matches!(stage.status, StageStatus::Pending | StageStatus::Failed)
    })
}

/// Whether an upload to `target_type` may start.
#[must_use]
pub fn may_upload(recording: &Recording, target_type: TargetType, allow_skipped: bool) -> bool {
    if recording.status == ProcessingStatus::Skipped && !allow_skipped {
        return false;
    }
    if recording
        .stages
        .iter()
        .any(|s| s.status != StageStatus::Completed)
    {
        return false;
    }
    recording.target(target_type).is_none_or(|target| {
        matches!(
            target.status,
            TargetStatus::NotUploaded | TargetStatus::Failed
        )
    })
}
