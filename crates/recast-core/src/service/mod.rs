//! Persistence collaborator traits and the status refresh helper.
//!
//! The decision core never owns storage: recordings, templates, presets, and
//! user configuration live behind these traits, implemented by the data layer
//! and by in-memory mocks in tests.

use anyhow::Result;
use async_trait::async_trait;
use recast_events::{
    Event, EventBus, ProcessingStatus, StageStatus, StageType, TargetStatus, TargetType,
};
use serde_json::Value;
use uuid::Uuid;

use crate::model::{OutputPreset, OutputTarget, ProcessingStage, Recording, RecordingTemplate};
use crate::status::compute_aggregate_status;

/// Which unmapped recordings a re-match pass should consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RematchScope {
    /// Only unmapped recordings currently in the `Skipped` status.
    SkippedOnly,
    /// Every unmapped recording regardless of status ("full" mode).
    AllUnmapped,
}

/// Storage collaborator for recordings and their stage/target children.
#[async_trait]
pub trait RecordingStore: Send + Sync {
    /// Fetch a recording with its stage and target children eagerly loaded.
    async fn get_with_children(&self, id: Uuid) -> Result<Option<Recording>>;

    /// Page through a user's unmapped recordings for a re-match pass.
    async fn list_unmapped(
        &self,
        user_id: Uuid,
        scope: RematchScope,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Recording>>;

    /// Attach a template to a recording: `is_mapped = true`, `template_id`
    /// set, `status = Initialized`.
    async fn assign_template(&self, recording_id: Uuid, template_id: Uuid) -> Result<()>;

    /// Release every recording referencing the template: `template_id`
    /// cleared, `is_mapped = false`, `status` untouched. Returns the ids of
    /// the recordings released.
    async fn clear_template(&self, template_id: Uuid) -> Result<Vec<Uuid>>;

    /// Persist a freshly computed aggregate status.
    async fn update_status(&self, recording_id: Uuid, status: ProcessingStatus) -> Result<()>;

    /// Insert newly planned stage children.
    async fn insert_stages(&self, stages: &[ProcessingStage]) -> Result<()>;

    /// Insert newly planned target children.
    async fn insert_targets(&self, targets: &[OutputTarget]) -> Result<()>;

    /// Record a stage transition driven by a worker.
    async fn update_stage_status(
        &self,
        recording_id: Uuid,
        stage_type: StageType,
        status: StageStatus,
        failure_reason: Option<&str>,
    ) -> Result<()>;

    /// Record a target transition driven by an upload worker.
    async fn update_target_status(
        &self,
        recording_id: Uuid,
        target_type: TargetType,
        status: TargetStatus,
        failure_reason: Option<&str>,
    ) -> Result<()>;
}

/// Storage collaborator for recording templates.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// List a user's matchable templates (active, non-draft), ordered by
    /// creation time ascending. The ordering is the matcher's tie-break and
    /// is part of this method's contract.
    async fn active_for_user(&self, user_id: Uuid) -> Result<Vec<RecordingTemplate>>;

    /// Fetch a template by primary key.
    async fn get(&self, id: Uuid) -> Result<Option<RecordingTemplate>>;

    /// Increment the template's match counter.
    async fn record_match(&self, template_id: Uuid) -> Result<()>;
}

/// Storage collaborator for per-user base configuration.
#[async_trait]
pub trait UserConfigStore: Send + Sync {
    /// Fetch the user's base configuration tree, when present.
    async fn config_for_user(&self, user_id: Uuid) -> Result<Option<Value>>;
}

/// Storage collaborator for output presets.
#[async_trait]
pub trait PresetStore: Send + Sync {
    /// Fetch an active preset by id, scoped to its owning user.
    async fn preset_for_user(&self, preset_id: Uuid, user_id: Uuid)
    -> Result<Option<OutputPreset>>;

    /// Fetch the active presets among `ids`, scoped to the owning user.
    async fn presets_by_ids(&self, user_id: Uuid, ids: &[Uuid]) -> Result<Vec<OutputPreset>>;
}

/// Recompute a recording's aggregate status, persist it when it changed, and
/// publish a [`Event::StatusChanged`] notification.
///
/// Returns the freshly computed status, or `None` when the recording no
/// longer exists.
///
/// # Errors
///
/// Returns an error when the store read or the status update fails.
pub async fn refresh_status(
    store: &dyn RecordingStore,
    events: &EventBus,
    recording_id: Uuid,
) -> Result<Option<ProcessingStatus>> {
    let Some(recording) = store.get_with_children(recording_id).await? else {
        return Ok(None);
    };
    let next = compute_aggregate_status(&recording);
    if next != recording.status {
        store.update_status(recording_id, next).await?;
        events.publish(Event::StatusChanged {
            recording_id,
            status: next,
        });
    }
    Ok(Some(next))
}
