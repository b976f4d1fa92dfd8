//! In-memory store implementations backing resolver and lifecycle tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use async_trait::async_trait;
use recast_core::model::{OutputPreset, OutputTarget, ProcessingStage, Recording, RecordingTemplate};
use recast_core::service::{
    PresetStore, RecordingStore, RematchScope, TemplateStore, UserConfigStore,
};
use recast_events::{ProcessingStatus, StageStatus, StageType, TargetStatus, TargetType};
use serde_json::Value;
use uuid::Uuid;

/// In-memory implementation of every storage collaborator trait.
///
/// Recordings are kept in insertion order, which doubles as the creation
/// order the paging contract expects.
#[derive(Default)]
pub struct MemoryStore {
    recordings: Mutex<Vec<Recording>>,
    templates: Mutex<Vec<RecordingTemplate>>,
    user_configs: Mutex<HashMap<Uuid, Value>>,
    presets: Mutex<Vec<OutputPreset>>,
}

impl MemoryStore {
    /// Seed a recording.
    pub fn put_recording(&self, recording: Recording) {
        lock(&self.recordings).push(recording);
    }

    /// Seed a template.
    pub fn put_template(&self, template: RecordingTemplate) {
        lock(&self.templates).push(template);
    }

    /// Seed a user's base configuration tree.
    pub fn put_user_config(&self, user_id: Uuid, config: Value) {
        lock(&self.user_configs).insert(user_id, config);
    }

    /// Seed an output preset.
    pub fn put_preset(&self, preset: OutputPreset) {
        lock(&self.presets).push(preset);
    }

    /// Current snapshot of a recording.
    #[must_use]
    pub fn recording(&self, id: Uuid) -> Option<Recording> {
        lock(&self.recordings).iter().find(|r| r.id == id).cloned()
    }

    /// Current snapshot of a template.
    #[must_use]
    pub fn template(&self, id: Uuid) -> Option<RecordingTemplate> {
        lock(&self.templates).iter().find(|t| t.id == id).cloned()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl RecordingStore for MemoryStore {
    async fn get_with_children(&self, id: Uuid) -> Result<Option<Recording>> {
        Ok(self.recording(id))
    }

    async fn list_unmapped(
        &self,
        user_id: Uuid,
        scope: RematchScope,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Recording>> {
        let recordings = lock(&self.recordings);
        let page = recordings
            .iter()
            .filter(|r| r.user_id == user_id && !r.is_mapped)
            .filter(|r| match scope {
                RematchScope::SkippedOnly => r.status == ProcessingStatus::Skipped,
                RematchScope::AllUnmapped => true,
            })
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect();
        Ok(page)
    }

    async fn assign_template(&self, recording_id: Uuid, template_id: Uuid) -> Result<()> {
        let mut recordings = lock(&self.recordings);
        if let Some(recording) = recordings.iter_mut().find(|r| r.id == recording_id) {
            recording.template_id = Some(template_id);
            recording.is_mapped = true;
            recording.status = ProcessingStatus::Initialized;
        }
        Ok(())
    }

    async fn clear_template(&self, template_id: Uuid) -> Result<Vec<Uuid>> {
        let mut recordings = lock(&self.recordings);
        let mut released = Vec::new();
        for recording in recordings
            .iter_mut()
            .filter(|r| r.template_id == Some(template_id))
        {
            recording.template_id = None;
            recording.is_mapped = false;
            released.push(recording.id);
        }
        Ok(released)
    }

    async fn update_status(&self, recording_id: Uuid, status: ProcessingStatus) -> Result<()> {
        let mut recordings = lock(&self.recordings);
        if let Some(recording) = recordings.iter_mut().find(|r| r.id == recording_id) {
            recording.status = status;
        }
        Ok(())
    }

    async fn insert_stages(&self, stages: &[ProcessingStage]) -> Result<()> {
        let mut recordings = lock(&self.recordings);
        for stage in stages {
            if let Some(recording) = recordings.iter_mut().find(|r| r.id == stage.recording_id) {
                recording.stages.push(stage.clone());
            }
        }
        Ok(())
    }

    async fn insert_targets(&self, targets: &[OutputTarget]) -> Result<()> {
        let mut recordings = lock(&self.recordings);
        for target in targets {
            if let Some(recording) = recordings.iter_mut().find(|r| r.id == target.recording_id) {
                recording.targets.push(target.clone());
            }
        }
        Ok(())
    }

    async fn update_stage_status(
        &self,
        recording_id: Uuid,
        stage_type: StageType,
        status: StageStatus,
        failure_reason: Option<&str>,
    ) -> Result<()> {
        let mut recordings = lock(&self.recordings);
        if let Some(stage) = recordings
            .iter_mut()
            .find(|r| r.id == recording_id)
            .and_then(|r| r.stages.iter_mut().find(|s| s.stage_type == stage_type))
        {
            stage.status = status;
            stage.failure_reason = failure_reason.map(ToString::to_string);
            if status == StageStatus::Failed {
                stage.retry_count += 1;
            }
        }
        Ok(())
    }

    async fn update_target_status(
        &self,
        recording_id: Uuid,
        target_type: TargetType,
        status: TargetStatus,
        failure_reason: Option<&str>,
    ) -> Result<()> {
        let mut recordings = lock(&self.recordings);
        if let Some(target) = recordings
            .iter_mut()
            .find(|r| r.id == recording_id)
            .and_then(|r| r.targets.iter_mut().find(|t| t.target_type == target_type))
        {
            target.status = status;
            target.failure_reason = failure_reason.map(ToString::to_string);
            if status == TargetStatus::Failed {
                target.retry_count += 1;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn active_for_user(&self, user_id: Uuid) -> Result<Vec<RecordingTemplate>> {
        let mut matchable: Vec<RecordingTemplate> = lock(&self.templates)
            .iter()
            .filter(|t| t.user_id == user_id && t.is_matchable())
            .cloned()
            .collect();
        matchable.sort_by_key(|t| t.created_at);
        Ok(matchable)
    }

    async fn get(&self, id: Uuid) -> Result<Option<RecordingTemplate>> {
        Ok(self.template(id))
    }

    async fn record_match(&self, template_id: Uuid) -> Result<()> {
        let mut templates = lock(&self.templates);
        if let Some(template) = templates.iter_mut().find(|t| t.id == template_id) {
            template.match_count += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl UserConfigStore for MemoryStore {
    async fn config_for_user(&self, user_id: Uuid) -> Result<Option<Value>> {
        Ok(lock(&self.user_configs).get(&user_id).cloned())
    }
}

#[async_trait]
impl PresetStore for MemoryStore {
    async fn preset_for_user(
        &self,
        preset_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OutputPreset>> {
        Ok(lock(&self.presets)
            .iter()
            .find(|p| p.id == preset_id && p.user_id == user_id && p.is_active)
            .cloned())
    }

    async fn presets_by_ids(&self, user_id: Uuid, ids: &[Uuid]) -> Result<Vec<OutputPreset>> {
        Ok(lock(&self.presets)
            .iter()
            .filter(|p| p.user_id == user_id && p.is_active && ids.contains(&p.id))
            .cloned()
            .collect())
    }
}
