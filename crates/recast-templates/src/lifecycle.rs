//! Bookkeeping triggered by template creation and deletion.
//!
//! Creating an active, non-draft template re-evaluates the matcher against
//! the owner's unmapped recordings; deleting a template releases every
//! recording that referenced it. Template updates trigger nothing
//! automatically; callers wanting a re-evaluation after an update invoke
//! [`TemplateLifecycle::rematch`] explicitly.

use std::sync::Arc;

use anyhow::Result;
use recast_core::model::RecordingTemplate;
use recast_core::service::{RecordingStore, RematchScope, TemplateStore};
use recast_events::{Event, EventBus};
use recast_telemetry::Metrics;
use tracing::{debug, info};
use uuid::Uuid;

use crate::matcher::template_matches;

/// Page size used when iterating a user's unmapped recordings.
const REMATCH_BATCH: i64 = 500;

/// Counters describing one re-match pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RematchOutcome {
    /// Recordings evaluated against the template.
    pub examined: u64,
    /// Recordings the template was assigned to.
    pub matched: u64,
}

/// Side-effect coordinator for template creation and deletion.
#[derive(Clone)]
pub struct TemplateLifecycle {
    recordings: Arc<dyn RecordingStore>,
    templates: Arc<dyn TemplateStore>,
    events: EventBus,
    metrics: Metrics,
}

impl TemplateLifecycle {
    /// Construct a lifecycle coordinator over the storage collaborators.
    #[must_use]
    pub fn new(
        recordings: Arc<dyn RecordingStore>,
        templates: Arc<dyn TemplateStore>,
        events: EventBus,
        metrics: Metrics,
    ) -> Self {
        Self {
            recordings,
            templates,
            events,
            metrics,
        }
    }

    /// Re-evaluate the matcher against the owner's unmapped recordings.
    ///
    /// Recordings are paged in creation order; each structural match is
    /// assigned the template (`is_mapped = true`, `status = Initialized`),
    /// counted on the template, and announced on the bus. Draft or inactive
    /// templates match nothing. The pass is batched so callers can interrupt
    /// between pages.
    ///
    /// # Errors
    ///
    /// Returns an error when a store read or update fails; recordings
    /// already assigned in earlier batches keep their assignment.
    pub async fn rematch(
        &self,
        template: &RecordingTemplate,
        scope: RematchScope,
    ) -> Result<RematchOutcome> {
        let mut outcome = RematchOutcome::default();
        if !template.is_matchable() {
            debug!(template_id = %template.id, "template is draft or inactive, skipping re-match");
            return Ok(outcome);
        }

        let mut offset = 0_i64;
        loop {
            let batch = self
                .recordings
                .list_unmapped(template.user_id, scope, REMATCH_BATCH, offset)
                .await?;
            if batch.is_empty() {
                break;
            }
            let fetched = batch.len();
            let mut matched_in_batch = 0_i64;

            for recording in &batch {
                outcome.examined += 1;
                if !template_matches(template, &recording.identity()) {
                    continue;
                }
                self.recordings
                    .assign_template(recording.id, template.id)
                    .await?;
                self.templates.record_match(template.id).await?;
                self.events.publish(Event::RecordingMatched {
                    recording_id: recording.id,
                    template_id: template.id,
                });
                self.metrics.record_recording_matched();
                outcome.matched += 1;
                matched_in_batch += 1;
            }

            if fetched < usize::try_from(REMATCH_BATCH).unwrap_or(usize::MAX) {
                break;
            }
            // Matched recordings leave the unmapped listing, so advance only
            // past the rows that stayed behind.
            offset += REMATCH_BATCH - matched_in_batch;
        }

        self.metrics.record_rematch_pass();
        info!(
            template_id = %template.id,
            examined = outcome.examined,
            matched = outcome.matched,
            "re-match pass finished"
        );
        Ok(outcome)
    }

    /// Release every recording referencing a deleted template.
    ///
    /// Linkage fields are cleared (`template_id = None`,
    /// `is_mapped = false`); the aggregate status is left untouched, so the
    /// recordings stay eligible for matching against other templates on the
    /// next re-match pass without being reset to `Skipped`.
    ///
    /// # Errors
    ///
    /// Returns an error when the store update fails.
    pub async fn unmap_deleted(&self, template_id: Uuid) -> Result<u64> {
        let released = self.recordings.clear_template(template_id).await?;
        for recording_id in &released {
            self.events.publish(Event::RecordingUnmapped {
                recording_id: *recording_id,
                template_id,
            });
        }
        let count = u64::try_from(released.len()).unwrap_or(u64::MAX);
        self.metrics.record_recordings_unmapped(count);
        self.events.publish(Event::TemplateDeleted {
            template_id,
            released: count,
        });
        info!(%template_id, released = count, "template deleted, recordings released");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use recast_core::model::{MatchingRules, Recording};
    use recast_events::ProcessingStatus;
    use recast_test_support::mocks::MemoryStore;

    fn recording(user_id: Uuid, name: &str, status: ProcessingStatus) -> Recording {
        let now = Utc::now();
        Recording {
            id: Uuid::new_v4(),
            user_id,
            source_id: None,
            template_id: None,
            display_name: name.into(),
            status,
            is_mapped: false,
            processing_preferences: None,
            stages: Vec::new(),
            targets: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn template(user_id: Uuid, patterns: &[&str]) -> RecordingTemplate {
        let now = Utc::now();
        RecordingTemplate {
            id: Uuid::new_v4(),
            user_id,
            name: "lifecycle template".into(),
            matching_rules: Some(MatchingRules {
                patterns: patterns.iter().map(ToString::to_string).collect(),
                ..MatchingRules::default()
            }),
            processing_config: None,
            metadata_config: None,
            output_config: None,
            is_active: true,
            is_draft: false,
            priority: 0,
            match_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn lifecycle(store: &Arc<MemoryStore>) -> (TemplateLifecycle, EventBus) {
        let events = EventBus::new();
        let lifecycle = TemplateLifecycle::new(
            store.clone(),
            store.clone(),
            events.clone(),
            Metrics::new().expect("metrics"),
        );
        (lifecycle, events)
    }

    #[tokio::test]
    async fn rematch_assigns_matching_skipped_recordings() {
        let store = Arc::new(MemoryStore::default());
        let user_id = Uuid::new_v4();
        let matching = recording(user_id, "Standup 2026-08-06", ProcessingStatus::Skipped);
        let matching_id = matching.id;
        let other = recording(user_id, "Retro", ProcessingStatus::Skipped);
        let other_id = other.id;
        store.put_recording(matching);
        store.put_recording(other);

        let tpl = template(user_id, &["Standup *"]);
        store.put_template(tpl.clone());

        let (lifecycle, events) = lifecycle(&store);
        let outcome = lifecycle
            .rematch(&tpl, RematchScope::SkippedOnly)
            .await
            .expect("rematch");
        assert_eq!(outcome, RematchOutcome { examined: 2, matched: 1 });

        let assigned = store.recording(matching_id).expect("recording kept");
        assert!(assigned.is_mapped);
        assert_eq!(assigned.template_id, Some(tpl.id));
        assert_eq!(assigned.status, ProcessingStatus::Initialized);

        let untouched = store.recording(other_id).expect("recording kept");
        assert!(!untouched.is_mapped);
        assert_eq!(untouched.status, ProcessingStatus::Skipped);

        assert_eq!(store.template(tpl.id).expect("template").match_count, 1);
        let backlog = events.backlog_since(0);
        assert!(backlog.iter().any(|env| matches!(
            env.event,
            Event::RecordingMatched { recording_id, .. } if recording_id == matching_id
        )));
    }

    #[tokio::test]
    async fn rematch_scope_controls_which_statuses_are_seen() {
        let store = Arc::new(MemoryStore::default());
        let user_id = Uuid::new_v4();
        store.put_recording(recording(user_id, "Standup A", ProcessingStatus::Skipped));
        store.put_recording(recording(user_id, "Standup B", ProcessingStatus::Expired));

        let tpl = template(user_id, &["Standup *"]);
        store.put_template(tpl.clone());

        let (lifecycle, _events) = lifecycle(&store);
        let skipped_only = lifecycle
            .rematch(&tpl, RematchScope::SkippedOnly)
            .await
            .expect("rematch");
        assert_eq!(skipped_only.matched, 1);

        let full = lifecycle
            .rematch(&tpl, RematchScope::AllUnmapped)
            .await
            .expect("rematch");
        assert_eq!(full.matched, 1);
    }

    #[tokio::test]
    async fn draft_templates_match_nothing() {
        let store = Arc::new(MemoryStore::default());
        let user_id = Uuid::new_v4();
        store.put_recording(recording(user_id, "Standup A", ProcessingStatus::Skipped));

        let mut tpl = template(user_id, &["Standup *"]);
        tpl.is_draft = true;
        store.put_template(tpl.clone());

        let (lifecycle, _events) = lifecycle(&store);
        let outcome = lifecycle
            .rematch(&tpl, RematchScope::SkippedOnly)
            .await
            .expect("rematch");
        assert_eq!(outcome, RematchOutcome::default());
    }

    #[tokio::test]
    async fn unmap_preserves_status_and_announces_releases() {
        let store = Arc::new(MemoryStore::default());
        let user_id = Uuid::new_v4();
        let tpl = template(user_id, &["*"]);
        let mut mapped = recording(user_id, "Standup A", ProcessingStatus::Ready);
        mapped.is_mapped = true;
        mapped.template_id = Some(tpl.id);
        let mapped_id = mapped.id;
        store.put_recording(mapped);
        store.put_template(tpl.clone());

        let (lifecycle, events) = lifecycle(&store);
        let released = lifecycle.unmap_deleted(tpl.id).await.expect("unmap");
        assert_eq!(released, 1);

        let recording = store.recording(mapped_id).expect("recording kept");
        assert!(!recording.is_mapped);
        assert_eq!(recording.template_id, None);
        assert_eq!(recording.status, ProcessingStatus::Ready);

        let backlog = events.backlog_since(0);
        assert!(backlog.iter().any(|env| matches!(
            env.event,
            Event::RecordingUnmapped { recording_id, .. } if recording_id == mapped_id
        )));
        assert!(backlog.iter().any(|env| matches!(
            env.event,
            Event::TemplateDeleted { released: 1, .. }
        )));
    }
}
