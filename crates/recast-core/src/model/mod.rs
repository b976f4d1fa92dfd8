//! Core recording domain types and DTOs shared across the workspace.

use chrono::{DateTime, Utc};
use recast_events::{ProcessingStatus, StageStatus, StageType, TargetStatus, TargetType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One unit of media moving through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    /// Unique identifier for the recording.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Optional reference to the source the recording was observed on.
    pub source_id: Option<Uuid>,
    /// Template currently governing the recording, when mapped.
    pub template_id: Option<Uuid>,
    /// Display name used by the template matcher.
    pub display_name: String,
    /// Aggregate pipeline status.
    pub status: ProcessingStatus,
    /// Whether a template has ever matched this recording.
    pub is_mapped: bool,
    /// Per-recording configuration override tree, highest priority below a
    /// caller-supplied manual override.
    pub processing_preferences: Option<Value>,
    /// Stage children, at most one per [`StageType`].
    #[serde(default)]
    pub stages: Vec<ProcessingStage>,
    /// Output target children, at most one per [`TargetType`].
    #[serde(default)]
    pub targets: Vec<OutputTarget>,
    /// Timestamp when the recording was first observed.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl Recording {
    /// Identifying attributes consumed by the template matcher.
    #[must_use]
    pub fn identity(&self) -> RecordingIdentity<'_> {
        RecordingIdentity {
            display_name: &self.display_name,
            source_id: self.source_id,
        }
    }

    /// Locate the stage child of the given kind, if configured.
    #[must_use]
    pub fn stage(&self, stage_type: StageType) -> Option<&ProcessingStage> {
        self.stages.iter().find(|s| s.stage_type == stage_type)
    }

    /// Locate the output target for the given platform, if configured.
    #[must_use]
    pub fn target(&self, target_type: TargetType) -> Option<&OutputTarget> {
        self.targets.iter().find(|t| t.target_type == target_type)
    }
}

/// Identifying attributes the template matcher evaluates.
#[derive(Debug, Clone, Copy)]
pub struct RecordingIdentity<'a> {
    /// Display name of the recording.
    pub display_name: &'a str,
    /// Source the recording was observed on, when known.
    pub source_id: Option<Uuid>,
}

/// One pipeline step instance owned by a recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingStage {
    /// Unique identifier for the stage row.
    pub id: Uuid,
    /// Owning recording.
    pub recording_id: Uuid,
    /// Kind of pipeline step.
    pub stage_type: StageType,
    /// Execution state.
    pub status: StageStatus,
    /// Failure detail populated when `status` is `Failed`.
    pub failure_reason: Option<String>,
    /// Number of retries attempted so far.
    pub retry_count: i32,
    /// Free-form stage metadata (e.g. chosen provider).
    #[serde(default)]
    pub metadata: Value,
    /// Timestamp when the stage was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl ProcessingStage {
    /// Construct a freshly planned stage in the `Pending` state.
    #[must_use]
    pub fn pending(recording_id: Uuid, stage_type: StageType, metadata: Value) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            recording_id,
            stage_type,
            status: StageStatus::Pending,
            failure_reason: None,
            retry_count: 0,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One (recording, destination platform) pairing representing an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputTarget {
    /// Unique identifier for the target row.
    pub id: Uuid,
    /// Owning recording.
    pub recording_id: Uuid,
    /// Destination platform.
    pub target_type: TargetType,
    /// Upload state.
    pub status: TargetStatus,
    /// Output preset applied at upload time, when configured.
    pub preset_id: Option<Uuid>,
    /// Failure detail populated when `status` is `Failed`.
    pub failure_reason: Option<String>,
    /// Number of upload retries attempted so far.
    pub retry_count: i32,
    /// Timestamp when the target was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl OutputTarget {
    /// Construct a freshly planned target in the `NotUploaded` state.
    #[must_use]
    pub fn not_uploaded(recording_id: Uuid, target_type: TargetType, preset_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            recording_id,
            target_type,
            status: TargetStatus::NotUploaded,
            preset_id,
            failure_reason: None,
            retry_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Structural rules deciding which recordings a template governs.
///
/// Rule kinds are conjunctive: every kind that declares entries must be
/// satisfied. Within a kind, matching any listed entry suffices. Rules with
/// no entries at all never match.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct MatchingRules {
    /// Display names matched verbatim.
    #[serde(default)]
    pub exact_matches: Vec<String>,
    /// Shell-style glob patterns (`*`, `?`, `[...]`) matched against the
    /// display name.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Source identifiers the recording must originate from.
    #[serde(default)]
    pub source_ids: Vec<Uuid>,
}

impl MatchingRules {
    /// Whether the rule set declares no rules at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exact_matches.is_empty() && self.patterns.is_empty() && self.source_ids.is_empty()
    }
}

/// A named rule set owned by a user, selecting recordings and supplying their
/// default configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingTemplate {
    /// Unique identifier for the template.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Human-readable template name.
    pub name: String,
    /// Structural matching rules; `None` never matches.
    pub matching_rules: Option<MatchingRules>,
    /// Processing configuration override tree.
    pub processing_config: Option<Value>,
    /// Upload metadata configuration tree (`common` and per-platform keys).
    pub metadata_config: Option<Value>,
    /// Output configuration tree (`preset_ids` and platform options).
    pub output_config: Option<Value>,
    /// Whether the template participates in matching.
    pub is_active: bool,
    /// Draft templates never participate in matching.
    pub is_draft: bool,
    /// Display ordering hint; unused by the matcher.
    pub priority: i32,
    /// Number of recordings this template has matched.
    pub match_count: i64,
    /// Timestamp when the template was created; the matcher tie-break.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl RecordingTemplate {
    /// Whether the template is eligible to participate in matching.
    #[must_use]
    pub const fn is_matchable(&self) -> bool {
        self.is_active && !self.is_draft
    }
}

/// Named, platform-scoped metadata bundle referenced at upload time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputPreset {
    /// Unique identifier for the preset.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Human-readable preset name.
    pub name: String,
    /// Destination platform the preset applies to.
    pub platform: TargetType,
    /// Metadata tree (privacy, tags, thumbnail, templated title/description).
    pub metadata: Value,
    /// Inactive presets are invisible to resolution.
    pub is_active: bool,
    /// Timestamp when the preset was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}
