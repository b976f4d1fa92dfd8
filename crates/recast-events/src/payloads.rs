//! Event payload types and the shared lifecycle vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned to each event emitted by the platform.
pub type EventId = u64;

/// Default buffer size for the in-memory replay ring.
pub const DEFAULT_REPLAY_CAPACITY: usize = 1_024;

/// Aggregate pipeline position of a recording.
///
/// `Skipped` marks a recording no template has ever matched; `Expired` is a
/// terminal housekeeping state applied after retention expiry. Both are inert
/// with respect to status aggregation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Recording admitted into the pipeline, nothing started yet.
    Initialized,
    /// Source download in flight.
    Downloading,
    /// Source media available locally.
    Downloaded,
    /// Legacy processing step in flight.
    Processing,
    /// Configured but no stage has started, or legacy processing finished.
    Processed,
    /// At least one stage is running or partially complete.
    Preparing,
    /// Transcription in flight.
    Transcribing,
    /// All stages complete; uploads outstanding or not configured.
    Transcribed,
    /// At least one output target is uploading.
    Uploading,
    /// Every configured output target has been uploaded.
    Ready,
    /// No template has ever matched the recording.
    Skipped,
    /// Retention expiry reached; terminal.
    Expired,
}

impl ProcessingStatus {
    /// Stable lowercase label used in storage and event streams.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Downloading => "downloading",
            Self::Downloaded => "downloaded",
            Self::Processing => "processing",
            Self::Processed => "processed",
            Self::Preparing => "preparing",
            Self::Transcribing => "transcribing",
            Self::Transcribed => "transcribed",
            Self::Uploading => "uploading",
            Self::Ready => "ready",
            Self::Skipped => "skipped",
            Self::Expired => "expired",
        }
    }
}

/// Fine-grained pipeline step kinds a recording can be configured with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageType {
    /// Fetch the source media.
    Download,
    /// Produce a transcript.
    Transcribe,
    /// Derive topic markers from the transcript.
    ExtractTopics,
    /// Render subtitle tracks.
    GenerateSubtitles,
    /// Re-encode or edit the video.
    ProcessVideo,
    /// Push artifacts to output targets.
    Upload,
}

impl StageType {
    /// Stable lowercase label used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Transcribe => "transcribe",
            Self::ExtractTopics => "extract_topics",
            Self::GenerateSubtitles => "generate_subtitles",
            Self::ProcessVideo => "process_video",
            Self::Upload => "upload",
        }
    }

    /// All stage kinds, in pipeline order.
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::Download,
            Self::Transcribe,
            Self::ExtractTopics,
            Self::GenerateSubtitles,
            Self::ProcessVideo,
            Self::Upload,
        ]
    }
}

/// Execution state of a single processing stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Created but not started.
    Pending,
    /// A worker is executing the stage.
    InProgress,
    /// Finished successfully.
    Completed,
    /// Finished with an error; eligible for retry.
    Failed,
}

impl StageStatus {
    /// Stable lowercase label used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Destination platforms a recording can be uploaded to.
///
/// The lowercase name doubles as the platform key inside template
/// `metadata_config` trees and the `platform` column of output presets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// `YouTube` upload target.
    Youtube,
    /// Vimeo upload target.
    Vimeo,
    /// Rumble upload target.
    Rumble,
}

impl TargetType {
    /// Stable lowercase label used in storage and metadata trees.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Vimeo => "vimeo",
            Self::Rumble => "rumble",
        }
    }

    /// All supported platforms.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Youtube, Self::Vimeo, Self::Rumble]
    }
}

/// Upload state of a single output target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    /// No upload attempted yet.
    NotUploaded,
    /// Upload in flight.
    Uploading,
    /// Upload finished successfully.
    Uploaded,
    /// Upload failed; eligible for retry.
    Failed,
}

impl TargetStatus {
    /// Stable lowercase label used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotUploaded => "not_uploaded",
            Self::Uploading => "uploading",
            Self::Uploaded => "uploaded",
            Self::Failed => "failed",
        }
    }
}

/// Typed domain events surfaced across the system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A template matched a previously unmapped recording.
    RecordingMatched {
        /// Identifier of the recording that was matched.
        recording_id: Uuid,
        /// Identifier of the template that matched.
        template_id: Uuid,
    },
    /// A recording lost its template linkage (template deleted).
    RecordingUnmapped {
        /// Identifier of the recording that was unmapped.
        recording_id: Uuid,
        /// Identifier of the template it previously referenced.
        template_id: Uuid,
    },
    /// Aggregate status of a recording changed.
    StatusChanged {
        /// Identifier of the recording whose status changed.
        recording_id: Uuid,
        /// New aggregate status.
        status: ProcessingStatus,
    },
    /// A processing stage transitioned.
    StageUpdated {
        /// Identifier of the recording that owns the stage.
        recording_id: Uuid,
        /// Stage kind that transitioned.
        stage_type: StageType,
        /// New stage status.
        status: StageStatus,
    },
    /// An output target transitioned.
    TargetUpdated {
        /// Identifier of the recording that owns the target.
        recording_id: Uuid,
        /// Platform target that transitioned.
        target_type: TargetType,
        /// New target status.
        status: TargetStatus,
    },
    /// A template was deleted and its recordings released.
    TemplateDeleted {
        /// Identifier of the removed template.
        template_id: Uuid,
        /// Number of recordings that were unmapped.
        released: u64,
    },
}

impl Event {
    /// Machine-friendly discriminator for SSE consumers.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RecordingMatched { .. } => "recording_matched",
            Self::RecordingUnmapped { .. } => "recording_unmapped",
            Self::StatusChanged { .. } => "status_changed",
            Self::StageUpdated { .. } => "stage_updated",
            Self::TargetUpdated { .. } => "target_updated",
            Self::TemplateDeleted { .. } => "template_deleted",
        }
    }
}

/// Metadata wrapper around events. Each envelope tracks the event id and emission timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    /// Monotonic identifier assigned to the wrapped event.
    pub id: EventId,
    /// Timestamp recording when the envelope was produced.
    pub timestamp: DateTime<Utc>,
    /// Wrapped event payload.
    pub event: Event,
}
