//! Companion initializers planning stage and target children.
//!
//! Stages and targets are created lazily, driven by the effective
//! configuration: a stage child appears once the processing configuration
//! enables it, and a target child appears once the output configuration
//! names a preset for a platform the recording does not cover yet. Planning
//! is pure; the returned rows are persisted by the caller.

use recast_core::model::{OutputPreset, OutputTarget, ProcessingStage, Recording};
use recast_events::StageType;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

/// Mapping from processing-configuration keys to the stage they enable.
const STAGE_KEYS: [(&str, StageType); 6] = [
    ("download", StageType::Download),
    ("transcription", StageType::Transcribe),
    ("topic_extraction", StageType::ExtractTopics),
    ("subtitles", StageType::GenerateSubtitles),
    ("video_processing", StageType::ProcessVideo),
    ("upload", StageType::Upload),
];

/// Plan the stage children the effective processing configuration enables
/// but the recording does not have yet. At most one stage per kind is ever
/// planned; existing stages are never touched.
#[must_use]
pub fn plan_stages(recording: &Recording, processing_config: &Value) -> Vec<ProcessingStage> {
    let mut planned = Vec::new();
    for (key, stage_type) in STAGE_KEYS {
        if recording.stage(stage_type).is_some() {
            continue;
        }
        let Some(section) = processing_config.get(key) else {
            continue;
        };
        if !stage_enabled(section) {
            continue;
        }
        planned.push(ProcessingStage::pending(
            recording.id,
            stage_type,
            stage_metadata(section),
        ));
    }
    planned
}

/// Plan the output targets for presets named by the effective output
/// configuration whose platforms the recording does not cover yet.
///
/// `presets` is the caller-fetched resolution of [`preset_ids`]; ids that
/// did not resolve to an owned, active preset are skipped.
#[must_use]
pub fn plan_targets(
    recording: &Recording,
    output_config: &Value,
    presets: &[OutputPreset],
) -> Vec<OutputTarget> {
    let mut planned: Vec<OutputTarget> = Vec::new();
    for preset_id in preset_ids(output_config) {
        let Some(preset) = presets.iter().find(|preset| preset.id == preset_id) else {
            debug!(%preset_id, "output preset did not resolve, skipping target");
            continue;
        };
        let covered = recording.target(preset.platform).is_some()
            || planned
                .iter()
                .any(|target| target.target_type == preset.platform);
        if covered {
            continue;
        }
        planned.push(OutputTarget::not_uploaded(
            recording.id,
            preset.platform,
            Some(preset.id),
        ));
    }
    planned
}

/// Extract the preset ids an output configuration names, in order.
///
/// Entries that are not well-formed UUID strings are skipped.
#[must_use]
pub fn preset_ids(output_config: &Value) -> Vec<Uuid> {
    let Some(Value::Array(entries)) = output_config.get("preset_ids") else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let id = entry.as_str().and_then(|raw| Uuid::parse_str(raw).ok());
            if id.is_none() {
                debug!(?entry, "ignoring malformed preset id in output configuration");
            }
            id
        })
        .collect()
}

/// A stage section enables its stage when it is `true` or an object whose
/// `enabled` flag is `true`.
fn stage_enabled(section: &Value) -> bool {
    match section {
        Value::Bool(enabled) => *enabled,
        Value::Object(map) => map.get("enabled").and_then(Value::as_bool) == Some(true),
        _ => false,
    }
}

/// Stage metadata is the configuration section minus its `enabled` flag.
fn stage_metadata(section: &Value) -> Value {
    match section {
        Value::Object(map) => {
            let mut metadata = map.clone();
            metadata.remove("enabled");
            Value::Object(metadata)
        }
        _ => Value::Object(Map::new()),
    }
}
