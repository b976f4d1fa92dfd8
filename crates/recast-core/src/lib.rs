//! Recording pipeline domain types and decision logic.
//!
//! Layout: `model` (entities and DTOs shared across the workspace), `status`
//! (the aggregate status state machine and gating predicates), `service`
//! (persistence collaborator traits and the status refresh helper).

pub mod model;
pub mod service;
pub mod status;

pub use model::{
    MatchingRules, OutputPreset, OutputTarget, ProcessingStage, Recording, RecordingIdentity,
    RecordingTemplate,
};
pub use service::{
    PresetStore, RecordingStore, RematchScope, TemplateStore, UserConfigStore, refresh_status,
};
pub use status::{
    compute_aggregate_status, may_download, may_process, may_transcribe, may_upload,
};
