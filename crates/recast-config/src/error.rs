//! Error types for configuration resolution.

use thiserror::Error;
use uuid::Uuid;

/// Primary error type for configuration resolution.
///
/// Resolution is designed to degrade rather than fail: missing optional data
/// (no user configuration, no matched template, no preferences) always
/// resolves to the empty tree. Only the preset-rooted upload metadata chain
/// can fail, because its root input is a hard constraint.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The named output preset does not exist, is inactive, or is owned by a
    /// different user.
    #[error("output preset not found")]
    PresetNotFound {
        /// Preset identifier supplied by the caller.
        preset_id: Uuid,
        /// User the lookup was scoped to.
        user_id: Uuid,
    },
    /// The preset lookup itself failed in the storage collaborator.
    #[error("output preset lookup failed")]
    PresetLookupFailed {
        /// Preset identifier supplied by the caller.
        preset_id: Uuid,
        /// Underlying storage failure.
        #[source]
        source: anyhow::Error,
    },
}
