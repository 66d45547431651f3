//! Error types for scrollscape.
//!
//! Generation and rendering never fail: bad numbers degrade to fewer
//! particles. Errors only surface at the edges, when configuration is
//! loaded or validated and when frames are exported.

use std::path::PathBuf;

/// Errors raised while loading or validating a [`crate::ParticleSystemConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    #[error("config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JSON did not match the config schema.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field is outside its documented range.
    #[error("invalid config: {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while exporting a rendered frame.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The image encoder failed.
    #[error("failed to encode frame: {0}")]
    Image(#[from] image::ImageError),

    /// The output directory could not be prepared.
    #[error("failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by [`crate::Scene`].
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The new configuration was rejected; the previous field stays live.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A lock was poisoned by a panicking rebuild.
    #[error("scene state poisoned: {0}")]
    Poisoned(&'static str),

    /// The background rebuild thread panicked.
    #[error("background rebuild panicked")]
    WorkerPanicked,
}
