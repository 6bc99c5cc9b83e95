//! Unified error handling for the indexing pipeline.
//!
//! Per-track failures (projection, naming) are isolated by the callers:
//! the pipeline and the indexer log them, record them in the run summary
//! and continue with the next track. Feature-store write failures are
//! fatal for the current run.

use thiserror::Error;

/// Errors produced by the normalization, indexing and styling stages.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Input coordinates are out of range for the declared format, or the
    /// declared hemisphere does not contain them.
    #[error("projection error: {reason}")]
    Projection { reason: String },

    /// A granule name does not match any registered naming convention.
    #[error(
        "granule '{granule}' from institution '{institution}' does not match any known naming convention"
    )]
    UnresolvedNamingConvention {
        institution: String,
        granule: String,
    },

    /// A campaign has no entry in the availability catalog.
    #[error("campaign '{campaign}' has no resolvable availability status")]
    UnknownStatus { campaign: String },

    /// A feature-store write failed. Fatal for the current indexing run.
    #[error("feature store write failed on layer '{layer}': {reason}")]
    StoreWrite { layer: String, reason: String },

    /// A store read addressed a layer that does not exist.
    #[error("no such layer: '{name}'")]
    UnknownLayer { name: String },

    /// A track has too few points for its geometry type.
    #[error("track '{name}' has {point_count} points, need at least {minimum_required}")]
    InsufficientPoints {
        name: String,
        point_count: usize,
        minimum_required: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("style artifact error: {0}")]
    Artifact(#[from] serde_json::Error),

    #[error("unsupported style artifact version {version}, expected {expected}")]
    UnsupportedArtifactVersion { version: u32, expected: u32 },
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IndexError>;
