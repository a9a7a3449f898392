//! # Error Types
//!
//! This module defines error types used throughout the certmerge library.
//!
//! Text measurement failures are not errors: the style renderer recovers
//! from them locally with a size-based estimate.

use thiserror::Error;

/// Main error type for certmerge operations
#[derive(Debug, Error)]
pub enum CertmergeError {
    /// A record lacks a field referenced by the layout
    #[error("Record '{record}' has no field '{field}'")]
    MissingField { record: String, field: String },

    /// The artifact can never fit on a page, even an empty one
    #[error(
        "Artifact of {artifact_width}x{artifact_height}px does not fit the usable page area \
         of {usable_width}x{usable_height}px (page minus margins)"
    )]
    DegenerateGeometry {
        artifact_width: u32,
        artifact_height: u32,
        usable_width: u32,
        usable_height: u32,
    },

    /// The batch was cancelled at a record boundary
    #[error("Batch cancelled after {processed} of {total} records")]
    Cancelled { processed: usize, total: usize },

    /// Physical length or page size could not be parsed
    #[error("Invalid length: {0}")]
    InvalidLength(String),

    /// Layout document could not be interpreted
    #[error("Layout error: {0}")]
    Layout(String),

    /// Font could not be loaded
    #[error("Font error: {0}")]
    Font(String),

    /// Image decode, resize or encode error
    #[error("Image error: {0}")]
    Image(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
