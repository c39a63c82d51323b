//! Error types for the clipping library.
//!
//! This module defines all error types that can occur while opening documents,
//! compositing clips, exporting, and talking to the inference API.

/// Result type alias for clipping operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during clipping and export.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input bytes could not be opened as a PDF document.
    ///
    /// Policy: skip the offending file and continue with the rest of a batch.
    #[error("Failed to decode document: {0}")]
    DecodeFailure(String),

    /// A page raster could not be produced by the external renderer.
    ///
    /// Policy: abort the current save, leave the catalog unchanged.
    #[error("Failed to render page: {0}")]
    RenderFailure(String),

    /// PDF or archive assembly failed.
    ///
    /// Policy: abort the export, write no partial artifact.
    #[error("Failed to assemble export artifact: {0}")]
    EncodeFailure(String),

    /// Network/API error or malformed response from the inference service.
    ///
    /// Policy: mark the affected clip visibly, never propagate past the
    /// triggering action.
    #[error("Inference request failed: {0}")]
    InferenceFailure(String),

    /// An export was requested with no clips in the catalog.
    #[error("No clips to export")]
    EmptyCatalog,

    /// A clip save was requested without a materialized crop rectangle.
    #[error("No crop rectangle has been drawn")]
    EmptyCropRect,

    /// An operation needing a selected document was invoked without one.
    #[error("No document is selected")]
    NoDocument,

    /// A page number outside the selected document was requested.
    #[error("Page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange {
        /// Requested 1-based page number
        page: u32,
        /// Number of pages in the document
        page_count: u32,
    },

    /// A catalog operation referenced a clip id that no longer exists.
    #[error("Unknown clip id: {0}")]
    UnknownClip(u64),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
