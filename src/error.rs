//! Structured error types for the Folio layout engine.
//!
//! Every layout failure is a deterministic input-shape problem, detected
//! eagerly at first use and returned to the caller. Visual overflow is not
//! an error and never shows up here.

use thiserror::Error;

/// Result alias used by the public API.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised while resolving styles, validating geometry, or
/// validating tables.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A style's parent chain revisits a style it already passed through.
    #[error("cyclic style inheritance: {}", chain.join(" -> "))]
    CyclicStyle { chain: Vec<String> },

    /// A block, table region, or parent link names a style that was never declared.
    #[error("unknown style '{name}'")]
    UnknownStyle { name: String },

    /// The caller's catalog declares the same style name twice.
    #[error("style '{name}' is declared more than once")]
    DuplicateStyle { name: String },

    /// Margins leave no content box on the page.
    #[error("invalid page geometry: {reason}")]
    InvalidGeometry { reason: String },

    /// A table's declared columns are wider than the usable page width.
    #[error(
        "table in block {block_index} is {columns_width}pt wide but only {usable_width}pt are usable"
    )]
    BlockTooNarrow {
        block_index: usize,
        columns_width: f64,
        usable_width: f64,
    },

    /// A table violates its shape invariants (cell count, header index, emptiness).
    #[error("malformed table in block {block_index}: {reason}")]
    MalformedTable { block_index: usize, reason: String },
}

/// The unified error type returned by the entry points in the crate root.
#[derive(Debug, Error)]
pub enum Error {
    /// JSON input failed to parse as a valid Folio document.
    #[error("failed to parse document: {source}{}", format_hint(hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// The document parsed but could not be laid out.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Page output could not be serialized.
    #[error("failed to serialize pages: {0}")]
    Serialize(String),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the document schema. Check block types and field names.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        Error::Parse { source: e, hint }
    }
}
