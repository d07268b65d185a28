//! # Folio
//!
//! A page-native report layout engine.
//!
//! Folio takes an ordered sequence of styled blocks (titles, headings,
//! paragraphs, spacers, tables, explicit page breaks) and distributes them
//! across fixed-size pages. The page is the unit of layout: every block is
//! measured against the space left on the current page, and tables that run
//! past the bottom are cut between rows with their header row repeated on
//! the next page.
//!
//! The output is a list of pages holding positioned fragments. Turning those
//! into PDF, PostScript, or pixels is the job of a renderer downstream.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    - Document: blocks, page geometry, style catalog
//!       ↓
//!   [style]    - Resolve parent chains, detect cycles, cache
//!       ↓
//!   [text]     - Wrap and measure with [font] metrics
//!       ↓
//!   [layout]   - Flow blocks into pages, split tables by row
//!       ↓
//!   [builder]  - Validate, run the paginator, hand back pages
//! ```

pub mod builder;
pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod style;
pub mod text;

pub use builder::{DocumentBuilder, LaidOutDocument};
pub use error::{Error, LayoutError, Result};

use model::Document;

/// Lay out a document into pages.
///
/// This is the primary entry point. Every input problem (unknown or cyclic
/// styles, impossible geometry, tables wider than the page) is reported
/// before any block is placed.
pub fn layout(document: &Document) -> Result<LaidOutDocument> {
    Ok(DocumentBuilder::new(document).build()?)
}

/// Lay out a document described as JSON.
pub fn layout_json(json: &str) -> Result<LaidOutDocument> {
    let document: Document = serde_json::from_str(json)?;
    layout(&document)
}
