//! # Document Builder
//!
//! The thin orchestrator: validate the inputs, build the style catalog, run
//! the paginator to completion, hand back the pages.
//!
//! Validation is eager. Geometry, every style a block or table region names,
//! and every table's shape and width are checked before the first block is
//! placed, so a bad document fails before any layout work is done.

use serde::Serialize;

use crate::error::LayoutError;
use crate::layout::table::TableLayout;
use crate::layout::{FlowPaginator, Page};
use crate::model::{Block, Document, Metadata, PageGeometry};
use crate::style::{StyleResolver, StyleSheet};

/// The finished page set, ready for a downstream renderer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaidOutDocument {
    pub metadata: Metadata,
    pub pages: Vec<Page>,
}

impl LaidOutDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialize the page set as pretty-printed JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| crate::Error::Serialize(e.to_string()))
    }
}

pub struct DocumentBuilder<'d> {
    document: &'d Document,
}

impl<'d> DocumentBuilder<'d> {
    pub fn new(document: &'d Document) -> Self {
        Self { document }
    }

    /// Margins must leave a positive content box on a positive page.
    pub fn validate_geometry(geometry: &PageGeometry) -> Result<(), LayoutError> {
        let (width, height) = geometry.size.dimensions();
        let margin = &geometry.margin;
        let invalid = |reason: String| Err(LayoutError::InvalidGeometry { reason });

        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return invalid(format!("page size {width}x{height} is not positive"));
        }
        let edges = [margin.top, margin.right, margin.bottom, margin.left];
        if edges.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return invalid("margins must be finite and non-negative".to_string());
        }
        if margin.horizontal() >= width {
            return invalid(format!(
                "left + right margins ({}) leave no width on a {width}pt page",
                margin.horizontal()
            ));
        }
        if margin.vertical() >= height {
            return invalid(format!(
                "top + bottom margins ({}) leave no height on a {height}pt page",
                margin.vertical()
            ));
        }
        Ok(())
    }

    /// The catalog for this document: the caller's styles, layered over the
    /// sample sheet when the document asks for it.
    pub fn style_sheet(&self) -> Result<StyleSheet, LayoutError> {
        let own = StyleSheet::from_styles(self.document.styles.iter().cloned())?;
        if self.document.use_sample_styles {
            Ok(StyleSheet::sample().extended_with(own))
        } else {
            Ok(own)
        }
    }

    /// Check every input-shape invariant without laying anything out.
    pub fn validate(&self, resolver: &StyleResolver<'_>) -> Result<(), LayoutError> {
        Self::validate_geometry(&self.document.page)?;
        let usable_width = self.document.page.content_width();

        for (index, block) in self.document.blocks.iter().enumerate() {
            if let Some(name) = block.style_name() {
                resolver.resolve(name)?;
            }
            if let Block::Table(table) = block {
                TableLayout::validate(table, index, usable_width)?;
                for entry in &table.regions {
                    resolver.resolve(&entry.style)?;
                }
            }
        }
        Ok(())
    }

    /// Validate, paginate, and return the finished pages.
    pub fn build(&self) -> Result<LaidOutDocument, LayoutError> {
        let sheet = self.style_sheet()?;
        let resolver = StyleResolver::new(&sheet);
        self.validate(&resolver)?;

        log::debug!(
            "laying out {} block(s) with {} style(s)",
            self.document.blocks.len(),
            sheet.len()
        );
        let pages = FlowPaginator::new(&resolver, self.document.page).paginate(&self.document.blocks)?;
        log::debug!("layout produced {} page(s)", pages.len());

        Ok(LaidOutDocument {
            metadata: self.document.metadata.clone(),
            pages,
        })
    }
}
