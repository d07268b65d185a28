//! # Document Model
//!
//! The input representation for the layout engine. A document is a flat,
//! ordered sequence of typed blocks plus page geometry and a style catalog.
//! It is built once by the caller (directly, or from JSON) and handed to the
//! engine read-only.
//!
//! Blocks never carry resolved styles, only style names. Resolution happens
//! during layout so that one catalog can serve every block that mentions it.

use serde::{Deserialize, Serialize};

use crate::style::Style;

/// A complete document ready for layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The content, in reading order.
    pub blocks: Vec<Block>,

    /// The caller's style catalog.
    #[serde(default)]
    pub styles: Vec<Style>,

    /// Whether the built-in sample catalog sits underneath `styles`.
    #[serde(default = "default_true")]
    pub use_sample_styles: bool,

    /// Page size and margins shared by every page.
    #[serde(default)]
    pub page: PageGeometry,

    /// Passed through to the output untouched.
    #[serde(default)]
    pub metadata: Metadata,
}

fn default_true() -> bool {
    true
}

impl Document {
    pub fn new(page: PageGeometry, styles: Vec<Style>, blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            styles,
            use_sample_styles: true,
            page,
            metadata: Metadata::default(),
        }
    }
}

/// Document metadata for the downstream renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

/// Page size and margins, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    #[serde(default)]
    pub size: PageSize,
    #[serde(default = "default_margin")]
    pub margin: Edges,
}

fn default_margin() -> Edges {
    Edges::uniform(72.0)
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            size: PageSize::Letter,
            margin: default_margin(),
        }
    }
}

impl PageGeometry {
    pub fn new(size: PageSize, margin: Edges) -> Self {
        Self { size, margin }
    }

    /// Usable width: page width minus left and right margins.
    pub fn content_width(&self) -> f64 {
        self.size.dimensions().0 - self.margin.horizontal()
    }

    /// Usable height: page height minus top and bottom margins.
    pub fn content_height(&self) -> f64 {
        self.size.dimensions().1 - self.margin.vertical()
    }

    /// The content box in page coordinates (origin top-left).
    pub fn content_box(&self) -> Rect {
        Rect {
            x: self.margin.left,
            y: self.margin.top,
            width: self.content_width(),
            height: self.content_height(),
        }
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    A4,
    A3,
    A5,
    #[default]
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left) used for margin and padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// An axis-aligned rectangle in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One renderable unit of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Block {
    Title {
        text: String,
        style: String,
    },
    Heading {
        text: String,
        style: String,
        /// Outline depth, 1 for top-level sections.
        #[serde(default = "default_level")]
        level: u8,
    },
    Paragraph {
        text: String,
        style: String,
    },
    /// Fixed vertical gap in points.
    Spacer {
        height: f64,
    },
    Table(Table),
    PageBreak,
}

fn default_level() -> u8 {
    1
}

impl Block {
    pub fn title(text: &str, style: &str) -> Self {
        Block::Title {
            text: text.to_string(),
            style: style.to_string(),
        }
    }

    pub fn heading(text: &str, style: &str) -> Self {
        Block::Heading {
            text: text.to_string(),
            style: style.to_string(),
            level: 1,
        }
    }

    pub fn paragraph(text: &str, style: &str) -> Self {
        Block::Paragraph {
            text: text.to_string(),
            style: style.to_string(),
        }
    }

    pub fn spacer(height: f64) -> Self {
        Block::Spacer { height }
    }

    /// The style name this block refers to, if it carries one.
    pub fn style_name(&self) -> Option<&str> {
        match self {
            Block::Title { style, .. }
            | Block::Heading { style, .. }
            | Block::Paragraph { style, .. } => Some(style),
            Block::Table(table) => Some(&table.style),
            Block::Spacer { .. } | Block::PageBreak => None,
        }
    }

    /// Human-readable variant name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Title { .. } => "Title",
            Block::Heading { .. } => "Heading",
            Block::Paragraph { .. } => "Paragraph",
            Block::Spacer { .. } => "Spacer",
            Block::Table(_) => "Table",
            Block::PageBreak => "PageBreak",
        }
    }
}

/// A grid of text cells with fixed column widths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Default style for every cell; also supplies the table's spacing.
    pub style: String,
    /// Column widths in points.
    pub columns: Vec<f64>,
    pub rows: Vec<Vec<String>>,
    /// Row that repeats at the top of every continuation fragment.
    #[serde(default)]
    pub header_row: Option<usize>,
    /// Region-scoped style overrides, applied by specificity.
    #[serde(default)]
    pub regions: Vec<RegionStyle>,
}

impl Table {
    /// A table whose first row is the header.
    pub fn with_header(style: &str, columns: Vec<f64>, rows: Vec<Vec<&str>>) -> Self {
        Self {
            style: style.to_string(),
            columns,
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect(),
            header_row: Some(0),
            regions: Vec::new(),
        }
    }

    /// Attach a region style (builder style).
    pub fn region(mut self, region: StyleRegion, style: &str) -> Self {
        self.regions.push(RegionStyle {
            region,
            style: style.to_string(),
        });
        self
    }

    pub fn columns_width(&self) -> f64 {
        self.columns.iter().sum()
    }
}

/// A style applied to every cell a region covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStyle {
    pub region: StyleRegion,
    pub style: String,
}

/// The set of cells a region style applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum StyleRegion {
    AllCells,
    HeaderRow,
    BodyRows,
    Column { index: usize },
    Row { index: usize },
    Cell { row: usize, column: usize },
}

impl StyleRegion {
    /// Higher wins: per-cell > per-row > table region > all cells.
    pub fn specificity(&self) -> u8 {
        match self {
            StyleRegion::Cell { .. } => 3,
            StyleRegion::Row { .. } => 2,
            StyleRegion::HeaderRow | StyleRegion::BodyRows | StyleRegion::Column { .. } => 1,
            StyleRegion::AllCells => 0,
        }
    }

    pub fn covers(&self, row: usize, column: usize, header_row: Option<usize>) -> bool {
        match *self {
            StyleRegion::AllCells => true,
            StyleRegion::HeaderRow => header_row == Some(row),
            StyleRegion::BodyRows => header_row != Some(row),
            StyleRegion::Column { index } => index == column,
            StyleRegion::Row { index } => index == row,
            StyleRegion::Cell { row: r, column: c } => r == row && c == column,
        }
    }
}
