//! # Page-Aware Flow Layout
//!
//! Blocks are packed INTO pages, top to bottom, one page at a time. There is
//! no infinite canvas that gets sliced afterwards.
//!
//! 1. Open a page with a known content box and the full height remaining
//! 2. Measure the next block. Before placing, ask: "does this fit?"
//! 3. If it fits: place it, reduce remaining space
//! 4. If it doesn't fit: close the page and try again on a fresh one
//! 5. If it doesn't fit on a fresh page either: place it anyway and let it
//!    overflow. Blocks are never dropped and layout never fails on size
//! 6. For tables: place the rows that fit, close the page, and continue the
//!    rest on the next page with the header row repeated on top
//!
//! Everything is measured from resolved styles and fixed metrics, so the same
//! document always paginates the same way.

pub mod page_break;
pub mod table;

use std::sync::Arc;

use serde::Serialize;

use crate::error::LayoutError;
use crate::model::{Block, PageGeometry, Rect};
use crate::style::{ResolvedStyle, StyleResolver};
use crate::text::{TextMeasurer, TextMetrics};
use table::{MeasuredRow, MeasuredTable, TableLayout, TableProgress, TableSplit};

/// A laid-out page: fragments positioned inside the content box.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// One-based page number.
    pub number: usize,
    pub width: f64,
    pub height: f64,
    pub content_box: Rect,
    pub fragments: Vec<Fragment>,
}

impl Page {
    /// Height consumed by fragments, measured from the content box top.
    pub fn used_height(&self) -> f64 {
        self.fragments
            .last()
            .map(|f| f.y + f.height)
            .unwrap_or(0.0)
    }

    /// True when content runs past the bottom of the content box.
    pub fn overflows(&self) -> bool {
        self.used_height() > self.content_box.height
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// A placed, possibly partial, rendering of one block.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    /// Index of the source block in the document.
    pub block_index: usize,
    /// Offset of the fragment top from the content box top.
    pub y: f64,
    pub height: f64,
    pub content: FragmentContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum FragmentContent {
    Text {
        kind: TextKind,
        style: Arc<ResolvedStyle>,
        text: TextMetrics,
    },
    Spacer,
    Table(TableFragment),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextKind {
    Title,
    Heading { level: u8 },
    Paragraph,
}

/// The rows of one table that landed on one page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableFragment {
    /// Zero-based index of this fragment among the table's fragments.
    pub part: usize,
    /// Whether more rows follow on the next page.
    pub continues: bool,
    pub column_widths: Vec<f64>,
    pub rows: Vec<PlacedRow>,
}

impl TableFragment {
    /// Source rows placed here, excluding a repeated header copy.
    pub fn source_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .iter()
            .filter(|r| !r.repeated_header)
            .map(|r| r.row.source_row)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedRow {
    /// Offset of the row top from the fragment top.
    pub y: f64,
    /// True for the copy of the header row that opens a continuation.
    pub repeated_header: bool,
    #[serde(flatten)]
    pub row: MeasuredRow,
}

/// States of the pagination loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowState {
    Accumulating,
    PageFull,
    EmittingSplitTable,
    Done,
}

/// Work waiting to be placed: a whole block, or the rest of a table.
#[derive(Debug)]
enum Pending {
    Block(usize),
    Table {
        block_index: usize,
        table: Box<MeasuredTable>,
        progress: TableProgress,
    },
}

/// Tracks where we are on the current page during layout.
#[derive(Debug, Clone)]
struct PageCursor {
    number: usize,
    geometry: PageGeometry,
    content_height: f64,
    y: f64,
    fragments: Vec<Fragment>,
}

impl PageCursor {
    fn new(geometry: &PageGeometry, number: usize) -> Self {
        Self {
            number,
            geometry: *geometry,
            content_height: geometry.content_height(),
            y: 0.0,
            fragments: Vec::new(),
        }
    }

    fn remaining_height(&self) -> f64 {
        (self.content_height - self.y).max(0.0)
    }

    fn fits(&self, height: f64) -> bool {
        height <= self.remaining_height()
    }

    fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    fn place(&mut self, block_index: usize, height: f64, content: FragmentContent) {
        log::trace!(
            "page {}: block {} at y={:.2} h={:.2}",
            self.number,
            block_index,
            self.y,
            height
        );
        self.fragments.push(Fragment {
            block_index,
            y: self.y,
            height,
            content,
        });
        self.y += height;
    }

    fn finalize(self) -> Page {
        let (width, height) = self.geometry.size.dimensions();
        let page = Page {
            number: self.number,
            width,
            height,
            content_box: self.geometry.content_box(),
            fragments: self.fragments,
        };
        if page.overflows() {
            log::warn!(
                "page {} overflows its content box ({:.2} > {:.2})",
                page.number,
                page.used_height(),
                page.content_box.height
            );
        }
        log::debug!(
            "closed page {} with {} fragment(s)",
            page.number,
            page.fragments.len()
        );
        page
    }

    fn new_page(&self) -> Self {
        PageCursor::new(&self.geometry, self.number + 1)
    }
}

/// Walks the block sequence and packs it into pages.
pub struct FlowPaginator<'a> {
    resolver: &'a StyleResolver<'a>,
    measurer: TextMeasurer,
    tables: TableLayout,
    geometry: PageGeometry,
}

impl<'a> FlowPaginator<'a> {
    pub fn new(resolver: &'a StyleResolver<'a>, geometry: PageGeometry) -> Self {
        let measurer = TextMeasurer::new();
        Self {
            resolver,
            measurer,
            tables: TableLayout::new(measurer),
            geometry,
        }
    }

    /// Lay out every block. The result always holds at least one page.
    pub fn paginate(&self, blocks: &[Block]) -> Result<Vec<Page>, LayoutError> {
        let mut pages: Vec<Page> = Vec::new();
        let mut cursor = PageCursor::new(&self.geometry, 1);
        let mut next_block = 0;
        let mut pending: Option<Pending> = None;
        let mut state = FlowState::Accumulating;

        loop {
            match state {
                FlowState::Accumulating => {
                    let work = match pending.take() {
                        Some(work) => work,
                        None if next_block < blocks.len() => {
                            next_block += 1;
                            Pending::Block(next_block - 1)
                        }
                        None => {
                            state = FlowState::Done;
                            continue;
                        }
                    };

                    let block_index = match work {
                        Pending::Block(index) => index,
                        table @ Pending::Table { .. } => {
                            pending = Some(table);
                            state = FlowState::EmittingSplitTable;
                            continue;
                        }
                    };

                    match &blocks[block_index] {
                        Block::PageBreak => {
                            state = FlowState::PageFull;
                        }
                        Block::Table(table) => {
                            let measured = self.measure_table(table, block_index)?;
                            let progress = TableProgress::start(&measured);
                            pending = Some(Pending::Table {
                                block_index,
                                table: Box::new(measured),
                                progress,
                            });
                            state = FlowState::EmittingSplitTable;
                        }
                        block => {
                            let (height, content) = self.measure_block(block)?;
                            if cursor.fits(height) || cursor.is_empty() {
                                if !cursor.fits(height) {
                                    log::warn!(
                                        "{} block {} is taller than a page ({:.2}pt); placing it alone",
                                        block.kind_name(),
                                        block_index,
                                        height
                                    );
                                }
                                cursor.place(block_index, height, content);
                            } else {
                                pending = Some(Pending::Block(block_index));
                                state = FlowState::PageFull;
                            }
                        }
                    }
                }

                FlowState::EmittingSplitTable => {
                    let Some(Pending::Table {
                        block_index,
                        table,
                        progress,
                    }) = pending.take()
                    else {
                        state = FlowState::Accumulating;
                        continue;
                    };

                    let lead = if progress.part == 0 {
                        table.spacing_before
                    } else {
                        0.0
                    };
                    // Trailing spacing only follows the last fragment, so a
                    // fragment that continues may use that room for rows.
                    let available = cursor.remaining_height() - lead;
                    let mut split =
                        self.tables
                            .split(&table, &progress, available - table.spacing_after);
                    if !split.is_complete() {
                        let wider = self.tables.split(&table, &progress, available);
                        if !wider.is_complete() {
                            split = wider;
                        }
                    }
                    if split.is_empty() && cursor.is_empty() {
                        log::warn!(
                            "table block {} cannot fit a data row on an empty page; forcing one",
                            block_index
                        );
                        split = self.tables.forced_split(&table, &progress);
                    }

                    if split.is_empty() {
                        pending = Some(Pending::Table {
                            block_index,
                            table,
                            progress,
                        });
                        state = FlowState::PageFull;
                        continue;
                    }

                    let (height, fragment) = table_fragment(&table, &progress, &split);
                    cursor.place(block_index, height, FragmentContent::Table(fragment));

                    if split.is_complete() {
                        state = FlowState::Accumulating;
                    } else {
                        log::debug!(
                            "table block {} split after row {} on page {}",
                            block_index,
                            split.fitting.end - 1,
                            cursor.number
                        );
                        let progress = TableProgress {
                            repeat_header: table.repeats_header_before(split.remaining.start),
                            rows: split.remaining,
                            part: progress.part + 1,
                        };
                        pending = Some(Pending::Table {
                            block_index,
                            table,
                            progress,
                        });
                        state = FlowState::PageFull;
                    }
                }

                FlowState::PageFull => {
                    let next = cursor.new_page();
                    pages.push(std::mem::replace(&mut cursor, next).finalize());
                    state = FlowState::Accumulating;
                }

                FlowState::Done => break,
            }
        }

        // A trailing empty page is only kept when it is the only page.
        if !cursor.is_empty() || pages.is_empty() {
            pages.push(cursor.finalize());
        }

        Ok(pages)
    }

    /// Height and content of a block that is placed whole.
    fn measure_block(&self, block: &Block) -> Result<(f64, FragmentContent), LayoutError> {
        let usable_width = self.geometry.content_width();
        let (text, style_name, kind) = match block {
            Block::Title { text, style } => (text, style, TextKind::Title),
            Block::Heading { text, style, level } => {
                (text, style, TextKind::Heading { level: *level })
            }
            Block::Paragraph { text, style } => (text, style, TextKind::Paragraph),
            Block::Spacer { height } => return Ok((height.max(0.0), FragmentContent::Spacer)),
            Block::Table(_) | Block::PageBreak => {
                unreachable!("tables and page breaks are handled by the flow loop")
            }
        };

        let style = self.resolver.resolve(style_name)?;
        let metrics = self.measurer.measure_markup(text, &style, usable_width);
        Ok((
            metrics.height,
            FragmentContent::Text {
                kind,
                style,
                text: metrics,
            },
        ))
    }

    fn measure_table(
        &self,
        table: &crate::model::Table,
        block_index: usize,
    ) -> Result<MeasuredTable, LayoutError> {
        let usable_width = self.geometry.content_width();
        TableLayout::validate(table, block_index, usable_width)?;
        let table_style = self.resolver.resolve(&table.style)?;
        let cell_styles = TableLayout::cell_styles(table, self.resolver)?;
        self.tables
            .layout(table, &table_style, &cell_styles, block_index, usable_width)
    }
}

/// Build the fragment for the fitting rows, with the header copy on top of
/// continuations, and return its total height.
fn table_fragment(
    table: &MeasuredTable,
    progress: &TableProgress,
    split: &TableSplit,
) -> (f64, TableFragment) {
    let mut y = if progress.part == 0 {
        table.spacing_before
    } else {
        0.0
    };
    let mut rows = Vec::new();

    if progress.repeat_header {
        if let Some(h) = table.header_row {
            let header = table.rows[h].clone();
            let height = header.height;
            rows.push(PlacedRow {
                y,
                repeated_header: true,
                row: header,
            });
            y += height;
        }
    }

    for row in &table.rows[split.fitting.clone()] {
        rows.push(PlacedRow {
            y,
            repeated_header: false,
            row: row.clone(),
        });
        y += row.height;
    }

    if split.is_complete() {
        y += table.spacing_after;
    }

    (
        y,
        TableFragment {
            part: progress.part,
            continues: !split.is_complete(),
            column_widths: table.column_widths.clone(),
            rows,
        },
    )
}

/// Source rows covered by a run of fragments of one table, in order.
pub fn table_rows_on(pages: &[Page], block_index: usize) -> Vec<usize> {
    pages
        .iter()
        .flat_map(|p| p.fragments.iter())
        .filter(|f| f.block_index == block_index)
        .filter_map(|f| match &f.content {
            FragmentContent::Table(t) => Some(t.source_rows().collect::<Vec<_>>()),
            _ => None,
        })
        .flatten()
        .collect()
}
