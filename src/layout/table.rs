//! # Table Layout
//!
//! Tables are measured once, up front: every cell gets a resolved style and
//! wrapped text, every row gets a height (the tallest cell). Pagination then
//! works purely on row heights. Rows are indivisible, and a designated header
//! row is re-emitted at the top of each continuation fragment.

use std::ops::Range;
use std::sync::Arc;

use serde::Serialize;

use super::page_break::{decide_break, BreakDecision};
use crate::error::LayoutError;
use crate::model::Table;
use crate::style::{ResolvedStyle, StyleResolver, VerticalAlign};
use crate::text::{TextMeasurer, TextMetrics};

/// A table with every row measured.
#[derive(Debug, Clone)]
pub struct MeasuredTable {
    pub column_widths: Vec<f64>,
    pub rows: Vec<MeasuredRow>,
    pub header_row: Option<usize>,
    pub spacing_before: f64,
    pub spacing_after: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasuredRow {
    /// Index of this row in the source table.
    pub source_row: usize,
    pub height: f64,
    pub cells: Vec<MeasuredCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasuredCell {
    pub column: usize,
    /// Offset of the cell's left edge from the table's left edge.
    pub x: f64,
    pub width: f64,
    /// Offset of the cell content from the row top (vertical alignment).
    pub content_y: f64,
    pub style: Arc<ResolvedStyle>,
    pub text: TextMetrics,
}

impl MeasuredTable {
    pub fn row_heights(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.height).collect()
    }

    pub fn header_height(&self) -> f64 {
        self.header_row.map(|h| self.rows[h].height).unwrap_or(0.0)
    }

    pub fn is_header(&self, row: usize) -> bool {
        self.header_row == Some(row)
    }

    /// Whether a continuation starting at `next_row` repeats the header:
    /// only once the header itself has been emitted.
    pub fn repeats_header_before(&self, next_row: usize) -> bool {
        matches!(self.header_row, Some(h) if h < next_row)
    }

    /// Rows of `pending` up to and including the first data row. A fragment
    /// shorter than this would carry no data.
    fn leading_rows(&self, pending: &Range<usize>) -> usize {
        pending
            .clone()
            .position(|i| !self.is_header(i))
            .map(|p| p + 1)
            .unwrap_or(pending.len())
    }
}

/// Where the paginator is within a table that may span pages.
#[derive(Debug, Clone, PartialEq)]
pub struct TableProgress {
    /// Source rows not yet placed.
    pub rows: Range<usize>,
    /// Whether the next fragment starts with a copy of the header row.
    pub repeat_header: bool,
    /// Zero-based index of the next fragment.
    pub part: usize,
}

impl TableProgress {
    pub fn start(table: &MeasuredTable) -> Self {
        Self {
            rows: 0..table.rows.len(),
            repeat_header: false,
            part: 0,
        }
    }
}

/// Outcome of splitting the pending rows at a page boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSplit {
    /// Rows that go on the current page.
    pub fitting: Range<usize>,
    /// Rows that continue on the next page.
    pub remaining: Range<usize>,
}

impl TableSplit {
    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.fitting.is_empty()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TableLayout {
    measurer: TextMeasurer,
}

impl TableLayout {
    pub fn new(measurer: TextMeasurer) -> Self {
        Self { measurer }
    }

    /// Check the shape invariants of a table against the usable width.
    pub fn validate(table: &Table, block_index: usize, usable_width: f64) -> Result<(), LayoutError> {
        let malformed = |reason: String| LayoutError::MalformedTable {
            block_index,
            reason,
        };

        if table.columns.is_empty() {
            return Err(malformed("no columns declared".to_string()));
        }
        if table.rows.is_empty() {
            return Err(malformed("no rows".to_string()));
        }
        if let Some(bad) = table.columns.iter().position(|w| !w.is_finite() || *w < 0.0) {
            return Err(malformed(format!("column {bad} has an invalid width")));
        }
        for (i, row) in table.rows.iter().enumerate() {
            if row.len() != table.columns.len() {
                return Err(malformed(format!(
                    "row {i} has {} cells, expected {}",
                    row.len(),
                    table.columns.len()
                )));
            }
        }
        if let Some(h) = table.header_row {
            if h >= table.rows.len() {
                return Err(malformed(format!(
                    "header row {h} is out of range ({} rows)",
                    table.rows.len()
                )));
            }
        }

        let columns_width = table.columns_width();
        if columns_width > usable_width + f64::EPSILON * usable_width.abs().max(1.0) {
            return Err(LayoutError::BlockTooNarrow {
                block_index,
                columns_width,
                usable_width,
            });
        }
        Ok(())
    }

    /// Resolve the style of every cell.
    ///
    /// The most specific covering region wins: a cell region beats a row,
    /// which beats header/body/column regions, which beat all-cells. Later
    /// declarations win ties. Cells no region covers use the table's style.
    pub fn cell_styles(
        table: &Table,
        resolver: &StyleResolver<'_>,
    ) -> Result<Vec<Vec<Arc<ResolvedStyle>>>, LayoutError> {
        let mut styles = Vec::with_capacity(table.rows.len());
        for (r, row) in table.rows.iter().enumerate() {
            let mut row_styles = Vec::with_capacity(row.len());
            for c in 0..row.len() {
                let mut winner: Option<(u8, &str)> = None;
                for entry in &table.regions {
                    if !entry.region.covers(r, c, table.header_row) {
                        continue;
                    }
                    let specificity = entry.region.specificity();
                    if winner.map_or(true, |(best, _)| specificity >= best) {
                        winner = Some((specificity, entry.style.as_str()));
                    }
                }
                let name = winner.map(|(_, name)| name).unwrap_or(table.style.as_str());
                row_styles.push(resolver.resolve(name)?);
            }
            styles.push(row_styles);
        }
        Ok(styles)
    }

    /// Measure every cell and compute row heights.
    ///
    /// A cell's height is its text measured in its column width; a row is as
    /// tall as its tallest cell.
    pub fn layout(
        &self,
        table: &Table,
        table_style: &ResolvedStyle,
        cell_styles: &[Vec<Arc<ResolvedStyle>>],
        block_index: usize,
        usable_width: f64,
    ) -> Result<MeasuredTable, LayoutError> {
        Self::validate(table, block_index, usable_width)?;

        let mut rows = Vec::with_capacity(table.rows.len());
        for (r, row) in table.rows.iter().enumerate() {
            let mut cells = Vec::with_capacity(row.len());
            let mut x = 0.0;
            for (c, text) in row.iter().enumerate() {
                let width = table.columns[c];
                let style = Arc::clone(&cell_styles[r][c]);
                let metrics = self.measurer.measure(text, &style, width);
                cells.push(MeasuredCell {
                    column: c,
                    x,
                    width,
                    content_y: 0.0,
                    style,
                    text: metrics,
                });
                x += width;
            }

            let height = cells.iter().map(|c| c.text.height).fold(0.0, f64::max);
            for cell in &mut cells {
                let slack = height - cell.text.height;
                cell.content_y = match cell.style.vertical_align {
                    VerticalAlign::Top => 0.0,
                    VerticalAlign::Middle => slack / 2.0,
                    VerticalAlign::Bottom => slack,
                };
            }

            rows.push(MeasuredRow {
                source_row: r,
                height,
                cells,
            });
        }

        Ok(MeasuredTable {
            column_widths: table.columns.clone(),
            rows,
            header_row: table.header_row,
            spacing_before: table_style.spacing_before,
            spacing_after: table_style.spacing_after,
        })
    }

    /// Split the pending rows so the fitting part fits in `available_height`.
    ///
    /// A repeated header counts against the available height. If no data row
    /// would fit, nothing fits: the whole remainder moves to the next page.
    pub fn split(
        &self,
        table: &MeasuredTable,
        progress: &TableProgress,
        available_height: f64,
    ) -> TableSplit {
        let pending = progress.rows.clone();
        let header = if progress.repeat_header {
            table.header_height()
        } else {
            0.0
        };
        let heights: Vec<f64> = table.rows[pending.clone()]
            .iter()
            .map(|r| r.height)
            .collect();

        let decision = decide_break(
            available_height - header,
            &heights,
            table.leading_rows(&pending),
        );
        let mut cut = match decision {
            BreakDecision::Place => pending.end,
            BreakDecision::MoveToNextPage => pending.start,
            BreakDecision::Split {
                items_on_current_page,
            } => pending.start + items_on_current_page,
        };
        // A fragment never ends on the header row; it opens the next page.
        if cut < pending.end && cut > pending.start && table.is_header(cut - 1) {
            cut -= 1;
        }
        TableSplit {
            fitting: pending.start..cut,
            remaining: cut..pending.end,
        }
    }

    /// The smallest fragment that still makes progress: everything up to and
    /// including the next data row. Used on an empty page, where moving on
    /// would not help.
    pub fn forced_split(&self, table: &MeasuredTable, progress: &TableProgress) -> TableSplit {
        let pending = progress.rows.clone();
        let cut = pending.start + table.leading_rows(&pending);
        TableSplit {
            fitting: pending.start..cut,
            remaining: cut..pending.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edges, StyleRegion};
    use crate::style::{Style, StyleSheet};

    fn sheet() -> StyleSheet {
        StyleSheet::from_styles(vec![
            Style {
                font_size: Some(10.0),
                leading: Some(1.0),
                padding: Some(Edges::uniform(5.0)),
                ..Style::new("Cell")
            },
            Style {
                font_weight: Some(700),
                ..Style::child_of("Head", "Cell")
            },
            Style::child_of("Col", "Cell"),
            Style::child_of("Row", "Cell"),
            Style::child_of("One", "Cell"),
        ])
        .unwrap()
    }

    fn grid(rows: usize) -> Table {
        let mut data = vec![vec!["Field", "Type"]];
        for _ in 1..rows {
            data.push(vec!["id", "integer"]);
        }
        Table::with_header("Cell", vec![100.0, 100.0], data)
    }

    fn measure(table: &Table, s: &StyleSheet) -> MeasuredTable {
        let resolver = StyleResolver::new(s);
        let styles = TableLayout::cell_styles(table, &resolver).unwrap();
        let base = resolver.resolve(&table.style).unwrap();
        TableLayout::default()
            .layout(table, &base, &styles, 0, 468.0)
            .unwrap()
    }

    #[test]
    fn row_height_is_tallest_cell() {
        let s = sheet();
        let mut table = grid(2);
        table.rows[1][1] = "a b c d e f g h i j k l m n o p q r s t u v w x y z".into();
        let measured = measure(&table, &s);
        let heights = measured.row_heights();
        assert_eq!(heights[0], 20.0);
        assert!(heights[1] > 20.0);
        let tall = &measured.rows[1];
        assert_eq!(tall.height, tall.cells[1].text.height);
    }

    #[test]
    fn vertical_alignment_offsets_short_cells() {
        let s = StyleSheet::from_styles(vec![Style {
            font_size: Some(10.0),
            leading: Some(1.0),
            vertical_align: Some(VerticalAlign::Bottom),
            ..Style::new("Cell")
        }])
        .unwrap();
        let table = Table {
            header_row: None,
            ..Table::with_header("Cell", vec![20.0, 200.0], vec![vec!["aaa bbb ccc", "x"]])
        };
        let measured = measure(&table, &s);
        let row = &measured.rows[0];
        assert_eq!(row.cells[0].content_y, 0.0);
        assert!((row.cells[1].content_y - (row.height - 10.0)).abs() < 1e-9);
    }

    #[test]
    fn mismatched_row_is_malformed() {
        let mut table = grid(3);
        table.rows[2].pop();
        assert!(matches!(
            TableLayout::validate(&table, 4, 468.0),
            Err(LayoutError::MalformedTable { block_index: 4, .. })
        ));
    }

    #[test]
    fn header_out_of_range_is_malformed() {
        let mut table = grid(2);
        table.header_row = Some(2);
        assert!(matches!(
            TableLayout::validate(&table, 0, 468.0),
            Err(LayoutError::MalformedTable { .. })
        ));
    }

    #[test]
    fn columns_wider_than_page_rejected() {
        let table = grid(2);
        assert_eq!(
            TableLayout::validate(&table, 1, 150.0),
            Err(LayoutError::BlockTooNarrow {
                block_index: 1,
                columns_width: 200.0,
                usable_width: 150.0,
            })
        );
        assert!(TableLayout::validate(&table, 1, 200.0).is_ok());
    }

    #[test]
    fn region_specificity_picks_most_specific() {
        let s = sheet();
        let table = grid(3)
            .region(StyleRegion::Cell { row: 1, column: 1 }, "One")
            .region(StyleRegion::Row { index: 1 }, "Row")
            .region(StyleRegion::Column { index: 1 }, "Col")
            .region(StyleRegion::HeaderRow, "Head")
            .region(StyleRegion::AllCells, "Cell");
        let resolver = StyleResolver::new(&s);
        let styles = TableLayout::cell_styles(&table, &resolver).unwrap();

        assert_eq!(styles[1][1].name, "One");
        assert_eq!(styles[1][0].name, "Row");
        // Header and Column tie; the later declaration wins.
        assert_eq!(styles[0][1].name, "Head");
        assert_eq!(styles[0][0].name, "Head");
        assert_eq!(styles[2][1].name, "Col");
        assert_eq!(styles[2][0].name, "Cell");
    }

    #[test]
    fn uncovered_cells_use_table_style() {
        let s = sheet();
        let table = grid(2).region(StyleRegion::HeaderRow, "Head");
        let resolver = StyleResolver::new(&s);
        let styles = TableLayout::cell_styles(&table, &resolver).unwrap();
        assert_eq!(styles[1][0].name, "Cell");
        assert!(styles[0][0].is_bold());
    }

    #[test]
    fn unknown_region_style_reported() {
        let s = sheet();
        let table = grid(2).region(StyleRegion::AllCells, "Nope");
        let resolver = StyleResolver::new(&s);
        assert!(matches!(
            TableLayout::cell_styles(&table, &resolver),
            Err(LayoutError::UnknownStyle { .. })
        ));
    }

    #[test]
    fn table_that_fits_is_not_split() {
        let s = sheet();
        let measured = measure(&grid(5), &s);
        let progress = TableProgress::start(&measured);
        let split = TableLayout::default().split(&measured, &progress, 500.0);
        assert_eq!(split.fitting, 0..5);
        assert!(split.remaining.is_empty());
        assert!(split.is_complete());
    }

    #[test]
    fn split_keeps_whole_rows() {
        let s = sheet();
        let measured = measure(&grid(11), &s);
        let progress = TableProgress::start(&measured);
        // 6 rows of 20pt fit in 130pt.
        let split = TableLayout::default().split(&measured, &progress, 130.0);
        assert_eq!(split.fitting, 0..6);
        assert_eq!(split.remaining, 6..11);
        assert!(measured.repeats_header_before(split.remaining.start));
    }

    #[test]
    fn continuation_accounts_for_repeated_header() {
        let s = sheet();
        let measured = measure(&grid(11), &s);
        let progress = TableProgress {
            rows: 6..11,
            repeat_header: true,
            part: 1,
        };
        // Header (20) + 4 rows (80) fit in 100pt.
        let split = TableLayout::default().split(&measured, &progress, 100.0);
        assert_eq!(split.fitting, 6..10);
    }

    #[test]
    fn header_alone_never_fits() {
        let s = sheet();
        let measured = measure(&grid(4), &s);
        let progress = TableProgress::start(&measured);
        let split = TableLayout::default().split(&measured, &progress, 30.0);
        assert!(split.is_empty());
        assert_eq!(split.remaining, 0..4);

        let continuation = TableProgress {
            rows: 2..4,
            repeat_header: true,
            part: 1,
        };
        let split = TableLayout::default().split(&measured, &continuation, 30.0);
        assert!(split.is_empty());
    }

    #[test]
    fn header_row_never_ends_a_fragment() {
        let s = sheet();
        let mut table = grid(6);
        table.header_row = Some(2);
        let measured = measure(&table, &s);
        let progress = TableProgress::start(&measured);
        // Rows 0..3 fit in 65pt, but row 2 is the header.
        let split = TableLayout::default().split(&measured, &progress, 65.0);
        assert_eq!(split.fitting, 0..2);
        assert_eq!(split.remaining, 2..6);
        assert!(!measured.repeats_header_before(split.remaining.start));
    }

    #[test]
    fn forced_split_takes_header_and_one_row() {
        let s = sheet();
        let measured = measure(&grid(4), &s);
        let progress = TableProgress::start(&measured);
        let split = TableLayout::default().forced_split(&measured, &progress);
        assert_eq!(split.fitting, 0..2);
        assert_eq!(split.remaining, 2..4);
    }
}
