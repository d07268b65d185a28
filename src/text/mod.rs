//! # Text Measurement
//!
//! Greedy line breaking and block height computation.
//!
//! Break opportunities come from UAX#14; widths come from the standard font
//! tables in [`crate::font`]. Nothing here depends on state outside the
//! arguments, so the same text, style, and width always produce the same
//! lines. Pagination relies on that.

pub mod markup;

use std::ops::Range;

use serde::Serialize;
use unicode_linebreak::linebreaks;

use crate::font::FontContext;
use crate::style::{ResolvedStyle, TextAlign};
use markup::{parse_inline, Emphasis, InlineRun};

/// One wrapped line of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSpan {
    pub text: String,
    /// Natural width of the line in points.
    pub width: f64,
    /// Offset of the line start from the left edge of the block box,
    /// with indents, padding, border, and alignment applied.
    pub x: f64,
    /// Extra space added to each inter-word space (justified lines only).
    pub word_spacing: f64,
    /// The line split into runs painted with one face each.
    pub runs: Vec<TextRun>,
}

/// A piece of a line set in a single face.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub text: String,
    /// PDF base font name.
    pub font: &'static str,
    pub width: f64,
}

/// The measured shape of a text block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMetrics {
    pub lines: Vec<LineSpan>,
    pub line_height: f64,
    /// Width available to the lines after insets.
    pub wrap_width: f64,
    /// Widest line.
    pub width: f64,
    /// Total block height, including spacing, padding, and border.
    pub height: f64,
}

impl TextMetrics {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Height of the lines alone.
    pub fn lines_height(&self) -> f64 {
        self.lines.len() as f64 * self.line_height
    }

    /// True if any line is wider than the space it was wrapped into.
    pub fn overflows_horizontally(&self) -> bool {
        self.width > self.wrap_width
    }
}

/// Normalized text with the emphasis of every byte.
struct StyledText {
    text: String,
    faces: Vec<Emphasis>,
}

impl StyledText {
    /// Collapse runs of whitespace to one space, keep `\n` as a hard break,
    /// and drop blank space at the start and end of every line.
    fn normalize(runs: &[InlineRun]) -> Self {
        let mut out = StyledText {
            text: String::new(),
            faces: Vec::new(),
        };
        let mut pending_space: Option<Emphasis> = None;
        let mut line_start = true;

        for run in runs {
            for ch in run.text.chars() {
                if ch == '\n' {
                    pending_space = None;
                    out.push('\n', run.emphasis);
                    line_start = true;
                } else if ch.is_whitespace() {
                    if !line_start {
                        pending_space.get_or_insert(run.emphasis);
                    }
                } else {
                    if let Some(face) = pending_space.take() {
                        out.push(' ', face);
                    }
                    out.push(ch, run.emphasis);
                    line_start = false;
                }
            }
        }

        let start = out.text.len() - out.text.trim_start().len();
        let end = out.text.trim_end().len().max(start);
        StyledText {
            text: out.text[start..end].to_string(),
            faces: out.faces[start..end].to_vec(),
        }
    }

    fn push(&mut self, ch: char, face: Emphasis) {
        self.text.push(ch);
        self.faces
            .extend(std::iter::repeat(face).take(ch.len_utf8()));
    }

    /// Sub-ranges of `range` with uniform emphasis.
    fn face_runs(&self, range: Range<usize>) -> Vec<(Range<usize>, Emphasis)> {
        let mut out = Vec::new();
        let mut start = range.start;
        for (i, _) in self.text[range.clone()].char_indices() {
            let at = range.start + i;
            if self.faces[at] != self.faces[start] {
                out.push((start..at, self.faces[start]));
                start = at;
            }
        }
        if start < range.end {
            out.push((start..range.end, self.faces[start]));
        }
        out
    }
}

/// A wrapped line before alignment.
struct RawLine {
    range: Range<usize>,
    width: f64,
    /// Last line before a hard break or the end of the text.
    ends_paragraph: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TextMeasurer {
    fonts: FontContext,
}

impl TextMeasurer {
    pub fn new() -> Self {
        Self {
            fonts: FontContext::new(),
        }
    }

    /// Wrap plain `text` into a box `max_width` points wide and measure it.
    ///
    /// Words are appended to the current line while it stays within the
    /// wrap width. A word wider than the wrap width gets a line of its own
    /// and is allowed to overflow.
    pub fn measure(&self, text: &str, style: &ResolvedStyle, max_width: f64) -> TextMetrics {
        self.measure_runs(&[InlineRun::plain(text)], style, max_width)
    }

    /// Like [`measure`](Self::measure), for text carrying inline markup.
    /// Bold runs are measured with the bold face.
    pub fn measure_markup(&self, text: &str, style: &ResolvedStyle, max_width: f64) -> TextMetrics {
        self.measure_runs(&parse_inline(text), style, max_width)
    }

    fn measure_runs(&self, runs: &[InlineRun], style: &ResolvedStyle, max_width: f64) -> TextMetrics {
        let wrap_width = (max_width - style.horizontal_insets()).max(0.0);
        let styled = StyledText::normalize(runs);

        let mut raw: Vec<RawLine> = Vec::new();
        let mut offset = 0;
        for hard_line in styled.text.split('\n') {
            let range = offset..offset + hard_line.len();
            offset = range.end + 1;
            self.wrap_hard_line(&styled, range, style, wrap_width, &mut raw);
        }

        let left_edge = style.left_indent + style.border_width + style.padding.left;
        let lines: Vec<LineSpan> = raw
            .into_iter()
            .map(|line| {
                let text = styled.text[line.range.clone()].to_string();
                let slack = (wrap_width - line.width).max(0.0);
                let (x, word_spacing) = match style.text_align {
                    TextAlign::Left => (left_edge, 0.0),
                    TextAlign::Center => (left_edge + slack / 2.0, 0.0),
                    TextAlign::Right => (left_edge + slack, 0.0),
                    TextAlign::Justify => {
                        let gaps = text.matches(' ').count();
                        if line.ends_paragraph || gaps == 0 {
                            (left_edge, 0.0)
                        } else {
                            (left_edge, slack / gaps as f64)
                        }
                    }
                };
                LineSpan {
                    runs: self.text_runs(&styled, line.range, style),
                    text,
                    width: line.width,
                    x,
                    word_spacing,
                }
            })
            .collect();

        let mut metrics = TextMetrics {
            width: lines.iter().map(|l| l.width).fold(0.0, f64::max),
            lines,
            line_height: style.line_height(),
            wrap_width,
            height: 0.0,
        };
        metrics.height = metrics.lines_height()
            + style.spacing_before
            + style.spacing_after
            + style.vertical_insets();
        metrics
    }

    fn weight(style: &ResolvedStyle, face: Emphasis) -> u32 {
        if face.bold {
            style.font_weight.max(700)
        } else {
            style.font_weight
        }
    }

    fn range_width(&self, styled: &StyledText, range: Range<usize>, style: &ResolvedStyle) -> f64 {
        styled
            .face_runs(range)
            .into_iter()
            .map(|(r, face)| {
                self.fonts.measure_string(
                    &styled.text[r],
                    &style.font_family,
                    Self::weight(style, face),
                    style.font_size,
                )
            })
            .sum()
    }

    fn text_runs(&self, styled: &StyledText, range: Range<usize>, style: &ResolvedStyle) -> Vec<TextRun> {
        styled
            .face_runs(range)
            .into_iter()
            .map(|(r, face)| TextRun {
                font: self.fonts.face_name(
                    &style.font_family,
                    Self::weight(style, face),
                    face.italic,
                ),
                width: self.range_width(styled, r.clone(), style),
                text: styled.text[r].to_string(),
            })
            .collect()
    }

    fn wrap_hard_line(
        &self,
        styled: &StyledText,
        line: Range<usize>,
        style: &ResolvedStyle,
        wrap_width: f64,
        out: &mut Vec<RawLine>,
    ) {
        let text = &styled.text[line.clone()];
        if text.is_empty() {
            out.push(RawLine {
                range: line,
                width: 0.0,
                ends_paragraph: true,
            });
            return;
        }

        let mut current: Option<Range<usize>> = None;
        let mut current_width = 0.0;
        // Width of the whitespace trailing `current`; only counts if another
        // word joins the line.
        let mut pending_space = 0.0;
        let mut start = 0;

        for (end, _) in linebreaks(text) {
            let segment = &text[start..end];
            if segment.is_empty() {
                continue;
            }
            let word = line.start + start..line.start + start + segment.trim_end().len();
            let space = word.end..line.start + end;
            start = end;

            let word_width = self.range_width(styled, word.clone(), style);
            let space_width = self.range_width(styled, space, style);

            match current.as_mut() {
                None => {
                    current = Some(word);
                    current_width = word_width;
                }
                Some(range) if current_width + pending_space + word_width <= wrap_width => {
                    range.end = word.end;
                    current_width += pending_space + word_width;
                }
                Some(range) => {
                    out.push(RawLine {
                        range: range.clone(),
                        width: current_width,
                        ends_paragraph: false,
                    });
                    *range = word;
                    current_width = word_width;
                }
            }
            pending_space = space_width;
        }

        out.push(RawLine {
            range: current.unwrap_or(line.start..line.start),
            width: current_width,
            ends_paragraph: true,
        });
    }
}
