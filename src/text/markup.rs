//! # Inline Markup
//!
//! Paragraph text may carry a small set of inline tags: `<b>`/`<strong>`,
//! `<i>`/`<em>`, and `<br/>`. The standard XML entities (`&amp;`, `&lt;`,
//! ...) are unescaped. Unknown tags are dropped and their content kept.
//!
//! Text that is not well-formed markup (a bare `&`, an unclosed `<`) is
//! measured exactly as written.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Emphasis applied to a run of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Emphasis {
    pub bold: bool,
    pub italic: bool,
}

/// A run of text with uniform emphasis.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineRun {
    pub text: String,
    pub emphasis: Emphasis,
}

impl InlineRun {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            emphasis: Emphasis::default(),
        }
    }
}

/// Split `text` into runs of uniform emphasis.
pub fn parse_inline(text: &str) -> Vec<InlineRun> {
    if !text.contains(['<', '&']) {
        return vec![InlineRun::plain(text)];
    }
    match parse_markup(text) {
        Ok(runs) => runs,
        Err(e) => {
            log::debug!("inline markup not parsed ({e}); measuring text as written");
            vec![InlineRun::plain(text)]
        }
    }
}

fn parse_markup(text: &str) -> Result<Vec<InlineRun>, quick_xml::Error> {
    let mut reader = Reader::from_str(text);
    let mut runs: Vec<InlineRun> = Vec::new();
    let mut bold = 0usize;
    let mut italic = 0usize;

    loop {
        let emphasis = Emphasis {
            bold: bold > 0,
            italic: italic > 0,
        };
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"b" | b"strong" => bold += 1,
                b"i" | b"em" => italic += 1,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"b" | b"strong" => bold = bold.saturating_sub(1),
                b"i" | b"em" => italic = italic.saturating_sub(1),
                _ => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"br" => push(&mut runs, "\n", emphasis),
            Event::Text(t) => push(&mut runs, &t.unescape()?, emphasis),
            Event::CData(c) => push(&mut runs, &String::from_utf8_lossy(&c), emphasis),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(runs)
}

fn push(runs: &mut Vec<InlineRun>, text: &str, emphasis: Emphasis) {
    if text.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(last) if last.emphasis == emphasis => last.text.push_str(text),
        _ => runs.push(InlineRun {
            text: text.to_string(),
            emphasis,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOLD: Emphasis = Emphasis {
        bold: true,
        italic: false,
    };

    #[test]
    fn plain_text_is_one_run() {
        assert_eq!(parse_inline("just words"), vec![InlineRun::plain("just words")]);
    }

    #[test]
    fn bold_label_then_plain() {
        let runs = parse_inline("<b>Type:</b> Offline-First");
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Type:");
        assert_eq!(runs[0].emphasis, BOLD);
        assert_eq!(runs[1].text, " Offline-First");
        assert_eq!(runs[1].emphasis, Emphasis::default());
    }

    #[test]
    fn nested_bold_italic() {
        let runs = parse_inline("<i>note <b>this</b></i>");
        assert_eq!(
            runs[1].emphasis,
            Emphasis {
                bold: true,
                italic: true
            }
        );
    }

    #[test]
    fn line_break_and_entities() {
        let runs = parse_inline("Sales &amp; Stock<br/>next");
        assert_eq!(runs, vec![InlineRun::plain("Sales & Stock\nnext")]);
    }

    #[test]
    fn malformed_markup_kept_literally() {
        assert_eq!(parse_inline("a < b & c"), vec![InlineRun::plain("a < b & c")]);
        assert_eq!(parse_inline("<b>open</i>"), vec![InlineRun::plain("<b>open</i>")]);
    }
}
