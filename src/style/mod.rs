//! # Style System
//!
//! Named styles with single-parent inheritance, in the spirit of a report
//! style sheet: a heading style derives from a base style and overrides a
//! handful of attributes.
//!
//! Declarations (`Style`) leave most attributes unset. Resolution walks the
//! parent chain and folds every declaration onto a fully bound base record,
//! so a `ResolvedStyle` never has a gap in it. Styles are immutable once the
//! catalog is built; resolved results are cached and shared by reference.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::model::Edges;

/// A named style declaration. Every attribute is optional; unset attributes
/// are inherited from `parent`, or from the engine's base record at the root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,

    // ── Typography ─────────────────────────────────────────────
    pub font_family: Option<String>,
    /// Font size in points.
    pub font_size: Option<f64>,
    /// Font weight (100-900). 600 and up selects the bold face.
    pub font_weight: Option<u32>,
    /// Line height as a multiplier of font size.
    pub leading: Option<f64>,
    pub text_align: Option<TextAlign>,
    /// Only meaningful for table cells.
    pub vertical_align: Option<VerticalAlign>,

    // ── Color & Background ─────────────────────────────────────
    pub color: Option<Color>,
    pub background_color: Option<Color>,

    // ── Border & Box ───────────────────────────────────────────
    pub border_width: Option<f64>,
    pub border_color: Option<Color>,
    pub padding: Option<Edges>,
    pub left_indent: Option<f64>,
    pub right_indent: Option<f64>,

    // ── Vertical Rhythm ────────────────────────────────────────
    pub spacing_before: Option<f64>,
    pub spacing_after: Option<f64>,
}

impl Style {
    /// A root style with no parent and no overrides.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// A style deriving from `parent`.
    pub fn child_of(name: &str, parent: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: Some(parent.to_string()),
            ..Default::default()
        }
    }

    /// Apply this declaration's overrides on top of an already bound record.
    fn apply_to(&self, base: &mut ResolvedStyle) {
        base.name = self.name.clone();
        if let Some(family) = &self.font_family {
            base.font_family = family.clone();
        }
        if let Some(v) = self.font_size {
            base.font_size = v;
        }
        if let Some(v) = self.font_weight {
            base.font_weight = v;
        }
        if let Some(v) = self.leading {
            base.leading = v;
        }
        if let Some(v) = self.text_align {
            base.text_align = v;
        }
        if let Some(v) = self.vertical_align {
            base.vertical_align = v;
        }
        if let Some(v) = self.color {
            base.color = v;
        }
        if let Some(v) = self.background_color {
            base.background_color = v;
        }
        if let Some(v) = self.border_width {
            base.border_width = v;
        }
        if let Some(v) = self.border_color {
            base.border_color = v;
        }
        if let Some(v) = self.padding {
            base.padding = v;
        }
        if let Some(v) = self.left_indent {
            base.left_indent = v;
        }
        if let Some(v) = self.right_indent {
            base.right_indent = v;
        }
        if let Some(v) = self.spacing_before {
            base.spacing_before = v;
        }
        if let Some(v) = self.spacing_after {
            base.spacing_after = v;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// An RGBA color. Deserializes from `"#rrggbb"`, `"#rgb"`, or `{ r, g, b, a }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ColorSpec")]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorSpec {
    Hex(String),
    Rgba {
        r: f64,
        g: f64,
        b: f64,
        #[serde(default = "opaque")]
        a: f64,
    },
}

fn opaque() -> f64 {
    1.0
}

impl From<ColorSpec> for Color {
    fn from(spec: ColorSpec) -> Self {
        match spec {
            ColorSpec::Hex(s) => Color::hex(&s),
            ColorSpec::Rgba { r, g, b, a } => Color { r, g, b, a },
        }
    }
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
        let (r, g, b) = match hex.len() {
            _ if !hex.is_ascii() => (0, 0, 0),
            3 => (
                channel(&hex[0..1].repeat(2)),
                channel(&hex[1..2].repeat(2)),
                channel(&hex[2..3].repeat(2)),
            ),
            6 => (channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6])),
            _ => (0, 0, 0),
        };
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Resolved style: every attribute is concrete. This is what measurement and
/// pagination work with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    /// Name of the style this record was resolved from.
    pub name: String,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u32,
    pub leading: f64,
    pub text_align: TextAlign,
    pub vertical_align: VerticalAlign,
    pub color: Color,
    pub background_color: Color,
    pub border_width: f64,
    pub border_color: Color,
    pub padding: Edges,
    pub left_indent: f64,
    pub right_indent: f64,
    pub spacing_before: f64,
    pub spacing_after: f64,
}

impl Default for ResolvedStyle {
    /// The implicit root of every inheritance chain.
    fn default() -> Self {
        Self {
            name: String::new(),
            font_family: "Helvetica".to_string(),
            font_size: 12.0,
            font_weight: 400,
            leading: 1.2,
            text_align: TextAlign::Left,
            vertical_align: VerticalAlign::Top,
            color: Color::BLACK,
            background_color: Color::TRANSPARENT,
            border_width: 0.0,
            border_color: Color::BLACK,
            padding: Edges::default(),
            left_indent: 0.0,
            right_indent: 0.0,
            spacing_before: 0.0,
            spacing_after: 0.0,
        }
    }
}

impl ResolvedStyle {
    /// Distance between baselines in points.
    pub fn line_height(&self) -> f64 {
        self.font_size * self.leading
    }

    pub fn is_bold(&self) -> bool {
        self.font_weight >= 600
    }

    /// Horizontal space taken by indents, padding, and both borders.
    pub fn horizontal_insets(&self) -> f64 {
        self.left_indent + self.right_indent + self.padding.horizontal() + 2.0 * self.border_width
    }

    /// Vertical space taken by padding and both borders (spacing excluded).
    pub fn vertical_insets(&self) -> f64 {
        self.padding.vertical() + 2.0 * self.border_width
    }
}

/// The style catalog: an immutable set of named declarations.
///
/// A catalog can sit on top of a lower layer (the sample sheet). A name in
/// this layer shadows the same name below it, and a style whose parent is
/// its own name inherits from the shadowed declaration.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: HashMap<String, Style>,
    lower: Option<Box<StyleSheet>>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from declarations, rejecting duplicate names.
    pub fn from_styles(styles: impl IntoIterator<Item = Style>) -> Result<Self, LayoutError> {
        let mut sheet = Self::new();
        for style in styles {
            sheet.insert(style)?;
        }
        Ok(sheet)
    }

    /// The built-in sample catalog that caller styles usually derive from.
    pub fn sample() -> Self {
        let normal = Style {
            font_family: Some("Helvetica".into()),
            font_size: Some(10.0),
            leading: Some(1.2),
            ..Style::new("Normal")
        };
        let title = Style {
            font_size: Some(18.0),
            font_weight: Some(700),
            text_align: Some(TextAlign::Center),
            spacing_after: Some(6.0),
            ..Style::child_of("Title", "Normal")
        };
        let heading1 = Style {
            font_size: Some(18.0),
            font_weight: Some(700),
            spacing_before: Some(12.0),
            spacing_after: Some(6.0),
            ..Style::child_of("Heading1", "Normal")
        };
        let heading2 = Style {
            font_size: Some(14.0),
            font_weight: Some(700),
            spacing_before: Some(12.0),
            spacing_after: Some(6.0),
            ..Style::child_of("Heading2", "Normal")
        };
        let heading3 = Style {
            font_size: Some(12.0),
            font_weight: Some(700),
            spacing_before: Some(12.0),
            spacing_after: Some(6.0),
            ..Style::child_of("Heading3", "Normal")
        };
        let code = Style {
            font_family: Some("Courier".into()),
            font_size: Some(8.0),
            left_indent: Some(20.0),
            right_indent: Some(20.0),
            ..Style::child_of("Code", "Normal")
        };

        let mut styles = HashMap::new();
        for style in [normal, title, heading1, heading2, heading3, code] {
            styles.insert(style.name.clone(), style);
        }
        Self {
            styles,
            lower: None,
        }
    }

    /// Add a declaration. Names are unique within one catalog.
    pub fn insert(&mut self, style: Style) -> Result<(), LayoutError> {
        if self.styles.contains_key(&style.name) {
            return Err(LayoutError::DuplicateStyle { name: style.name });
        }
        self.styles.insert(style.name.clone(), style);
        Ok(())
    }

    /// Layer `overlay` on top of this catalog; overlay names shadow ours.
    pub fn extended_with(self, mut overlay: StyleSheet) -> Self {
        let lower = match overlay.lower.take() {
            Some(lower) => self.extended_with(*lower),
            None => self,
        };
        overlay.lower = Some(Box::new(lower));
        overlay
    }

    fn layers(&self) -> impl Iterator<Item = &StyleSheet> {
        std::iter::successors(Some(self), |sheet| sheet.lower.as_deref())
    }

    /// Find `name` in layer `from` or below, returning the layer it was found in.
    fn find(&self, name: &str, from: usize) -> Option<(usize, &Style)> {
        self.layers()
            .enumerate()
            .skip(from)
            .find_map(|(depth, sheet)| sheet.styles.get(name).map(|style| (depth, style)))
    }

    /// The visible declaration for `name`.
    pub fn get(&self, name: &str) -> Option<&Style> {
        self.find(name, 0).map(|(_, style)| style)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of distinct visible names.
    pub fn len(&self) -> usize {
        self.layers()
            .flat_map(|sheet| sheet.styles.keys())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers().all(|sheet| sheet.styles.is_empty())
    }
}

/// Resolves style names against a catalog, caching results for one build.
pub struct StyleResolver<'a> {
    sheet: &'a StyleSheet,
    cache: RefCell<HashMap<String, Arc<ResolvedStyle>>>,
}

impl<'a> StyleResolver<'a> {
    pub fn new(sheet: &'a StyleSheet) -> Self {
        Self {
            sheet,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Resolve `name` into a fully bound style.
    ///
    /// Walks parent links with a visited set of (layer, name) pairs;
    /// revisiting any declaration fails with `CyclicStyle` no matter how long
    /// the chain is. A parent link is looked up in the declaring style's own
    /// layer and below, so sample styles never see caller styles. A style
    /// naming itself as parent continues one layer down.
    pub fn resolve(&self, name: &str) -> Result<Arc<ResolvedStyle>, LayoutError> {
        if let Some(hit) = self.cache.borrow().get(name) {
            return Ok(Arc::clone(hit));
        }

        let mut chain: Vec<&Style> = Vec::new();
        let mut visited: HashSet<(usize, &str)> = HashSet::new();
        let mut current = Some((0, name));

        while let Some((from, link)) = current {
            let (depth, style) =
                self.sheet
                    .find(link, from)
                    .ok_or_else(|| LayoutError::UnknownStyle {
                        name: link.to_string(),
                    })?;
            if !visited.insert((depth, link)) {
                let mut names: Vec<String> = chain.iter().map(|s| s.name.clone()).collect();
                names.push(link.to_string());
                return Err(LayoutError::CyclicStyle { chain: names });
            }
            chain.push(style);
            current = style.parent.as_deref().map(|parent| {
                if parent == style.name && self.sheet.find(parent, depth + 1).is_some() {
                    (depth + 1, parent)
                } else {
                    (depth, parent)
                }
            });
        }

        let mut resolved = ResolvedStyle::default();
        for style in chain.iter().rev() {
            style.apply_to(&mut resolved);
        }

        let resolved = Arc::new(resolved);
        log::trace!("resolved style '{}' through {} link(s)", name, chain.len());
        self.cache
            .borrow_mut()
            .insert(name.to_string(), Arc::clone(&resolved));
        Ok(resolved)
    }

    /// Number of distinct styles resolved so far.
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(styles: Vec<Style>) -> StyleSheet {
        StyleSheet::from_styles(styles).unwrap()
    }

    #[test]
    fn root_style_binds_every_attribute() {
        let s = sheet(vec![Style::new("Plain")]);
        let resolver = StyleResolver::new(&s);
        let r = resolver.resolve("Plain").unwrap();
        assert_eq!(r.font_family, "Helvetica");
        assert_eq!(r.font_size, 12.0);
        assert_eq!(r.leading, 1.2);
        assert!(r.background_color.is_transparent());
        assert_eq!(r.name, "Plain");
    }

    #[test]
    fn child_overrides_and_inherits() {
        let base = Style {
            font_size: Some(10.0),
            color: Some(Color::hex("#2c3e50")),
            ..Style::new("Base")
        };
        let heading = Style {
            font_size: Some(16.0),
            spacing_before: Some(20.0),
            ..Style::child_of("Heading", "Base")
        };
        let s = sheet(vec![base, heading]);
        let resolver = StyleResolver::new(&s);
        let r = resolver.resolve("Heading").unwrap();
        assert_eq!(r.font_size, 16.0);
        assert_eq!(r.spacing_before, 20.0);
        assert_eq!(r.color, Color::hex("#2c3e50"));
    }

    #[test]
    fn long_chain_inherits_transitively() {
        let mut styles = vec![Style {
            font_family: Some("Courier".into()),
            ..Style::new("S0")
        }];
        for i in 1..50 {
            styles.push(Style::child_of(&format!("S{i}"), &format!("S{}", i - 1)));
        }
        let s = sheet(styles);
        let resolver = StyleResolver::new(&s);
        assert_eq!(resolver.resolve("S49").unwrap().font_family, "Courier");
    }

    #[test]
    fn self_cycle_detected() {
        let s = sheet(vec![Style::child_of("Loop", "Loop")]);
        let resolver = StyleResolver::new(&s);
        assert!(matches!(
            resolver.resolve("Loop"),
            Err(LayoutError::CyclicStyle { .. })
        ));
    }

    #[test]
    fn long_cycle_detected_regardless_of_length() {
        for len in [2usize, 3, 17, 200] {
            let styles: Vec<Style> = (0..len)
                .map(|i| Style::child_of(&format!("C{i}"), &format!("C{}", (i + 1) % len)))
                .collect();
            let s = sheet(styles);
            let resolver = StyleResolver::new(&s);
            match resolver.resolve("C0") {
                Err(LayoutError::CyclicStyle { chain }) => {
                    assert_eq!(chain.len(), len + 1);
                    assert_eq!(chain.first(), chain.last());
                }
                other => panic!("expected cycle for len {len}, got {other:?}"),
            }
        }
    }

    #[test]
    fn cycle_above_entry_point_detected() {
        let s = sheet(vec![
            Style::child_of("Leaf", "A"),
            Style::child_of("A", "B"),
            Style::child_of("B", "A"),
        ]);
        let resolver = StyleResolver::new(&s);
        match resolver.resolve("Leaf") {
            Err(LayoutError::CyclicStyle { chain }) => {
                assert_eq!(chain, vec!["Leaf", "A", "B", "A"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn unknown_parent_reported() {
        let s = sheet(vec![Style::child_of("Orphan", "Missing")]);
        let resolver = StyleResolver::new(&s);
        assert_eq!(
            resolver.resolve("Orphan"),
            Err(LayoutError::UnknownStyle {
                name: "Missing".into()
            })
        );
    }

    #[test]
    fn duplicate_declaration_rejected() {
        let result = StyleSheet::from_styles(vec![Style::new("A"), Style::new("A")]);
        assert!(matches!(result, Err(LayoutError::DuplicateStyle { .. })));
    }

    #[test]
    fn resolution_is_cached_and_shared() {
        let s = StyleSheet::sample();
        let resolver = StyleResolver::new(&s);
        let a = resolver.resolve("Heading2").unwrap();
        let b = resolver.resolve("Heading2").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(resolver.cached(), 1);
    }

    #[test]
    fn overlay_shadows_sample_style() {
        let overlay = sheet(vec![Style {
            font_size: Some(11.0),
            font_family: Some("Courier".into()),
            ..Style::new("Normal")
        }]);
        let s = StyleSheet::sample().extended_with(overlay);
        let resolver = StyleResolver::new(&s);
        assert_eq!(resolver.resolve("Normal").unwrap().font_size, 11.0);
        // Sample styles keep deriving from the sample Normal.
        assert_eq!(resolver.resolve("Heading2").unwrap().font_family, "Helvetica");
        assert_eq!(s.len(), 6);
    }

    #[test]
    fn caller_style_can_extend_the_sample_style_it_shadows() {
        let caller = sheet(vec![
            Style {
                font_size: Some(10.0),
                spacing_before: Some(6.0),
                spacing_after: Some(6.0),
                ..Style::child_of("Normal", "Normal")
            },
            Style {
                font_size: Some(24.0),
                spacing_after: Some(30.0),
                text_align: Some(TextAlign::Center),
                ..Style::child_of("Title", "Heading1")
            },
            Style {
                font_family: Some("Courier".into()),
                font_size: Some(8.0),
                ..Style::child_of("Code", "Normal")
            },
        ]);
        let s = StyleSheet::sample().extended_with(caller);
        let resolver = StyleResolver::new(&s);

        let normal = resolver.resolve("Normal").unwrap();
        assert_eq!(normal.spacing_before, 6.0);
        assert_eq!(normal.font_family, "Helvetica");
        assert_eq!(normal.leading, 1.2);

        let title = resolver.resolve("Title").unwrap();
        assert_eq!(title.font_size, 24.0);
        assert!(title.is_bold());
        assert_eq!(title.spacing_before, 12.0);

        // Code's parent is the caller Normal, which sits on the sample one.
        let code = resolver.resolve("Code").unwrap();
        assert_eq!(code.spacing_before, 6.0);
        assert_eq!(code.font_family, "Courier");
    }

    #[test]
    fn shadowing_cycle_still_detected() {
        // Caller Normal -> caller A -> caller Normal, through the same layer.
        let caller = sheet(vec![
            Style::child_of("Normal", "A"),
            Style::child_of("A", "Normal"),
        ]);
        let s = StyleSheet::sample().extended_with(caller);
        let resolver = StyleResolver::new(&s);
        assert!(matches!(
            resolver.resolve("A"),
            Err(LayoutError::CyclicStyle { .. })
        ));
    }

    #[test]
    fn hex_colors() {
        let c = Color::hex("#3498db");
        assert!((c.r - 0x34 as f64 / 255.0).abs() < 1e-9);
        let short = Color::hex("fff");
        assert_eq!(short, Color::WHITE);
    }

    #[test]
    fn color_deserializes_from_hex_or_object() {
        let a: Color = serde_json::from_str("\"#000000\"").unwrap();
        assert_eq!(a, Color::BLACK);
        let b: Color = serde_json::from_str(r#"{ "r": 1.0, "g": 1.0, "b": 1.0 }"#).unwrap();
        assert_eq!(b, Color::WHITE);
    }
}
