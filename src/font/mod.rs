//! # Font Metrics
//!
//! Glyph advances for measurement. Only the standard PDF faces are known to
//! the engine; they need no font files, which keeps measurement a pure table
//! lookup and therefore deterministic across machines.

pub mod metrics;

pub use metrics::StandardFontMetrics;

/// The standard faces the engine can measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    TimesRoman,
    TimesBold,
    Courier,
    CourierBold,
}

impl StandardFont {
    /// Pick a face for a family name and weight, falling back to Helvetica.
    pub fn resolve(family: &str, weight: u32) -> Self {
        let bold = weight >= 600;
        let family = family.to_ascii_lowercase();
        match (family.as_str(), bold) {
            ("times" | "times-roman" | "times new roman" | "serif", false) => Self::TimesRoman,
            ("times" | "times-roman" | "times new roman" | "serif", true) => Self::TimesBold,
            ("courier" | "courier new" | "monospace", false) => Self::Courier,
            ("courier" | "courier new" | "monospace", true) => Self::CourierBold,
            (_, false) => Self::Helvetica,
            (_, true) => Self::HelveticaBold,
        }
    }

    /// The PDF base font name for this face.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
        }
    }

    /// The PDF base font name of the slanted companion face. Slanted faces
    /// are measured with the upright advances.
    pub fn italic_pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica-Oblique",
            Self::HelveticaBold => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Italic",
            Self::TimesBold => "Times-BoldItalic",
            Self::Courier => "Courier-Oblique",
            Self::CourierBold => "Courier-BoldOblique",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA_METRICS,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD_METRICS,
            Self::TimesRoman => &metrics::TIMES_ROMAN_METRICS,
            Self::TimesBold => &metrics::TIMES_BOLD_METRICS,
            // Courier bold shares the regular advances.
            Self::Courier | Self::CourierBold => &metrics::COURIER_METRICS,
        }
    }
}

/// Text measurement over the standard faces.
#[derive(Debug, Default, Clone, Copy)]
pub struct FontContext;

impl FontContext {
    pub fn new() -> Self {
        Self
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, family: &str, weight: u32, font_size: f64) -> f64 {
        StandardFont::resolve(family, weight)
            .metrics()
            .char_width(ch, font_size)
    }

    /// The PDF base font name a renderer should paint this text with.
    pub fn face_name(&self, family: &str, weight: u32, italic: bool) -> &'static str {
        let font = StandardFont::resolve(family, weight);
        if italic {
            font.italic_pdf_name()
        } else {
            font.pdf_name()
        }
    }

    /// Measure the width of a string in points.
    pub fn measure_string(&self, text: &str, family: &str, weight: u32, font_size: f64) -> f64 {
        StandardFont::resolve(family, weight)
            .metrics()
            .measure_string(text, font_size, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_context_helvetica() {
        let ctx = FontContext::new();
        let w = ctx.char_width(' ', "Helvetica", 400, 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_font_context_bold_wider() {
        let ctx = FontContext::new();
        let regular = ctx.char_width('b', "Helvetica", 400, 12.0);
        let bold = ctx.char_width('b', "Helvetica", 700, 12.0);
        assert!(bold > regular, "Bold b should be wider than regular b");
    }

    #[test]
    fn test_font_context_fallback() {
        let ctx = FontContext::new();
        let w1 = ctx.char_width('A', "Helvetica", 400, 12.0);
        let w2 = ctx.char_width('A', "UnknownFont", 400, 12.0);
        assert!((w1 - w2).abs() < 0.001);
    }

    #[test]
    fn test_font_context_weight_resolution() {
        let ctx = FontContext::new();
        let w700 = ctx.char_width('A', "Helvetica", 700, 12.0);
        let w800 = ctx.char_width('A', "Helvetica", 800, 12.0);
        assert!((w700 - w800).abs() < 0.001);
    }

    #[test]
    fn family_lookup_is_case_insensitive() {
        assert_eq!(StandardFont::resolve("COURIER", 400), StandardFont::Courier);
        assert_eq!(StandardFont::resolve("Times", 700).pdf_name(), "Times-Bold");
    }

    #[test]
    fn face_names_follow_weight_and_slant() {
        let ctx = FontContext::new();
        assert_eq!(ctx.face_name("Helvetica", 400, false), "Helvetica");
        assert_eq!(ctx.face_name("Helvetica", 700, true), "Helvetica-BoldOblique");
        assert_eq!(ctx.face_name("Times-Roman", 400, true), "Times-Italic");
    }
}
