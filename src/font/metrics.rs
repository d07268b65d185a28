//! Advance widths for the standard PDF fonts, in 1/1000 em, for printable
//! ASCII (U+0020..=U+007E). Values are taken from the Adobe AFM files.

/// Glyph widths for one face.
pub struct StandardFontMetrics {
    widths: &'static [u16; 95],
    /// Used for characters outside the table.
    fallback: u16,
}

impl StandardFontMetrics {
    /// Advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let code = ch as u32;
        let units = if (0x20..=0x7E).contains(&code) {
            self.widths[(code - 0x20) as usize]
        } else {
            self.fallback
        };
        units as f64 / 1000.0 * font_size
    }

    /// Width of a whole string in points.
    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size) + letter_spacing)
            .sum()
    }
}

#[rustfmt::skip]
static HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
static TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
static TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

static COURIER: [u16; 95] = [600; 95];

pub static HELVETICA_METRICS: StandardFontMetrics = StandardFontMetrics {
    widths: &HELVETICA,
    fallback: 556,
};

pub static HELVETICA_BOLD_METRICS: StandardFontMetrics = StandardFontMetrics {
    widths: &HELVETICA_BOLD,
    fallback: 611,
};

pub static TIMES_ROMAN_METRICS: StandardFontMetrics = StandardFontMetrics {
    widths: &TIMES_ROMAN,
    fallback: 500,
};

pub static TIMES_BOLD_METRICS: StandardFontMetrics = StandardFontMetrics {
    widths: &TIMES_BOLD,
    fallback: 500,
};

pub static COURIER_METRICS: StandardFontMetrics = StandardFontMetrics {
    widths: &COURIER,
    fallback: 600,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_width() {
        assert!((HELVETICA_METRICS.char_width(' ', 12.0) - 3.336).abs() < 0.001);
    }

    #[test]
    fn courier_is_monospace() {
        let a = COURIER_METRICS.measure_string("iiii", 10.0, 0.0);
        let b = COURIER_METRICS.measure_string("WWWW", 10.0, 0.0);
        assert_eq!(a, b);
        assert!((a - 24.0).abs() < 1e-9);
    }

    #[test]
    fn non_ascii_uses_fallback() {
        let w = HELVETICA_METRICS.char_width('é', 10.0);
        assert!((w - 5.56).abs() < 1e-9);
    }
}
