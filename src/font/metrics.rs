//! Advance widths for the standard PDF base fonts, in 1/1000 em.
//!
//! Tables cover printable ASCII (0x20..=0x7E), indexed by `code - 0x20`.
//! Accented Latin-1 letters measure as their base letter, and characters
//! WinAnsi cannot encode measure as the substitute they are drawn as.
//! Oblique Helvetica shares the upright widths; Courier is fixed-pitch.

use super::encoding::{accent_base, to_winansi, SUBSTITUTE};

/// Per-font width table plus fallbacks for characters outside it.
#[derive(Debug)]
pub struct StandardFontMetrics {
    pub ascii: Option<&'static [u16; 95]>,
    /// Advance used for anything not in the table.
    pub default_advance: u16,
    /// Advance for U+2022 BULLET, used by list markers.
    pub bullet_advance: u16,
}

impl StandardFontMetrics {
    /// Advance width of one character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.advance(ch) as f64 * font_size / 1000.0
    }

    /// Width of a string in points. Any whitespace measures as a space.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        let units: f64 = text.chars().map(|ch| f64::from(self.advance(ch))).sum();
        units * font_size / 1000.0
    }

    fn advance(&self, ch: char) -> u16 {
        let ch = if ch.is_whitespace() { ' ' } else { ch };
        if ch == '\u{2022}' {
            return self.bullet_advance;
        }
        let ch = match to_winansi(ch) {
            Some(_) => accent_base(ch).unwrap_or(ch),
            None => SUBSTITUTE,
        };
        let code = ch as u32;
        match self.ascii {
            Some(table) if (0x20..=0x7E).contains(&code) => table[(code - 0x20) as usize],
            _ => self.default_advance,
        }
    }
}

pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    ascii: Some(&HELVETICA_WIDTHS),
    default_advance: 556,
    bullet_advance: 350,
};

pub static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    ascii: Some(&HELVETICA_BOLD_WIDTHS),
    default_advance: 611,
    bullet_advance: 350,
};

pub static TIMES_ROMAN: StandardFontMetrics = StandardFontMetrics {
    ascii: Some(&TIMES_ROMAN_WIDTHS),
    default_advance: 500,
    bullet_advance: 350,
};

pub static TIMES_BOLD: StandardFontMetrics = StandardFontMetrics {
    ascii: Some(&TIMES_BOLD_WIDTHS),
    default_advance: 500,
    bullet_advance: 350,
};

pub static TIMES_ITALIC: StandardFontMetrics = StandardFontMetrics {
    ascii: Some(&TIMES_ITALIC_WIDTHS),
    default_advance: 500,
    bullet_advance: 350,
};

pub static TIMES_BOLD_ITALIC: StandardFontMetrics = StandardFontMetrics {
    ascii: Some(&TIMES_BOLD_ITALIC_WIDTHS),
    default_advance: 500,
    bullet_advance: 350,
};

pub static COURIER: StandardFontMetrics = StandardFontMetrics {
    ascii: None,
    default_advance: 600,
    bullet_advance: 600,
};

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // p..~
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
static TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
static TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

#[rustfmt::skip]
static TIMES_ITALIC_WIDTHS: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500,
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500,
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500,
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
];

#[rustfmt::skip]
static TIMES_BOLD_ITALIC_WIDTHS: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    832, 667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889, 722, 722,
    611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611, 333, 278, 333, 570, 500,
    333, 500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778, 556, 500,
    500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389, 348, 220, 348, 570,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_widths_match_afm() {
        assert!((HELVETICA.char_width(' ', 12.0) - 3.336).abs() < 1e-9);
        assert!((TIMES_ROMAN.char_width(' ', 10.0) - 2.5).abs() < 1e-9);
        assert!((COURIER.char_width(' ', 10.0) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn newline_and_tab_measure_as_space() {
        let w = HELVETICA.measure_string("\n\t ", 10.0);
        assert!((w - 3.0 * 2.78).abs() < 1e-9);
    }

    #[test]
    fn courier_is_fixed_pitch() {
        assert_eq!(COURIER.measure_string("iiii", 10.0), COURIER.measure_string("MMMM", 10.0));
    }

    #[test]
    fn encodable_non_ascii_uses_default_advance() {
        assert_eq!(TIMES_ROMAN.char_width('\u{2019}', 1000.0), 500.0);
        assert_eq!(HELVETICA.char_width('\u{2022}', 1000.0), 350.0);
    }

    #[test]
    fn unencodable_chars_measure_as_the_substitute() {
        // Times '?' is 444, not the 500 fallback.
        assert_eq!(TIMES_ROMAN.char_width('\u{4e2d}', 1000.0), 444.0);
        assert_eq!(TIMES_ROMAN.measure_string("Ж\u{4e2d}", 10.0), TIMES_ROMAN.measure_string("??", 10.0));
    }

    #[test]
    fn accented_letters_measure_as_their_base() {
        assert_eq!(HELVETICA.measure_string("café", 12.0), HELVETICA.measure_string("cafe", 12.0));
        assert_eq!(TIMES_BOLD.char_width('Ñ', 1000.0), TIMES_BOLD.char_width('N', 1000.0));
    }

    #[test]
    fn very_long_strings_do_not_overflow() {
        // 5 million W at 944 units is past u32::MAX.
        let text = "W".repeat(5_000_000);
        let w = HELVETICA.measure_string(&text, 1000.0);
        assert_eq!(w, 5_000_000.0 * 944.0);
    }
}
