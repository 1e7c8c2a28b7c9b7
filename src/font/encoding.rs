//! WinAnsiEncoding, the single-byte encoding every base font is drawn with.
//!
//! Measurement and drawing share this table so that a character the PDF
//! cannot encode is measured as the `?` that replaces it.

/// Byte drawn in place of a character WinAnsi cannot represent.
pub const SUBSTITUTE: char = '?';

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// WinAnsiEncoding is based on Windows-1252. Most codepoints in
/// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
/// holds smart quotes, bullets and dashes.
pub fn to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2018 => Some(0x91), // Left single quotation mark
        0x2019 => Some(0x92), // Right single quotation mark
        0x201C => Some(0x93), // Left double quotation mark
        0x201D => Some(0x94), // Right double quotation mark
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x2122 => Some(0x99), // Trade mark sign
        _ => None,
    }
}

/// The unaccented ASCII letter an accented Latin-1 letter is built on.
///
/// The base fonts give accented letters the advance of their base letter,
/// so the ASCII table measures them. Ligatures and letters with no ASCII
/// base (Æ, ß, Þ, ð) return `None`.
pub fn accent_base(ch: char) -> Option<char> {
    let base = match ch {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => return None,
    };
    Some(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_and_specials_encode() {
        assert_eq!(to_winansi('A'), Some(0x41));
        assert_eq!(to_winansi('é'), Some(0xE9));
        assert_eq!(to_winansi('\u{2014}'), Some(0x97));
        assert_eq!(to_winansi('\u{4e2d}'), None);
        assert_eq!(to_winansi('\u{0080}'), None);
    }

    #[test]
    fn accented_letters_fold_to_their_base() {
        assert_eq!(accent_base('É'), Some('E'));
        assert_eq!(accent_base('ø'), Some('o'));
        assert_eq!(accent_base('ÿ'), Some('y'));
        // × and ÷ sit between the letter ranges.
        assert_eq!(accent_base('×'), None);
        assert_eq!(accent_base('÷'), None);
        assert_eq!(accent_base('ß'), None);
    }
}
