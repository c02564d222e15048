//! Per-byte classification tables consulted by the lexer.
//!
//! Two fixed 256-entry tables: [`CharClass`] picks the lexer branch for the
//! first byte of a token, and [`CharFlags`] answers the ctype questions
//! (space, digit, hex digit, identifier byte) asked inside a branch. Both
//! are built at compile time and never change.

use bitflags::bitflags;

/// First-byte dispatch class.
///
/// `X` and `Keyword` are the only classes legal inside a keyword run, so a
/// run continues while `class <= Keyword`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum CharClass {
    /// `x` / `X`: start of a blob literal or an identifier.
    X = 0,
    /// ASCII letters and `_`.
    Keyword = 1,
    /// Bytes `0x80..=0xFF`: UTF-8 identifier or multi-byte whitespace.
    Id = 2,
    Digit = 3,
    Dollar = 4,
    /// `@`, `#`, `:`.
    VarAlpha = 5,
    /// `?`.
    VarNum = 6,
    Space = 7,
    Quote = 8,
    DQuote = 9,
    Pipe = 10,
    Minus = 11,
    Lt = 12,
    Gt = 13,
    Eq = 14,
    Bang = 15,
    Slash = 16,
    Lp = 17,
    Rp = 18,
    Semi = 19,
    Plus = 20,
    Star = 21,
    Percent = 22,
    Comma = 23,
    And = 24,
    Tilda = 25,
    Dot = 26,
    Illegal = 27,
}

const fn build_class_table() -> [CharClass; 256] {
    let mut t = [CharClass::Illegal; 256];
    let mut b = 0x80;
    while b < 256 {
        t[b] = CharClass::Id;
        b += 1;
    }
    let mut b = b'\t' as usize;
    while b <= 0x0d {
        t[b] = CharClass::Space;
        b += 1;
    }
    let mut b = b'0' as usize;
    while b <= b'9' as usize {
        t[b] = CharClass::Digit;
        b += 1;
    }
    let mut b = b'A' as usize;
    while b <= b'Z' as usize {
        t[b] = CharClass::Keyword;
        t[b + 0x20] = CharClass::Keyword;
        b += 1;
    }
    t[b'X' as usize] = CharClass::X;
    t[b'x' as usize] = CharClass::X;
    t[b'_' as usize] = CharClass::Keyword;
    t[b' ' as usize] = CharClass::Space;
    t[b'!' as usize] = CharClass::Bang;
    t[b'"' as usize] = CharClass::DQuote;
    t[b'#' as usize] = CharClass::VarAlpha;
    t[b'$' as usize] = CharClass::Dollar;
    t[b'%' as usize] = CharClass::Percent;
    t[b'&' as usize] = CharClass::And;
    t[b'\'' as usize] = CharClass::Quote;
    t[b'(' as usize] = CharClass::Lp;
    t[b')' as usize] = CharClass::Rp;
    t[b'*' as usize] = CharClass::Star;
    t[b'+' as usize] = CharClass::Plus;
    t[b',' as usize] = CharClass::Comma;
    t[b'-' as usize] = CharClass::Minus;
    t[b'.' as usize] = CharClass::Dot;
    t[b'/' as usize] = CharClass::Slash;
    t[b':' as usize] = CharClass::VarAlpha;
    t[b';' as usize] = CharClass::Semi;
    t[b'<' as usize] = CharClass::Lt;
    t[b'=' as usize] = CharClass::Eq;
    t[b'>' as usize] = CharClass::Gt;
    t[b'?' as usize] = CharClass::VarNum;
    t[b'@' as usize] = CharClass::VarAlpha;
    t[b'|' as usize] = CharClass::Pipe;
    t[b'~' as usize] = CharClass::Tilda;
    t
}

static CLASS_TABLE: [CharClass; 256] = build_class_table();

/// Dispatch class of `byte`.
#[inline]
pub fn char_class(byte: u8) -> CharClass {
    CLASS_TABLE[usize::from(byte)]
}

bitflags! {
    /// ctype bits for one byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CharFlags: u8 {
        const SPACE = 0x01;
        const ALPHA = 0x02;
        const DIGIT = 0x04;
        const XDIGIT = 0x08;
        /// Legal inside an unquoted identifier. Set for ASCII alphanumerics,
        /// `_`, `$`, and every byte `>= 0x80`.
        const IDCHAR = 0x40;
    }
}

const fn build_flag_table() -> [CharFlags; 256] {
    let mut t = [CharFlags::empty(); 256];
    let mut b = 0usize;
    while b < 256 {
        let c = b as u8;
        let mut f = CharFlags::empty();
        if c == b' ' || (c >= b'\t' && c <= 0x0d) {
            f = f.union(CharFlags::SPACE);
        }
        if c.is_ascii_alphabetic() {
            f = f.union(CharFlags::ALPHA).union(CharFlags::IDCHAR);
        }
        if c.is_ascii_digit() {
            f = f.union(CharFlags::DIGIT).union(CharFlags::IDCHAR);
        }
        if c.is_ascii_hexdigit() {
            f = f.union(CharFlags::XDIGIT);
        }
        if c == b'_' || c == b'$' || c >= 0x80 {
            f = f.union(CharFlags::IDCHAR);
        }
        t[b] = f;
        b += 1;
    }
    t
}

static FLAG_TABLE: [CharFlags; 256] = build_flag_table();

#[inline]
pub fn flags(byte: u8) -> CharFlags {
    FLAG_TABLE[usize::from(byte)]
}

/// Single-byte SQL whitespace: space, `\t`, `\n`, `\v`, `\f`, `\r`.
#[inline]
pub fn is_space(byte: u8) -> bool {
    flags(byte).contains(CharFlags::SPACE)
}

#[inline]
pub fn is_digit(byte: u8) -> bool {
    flags(byte).contains(CharFlags::DIGIT)
}

#[inline]
pub fn is_xdigit(byte: u8) -> bool {
    flags(byte).contains(CharFlags::XDIGIT)
}

#[inline]
pub fn is_id_char(byte: u8) -> bool {
    flags(byte).contains(CharFlags::IDCHAR)
}

/// Byte at `i`, or NUL past the end of `z`.
///
/// Every scan in the lexer stops at NUL, so the end of the slice behaves
/// like a C string terminator.
#[inline]
pub fn at(z: &[u8], i: usize) -> u8 {
    z.get(i).copied().unwrap_or(0)
}

/// Decode one UTF-8 scalar value starting at `z[i]`.
///
/// Returns the character and its encoded width, or `None` for an invalid
/// or truncated sequence.
pub fn decode_char(z: &[u8], i: usize) -> Option<(char, usize)> {
    let lead = *z.get(i)?;
    let width = match lead {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => return None,
    };
    let bytes = z.get(i..i + width)?;
    let ch = std::str::from_utf8(bytes).ok()?.chars().next()?;
    Some((ch, width))
}

/// Width of the multi-byte whitespace code point at `z[i]`, or 0.
///
/// ASCII bytes always yield 0; single-byte space is [`is_space`]'s job.
pub fn multibyte_space_len(z: &[u8], i: usize) -> usize {
    if at(z, i) < 0x80 {
        return 0;
    }
    match decode_char(z, i) {
        Some((ch, width)) if ch.is_whitespace() => width,
        _ => 0,
    }
}

/// Whether `z[i]` starts a whitespace character of either width.
#[inline]
pub fn is_space_at(z: &[u8], i: usize) -> bool {
    is_space(at(z, i)) || multibyte_space_len(z, i) > 0
}

/// Length of the whitespace run starting at `z[start]`.
///
/// Decodes one code point at a time and stops at the first
/// non-whitespace code point or decode failure.
pub fn space_run_len(z: &[u8], start: usize) -> usize {
    let mut i = start;
    loop {
        let b = at(z, i);
        if is_space(b) {
            i += 1;
            continue;
        }
        match multibyte_space_len(z, i) {
            0 => break,
            n => i += n,
        }
    }
    i - start
}

/// End offset of the identifier-byte run starting at `z[start]`.
///
/// Bytes are tested one at a time; a multi-byte whitespace code point is
/// made of identifier bytes and does not end the run.
pub fn id_run_end(z: &[u8], start: usize) -> usize {
    let mut i = start;
    while is_id_char(at(z, i)) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    // Rows of the classic 256-byte class table, 0x00..=0x7F.
    const EXPECTED_ASCII: [u8; 128] = [
        27, 27, 27, 27, 27, 27, 27, 27, 27, 7, 7, 7, 7, 7, 27, 27, //
        27, 27, 27, 27, 27, 27, 27, 27, 27, 27, 27, 27, 27, 27, 27, 27, //
        7, 15, 9, 5, 4, 22, 24, 8, 17, 18, 21, 20, 23, 11, 26, 16, //
        3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 5, 19, 12, 14, 13, 6, //
        5, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
        1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 27, 27, 27, 27, 1, //
        27, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
        1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 27, 10, 27, 25, 27, //
    ];

    #[test]
    fn class_table_matches_reference_rows() {
        for (byte, expected) in EXPECTED_ASCII.iter().enumerate() {
            let got = char_class(byte as u8) as u8;
            assert_eq!(got, *expected, "byte 0x{byte:02x}");
        }
        for byte in 0x80..=0xffu8 {
            assert_eq!(char_class(byte), CharClass::Id, "byte 0x{byte:02x}");
        }
    }

    #[test]
    fn keyword_legal_classes() {
        assert!(char_class(b'x') <= CharClass::Keyword);
        assert!(char_class(b'_') <= CharClass::Keyword);
        assert!(char_class(b'Q') <= CharClass::Keyword);
        assert!(char_class(b'7') > CharClass::Keyword);
        assert!(char_class(0xc3) > CharClass::Keyword);
    }

    #[test]
    fn ctype_flags() {
        for b in [b' ', b'\t', b'\n', 0x0b, 0x0c, b'\r'] {
            assert!(is_space(b));
        }
        assert!(!is_space(0));
        assert!(is_digit(b'0') && is_digit(b'9') && !is_digit(b'a'));
        assert!(is_xdigit(b'f') && is_xdigit(b'F') && !is_xdigit(b'g'));
        assert!(is_id_char(b'_') && is_id_char(b'$') && is_id_char(0x80));
        assert!(!is_id_char(b'-') && !is_id_char(0));
    }

    #[test]
    fn at_reads_nul_past_end() {
        assert_eq!(at(b"ab", 1), b'b');
        assert_eq!(at(b"ab", 2), 0);
        assert_eq!(at(b"", 0), 0);
    }

    #[test]
    fn decode_rejects_truncated_and_invalid() {
        assert_eq!(decode_char("é".as_bytes(), 0), Some(('é', 2)));
        assert_eq!(decode_char(&[0xc3], 0), None);
        assert_eq!(decode_char(&[0x80, 0x80], 0), None);
        assert_eq!(decode_char(&[0xed, 0xa0, 0x80], 0), None);
    }

    #[test]
    fn multibyte_whitespace() {
        let nbsp = "\u{00a0}".as_bytes();
        let ideographic = "\u{3000}".as_bytes();
        assert_eq!(multibyte_space_len(nbsp, 0), 2);
        assert_eq!(multibyte_space_len(ideographic, 0), 3);
        assert_eq!(multibyte_space_len("é".as_bytes(), 0), 0);
        assert_eq!(multibyte_space_len(b" ", 0), 0);
    }

    #[test]
    fn space_run_mixes_widths() {
        let s = " \t\u{00a0}\u{2003}x".as_bytes();
        assert_eq!(space_run_len(s, 0), s.len() - 1);
        assert_eq!(space_run_len(b"x ", 0), 0);
        assert_eq!(space_run_len(b"  ", 0), 2);
    }

    #[test]
    fn id_run_is_bytewise() {
        let s = "abé\u{00a0}c".as_bytes();
        assert_eq!(id_run_end(s, 0), s.len());
        assert_eq!(id_run_end(b"a_b$9-", 0), 5);
        assert_eq!(id_run_end(b"ab", 2), 2);
    }
}
