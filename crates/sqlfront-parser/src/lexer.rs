//! Character-class lexer.
//!
//! [`lex`] is a pure function from a byte slice (starting at the token) to
//! the length, kind and reserved flag of the first token. It never fails:
//! bytes no rule accepts come back as [`TokenKind::Illegal`] and the caller
//! decides what that means. The end of the slice behaves like a NUL
//! terminator, and an embedded NUL stops every inner scan.

use memchr::memchr2;

use crate::charclass::{
    CharClass, at, char_class, id_run_end, is_digit, is_id_char, is_space_at, is_xdigit,
    space_run_len,
};
use crate::keyword::lookup_keyword;
use crate::token::{Token, TokenKind};

/// Result of lexing one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme {
    /// Bytes consumed. At least 1 unless the input was empty.
    pub len: usize,
    pub kind: TokenKind,
    pub is_reserved: bool,
}

impl Lexeme {
    const fn new(len: usize, kind: TokenKind) -> Self {
        Self {
            len,
            kind,
            is_reserved: false,
        }
    }
}

/// Lex the first token of `z`.
///
/// An empty slice yields a zero-length [`TokenKind::StreamEnd`].
#[must_use]
pub fn lex(z: &[u8]) -> Lexeme {
    let Some(&first) = z.first() else {
        return Lexeme::new(0, TokenKind::StreamEnd);
    };
    match char_class(first) {
        CharClass::Space => Lexeme::new(space_run_len(z, 0), TokenKind::Space),
        CharClass::Minus => {
            if at(z, 1) == b'-' {
                line_comment(z)
            } else {
                Lexeme::new(1, TokenKind::Minus)
            }
        }
        CharClass::Lp => Lexeme::new(1, TokenKind::Lp),
        CharClass::Rp => Lexeme::new(1, TokenKind::Rp),
        CharClass::Semi => Lexeme::new(1, TokenKind::Semi),
        CharClass::Plus => Lexeme::new(1, TokenKind::Plus),
        CharClass::Star => Lexeme::new(1, TokenKind::Star),
        CharClass::Percent => Lexeme::new(1, TokenKind::Rem),
        CharClass::Comma => Lexeme::new(1, TokenKind::Comma),
        CharClass::And => Lexeme::new(1, TokenKind::BitAnd),
        CharClass::Tilda => Lexeme::new(1, TokenKind::BitNot),
        CharClass::Slash => block_comment(z),
        CharClass::Eq => Lexeme::new(1 + usize::from(at(z, 1) == b'='), TokenKind::Eq),
        CharClass::Lt => match at(z, 1) {
            b'=' => Lexeme::new(2, TokenKind::Le),
            b'>' => Lexeme::new(2, TokenKind::Ne),
            b'<' => Lexeme::new(2, TokenKind::LShift),
            _ => Lexeme::new(1, TokenKind::Lt),
        },
        CharClass::Gt => match at(z, 1) {
            b'=' => Lexeme::new(2, TokenKind::Ge),
            b'>' => Lexeme::new(2, TokenKind::RShift),
            _ => Lexeme::new(1, TokenKind::Gt),
        },
        CharClass::Bang => {
            if at(z, 1) == b'=' {
                Lexeme::new(2, TokenKind::Ne)
            } else {
                Lexeme::new(1, TokenKind::Illegal)
            }
        }
        CharClass::Pipe => {
            if at(z, 1) == b'|' {
                Lexeme::new(2, TokenKind::Concat)
            } else {
                Lexeme::new(1, TokenKind::BitOr)
            }
        }
        CharClass::Quote | CharClass::DQuote => quoted(z, first),
        CharClass::Dot => {
            if is_digit(at(z, 1)) {
                number(z)
            } else {
                Lexeme::new(1, TokenKind::Dot)
            }
        }
        CharClass::Digit => number(z),
        CharClass::VarNum => {
            let mut i = 1;
            while is_digit(at(z, i)) {
                i += 1;
            }
            Lexeme::new(i, TokenKind::Variable)
        }
        CharClass::Dollar | CharClass::VarAlpha => {
            let end = id_run_end(z, 1);
            if end == 1 {
                Lexeme::new(1, TokenKind::Illegal)
            } else {
                Lexeme::new(end, TokenKind::Variable)
            }
        }
        CharClass::Keyword => keyword_run(z),
        CharClass::X => {
            if at(z, 1) == b'\'' {
                blob(z)
            } else {
                identifier(z, 1)
            }
        }
        CharClass::Id => match space_run_len(z, 0) {
            0 => identifier(z, 1),
            n => Lexeme::new(n, TokenKind::Space),
        },
        CharClass::Illegal => Lexeme::new(1, TokenKind::Illegal),
    }
}

// ---------------------------------------------------------------------------
// Branch helpers
// ---------------------------------------------------------------------------

/// `--` to end of line. The newline is not part of the comment.
fn line_comment(z: &[u8]) -> Lexeme {
    let len = memchr2(b'\n', 0, &z[2..]).map_or(z.len(), |pos| pos + 2);
    Lexeme::new(len, TokenKind::Space)
}

/// `/` or `/* ... */`. An unterminated comment runs to end of input.
fn block_comment(z: &[u8]) -> Lexeme {
    if at(z, 1) != b'*' || at(z, 2) == 0 {
        return Lexeme::new(1, TokenKind::Slash);
    }
    let mut i = 3;
    let mut c = at(z, 2);
    loop {
        if c == b'*' && at(z, i) == b'/' {
            break;
        }
        c = at(z, i);
        if c == 0 {
            break;
        }
        i += 1;
    }
    if c != 0 {
        i += 1;
    }
    Lexeme::new(i, TokenKind::Space)
}

/// `'string'` or `"identifier"`; a doubled delimiter is an escaped one.
fn quoted(z: &[u8], delim: u8) -> Lexeme {
    let mut i = 1;
    let mut c;
    loop {
        c = at(z, i);
        if c == 0 {
            break;
        }
        if c == delim {
            if at(z, i + 1) == delim {
                i += 1;
            } else {
                break;
            }
        }
        i += 1;
    }
    match c {
        0 => Lexeme::new(i, TokenKind::Illegal),
        b'\'' => Lexeme::new(i + 1, TokenKind::String),
        _ => Lexeme::new(i + 1, TokenKind::Id),
    }
}

/// Decimal, hex, or float literal. Starts at a digit or at `.digit`.
fn number(z: &[u8]) -> Lexeme {
    if z[0] == b'0' && matches!(at(z, 1), b'x' | b'X') && is_xdigit(at(z, 2)) {
        let mut i = 3;
        while is_xdigit(at(z, i)) {
            i += 1;
        }
        return Lexeme::new(i, TokenKind::Integer);
    }
    let mut kind = TokenKind::Integer;
    let mut i = 0;
    while is_digit(at(z, i)) {
        i += 1;
    }
    if at(z, i) == b'.' {
        i += 1;
        while is_digit(at(z, i)) {
            i += 1;
        }
        kind = TokenKind::Float;
    }
    if matches!(at(z, i), b'e' | b'E')
        && (is_digit(at(z, i + 1))
            || (matches!(at(z, i + 1), b'+' | b'-') && is_digit(at(z, i + 2))))
    {
        i += 2;
        while is_digit(at(z, i)) {
            i += 1;
        }
        kind = TokenKind::Float;
    }
    let end = id_run_end(z, i);
    if end > i {
        return Lexeme::new(end, TokenKind::Illegal);
    }
    Lexeme::new(i, kind)
}

/// `x'...'`: an even number of hex digits between the quotes.
fn blob(z: &[u8]) -> Lexeme {
    let mut i = 2;
    while is_xdigit(at(z, i)) {
        i += 1;
    }
    let mut kind = TokenKind::Blob;
    if at(z, i) != b'\'' || i % 2 == 1 {
        kind = TokenKind::Illegal;
        while !matches!(at(z, i), 0 | b'\'') {
            i += 1;
        }
    }
    if at(z, i) != 0 {
        i += 1;
    }
    Lexeme::new(i, kind)
}

/// Maximal run of keyword-legal bytes, then either a keyword lookup or, if
/// an identifier byte follows, the identifier path.
fn keyword_run(z: &[u8]) -> Lexeme {
    let mut i = 1;
    while char_class(at(z, i)) <= CharClass::Keyword {
        i += 1;
    }
    if !is_space_at(z, i) && is_id_char(at(z, i)) {
        return identifier(z, i + 1);
    }
    match lookup_keyword(&z[..i]) {
        Some((kind, is_reserved)) => Lexeme {
            len: i,
            kind,
            is_reserved,
        },
        None => Lexeme::new(i, TokenKind::Id),
    }
}

/// Identifier whose first `from` bytes are already accepted.
fn identifier(z: &[u8], from: usize) -> Lexeme {
    Lexeme::new(id_run_end(z, from), TokenKind::Id)
}

// ---------------------------------------------------------------------------
// Token stream
// ---------------------------------------------------------------------------

/// Iterator over every token of a buffer, whitespace and illegal included.
///
/// Token lengths always sum to the bytes consumed so far.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub const fn new(src: &'a [u8]) -> Self {
        Self { src, pos: 0 }
    }

    /// Offset of the next token.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = self.src.get(self.pos..).filter(|r| !r.is_empty())?;
        let lexeme = lex(rest);
        let token = Token {
            offset: self.pos,
            text: &rest[..lexeme.len],
            kind: lexeme.kind,
            is_reserved: lexeme.is_reserved,
        };
        self.pos += lexeme.len;
        Some(token)
    }
}

/// Tokenize a whole buffer.
pub fn tokenize(src: &[u8]) -> Lexer<'_> {
    Lexer::new(src)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(input: &str) -> Lexeme {
        lex(input.as_bytes())
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input.as_bytes())
            .filter(|t| t.kind != TokenKind::Space)
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn empty_input_is_stream_end() {
        assert_eq!(lex(b""), Lexeme::new(0, TokenKind::StreamEnd));
    }

    #[test]
    fn float_with_exponent() {
        assert_eq!(one("1.5e10"), Lexeme::new(6, TokenKind::Float));
        assert_eq!(one("1e+5"), Lexeme::new(4, TokenKind::Float));
        assert_eq!(one("2E-3 "), Lexeme::new(4, TokenKind::Float));
        assert_eq!(one(".5"), Lexeme::new(2, TokenKind::Float));
        assert_eq!(one("3."), Lexeme::new(2, TokenKind::Float));
    }

    #[test]
    fn exponent_needs_digits() {
        // `1e` then `+`: the marker alone does not make a float.
        assert_eq!(one("1e"), Lexeme::new(2, TokenKind::Illegal));
        assert_eq!(one("1e+"), Lexeme::new(2, TokenKind::Illegal));
    }

    #[test]
    fn hex_integer() {
        assert_eq!(one("0x1F"), Lexeme::new(4, TokenKind::Integer));
        assert_eq!(one("0XfF)"), Lexeme::new(4, TokenKind::Integer));
        // No hex digit after the prefix: `0` then an identifier tail.
        assert_eq!(one("0x"), Lexeme::new(2, TokenKind::Illegal));
    }

    #[test]
    fn plain_integer() {
        assert_eq!(one("42"), Lexeme::new(2, TokenKind::Integer));
        assert_eq!(one("42;"), Lexeme::new(2, TokenKind::Integer));
    }

    #[test]
    fn doubled_quote_is_escaped() {
        let input = "'it''s'";
        assert_eq!(one(input), Lexeme::new(input.len(), TokenKind::String));
        assert_eq!(one("'a' b"), Lexeme::new(3, TokenKind::String));
    }

    #[test]
    fn unterminated_string_is_illegal() {
        assert_eq!(one("'abc"), Lexeme::new(4, TokenKind::Illegal));
        assert_eq!(one("'ab''"), Lexeme::new(5, TokenKind::Illegal));
    }

    #[test]
    fn double_quoted_identifier() {
        assert_eq!(one("\"a\"\"b\" x"), Lexeme::new(6, TokenKind::Id));
        assert_eq!(one("\"abc"), Lexeme::new(4, TokenKind::Illegal));
    }

    #[test]
    fn embedded_nul_stops_literal() {
        assert_eq!(lex(b"'ab\0cd'"), Lexeme::new(3, TokenKind::Illegal));
        assert_eq!(lex(b"\0"), Lexeme::new(1, TokenKind::Illegal));
    }

    #[test]
    fn blob_literal() {
        assert_eq!(one("x'1A'"), Lexeme::new(5, TokenKind::Blob));
        assert_eq!(one("X''"), Lexeme::new(3, TokenKind::Blob));
        assert_eq!(one("x'1'"), Lexeme::new(4, TokenKind::Illegal));
        assert_eq!(one("x'1G'"), Lexeme::new(5, TokenKind::Illegal));
        assert_eq!(one("x'12"), Lexeme::new(4, TokenKind::Illegal));
    }

    #[test]
    fn x_without_quote_is_identifier() {
        assert_eq!(one("xyz"), Lexeme::new(3, TokenKind::Id));
        assert_eq!(one("x"), Lexeme::new(1, TokenKind::Id));
    }

    #[test]
    fn unterminated_block_comment_is_whitespace() {
        let input = "/* abc";
        assert_eq!(one(input), Lexeme::new(input.len(), TokenKind::Space));
        assert_eq!(one("/* a */x"), Lexeme::new(7, TokenKind::Space));
        assert_eq!(one("/**/"), Lexeme::new(4, TokenKind::Space));
    }

    #[test]
    fn bare_comment_opener_at_end_is_slash() {
        assert_eq!(one("/*"), Lexeme::new(1, TokenKind::Slash));
        assert_eq!(kinds("/*"), vec![TokenKind::Slash, TokenKind::Star]);
        assert_eq!(one("/ 2"), Lexeme::new(1, TokenKind::Slash));
    }

    #[test]
    fn line_comment_stops_before_newline() {
        assert_eq!(one("-- hi\nSELECT"), Lexeme::new(5, TokenKind::Space));
        assert_eq!(one("-- to the end"), Lexeme::new(13, TokenKind::Space));
        assert_eq!(one("-1"), Lexeme::new(1, TokenKind::Minus));
    }

    #[test]
    fn keyword_prefix_with_identifier_tail() {
        assert_eq!(one("selectx"), Lexeme::new(7, TokenKind::Id));
        assert_eq!(one("select_all"), Lexeme::new(10, TokenKind::Id));
    }

    #[test]
    fn reserved_keyword_with_digit_tail_is_identifier() {
        let lexeme = one("select1");
        assert_eq!(lexeme.len, 7);
        assert_eq!(lexeme.kind, TokenKind::Id);
        assert!(!lexeme.is_reserved);
        assert_eq!(one("from$x").kind, TokenKind::Id);
    }

    #[test]
    fn keyword_lookup() {
        let lexeme = one("SELECT *");
        assert_eq!(lexeme.len, 6);
        assert_eq!(lexeme.kind, TokenKind::KwSelect);
        assert!(lexeme.is_reserved);
        let lexeme = one("key)");
        assert_eq!(lexeme.kind, TokenKind::KwKey);
        assert!(!lexeme.is_reserved);
        assert_eq!(one("name").kind, TokenKind::Id);
    }

    #[test]
    fn trailing_identifier_makes_number_illegal() {
        assert_eq!(one("1abc"), Lexeme::new(4, TokenKind::Illegal));
        assert_eq!(one("1.5x y"), Lexeme::new(4, TokenKind::Illegal));
    }

    #[test]
    fn operators() {
        assert_eq!(one("=="), Lexeme::new(2, TokenKind::Eq));
        assert_eq!(one("="), Lexeme::new(1, TokenKind::Eq));
        assert_eq!(one("<>"), Lexeme::new(2, TokenKind::Ne));
        assert_eq!(one("!="), Lexeme::new(2, TokenKind::Ne));
        assert_eq!(one("!"), Lexeme::new(1, TokenKind::Illegal));
        assert_eq!(one("<="), Lexeme::new(2, TokenKind::Le));
        assert_eq!(one("<<"), Lexeme::new(2, TokenKind::LShift));
        assert_eq!(one(">="), Lexeme::new(2, TokenKind::Ge));
        assert_eq!(one(">>"), Lexeme::new(2, TokenKind::RShift));
        assert_eq!(one("||"), Lexeme::new(2, TokenKind::Concat));
        assert_eq!(one("|"), Lexeme::new(1, TokenKind::BitOr));
        assert_eq!(one("~"), Lexeme::new(1, TokenKind::BitNot));
        assert_eq!(one("%"), Lexeme::new(1, TokenKind::Rem));
        assert_eq!(one("&"), Lexeme::new(1, TokenKind::BitAnd));
        assert_eq!(one("."), Lexeme::new(1, TokenKind::Dot));
    }

    #[test]
    fn variables() {
        assert_eq!(one("?"), Lexeme::new(1, TokenKind::Variable));
        assert_eq!(one("?12,"), Lexeme::new(3, TokenKind::Variable));
        assert_eq!(one(":name "), Lexeme::new(5, TokenKind::Variable));
        assert_eq!(one("@a1"), Lexeme::new(3, TokenKind::Variable));
        assert_eq!(one("$v"), Lexeme::new(2, TokenKind::Variable));
        assert_eq!(one("#1"), Lexeme::new(2, TokenKind::Variable));
        assert_eq!(one(": x"), Lexeme::new(1, TokenKind::Illegal));
        assert_eq!(one("$"), Lexeme::new(1, TokenKind::Illegal));
    }

    #[test]
    fn multibyte_whitespace_and_identifiers() {
        let s = "\u{00a0}\u{3000} x";
        assert_eq!(one(s), Lexeme::new(s.len() - 1, TokenKind::Space));
        // Only a keyword-legal run is cut short by multi-byte whitespace.
        let s = "ab\u{3000}";
        assert_eq!(one(s), Lexeme::new(2, TokenKind::Id));
        let s = "été\u{00a0}";
        assert_eq!(one(s), Lexeme::new(s.len(), TokenKind::Id));
        let s = "naïve";
        assert_eq!(one(s), Lexeme::new(s.len(), TokenKind::Id));
    }

    #[test]
    fn multibyte_space_after_number_or_sigil() {
        assert_eq!(one("1\u{a0}"), Lexeme::new(3, TokenKind::Illegal));
        assert_eq!(one("1.5\u{3000}"), Lexeme::new(6, TokenKind::Illegal));
        assert_eq!(one("$\u{a0}"), Lexeme::new(3, TokenKind::Variable));
        assert_eq!(one(":v\u{a0} "), Lexeme::new(4, TokenKind::Variable));
    }

    #[test]
    fn unclassifiable_bytes() {
        assert_eq!(one("^"), Lexeme::new(1, TokenKind::Illegal));
        assert_eq!(one("[x]"), Lexeme::new(1, TokenKind::Illegal));
        assert_eq!(lex(&[0x01]), Lexeme::new(1, TokenKind::Illegal));
    }

    #[test]
    fn stream_lengths_cover_input() {
        let sql = "SELECT a, 'x''y' FROM t -- c\n WHERE b >= .5e1 /* t";
        let tokens: Vec<_> = tokenize(sql.as_bytes()).collect();
        let total: usize = tokens.iter().map(Token::len).sum();
        assert_eq!(total, sql.len());
        assert!(tokens.iter().all(|t| !t.is_empty()));
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Space));
    }

    #[test]
    fn statement_token_sequence() {
        assert_eq!(
            kinds("SELECT a FROM t WHERE b = ?;"),
            vec![
                TokenKind::KwSelect,
                TokenKind::Id,
                TokenKind::KwFrom,
                TokenKind::Id,
                TokenKind::KwWhere,
                TokenKind::Id,
                TokenKind::Eq,
                TokenKind::Variable,
                TokenKind::Semi,
            ]
        );
    }
}
