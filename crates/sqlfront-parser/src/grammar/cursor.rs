//! Token cursor and literal decoding shared by the statement and expression
//! builders.

use std::borrow::Cow;

use sqlfront_ast::{Span, Statement};
use sqlfront_error::{FrontendError, Result};

use crate::context::{ParseContext, PreparedStatement};
use crate::token::TokenKind;

use super::Tok;

/// Recursive-descent state over one statement's buffered tokens.
pub(crate) struct Builder<'a, 'src> {
    pub(super) ctx: &'a mut ParseContext<'src>,
    src: &'src [u8],
    toks: &'a [Tok],
    pos: usize,
    terminator: Tok,
    pub(super) depth: usize,
}

impl<'a, 'src> Builder<'a, 'src> {
    pub(super) fn new(ctx: &'a mut ParseContext<'src>, toks: &'a [Tok], terminator: Tok) -> Self {
        let src = ctx.source();
        Self {
            ctx,
            src,
            toks,
            pos: 0,
            terminator,
            depth: 0,
        }
    }

    /// Build the whole statement and store the result in the context.
    pub(super) fn build(&mut self) -> Result<()> {
        let start = self.toks.first().map_or(self.terminator.offset, |t| t.offset);
        let stmt = self.parse_statement()?;
        if self.pos < self.toks.len() {
            return Err(self.error_here());
        }
        let end = self.toks.last().map_or(start, Tok::end);
        if self.ctx.is_parse_only() {
            if let Statement::Select(select) = &stmt {
                if let Some(expr) = select.single_expression() {
                    self.ctx.set_parsed_expr(expr.clone());
                }
            }
            self.ctx.set_parsed_ast(stmt);
        } else {
            let parameters = self.ctx.vlist.take().unwrap_or_default();
            self.ctx.set_statement(PreparedStatement {
                stmt,
                parameters,
                span: Span::from_offsets(start, end),
            });
        }
        Ok(())
    }

    // === Token access ===

    /// Kind of the current token; `StreamEnd` once the buffer is exhausted.
    pub(super) fn peek(&self) -> TokenKind {
        self.peek_at(0)
    }

    pub(super) fn peek_at(&self, n: usize) -> TokenKind {
        self.toks
            .get(self.pos + n)
            .map_or(TokenKind::StreamEnd, |t| t.kind)
    }

    pub(super) fn current(&self) -> Tok {
        self.toks.get(self.pos).copied().unwrap_or(self.terminator)
    }

    pub(super) fn advance(&mut self) -> Tok {
        let tok = self.current();
        if self.pos < self.toks.len() {
            self.pos += 1;
        }
        tok
    }

    pub(super) fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<Tok> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here())
        }
    }

    pub(super) fn text(&self, tok: Tok) -> &'src [u8] {
        &self.src[tok.offset..tok.end()]
    }

    pub(super) fn text_str(&self, tok: Tok) -> Cow<'src, str> {
        String::from_utf8_lossy(self.text(tok))
    }

    pub(super) fn span(tok: Tok) -> Span {
        Span::from_offsets(tok.offset, tok.end())
    }

    /// Syntax error at the current token. Running out of tokens before a
    /// synthesized terminator means the input ended mid-statement.
    pub(super) fn error_here(&self) -> FrontendError {
        let tok = self.current();
        if self.pos >= self.toks.len() && tok.len == 0 {
            return FrontendError::IncompleteInput;
        }
        FrontendError::syntax(self.text_str(tok))
    }

    // === Nesting ===

    /// Enter one level of recursion. Expressions and nested statements
    /// share the `max_expr_depth` budget.
    pub(super) fn descend(&mut self) -> Result<()> {
        let max = self.ctx.limits().max_expr_depth;
        if self.depth >= max {
            return Err(FrontendError::ExpressionTooDeep { max });
        }
        self.depth += 1;
        Ok(())
    }

    pub(super) fn ascend(&mut self) {
        self.depth -= 1;
    }

    // === Names ===

    /// Whether the current token can start a name.
    pub(super) fn at_name(&self) -> bool {
        let tok = self.current();
        self.pos < self.toks.len()
            && (tok.kind == TokenKind::Id || (tok.kind.is_keyword() && !tok.reserved))
    }

    /// Consume a name: an identifier (unquoted if double-quoted) or a
    /// non-reserved keyword. Reserved keywords are rejected.
    pub(super) fn name(&mut self) -> Result<String> {
        let tok = self.current();
        if self.pos >= self.toks.len() {
            return Err(self.error_here());
        }
        match tok.kind {
            TokenKind::Id => {
                self.pos += 1;
                Ok(unquote_identifier(self.text(tok)))
            }
            kind if kind.is_keyword() && tok.reserved => Err(FrontendError::ReservedKeyword {
                keyword: self.text_str(tok).into_owned(),
            }),
            kind if kind.is_keyword() => {
                self.pos += 1;
                Ok(self.text_str(tok).into_owned())
            }
            _ => Err(self.error_here()),
        }
    }

    /// Consume a name if one is present.
    pub(super) fn optional_alias(&mut self) -> Result<Option<String>> {
        if self.eat(TokenKind::KwAs) {
            return self.name().map(Some);
        }
        if self.at(TokenKind::Id) {
            return self.name().map(Some);
        }
        Ok(None)
    }

    /// `( name, ... )`
    pub(super) fn name_list(&mut self) -> Result<Vec<String>> {
        self.expect(TokenKind::Lp)?;
        let mut names = vec![self.name()?];
        while self.eat(TokenKind::Comma) {
            names.push(self.name()?);
        }
        self.expect(TokenKind::Rp)?;
        Ok(names)
    }
}

// ---------------------------------------------------------------------------
// Literal decoding
// ---------------------------------------------------------------------------

/// Strip the quotes from a `"quoted"` identifier and collapse `""`.
/// Unquoted identifiers come back unchanged.
pub(crate) fn unquote_identifier(text: &[u8]) -> String {
    match text {
        [b'"', inner @ .., b'"'] => String::from_utf8_lossy(inner).replace("\"\"", "\""),
        _ => String::from_utf8_lossy(text).into_owned(),
    }
}

/// Contents of a `'string'` literal with `''` collapsed.
pub(crate) fn unquote_string(text: &[u8]) -> String {
    match text {
        [b'\'', inner @ .., b'\''] => String::from_utf8_lossy(inner).replace("''", "'"),
        _ => String::from_utf8_lossy(text).into_owned(),
    }
}

/// Bytes of an `x'..'` literal. The lexer has already checked the digits.
pub(crate) fn decode_blob(text: &[u8]) -> Option<Vec<u8>> {
    let digits = text.get(2..text.len().checked_sub(1)?)?;
    digits
        .chunks_exact(2)
        .map(|pair| {
            let hi = char::from(pair[0]).to_digit(16)?;
            let lo = char::from(pair[1]).to_digit(16)?;
            u8::try_from(hi * 16 + lo).ok()
        })
        .collect()
}

/// Value of an integer token.
///
/// Decimal values that do not fit in `i64` become floats. Hex values are
/// two's complement and may have at most 16 significant digits.
pub(crate) enum IntegerValue {
    Int(i64),
    Float(f64),
}

pub(crate) fn decode_integer(text: &str) -> Result<IntegerValue> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        let significant = hex.trim_start_matches('0');
        if significant.len() > 16 {
            return Err(FrontendError::HexLiteralTooBig {
                literal: text.to_owned(),
            });
        }
        let value = u64::from_str_radix(hex, 16).map_err(|_| FrontendError::HexLiteralTooBig {
            literal: text.to_owned(),
        })?;
        return Ok(IntegerValue::Int(i64::from_ne_bytes(value.to_ne_bytes())));
    }
    if let Ok(value) = text.parse::<i64>() {
        return Ok(IntegerValue::Int(value));
    }
    text.parse::<f64>()
        .map(IntegerValue::Float)
        .map_err(|_| FrontendError::syntax(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_unquoting() {
        assert_eq!(unquote_identifier(b"abc"), "abc");
        assert_eq!(unquote_identifier(b"\"a\"\"b\""), "a\"b");
        assert_eq!(unquote_identifier(b"\"\""), "");
    }

    #[test]
    fn string_unquoting() {
        assert_eq!(unquote_string(b"'it''s'"), "it's");
        assert_eq!(unquote_string(b"''"), "");
    }

    #[test]
    fn blob_decoding() {
        assert_eq!(decode_blob(b"x'1Aff'"), Some(vec![0x1a, 0xff]));
        assert_eq!(decode_blob(b"X''"), Some(vec![]));
    }

    #[test]
    fn integer_decoding() {
        assert!(matches!(decode_integer("42"), Ok(IntegerValue::Int(42))));
        assert!(matches!(decode_integer("0x1F"), Ok(IntegerValue::Int(31))));
        assert!(matches!(
            decode_integer("0xFFFFFFFFFFFFFFFF"),
            Ok(IntegerValue::Int(-1))
        ));
        assert!(matches!(
            decode_integer("0x0000000000000000001"),
            Ok(IntegerValue::Int(1))
        ));
        assert!(matches!(
            decode_integer("9223372036854775808"),
            Ok(IntegerValue::Float(_))
        ));
        assert!(matches!(
            decode_integer("0x10000000000000000"),
            Err(FrontendError::HexLiteralTooBig { .. })
        ));
    }
}
