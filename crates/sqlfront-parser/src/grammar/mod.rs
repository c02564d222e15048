//! Bundled SQL grammar engine.
//!
//! [`SqlEngine`] is push-driven like a generated LALR engine: the driver
//! feeds it one significant token at a time. It buffers tokens until the
//! statement terminator arrives, then builds the statement with a
//! recursive-descent builder ([`stmt`]) and a Pratt expression parser
//! ([`expr`]). Inside `CREATE TRIGGER ... BEGIN ... END` the inner `;`
//! tokens are buffered instead of ending the statement.

mod cursor;
mod expr;
mod stmt;

use sqlfront_error::{ErrorCode, Result};
use tracing::{debug, trace};

use crate::context::ParseContext;
use crate::engine::{Grammar, GrammarEngine};
use crate::token::{Token, TokenKind};

use self::cursor::Builder;

/// A token held by the engine until its statement is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Tok {
    pub(crate) kind: TokenKind,
    pub(crate) offset: usize,
    pub(crate) len: usize,
    pub(crate) reserved: bool,
}

impl Tok {
    fn from_token(kind: TokenKind, token: &Token<'_>) -> Self {
        Self {
            kind,
            offset: token.offset,
            len: token.len(),
            reserved: token.is_reserved,
        }
    }

    pub(crate) const fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Factory for [`SqlEngine`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlGrammar;

impl Grammar for SqlGrammar {
    type Engine = SqlEngine;

    fn alloc(&self) -> Result<SqlEngine> {
        trace!("allocating grammar engine");
        Ok(SqlEngine::default())
    }

    fn free(&self, engine: SqlEngine) {
        trace!(buffered = engine.buf.len(), "freeing grammar engine");
    }
}

/// Engine state for one statement.
#[derive(Debug, Default)]
pub struct SqlEngine {
    buf: Vec<Tok>,
}

impl SqlEngine {
    /// Whether the buffered tokens are a `CREATE TRIGGER` whose body has
    /// not reached its closing `END` yet.
    fn trigger_body_open(&self) -> bool {
        let [first, second, rest @ ..] = self.buf.as_slice() else {
            return false;
        };
        if first.kind != TokenKind::KwCreate || second.kind != TokenKind::KwTrigger {
            return false;
        }
        let Some(begin) = rest.iter().position(|t| t.kind == TokenKind::KwBegin) else {
            return false;
        };
        let mut case_depth = 0u32;
        for tok in &rest[begin + 1..] {
            match tok.kind {
                TokenKind::KwCase => case_depth += 1,
                TokenKind::KwEnd if case_depth > 0 => case_depth -= 1,
                TokenKind::KwEnd => return false,
                _ => {}
            }
        }
        true
    }

    fn finish<'src>(&mut self, terminator: Tok, ctx: &mut ParseContext<'src>) {
        let toks = std::mem::take(&mut self.buf);
        debug!(tokens = toks.len(), "building statement");
        let mut builder = Builder::new(ctx, &toks, terminator);
        match builder.build() {
            Ok(()) => ctx.set_rc(ErrorCode::Done),
            Err(err) => ctx.set_error(err),
        }
    }
}

impl GrammarEngine for SqlEngine {
    fn feed<'src>(&mut self, kind: TokenKind, token: Token<'src>, ctx: &mut ParseContext<'src>) {
        match kind {
            TokenKind::Semi if !token.is_empty() && self.trigger_body_open() => {
                self.buf.push(Tok::from_token(kind, &token));
            }
            TokenKind::Semi | TokenKind::StreamEnd => {
                // A lone `;` is an empty statement.
                if !self.buf.is_empty() {
                    self.finish(Tok::from_token(TokenKind::Semi, &token), ctx);
                }
            }
            _ => self.buf.push(Tok::from_token(kind, &token)),
        }
    }
}
