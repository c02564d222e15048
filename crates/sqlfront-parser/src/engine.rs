//! Grammar engine boundary.
//!
//! The driver knows nothing about SQL grammar. It hands significant tokens,
//! one at a time, to a [`GrammarEngine`] obtained from a [`Grammar`], and
//! learns the outcome only through the [`ParseContext`]: `rc == Done` means
//! a statement is complete, a recorded error means it failed.

use sqlfront_error::Result;

use crate::context::ParseContext;
use crate::token::{Token, TokenKind};

/// Factory for engine instances. One instance serves one driver call.
pub trait Grammar {
    type Engine: GrammarEngine;

    /// Allocate a fresh engine. Failing here aborts the call with no
    /// tokens lexed.
    fn alloc(&self) -> Result<Self::Engine>;

    /// Release an engine. Called exactly once per successful `alloc`, on
    /// every driver exit path.
    fn free(&self, engine: Self::Engine) {
        drop(engine);
    }
}

/// A push-driven parser.
pub trait GrammarEngine {
    /// Accept one significant token.
    ///
    /// `kind` is the token's kind, except for the synthesized sentinels
    /// where `token` is zero-length at the end of input. The engine reports
    /// completion and failure through `ctx`.
    fn feed<'src>(&mut self, kind: TokenKind, token: Token<'src>, ctx: &mut ParseContext<'src>);
}
