//! Parse driver and the [`Parser`] facade.
//!
//! [`run_parser`] lexes one statement, filters whitespace, forwards the
//! significant tokens to a grammar engine, and on every exit path frees
//! the engine and releases whatever the engine left pending in the
//! context. End of input is closed with synthesized sentinels: a
//! zero-length `Semi` first, then `StreamEnd` once a `Semi` was the last
//! token forwarded.

use std::time::Instant;

use serde::Serialize;
use sqlfront_ast::Statement;
use sqlfront_error::{ErrorCode, FrontendError, Result};
use sqlfront_types::{Cx, ParseLimits};
use tracing::{debug, warn};

use crate::context::{ParseContext, PreparedStatement};
use crate::engine::{Grammar, GrammarEngine};
use crate::grammar::SqlGrammar;
use crate::instrumentation::{
    AbortClass, record_abort, record_parse_duration, record_statement_completed, record_token,
};
use crate::lexer::{Lexer, lex, tokenize};
use crate::token::{Token, TokenKind};

/// Drive `grammar` over the context's source until one statement completes,
/// the input runs out, or the call aborts.
///
/// Returns the final result code. The error (if any) and the tail offset
/// are left in `ctx`.
pub fn run_parser<G: Grammar>(grammar: &G, cx: &Cx, ctx: &mut ParseContext<'_>) -> ErrorCode {
    let started = Instant::now();
    let src = ctx.source();
    let max = ctx.limits().max_sql_length;
    let mut offset = 0usize;

    match grammar.alloc() {
        Ok(mut engine) => {
            let mut last_forwarded: Option<TokenKind> = None;
            loop {
                let token = if offset < src.len() {
                    let lexeme = lex(&src[offset..]);
                    let token = Token {
                        offset,
                        text: &src[offset..offset + lexeme.len],
                        kind: lexeme.kind,
                        is_reserved: lexeme.is_reserved,
                    };
                    record_token(lexeme.kind == TokenKind::Space);
                    offset += lexeme.len;
                    if offset > max {
                        record_abort(AbortClass::TooLong);
                        ctx.set_error(FrontendError::StatementTooLong { length: offset, max });
                        break;
                    }
                    token
                } else {
                    let kind = match last_forwarded {
                        Some(TokenKind::StreamEnd) => break,
                        Some(TokenKind::Semi) => TokenKind::StreamEnd,
                        _ => TokenKind::Semi,
                    };
                    Token {
                        kind,
                        ..Token::empty(offset)
                    }
                };

                match token.kind {
                    TokenKind::Space | TokenKind::Illegal => {
                        if let Err(err) = cx.checkpoint() {
                            record_abort(AbortClass::Interrupted);
                            ctx.set_error(err);
                            break;
                        }
                        if token.kind == TokenKind::Illegal {
                            record_abort(AbortClass::Illegal);
                            ctx.set_error(FrontendError::illegal(token.text, token.offset));
                            break;
                        }
                    }
                    kind => {
                        engine.feed(kind, token, ctx);
                        ctx.set_last_token(token);
                        last_forwarded = Some(kind);
                        if ctx.rc() != ErrorCode::Ok || ctx.is_oom() {
                            if ctx.rc().is_error() || ctx.is_oom() {
                                record_abort(AbortClass::Engine);
                            }
                            break;
                        }
                    }
                }
            }
            grammar.free(engine);
        }
        Err(err) => {
            record_abort(AbortClass::Engine);
            ctx.set_error(err);
        }
    }

    ctx.set_tail(offset);
    if ctx.is_oom() {
        ctx.set_rc(ErrorCode::NoMem);
    }
    ctx.ensure_error_message();
    if let Some(err) = ctx.error().filter(|_| ctx.rc().is_error()) {
        warn!(code = ctx.rc() as i32, offset, error = %err, "statement aborted");
    }
    if ctx.n_err() > 0 {
        ctx.discard_statement();
    }
    ctx.release_pending();

    if ctx.rc() == ErrorCode::Done {
        record_statement_completed();
    }
    record_parse_duration(started.elapsed());
    ctx.rc()
}

/// Outcome of [`Parser::prepare`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prepared {
    /// `None` for input holding only whitespace, comments, or `;`.
    pub statement: Option<PreparedStatement>,
    /// Bytes of input consumed.
    pub tail: usize,
}

/// Driver bound to a grammar and a set of limits.
#[derive(Debug, Clone, Default)]
pub struct Parser<G = SqlGrammar> {
    grammar: G,
    limits: ParseLimits,
}

impl Parser<SqlGrammar> {
    #[must_use]
    pub fn new(limits: ParseLimits) -> Self {
        Self::with_grammar(SqlGrammar, limits)
    }
}

impl<G: Grammar> Parser<G> {
    #[must_use]
    pub const fn with_grammar(grammar: G, limits: ParseLimits) -> Self {
        Self { grammar, limits }
    }

    #[must_use]
    pub const fn limits(&self) -> &ParseLimits {
        &self.limits
    }

    #[must_use]
    pub const fn grammar(&self) -> &G {
        &self.grammar
    }

    /// Parse the first statement of `sql`.
    ///
    /// Offsets and spans in the result are relative to `sql`.
    pub fn prepare(&self, cx: &Cx, sql: &str) -> Result<Prepared> {
        let mut ctx = ParseContext::new(sql.as_bytes(), self.limits);
        let rc = run_parser(&self.grammar, cx, &mut ctx);
        if rc.is_error() {
            return Err(ctx
                .take_error()
                .unwrap_or_else(|| FrontendError::from_code(rc)));
        }
        Ok(Prepared {
            statement: ctx.take_statement(),
            tail: ctx.tail(),
        })
    }

    /// Parse the first statement of `sql` in parse-only mode and return its
    /// syntax tree. Nothing is prepared and the parameter list is released.
    pub fn parse_ast(&self, cx: &Cx, sql: &str) -> Result<Option<Statement>> {
        let mut ctx = ParseContext::new(sql.as_bytes(), self.limits).parse_only();
        let rc = run_parser(&self.grammar, cx, &mut ctx);
        if rc.is_error() {
            return Err(ctx
                .take_error()
                .unwrap_or_else(|| FrontendError::from_code(rc)));
        }
        Ok(ctx.take_parsed_ast())
    }

    /// Prepare every statement in `sql`, each starting where the previous
    /// one ended. Stops at the first failure.
    pub fn parse_all(&self, cx: &Cx, sql: &str) -> Result<Vec<PreparedStatement>> {
        let mut statements = Vec::new();
        let mut rest = sql;
        while !rest.is_empty() {
            let Prepared { statement, tail } = self.prepare(cx, rest)?;
            statements.extend(statement);
            if tail == 0 {
                break;
            }
            rest = rest.get(tail..).unwrap_or_default();
        }
        debug!(statements = statements.len(), "parsed script");
        Ok(statements)
    }

    /// Token stream of `sql`, whitespace included.
    #[must_use]
    pub fn tokenize<'a>(&self, sql: &'a str) -> Lexer<'a> {
        tokenize(sql.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PendingArtifact;

    fn parser() -> Parser {
        Parser::new(ParseLimits::default())
    }

    #[test]
    fn empty_input_prepares_nothing() {
        let prepared = parser().prepare(&Cx::new(), "").expect("empty input");
        assert_eq!(prepared.statement, None);
        assert_eq!(prepared.tail, 0);
    }

    #[test]
    fn tail_points_past_first_statement() {
        let sql = "SELECT 1; SELECT 2";
        let prepared = parser().prepare(&Cx::new(), sql).expect("prepare");
        assert_eq!(prepared.tail, 9);
        assert!(matches!(
            prepared.statement.map(|s| s.stmt),
            Some(Statement::Select(_))
        ));
    }

    #[test]
    fn statement_without_semicolon_is_closed_by_sentinel() {
        let prepared = parser()
            .prepare(&Cx::new(), "DELETE FROM t WHERE a = 1")
            .expect("prepare");
        assert_eq!(prepared.tail, 25);
        assert!(matches!(
            prepared.statement.map(|s| s.stmt),
            Some(Statement::Delete(_))
        ));
    }

    #[test]
    fn illegal_token_is_quoted_in_error() {
        let err = parser().prepare(&Cx::new(), "SELECT 1abc").unwrap_err();
        assert_eq!(err.to_string(), "unrecognized token: \"1abc\"");
        assert_eq!(err.error_code(), ErrorCode::Error);
    }

    #[test]
    fn illegal_token_bytes_are_exact() {
        let src = b"SELECT x'\xff'";
        let mut ctx = ParseContext::new(src, ParseLimits::default());
        assert_eq!(run_parser(&SqlGrammar, &Cx::new(), &mut ctx), ErrorCode::Error);
        match ctx.error() {
            Some(FrontendError::IllegalToken { bytes, offset, .. }) => {
                assert_eq!(bytes.as_slice(), &src[7..]);
                assert_eq!(*offset, 7);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn syntax_error_names_token() {
        let err = parser().prepare(&Cx::new(), "SELECT FROM t").unwrap_err();
        assert!(matches!(err, FrontendError::SyntaxError { ref token } if token == "FROM"));
    }

    #[test]
    fn unfinished_statement_is_incomplete() {
        let err = parser().prepare(&Cx::new(), "SELECT (1").unwrap_err();
        assert!(matches!(err, FrontendError::IncompleteInput));
    }

    #[test]
    fn length_cap_aborts() {
        let limits = ParseLimits::default().with_max_sql_length(10);
        let err = Parser::new(limits)
            .prepare(&Cx::new(), "SELECT 12345678")
            .unwrap_err();
        assert!(matches!(
            err,
            FrontendError::StatementTooLong { length: 15, max: 10 }
        ));
        assert_eq!(err.error_code(), ErrorCode::TooBig);
    }

    #[test]
    fn interrupt_wins_over_illegal_token() {
        let cx = Cx::new();
        cx.cancel();
        let err = parser().prepare(&cx, "SELECT !").unwrap_err();
        assert!(matches!(err, FrontendError::Interrupted));
    }

    #[test]
    fn interrupt_without_whitespace_is_not_observed() {
        let cx = Cx::new();
        cx.cancel();
        let prepared = parser().prepare(&cx, "SELECT(1)").expect("no boundary");
        assert!(prepared.statement.is_some());
    }

    #[test]
    fn parse_all_walks_every_statement() {
        let sql = "BEGIN; ;INSERT INTO t VALUES (1); COMMIT;  -- done\n";
        let stmts = parser().parse_all(&Cx::new(), sql).expect("script");
        assert_eq!(stmts.len(), 3);
        assert!(matches!(stmts[0].stmt, Statement::Begin));
        assert!(matches!(stmts[2].stmt, Statement::Commit));
    }

    #[test]
    fn parse_ast_returns_tree_without_preparing() {
        let stmt = parser()
            .parse_ast(&Cx::new(), "DELETE FROM t WHERE a = ?; SELECT 1")
            .expect("parse");
        assert!(matches!(stmt, Some(Statement::Delete(_))));
        assert_eq!(parser().parse_ast(&Cx::new(), "  ").expect("blank"), None);
        assert!(parser().parse_ast(&Cx::new(), "DELETE t").is_err());
    }

    #[test]
    fn parse_only_mode_keeps_no_prepared_statement() {
        let mut ctx = ParseContext::new(b"DELETE FROM t WHERE a = ?", ParseLimits::default())
            .parse_only();
        assert_eq!(run_parser(&SqlGrammar, &Cx::new(), &mut ctx), ErrorCode::Done);
        assert!(ctx.statement().is_none());
        assert!(matches!(ctx.take_parsed_ast(), Some(Statement::Delete(_))));
        assert_eq!(ctx.released(), &[PendingArtifact::VarList]);
    }

    #[test]
    fn failed_statement_releases_pending_table() {
        let mut ctx = ParseContext::new(
            b"CREATE TABLE t (a INTEGER, b TEXT CHECK (",
            ParseLimits::default(),
        );
        let rc = run_parser(&SqlGrammar, &Cx::new(), &mut ctx);
        assert_eq!(rc, ErrorCode::Error);
        assert!(ctx.statement().is_none());
        assert_eq!(ctx.released(), &[PendingArtifact::NewTable]);
        assert!(ctx.new_table.is_none());
    }

    #[test]
    fn successful_statement_consumes_artifacts() {
        let mut ctx = ParseContext::new(
            b"WITH c AS (SELECT 1) SELECT * FROM c WHERE ? > 0",
            ParseLimits::default(),
        );
        let rc = run_parser(&SqlGrammar, &Cx::new(), &mut ctx);
        assert_eq!(rc, ErrorCode::Done);
        assert!(ctx.released().is_empty());
        let prepared = ctx.take_statement().expect("statement");
        assert_eq!(prepared.parameters.count(), 1);
    }
}
