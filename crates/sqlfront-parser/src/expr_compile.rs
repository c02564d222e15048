//! Standalone expression compilation.
//!
//! The expression is wrapped as `SELECT <expr>` in the caller's arena and
//! run through the driver in parse-only mode; the single result column is
//! the compiled expression.

use bumpalo::Bump;
use sqlfront_ast::Expr;
use sqlfront_error::{FrontendError, Result};
use sqlfront_types::{Cx, ParseLimits};
use tracing::debug;

use crate::context::ParseContext;
use crate::driver::{Parser, run_parser};
use crate::engine::Grammar;
use crate::lexer::tokenize;
use crate::token::TokenKind;

const WRAPPER: &str = "SELECT ";

/// Compile `text` as a bare expression.
///
/// The wrapped statement lives in `arena` and is reclaimed when the caller
/// drops or resets it. Every failure is reported as
/// [`FrontendError::ExpressionCompile`] naming `text`.
pub fn compile_expression<G: Grammar>(
    grammar: &G,
    limits: ParseLimits,
    cx: &Cx,
    arena: &Bump,
    text: &str,
) -> Result<Expr> {
    let sql = bumpalo::format!(in arena, "{}{}", WRAPPER, text);
    let sql = sql.into_bump_str();
    debug!(len = text.len(), "compiling expression");

    let mut ctx = ParseContext::new(sql.as_bytes(), limits).parse_only();
    let rc = run_parser(grammar, cx, &mut ctx);
    if rc.is_error() {
        let err = ctx
            .take_error()
            .unwrap_or_else(|| FrontendError::from_code(rc));
        return Err(FrontendError::expression_compile(text, err));
    }

    let rest = &sql.as_bytes()[ctx.tail()..];
    if !is_blank(rest) {
        let trailing = String::from_utf8_lossy(rest).trim().to_owned();
        return Err(FrontendError::expression_compile(
            text,
            FrontendError::syntax(trailing),
        ));
    }
    ctx.take_parsed_expr().ok_or_else(|| {
        FrontendError::expression_compile(text, FrontendError::internal("not a single expression"))
    })
}

/// Whether `rest` holds nothing but whitespace, comments, and `;`.
fn is_blank(rest: &[u8]) -> bool {
    tokenize(rest).all(|tok| matches!(tok.kind, TokenKind::Space | TokenKind::Semi))
}

impl<G: Grammar> Parser<G> {
    /// Compile a bare expression with this parser's grammar and limits.
    pub fn compile_expression(&self, cx: &Cx, arena: &Bump, text: &str) -> Result<Expr> {
        compile_expression(self.grammar(), *self.limits(), cx, arena, text)
    }
}

#[cfg(test)]
mod tests {
    use sqlfront_ast::{BinaryOp, Literal};

    use super::*;

    fn compile(text: &str) -> Result<Expr> {
        let arena = Bump::new();
        Parser::new(ParseLimits::default()).compile_expression(&Cx::new(), &arena, text)
    }

    #[test]
    fn addition_of_literals() {
        let expr = compile("1 + 2").expect("compiles");
        match expr {
            Expr::BinaryOp {
                left, op, right, ..
            } => {
                assert_eq!(op, BinaryOp::Add);
                assert!(matches!(*left, Expr::Literal(Literal::Integer(1), _)));
                assert!(matches!(*right, Expr::Literal(Literal::Integer(2), _)));
            }
            other => panic!("expected addition, got {other:?}"),
        }
    }

    #[test]
    fn lone_operator_fails_naming_text() {
        let err = compile("+").unwrap_err();
        match &err {
            FrontendError::ExpressionCompile { expr, .. } => assert_eq!(expr, "+"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().contains("'+'"));
    }

    #[test]
    fn trailing_statement_is_rejected() {
        let err = compile("1; DROP TABLE t").unwrap_err();
        assert!(matches!(err, FrontendError::ExpressionCompile { .. }));
    }

    #[test]
    fn trailing_semicolon_and_comment_are_fine() {
        assert!(compile("a IS NULL; -- trailing\n").is_ok());
    }

    #[test]
    fn multi_column_select_is_not_an_expression() {
        assert!(compile("1, 2").is_err());
        assert!(compile("x FROM t").is_err());
    }

    #[test]
    fn illegal_token_is_wrapped() {
        let err = compile("1abc").unwrap_err();
        match err {
            FrontendError::ExpressionCompile { source, .. } => {
                assert!(matches!(*source, FrontendError::IllegalToken { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn arena_outlives_call() {
        let arena = Bump::new();
        let parser = Parser::new(ParseLimits::default());
        for text in ["a = 1", "b BETWEEN 1 AND 2", "c IN (1, 2, 3)"] {
            assert!(parser.compile_expression(&Cx::new(), &arena, text).is_ok());
        }
        assert!(arena.allocated_bytes() > 0);
    }
}
