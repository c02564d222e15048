//! Pratt expression parser.
//!
//! Precedence, lowest to highest:
//!   OR
//!   AND
//!   NOT (prefix)
//!   = == != <> IS [NOT] MATCH LIKE GLOB REGEXP BETWEEN IN ISNULL NOTNULL
//!   < <= > >=
//!   & | << >>
//!   + -
//!   * / %
//!   ||
//!   COLLATE (postfix)
//!   ~ - + (prefix)

use sqlfront_ast::{
    BinaryOp, ColumnRef, Expr, FunctionArgs, InSet, LikeOp, Literal, RaiseAction, Span, TypeName,
    UnaryOp, Variable,
};
use sqlfront_error::{FrontendError, Result};

use crate::context::VarList;
use crate::token::TokenKind;

use super::Tok;
use super::cursor::{
    Builder, IntegerValue, decode_blob, decode_integer, unquote_identifier, unquote_string,
};

mod bp {
    pub const OR: (u8, u8) = (1, 2);
    pub const AND: (u8, u8) = (3, 4);
    pub const NOT_PREFIX: u8 = 5;
    pub const EQUALITY: (u8, u8) = (7, 8);
    pub const COMPARISON: (u8, u8) = (9, 10);
    pub const BITWISE: (u8, u8) = (13, 14);
    pub const ADD: (u8, u8) = (15, 16);
    pub const MUL: (u8, u8) = (17, 18);
    pub const CONCAT: (u8, u8) = (19, 20);
    pub const COLLATE: u8 = 21;
    pub const UNARY: u8 = 23;
}

fn is_like_kw(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::KwLike | TokenKind::KwGlob | TokenKind::KwMatch | TokenKind::KwRegexp
    )
}

fn like_op(kind: TokenKind) -> LikeOp {
    match kind {
        TokenKind::KwGlob => LikeOp::Glob,
        TokenKind::KwMatch => LikeOp::Match,
        TokenKind::KwRegexp => LikeOp::Regexp,
        _ => LikeOp::Like,
    }
}

fn starts_select(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::KwSelect | TokenKind::KwValues | TokenKind::KwWith
    )
}

impl Builder<'_, '_> {
    pub(super) fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(0)
    }

    // === Pratt core ===

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        self.descend()?;
        let result = self.parse_expr_bp_inner(min_bp);
        self.ascend();
        result
    }

    fn parse_expr_bp_inner(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_prefix()?;
        loop {
            if let Some(l_bp) = self.postfix_bp() {
                if l_bp < min_bp {
                    break;
                }
                lhs = self.parse_postfix(lhs)?;
                continue;
            }
            if let Some((l_bp, r_bp)) = self.infix_bp() {
                if l_bp < min_bp {
                    break;
                }
                lhs = self.parse_infix(lhs, r_bp)?;
                continue;
            }
            break;
        }
        Ok(lhs)
    }

    // === Prefix ===

    #[allow(clippy::too_many_lines)]
    pub(super) fn parse_prefix(&mut self) -> Result<Expr> {
        let tok = self.current();
        let span = Self::span(tok);
        let literal = |lit| Ok(Expr::Literal(lit, span));
        match tok.kind {
            TokenKind::Integer => {
                self.advance();
                match decode_integer(&self.text_str(tok))? {
                    IntegerValue::Int(v) => literal(Literal::Integer(v)),
                    IntegerValue::Float(v) => literal(Literal::Float(v)),
                }
            }
            TokenKind::Float => {
                self.advance();
                let text = self.text_str(tok);
                let value = text
                    .parse::<f64>()
                    .map_err(|_| FrontendError::syntax(text.to_string()))?;
                literal(Literal::Float(value))
            }
            TokenKind::String => {
                self.advance();
                literal(Literal::String(unquote_string(self.text(tok))))
            }
            TokenKind::Blob => {
                self.advance();
                let bytes = decode_blob(self.text(tok))
                    .ok_or_else(|| FrontendError::syntax(self.text_str(tok)))?;
                literal(Literal::Blob(bytes))
            }
            TokenKind::KwNull => {
                self.advance();
                literal(Literal::Null)
            }
            TokenKind::KwTrue => {
                self.advance();
                literal(Literal::True)
            }
            TokenKind::KwFalse => {
                self.advance();
                literal(Literal::False)
            }
            TokenKind::KwCurrentTime => {
                self.advance();
                literal(Literal::CurrentTime)
            }
            TokenKind::KwCurrentDate => {
                self.advance();
                literal(Literal::CurrentDate)
            }
            TokenKind::KwCurrentTimestamp => {
                self.advance();
                literal(Literal::CurrentTimestamp)
            }
            TokenKind::Variable => {
                self.advance();
                self.parse_variable(tok)
            }
            TokenKind::Minus | TokenKind::Plus | TokenKind::BitNot => {
                self.advance();
                let op = match tok.kind {
                    TokenKind::Minus => UnaryOp::Negate,
                    TokenKind::Plus => UnaryOp::Plus,
                    _ => UnaryOp::BitNot,
                };
                let inner = self.parse_expr_bp(bp::UNARY)?;
                let span = span.merge(inner.span());
                Ok(Expr::UnaryOp {
                    op,
                    expr: Box::new(inner),
                    span,
                })
            }
            TokenKind::KwNot => {
                self.advance();
                if self.eat(TokenKind::KwExists) {
                    return self.parse_exists(span, true);
                }
                let inner = self.parse_expr_bp(bp::NOT_PREFIX)?;
                let span = span.merge(inner.span());
                Ok(Expr::UnaryOp {
                    op: UnaryOp::Not,
                    expr: Box::new(inner),
                    span,
                })
            }
            TokenKind::KwExists => {
                self.advance();
                self.parse_exists(span, false)
            }
            TokenKind::KwCast if self.peek_at(1) == TokenKind::Lp => {
                self.advance();
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::KwAs)?;
                let type_name = self.parse_type_name()?;
                let end = self.expect(TokenKind::Rp)?;
                Ok(Expr::Cast {
                    expr: Box::new(inner),
                    type_name,
                    span: span.merge(Self::span(end)),
                })
            }
            TokenKind::KwCase => {
                self.advance();
                self.parse_case(span)
            }
            TokenKind::KwRaise if self.peek_at(1) == TokenKind::Lp => {
                self.advance();
                self.advance();
                self.parse_raise(span)
            }
            TokenKind::Lp => {
                self.advance();
                if starts_select(self.peek()) {
                    let query = self.parse_select()?;
                    let end = self.expect(TokenKind::Rp)?;
                    return Ok(Expr::Subquery(Box::new(query), span.merge(Self::span(end))));
                }
                let first = self.parse_expr()?;
                if !self.eat(TokenKind::Comma) {
                    self.expect(TokenKind::Rp)?;
                    return Ok(first);
                }
                let mut items = vec![first, self.parse_expr()?];
                while self.eat(TokenKind::Comma) {
                    items.push(self.parse_expr()?);
                }
                let end = self.expect(TokenKind::Rp)?;
                Ok(Expr::RowValue(items, span.merge(Self::span(end))))
            }
            TokenKind::Id => {
                self.advance();
                self.parse_ident_expr(unquote_identifier(self.text(tok)), span)
            }
            TokenKind::KwReplace if self.peek_at(1) == TokenKind::Lp => {
                self.advance();
                self.parse_function_call(self.text_str(tok).into_owned(), span)
            }
            kind if kind.is_keyword() && !tok.reserved => {
                self.advance();
                self.parse_ident_expr(self.text_str(tok).into_owned(), span)
            }
            _ => Err(self.error_here()),
        }
    }

    fn parse_variable(&mut self, tok: Tok) -> Result<Expr> {
        let text = self.text_str(tok);
        let max = self.ctx.limits().max_variable_number;
        let vlist = self.ctx.vlist.get_or_insert_with(VarList::new);
        let (index, name) = if text == "?" {
            (vlist.next_anonymous(), None)
        } else if let Some(digits) = text.strip_prefix('?') {
            let n = digits
                .parse::<u32>()
                .ok()
                .filter(|n| (1..=max).contains(n))
                .ok_or(FrontendError::VariableNumber { max })?;
            (vlist.bind_numbered(n), None)
        } else {
            (vlist.bind_named(&text), Some(text.into_owned()))
        };
        if index > max {
            return Err(FrontendError::VariableNumber { max });
        }
        Ok(Expr::Variable(Variable { index, name }, Self::span(tok)))
    }

    /// `name`, `name.column`, or `name(args)`.
    fn parse_ident_expr(&mut self, name: String, start: Span) -> Result<Expr> {
        if self.at(TokenKind::Lp) {
            return self.parse_function_call(name, start);
        }
        if self.eat(TokenKind::Dot) {
            let col = self.current();
            let column = self.name()?;
            return Ok(Expr::Column(
                ColumnRef::qualified(name, column),
                start.merge(Self::span(col)),
            ));
        }
        Ok(Expr::Column(ColumnRef::bare(name), start))
    }

    fn parse_function_call(&mut self, name: String, start: Span) -> Result<Expr> {
        self.expect(TokenKind::Lp)?;
        let (args, distinct) = if self.eat(TokenKind::Star) {
            (FunctionArgs::Star, false)
        } else {
            let distinct = self.eat(TokenKind::KwDistinct);
            if !distinct {
                self.eat(TokenKind::KwAll);
            }
            let mut list = Vec::new();
            if !self.at(TokenKind::Rp) {
                list.push(self.parse_expr()?);
                while self.eat(TokenKind::Comma) {
                    list.push(self.parse_expr()?);
                }
            }
            (FunctionArgs::List(list), distinct)
        };
        let end = self.expect(TokenKind::Rp)?;
        Ok(Expr::FunctionCall {
            name,
            args,
            distinct,
            span: start.merge(Self::span(end)),
        })
    }

    /// After `[NOT] EXISTS`.
    fn parse_exists(&mut self, start: Span, not: bool) -> Result<Expr> {
        self.expect(TokenKind::Lp)?;
        let query = self.parse_select()?;
        let end = self.expect(TokenKind::Rp)?;
        Ok(Expr::Exists {
            subquery: Box::new(query),
            not,
            span: start.merge(Self::span(end)),
        })
    }

    /// After `CASE`.
    fn parse_case(&mut self, start: Span) -> Result<Expr> {
        let operand = if self.at(TokenKind::KwWhen) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let mut whens = Vec::new();
        while self.eat(TokenKind::KwWhen) {
            let condition = self.parse_expr()?;
            self.expect(TokenKind::KwThen)?;
            whens.push((condition, self.parse_expr()?));
        }
        if whens.is_empty() {
            return Err(self.error_here());
        }
        let else_expr = if self.eat(TokenKind::KwElse) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        let end = self.expect(TokenKind::KwEnd)?;
        Ok(Expr::Case {
            operand,
            whens,
            else_expr,
            span: start.merge(Self::span(end)),
        })
    }

    /// After `RAISE (`.
    fn parse_raise(&mut self, start: Span) -> Result<Expr> {
        let action = match self.peek() {
            TokenKind::KwIgnore => RaiseAction::Ignore,
            TokenKind::KwRollback => RaiseAction::Rollback,
            TokenKind::KwAbort => RaiseAction::Abort,
            TokenKind::KwFail => RaiseAction::Fail,
            _ => return Err(self.error_here()),
        };
        self.advance();
        let message = if action == RaiseAction::Ignore {
            None
        } else {
            self.expect(TokenKind::Comma)?;
            let tok = self.expect(TokenKind::String)?;
            Some(unquote_string(self.text(tok)))
        };
        let end = self.expect(TokenKind::Rp)?;
        Ok(Expr::Raise {
            action,
            message,
            span: start.merge(Self::span(end)),
        })
    }

    /// `name [name ...] [( signed-number [, signed-number] )]`
    pub(super) fn parse_type_name(&mut self) -> Result<TypeName> {
        let first = self.expect(TokenKind::Id)?;
        let mut words = vec![unquote_identifier(self.text(first))];
        while self.at(TokenKind::Id) {
            let tok = self.advance();
            words.push(unquote_identifier(self.text(tok)));
        }
        let mut type_name = TypeName::plain(words.join(" "));
        if self.eat(TokenKind::Lp) {
            type_name.arg1 = Some(self.signed_number()?);
            if self.eat(TokenKind::Comma) {
                type_name.arg2 = Some(self.signed_number()?);
            }
            self.expect(TokenKind::Rp)?;
        }
        Ok(type_name)
    }

    fn signed_number(&mut self) -> Result<String> {
        let mut text = String::new();
        if matches!(self.peek(), TokenKind::Plus | TokenKind::Minus) {
            let sign = self.advance();
            text.push_str(&self.text_str(sign));
        }
        match self.peek() {
            TokenKind::Integer | TokenKind::Float => {
                let tok = self.advance();
                text.push_str(&self.text_str(tok));
                Ok(text)
            }
            _ => Err(self.error_here()),
        }
    }

    // === Postfix ===

    fn postfix_bp(&self) -> Option<u8> {
        match self.peek() {
            TokenKind::KwCollate => Some(bp::COLLATE),
            TokenKind::KwIsnull | TokenKind::KwNotnull => Some(bp::EQUALITY.0),
            _ => None,
        }
    }

    fn parse_postfix(&mut self, lhs: Expr) -> Result<Expr> {
        let tok = self.advance();
        if tok.kind == TokenKind::KwCollate {
            let name_tok = self.current();
            let collation = self.name()?;
            let span = lhs.span().merge(Self::span(name_tok));
            return Ok(Expr::Collate {
                expr: Box::new(lhs),
                collation,
                span,
            });
        }
        let span = lhs.span().merge(Self::span(tok));
        Ok(Expr::IsNull {
            expr: Box::new(lhs),
            not: tok.kind == TokenKind::KwNotnull,
            span,
        })
    }

    // === Infix ===

    fn infix_bp(&self) -> Option<(u8, u8)> {
        match self.peek() {
            TokenKind::KwOr => Some(bp::OR),
            TokenKind::KwAnd => Some(bp::AND),
            TokenKind::Eq
            | TokenKind::Ne
            | TokenKind::KwIs
            | TokenKind::KwBetween
            | TokenKind::KwIn => Some(bp::EQUALITY),
            kind if is_like_kw(kind) => Some(bp::EQUALITY),
            TokenKind::KwNot => {
                let next = self.peek_at(1);
                (is_like_kw(next)
                    || matches!(
                        next,
                        TokenKind::KwBetween | TokenKind::KwIn | TokenKind::KwNull
                    ))
                .then_some(bp::EQUALITY)
            }
            TokenKind::Lt | TokenKind::Le | TokenKind::Gt | TokenKind::Ge => Some(bp::COMPARISON),
            TokenKind::BitAnd | TokenKind::BitOr | TokenKind::LShift | TokenKind::RShift => {
                Some(bp::BITWISE)
            }
            TokenKind::Plus | TokenKind::Minus => Some(bp::ADD),
            TokenKind::Star | TokenKind::Slash | TokenKind::Rem => Some(bp::MUL),
            TokenKind::Concat => Some(bp::CONCAT),
            _ => None,
        }
    }

    fn parse_infix(&mut self, lhs: Expr, r_bp: u8) -> Result<Expr> {
        let tok = self.advance();
        let op = match tok.kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Subtract,
            TokenKind::Star => BinaryOp::Multiply,
            TokenKind::Slash => BinaryOp::Divide,
            TokenKind::Rem => BinaryOp::Modulo,
            TokenKind::Concat => BinaryOp::Concat,
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::Ne => BinaryOp::Ne,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Le => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Ge => BinaryOp::Ge,
            TokenKind::BitAnd => BinaryOp::BitAnd,
            TokenKind::BitOr => BinaryOp::BitOr,
            TokenKind::LShift => BinaryOp::ShiftLeft,
            TokenKind::RShift => BinaryOp::ShiftRight,
            TokenKind::KwOr => BinaryOp::Or,
            TokenKind::KwAnd => BinaryOp::And,
            TokenKind::KwIs => {
                let not = self.eat(TokenKind::KwNot);
                if self.at(TokenKind::KwNull) {
                    let end = self.advance();
                    let span = lhs.span().merge(Self::span(end));
                    return Ok(Expr::IsNull {
                        expr: Box::new(lhs),
                        not,
                        span,
                    });
                }
                if not { BinaryOp::IsNot } else { BinaryOp::Is }
            }
            TokenKind::KwBetween => return self.parse_between(lhs, false),
            TokenKind::KwIn => return self.parse_in(lhs, false),
            TokenKind::KwNot => {
                let next = self.advance();
                return match next.kind {
                    TokenKind::KwBetween => self.parse_between(lhs, true),
                    TokenKind::KwIn => self.parse_in(lhs, true),
                    TokenKind::KwNull => {
                        let span = lhs.span().merge(Self::span(next));
                        Ok(Expr::IsNull {
                            expr: Box::new(lhs),
                            not: true,
                            span,
                        })
                    }
                    kind => self.parse_like(lhs, like_op(kind), true),
                };
            }
            kind => return self.parse_like(lhs, like_op(kind), false),
        };
        let rhs = self.parse_expr_bp(r_bp)?;
        let span = lhs.span().merge(rhs.span());
        Ok(Expr::BinaryOp {
            left: Box::new(lhs),
            op,
            right: Box::new(rhs),
            span,
        })
    }

    fn parse_like(&mut self, lhs: Expr, op: LikeOp, not: bool) -> Result<Expr> {
        let pattern = self.parse_expr_bp(bp::EQUALITY.1)?;
        let escape = if self.eat(TokenKind::KwEscape) {
            Some(Box::new(self.parse_expr_bp(bp::EQUALITY.1)?))
        } else {
            None
        };
        let end = escape.as_ref().map_or_else(|| pattern.span(), |e| e.span());
        let span = lhs.span().merge(end);
        Ok(Expr::Like {
            expr: Box::new(lhs),
            pattern: Box::new(pattern),
            escape,
            op,
            not,
            span,
        })
    }

    fn parse_between(&mut self, lhs: Expr, not: bool) -> Result<Expr> {
        // The low bound binds above AND so the separator is not consumed.
        let low = self.parse_expr_bp(bp::NOT_PREFIX)?;
        self.expect(TokenKind::KwAnd)?;
        let high = self.parse_expr_bp(bp::NOT_PREFIX)?;
        let span = lhs.span().merge(high.span());
        Ok(Expr::Between {
            expr: Box::new(lhs),
            low: Box::new(low),
            high: Box::new(high),
            not,
            span,
        })
    }

    fn parse_in(&mut self, lhs: Expr, not: bool) -> Result<Expr> {
        self.expect(TokenKind::Lp)?;
        let set = if starts_select(self.peek()) {
            InSet::Subquery(Box::new(self.parse_select()?))
        } else {
            let mut items = Vec::new();
            if !self.at(TokenKind::Rp) {
                items.push(self.parse_expr()?);
                while self.eat(TokenKind::Comma) {
                    items.push(self.parse_expr()?);
                }
            }
            InSet::List(items)
        };
        let end = self.expect(TokenKind::Rp)?;
        let span = lhs.span().merge(Self::span(end));
        Ok(Expr::In {
            expr: Box::new(lhs),
            set,
            not,
            span,
        })
    }
}
