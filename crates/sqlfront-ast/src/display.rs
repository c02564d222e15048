//! SQL rendering via `fmt::Display` for expression and SELECT nodes.
//!
//! Compound operands are always parenthesized, so the rendered text shows
//! the tree shape the parser chose, not just the original spelling.

#[allow(clippy::wildcard_imports)]
use crate::*;
use std::fmt;

fn comma_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn needs_quoting(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {
            bytes.any(|b| !(b.is_ascii_alphanumeric() || b == b'_'))
        }
        _ => true,
    }
}

fn write_ident(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if needs_quoting(name) {
        write!(f, "\"{}\"", name.replace('"', "\"\""))
    } else {
        f.write_str(name)
    }
}

const fn is_compound(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::BinaryOp { .. }
            | Expr::UnaryOp { .. }
            | Expr::Between { .. }
            | Expr::In { .. }
            | Expr::Like { .. }
            | Expr::Collate { .. }
            | Expr::IsNull { .. }
    )
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    if is_compound(expr) {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Blob(bytes) => {
                f.write_str("X'")?;
                for b in bytes {
                    write!(f, "{b:02X}")?;
                }
                f.write_str("'")
            }
            Self::Null => f.write_str("NULL"),
            Self::True => f.write_str("TRUE"),
            Self::False => f.write_str("FALSE"),
            Self::CurrentTime => f.write_str("CURRENT_TIME"),
            Self::CurrentDate => f.write_str("CURRENT_DATE"),
            Self::CurrentTimestamp => f.write_str("CURRENT_TIMESTAMP"),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(table) = &self.table {
            write_ident(f, table)?;
            f.write_str(".")?;
        }
        write_ident(f, &self.column)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        match (&self.arg1, &self.arg2) {
            (Some(a), Some(b)) => write!(f, "({a}, {b})"),
            (Some(a), None) => write!(f, "({a})"),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => f.write_str(name),
            None => f.write_str("?"),
        }
    }
}

impl fmt::Display for RaiseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ignore => "IGNORE",
            Self::Rollback => "ROLLBACK",
            Self::Abort => "ABORT",
            Self::Fail => "FAIL",
        })
    }
}

impl fmt::Display for Expr {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit, _) => write!(f, "{lit}"),
            Self::Column(col, _) => write!(f, "{col}"),
            Self::Variable(var, _) => write!(f, "{var}"),
            Self::BinaryOp {
                left, op, right, ..
            } => {
                write_operand(f, left)?;
                write!(f, " {op} ")?;
                write_operand(f, right)
            }
            Self::UnaryOp { op, expr, .. } => {
                write!(f, "{op}")?;
                write_operand(f, expr)
            }
            Self::Between {
                expr,
                low,
                high,
                not,
                ..
            } => {
                write_operand(f, expr)?;
                f.write_str(if *not { " NOT BETWEEN " } else { " BETWEEN " })?;
                write_operand(f, low)?;
                f.write_str(" AND ")?;
                write_operand(f, high)
            }
            Self::In { expr, set, not, .. } => {
                write_operand(f, expr)?;
                f.write_str(if *not { " NOT IN (" } else { " IN (" })?;
                match set {
                    InSet::List(items) => comma_list(f, items)?,
                    InSet::Subquery(q) => write!(f, "{q}")?,
                }
                f.write_str(")")
            }
            Self::Like {
                expr,
                pattern,
                escape,
                op,
                not,
                ..
            } => {
                write_operand(f, expr)?;
                if *not {
                    f.write_str(" NOT")?;
                }
                write!(f, " {} ", op.as_str())?;
                write_operand(f, pattern)?;
                if let Some(esc) = escape {
                    f.write_str(" ESCAPE ")?;
                    write_operand(f, esc)?;
                }
                Ok(())
            }
            Self::Case {
                operand,
                whens,
                else_expr,
                ..
            } => {
                f.write_str("CASE")?;
                if let Some(op) = operand {
                    write!(f, " {op}")?;
                }
                for (when, then) in whens {
                    write!(f, " WHEN {when} THEN {then}")?;
                }
                if let Some(e) = else_expr {
                    write!(f, " ELSE {e}")?;
                }
                f.write_str(" END")
            }
            Self::Cast {
                expr, type_name, ..
            } => write!(f, "CAST({expr} AS {type_name})"),
            Self::Exists { subquery, not, .. } => {
                if *not {
                    f.write_str("NOT ")?;
                }
                write!(f, "EXISTS ({subquery})")
            }
            Self::Subquery(q, _) => write!(f, "({q})"),
            Self::FunctionCall {
                name,
                args,
                distinct,
                ..
            } => {
                write!(f, "{name}(")?;
                if *distinct {
                    f.write_str("DISTINCT ")?;
                }
                match args {
                    FunctionArgs::Star => f.write_str("*")?,
                    FunctionArgs::List(list) => comma_list(f, list)?,
                }
                f.write_str(")")
            }
            Self::Collate {
                expr, collation, ..
            } => {
                write_operand(f, expr)?;
                f.write_str(" COLLATE ")?;
                write_ident(f, collation)
            }
            Self::IsNull { expr, not, .. } => {
                write_operand(f, expr)?;
                f.write_str(if *not { " IS NOT NULL" } else { " IS NULL" })
            }
            Self::Raise {
                action, message, ..
            } => match message {
                Some(msg) => write!(f, "RAISE({action}, '{}')", msg.replace('\'', "''")),
                None => write!(f, "RAISE({action})"),
            },
            Self::RowValue(items, _) => {
                f.write_str("(")?;
                comma_list(f, items)?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for ResultColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Star => f.write_str("*"),
            Self::TableStar(t) => {
                write_ident(f, t)?;
                f.write_str(".*")
            }
            Self::Expr { expr, alias } => {
                write!(f, "{expr}")?;
                if let Some(a) = alias {
                    f.write_str(" AS ")?;
                    write_ident(f, a)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for TableOrSubquery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alias = match self {
            Self::Table { name, alias } => {
                write_ident(f, name)?;
                alias
            }
            Self::Subquery { query, alias } => {
                write!(f, "({query})")?;
                alias
            }
        };
        if let Some(a) = alias {
            f.write_str(" AS ")?;
            write_ident(f, a)?;
        }
        Ok(())
    }
}

impl fmt::Display for FromClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)?;
        for join in &self.joins {
            if join.join_type.natural {
                f.write_str(" NATURAL")?;
            }
            f.write_str(match join.join_type.kind {
                JoinKind::Cross => " CROSS JOIN ",
                JoinKind::Inner => " JOIN ",
                JoinKind::Left => " LEFT JOIN ",
            })?;
            write!(f, "{}", join.table)?;
            match &join.constraint {
                Some(JoinConstraint::On(e)) => write!(f, " ON {e}")?,
                Some(JoinConstraint::Using(cols)) => {
                    f.write_str(" USING (")?;
                    comma_list(f, cols)?;
                    f.write_str(")")?;
                }
                None => {}
            }
        }
        Ok(())
    }
}

impl fmt::Display for SelectCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select {
                distinct,
                columns,
                from,
                where_clause,
                group_by,
                having,
            } => {
                f.write_str("SELECT ")?;
                if *distinct == Distinctness::Distinct {
                    f.write_str("DISTINCT ")?;
                }
                comma_list(f, columns)?;
                if let Some(from) = from {
                    write!(f, " FROM {from}")?;
                }
                if let Some(w) = where_clause {
                    write!(f, " WHERE {w}")?;
                }
                if !group_by.is_empty() {
                    f.write_str(" GROUP BY ")?;
                    comma_list(f, group_by)?;
                }
                if let Some(h) = having {
                    write!(f, " HAVING {h}")?;
                }
                Ok(())
            }
            Self::Values(rows) => {
                f.write_str("VALUES ")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str("(")?;
                    comma_list(f, row)?;
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(with) = &self.with {
            f.write_str(if with.recursive {
                "WITH RECURSIVE "
            } else {
                "WITH "
            })?;
            for (i, cte) in with.ctes.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_ident(f, &cte.name)?;
                if !cte.columns.is_empty() {
                    f.write_str("(")?;
                    comma_list(f, &cte.columns)?;
                    f.write_str(")")?;
                }
                write!(f, " AS ({})", cte.query)?;
            }
            f.write_str(" ")?;
        }
        write!(f, "{}", self.body.select)?;
        for (op, core) in &self.body.compounds {
            f.write_str(match op {
                CompoundOp::Union => " UNION ",
                CompoundOp::UnionAll => " UNION ALL ",
                CompoundOp::Intersect => " INTERSECT ",
                CompoundOp::Except => " EXCEPT ",
            })?;
            write!(f, "{core}")?;
        }
        if !self.order_by.is_empty() {
            f.write_str(" ORDER BY ")?;
            for (i, term) in self.order_by.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", term.expr)?;
                match term.direction {
                    Some(SortDirection::Asc) => f.write_str(" ASC")?,
                    Some(SortDirection::Desc) => f.write_str(" DESC")?,
                    None => {}
                }
            }
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {}", limit.limit)?;
            if let Some(offset) = &limit.offset {
                write!(f, " OFFSET {offset}")?;
            }
        }
        Ok(())
    }
}
