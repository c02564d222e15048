//! SQL abstract syntax tree node types.
//!
//! Every statement the bundled grammar engine builds is a tree of these
//! nodes. Expression nodes carry a [`Span`] into the original source so
//! diagnostics can quote the exact bytes the user wrote.

mod display;

use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Span
// ---------------------------------------------------------------------------

/// A byte-offset range into the original SQL source text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    /// Byte offset of the first byte (inclusive).
    pub start: u32,
    /// Byte offset one past the last byte (exclusive).
    pub end: u32,
}

impl Span {
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// A zero-length span at position 0, used as a placeholder.
    pub const ZERO: Self = Self { start: 0, end: 0 };

    /// Build a span from `usize` offsets, saturating at `u32::MAX`.
    #[must_use]
    pub fn from_offsets(start: usize, end: usize) -> Self {
        let clamp = |v: usize| u32::try_from(v).unwrap_or(u32::MAX);
        Self::new(clamp(start), clamp(end))
    }

    /// Merge two spans into one that covers both.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    #[must_use]
    pub const fn len(self) -> u32 {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// The bytes of `source` this span covers, or an empty slice if the
    /// span does not fit.
    #[must_use]
    pub fn slice(self, source: &[u8]) -> &[u8] {
        source
            .get(self.start as usize..self.end as usize)
            .unwrap_or_default()
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Top-level statement
// ---------------------------------------------------------------------------

/// A single parsed SQL statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    // DML
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),

    // DDL
    CreateTable(TableDef),
    CreateTrigger(TriggerDef),
    Drop(DropStatement),

    // Transaction control
    Begin,
    Commit,
    Rollback { savepoint: Option<String> },
    Savepoint(String),
    Release(String),

    // Meta
    Pragma(PragmaStatement),
    Explain { query_plan: bool, stmt: Box<Self> },
}

impl Statement {
    /// Short upper-case label used in logs.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Select(_) => "SELECT",
            Self::Insert(_) => "INSERT",
            Self::Update(_) => "UPDATE",
            Self::Delete(_) => "DELETE",
            Self::CreateTable(_) => "CREATE TABLE",
            Self::CreateTrigger(_) => "CREATE TRIGGER",
            Self::Drop(_) => "DROP",
            Self::Begin => "BEGIN",
            Self::Commit => "COMMIT",
            Self::Rollback { .. } => "ROLLBACK",
            Self::Savepoint(_) => "SAVEPOINT",
            Self::Release(_) => "RELEASE",
            Self::Pragma(_) => "PRAGMA",
            Self::Explain { .. } => "EXPLAIN",
        }
    }
}

// ---------------------------------------------------------------------------
// Literals, names, operators
// ---------------------------------------------------------------------------

/// A column type name as written in DDL (e.g. `VARCHAR(255)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeName {
    pub name: String,
    pub arg1: Option<String>,
    pub arg2: Option<String>,
}

impl TypeName {
    #[must_use]
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg1: None,
            arg2: None,
        }
    }
}

/// A literal value in SQL source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    /// Single-quoted string with `''` already collapsed.
    String(String),
    /// `X'...'`, hex-decoded.
    Blob(Vec<u8>),
    Null,
    True,
    False,
    CurrentTime,
    CurrentDate,
    CurrentTimestamp,
}

/// A reference to a column, possibly qualified with a table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    #[must_use]
    pub fn bare(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    #[must_use]
    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Is,
    IsNot,
    And,
    Or,
    BitAnd,
    BitOr,
    ShiftLeft,
    ShiftRight,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Concat => "||",
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
        })
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Negate,
    Plus,
    BitNot,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Negate => "-",
            Self::Plus => "+",
            Self::BitNot => "~",
            Self::Not => "NOT ",
        })
    }
}

/// Pattern-matching operator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LikeOp {
    Like,
    Glob,
    Match,
    Regexp,
}

impl LikeOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "LIKE",
            Self::Glob => "GLOB",
            Self::Match => "MATCH",
            Self::Regexp => "REGEXP",
        }
    }
}

/// A bind parameter after index assignment.
///
/// `?` takes the next free index, `?NNN` names its index, and repeated
/// named variables share the index of their first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Variable {
    /// 1-based bind index.
    pub index: u32,
    /// The full token text for named variables (`:a`, `@a`, `$a`, `#a`)
    /// and for `?NNN`; `None` for a bare `?`.
    pub name: Option<String>,
}

/// RAISE action inside trigger bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RaiseAction {
    Ignore,
    Rollback,
    Abort,
    Fail,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// An expression node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(Literal, Span),

    Column(ColumnRef, Span),

    BinaryOp {
        left: Box<Self>,
        op: BinaryOp,
        right: Box<Self>,
        span: Span,
    },

    UnaryOp {
        op: UnaryOp,
        expr: Box<Self>,
        span: Span,
    },

    /// `expr [NOT] BETWEEN low AND high`.
    Between {
        expr: Box<Self>,
        low: Box<Self>,
        high: Box<Self>,
        not: bool,
        span: Span,
    },

    /// `expr [NOT] IN (...)`.
    In {
        expr: Box<Self>,
        set: InSet,
        not: bool,
        span: Span,
    },

    /// `expr [NOT] LIKE/GLOB/MATCH/REGEXP pattern [ESCAPE escape]`.
    Like {
        expr: Box<Self>,
        pattern: Box<Self>,
        escape: Option<Box<Self>>,
        op: LikeOp,
        not: bool,
        span: Span,
    },

    Case {
        operand: Option<Box<Self>>,
        whens: Vec<(Self, Self)>,
        else_expr: Option<Box<Self>>,
        span: Span,
    },

    Cast {
        expr: Box<Self>,
        type_name: TypeName,
        span: Span,
    },

    Exists {
        subquery: Box<SelectStatement>,
        not: bool,
        span: Span,
    },

    Subquery(Box<SelectStatement>, Span),

    FunctionCall {
        name: String,
        args: FunctionArgs,
        distinct: bool,
        span: Span,
    },

    Collate {
        expr: Box<Self>,
        collation: String,
        span: Span,
    },

    /// `expr IS [NOT] NULL` / `expr ISNULL` / `expr NOTNULL`.
    IsNull {
        expr: Box<Self>,
        not: bool,
        span: Span,
    },

    Raise {
        action: RaiseAction,
        message: Option<String>,
        span: Span,
    },

    /// `(a, b, c)`.
    RowValue(Vec<Self>, Span),

    Variable(Variable, Span),
}

impl Expr {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Literal(_, s)
            | Self::Column(_, s)
            | Self::Subquery(_, s)
            | Self::RowValue(_, s)
            | Self::Variable(_, s) => *s,
            Self::BinaryOp { span, .. }
            | Self::UnaryOp { span, .. }
            | Self::Between { span, .. }
            | Self::In { span, .. }
            | Self::Like { span, .. }
            | Self::Case { span, .. }
            | Self::Cast { span, .. }
            | Self::Exists { span, .. }
            | Self::FunctionCall { span, .. }
            | Self::Collate { span, .. }
            | Self::IsNull { span, .. }
            | Self::Raise { span, .. } => *span,
        }
    }
}

/// Right-hand side of `IN`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InSet {
    List(Vec<Expr>),
    Subquery(Box<SelectStatement>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FunctionArgs {
    /// `count(*)`.
    Star,
    List(Vec<Expr>),
}

// ---------------------------------------------------------------------------
// SELECT
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectStatement {
    pub with: Option<WithClause>,
    pub body: SelectBody,
    pub order_by: Vec<OrderingTerm>,
    pub limit: Option<LimitClause>,
}

impl SelectStatement {
    /// The lone result expression of `SELECT <expr>` with no other clauses.
    #[must_use]
    pub fn single_expression(&self) -> Option<&Expr> {
        if self.with.is_some()
            || !self.body.compounds.is_empty()
            || !self.order_by.is_empty()
            || self.limit.is_some()
        {
            return None;
        }
        match &self.body.select {
            SelectCore::Select {
                distinct: Distinctness::All,
                columns,
                from: None,
                where_clause: None,
                group_by,
                having: None,
            } if group_by.is_empty() => match columns.as_slice() {
                [ResultColumn::Expr { expr, alias: None }] => Some(expr),
                _ => None,
            },
            _ => None,
        }
    }
}

/// `WITH [RECURSIVE] cte, ...`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithClause {
    pub recursive: bool,
    pub ctes: Vec<Cte>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cte {
    pub name: String,
    pub columns: Vec<String>,
    pub query: SelectStatement,
}

/// One or more SELECT cores connected by compound operators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectBody {
    pub select: SelectCore,
    pub compounds: Vec<(CompoundOp, SelectCore)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompoundOp {
    Union,
    UnionAll,
    Intersect,
    Except,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SelectCore {
    Select {
        distinct: Distinctness,
        columns: Vec<ResultColumn>,
        from: Option<FromClause>,
        where_clause: Option<Box<Expr>>,
        group_by: Vec<Expr>,
        having: Option<Box<Expr>>,
    },
    Values(Vec<Vec<Expr>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Distinctness {
    #[default]
    All,
    Distinct,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ResultColumn {
    Star,
    TableStar(String),
    Expr { expr: Expr, alias: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FromClause {
    pub source: TableOrSubquery,
    pub joins: Vec<JoinClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TableOrSubquery {
    Table {
        name: String,
        alias: Option<String>,
    },
    Subquery {
        query: Box<SelectStatement>,
        alias: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: TableOrSubquery,
    pub constraint: Option<JoinConstraint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct JoinType {
    pub natural: bool,
    pub kind: JoinKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum JoinKind {
    /// `,` or `CROSS JOIN`.
    Cross,
    Inner,
    Left,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderingTerm {
    pub expr: Expr,
    pub direction: Option<SortDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// `LIMIT expr [OFFSET expr]` or `LIMIT offset, limit`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitClause {
    pub limit: Expr,
    pub offset: Option<Expr>,
}

// ---------------------------------------------------------------------------
// INSERT / UPDATE / DELETE
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertStatement {
    pub with: Option<WithClause>,
    /// `INSERT OR <action>`; plain `REPLACE INTO` is `Some(Replace)`.
    pub or_conflict: Option<ConflictAction>,
    pub table: String,
    pub columns: Vec<String>,
    pub source: InsertSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InsertSource {
    Values(Vec<Vec<Expr>>),
    Select(Box<SelectStatement>),
    DefaultValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConflictAction {
    Rollback,
    Abort,
    Fail,
    Ignore,
    Replace,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateStatement {
    pub with: Option<WithClause>,
    pub or_conflict: Option<ConflictAction>,
    pub table: String,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Expr>,
}

/// `column = expr` or `(a, b) = expr`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub columns: Vec<String>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteStatement {
    pub with: Option<WithClause>,
    pub table: String,
    pub where_clause: Option<Expr>,
}

// ---------------------------------------------------------------------------
// DDL
// ---------------------------------------------------------------------------

/// A relation definition: the body of `CREATE TABLE`, and the shape of
/// ephemeral relations registered for FROM-clause subqueries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDef {
    pub if_not_exists: bool,
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
}

impl TableDef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            if_not_exists: false,
            name: name.into(),
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDef {
    pub name: String,
    pub type_name: Option<TypeName>,
    pub constraints: Vec<ColumnConstraint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnConstraint {
    /// `CONSTRAINT name` prefix.
    pub name: Option<String>,
    pub kind: ColumnConstraintKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ColumnConstraintKind {
    PrimaryKey {
        direction: Option<SortDirection>,
        autoincrement: bool,
    },
    NotNull,
    Null,
    Unique,
    Default(Expr),
    Check(Expr),
    Collate(String),
    References(ForeignKeyClause),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableConstraint {
    pub name: Option<String>,
    pub kind: TableConstraintKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TableConstraintKind {
    PrimaryKey(Vec<IndexedColumn>),
    Unique(Vec<IndexedColumn>),
    Check(Expr),
    ForeignKey {
        columns: Vec<String>,
        clause: ForeignKeyClause,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedColumn {
    pub name: String,
    pub collation: Option<String>,
    pub direction: Option<SortDirection>,
}

/// `REFERENCES table [(cols)] [ON DELETE|UPDATE action]...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyClause {
    pub table: String,
    pub columns: Vec<String>,
    pub actions: Vec<ForeignKeyAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ForeignKeyAction {
    pub trigger: ForeignKeyTrigger,
    pub action: ForeignKeyActionType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ForeignKeyTrigger {
    OnDelete,
    OnUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ForeignKeyActionType {
    SetNull,
    SetDefault,
    Cascade,
    Restrict,
    NoAction,
}

/// A trigger definition: the body of `CREATE TRIGGER`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerDef {
    pub if_not_exists: bool,
    pub name: String,
    pub timing: TriggerTiming,
    pub event: TriggerEvent,
    pub table: String,
    pub for_each_row: bool,
    pub when: Option<Expr>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TriggerTiming {
    Before,
    After,
    InsteadOf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TriggerEvent {
    Insert,
    Delete,
    /// `UPDATE [OF col, ...]`.
    Update(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropStatement {
    pub object_type: DropObjectType,
    pub if_exists: bool,
    pub name: String,
    /// `DROP INDEX name ON table`.
    pub table: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DropObjectType {
    Table,
    View,
    Index,
    Trigger,
}

// ---------------------------------------------------------------------------
// PRAGMA
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PragmaStatement {
    pub name: String,
    pub value: Option<PragmaValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PragmaValue {
    /// `PRAGMA name = value`.
    Assign(Expr),
    /// `PRAGMA name(value)`.
    Call(Expr),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> Expr {
        Expr::Literal(Literal::Integer(v), Span::ZERO)
    }

    #[test]
    fn span_merge_and_len() {
        let a = Span::new(3, 7);
        let b = Span::new(5, 12);
        assert_eq!(a.merge(b), Span::new(3, 12));
        assert_eq!(b.merge(a), Span::new(3, 12));
        assert_eq!(a.len(), 4);
        assert!(Span::ZERO.is_empty());
        assert_eq!(format!("{a:?}"), "3..7");
    }

    #[test]
    fn span_slice_is_bounds_checked() {
        let src = b"SELECT 1";
        assert_eq!(Span::new(0, 6).slice(src), b"SELECT");
        assert_eq!(Span::new(7, 99).slice(src), b"");
    }

    #[test]
    fn span_from_offsets_saturates() {
        let span = Span::from_offsets(1, usize::MAX);
        assert_eq!(span.start, 1);
        assert_eq!(span.end, u32::MAX);
    }

    #[test]
    fn expr_span_for_every_shape() {
        let span = Span::new(2, 9);
        let e = Expr::BinaryOp {
            left: Box::new(int(1)),
            op: BinaryOp::Add,
            right: Box::new(int(2)),
            span,
        };
        assert_eq!(e.span(), span);
        let v = Expr::Variable(
            Variable {
                index: 1,
                name: None,
            },
            span,
        );
        assert_eq!(v.span(), span);
    }

    fn bare_select(columns: Vec<ResultColumn>) -> SelectStatement {
        SelectStatement {
            with: None,
            body: SelectBody {
                select: SelectCore::Select {
                    distinct: Distinctness::All,
                    columns,
                    from: None,
                    where_clause: None,
                    group_by: Vec::new(),
                    having: None,
                },
                compounds: Vec::new(),
            },
            order_by: Vec::new(),
            limit: None,
        }
    }

    #[test]
    fn single_expression_requires_one_bare_column() {
        let one = bare_select(vec![ResultColumn::Expr {
            expr: int(5),
            alias: None,
        }]);
        assert_eq!(one.single_expression(), Some(&int(5)));

        let two = bare_select(vec![
            ResultColumn::Expr {
                expr: int(1),
                alias: None,
            },
            ResultColumn::Expr {
                expr: int(2),
                alias: None,
            },
        ]);
        assert_eq!(two.single_expression(), None);

        let star = bare_select(vec![ResultColumn::Star]);
        assert_eq!(star.single_expression(), None);

        let mut limited = bare_select(vec![ResultColumn::Expr {
            expr: int(1),
            alias: None,
        }]);
        limited.limit = Some(LimitClause {
            limit: int(1),
            offset: None,
        });
        assert_eq!(limited.single_expression(), None);
    }

    #[test]
    fn statement_kind_names() {
        assert_eq!(Statement::Commit.kind_name(), "COMMIT");
        let drop = Statement::Drop(DropStatement {
            object_type: DropObjectType::Table,
            if_exists: true,
            name: "t".to_owned(),
            table: None,
        });
        assert_eq!(drop.kind_name(), "DROP");
    }

    #[test]
    fn serializes_to_json() {
        let e = Expr::Column(ColumnRef::qualified("t", "a"), Span::new(0, 3));
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["Column"][0]["table"], "t");
        assert_eq!(json["Column"][0]["column"], "a");
        assert_eq!(json["Column"][1]["end"], 3);
    }
}
