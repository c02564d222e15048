//! Token kinds and the borrowed token view.

use std::borrow::Cow;

use sqlfront_ast::Span;

/// Token discriminant.
///
/// A closed enumeration: sentinels, literals, identifiers, operators, one
/// variant per keyword, then the two kinds the driver never forwards
/// (`Space`, `Illegal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    // === Sentinels ===
    /// Synthesized once the grammar engine has seen a closing `Semi` at
    /// end of input. Never produced by the lexer for real bytes.
    StreamEnd,
    /// `;`, or the end-of-statement sentinel synthesized at end of input.
    Semi,

    // === Literals ===
    /// Decimal or `0x` hex integer.
    Integer,
    Float,
    /// Single-quoted string, quotes included.
    String,
    /// `x'...'` blob, prefix and quotes included.
    Blob,
    /// `?`, `?NNN`, `:name`, `@name`, `$name`, `#name`.
    Variable,

    /// Unquoted identifier or `"quoted identifier"`.
    Id,

    // === Operators and punctuation ===
    Lp,
    Rp,
    Comma,
    Dot,
    Plus,
    Minus,
    Star,
    Slash,
    Rem,
    /// `=` or `==`.
    Eq,
    /// `<>` or `!=`.
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LShift,
    RShift,
    BitAnd,
    BitOr,
    BitNot,
    Concat,

    // === Keywords (contiguous, `KwAbort..=KwWith`) ===
    KwAbort,
    KwAction,
    KwAdd,
    KwAfter,
    KwAll,
    KwAlter,
    KwAnalyze,
    KwAnd,
    KwAs,
    KwAsc,
    KwAutoincrement,
    KwBefore,
    KwBegin,
    KwBetween,
    KwBy,
    KwCascade,
    KwCase,
    KwCast,
    KwCheck,
    KwCollate,
    KwColumn,
    KwCommit,
    KwConflict,
    KwConstraint,
    KwCreate,
    KwCross,
    KwCurrentDate,
    KwCurrentTime,
    KwCurrentTimestamp,
    KwDefault,
    KwDeferrable,
    KwDeferred,
    KwDelete,
    KwDesc,
    KwDistinct,
    KwDrop,
    KwEach,
    KwElse,
    KwEnd,
    KwEscape,
    KwExcept,
    KwExists,
    KwExplain,
    KwFail,
    KwFalse,
    KwFor,
    KwForeign,
    KwFrom,
    KwFull,
    KwGlob,
    KwGroup,
    KwHaving,
    KwIf,
    KwIgnore,
    KwImmediate,
    KwIn,
    KwIndex,
    KwInitially,
    KwInner,
    KwInsert,
    KwInstead,
    KwIntersect,
    KwInto,
    KwIs,
    KwIsnull,
    KwJoin,
    KwKey,
    KwLeft,
    KwLike,
    KwLimit,
    KwMatch,
    KwNatural,
    KwNo,
    KwNot,
    KwNotnull,
    KwNull,
    KwOf,
    KwOffset,
    KwOn,
    KwOr,
    KwOrder,
    KwOuter,
    KwPlan,
    KwPragma,
    KwPrimary,
    KwQuery,
    KwRaise,
    KwRecursive,
    KwReferences,
    KwRegexp,
    KwRelease,
    KwRename,
    KwReplace,
    KwRestrict,
    KwRight,
    KwRollback,
    KwRow,
    KwSavepoint,
    KwSelect,
    KwSet,
    KwStart,
    KwTable,
    KwThen,
    KwTo,
    KwTransaction,
    KwTrigger,
    KwTrue,
    KwUnion,
    KwUnique,
    KwUpdate,
    KwUsing,
    KwValues,
    KwView,
    KwWhen,
    KwWhere,
    KwWith,
    // === Never forwarded ===
    /// Whitespace or a comment.
    Space,
    /// Bytes no rule accepts.
    Illegal,
}

impl TokenKind {
    #[must_use]
    pub const fn is_keyword(self) -> bool {
        let d = self as u8;
        d >= Self::KwAbort as u8 && d <= Self::KwWith as u8
    }

    /// Display name: the keyword itself, the operator's spelling, or a
    /// lower-case class name for literals.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StreamEnd => "<end>",
            Self::Semi => ";",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Blob => "blob",
            Self::Variable => "variable",
            Self::Id => "identifier",
            Self::Lp => "(",
            Self::Rp => ")",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Rem => "%",
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::LShift => "<<",
            Self::RShift => ">>",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitNot => "~",
            Self::Concat => "||",
            Self::KwAbort => "ABORT",
            Self::KwAction => "ACTION",
            Self::KwAdd => "ADD",
            Self::KwAfter => "AFTER",
            Self::KwAll => "ALL",
            Self::KwAlter => "ALTER",
            Self::KwAnalyze => "ANALYZE",
            Self::KwAnd => "AND",
            Self::KwAs => "AS",
            Self::KwAsc => "ASC",
            Self::KwAutoincrement => "AUTOINCREMENT",
            Self::KwBefore => "BEFORE",
            Self::KwBegin => "BEGIN",
            Self::KwBetween => "BETWEEN",
            Self::KwBy => "BY",
            Self::KwCascade => "CASCADE",
            Self::KwCase => "CASE",
            Self::KwCast => "CAST",
            Self::KwCheck => "CHECK",
            Self::KwCollate => "COLLATE",
            Self::KwColumn => "COLUMN",
            Self::KwCommit => "COMMIT",
            Self::KwConflict => "CONFLICT",
            Self::KwConstraint => "CONSTRAINT",
            Self::KwCreate => "CREATE",
            Self::KwCross => "CROSS",
            Self::KwCurrentDate => "CURRENT_DATE",
            Self::KwCurrentTime => "CURRENT_TIME",
            Self::KwCurrentTimestamp => "CURRENT_TIMESTAMP",
            Self::KwDefault => "DEFAULT",
            Self::KwDeferrable => "DEFERRABLE",
            Self::KwDeferred => "DEFERRED",
            Self::KwDelete => "DELETE",
            Self::KwDesc => "DESC",
            Self::KwDistinct => "DISTINCT",
            Self::KwDrop => "DROP",
            Self::KwEach => "EACH",
            Self::KwElse => "ELSE",
            Self::KwEnd => "END",
            Self::KwEscape => "ESCAPE",
            Self::KwExcept => "EXCEPT",
            Self::KwExists => "EXISTS",
            Self::KwExplain => "EXPLAIN",
            Self::KwFail => "FAIL",
            Self::KwFalse => "FALSE",
            Self::KwFor => "FOR",
            Self::KwForeign => "FOREIGN",
            Self::KwFrom => "FROM",
            Self::KwFull => "FULL",
            Self::KwGlob => "GLOB",
            Self::KwGroup => "GROUP",
            Self::KwHaving => "HAVING",
            Self::KwIf => "IF",
            Self::KwIgnore => "IGNORE",
            Self::KwImmediate => "IMMEDIATE",
            Self::KwIn => "IN",
            Self::KwIndex => "INDEX",
            Self::KwInitially => "INITIALLY",
            Self::KwInner => "INNER",
            Self::KwInsert => "INSERT",
            Self::KwInstead => "INSTEAD",
            Self::KwIntersect => "INTERSECT",
            Self::KwInto => "INTO",
            Self::KwIs => "IS",
            Self::KwIsnull => "ISNULL",
            Self::KwJoin => "JOIN",
            Self::KwKey => "KEY",
            Self::KwLeft => "LEFT",
            Self::KwLike => "LIKE",
            Self::KwLimit => "LIMIT",
            Self::KwMatch => "MATCH",
            Self::KwNatural => "NATURAL",
            Self::KwNo => "NO",
            Self::KwNot => "NOT",
            Self::KwNotnull => "NOTNULL",
            Self::KwNull => "NULL",
            Self::KwOf => "OF",
            Self::KwOffset => "OFFSET",
            Self::KwOn => "ON",
            Self::KwOr => "OR",
            Self::KwOrder => "ORDER",
            Self::KwOuter => "OUTER",
            Self::KwPlan => "PLAN",
            Self::KwPragma => "PRAGMA",
            Self::KwPrimary => "PRIMARY",
            Self::KwQuery => "QUERY",
            Self::KwRaise => "RAISE",
            Self::KwRecursive => "RECURSIVE",
            Self::KwReferences => "REFERENCES",
            Self::KwRegexp => "REGEXP",
            Self::KwRelease => "RELEASE",
            Self::KwRename => "RENAME",
            Self::KwReplace => "REPLACE",
            Self::KwRestrict => "RESTRICT",
            Self::KwRight => "RIGHT",
            Self::KwRollback => "ROLLBACK",
            Self::KwRow => "ROW",
            Self::KwSavepoint => "SAVEPOINT",
            Self::KwSelect => "SELECT",
            Self::KwSet => "SET",
            Self::KwStart => "START",
            Self::KwTable => "TABLE",
            Self::KwThen => "THEN",
            Self::KwTo => "TO",
            Self::KwTransaction => "TRANSACTION",
            Self::KwTrigger => "TRIGGER",
            Self::KwTrue => "TRUE",
            Self::KwUnion => "UNION",
            Self::KwUnique => "UNIQUE",
            Self::KwUpdate => "UPDATE",
            Self::KwUsing => "USING",
            Self::KwValues => "VALUES",
            Self::KwView => "VIEW",
            Self::KwWhen => "WHEN",
            Self::KwWhere => "WHERE",
            Self::KwWith => "WITH",
            Self::Space => "whitespace",
            Self::Illegal => "illegal",
        }
    }

    /// Kinds the driver filters instead of forwarding.
    #[must_use]
    pub const fn is_filtered(self) -> bool {
        matches!(self, Self::Space | Self::Illegal)
    }

    #[must_use]
    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Float | Self::String | Self::Blob | Self::Variable
        )
    }
}

/// A classified, non-owning span of the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Byte offset of the first byte in the source.
    pub offset: usize,
    /// The exact source bytes; never copied.
    pub text: &'a [u8],
    pub kind: TokenKind,
    /// Meaningful only for keyword kinds.
    pub is_reserved: bool,
}

impl<'a> Token<'a> {
    /// A zero-length token at `offset`, used before anything was lexed.
    #[must_use]
    pub const fn empty(offset: usize) -> Self {
        Self {
            offset,
            text: &[],
            kind: TokenKind::StreamEnd,
            is_reserved: false,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Offset one past the last byte.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    #[must_use]
    pub fn span(&self) -> Span {
        Span::from_offsets(self.offset, self.end())
    }

    /// Token text for diagnostics; invalid UTF-8 is replaced, not dropped.
    #[must_use]
    pub fn text_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.text)
    }
}
