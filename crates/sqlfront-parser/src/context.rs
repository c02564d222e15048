//! Per-call parse state shared by the driver and the grammar engine.
//!
//! A [`ParseContext`] lives for exactly one driver call. The grammar engine
//! parks partially built side objects in its pending slots while it works;
//! whatever is still parked when the call ends is released by
//! [`ParseContext::release_pending`], which the driver runs on every exit
//! path and `Drop` runs again as a backstop.

use serde::Serialize;
use smallvec::SmallVec;
use sqlfront_ast::{Expr, Span, Statement, TableDef, TriggerDef, WithClause};
use sqlfront_error::{ErrorCode, FrontendError};
use sqlfront_types::ParseLimits;
use tracing::{debug, trace};

use crate::instrumentation::record_artifact_released;
use crate::token::Token;

// ---------------------------------------------------------------------------
// Bind-variable list
// ---------------------------------------------------------------------------

/// Bind variables of one statement: the highest index used plus the index
/// assigned to each named variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VarList {
    count: u32,
    named: Vec<(String, u32)>,
}

impl VarList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parameter slots (the highest index assigned).
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Index for a bare `?`: one past the highest so far.
    pub fn next_anonymous(&mut self) -> u32 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    /// Record an explicit `?NNN`.
    pub fn bind_numbered(&mut self, index: u32) -> u32 {
        self.count = self.count.max(index);
        index
    }

    /// Index for `:name` / `@name` / `$name` / `#name`. A repeated name
    /// reuses its first index.
    pub fn bind_named(&mut self, name: &str) -> u32 {
        if let Some(index) = self.index_of(name) {
            return index;
        }
        let index = self.next_anonymous();
        self.named.push((name.to_owned(), index));
        index
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.named
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, index)| *index)
    }

    /// Named variables in order of first appearance.
    pub fn names(&self) -> impl Iterator<Item = (&str, u32)> {
        self.named.iter().map(|(n, index)| (n.as_str(), *index))
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// The executable artifact of one statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedStatement {
    pub stmt: Statement,
    pub parameters: VarList,
    /// Source bytes the statement was built from, terminator excluded.
    pub span: Span,
}

/// Side objects the grammar engine may leave behind, in release order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingArtifact {
    NewTable,
    WithClause,
    NewTrigger,
    VarList,
    ZombieChain,
}

impl PendingArtifact {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewTable => "new_table",
            Self::WithClause => "with_clause",
            Self::NewTrigger => "new_trigger",
            Self::VarList => "vlist",
            Self::ZombieChain => "zombie_chain",
        }
    }
}

// ---------------------------------------------------------------------------
// ParseContext
// ---------------------------------------------------------------------------

/// State of one parse call.
#[derive(Debug)]
pub struct ParseContext<'src> {
    source: &'src [u8],
    limits: ParseLimits,
    parse_only: bool,

    rc: ErrorCode,
    error: Option<FrontendError>,
    n_err: usize,
    oom: bool,
    last_token: Token<'src>,
    tail: usize,

    /// `CREATE TABLE` definition under construction.
    pub new_table: Option<TableDef>,
    /// `CREATE TRIGGER` definition under construction.
    pub new_trigger: Option<TriggerDef>,
    /// `WITH` clause parsed but not yet attached to its statement.
    pub with_to_free: Option<WithClause>,
    /// Bind variables seen so far.
    pub vlist: Option<VarList>,
    zombies: Vec<TableDef>,
    released: SmallVec<[PendingArtifact; 5]>,

    statement: Option<PreparedStatement>,
    parsed_ast: Option<Statement>,
    parsed_expr: Option<Expr>,
}

impl<'src> ParseContext<'src> {
    #[must_use]
    pub fn new(source: &'src [u8], limits: ParseLimits) -> Self {
        Self {
            source,
            limits,
            parse_only: false,
            rc: ErrorCode::Ok,
            error: None,
            n_err: 0,
            oom: false,
            last_token: Token::empty(0),
            tail: 0,
            new_table: None,
            new_trigger: None,
            with_to_free: None,
            vlist: None,
            zombies: Vec::new(),
            released: SmallVec::new(),
            statement: None,
            parsed_ast: None,
            parsed_expr: None,
        }
    }

    /// Parse without building a [`PreparedStatement`].
    #[must_use]
    pub fn parse_only(mut self) -> Self {
        self.parse_only = true;
        self
    }

    #[must_use]
    pub const fn source(&self) -> &'src [u8] {
        self.source
    }

    #[must_use]
    pub const fn limits(&self) -> &ParseLimits {
        &self.limits
    }

    #[must_use]
    pub const fn is_parse_only(&self) -> bool {
        self.parse_only
    }

    // === Result code and errors ===

    #[must_use]
    pub const fn rc(&self) -> ErrorCode {
        self.rc
    }

    /// Set the result code without a message. `Done` marks the statement
    /// complete.
    pub fn set_rc(&mut self, rc: ErrorCode) {
        self.rc = rc;
    }

    /// Record an error. The first error wins; later ones only bump the
    /// error count.
    pub fn set_error(&mut self, err: FrontendError) {
        self.n_err += 1;
        if self.error.is_none() {
            self.rc = err.error_code();
            self.error = Some(err);
        }
    }

    /// Flag an allocation failure.
    pub fn set_oom(&mut self) {
        self.oom = true;
    }

    #[must_use]
    pub const fn is_oom(&self) -> bool {
        self.oom
    }

    #[must_use]
    pub const fn n_err(&self) -> usize {
        self.n_err
    }

    #[must_use]
    pub const fn error(&self) -> Option<&FrontendError> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<FrontendError> {
        self.error.take()
    }

    /// Promote a bare error code to a message.
    pub(crate) fn ensure_error_message(&mut self) {
        if self.rc.is_error() && self.error.is_none() {
            self.error = Some(FrontendError::from_code(self.rc));
        }
    }

    // === Position ===

    /// Last token the driver consumed.
    #[must_use]
    pub const fn last_token(&self) -> Token<'src> {
        self.last_token
    }

    pub(crate) fn set_last_token(&mut self, token: Token<'src>) {
        self.last_token = token;
    }

    /// Offset one past the last byte consumed.
    #[must_use]
    pub const fn tail(&self) -> usize {
        self.tail
    }

    pub(crate) fn set_tail(&mut self, tail: usize) {
        self.tail = tail;
    }

    // === Artifacts ===

    /// Register an ephemeral relation for a FROM-clause subquery. Zombies
    /// are always released when the call ends.
    pub fn push_zombie(&mut self, table: TableDef) {
        self.zombies.push(table);
    }

    #[must_use]
    pub fn zombies(&self) -> &[TableDef] {
        &self.zombies
    }

    pub fn set_statement(&mut self, statement: PreparedStatement) {
        self.statement = Some(statement);
    }

    #[must_use]
    pub const fn statement(&self) -> Option<&PreparedStatement> {
        self.statement.as_ref()
    }

    pub fn take_statement(&mut self) -> Option<PreparedStatement> {
        self.statement.take()
    }

    pub(crate) fn discard_statement(&mut self) {
        if self.statement.take().is_some() {
            debug!(n_err = self.n_err, "discarding partially built statement");
        }
    }

    pub fn set_parsed_ast(&mut self, stmt: Statement) {
        self.parsed_ast = Some(stmt);
    }

    pub fn take_parsed_ast(&mut self) -> Option<Statement> {
        self.parsed_ast.take()
    }

    pub fn set_parsed_expr(&mut self, expr: Expr) {
        self.parsed_expr = Some(expr);
    }

    pub fn take_parsed_expr(&mut self) -> Option<Expr> {
        self.parsed_expr.take()
    }

    /// Release every pending artifact, in the fixed order new table, WITH
    /// clause, new trigger, variable list, zombie chain. Safe to call more
    /// than once; a slot already consumed is skipped.
    pub fn release_pending(&mut self) {
        if let Some(table) = self.new_table.take() {
            trace!(table = %table.name, "releasing pending table");
            self.note_release(PendingArtifact::NewTable);
        }
        if let Some(with) = self.with_to_free.take() {
            trace!(ctes = with.ctes.len(), "releasing pending WITH clause");
            self.note_release(PendingArtifact::WithClause);
        }
        if let Some(trigger) = self.new_trigger.take() {
            trace!(trigger = %trigger.name, "releasing pending trigger");
            self.note_release(PendingArtifact::NewTrigger);
        }
        if let Some(vlist) = self.vlist.take() {
            trace!(count = vlist.count(), "releasing variable list");
            self.note_release(PendingArtifact::VarList);
        }
        if !self.zombies.is_empty() {
            trace!(zombies = self.zombies.len(), "releasing zombie chain");
            self.zombies.clear();
            self.note_release(PendingArtifact::ZombieChain);
        }
    }

    fn note_release(&mut self, artifact: PendingArtifact) {
        record_artifact_released();
        self.released.push(artifact);
    }

    /// Artifacts released so far, in release order.
    #[must_use]
    pub fn released(&self) -> &[PendingArtifact] {
        &self.released
    }
}

impl Drop for ParseContext<'_> {
    fn drop(&mut self) {
        self.release_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlfront_ast::{Cte, SelectBody, SelectCore, SelectStatement, TriggerEvent, TriggerTiming};

    fn values_query() -> SelectStatement {
        SelectStatement {
            with: None,
            body: SelectBody {
                select: SelectCore::Values(vec![]),
                compounds: vec![],
            },
            order_by: vec![],
            limit: None,
        }
    }

    #[test]
    fn first_error_wins() {
        let mut ctx = ParseContext::new(b"", ParseLimits::default());
        ctx.set_error(FrontendError::syntax("a"));
        ctx.set_error(FrontendError::Interrupted);
        assert_eq!(ctx.n_err(), 2);
        assert_eq!(ctx.rc(), ErrorCode::Error);
        assert!(matches!(ctx.error(), Some(FrontendError::SyntaxError { .. })));
    }

    #[test]
    fn bare_code_gets_generic_message() {
        let mut ctx = ParseContext::new(b"", ParseLimits::default());
        ctx.set_rc(ErrorCode::NoMem);
        ctx.ensure_error_message();
        assert_eq!(ctx.error().map(ToString::to_string).as_deref(), Some("out of memory"));
    }

    #[test]
    fn done_is_not_an_error() {
        let mut ctx = ParseContext::new(b"", ParseLimits::default());
        ctx.set_rc(ErrorCode::Done);
        ctx.ensure_error_message();
        assert!(ctx.error().is_none());
    }

    #[test]
    fn release_order_is_fixed_and_idempotent() {
        let mut ctx = ParseContext::new(b"", ParseLimits::default());
        ctx.vlist = Some(VarList::new());
        ctx.new_trigger = Some(TriggerDef {
            if_not_exists: false,
            name: "tr".to_owned(),
            timing: TriggerTiming::Before,
            event: TriggerEvent::Insert,
            table: "t".to_owned(),
            for_each_row: false,
            when: None,
            body: vec![],
        });
        ctx.with_to_free = Some(WithClause {
            recursive: false,
            ctes: vec![Cte {
                name: "c".to_owned(),
                columns: vec![],
                query: values_query(),
            }],
        });
        ctx.new_table = Some(TableDef::new("t"));
        ctx.push_zombie(TableDef::new("sq"));

        ctx.release_pending();
        ctx.release_pending();
        assert_eq!(
            ctx.released(),
            &[
                PendingArtifact::NewTable,
                PendingArtifact::WithClause,
                PendingArtifact::NewTrigger,
                PendingArtifact::VarList,
                PendingArtifact::ZombieChain,
            ]
        );
        assert!(ctx.new_table.is_none() && ctx.vlist.is_none() && ctx.zombies().is_empty());
    }

    #[test]
    fn consumed_artifact_is_not_released() {
        let mut ctx = ParseContext::new(b"", ParseLimits::default());
        ctx.new_table = Some(TableDef::new("t"));
        let table = ctx.new_table.take();
        assert!(table.is_some());
        ctx.release_pending();
        assert!(ctx.released().is_empty());
    }

    #[test]
    fn var_list_reuses_named_indexes() {
        let mut vars = VarList::new();
        assert_eq!(vars.next_anonymous(), 1);
        assert_eq!(vars.bind_named(":a"), 2);
        assert_eq!(vars.bind_numbered(5), 5);
        assert_eq!(vars.bind_named(":a"), 2);
        assert_eq!(vars.next_anonymous(), 6);
        assert_eq!(vars.bind_named("@b"), 7);
        assert_eq!(vars.count(), 7);
        assert_eq!(vars.names().collect::<Vec<_>>(), vec![(":a", 2), ("@b", 7)]);
    }

    #[test]
    fn discard_drops_statement() {
        let mut ctx = ParseContext::new(b"BEGIN", ParseLimits::default());
        ctx.set_statement(PreparedStatement {
            stmt: Statement::Begin,
            parameters: VarList::new(),
            span: Span::new(0, 5),
        });
        ctx.discard_statement();
        assert!(ctx.statement().is_none());
    }
}
