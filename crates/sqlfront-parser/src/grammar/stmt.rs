//! Statement builder.
//!
//! Partially built side objects are parked in the parse context while
//! their statement is under construction: the `CREATE TABLE` definition,
//! the `CREATE TRIGGER` definition, a top-level `WITH` clause, and an
//! ephemeral relation for every FROM-clause subquery. A successful build
//! takes them back out; a failed one leaves them for the driver to release.

use sqlfront_ast::{
    Assignment, ColumnConstraint, ColumnConstraintKind, ColumnDef, CompoundOp, ConflictAction,
    Cte, DeleteStatement, Distinctness, DropObjectType, DropStatement, Expr, ForeignKeyAction,
    ForeignKeyActionType, ForeignKeyClause, ForeignKeyTrigger, FromClause, IndexedColumn,
    InsertSource, InsertStatement, JoinClause, JoinConstraint, JoinKind, JoinType, LimitClause,
    OrderingTerm, PragmaStatement, PragmaValue, ResultColumn, SelectBody, SelectCore,
    SelectStatement, SortDirection, Statement, TableConstraint, TableConstraintKind, TableDef,
    TableOrSubquery, TriggerDef, TriggerEvent, TriggerTiming, UpdateStatement, WithClause,
};
use sqlfront_error::{FrontendError, Result};

use crate::token::TokenKind;

use super::cursor::Builder;

impl Builder<'_, '_> {
    pub(super) fn parse_statement(&mut self) -> Result<Statement> {
        match self.peek() {
            TokenKind::KwExplain => {
                self.advance();
                let query_plan = self.eat(TokenKind::KwQuery);
                if query_plan {
                    self.expect(TokenKind::KwPlan)?;
                }
                self.descend()?;
                let stmt = self.parse_statement();
                self.ascend();
                let stmt = stmt?;
                Ok(Statement::Explain {
                    query_plan,
                    stmt: Box::new(stmt),
                })
            }
            TokenKind::KwWith => {
                let with = self.parse_with()?;
                self.ctx.with_to_free = Some(with);
                self.parse_with_body()
            }
            TokenKind::KwSelect | TokenKind::KwValues => {
                Ok(Statement::Select(self.parse_select_with(None)?))
            }
            TokenKind::KwInsert | TokenKind::KwReplace => {
                Ok(Statement::Insert(self.parse_insert(None)?))
            }
            TokenKind::KwUpdate => Ok(Statement::Update(self.parse_update(None)?)),
            TokenKind::KwDelete => Ok(Statement::Delete(self.parse_delete(None)?)),
            TokenKind::KwCreate => self.parse_create(),
            TokenKind::KwDrop => self.parse_drop().map(Statement::Drop),
            TokenKind::KwBegin => {
                self.advance();
                if matches!(self.peek(), TokenKind::KwDeferred | TokenKind::KwImmediate) {
                    self.advance();
                }
                self.eat(TokenKind::KwTransaction);
                Ok(Statement::Begin)
            }
            TokenKind::KwStart => {
                self.advance();
                self.expect(TokenKind::KwTransaction)?;
                Ok(Statement::Begin)
            }
            TokenKind::KwCommit | TokenKind::KwEnd => {
                self.advance();
                self.eat(TokenKind::KwTransaction);
                Ok(Statement::Commit)
            }
            TokenKind::KwRollback => {
                self.advance();
                self.eat(TokenKind::KwTransaction);
                let savepoint = if self.eat(TokenKind::KwTo) {
                    self.eat(TokenKind::KwSavepoint);
                    Some(self.name()?)
                } else {
                    None
                };
                Ok(Statement::Rollback { savepoint })
            }
            TokenKind::KwSavepoint => {
                self.advance();
                Ok(Statement::Savepoint(self.name()?))
            }
            TokenKind::KwRelease => {
                self.advance();
                self.eat(TokenKind::KwSavepoint);
                Ok(Statement::Release(self.name()?))
            }
            TokenKind::KwPragma => self.parse_pragma().map(Statement::Pragma),
            _ => Err(self.error_here()),
        }
    }

    /// The statement following a top-level `WITH` clause, which is parked
    /// in the context until the statement takes it.
    fn parse_with_body(&mut self) -> Result<Statement> {
        match self.peek() {
            TokenKind::KwSelect | TokenKind::KwValues => {
                let mut select = self.parse_select_with(None)?;
                select.with = self.ctx.with_to_free.take();
                Ok(Statement::Select(select))
            }
            TokenKind::KwInsert | TokenKind::KwReplace => {
                let mut insert = self.parse_insert(None)?;
                insert.with = self.ctx.with_to_free.take();
                Ok(Statement::Insert(insert))
            }
            TokenKind::KwUpdate => {
                let mut update = self.parse_update(None)?;
                update.with = self.ctx.with_to_free.take();
                Ok(Statement::Update(update))
            }
            TokenKind::KwDelete => {
                let mut delete = self.parse_delete(None)?;
                delete.with = self.ctx.with_to_free.take();
                Ok(Statement::Delete(delete))
            }
            _ => Err(self.error_here()),
        }
    }

    // === SELECT ===

    /// `WITH [RECURSIVE] name [(cols)] AS (select), ...`
    fn parse_with(&mut self) -> Result<WithClause> {
        self.expect(TokenKind::KwWith)?;
        let recursive = self.eat(TokenKind::KwRecursive);
        let mut ctes = Vec::new();
        loop {
            let name = self.name()?;
            let columns = if self.at(TokenKind::Lp) {
                self.name_list()?
            } else {
                Vec::new()
            };
            self.expect(TokenKind::KwAs)?;
            self.expect(TokenKind::Lp)?;
            let query = self.parse_select()?;
            self.expect(TokenKind::Rp)?;
            ctes.push(Cte {
                name,
                columns,
                query,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(WithClause { recursive, ctes })
    }

    /// A nested select, with its own optional `WITH`.
    pub(super) fn parse_select(&mut self) -> Result<SelectStatement> {
        self.descend()?;
        let result = self.parse_nested_select();
        self.ascend();
        result
    }

    fn parse_nested_select(&mut self) -> Result<SelectStatement> {
        let with = if self.at(TokenKind::KwWith) {
            Some(self.parse_with()?)
        } else {
            None
        };
        self.parse_select_with(with)
    }

    fn parse_select_with(&mut self, with: Option<WithClause>) -> Result<SelectStatement> {
        let select = self.parse_select_core()?;
        let mut compounds = Vec::new();
        loop {
            let op = match self.peek() {
                TokenKind::KwUnion => {
                    self.advance();
                    if self.eat(TokenKind::KwAll) {
                        CompoundOp::UnionAll
                    } else {
                        CompoundOp::Union
                    }
                }
                TokenKind::KwIntersect => {
                    self.advance();
                    CompoundOp::Intersect
                }
                TokenKind::KwExcept => {
                    self.advance();
                    CompoundOp::Except
                }
                _ => break,
            };
            compounds.push((op, self.parse_select_core()?));
        }
        let order_by = if self.eat(TokenKind::KwOrder) {
            self.expect(TokenKind::KwBy)?;
            self.parse_ordering_terms()?
        } else {
            Vec::new()
        };
        let limit = if self.eat(TokenKind::KwLimit) {
            let first = self.parse_expr()?;
            if self.eat(TokenKind::KwOffset) {
                Some(LimitClause {
                    limit: first,
                    offset: Some(self.parse_expr()?),
                })
            } else if self.eat(TokenKind::Comma) {
                Some(LimitClause {
                    limit: self.parse_expr()?,
                    offset: Some(first),
                })
            } else {
                Some(LimitClause {
                    limit: first,
                    offset: None,
                })
            }
        } else {
            None
        };
        Ok(SelectStatement {
            with,
            body: SelectBody { select, compounds },
            order_by,
            limit,
        })
    }

    fn parse_select_core(&mut self) -> Result<SelectCore> {
        if self.eat(TokenKind::KwValues) {
            return Ok(SelectCore::Values(self.parse_value_rows()?));
        }
        self.expect(TokenKind::KwSelect)?;
        let distinct = if self.eat(TokenKind::KwDistinct) {
            Distinctness::Distinct
        } else {
            self.eat(TokenKind::KwAll);
            Distinctness::All
        };
        let mut columns = vec![self.parse_result_column()?];
        while self.eat(TokenKind::Comma) {
            columns.push(self.parse_result_column()?);
        }
        let from = if self.eat(TokenKind::KwFrom) {
            Some(self.parse_from()?)
        } else {
            None
        };
        let where_clause = if self.eat(TokenKind::KwWhere) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        let mut group_by = Vec::new();
        let mut having = None;
        if self.eat(TokenKind::KwGroup) {
            self.expect(TokenKind::KwBy)?;
            group_by.push(self.parse_expr()?);
            while self.eat(TokenKind::Comma) {
                group_by.push(self.parse_expr()?);
            }
            if self.eat(TokenKind::KwHaving) {
                having = Some(Box::new(self.parse_expr()?));
            }
        }
        Ok(SelectCore::Select {
            distinct,
            columns,
            from,
            where_clause,
            group_by,
            having,
        })
    }

    fn parse_result_column(&mut self) -> Result<ResultColumn> {
        if self.eat(TokenKind::Star) {
            return Ok(ResultColumn::Star);
        }
        if self.at_name() && self.peek_at(1) == TokenKind::Dot && self.peek_at(2) == TokenKind::Star
        {
            let table = self.name()?;
            self.advance();
            self.advance();
            return Ok(ResultColumn::TableStar(table));
        }
        let expr = self.parse_expr()?;
        let alias = self.optional_alias()?;
        Ok(ResultColumn::Expr { expr, alias })
    }

    /// `(expr, ...), (expr, ...)`
    fn parse_value_rows(&mut self) -> Result<Vec<Vec<Expr>>> {
        let mut rows = Vec::new();
        loop {
            self.expect(TokenKind::Lp)?;
            let mut row = vec![self.parse_expr()?];
            while self.eat(TokenKind::Comma) {
                row.push(self.parse_expr()?);
            }
            self.expect(TokenKind::Rp)?;
            rows.push(row);
            if !self.eat(TokenKind::Comma) {
                return Ok(rows);
            }
        }
    }

    fn parse_ordering_terms(&mut self) -> Result<Vec<OrderingTerm>> {
        let mut terms = Vec::new();
        loop {
            let expr = self.parse_expr()?;
            let direction = self.parse_direction();
            terms.push(OrderingTerm { expr, direction });
            if !self.eat(TokenKind::Comma) {
                return Ok(terms);
            }
        }
    }

    fn parse_direction(&mut self) -> Option<SortDirection> {
        if self.eat(TokenKind::KwAsc) {
            Some(SortDirection::Asc)
        } else if self.eat(TokenKind::KwDesc) {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }

    // === FROM ===

    fn parse_from(&mut self) -> Result<FromClause> {
        let source = self.parse_table_or_subquery()?;
        let mut joins = Vec::new();
        while let Some(join_type) = self.parse_join_op()? {
            let table = self.parse_table_or_subquery()?;
            let constraint = if self.eat(TokenKind::KwOn) {
                Some(JoinConstraint::On(self.parse_expr()?))
            } else if self.eat(TokenKind::KwUsing) {
                Some(JoinConstraint::Using(self.name_list()?))
            } else {
                None
            };
            joins.push(JoinClause {
                join_type,
                table,
                constraint,
            });
        }
        Ok(FromClause { source, joins })
    }

    fn parse_join_op(&mut self) -> Result<Option<JoinType>> {
        if self.eat(TokenKind::Comma) {
            return Ok(Some(JoinType {
                natural: false,
                kind: JoinKind::Cross,
            }));
        }
        let natural = self.eat(TokenKind::KwNatural);
        let kind = match self.peek() {
            TokenKind::KwJoin => JoinKind::Inner,
            TokenKind::KwInner => {
                self.advance();
                JoinKind::Inner
            }
            TokenKind::KwCross => {
                self.advance();
                JoinKind::Cross
            }
            TokenKind::KwLeft => {
                self.advance();
                self.eat(TokenKind::KwOuter);
                JoinKind::Left
            }
            _ if natural => return Err(self.error_here()),
            _ => return Ok(None),
        };
        self.expect(TokenKind::KwJoin)?;
        Ok(Some(JoinType { natural, kind }))
    }

    fn parse_table_or_subquery(&mut self) -> Result<TableOrSubquery> {
        if self.eat(TokenKind::Lp) {
            let query = self.parse_select()?;
            self.expect(TokenKind::Rp)?;
            let alias = self.optional_alias()?;
            let zombie = self.ephemeral_relation(&query, alias.as_deref());
            self.ctx.push_zombie(zombie);
            return Ok(TableOrSubquery::Subquery {
                query: Box::new(query),
                alias,
            });
        }
        let name = self.name()?;
        let alias = self.optional_alias()?;
        Ok(TableOrSubquery::Table { name, alias })
    }

    /// Relation shape of a FROM-clause subquery: one column per result
    /// column, named by alias, by column name, or by position.
    fn ephemeral_relation(&self, query: &SelectStatement, alias: Option<&str>) -> TableDef {
        let name = alias.map_or_else(
            || format!("subquery_{}", self.ctx.zombies().len() + 1),
            str::to_owned,
        );
        let mut table = TableDef::new(name);
        let columns: &[ResultColumn] = match &query.body.select {
            SelectCore::Select { columns, .. } => columns,
            SelectCore::Values(_) => &[],
        };
        for (i, column) in columns.iter().enumerate() {
            let name = match column {
                ResultColumn::Expr {
                    alias: Some(alias), ..
                } => alias.clone(),
                ResultColumn::Expr {
                    expr: Expr::Column(col, _),
                    ..
                } => col.column.clone(),
                _ => format!("column{}", i + 1),
            };
            table.columns.push(ColumnDef {
                name,
                type_name: None,
                constraints: Vec::new(),
            });
        }
        table
    }

    // === INSERT / UPDATE / DELETE ===

    fn parse_conflict_action(&mut self) -> Result<ConflictAction> {
        let action = match self.peek() {
            TokenKind::KwRollback => ConflictAction::Rollback,
            TokenKind::KwAbort => ConflictAction::Abort,
            TokenKind::KwFail => ConflictAction::Fail,
            TokenKind::KwIgnore => ConflictAction::Ignore,
            TokenKind::KwReplace => ConflictAction::Replace,
            _ => return Err(self.error_here()),
        };
        self.advance();
        Ok(action)
    }

    fn parse_or_conflict(&mut self) -> Result<Option<ConflictAction>> {
        if self.eat(TokenKind::KwOr) {
            self.parse_conflict_action().map(Some)
        } else {
            Ok(None)
        }
    }

    fn parse_insert(&mut self, with: Option<WithClause>) -> Result<InsertStatement> {
        let or_conflict = if self.eat(TokenKind::KwReplace) {
            Some(ConflictAction::Replace)
        } else {
            self.expect(TokenKind::KwInsert)?;
            self.parse_or_conflict()?
        };
        self.expect(TokenKind::KwInto)?;
        let table = self.name()?;
        let columns = if self.at(TokenKind::Lp) && self.peek_at(1) != TokenKind::KwSelect {
            self.name_list()?
        } else {
            Vec::new()
        };
        let source = match self.peek() {
            TokenKind::KwDefault => {
                self.advance();
                self.expect(TokenKind::KwValues)?;
                InsertSource::DefaultValues
            }
            TokenKind::KwValues => {
                self.advance();
                InsertSource::Values(self.parse_value_rows()?)
            }
            _ => InsertSource::Select(Box::new(self.parse_select()?)),
        };
        Ok(InsertStatement {
            with,
            or_conflict,
            table,
            columns,
            source,
        })
    }

    fn parse_update(&mut self, with: Option<WithClause>) -> Result<UpdateStatement> {
        self.expect(TokenKind::KwUpdate)?;
        let or_conflict = self.parse_or_conflict()?;
        let table = self.name()?;
        self.expect(TokenKind::KwSet)?;
        let mut assignments = Vec::new();
        loop {
            let columns = if self.at(TokenKind::Lp) {
                self.name_list()?
            } else {
                vec![self.name()?]
            };
            self.expect(TokenKind::Eq)?;
            let value = self.parse_expr()?;
            assignments.push(Assignment { columns, value });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let where_clause = self.parse_where()?;
        Ok(UpdateStatement {
            with,
            or_conflict,
            table,
            assignments,
            where_clause,
        })
    }

    fn parse_delete(&mut self, with: Option<WithClause>) -> Result<DeleteStatement> {
        self.expect(TokenKind::KwDelete)?;
        self.expect(TokenKind::KwFrom)?;
        let table = self.name()?;
        let where_clause = self.parse_where()?;
        Ok(DeleteStatement {
            with,
            table,
            where_clause,
        })
    }

    fn parse_where(&mut self) -> Result<Option<Expr>> {
        if self.eat(TokenKind::KwWhere) {
            self.parse_expr().map(Some)
        } else {
            Ok(None)
        }
    }

    // === CREATE / DROP ===

    fn parse_create(&mut self) -> Result<Statement> {
        self.expect(TokenKind::KwCreate)?;
        match self.peek() {
            TokenKind::KwTable => self.parse_create_table(),
            TokenKind::KwTrigger => self.parse_create_trigger(),
            _ => Err(self.error_here()),
        }
    }

    fn parse_if_not_exists(&mut self) -> Result<bool> {
        if self.eat(TokenKind::KwIf) {
            self.expect(TokenKind::KwNot)?;
            self.expect(TokenKind::KwExists)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn pending_table(&mut self) -> Result<&mut TableDef> {
        self.ctx
            .new_table
            .as_mut()
            .ok_or_else(|| FrontendError::internal("no table under construction"))
    }

    fn parse_create_table(&mut self) -> Result<Statement> {
        self.expect(TokenKind::KwTable)?;
        let if_not_exists = self.parse_if_not_exists()?;
        let name = self.name()?;
        let mut table = TableDef::new(name);
        table.if_not_exists = if_not_exists;
        self.ctx.new_table = Some(table);

        self.expect(TokenKind::Lp)?;
        loop {
            if self.at_table_constraint() {
                break;
            }
            let column = self.parse_column_def()?;
            self.pending_table()?.columns.push(column);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        while self.at_table_constraint() {
            let constraint = self.parse_table_constraint()?;
            self.pending_table()?.constraints.push(constraint);
            self.eat(TokenKind::Comma);
        }
        self.expect(TokenKind::Rp)?;

        let table = self
            .ctx
            .new_table
            .take()
            .ok_or_else(|| FrontendError::internal("no table under construction"))?;
        Ok(Statement::CreateTable(table))
    }

    fn at_table_constraint(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::KwConstraint
                | TokenKind::KwPrimary
                | TokenKind::KwUnique
                | TokenKind::KwCheck
                | TokenKind::KwForeign
        )
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.name()?;
        let type_name = if self.at(TokenKind::Id) {
            Some(self.parse_type_name()?)
        } else {
            None
        };
        let mut constraints = Vec::new();
        while let Some(constraint) = self.parse_column_constraint()? {
            constraints.push(constraint);
        }
        Ok(ColumnDef {
            name,
            type_name,
            constraints,
        })
    }

    fn parse_constraint_name(&mut self) -> Result<Option<String>> {
        if self.eat(TokenKind::KwConstraint) {
            self.name().map(Some)
        } else {
            Ok(None)
        }
    }

    /// `ON CONFLICT <action>`; accepted and dropped.
    fn skip_conflict_clause(&mut self) -> Result<()> {
        if self.at(TokenKind::KwOn) && self.peek_at(1) == TokenKind::KwConflict {
            self.advance();
            self.advance();
            self.parse_conflict_action()?;
        }
        Ok(())
    }

    fn parse_column_constraint(&mut self) -> Result<Option<ColumnConstraint>> {
        let name = self.parse_constraint_name()?;
        let kind = match self.peek() {
            TokenKind::KwPrimary => {
                self.advance();
                self.expect(TokenKind::KwKey)?;
                let direction = self.parse_direction();
                self.skip_conflict_clause()?;
                let autoincrement = self.eat(TokenKind::KwAutoincrement);
                ColumnConstraintKind::PrimaryKey {
                    direction,
                    autoincrement,
                }
            }
            TokenKind::KwNot => {
                self.advance();
                self.expect(TokenKind::KwNull)?;
                self.skip_conflict_clause()?;
                ColumnConstraintKind::NotNull
            }
            TokenKind::KwNull => {
                self.advance();
                self.skip_conflict_clause()?;
                ColumnConstraintKind::Null
            }
            TokenKind::KwUnique => {
                self.advance();
                self.skip_conflict_clause()?;
                ColumnConstraintKind::Unique
            }
            TokenKind::KwDefault => {
                self.advance();
                ColumnConstraintKind::Default(self.parse_prefix()?)
            }
            TokenKind::KwCheck => {
                self.advance();
                self.expect(TokenKind::Lp)?;
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Rp)?;
                ColumnConstraintKind::Check(expr)
            }
            TokenKind::KwCollate => {
                self.advance();
                ColumnConstraintKind::Collate(self.name()?)
            }
            TokenKind::KwReferences => {
                ColumnConstraintKind::References(self.parse_foreign_key_clause()?)
            }
            _ if name.is_some() => return Err(self.error_here()),
            _ => return Ok(None),
        };
        Ok(Some(ColumnConstraint { name, kind }))
    }

    fn parse_table_constraint(&mut self) -> Result<TableConstraint> {
        let name = self.parse_constraint_name()?;
        let kind = match self.peek() {
            TokenKind::KwPrimary => {
                self.advance();
                self.expect(TokenKind::KwKey)?;
                let columns = self.parse_indexed_columns()?;
                self.skip_conflict_clause()?;
                TableConstraintKind::PrimaryKey(columns)
            }
            TokenKind::KwUnique => {
                self.advance();
                let columns = self.parse_indexed_columns()?;
                self.skip_conflict_clause()?;
                TableConstraintKind::Unique(columns)
            }
            TokenKind::KwCheck => {
                self.advance();
                self.expect(TokenKind::Lp)?;
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Rp)?;
                TableConstraintKind::Check(expr)
            }
            TokenKind::KwForeign => {
                self.advance();
                self.expect(TokenKind::KwKey)?;
                let columns = self.name_list()?;
                let clause = self.parse_foreign_key_clause()?;
                TableConstraintKind::ForeignKey { columns, clause }
            }
            _ => return Err(self.error_here()),
        };
        Ok(TableConstraint { name, kind })
    }

    fn parse_indexed_columns(&mut self) -> Result<Vec<IndexedColumn>> {
        self.expect(TokenKind::Lp)?;
        let mut columns = Vec::new();
        loop {
            let name = self.name()?;
            let collation = if self.eat(TokenKind::KwCollate) {
                Some(self.name()?)
            } else {
                None
            };
            let direction = self.parse_direction();
            columns.push(IndexedColumn {
                name,
                collation,
                direction,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Rp)?;
        Ok(columns)
    }

    /// `REFERENCES table [(cols)] [ON DELETE|UPDATE action]... [[NOT]
    /// DEFERRABLE [INITIALLY DEFERRED|IMMEDIATE]]`
    fn parse_foreign_key_clause(&mut self) -> Result<ForeignKeyClause> {
        self.expect(TokenKind::KwReferences)?;
        let table = self.name()?;
        let columns = if self.at(TokenKind::Lp) {
            self.name_list()?
        } else {
            Vec::new()
        };
        let mut actions = Vec::new();
        loop {
            if self.at(TokenKind::KwOn) && self.peek_at(1) != TokenKind::KwConflict {
                self.advance();
                let trigger = match self.peek() {
                    TokenKind::KwDelete => ForeignKeyTrigger::OnDelete,
                    TokenKind::KwUpdate => ForeignKeyTrigger::OnUpdate,
                    _ => return Err(self.error_here()),
                };
                self.advance();
                let action = self.parse_foreign_key_action()?;
                actions.push(ForeignKeyAction { trigger, action });
            } else if self.at(TokenKind::KwDeferrable)
                || (self.at(TokenKind::KwNot) && self.peek_at(1) == TokenKind::KwDeferrable)
            {
                self.eat(TokenKind::KwNot);
                self.advance();
                if self.eat(TokenKind::KwInitially)
                    && !self.eat(TokenKind::KwDeferred)
                    && !self.eat(TokenKind::KwImmediate)
                {
                    return Err(self.error_here());
                }
            } else {
                break;
            }
        }
        Ok(ForeignKeyClause {
            table,
            columns,
            actions,
        })
    }

    fn parse_foreign_key_action(&mut self) -> Result<ForeignKeyActionType> {
        match self.peek() {
            TokenKind::KwSet => {
                self.advance();
                if self.eat(TokenKind::KwNull) {
                    Ok(ForeignKeyActionType::SetNull)
                } else {
                    self.expect(TokenKind::KwDefault)?;
                    Ok(ForeignKeyActionType::SetDefault)
                }
            }
            TokenKind::KwCascade => {
                self.advance();
                Ok(ForeignKeyActionType::Cascade)
            }
            TokenKind::KwRestrict => {
                self.advance();
                Ok(ForeignKeyActionType::Restrict)
            }
            TokenKind::KwNo => {
                self.advance();
                self.expect(TokenKind::KwAction)?;
                Ok(ForeignKeyActionType::NoAction)
            }
            _ => Err(self.error_here()),
        }
    }

    fn parse_create_trigger(&mut self) -> Result<Statement> {
        self.expect(TokenKind::KwTrigger)?;
        let if_not_exists = self.parse_if_not_exists()?;
        let name = self.name()?;
        let timing = match self.peek() {
            TokenKind::KwBefore => {
                self.advance();
                TriggerTiming::Before
            }
            TokenKind::KwAfter => {
                self.advance();
                TriggerTiming::After
            }
            TokenKind::KwInstead => {
                self.advance();
                self.expect(TokenKind::KwOf)?;
                TriggerTiming::InsteadOf
            }
            _ => TriggerTiming::Before,
        };
        let event = match self.peek() {
            TokenKind::KwInsert => {
                self.advance();
                TriggerEvent::Insert
            }
            TokenKind::KwDelete => {
                self.advance();
                TriggerEvent::Delete
            }
            TokenKind::KwUpdate => {
                self.advance();
                if self.eat(TokenKind::KwOf) {
                    let mut columns = vec![self.name()?];
                    while self.eat(TokenKind::Comma) {
                        columns.push(self.name()?);
                    }
                    TriggerEvent::Update(columns)
                } else {
                    TriggerEvent::Update(Vec::new())
                }
            }
            _ => return Err(self.error_here()),
        };
        self.expect(TokenKind::KwOn)?;
        let table = self.name()?;
        let for_each_row = self.eat(TokenKind::KwFor);
        if for_each_row {
            self.expect(TokenKind::KwEach)?;
            self.expect(TokenKind::KwRow)?;
        }
        let when = if self.eat(TokenKind::KwWhen) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.ctx.new_trigger = Some(TriggerDef {
            if_not_exists,
            name,
            timing,
            event,
            table,
            for_each_row,
            when,
            body: Vec::new(),
        });

        self.expect(TokenKind::KwBegin)?;
        loop {
            let stmt = match self.peek() {
                TokenKind::KwSelect | TokenKind::KwValues | TokenKind::KwWith => {
                    Statement::Select(self.parse_select()?)
                }
                TokenKind::KwInsert | TokenKind::KwReplace => {
                    Statement::Insert(self.parse_insert(None)?)
                }
                TokenKind::KwUpdate => Statement::Update(self.parse_update(None)?),
                TokenKind::KwDelete => Statement::Delete(self.parse_delete(None)?),
                _ => return Err(self.error_here()),
            };
            self.expect(TokenKind::Semi)?;
            self.ctx
                .new_trigger
                .as_mut()
                .ok_or_else(|| FrontendError::internal("no trigger under construction"))?
                .body
                .push(stmt);
            if self.eat(TokenKind::KwEnd) {
                break;
            }
        }

        let trigger = self
            .ctx
            .new_trigger
            .take()
            .ok_or_else(|| FrontendError::internal("no trigger under construction"))?;
        Ok(Statement::CreateTrigger(trigger))
    }

    fn parse_drop(&mut self) -> Result<DropStatement> {
        self.expect(TokenKind::KwDrop)?;
        let object_type = match self.peek() {
            TokenKind::KwTable => DropObjectType::Table,
            TokenKind::KwView => DropObjectType::View,
            TokenKind::KwIndex => DropObjectType::Index,
            TokenKind::KwTrigger => DropObjectType::Trigger,
            _ => return Err(self.error_here()),
        };
        self.advance();
        let if_exists = self.eat(TokenKind::KwIf);
        if if_exists {
            self.expect(TokenKind::KwExists)?;
        }
        let name = self.name()?;
        let table = if object_type == DropObjectType::Index && self.eat(TokenKind::KwOn) {
            Some(self.name()?)
        } else {
            None
        };
        Ok(DropStatement {
            object_type,
            if_exists,
            name,
            table,
        })
    }

    fn parse_pragma(&mut self) -> Result<PragmaStatement> {
        self.expect(TokenKind::KwPragma)?;
        let name = self.name()?;
        let value = if self.eat(TokenKind::Eq) {
            Some(PragmaValue::Assign(self.parse_expr()?))
        } else if self.eat(TokenKind::Lp) {
            let expr = self.parse_expr()?;
            self.expect(TokenKind::Rp)?;
            Some(PragmaValue::Call(expr))
        } else {
            None
        };
        Ok(PragmaStatement { name, value })
    }
}
