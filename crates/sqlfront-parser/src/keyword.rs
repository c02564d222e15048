//! Keyword recognizer.
//!
//! A compile-time perfect-hash map from upper-case keyword to token kind and
//! reserved flag. Reserved words can only be used as names when quoted;
//! the rest fall back to identifiers where the grammar expects a name.

use crate::token::TokenKind;

/// Length of the longest keyword (`CURRENT_TIMESTAMP`).
pub const MAX_KEYWORD_LEN: usize = 17;

static KEYWORDS: phf::Map<&'static str, (TokenKind, bool)> = phf::phf_map! {
    "ABORT" => (TokenKind::KwAbort, false),
    "ACTION" => (TokenKind::KwAction, false),
    "ADD" => (TokenKind::KwAdd, false),
    "AFTER" => (TokenKind::KwAfter, false),
    "ALL" => (TokenKind::KwAll, true),
    "ALTER" => (TokenKind::KwAlter, true),
    "ANALYZE" => (TokenKind::KwAnalyze, true),
    "AND" => (TokenKind::KwAnd, true),
    "AS" => (TokenKind::KwAs, true),
    "ASC" => (TokenKind::KwAsc, true),
    "AUTOINCREMENT" => (TokenKind::KwAutoincrement, false),
    "BEFORE" => (TokenKind::KwBefore, false),
    "BEGIN" => (TokenKind::KwBegin, true),
    "BETWEEN" => (TokenKind::KwBetween, true),
    "BY" => (TokenKind::KwBy, true),
    "CASCADE" => (TokenKind::KwCascade, false),
    "CASE" => (TokenKind::KwCase, true),
    "CAST" => (TokenKind::KwCast, false),
    "CHECK" => (TokenKind::KwCheck, true),
    "COLLATE" => (TokenKind::KwCollate, true),
    "COLUMN" => (TokenKind::KwColumn, true),
    "COMMIT" => (TokenKind::KwCommit, true),
    "CONFLICT" => (TokenKind::KwConflict, false),
    "CONSTRAINT" => (TokenKind::KwConstraint, true),
    "CREATE" => (TokenKind::KwCreate, true),
    "CROSS" => (TokenKind::KwCross, true),
    "CURRENT_DATE" => (TokenKind::KwCurrentDate, true),
    "CURRENT_TIME" => (TokenKind::KwCurrentTime, true),
    "CURRENT_TIMESTAMP" => (TokenKind::KwCurrentTimestamp, true),
    "DEFAULT" => (TokenKind::KwDefault, true),
    "DEFERRABLE" => (TokenKind::KwDeferrable, false),
    "DEFERRED" => (TokenKind::KwDeferred, false),
    "DELETE" => (TokenKind::KwDelete, true),
    "DESC" => (TokenKind::KwDesc, true),
    "DISTINCT" => (TokenKind::KwDistinct, true),
    "DROP" => (TokenKind::KwDrop, true),
    "EACH" => (TokenKind::KwEach, true),
    "ELSE" => (TokenKind::KwElse, true),
    "END" => (TokenKind::KwEnd, true),
    "ESCAPE" => (TokenKind::KwEscape, true),
    "EXCEPT" => (TokenKind::KwExcept, true),
    "EXISTS" => (TokenKind::KwExists, true),
    "EXPLAIN" => (TokenKind::KwExplain, true),
    "FAIL" => (TokenKind::KwFail, false),
    "FALSE" => (TokenKind::KwFalse, true),
    "FOR" => (TokenKind::KwFor, true),
    "FOREIGN" => (TokenKind::KwForeign, true),
    "FROM" => (TokenKind::KwFrom, true),
    "FULL" => (TokenKind::KwFull, true),
    "GLOB" => (TokenKind::KwGlob, false),
    "GROUP" => (TokenKind::KwGroup, true),
    "HAVING" => (TokenKind::KwHaving, true),
    "IF" => (TokenKind::KwIf, true),
    "IGNORE" => (TokenKind::KwIgnore, false),
    "IMMEDIATE" => (TokenKind::KwImmediate, true),
    "IN" => (TokenKind::KwIn, true),
    "INDEX" => (TokenKind::KwIndex, true),
    "INITIALLY" => (TokenKind::KwInitially, false),
    "INNER" => (TokenKind::KwInner, true),
    "INSERT" => (TokenKind::KwInsert, true),
    "INSTEAD" => (TokenKind::KwInstead, false),
    "INTERSECT" => (TokenKind::KwIntersect, true),
    "INTO" => (TokenKind::KwInto, true),
    "IS" => (TokenKind::KwIs, true),
    "ISNULL" => (TokenKind::KwIsnull, false),
    "JOIN" => (TokenKind::KwJoin, true),
    "KEY" => (TokenKind::KwKey, false),
    "LEFT" => (TokenKind::KwLeft, true),
    "LIKE" => (TokenKind::KwLike, true),
    "LIMIT" => (TokenKind::KwLimit, false),
    "MATCH" => (TokenKind::KwMatch, true),
    "NATURAL" => (TokenKind::KwNatural, true),
    "NO" => (TokenKind::KwNo, false),
    "NOT" => (TokenKind::KwNot, true),
    "NOTNULL" => (TokenKind::KwNotnull, false),
    "NULL" => (TokenKind::KwNull, true),
    "OF" => (TokenKind::KwOf, true),
    "OFFSET" => (TokenKind::KwOffset, false),
    "ON" => (TokenKind::KwOn, true),
    "OR" => (TokenKind::KwOr, true),
    "ORDER" => (TokenKind::KwOrder, true),
    "OUTER" => (TokenKind::KwOuter, true),
    "PLAN" => (TokenKind::KwPlan, false),
    "PRAGMA" => (TokenKind::KwPragma, true),
    "PRIMARY" => (TokenKind::KwPrimary, true),
    "QUERY" => (TokenKind::KwQuery, false),
    "RAISE" => (TokenKind::KwRaise, false),
    "RECURSIVE" => (TokenKind::KwRecursive, true),
    "REFERENCES" => (TokenKind::KwReferences, true),
    "REGEXP" => (TokenKind::KwRegexp, false),
    "RELEASE" => (TokenKind::KwRelease, true),
    "RENAME" => (TokenKind::KwRename, true),
    "REPLACE" => (TokenKind::KwReplace, true),
    "RESTRICT" => (TokenKind::KwRestrict, false),
    "RIGHT" => (TokenKind::KwRight, true),
    "ROLLBACK" => (TokenKind::KwRollback, true),
    "ROW" => (TokenKind::KwRow, true),
    "SAVEPOINT" => (TokenKind::KwSavepoint, true),
    "SELECT" => (TokenKind::KwSelect, true),
    "SET" => (TokenKind::KwSet, true),
    "START" => (TokenKind::KwStart, true),
    "TABLE" => (TokenKind::KwTable, true),
    "THEN" => (TokenKind::KwThen, true),
    "TO" => (TokenKind::KwTo, true),
    "TRANSACTION" => (TokenKind::KwTransaction, true),
    "TRIGGER" => (TokenKind::KwTrigger, true),
    "TRUE" => (TokenKind::KwTrue, true),
    "UNION" => (TokenKind::KwUnion, true),
    "UNIQUE" => (TokenKind::KwUnique, true),
    "UPDATE" => (TokenKind::KwUpdate, true),
    "USING" => (TokenKind::KwUsing, true),
    "VALUES" => (TokenKind::KwValues, true),
    "VIEW" => (TokenKind::KwView, true),
    "WHEN" => (TokenKind::KwWhen, true),
    "WHERE" => (TokenKind::KwWhere, true),
    "WITH" => (TokenKind::KwWith, true),};

/// Case-insensitive exact match of a keyword-legal run.
///
/// Returns the keyword kind and reserved flag, or `None` when `run` is an
/// ordinary identifier.
pub fn lookup_keyword(run: &[u8]) -> Option<(TokenKind, bool)> {
    if run.is_empty() || run.len() > MAX_KEYWORD_LEN {
        return None;
    }
    let mut buf = [0u8; MAX_KEYWORD_LEN];
    let upper = &mut buf[..run.len()];
    upper.copy_from_slice(run);
    upper.make_ascii_uppercase();
    let key = std::str::from_utf8(upper).ok()?;
    KEYWORDS.get(key).copied()
}

/// Number of entries in the keyword map.
pub fn keyword_count() -> usize {
    KEYWORDS.len()
}

/// Iterate over `(keyword, kind, reserved)` entries in unspecified order.
pub fn keywords() -> impl Iterator<Item = (&'static str, TokenKind, bool)> {
    KEYWORDS
        .entries()
        .map(|(name, (kind, reserved))| (*name, *kind, *reserved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charclass::{CharClass, char_class};

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup_keyword(b"select"), Some((TokenKind::KwSelect, true)));
        assert_eq!(lookup_keyword(b"SeLeCt"), Some((TokenKind::KwSelect, true)));
        assert_eq!(lookup_keyword(b"SELECT"), Some((TokenKind::KwSelect, true)));
    }

    #[test]
    fn miss_returns_none() {
        assert_eq!(lookup_keyword(b"selectx"), None);
        assert_eq!(lookup_keyword(b"sel"), None);
        assert_eq!(lookup_keyword(b""), None);
        assert_eq!(lookup_keyword(b"current_timestampz"), None);
    }

    #[test]
    fn reserved_flags() {
        assert_eq!(lookup_keyword(b"from"), Some((TokenKind::KwFrom, true)));
        assert_eq!(lookup_keyword(b"key"), Some((TokenKind::KwKey, false)));
        assert_eq!(lookup_keyword(b"limit"), Some((TokenKind::KwLimit, false)));
        assert_eq!(lookup_keyword(b"abort"), Some((TokenKind::KwAbort, false)));
    }

    #[test]
    fn longest_keyword_fits() {
        assert_eq!(
            lookup_keyword(b"current_timestamp"),
            Some((TokenKind::KwCurrentTimestamp, true))
        );
    }

    #[test]
    fn every_entry_is_keyword_legal_and_upper_case() {
        assert_eq!(keyword_count(), 116);
        for (name, kind, reserved) in keywords() {
            assert!(kind.is_keyword(), "{name}");
            assert!(name.len() <= MAX_KEYWORD_LEN, "{name}");
            assert!(
                name.bytes().all(|b| b.is_ascii_uppercase() || b == b'_'),
                "{name}"
            );
            assert!(
                name.bytes().all(|b| char_class(b) <= CharClass::Keyword),
                "{name}"
            );
            assert_eq!(
                lookup_keyword(name.to_ascii_lowercase().as_bytes()),
                Some((kind, reserved))
            );
        }
    }

    #[test]
    fn no_keyword_starts_with_x() {
        assert!(keywords().all(|(name, _, _)| !name.starts_with('X')));
    }
}
