// SQL tokenizer, parse driver, and bundled grammar engine.
//
// The lexer turns bytes into classified tokens; the driver feeds the
// significant ones to a grammar engine and cleans up after it on every
// exit path. The expression compiler reuses both for a bare expression.

pub mod charclass;
pub mod context;
pub mod driver;
pub mod engine;
pub mod expr_compile;
pub mod grammar;
pub mod instrumentation;
pub mod keyword;
pub mod lexer;
pub mod token;

pub use context::{ParseContext, PendingArtifact, PreparedStatement, VarList};
pub use driver::{Parser, Prepared, run_parser};
pub use engine::{Grammar, GrammarEngine};
pub use expr_compile::compile_expression;
pub use grammar::{SqlEngine, SqlGrammar};
pub use instrumentation::{
    AbortClass, AbortTotals, ParseDurationHistogram, ParseMetricsSnapshot, parse_metrics_snapshot,
    reset_parse_metrics,
};
pub use keyword::lookup_keyword;
pub use lexer::{Lexeme, Lexer, lex, tokenize};
pub use token::{Token, TokenKind};
