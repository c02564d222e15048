use thiserror::Error;

/// Primary error type for the SQL front end.
///
/// Variants carry the offending text where there is one, so the rendered
/// message matches the source byte for byte.
#[derive(Error, Debug)]
pub enum FrontendError {
    // === Lexical errors ===
    /// A byte sequence that no lexer rule accepts. `bytes` holds the token
    /// exactly as it appeared; `token` is its display form.
    #[error("unrecognized token: \"{token}\"")]
    IllegalToken {
        token: String,
        bytes: Vec<u8>,
        offset: usize,
    },

    /// The consumed offset ran past the configured statement cap.
    #[error("statement too long: {length} bytes consumed, limit is {max}")]
    StatementTooLong { length: usize, max: usize },

    // === Grammar errors ===
    /// SQL syntax error.
    #[error("near \"{token}\": syntax error")]
    SyntaxError { token: String },

    /// Input ended inside a statement.
    #[error("incomplete input")]
    IncompleteInput,

    /// A reserved word used where a name is required.
    #[error("keyword '{keyword}' is reserved; use double quotes if '{keyword}' is an identifier")]
    ReservedKeyword { keyword: String },

    /// Expression nesting exceeds the configured depth.
    #[error("expression tree is too large (maximum depth {max})")]
    ExpressionTooDeep { max: usize },

    /// `?NNN` outside the accepted range.
    #[error("variable number must be between ?1 and ?{max}")]
    VariableNumber { max: u32 },

    /// Hex integer literal wider than 64 bits.
    #[error("hex literal too big: {literal}")]
    HexLiteralTooBig { literal: String },

    // === Driver errors ===
    /// Cooperative cancellation observed between tokens.
    #[error("interrupted")]
    Interrupted,

    /// Out of memory.
    #[error("out of memory")]
    OutOfMemory,

    /// Grammar engine failure; `detail` falls back to the code description.
    #[error("{detail}")]
    Engine { code: ErrorCode, detail: String },

    /// A standalone expression failed to compile.
    #[error("failed to compile SQL expression '{expr}': {source}")]
    ExpressionCompile {
        expr: String,
        #[source]
        source: Box<FrontendError>,
    },

    // === Configuration ===
    /// Rejected configuration value.
    #[error("invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    /// File I/O error (configuration files, CLI input).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal logic error (should never happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// SQLite result codes.
///
/// These match the numeric values from C SQLite's `sqlite3.h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// Successful result.
    Ok = 0,
    /// Generic error.
    Error = 1,
    /// Internal logic error.
    Internal = 2,
    /// Callback requested abort.
    Abort = 4,
    /// Out of memory.
    NoMem = 7,
    /// Interrupted by a cancellation request.
    Interrupt = 9,
    /// Disk I/O error.
    IoErr = 10,
    /// String, BLOB or statement exceeds size limit.
    TooBig = 18,
    /// Library used incorrectly.
    Misuse = 21,
    /// Bind parameter out of range.
    Range = 25,
    /// The grammar engine finished a statement.
    Done = 101,
}

impl ErrorCode {
    /// Generic English description, used when no stage supplied a message.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ok => "not an error",
            Self::Error => "SQL logic error",
            Self::Internal => "internal logic error",
            Self::Abort => "query aborted",
            Self::NoMem => "out of memory",
            Self::Interrupt => "interrupted",
            Self::IoErr => "disk I/O error",
            Self::TooBig => "string or blob too big",
            Self::Misuse => "bad parameter or other API misuse",
            Self::Range => "column index out of range",
            Self::Done => "no more rows available",
        }
    }

    /// `Ok` and `Done` are not failures.
    pub const fn is_error(self) -> bool {
        !matches!(self, Self::Ok | Self::Done)
    }
}

impl FrontendError {
    /// Map this error to a SQLite result code.
    #[allow(clippy::match_same_arms)]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::IllegalToken { .. }
            | Self::SyntaxError { .. }
            | Self::IncompleteInput
            | Self::ReservedKeyword { .. }
            | Self::ExpressionTooDeep { .. }
            | Self::HexLiteralTooBig { .. }
            | Self::ExpressionCompile { .. } => ErrorCode::Error,
            Self::VariableNumber { .. } => ErrorCode::Range,
            Self::StatementTooLong { .. } => ErrorCode::TooBig,
            Self::Interrupted => ErrorCode::Interrupt,
            Self::OutOfMemory => ErrorCode::NoMem,
            Self::Engine { code, .. } => *code,
            Self::InvalidConfig { .. } => ErrorCode::Misuse,
            Self::Io(_) => ErrorCode::IoErr,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Whether the user can likely fix this by editing the SQL text.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::IllegalToken { .. }
                | Self::SyntaxError { .. }
                | Self::IncompleteInput
                | Self::ReservedKeyword { .. }
                | Self::VariableNumber { .. }
                | Self::HexLiteralTooBig { .. }
                | Self::ExpressionCompile { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ReservedKeyword { .. } => Some("Quote the name with double quotes"),
            Self::StatementTooLong { .. } => {
                Some("Split the statement or raise max_sql_length")
            }
            Self::ExpressionTooDeep { .. } => {
                Some("Simplify the expression or raise max_expr_depth")
            }
            Self::IncompleteInput => Some("Check for a missing END or closing parenthesis"),
            _ => None,
        }
    }

    /// Get the process exit code for this error (for CLI use).
    pub const fn exit_code(&self) -> i32 {
        self.error_code() as i32
    }

    /// Create a syntax error.
    pub fn syntax(token: impl Into<String>) -> Self {
        Self::SyntaxError {
            token: token.into(),
        }
    }

    /// Create an illegal-token error quoting the offending bytes.
    pub fn illegal(token: &[u8], offset: usize) -> Self {
        Self::IllegalToken {
            token: String::from_utf8_lossy(token).into_owned(),
            bytes: token.to_vec(),
            offset,
        }
    }

    /// Create an engine error from a bare result code.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::Engine {
            code,
            detail: code.description().to_owned(),
        }
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a configuration error.
    pub fn config(detail: impl Into<String>) -> Self {
        Self::InvalidConfig {
            detail: detail.into(),
        }
    }

    /// Wrap `source` as a failed standalone expression compile.
    pub fn expression_compile(expr: impl Into<String>, source: Self) -> Self {
        Self::ExpressionCompile {
            expr: expr.into(),
            source: Box::new(source),
        }
    }
}

/// Result type alias using `FrontendError`.
pub type Result<T> = std::result::Result<T, FrontendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FrontendError::syntax("SELEC");
        assert_eq!(err.to_string(), r#"near "SELEC": syntax error"#);
    }

    #[test]
    fn illegal_token_quotes_exact_text() {
        let err = FrontendError::illegal(b"1abc", 7);
        assert_eq!(err.to_string(), r#"unrecognized token: "1abc""#);
        assert!(matches!(err, FrontendError::IllegalToken { offset: 7, .. }));
    }

    #[test]
    fn illegal_token_keeps_raw_bytes() {
        let err = FrontendError::illegal(b"x'\xff\xfe'", 3);
        match &err {
            FrontendError::IllegalToken { bytes, offset, .. } => {
                assert_eq!(bytes.as_slice(), b"x'\xff\xfe'");
                assert_eq!(*offset, 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().starts_with("unrecognized token: \"x'"));
    }

    #[test]
    fn error_code_mapping() {
        assert_eq!(FrontendError::syntax("x").error_code(), ErrorCode::Error);
        assert_eq!(FrontendError::Interrupted.error_code(), ErrorCode::Interrupt);
        assert_eq!(FrontendError::OutOfMemory.error_code(), ErrorCode::NoMem);
        assert_eq!(
            FrontendError::StatementTooLong { length: 11, max: 10 }.error_code(),
            ErrorCode::TooBig
        );
        assert_eq!(
            FrontendError::VariableNumber { max: 5 }.error_code(),
            ErrorCode::Range
        );
        assert_eq!(
            FrontendError::from_code(ErrorCode::Internal).error_code(),
            ErrorCode::Internal
        );
    }

    #[test]
    fn too_long_and_illegal_codes_differ() {
        let too_long = FrontendError::StatementTooLong { length: 2, max: 1 };
        let illegal = FrontendError::illegal(b"!", 0);
        assert_ne!(too_long.error_code(), illegal.error_code());
    }

    #[test]
    fn from_code_uses_generic_description() {
        let err = FrontendError::from_code(ErrorCode::NoMem);
        assert_eq!(err.to_string(), "out of memory");
        let err = FrontendError::from_code(ErrorCode::Internal);
        assert_eq!(err.to_string(), "internal logic error");
    }

    #[test]
    fn expression_compile_names_expression() {
        let err = FrontendError::expression_compile("+", FrontendError::IncompleteInput);
        let msg = err.to_string();
        assert!(msg.contains("'+'"), "{msg}");
        assert!(msg.contains("incomplete input"), "{msg}");
        assert_eq!(err.error_code(), ErrorCode::Error);
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("incomplete input"));
    }

    #[test]
    fn user_recoverable() {
        assert!(FrontendError::syntax("x").is_user_recoverable());
        assert!(FrontendError::illegal(b"@", 0).is_user_recoverable());
        assert!(!FrontendError::Interrupted.is_user_recoverable());
        assert!(!FrontendError::internal("bug").is_user_recoverable());
    }

    #[test]
    fn suggestions() {
        assert!(
            FrontendError::ReservedKeyword {
                keyword: "select".to_owned()
            }
            .suggestion()
            .is_some()
        );
        assert!(FrontendError::Interrupted.suggestion().is_none());
    }

    #[test]
    fn error_code_values() {
        assert_eq!(ErrorCode::Ok as i32, 0);
        assert_eq!(ErrorCode::Error as i32, 1);
        assert_eq!(ErrorCode::NoMem as i32, 7);
        assert_eq!(ErrorCode::Interrupt as i32, 9);
        assert_eq!(ErrorCode::TooBig as i32, 18);
        assert_eq!(ErrorCode::Done as i32, 101);
        assert!(!ErrorCode::Done.is_error());
        assert!(ErrorCode::TooBig.is_error());
    }

    #[test]
    fn exit_code() {
        assert_eq!(FrontendError::Interrupted.exit_code(), 9);
        assert_eq!(FrontendError::internal("x").exit_code(), 2);
        assert_eq!(FrontendError::syntax("x").exit_code(), 1);
    }

    #[test]
    fn io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: FrontendError = io_err.into();
        assert!(matches!(err, FrontendError::Io(_)));
        assert_eq!(err.error_code(), ErrorCode::IoErr);
    }
}
