//! Numeric caps enforced by a parse.
//!
//! Limits load from a TOML table; every key is optional:
//!
//! ```toml
//! max_sql_length = 1000000
//! max_expr_depth = 100
//! max_variable_number = 999
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use sqlfront_error::{FrontendError, Result};
use tracing::debug;

/// Default cap on bytes consumed by one parse call.
pub const DEFAULT_MAX_SQL_LENGTH: usize = 1_000_000_000;
/// Default cap on nesting of expressions and subqueries. Each level is a
/// few recursive frames; this depth fits a 2 MiB thread stack.
pub const DEFAULT_MAX_EXPR_DEPTH: usize = 100;
/// Default upper bound for `?NNN`.
pub const DEFAULT_MAX_VARIABLE_NUMBER: u32 = 65000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParseLimits {
    /// The driver aborts once the consumed offset exceeds this.
    #[serde(default = "default_max_sql_length")]
    pub max_sql_length: usize,
    #[serde(default = "default_max_expr_depth")]
    pub max_expr_depth: usize,
    #[serde(default = "default_max_variable_number")]
    pub max_variable_number: u32,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_sql_length: DEFAULT_MAX_SQL_LENGTH,
            max_expr_depth: DEFAULT_MAX_EXPR_DEPTH,
            max_variable_number: DEFAULT_MAX_VARIABLE_NUMBER,
        }
    }
}

fn default_max_sql_length() -> usize {
    DEFAULT_MAX_SQL_LENGTH
}

fn default_max_expr_depth() -> usize {
    DEFAULT_MAX_EXPR_DEPTH
}

fn default_max_variable_number() -> u32 {
    DEFAULT_MAX_VARIABLE_NUMBER
}

impl ParseLimits {
    /// Copy of `self` with a different statement length cap.
    #[must_use]
    pub const fn with_max_sql_length(mut self, max: usize) -> Self {
        self.max_sql_length = max;
        self
    }

    /// Parse and validate limits from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let limits: Self =
            toml::from_str(text).map_err(|err| FrontendError::config(err.to_string()))?;
        limits.validate()?;
        Ok(limits)
    }

    /// Read limits from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let limits = Self::from_toml_str(&text)?;
        debug!(
            path = %path.display(),
            max_sql_length = limits.max_sql_length,
            max_expr_depth = limits.max_expr_depth,
            "parse limits loaded"
        );
        Ok(limits)
    }

    /// Reject limits that would make every parse fail.
    pub fn validate(&self) -> Result<()> {
        if self.max_sql_length == 0 {
            return Err(FrontendError::config("max_sql_length must be positive"));
        }
        if self.max_expr_depth == 0 {
            return Err(FrontendError::config("max_expr_depth must be positive"));
        }
        if self.max_variable_number == 0 {
            return Err(FrontendError::config("max_variable_number must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let limits = ParseLimits::default();
        assert_eq!(limits.max_sql_length, 1_000_000_000);
        assert_eq!(limits.max_expr_depth, 100);
        assert_eq!(limits.max_variable_number, 65000);
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let limits = ParseLimits::from_toml_str("max_sql_length = 64\n").unwrap();
        assert_eq!(limits.max_sql_length, 64);
        assert_eq!(limits.max_expr_depth, DEFAULT_MAX_EXPR_DEPTH);
        assert_eq!(limits.max_variable_number, DEFAULT_MAX_VARIABLE_NUMBER);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(
            ParseLimits::from_toml_str("").unwrap(),
            ParseLimits::default()
        );
    }

    #[test]
    fn zero_limit_rejected() {
        let err = ParseLimits::from_toml_str("max_expr_depth = 0").unwrap_err();
        assert!(matches!(err, FrontendError::InvalidConfig { .. }));
        assert!(err.to_string().contains("max_expr_depth"));
    }

    #[test]
    fn unknown_key_rejected() {
        let err = ParseLimits::from_toml_str("max_sql_lenght = 5").unwrap_err();
        assert!(matches!(err, FrontendError::InvalidConfig { .. }));
    }

    #[test]
    fn json_roundtrip_field_names() {
        let limits = ParseLimits::default().with_max_sql_length(10);
        let json = serde_json::to_value(limits).unwrap();
        assert_eq!(json["max_sql_length"], 10);
        assert_eq!(json["max_expr_depth"], 100);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = ParseLimits::load(Path::new("/nonexistent/sqlfront-limits.toml")).unwrap_err();
        assert!(matches!(err, FrontendError::Io(_)));
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(64))]

        #[test]
        fn positive_lengths_accepted(n in 1usize..=usize::MAX / 2) {
            let limits = ParseLimits::from_toml_str(&format!("max_sql_length = {n}"));
            proptest::prop_assert_eq!(limits.unwrap().max_sql_length, n);
        }
    }
}
