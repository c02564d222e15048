//! Parse observability counters.
//!
//! Lightweight process-local counters updated by the parse driver. Every
//! update is a relaxed atomic add; readers take a [`ParseMetricsSnapshot`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Why a parse call stopped before completing a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbortClass {
    /// The lexer produced an illegal token.
    Illegal,
    /// The consumed offset passed `max_sql_length`.
    TooLong,
    /// Cancellation observed between tokens.
    Interrupted,
    /// The grammar engine recorded an error or ran out of memory.
    Engine,
}

impl AbortClass {
    /// Stable label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Illegal => "illegal",
            Self::TooLong => "too_long",
            Self::Interrupted => "interrupted",
            Self::Engine => "engine",
        }
    }
}

/// Upper bounds (inclusive, microseconds) of the duration buckets. The last
/// bucket counts everything slower.
pub const DURATION_BUCKET_BOUNDS_US: [u64; 5] = [10, 100, 1_000, 10_000, 100_000];

const BUCKETS: usize = DURATION_BUCKET_BOUNDS_US.len() + 1;

/// Fixed-bucket histogram of parse call durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseDurationHistogram {
    pub buckets: [u64; BUCKETS],
}

impl ParseDurationHistogram {
    /// Index of the bucket that counts `elapsed`.
    #[must_use]
    pub fn bucket_for(elapsed: Duration) -> usize {
        let us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        DURATION_BUCKET_BOUNDS_US
            .iter()
            .position(|bound| us <= *bound)
            .unwrap_or(BUCKETS - 1)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.buckets.iter().sum()
    }
}

/// Totals of aborted parse calls by class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AbortTotals {
    pub illegal: u64,
    pub too_long: u64,
    pub interrupted: u64,
    pub engine: u64,
}

/// Snapshot of parse observability metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseMetricsSnapshot {
    /// Tokens returned by the lexer inside the driver, whitespace included.
    pub tokens_lexed: u64,
    /// Whitespace and comment tokens dropped by the driver.
    pub whitespace_tokens: u64,
    /// Statements the grammar engine reported complete.
    pub statements_completed: u64,
    pub aborts: AbortTotals,
    /// Pending artifacts released during cleanup.
    pub artifacts_released: u64,
    pub durations: ParseDurationHistogram,
}

static TOKENS_LEXED: AtomicU64 = AtomicU64::new(0);
static WHITESPACE_TOKENS: AtomicU64 = AtomicU64::new(0);
static STATEMENTS_COMPLETED: AtomicU64 = AtomicU64::new(0);
static ABORT_ILLEGAL: AtomicU64 = AtomicU64::new(0);
static ABORT_TOO_LONG: AtomicU64 = AtomicU64::new(0);
static ABORT_INTERRUPTED: AtomicU64 = AtomicU64::new(0);
static ABORT_ENGINE: AtomicU64 = AtomicU64::new(0);
static ARTIFACTS_RELEASED: AtomicU64 = AtomicU64::new(0);
static DURATION_BUCKETS: [AtomicU64; BUCKETS] = [const { AtomicU64::new(0) }; BUCKETS];

pub(crate) fn record_token(whitespace: bool) {
    TOKENS_LEXED.fetch_add(1, Ordering::Relaxed);
    if whitespace {
        WHITESPACE_TOKENS.fetch_add(1, Ordering::Relaxed);
    }
}

pub(crate) fn record_statement_completed() {
    STATEMENTS_COMPLETED.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_abort(class: AbortClass) {
    let counter = match class {
        AbortClass::Illegal => &ABORT_ILLEGAL,
        AbortClass::TooLong => &ABORT_TOO_LONG,
        AbortClass::Interrupted => &ABORT_INTERRUPTED,
        AbortClass::Engine => &ABORT_ENGINE,
    };
    counter.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_artifact_released() {
    ARTIFACTS_RELEASED.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_parse_duration(elapsed: Duration) {
    DURATION_BUCKETS[ParseDurationHistogram::bucket_for(elapsed)]
        .fetch_add(1, Ordering::Relaxed);
}

/// Return a snapshot of parse observability counters.
#[must_use]
pub fn parse_metrics_snapshot() -> ParseMetricsSnapshot {
    let mut durations = ParseDurationHistogram::default();
    for (slot, counter) in durations.buckets.iter_mut().zip(&DURATION_BUCKETS) {
        *slot = counter.load(Ordering::Relaxed);
    }
    ParseMetricsSnapshot {
        tokens_lexed: TOKENS_LEXED.load(Ordering::Relaxed),
        whitespace_tokens: WHITESPACE_TOKENS.load(Ordering::Relaxed),
        statements_completed: STATEMENTS_COMPLETED.load(Ordering::Relaxed),
        aborts: AbortTotals {
            illegal: ABORT_ILLEGAL.load(Ordering::Relaxed),
            too_long: ABORT_TOO_LONG.load(Ordering::Relaxed),
            interrupted: ABORT_INTERRUPTED.load(Ordering::Relaxed),
            engine: ABORT_ENGINE.load(Ordering::Relaxed),
        },
        artifacts_released: ARTIFACTS_RELEASED.load(Ordering::Relaxed),
        durations,
    }
}

/// Reset all parse observability counters.
pub fn reset_parse_metrics() {
    for counter in [
        &TOKENS_LEXED,
        &WHITESPACE_TOKENS,
        &STATEMENTS_COMPLETED,
        &ABORT_ILLEGAL,
        &ABORT_TOO_LONG,
        &ABORT_INTERRUPTED,
        &ABORT_ENGINE,
        &ARTIFACTS_RELEASED,
    ] {
        counter.store(0, Ordering::Relaxed);
    }
    for counter in &DURATION_BUCKETS {
        counter.store(0, Ordering::Relaxed);
    }
}
