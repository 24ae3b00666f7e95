//! Values the pool library uses when a knob is left unbounded or unset.

/// Count or duration with no bound.
pub const UNBOUNDED: i64 = -1;

/// Block indefinitely when the pool is exhausted.
pub const DEFAULT_MAX_WAIT_MILLIS: i64 = UNBOUNDED;

/// No lifetime limit. Zero is never produced here.
pub const DEFAULT_MAX_CONN_LIFETIME_MILLIS: i64 = UNBOUNDED;

pub const DEFAULT_INITIAL_SIZE: u32 = 0;
pub const DEFAULT_MIN_IDLE: u32 = 0;

pub const DEFAULT_REMOVE_ABANDONED_TIMEOUT_SECONDS: u32 = 300;

// eviction
pub const DEFAULT_TIME_BETWEEN_EVICTION_RUNS_MILLIS: i64 = UNBOUNDED;
pub const DEFAULT_NUM_TESTS_PER_EVICTION_RUN: u32 = 3;
pub const DEFAULT_MIN_EVICTABLE_IDLE_TIME_MILLIS: i64 = 1_800_000; // 30 minutes
pub const DEFAULT_SOFT_MIN_EVICTABLE_IDLE_TIME_MILLIS: i64 = UNBOUNDED;

// validation
pub const DEFAULT_VALIDATION_TIMEOUT_SECONDS: i64 = UNBOUNDED;

/// SQLSTATEs and vendor codes that mark a connection as fatally broken.
pub const DEFAULT_DISCONNECTION_CODES: &[&str] = &[
    "57P01", // admin shutdown
    "57P02", // crash shutdown
    "57P03", // cannot connect now
    "01002", // disconnect error
    "JZ0C0", // connection is closed
    "JZ0C1", // connection is closed
];

pub const DEFAULT_LOG_LEVEL: tracing::Level = tracing::Level::INFO;
