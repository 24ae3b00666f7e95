use std::sync::Arc;
use tracing::{debug, error, info, trace, warn, Level};

/// Log writer handed to a pool: every line becomes a `tracing` event at the
/// configured level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSink {
    level: Level,
    pool: Option<Arc<str>>,
}

impl LogSink {
    pub fn new(level: Level) -> Self {
        Self { level, pool: None }
    }

    pub fn named(level: Level, pool: impl Into<Arc<str>>) -> Self {
        Self {
            level,
            pool: Some(pool.into()),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn pool(&self) -> Option<&str> {
        self.pool.as_deref()
    }

    pub fn write_line(&self, line: &str) {
        let pool = self.pool.as_deref().unwrap_or("-");
        let line = line.trim_end();
        match self.level {
            Level::ERROR => error!(pool, "{}", line),
            Level::WARN => warn!(pool, "{}", line),
            Level::INFO => info!(pool, "{}", line),
            Level::DEBUG => debug!(pool, "{}", line),
            _ => trace!(pool, "{}", line),
        }
    }
}
