use thiserror::Error;

use super::sink::LogSink;

/// Driver-level diagnostic attached to a failure (SQLSTATE and vendor code).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostic {
    pub sql_state: Option<String>,
    pub vendor_code: i32,
}

impl Diagnostic {
    pub fn new(sql_state: impl Into<String>, vendor_code: i32) -> Self {
        Self {
            sql_state: Some(sql_state.into()),
            vendor_code,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool could not hand out a connection. `cause` is the message of
    /// the underlying failure (exhaustion, factory error, ...).
    #[error("Cannot obtain connection: {message}")]
    CannotObtain {
        message: String,
        cause: Option<String>,
        diagnostic: Diagnostic,
    },

    #[error("Pool is closed")]
    Closed,

    #[error("{message}")]
    Other {
        message: String,
        diagnostic: Diagnostic,
    },
}

impl PoolError {
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            PoolError::CannotObtain { diagnostic, .. } | PoolError::Other { diagnostic, .. } => {
                Some(diagnostic)
            }
            PoolError::Closed => None,
        }
    }
}

/// The surface of a pooled-resource handle that `DeferredInitGuard` needs.
///
/// Implementations may realize their internal pool lazily, including from
/// inside `set_sink`.
pub trait PooledResource: Send + Sync {
    type Connection;

    fn acquire(&self) -> Result<Self::Connection, PoolError>;

    fn set_sink(&self, sink: LogSink) -> Result<(), PoolError>;

    fn sink(&self) -> Result<Option<LogSink>, PoolError>;

    /// Receives the sink for abandoned-connection traces. Pools without
    /// abandoned tracking ignore it.
    fn set_abandoned_sink(&self, _sink: LogSink) -> Result<(), PoolError> {
        Ok(())
    }
}
