use thiserror::Error;

use super::pool::{Diagnostic, PoolError};

/// Marker the pool library puts in the cause of an exhausted-pool failure.
pub const WAIT_TIMEOUT_INDICATOR: &str = "Timeout waiting for idle object";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    /// Timed out waiting for a connection; retrying may succeed.
    #[error("Transient acquisition failure: {cause}")]
    Transient { cause: String, diagnostic: Diagnostic },

    #[error("Non-transient acquisition failure: {cause}")]
    NonTransient { cause: String, diagnostic: Diagnostic },

    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl AcquireError {
    /// Reclassifies a "cannot obtain" failure by its cause. Every other pool
    /// error is passed through untouched.
    pub fn classify(err: PoolError) -> Self {
        match err {
            PoolError::CannotObtain {
                message,
                cause,
                diagnostic,
            } => match cause {
                Some(cause) if cause.contains(WAIT_TIMEOUT_INDICATOR) => {
                    AcquireError::Transient { cause, diagnostic }
                }
                Some(cause) => AcquireError::NonTransient { cause, diagnostic },
                None => AcquireError::NonTransient {
                    cause: message,
                    diagnostic,
                },
            },
            other => AcquireError::Pool(other),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, AcquireError::Transient { .. })
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            AcquireError::Transient { diagnostic, .. }
            | AcquireError::NonTransient { diagnostic, .. } => Some(diagnostic),
            AcquireError::Pool(err) => err.diagnostic(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cannot_obtain(cause: Option<&str>) -> PoolError {
        PoolError::CannotObtain {
            message: "Cannot get a connection, pool error".to_string(),
            cause: cause.map(str::to_string),
            diagnostic: Diagnostic::new("08001", 4711),
        }
    }

    #[test]
    fn test_wait_timeout_is_transient() {
        let err = AcquireError::classify(cannot_obtain(Some(
            "Timeout waiting for idle object, borrowMaxWaitDuration=PT1S",
        )));
        assert!(err.is_transient());
        assert_eq!(err.diagnostic(), Some(&Diagnostic::new("08001", 4711)));
    }

    #[test]
    fn test_other_causes_are_non_transient() {
        let err = AcquireError::classify(cannot_obtain(Some("Connection refused")));
        assert!(matches!(err, AcquireError::NonTransient { ref cause, .. } if cause == "Connection refused"));
        assert_eq!(err.diagnostic().unwrap().vendor_code, 4711);

        let err = AcquireError::classify(cannot_obtain(None));
        assert!(!err.is_transient());
        assert_eq!(err.diagnostic().unwrap().sql_state.as_deref(), Some("08001"));
    }

    #[test]
    fn test_other_errors_pass_through() {
        assert_eq!(
            AcquireError::classify(PoolError::Closed),
            AcquireError::Pool(PoolError::Closed)
        );
    }
}
