pub mod deferred;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod sink;

pub use deferred::DeferredInitGuard;
pub use error::{AcquireError, WAIT_TIMEOUT_INDICATOR};
pub use pool::{Diagnostic, PoolError, PooledResource};
pub use sink::LogSink;
