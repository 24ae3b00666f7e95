//! Resolves overlapping pool configuration fragments into validated pool
//! settings, and guards a pool handle against premature initialization.
//!
//! ```text
//! fragments ──resolve──▶ ResolvedConfig ──compile──▶ PoolSettings ──build──▶ DeferredInitGuard
//! ```
pub mod compile;
pub mod config;
pub mod datasource;
pub mod fragment;
pub mod guard;
pub mod resolve;

pub use compile::{compile, ConfigError, PoolSettings};
pub use config::{load_fragments, load_fragments_from_path, SourceError};
pub use datasource::{create_pool, pool_settings, DataSourceError};
pub use fragment::{ConfigFragment, Limit};
pub use guard::{AcquireError, DeferredInitGuard, LogSink, PoolError, PooledResource};
pub use resolve::{resolve, FragmentFilter, ResolvedConfig};
