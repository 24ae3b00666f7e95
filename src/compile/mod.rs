pub mod compiler;
pub mod defaults;
pub mod error;
pub mod settings;

pub use compiler::compile;
pub use error::ConfigError;
pub use settings::{
    parse_level, AbandonedRemoval, EvictionSettings, FastFailSettings, LoggingSettings, PoolSettings,
    QueueDiscipline, RemoveAbandonedSettings, TransactionIsolation, ValidationSettings,
};
