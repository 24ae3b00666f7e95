pub mod limit;
pub mod types;

pub use limit::{Limit, ParseLimitError, INDEFINITE};
pub use types::{
    ConfigFragment, ConnectionProperty, DefaultsFragment, EvictionFragment, FastFailFragment,
    JdbcFragment, LoggingFragment, PoolFragment, PreparedStatementPoolingFragment,
    RemoveAbandonedFragment, SizeFragment, ValidationFragment,
};
