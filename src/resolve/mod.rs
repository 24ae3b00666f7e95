pub mod filter;
pub mod resolved;
pub mod resolver;

pub use filter::FragmentFilter;
pub use resolved::{
    ResolvedConfig, ResolvedDefaults, ResolvedEviction, ResolvedJdbc, ResolvedLogging,
    ResolvedPool, ResolvedSize, ResolvedValidation,
};
pub use resolver::{resolve, resolve_with};
