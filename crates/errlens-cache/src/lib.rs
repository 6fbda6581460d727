pub mod errors;
pub mod memory;
pub mod prelude;
pub mod stats;
pub mod store;

pub use errors::CacheError;
pub use memory::MemoryCache;
pub use stats::{SimpleStats, StatsSnapshot};
pub use store::{CacheKey, ExplanationCache};
