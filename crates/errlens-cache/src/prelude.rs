pub use crate::errors::CacheError;
pub use crate::memory::MemoryCache;
pub use crate::stats::{SimpleStats, StatsSnapshot};
pub use crate::store::{CacheKey, ExplanationCache};
