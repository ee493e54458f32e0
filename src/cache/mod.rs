//! FIFO-bounded query cache keyed by `(model, prompt)`.

pub mod query;
pub mod types;


pub use query::{QueryCache, QueryCacheHandle};
pub use types::{CacheKey, CacheStats, CacheStatus};
