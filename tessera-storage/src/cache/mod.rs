//! Process-local record cache.
//!
//! The cache holds hydrated copies of records keyed by id. It has no TTL and
//! no eviction; entries live until explicitly invalidated. The orchestrator,
//! not the cache, decides when that happens.
//!
//! Cache operations cannot fail from the caller's point of view. A backend
//! that hits an internal error reports a miss and logs it.

pub mod memory;
pub mod traits;

pub use memory::InMemoryRecordCache;
pub use traits::{CacheStats, RecordCache};
