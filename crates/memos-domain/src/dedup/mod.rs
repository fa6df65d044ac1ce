//! In-flight request deduplication.
//!
//! Concurrent callers asking for the same logical read share one execution:
//!
//! 1. **Registry**: at most one pending entry per key, removed on settlement
//! 2. **Fan-out**: every joined caller receives the same value or failure
//!
//! Nothing is cached past settlement. A call made after the shared request
//! finished always starts a new one.

mod key;
mod singleflight;

pub use key::RequestKey;
pub use singleflight::RequestDeduplicator;
