//! Cache Module
//!
//! Storage, expiry and statistics shared by the blocking and async lazy
//! value implementations.

mod expiry;
mod stats;
mod store;


// Re-export public types
pub use expiry::ExpiryPolicy;
pub use stats::LazyStats;
pub use store::{CacheState, Lookup};
