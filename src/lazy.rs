//! Lazy Value Interfaces
//!
//! The handle types callers hold. Which implementation backs a handle is
//! decided at construction time.

use async_trait::async_trait;

// == Lazy Trait ==
/// A keyed value produced on demand and cached.
///
/// `E` is whatever error the loader returns; it is handed back untouched.
pub trait Lazy<K, T, E = anyhow::Error>: Send + Sync {
    /// Returns the value for `key`, running the loader if nothing fresh is
    /// cached.
    fn get(&self, key: &K) -> Result<T, E>;

    /// Drops the cached value for `key`.
    fn invalidate(&self, key: &K);

    /// Drops every cached value.
    fn invalidate_all(&self);
}

// == Async Lazy Trait ==
/// Async counterpart of [`Lazy`] for loaders that await.
#[async_trait]
pub trait AsyncLazy<K, T, E = anyhow::Error>: Send + Sync
where
    K: Send + Sync + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    /// Returns the value for `key`, awaiting the loader if nothing fresh is
    /// cached.
    async fn get(&self, key: &K) -> Result<T, E>;

    /// Drops the cached value for `key`.
    async fn invalidate(&self, key: &K);

    /// Drops every cached value.
    async fn invalidate_all(&self);
}
