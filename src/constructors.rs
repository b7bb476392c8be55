//! Construction helpers for the common lazy value shapes.

use std::hash::Hash;
use std::time::Duration;

use crate::config::LazyConfig;
use crate::fixed::Static;
use crate::loader::WithLoader;

/// Lazy value that loads each key once and keeps it until invalidated.
pub fn with_loader<K, T, E, F>(loader: F) -> WithLoader<K, T, E>
where
    K: Eq + Hash + Clone,
    T: Clone,
    F: Fn(&K) -> Result<T, E> + Send + Sync + 'static,
{
    WithLoader::new(loader)
}

/// Like [`with_loader`], but values older than `ttl` are reloaded on access.
pub fn with_loader_ttl<K, T, E, F>(loader: F, ttl: Duration) -> WithLoader<K, T, E>
where
    K: Eq + Hash + Clone,
    T: Clone,
    F: Fn(&K) -> Result<T, E> + Send + Sync + 'static,
{
    WithLoader::with_ttl(loader, ttl)
}

/// Lazy value already holding `value` for `key`.
///
/// The loader still serves other keys, and `key` itself once invalidated.
pub fn preloaded<K, T, E, F>(loader: F, key: K, value: T) -> WithLoader<K, T, E>
where
    K: Eq + Hash + Clone,
    T: Clone,
    F: Fn(&K) -> Result<T, E> + Send + Sync + 'static,
{
    WithLoader::new(loader).with_preloaded(key, value)
}

/// Like [`preloaded`] with TTL mode on.
///
/// The preloaded value carries no timestamp and does not expire until it has
/// been reloaded once.
pub fn preloaded_ttl<K, T, E, F>(loader: F, key: K, value: T, ttl: Duration) -> WithLoader<K, T, E>
where
    K: Eq + Hash + Clone,
    T: Clone,
    F: Fn(&K) -> Result<T, E> + Send + Sync + 'static,
{
    WithLoader::with_ttl(loader, ttl).with_preloaded(key, value)
}

/// Lazy value built from a [`LazyConfig`].
pub fn from_config<K, T, E, F>(loader: F, config: &LazyConfig) -> WithLoader<K, T, E>
where
    K: Eq + Hash + Clone,
    T: Clone,
    F: Fn(&K) -> Result<T, E> + Send + Sync + 'static,
{
    WithLoader::from_config(loader, config)
}

/// Lazy value that always returns `value`.
pub fn fixed<T>(value: T) -> Static<T> {
    Static::new(value)
}
