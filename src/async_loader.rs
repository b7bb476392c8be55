//! Async Loader-backed Lazy Values
//!
//! [`AsyncWithLoader`] is the async twin of [`crate::WithLoader`] for loaders
//! that await I/O. The instance lock is a `tokio::sync::Mutex` held across the
//! loader's `.await`, so the same single-load-in-flight rule applies.

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::cache::{CacheState, ExpiryPolicy, LazyStats, Lookup};
use crate::config::LazyConfig;
use crate::lazy::AsyncLazy;

/// Boxed future produced by an async loader.
pub type LoadFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;

/// Boxed async loader, called with an owned copy of the key.
pub type AsyncLoaderFn<K, T, E> = Box<dyn Fn(K) -> LoadFuture<T, E> + Send + Sync>;

enum AsyncSource<K, T, E> {
    Loader(AsyncLoaderFn<K, T, E>),
    Unset(T),
}

// == Async With Loader ==
/// A lazy value computed by an async loader.
pub struct AsyncWithLoader<K, T, E = anyhow::Error> {
    state: Mutex<CacheState<K, T>>,
    source: AsyncSource<K, T, E>,
    policy: ExpiryPolicy,
}

impl<K, T, E> AsyncWithLoader<K, T, E>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    // == Constructors ==
    /// Creates an async lazy value without TTL.
    pub fn new<F, Fut>(loader: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::with_policy(loader, ExpiryPolicy::disabled())
    }

    /// Creates an async lazy value whose entries are reloaded once older than
    /// `ttl`.
    pub fn with_ttl<F, Fut>(loader: F, ttl: Duration) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::with_policy(loader, ExpiryPolicy::ttl(ttl))
    }

    /// Creates an async lazy value with an explicit expiry policy.
    pub fn with_policy<F, Fut>(loader: F, policy: ExpiryPolicy) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let loader: AsyncLoaderFn<K, T, E> =
            Box::new(move |key| -> LoadFuture<T, E> { Box::pin(loader(key)) });
        Self {
            state: Mutex::new(CacheState::new()),
            source: AsyncSource::Loader(loader),
            policy,
        }
    }

    // == From Config ==
    /// Creates an async lazy value with the expiry settings of `config`.
    pub fn from_config<F, Fut>(loader: F, config: &LazyConfig) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::with_policy(loader, config.policy())
    }

    // == Preload ==
    /// Seeds the cache with `value` for `key`, without a timestamp. Values
    /// already cached are kept.
    pub fn with_preloaded(mut self, key: K, value: T) -> Self {
        self.state.get_mut().seed(key, value);
        self
    }

    // == Inspection ==
    /// Returns the number of cached values, expired ones included.
    pub async fn len(&self) -> usize {
        self.state.lock().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.is_empty()
    }

    /// Returns true if a value is cached for `key`, expired or not.
    pub async fn contains(&self, key: &K) -> bool {
        self.state.lock().await.contains(key)
    }

    /// The TTL window, `None` when TTL mode is off.
    pub fn ttl(&self) -> Option<Duration> {
        self.policy.window()
    }

    /// The expiry policy this value was built with.
    pub fn policy(&self) -> ExpiryPolicy {
        self.policy
    }

    // == Time Remaining ==
    /// Time until the value cached for `key` expires, `None` when it never
    /// will or nothing is cached.
    pub async fn time_remaining(&self, key: &K) -> Option<Duration> {
        self.state.lock().await.remaining(key, &self.policy)
    }

    // == Stats ==
    /// Returns a snapshot of the activity counters.
    pub async fn stats(&self) -> LazyStats {
        self.state.lock().await.stats()
    }

    // == Get ==
    /// Returns the value for `key`, awaiting the loader when nothing fresh is
    /// cached. Callers queue on the instance lock while a load is pending.
    pub async fn get(&self, key: &K) -> Result<T, E> {
        let mut state = self.state.lock().await;

        let expired = match state.lookup(key, &self.policy) {
            Lookup::Fresh(value) => {
                trace!("Lazy value served from cache");
                return Ok(value);
            }
            Lookup::Miss { expired } => expired,
        };

        let loader = match &self.source {
            AsyncSource::Loader(loader) => loader,
            AsyncSource::Unset(zero) => {
                state.stats_mut().record_fallback();
                debug!("No loader configured, returning zero value");
                return Ok(zero.clone());
            }
        };

        debug!(expired, cached = state.len(), "Awaiting async loader");
        let result = loader(key.clone()).await;
        state.record_load(key, &result, &self.policy, Instant::now());

        if result.is_err() {
            warn!(
                reset_ttl = self.policy.should_stamp(false),
                "Async loader failed, nothing cached"
            );
        }

        result
    }

    // == Invalidate ==
    /// Drops the cached value and timestamp for `key`.
    pub async fn invalidate(&self, key: &K) {
        let mut state = self.state.lock().await;
        if state.remove(key) {
            state.stats_mut().record_invalidation();
            debug!(cached = state.len(), "Invalidated lazy value");
        }
    }

    // == Invalidate All ==
    /// Drops every cached value and timestamp.
    pub async fn invalidate_all(&self) {
        let mut state = self.state.lock().await;
        let dropped = state.len();
        state.clear();
        state.stats_mut().record_invalidation();
        debug!(dropped, "Invalidated all lazy values");
    }
}

impl<K, T, E> AsyncWithLoader<K, T, E>
where
    K: Eq + Hash + Clone,
    T: Clone + Default,
{
    // == Unset ==
    /// Creates an async lazy value with no loader; uncached keys resolve to
    /// `T::default()`.
    pub fn unset(policy: ExpiryPolicy) -> Self {
        Self {
            state: Mutex::new(CacheState::new()),
            source: AsyncSource::Unset(T::default()),
            policy,
        }
    }
}

#[async_trait]
impl<K, T, E> AsyncLazy<K, T, E> for AsyncWithLoader<K, T, E>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    E: Send + 'static,
{
    async fn get(&self, key: &K) -> Result<T, E> {
        AsyncWithLoader::get(self, key).await
    }

    async fn invalidate(&self, key: &K) {
        AsyncWithLoader::invalidate(self, key).await
    }

    async fn invalidate_all(&self) {
        AsyncWithLoader::invalidate_all(self).await
    }
}

impl<K, T, E> fmt::Debug for AsyncWithLoader<K, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncWithLoader")
            .field("policy", &self.policy)
            .field("has_loader", &matches!(self.source, AsyncSource::Loader(_)))
            .finish_non_exhaustive()
    }
}
