//! Loader-backed Lazy Values
//!
//! [`WithLoader`] caches whatever its loader returns, per key, with optional
//! TTL expiry. Every operation runs under one instance-wide mutex, and the
//! mutex stays held while the loader runs: at most one load is in flight per
//! instance, whichever keys are involved. A slow loader therefore stalls all
//! other callers of the same instance.

use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::cache::{CacheState, ExpiryPolicy, LazyStats, Lookup};
use crate::config::LazyConfig;
use crate::lazy::Lazy;

/// Boxed loader called with the key being resolved.
pub type LoaderFn<K, T, E> = Box<dyn Fn(&K) -> Result<T, E> + Send + Sync>;

/// Where uncached values come from.
enum Source<K, T, E> {
    Loader(LoaderFn<K, T, E>),
    /// No loader configured; uncached keys get this zero value.
    Unset(T),
}

// == With Loader ==
/// A lazy value computed by a caller-supplied loader.
pub struct WithLoader<K, T, E = anyhow::Error> {
    state: Mutex<CacheState<K, T>>,
    source: Source<K, T, E>,
    policy: ExpiryPolicy,
}

impl<K, T, E> WithLoader<K, T, E>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    // == Constructors ==
    /// Creates a lazy value without TTL: loaded values stay cached until
    /// invalidated.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn(&K) -> Result<T, E> + Send + Sync + 'static,
    {
        Self::with_policy(loader, ExpiryPolicy::disabled())
    }

    /// Creates a lazy value whose entries are reloaded once older than `ttl`.
    pub fn with_ttl<F>(loader: F, ttl: Duration) -> Self
    where
        F: Fn(&K) -> Result<T, E> + Send + Sync + 'static,
    {
        Self::with_policy(loader, ExpiryPolicy::ttl(ttl))
    }

    /// Creates a lazy value with an explicit expiry policy.
    pub fn with_policy<F>(loader: F, policy: ExpiryPolicy) -> Self
    where
        F: Fn(&K) -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            state: Mutex::new(CacheState::new()),
            source: Source::Loader(Box::new(loader)),
            policy,
        }
    }

    // == From Config ==
    /// Creates a lazy value with the expiry settings of `config`.
    pub fn from_config<F>(loader: F, config: &LazyConfig) -> Self
    where
        F: Fn(&K) -> Result<T, E> + Send + Sync + 'static,
    {
        Self::with_policy(loader, config.policy())
    }

    // == Preload ==
    /// Seeds the cache with `value` for `key`.
    ///
    /// The seeded value has no timestamp, so under TTL it stays fresh until
    /// it is invalidated or reloaded for another reason. Values already cached
    /// are kept, so seeds can be chained.
    pub fn with_preloaded(mut self, key: K, value: T) -> Self {
        self.state.get_mut().seed(key, value);
        self
    }

    // == Inspection ==
    /// Returns the number of cached values, expired ones included.
    pub fn len(&self) -> usize {
        self.state.lock().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.state.lock().is_empty()
    }

    /// Returns true if a value is cached for `key`, expired or not.
    pub fn contains(&self, key: &K) -> bool {
        self.state.lock().contains(key)
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
    /// Time until the value cached for `key` expires.
    ///
    /// `None` when nothing is cached, TTL mode is off, or the value was
    /// preloaded and carries no timestamp. `Some(Duration::ZERO)` means the
    /// next `get` reloads.
    pub fn time_remaining(&self, key: &K) -> Option<Duration> {
        self.state.lock().remaining(key, &self.policy)
    }

    // == Stats ==
    /// Returns a snapshot of the activity counters.
    pub fn stats(&self) -> LazyStats {
        self.state.lock().stats()
    }

    // == Get ==
    /// Returns the value for `key`.
    ///
    /// Fresh cached values are returned without calling the loader. Otherwise
    /// the loader runs with the instance lock held; a successful result is
    /// cached and the loader's result is returned as is. Without a loader the
    /// zero value is returned and nothing is cached.
    ///
    /// The loader must not call back into this instance.
    pub fn get(&self, key: &K) -> Result<T, E> {
        let mut state = self.state.lock();

        let expired = match state.lookup(key, &self.policy) {
            Lookup::Fresh(value) => {
                trace!("Lazy value served from cache");
                return Ok(value);
            }
            Lookup::Miss { expired } => expired,
        };

        let loader = match &self.source {
            Source::Loader(loader) => loader,
            Source::Unset(zero) => {
                state.stats_mut().record_fallback();
                debug!("No loader configured, returning zero value");
                return Ok(zero.clone());
            }
        };

        debug!(expired, cached = state.len(), "Invoking loader");
        let result = loader(key);
        state.record_load(key, &result, &self.policy, Instant::now());

        if result.is_ok() {
            debug!(cached = state.len(), "Loader succeeded");
        } else {
            warn!(
                reset_ttl = self.policy.should_stamp(false),
                "Loader failed, nothing cached"
            );
        }

        result
    }

    // == Invalidate ==
    /// Drops the cached value and timestamp for `key`.
    pub fn invalidate(&self, key: &K) {
        let mut state = self.state.lock();
        if state.remove(key) {
            state.stats_mut().record_invalidation();
            debug!(cached = state.len(), "Invalidated lazy value");
        }
    }

    // == Invalidate All ==
    /// Drops every cached value and timestamp.
    pub fn invalidate_all(&self) {
        let mut state = self.state.lock();
        let dropped = state.len();
        state.clear();
        state.stats_mut().record_invalidation();
        debug!(dropped, "Invalidated all lazy values");
    }
}

impl<K, T, E> WithLoader<K, T, E>
where
    K: Eq + Hash + Clone,
    T: Clone + Default,
{
    // == Unset ==
    /// Creates a lazy value with no loader.
    ///
    /// Uncached keys resolve to `T::default()` without error.
    pub fn unset(policy: ExpiryPolicy) -> Self {
        Self {
            state: Mutex::new(CacheState::new()),
            source: Source::Unset(T::default()),
            policy,
        }
    }
}

impl<K, T, E> Lazy<K, T, E> for WithLoader<K, T, E>
where
    K: Eq + Hash + Clone + Send,
    T: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> Result<T, E> {
        WithLoader::get(self, key)
    }

    fn invalidate(&self, key: &K) {
        WithLoader::invalidate(self, key)
    }

    fn invalidate_all(&self) {
        WithLoader::invalidate_all(self)
    }
}

impl<K, T, E> fmt::Debug for WithLoader<K, T, E>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WithLoader")
            .field("policy", &self.policy)
            .field("has_loader", &matches!(self.source, Source::Loader(_)))
            .field("cached", &self.state.lock().len())
            .finish_non_exhaustive()
    }
}
