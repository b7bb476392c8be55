//! Static lazy values.

use async_trait::async_trait;

use crate::lazy::{AsyncLazy, Lazy};

// == Static ==
/// A lazy value that always yields the same value.
///
/// No loader, no cache: every key gets a clone of `value` and invalidation
/// does nothing. Handy for tests and constants behind a [`Lazy`] handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Static<T> {
    value: T,
}

impl<T> Static<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Borrows the fixed value.
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<K, T, E> Lazy<K, T, E> for Static<T>
where
    T: Clone + Send + Sync,
{
    fn get(&self, _key: &K) -> Result<T, E> {
        Ok(self.value.clone())
    }

    fn invalidate(&self, _key: &K) {}

    fn invalidate_all(&self) {}
}

#[async_trait]
impl<K, T, E> AsyncLazy<K, T, E> for Static<T>
where
    K: Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    E: Send + 'static,
{
    async fn get(&self, _key: &K) -> Result<T, E> {
        Ok(self.value.clone())
    }

    async fn invalidate(&self, _key: &K) {}

    async fn invalidate_all(&self) {}
}
