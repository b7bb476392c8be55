//! Mini Lazy - Lazily loaded, keyed values with optional TTL
//!
//! A [`Lazy`] handle produces a value per key on first access by calling a
//! loader, caches it, and optionally reloads it once it outlives a TTL.
//! [`Static`] backs the same handle with a fixed value.

pub mod async_loader;
pub mod cache;
pub mod config;
pub mod constructors;
pub mod error;
pub mod fixed;
pub mod lazy;
pub mod loader;

pub use async_loader::AsyncWithLoader;
pub use cache::{ExpiryPolicy, LazyStats};
pub use config::LazyConfig;
pub use constructors::{fixed, from_config, preloaded, preloaded_ttl, with_loader, with_loader_ttl};
pub use error::{LazyError, Result};
pub use fixed::Static;
pub use lazy::{AsyncLazy, Lazy};
pub use loader::WithLoader;
