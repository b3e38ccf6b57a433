//! In-memory completion caching.
//!
//! This module composes two leaf structures that never reference each other:
//!
//! - [`CompletionTrie`]: a prefix store whose lookups tolerate queries that
//!   extend a stored key by part of its own stored value
//! - [`PrioritizedLru`]: a bounded recency tracker that picks eviction
//!   victims by scanning a window at the cold end for the lowest priority
//!
//! [`CompletionCache`] is the only place that keeps the two consistent: a
//! hit refreshes recency, a write registers the key with the tracker, and a
//! tracker eviction synchronously removes the evicted key from the trie.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    CompletionCache                       │
//! │  ┌────────────────────┐     ┌──────────────────────────┐ │
//! │  │ CompletionTrie     │     │ PrioritizedLru<String>   │ │
//! │  │  keys → values     │     │  keys → recency+priority │ │
//! │  └────────────────────┘     └──────────────────────────┘ │
//! │     get: find ──────────────── mark_accessed             │
//! │     set: insert ─────────────── put_and_evict ──┐        │
//! │          remove(evicted)  ◀─────────────────────┘        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust
//! use completion_cache::cache::CompletionCache;
//!
//! let mut cache = CompletionCache::new().unwrap();
//! cache.set("for i in ", "0..10 {");
//!
//! assert_eq!(cache.get("for i in ").as_deref(), Some("0..10 {"));
//! assert_eq!(cache.get("for i in 0..").as_deref(), Some("10 {"));
//! ```

pub mod error;
pub mod eviction;
pub mod store;

pub use error::{CacheError, Result};
pub use eviction::PrioritizedLru;
pub use store::CompletionTrie;

use std::sync::Arc;

use parking_lot::Mutex;

/// Default number of completions a bounded cache keeps.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Default share of the recency ordering examined per eviction.
pub const DEFAULT_EVICTION_FRACTION: f64 = 0.1;

/// A completion cache pairing a prefix store with an eviction tracker.
///
/// Writes register the key with the tracker using the key's character count
/// as its priority, so longer (more reusable) keys are preferred survivors
/// when an eviction window holds several candidates. A cache built with
/// [`CompletionCache::unbounded`] carries no tracker at all: it never evicts
/// and grows without bound, which is occasionally useful for short-lived
/// sessions but not recommended as a default.
///
/// Operations take `&mut self`; for concurrent callers see
/// [`SharedCompletionCache`].
#[derive(Debug, Clone)]
pub struct CompletionCache {
    store: CompletionTrie,
    tracker: Option<PrioritizedLru<String>>,
}

impl CompletionCache {
    /// Creates a bounded cache with the default capacity and eviction
    /// fraction.
    pub fn new() -> Result<Self> {
        Self::bounded(DEFAULT_CAPACITY, DEFAULT_EVICTION_FRACTION)
    }

    /// Creates a bounded cache.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidConfiguration`] for a zero capacity or
    /// an eviction fraction outside (0, 1).
    pub fn bounded(capacity: usize, eviction_fraction: f64) -> Result<Self> {
        Ok(CompletionCache {
            store: CompletionTrie::new(),
            tracker: Some(PrioritizedLru::new(capacity, eviction_fraction)?),
        })
    }

    /// Creates a cache that never evicts.
    pub fn unbounded() -> Self {
        CompletionCache {
            store: CompletionTrie::new(),
            tracker: None,
        }
    }

    /// Number of cached completions.
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Retrieves the completion for `key`, extension matches included.
    ///
    /// A hit refreshes the recency of the original query key (not the key
    /// of the matched trie node), mirroring how the write path tracks keys.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let value = self.store.find(key)?.to_owned();
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.mark_accessed(key);
        }
        Some(value)
    }

    /// Caches `value` under `key`, evicting from the trie if the tracker
    /// reports an overflow.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.store.insert(key, value);
        if let Some(tracker) = self.tracker.as_mut() {
            let priority = key.chars().count();
            if let Some(evicted) = tracker.put_and_evict_if_needed(key.to_owned(), priority) {
                tracing::trace!(key = %evicted, "evicting cached completion");
                self.store.remove(&evicted);
            }
        }
    }

    /// Discards every cached completion, e.g. on session teardown.
    pub fn clear(&mut self) {
        self.store.clear();
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.clear();
        }
    }
}

/// A clonable, thread-safe handle to one [`CompletionCache`].
///
/// The trie and the tracker must be mutated together atomically from the
/// caller's perspective: a read must never interleave with a write that is
/// mid-eviction. The whole cache therefore sits behind a single exclusive lock
/// rather than one lock per leaf structure.
///
/// # Examples
///
/// ```rust
/// use completion_cache::cache::SharedCompletionCache;
///
/// let cache = SharedCompletionCache::with_defaults().unwrap();
/// let worker = cache.clone();
///
/// std::thread::spawn(move || worker.set("fn main", "() {}"))
///     .join()
///     .unwrap();
/// assert_eq!(cache.get("fn main").as_deref(), Some("() {}"));
/// ```
#[derive(Debug, Clone)]
pub struct SharedCompletionCache {
    inner: Arc<Mutex<CompletionCache>>,
}

impl SharedCompletionCache {
    /// Wraps an existing cache.
    pub fn new(cache: CompletionCache) -> Self {
        SharedCompletionCache {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// Creates a bounded cache with the default parameters.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(CompletionCache::new()?))
    }

    /// Creates a bounded cache behind a shared handle.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidConfiguration`] for a zero capacity or
    /// an eviction fraction outside (0, 1).
    pub fn bounded(capacity: usize, eviction_fraction: f64) -> Result<Self> {
        Ok(Self::new(CompletionCache::bounded(
            capacity,
            eviction_fraction,
        )?))
    }

    /// Retrieves the completion for `key` under the lock.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().get(key)
    }

    /// Caches `value` under `key` under the lock.
    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.inner.lock().set(key, value);
    }

    /// Discards every cached completion.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Number of cached completions.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
