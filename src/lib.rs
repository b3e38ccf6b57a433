//! # completion-cache
//!
//! In-memory caching for LLM code completions.
//!
//! Querying a text-generation model is slow; re-querying it for an input it
//! has already answered is wasted latency. This crate caches completions in
//! a prefix-indexed store that keeps serving a suggestion *while the user
//! types it*: a lookup key that extends a cached key by part of its own
//! cached completion is still a hit, answered with the remaining tail.
//! Capacity is bounded by an LRU-approximating eviction policy that prefers
//! discarding short, low-value keys from the cold end of the recency order.
//!
//! ## Example
//!
//! ```rust
//! use completion_cache::prelude::*;
//!
//! let mut cache = CompletionCache::bounded(1024, 0.1)?;
//! cache.set("for i in ", "0..items.len() {");
//!
//! // Exact repeat of the request: full completion.
//! assert_eq!(cache.get("for i in ").as_deref(), Some("0..items.len() {"));
//!
//! // The user kept typing the suggestion: the tail is served locally.
//! assert_eq!(cache.get("for i in 0..item").as_deref(), Some("s.len() {"));
//! # Ok::<(), CacheError>(())
//! ```
//!
//! With the `ollama` feature (default), the crate also ships the remote
//! side of the loop: a [`CompletionBackend`](llm::CompletionBackend)
//! speaking Ollama's generate API with CodeLlama fill-in-the-middle
//! prompting, and a read-through [`CompletionService`](service::CompletionService)
//! that composes it with the cache.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod llm;
pub mod service;

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::cache::{
        CacheError, CompletionCache, CompletionTrie, PrioritizedLru, SharedCompletionCache,
    };
    pub use crate::llm::{CompletionBackend, CompletionModel, GenerationError};
    #[cfg(feature = "ollama")]
    pub use crate::llm::OllamaBackend;
    pub use crate::service::CompletionService;
}
