//! Read-through completion service.
//!
//! Bridges the cache and a completion backend: a completion request is
//! answered from [`SharedCompletionCache`] when possible and only reaches
//! the backend on a miss, after which the fresh suggestion is cached under
//! the prefix that produced it.

use crate::cache::{self, SharedCompletionCache};
use crate::llm::{CompletionBackend, Result};

/// Longest prefix (in characters) sent to a backend.
pub const MAX_PREFIX_CHARS: usize = 2000;

/// Longest suffix (in characters) sent to a backend.
pub const MAX_SUFFIX_CHARS: usize = 200;

/// A caching front for a [`CompletionBackend`].
///
/// # Examples
///
/// ```rust,no_run
/// use completion_cache::llm::OllamaBackend;
/// use completion_cache::service::CompletionService;
///
/// let service = CompletionService::new(OllamaBackend::new()).unwrap();
/// let suggestion = service.complete("fn main() {", "}")?;
/// # Ok::<(), completion_cache::llm::GenerationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CompletionService<B> {
    cache: SharedCompletionCache,
    backend: B,
}

impl<B: CompletionBackend> CompletionService<B> {
    /// Creates a service with a default bounded cache.
    pub fn new(backend: B) -> cache::Result<Self> {
        Ok(Self::with_cache(SharedCompletionCache::with_defaults()?, backend))
    }

    /// Creates a service over an existing cache handle.
    pub fn with_cache(cache: SharedCompletionCache, backend: B) -> Self {
        CompletionService { cache, backend }
    }

    /// The cache handle backing this service.
    pub fn cache(&self) -> &SharedCompletionCache {
        &self.cache
    }

    /// Produces a completion for the cursor position between `prefix` and
    /// `suffix`, consulting the cache first.
    ///
    /// The cache is keyed by prefix alone: the suffix participates in
    /// prompting but not in lookup, matching how suggestions remain valid
    /// while the user keeps typing the suggested text.
    pub fn complete(&self, prefix: &str, suffix: &str) -> Result<String> {
        if let Some(cached) = self.cache.get(prefix) {
            tracing::debug!("completion served from cache");
            return Ok(cached);
        }

        let completion = self.backend.complete(prefix, suffix)?;
        self.cache.set(prefix, completion.as_str());
        Ok(completion)
    }

    /// Produces a completion for a cursor inside `text`, bounding the
    /// context sent to the backend to [`MAX_PREFIX_CHARS`] and
    /// [`MAX_SUFFIX_CHARS`].
    pub fn complete_at(&self, text: &str, cursor: usize) -> Result<String> {
        let (prefix, suffix) = split_at_cursor(text, cursor);
        self.complete(
            char_tail(prefix, MAX_PREFIX_CHARS),
            char_head(suffix, MAX_SUFFIX_CHARS),
        )
    }

    /// Discards every cached completion, e.g. on session teardown.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// Splits `text` around a cursor byte offset into a prefix and suffix.
///
/// An offset inside a multi-byte character snaps back to the nearest
/// character boundary; an offset past the end splits at the end.
pub fn split_at_cursor(text: &str, cursor: usize) -> (&str, &str) {
    let mut at = cursor.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    text.split_at(at)
}

/// Last `max_chars` characters of `s`.
fn char_tail(s: &str, max_chars: usize) -> &str {
    let len = s.chars().count();
    if len <= max_chars {
        return s;
    }
    match s.char_indices().nth(len - max_chars) {
        Some((start, _)) => &s[start..],
        None => s,
    }
}

/// First `max_chars` characters of `s`.
fn char_head(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedBackend {
        calls: AtomicUsize,
        response: std::result::Result<String, String>,
    }

    impl ScriptedBackend {
        fn ok(response: &str) -> Self {
            ScriptedBackend {
                calls: AtomicUsize::new(0),
                response: Ok(response.to_string()),
            }
        }

        fn failing(message: &str) -> Self {
            ScriptedBackend {
                calls: AtomicUsize::new(0),
                response: Err(message.to_string()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CompletionBackend for &ScriptedBackend {
        fn complete(&self, _prefix: &str, _suffix: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response
                .clone()
                .map_err(GenerationError::Backend)
        }
    }

    #[test]
    fn test_backend_consulted_once_per_prefix() {
        let backend = ScriptedBackend::ok("0..10 {");
        let service = CompletionService::new(&backend).unwrap();

        assert_eq!(service.complete("for i in ", "").unwrap(), "0..10 {");
        assert_eq!(service.complete("for i in ", "").unwrap(), "0..10 {");
        assert_eq!(backend.calls(), 1);
    }

    #[test]
    fn test_extension_of_cached_prefix_stays_local() {
        let backend = ScriptedBackend::ok("0..10 {");
        let service = CompletionService::new(&backend).unwrap();

        assert_eq!(service.complete("for i in ", "").unwrap(), "0..10 {");
        // The user typed part of the suggestion; no second backend call.
        assert_eq!(service.complete("for i in 0..", "").unwrap(), "10 {");
        assert_eq!(backend.calls(), 1);
    }

    #[test]
    fn test_backend_failure_caches_nothing() {
        let backend = ScriptedBackend::failing("model not loaded");
        let service = CompletionService::new(&backend).unwrap();

        assert!(service.complete("fn main", "").is_err());
        assert!(service.cache().is_empty());
    }

    #[test]
    fn test_clear_cache_forces_regeneration() {
        let backend = ScriptedBackend::ok("done");
        let service = CompletionService::new(&backend).unwrap();

        service.complete("abc", "").unwrap();
        service.clear_cache();
        service.complete("abc", "").unwrap();
        assert_eq!(backend.calls(), 2);
    }

    struct EchoBackend;

    impl CompletionBackend for EchoBackend {
        fn complete(&self, prefix: &str, suffix: &str) -> Result<String> {
            Ok(format!("[{prefix}|{suffix}]"))
        }
    }

    #[test]
    fn test_complete_at_splits_document() {
        let service = CompletionService::new(EchoBackend).unwrap();
        let completion = service.complete_at("hello world", 5).unwrap();
        assert_eq!(completion, "[hello| world]");

        // The second request for the same cursor context is a cache hit.
        assert_eq!(service.complete_at("hello world", 5).unwrap(), completion);
    }

    #[test]
    fn test_split_at_cursor() {
        assert_eq!(split_at_cursor("hello world", 5), ("hello", " world"));
        assert_eq!(split_at_cursor("abc", 0), ("", "abc"));
        assert_eq!(split_at_cursor("abc", 99), ("abc", ""));

        // An offset inside 'é' snaps back to the boundary before it.
        let text = "caé";
        assert_eq!(split_at_cursor(text, 3), ("ca", "é"));
    }

    #[test]
    fn test_context_bounding() {
        assert_eq!(char_tail("abcdef", 3), "def");
        assert_eq!(char_tail("ab", 3), "ab");
        assert_eq!(char_head("abcdef", 3), "abc");
        assert_eq!(char_head("ab", 3), "ab");

        assert_eq!(char_tail("ααββ", 2), "ββ");
        assert_eq!(char_head("ααββ", 2), "αα");
    }
}
