//! Remote completion backends.
//!
//! The cache subsystem only requires its collaborator to expose one
//! synchronous operation: complete a `(prefix, suffix)` pair into a
//! suggestion string, or fail with a [`GenerationError`]. That contract is
//! [`CompletionBackend`]. Model-family specifics (prompt format, sampling
//! options, response cleanup) live behind [`CompletionModel`], one
//! implementation per prompt/response convention, so a backend can speak to
//! different models without changing its transport code.

pub mod codellama;
pub mod error;
#[cfg(feature = "ollama")]
pub mod ollama;

pub use codellama::CodeLlama;
pub use error::{GenerationError, Result};
#[cfg(feature = "ollama")]
pub use ollama::OllamaBackend;

/// Sampling options passed along with a generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// Top-k sampling cutoff.
    pub top_k: u32,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
    /// Penalty applied to repeated tokens.
    pub repeat_penalty: f32,
    /// Stop sequence that ends generation.
    pub stop: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        GenerationOptions {
            temperature: 0.8,
            top_k: 40,
            top_p: 0.9,
            repeat_penalty: 1.1,
            stop: None,
        }
    }
}

/// A model family's prompting and post-processing convention.
pub trait CompletionModel {
    /// Identifier of the model as the backend knows it.
    fn model_name(&self) -> &str;

    /// Sampling options to use when generating with this model.
    fn options(&self) -> GenerationOptions;

    /// Builds the full generation prompt for a cursor position between
    /// `prefix` and `suffix`.
    fn build_prompt(&self, prefix: &str, suffix: &str) -> String;

    /// Turns the model's raw response into a usable completion.
    fn process_response(&self, raw: &str) -> String;
}

/// A service that prompts a model for code completions.
pub trait CompletionBackend {
    /// Generates a completion suggestion for a cursor position between
    /// `prefix` and `suffix`.
    fn complete(&self, prefix: &str, suffix: &str) -> Result<String>;

    /// Returns `true` if the backend is currently reachable.
    fn is_available(&self) -> bool {
        true
    }
}

/// Runs `op` up to `1 + retry_count` times, retrying only errors accepted
/// by `should_retry`.
///
/// The first success wins; a rejected error or exhausted retries propagate
/// the most recent failure.
pub fn with_retry<T, E, F, P>(retry_count: usize, should_retry: P, mut op: F) -> std::result::Result<T, E>
where
    F: FnMut() -> std::result::Result<T, E>,
    P: Fn(&E) -> bool,
{
    let mut attempts = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if attempts < retry_count && should_retry(&err) => {
                attempts += 1;
                tracing::debug!(attempt = attempts, "retrying completion request");
            }
            Err(err) => return Err(err),
        }
    }
}
