//! Ollama-backed completion generation.
//!
//! Speaks Ollama's blocking HTTP interface: `POST /api/generate` with a
//! non-streaming request, and a root-endpoint probe for availability. The
//! model-specific prompt and response handling are delegated to a
//! [`CompletionModel`], [`CodeLlama`] by default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::llm::codellama::CodeLlama;
use crate::llm::error::{GenerationError, Result};
use crate::llm::{with_retry, CompletionBackend, CompletionModel, GenerationOptions};

/// Host the Ollama server is expected at unless overridden.
pub const DEFAULT_HOST: &str = "http://localhost:11434/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(50);
const PING_TIMEOUT: Duration = Duration::from_secs(2);
const RETRY_COUNT: usize = 3;

/// A [`CompletionBackend`] that queries an Ollama server.
///
/// Requests time out after 50 seconds and are retried up to three times,
/// but only on timeout; other failures surface immediately.
///
/// # Examples
///
/// ```rust,no_run
/// use completion_cache::llm::{CompletionBackend, OllamaBackend};
///
/// let backend = OllamaBackend::new();
/// let completion = backend.complete("fn fib(n: u64) -> u64 {", "}")?;
/// # Ok::<(), completion_cache::llm::GenerationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct OllamaBackend<M = CodeLlama> {
    host: String,
    client: reqwest::blocking::Client,
    model: M,
}

impl OllamaBackend<CodeLlama> {
    /// Creates a backend against the default local host, prompting
    /// CodeLlama.
    pub fn new() -> Self {
        Self::with_model(DEFAULT_HOST, CodeLlama)
    }
}

impl Default for OllamaBackend<CodeLlama> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: CompletionModel> OllamaBackend<M> {
    /// Creates a backend against `host` using the given model convention.
    pub fn with_model(host: impl Into<String>, model: M) -> Self {
        OllamaBackend {
            host: host.into(),
            client: reqwest::blocking::Client::new(),
            model,
        }
    }

    /// The model convention this backend prompts with.
    pub fn model(&self) -> &M {
        &self.model
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.host.trim_end_matches('/'), path)
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: self.model.model_name(),
            prompt,
            stream: false,
            options: WireOptions::from(self.model.options()),
        };
        let response: GenerateResponse = self
            .client
            .post(self.endpoint("api/generate"))
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response.response)
    }
}

impl<M: CompletionModel> CompletionBackend for OllamaBackend<M> {
    fn complete(&self, prefix: &str, suffix: &str) -> Result<String> {
        if !self.is_available() {
            tracing::warn!(host = %self.host, "ollama server not available");
            return Err(GenerationError::BackendUnavailable);
        }

        let prompt = self.model.build_prompt(prefix, suffix);
        tracing::debug!(model = self.model.model_name(), "requesting completion");
        let raw = with_retry(RETRY_COUNT, GenerationError::is_timeout, || {
            self.generate(&prompt)
        })?;
        Ok(self.model.process_response(&raw))
    }

    fn is_available(&self) -> bool {
        self.client
            .get(self.endpoint(""))
            .timeout(PING_TIMEOUT)
            .send()
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: WireOptions,
}

#[derive(Debug, Serialize)]
struct WireOptions {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    repeat_penalty: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

impl From<GenerationOptions> for WireOptions {
    fn from(options: GenerationOptions) -> Self {
        WireOptions {
            temperature: options.temperature,
            top_k: options.top_k,
            top_p: options.top_p,
            repeat_penalty: options.repeat_penalty,
            stop: options.stop.into_iter().collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joining() {
        let backend = OllamaBackend::with_model("http://localhost:11434/", CodeLlama);
        assert_eq!(
            backend.endpoint("api/generate"),
            "http://localhost:11434/api/generate"
        );

        let no_slash = OllamaBackend::with_model("http://ollama.internal:11434", CodeLlama);
        assert_eq!(
            no_slash.endpoint("api/generate"),
            "http://ollama.internal:11434/api/generate"
        );
    }

    #[test]
    fn test_default_backend_prompts_codellama() {
        let backend = OllamaBackend::new();
        assert_eq!(backend.model().model_name(), "codellama:7b-code");
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateRequest {
            model: "codellama:7b-code",
            prompt: "<PRE> a <SUF> <MID>",
            stream: false,
            options: WireOptions::from(CodeLlama.options()),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "codellama:7b-code");
        assert_eq!(value["stream"], false);
        assert_eq!(value["options"]["top_k"], 40);
        assert_eq!(value["options"]["stop"][0], "<EOT>");
    }

    #[test]
    fn test_wire_options_skip_empty_stop() {
        let options = WireOptions::from(GenerationOptions {
            stop: None,
            ..GenerationOptions::default()
        });

        let value = serde_json::to_value(&options).unwrap();
        assert!(value.get("stop").is_none());
    }

    #[test]
    fn test_response_deserialization() {
        let body = r#"{"model":"codellama:7b-code","response":"0..10 {<EOT>","done":true}"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.response, "0..10 {<EOT>");
    }
}
