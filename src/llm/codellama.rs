//! CodeLlama prompting convention.
//!
//! CodeLlama's code-infilling variants are prompted with fill-in-the-middle
//! markers: the text before the cursor goes after `<PRE>`, the text after
//! the cursor goes after `<SUF>`, and the model generates the span that
//! belongs at `<MID>`, terminating with an `<EOT>` end marker.

use crate::llm::{CompletionModel, GenerationOptions};

const END_MARKER: &str = "<EOT>";

/// Prompting logic and sampling options for `codellama:7b-code`.
///
/// # Examples
///
/// ```rust
/// use completion_cache::llm::{CodeLlama, CompletionModel};
///
/// let prompt = CodeLlama.build_prompt("fn add(", ") -> i32");
/// assert_eq!(prompt, "<PRE> fn add( <SUF>) -> i32 <MID>");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeLlama;

impl CompletionModel for CodeLlama {
    fn model_name(&self) -> &str {
        "codellama:7b-code"
    }

    fn options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: 0.4,
            top_k: 40,
            top_p: 0.9,
            repeat_penalty: 1.1,
            stop: Some(END_MARKER.to_string()),
        }
    }

    fn build_prompt(&self, prefix: &str, suffix: &str) -> String {
        format!("<PRE> {prefix} <SUF>{suffix} <MID>")
    }

    fn process_response(&self, raw: &str) -> String {
        raw.replace(END_MARKER, "")
            .trim_matches(&[' ', '\t', '\n'][..])
            .to_string()
    }
}
