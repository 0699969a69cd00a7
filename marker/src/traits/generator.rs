//!
//! # Text Generator Trait
//!
//! The grading pipeline only needs one thing from a language model: send a prompt, get
//! text back. [`TextGenerator`] is that seam. The production implementation talks to
//! Gemini ([`GeminiGenerator`](crate::generators::gemini::GeminiGenerator)); tests plug in
//! scripted generators.

use crate::error::MarkerError;
use async_trait::async_trait;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends `prompt` to the model and returns its raw reply text.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::Backend`] if the service cannot be reached or its response
    /// carries no text.
    async fn generate(&self, prompt: &str) -> Result<String, MarkerError>;
}
