pub mod errors;
pub mod gemini;
pub mod ollama;
pub mod retry;
pub mod upstream;

#[cfg(test)]
pub mod testing;

use async_trait::async_trait;

pub use errors::BackendError;
pub use gemini::{Gemini, GeminiConfig};
pub use ollama::{Ollama, OllamaConfig};
pub use retry::RetryPolicy;

/// Backend trait for cloud text-generation providers.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Human-readable name for this backend.
    fn name(&self) -> &str;

    /// Model names the account may use, as the provider reports them.
    async fn list_models(&self) -> Result<Vec<String>, BackendError>;

    /// Generate a single completion for `prompt`. `None` when the reply
    /// carries no text at all (e.g. the prompt was blocked).
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        temperature: f64,
    ) -> Result<Option<String>, BackendError>;
}
