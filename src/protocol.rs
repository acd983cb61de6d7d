use serde::{Deserialize, Serialize};

/// Chat request accepted by both proxy endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default = "default_model")]
    pub model: String,
    pub prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_model() -> String {
    "gemini-flash".to_string()
}

fn default_temperature() -> f64 {
    0.1
}

/// Gemini proxy reply, carrying the concrete model the alias resolved to.
/// `response` is null when Gemini returned no text.
#[derive(Debug, Serialize)]
pub struct GeminiProxyResponse {
    pub response: Option<String>,
    pub model_used: String,
}

/// Local relay reply.
#[derive(Debug, Serialize)]
pub struct LocalProxyResponse {
    pub response: String,
}

/// Error response returned by the API.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub available_models_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_defaults() {
        let req: ChatRequest = serde_json::from_str(r#"{"prompt":"hi"}"#).unwrap();
        assert_eq!(req.model, "gemini-flash");
        assert_eq!(req.prompt, "hi");
        assert_eq!(req.temperature, 0.1);
    }

    #[test]
    fn test_chat_request_requires_prompt() {
        let result = serde_json::from_str::<ChatRequest>(r#"{"model":"llama3"}"#);
        assert!(result.is_err());
    }
}
