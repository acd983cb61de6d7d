use serde::{Deserialize, Serialize};

use super::BackendError;

/// Context window requested from the local server on every call.
pub const NUM_CTX: u32 = 8192;

/// Ollama backend configuration.
pub struct OllamaConfig {
    pub chat_url: Option<String>,
}

/// Local Ollama server, reached through its `/api/chat` endpoint.
pub struct Ollama {
    chat_url: String,
    http_client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
    options: Options,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Options {
    temperature: f64,
    num_ctx: u32,
}

#[derive(Deserialize)]
struct ChatReply {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

impl Ollama {
    pub fn new(config: OllamaConfig, http_client: reqwest::Client) -> Self {
        Self {
            chat_url: config
                .chat_url
                .unwrap_or_else(|| "http://localhost:11434/api/chat".into()),
            http_client,
        }
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    /// Send `prompt` as a single user message and return the assistant's reply.
    pub async fn chat(
        &self,
        model: &str,
        prompt: &str,
        temperature: f64,
    ) -> Result<String, BackendError> {
        let body = ChatBody {
            model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: Options {
                temperature,
                num_ctx: NUM_CTX,
            },
        };

        let reply: ChatReply = self
            .http_client
            .post(&self.chat_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(reply.message.content)
    }
}
