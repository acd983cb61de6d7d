use std::borrow::Cow;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::upstream::build_upstream_url;
use super::{BackendError, GenerativeBackend};

const API_KEY_HEADER: &str = "x-goog-api-key";
const LIST_PAGE_SIZE: &str = "1000";
const MODEL_COLLECTIONS: &[&str] = &["models/", "tunedModels/"];

/// Gemini backend configuration.
pub struct GeminiConfig {
    pub base_url: Option<String>,
    pub api_key: String,
}

/// Gemini backend: Google's Generative Language REST API.
pub struct Gemini {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ModelEntry {
    name: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

impl Gemini {
    pub fn new(config: GeminiConfig, http_client: reqwest::Client) -> Self {
        Self {
            base_url: config
                .base_url
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com".into()),
            api_key: config.api_key,
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts concatenated. `None` when there is
    /// no candidate or none of its parts carry text.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let texts: Vec<String> = content.parts.into_iter().filter_map(|p| p.text).collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }
}

#[async_trait]
impl GenerativeBackend for Gemini {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn list_models(&self) -> Result<Vec<String>, BackendError> {
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", LIST_PAGE_SIZE)];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }
            let url = build_upstream_url(&self.base_url, "/v1beta/models", &query)?;

            let resp = self
                .http_client
                .get(url)
                .header(API_KEY_HEADER, &self.api_key)
                .send()
                .await?;
            let page: ListModelsResponse = read_json(resp).await?;

            names.extend(page.models.into_iter().map(|m| m.name));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(names)
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        temperature: f64,
    ) -> Result<Option<String>, BackendError> {
        let path = format!("/v1beta/{}:generateContent", model_resource(model));
        let url = build_upstream_url(&self.base_url, &path, &[])?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig { temperature },
        };

        let resp = self
            .http_client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;
        let reply: GenerateContentResponse = read_json(resp).await?;

        Ok(reply.into_text())
    }
}

/// Resource name for a model id: bare ids live under "models/", while ids
/// that already name their collection are used as given.
fn model_resource(model: &str) -> Cow<'_, str> {
    if MODEL_COLLECTIONS.iter().any(|c| model.starts_with(c)) {
        Cow::Borrowed(model)
    } else {
        Cow::Owned(format!("models/{model}"))
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, BackendError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(api_error(status, &body));
    }
    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Render a failed reply as "429 RESOURCE_EXHAUSTED. Quota exceeded ...".
fn api_error(status: StatusCode, body: &str) -> BackendError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!(
            "{} {}. {}",
            status.as_u16(),
            envelope.error.status.unwrap_or_default(),
            envelope.error.message
        ),
        Err(_) => format!(
            "{} {}. {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown"),
            body.trim()
        ),
    };
    BackendError::Api {
        status: status.as_u16(),
        message,
    }
}
