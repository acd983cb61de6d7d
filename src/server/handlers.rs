use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use tracing::{error, info};

use crate::backend::{GenerativeBackend, Ollama, RetryPolicy};
use crate::catalog::ModelCatalog;
use crate::protocol::{ChatRequest, GeminiProxyResponse, LocalProxyResponse, StatusResponse};

use super::errors::ApiError;

/// Shared application state. Built once at startup, never mutated.
pub struct AppState {
    pub catalog: Arc<ModelCatalog>,
    /// `None` when no Gemini API key was configured.
    pub gemini: Option<Arc<dyn GenerativeBackend>>,
    pub ollama: Ollama,
    pub retry: RetryPolicy,
}

/// Liveness handler.
pub async fn root(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online".to_string(),
        available_models_count: state.catalog.len(),
    })
}

/// Gemini proxy: resolve the model alias, then generate with quota backoff.
pub async fn gemini_proxy(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<GeminiProxyResponse>, ApiError> {
    let Some(backend) = state.gemini.as_deref() else {
        return Err(ApiError::ServiceUnavailable(
            "Gemini Client not initialized.".to_string(),
        ));
    };

    let model = state.catalog.resolve(&req.model);
    info!(alias = req.model, model, "resolved model");

    let response = state
        .retry
        .generate(backend, &model, &req.prompt, req.temperature)
        .await
        .map_err(|e| {
            error!(backend = backend.name(), model, error = %e, "generation failed");
            ApiError::from(e)
        })?;

    Ok(Json(GeminiProxyResponse {
        response,
        model_used: model,
    }))
}

/// Local relay: forward to Ollama with the model name untouched.
pub async fn sarasina_proxy(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<LocalProxyResponse>, ApiError> {
    let response = state
        .ollama
        .chat(&req.model, &req.prompt, req.temperature)
        .await
        .map_err(|e| {
            error!(
                url = state.ollama.chat_url(),
                model = req.model,
                error = %e,
                "ollama request failed"
            );
            ApiError::Internal(format!("Ollama Error: {e}"))
        })?;

    Ok(Json(LocalProxyResponse { response }))
}
