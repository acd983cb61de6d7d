use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;
use tokio::time::Instant;

use super::{BackendError, GenerativeBackend};

/// Scripted backend: each `generate` call pops the next reply and records
/// the model and the (tokio) time it was called at.
pub struct FakeBackend {
    list: Mutex<Option<Result<Vec<String>, BackendError>>>,
    replies: Mutex<VecDeque<Result<Option<String>, BackendError>>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl FakeBackend {
    fn build(
        list: Result<Vec<String>, BackendError>,
        replies: Vec<Result<Option<String>, BackendError>>,
    ) -> Self {
        Self {
            list: Mutex::new(Some(list)),
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_models(models: Vec<String>) -> Self {
        Self::build(Ok(models), Vec::new())
    }

    pub fn failing_list(err: BackendError) -> Self {
        Self::build(Err(err), Vec::new())
    }

    pub fn with_replies(replies: Vec<Result<String, BackendError>>) -> Self {
        Self::build(
            Ok(Vec::new()),
            replies.into_iter().map(|r| r.map(Some)).collect(),
        )
    }

    /// A single reply with no text, as for a blocked prompt.
    pub fn with_textless_reply() -> Self {
        Self::build(Ok(Vec::new()), vec![Ok(None)])
    }

    /// Models passed to each `generate` call, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }

    /// Time elapsed between consecutive `generate` calls.
    pub fn waits(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|w| w[1].1 - w[0].1).collect()
    }
}

#[async_trait]
impl GenerativeBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    async fn list_models(&self) -> Result<Vec<String>, BackendError> {
        self.list
            .lock()
            .unwrap()
            .take()
            .expect("list_models called twice")
    }

    async fn generate(
        &self,
        model: &str,
        _prompt: &str,
        _temperature: f64,
    ) -> Result<Option<String>, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), Instant::now()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected generate call")
    }
}

pub fn quota_error() -> BackendError {
    BackendError::Api {
        status: 429,
        message: "429 RESOURCE_EXHAUSTED. Resource has been exhausted (e.g. check quota).".into(),
    }
}

/// Serve `app` on an ephemeral local port; returns its base URL.
pub async fn spawn_upstream(app: Router) -> (String, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base_url, handle)
}
