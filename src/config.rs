use clap::{Parser, ValueEnum};

/// Plower relay: Gemini and local Ollama chat proxy.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Config {
    /// Listen address (e.g. ":8000" or "0.0.0.0:8000")
    #[arg(long, default_value = ":8000", env = "ADDR")]
    pub addr: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Gemini API key (cloud endpoint answers 503 without it)
    #[arg(long, env = "GEMINI_API_KEY")]
    pub gemini_api_key: Option<String>,

    /// Gemini API base URL
    #[arg(
        long,
        default_value = "https://generativelanguage.googleapis.com",
        env = "GEMINI_BASE_URL"
    )]
    pub gemini_base_url: String,

    /// Retries after a quota error before giving up
    #[arg(long, default_value_t = 3, env = "GEMINI_MAX_RETRIES")]
    pub gemini_max_retries: u32,

    /// First backoff delay in seconds, doubled on each retry
    #[arg(long, default_value_t = 2, env = "GEMINI_RETRY_BASE_SECS")]
    pub gemini_retry_base_secs: u64,

    /// Ollama chat endpoint
    #[arg(
        long,
        default_value = "http://localhost:11434/api/chat",
        env = "OLLAMA_URL"
    )]
    pub ollama_url: String,
}

/// Log line format.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

/// Convert Go-style ":8000" to "0.0.0.0:8000".
pub fn normalize_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}
