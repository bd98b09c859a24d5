use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub list_limit: usize,
    pub top_k: usize,
    pub poll_interval: Duration,
    pub poll_max_attempts: Option<u32>,
}

impl Config {
    pub fn from_env() -> Self {
        // Load .env if present so backend config works without manual `source .env`.
        let _ = dotenvy::dotenv();
        Self {
            base_url: env::var("PDFCHAT_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
            list_limit: env::var("PDFCHAT_LIST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            top_k: env::var("PDFCHAT_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            poll_interval: Duration::from_secs(
                env::var("PDFCHAT_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            ),
            poll_max_attempts: env::var("PDFCHAT_POLL_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }
}
