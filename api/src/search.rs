use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::error::ApiError;
use crate::http::post_json;

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    k: usize,
}

/// Raw search response. The reply field name varies across backend versions,
/// so the body is kept whole and probed on demand.
#[derive(Deserialize, Debug, Clone)]
#[serde(transparent)]
pub struct SearchResponse(pub Value);

impl SearchResponse {
    /// Display text for the reply: first of `result`, `reply`, `answer`,
    /// `text` that is present and non-empty. Non-string values are rendered
    /// as JSON; when no candidate field exists the whole body is dumped.
    pub fn reply_text(&self) -> String {
        for key in ["result", "reply", "answer", "text"] {
            match self.0.get(key) {
                None | Some(Value::Null) => continue,
                Some(Value::String(s)) if s.is_empty() => continue,
                Some(Value::String(s)) => return s.clone(),
                Some(other) => return other.to_string(),
            }
        }
        self.0.to_string()
    }
}

pub fn search(
    cfg: &Config,
    collection_id: &str,
    query: &str,
    k: usize,
) -> Result<SearchResponse, ApiError> {
    let url = format!(
        "{}/search/{}",
        cfg.base_url,
        urlencoding::encode(collection_id)
    );
    post_json(&url, &SearchRequest { query, k })
}
