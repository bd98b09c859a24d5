use std::path::Path;

use reqwest::blocking::multipart::Form;
use serde::Deserialize;

use crate::config::Config;
use crate::error::ApiError;
use crate::http::{get_json, post_multipart};

/// Response from the upload endpoint. Backend versions disagree on which
/// field carries the task id, so all known spellings are kept.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct UploadResponse {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(rename = "taskId", default)]
    pub task_id_camel: Option<String>,
}

impl UploadResponse {
    /// The ingestion task id, probing `task_id`, `file_id`, `taskId` in that
    /// order. Returns `None` when the response carries none of them.
    pub fn task_id(&self) -> Option<&str> {
        self.task_id
            .as_deref()
            .or(self.file_id.as_deref())
            .or(self.task_id_camel.as_deref())
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct TaskStatus {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub result: Option<TaskResult>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct TaskResult {
    #[serde(default)]
    pub file_id: Option<String>,
}

impl TaskStatus {
    /// Terminal statuses are "success", "completed" and "done", compared
    /// case-insensitively. Every other value means the task is still pending.
    pub fn is_complete(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| {
                let s = s.to_ascii_lowercase();
                s == "success" || s == "completed" || s == "done"
            })
            .unwrap_or(false)
    }

    /// Collection id of the newly built index, present on terminal success.
    pub fn collection_id(&self) -> Option<&str> {
        self.result.as_ref().and_then(|r| r.file_id.as_deref())
    }
}

pub fn upload_pdf(cfg: &Config, path: &Path) -> Result<UploadResponse, ApiError> {
    let url = format!("{}/upload-pdf", cfg.base_url);
    let form = Form::new().file("file", path)?;
    post_multipart(&url, form)
}

pub fn get_task_status(cfg: &Config, task_id: &str) -> Result<TaskStatus, ApiError> {
    let url = format!("{}/tasks/{}", cfg.base_url, urlencoding::encode(task_id));
    get_json(&url)
}
