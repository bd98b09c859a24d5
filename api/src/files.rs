use serde::Deserialize;

use crate::config::Config;
use crate::error::ApiError;
use crate::http::get_json;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct FileListing {
    #[serde(default)]
    pub files: Vec<FileRecord>,
}

/// One previously uploaded file as the backend reports it. Every field is
/// optional; older backend versions omit several of them.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct FileRecord {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub filerealname: Option<String>,
    #[serde(default)]
    pub uuid_filename: Option<String>,
    /// Collection key: present once ingestion has produced a searchable index.
    #[serde(default)]
    pub file_uuid: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
}

pub fn list_files(cfg: &Config, limit: usize) -> Result<FileListing, ApiError> {
    let url = format!("{}/files?limit={}", cfg.base_url, limit);
    get_json(&url)
}
