mod config;
mod error;
mod files;
mod http;
mod search;
mod tasks;

pub use config::Config;
pub use error::ApiError;
pub use files::{list_files, FileListing, FileRecord};
pub use search::{search, SearchResponse};
pub use tasks::{get_task_status, upload_pdf, TaskResult, TaskStatus, UploadResponse};
