use thiserror::Error;

/// Failures from the backend client. Non-2xx responses keep the status code
/// and raw body text so call sites can show them verbatim.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API error: {status} {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} decode failed: {source} | {body}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("reading upload file: {0}")]
    Io(#[from] std::io::Error),
}
