use reqwest::blocking::multipart::Form;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::error::ApiError;

fn client() -> Result<Client, ApiError> {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .map_err(ApiError::from)
}

pub(crate) fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, ApiError> {
    tracing::debug!(%url, "GET");
    let resp = client()?
        .get(url)
        .header(ACCEPT, "application/json")
        .send()?;
    decode(url, resp)
}

pub(crate) fn post_json<T: DeserializeOwned, B: Serialize>(
    url: &str,
    body: &B,
) -> Result<T, ApiError> {
    tracing::debug!(%url, "POST");
    let resp = client()?
        .post(url)
        .header(ACCEPT, "application/json")
        .header(CONTENT_TYPE, "application/json")
        .json(body)
        .send()?;
    decode(url, resp)
}

pub(crate) fn post_multipart<T: DeserializeOwned>(url: &str, form: Form) -> Result<T, ApiError> {
    tracing::debug!(%url, "POST multipart");
    let resp = client()?.post(url).multipart(form).send()?;
    decode(url, resp)
}

fn decode<T: DeserializeOwned>(url: &str, resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    let text = resp.text().unwrap_or_default();
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    serde_json::from_str(&text).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        source: e,
        body: text,
    })
}
