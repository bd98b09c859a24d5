use std::io::Write;
use std::time::Duration;

use api::{get_task_status, list_files, search, upload_pdf, ApiError, Config};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: String) -> Config {
    Config {
        base_url,
        list_limit: 100,
        top_k: 5,
        poll_interval: Duration::from_secs(5),
        poll_max_attempts: None,
    }
}

// The client is blocking by design; run it off the test runtime.
async fn on_blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking call should not panic")
}

#[tokio::test]
async fn list_files_sends_limit_and_parses_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("limit", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"_id": "a1", "filerealname": "report.pdf", "file_uuid": "col-1"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = test_config(server.uri());
    let listing = on_blocking(move || list_files(&cfg, 25))
        .await
        .expect("list should succeed");

    assert_eq!(listing.files.len(), 1);
    assert_eq!(listing.files[0].filerealname.as_deref(), Some("report.pdf"));
}

#[tokio::test]
async fn non_2xx_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend on fire"))
        .mount(&server)
        .await;

    let cfg = test_config(server.uri());
    let err = on_blocking(move || list_files(&cfg, 100))
        .await
        .expect_err("5xx should fail");

    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "backend on fire");
        }
        other => panic!("expected status error, got {other}"),
    }
}

#[tokio::test]
async fn upload_posts_multipart_file_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload-pdf"))
        .and(body_string_contains("name=\"file\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t1"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .expect("temp file");
    file.write_all(b"%PDF-1.4 test").expect("write temp pdf");
    let path_buf = file.path().to_path_buf();

    let cfg = test_config(server.uri());
    let resp = on_blocking(move || upload_pdf(&cfg, &path_buf))
        .await
        .expect("upload should succeed");

    assert_eq!(resp.task_id(), Some("t1"));
}

#[tokio::test]
async fn task_status_fetches_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "t1",
            "status": "done",
            "result": {"file_id": "c42"}
        })))
        .mount(&server)
        .await;

    let cfg = test_config(server.uri());
    let status = on_blocking(move || get_task_status(&cfg, "t1"))
        .await
        .expect("status should succeed");

    assert!(status.is_complete());
    assert_eq!(status.collection_id(), Some("c42"));
}

#[tokio::test]
async fn search_posts_query_and_k_to_escaped_collection_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search/col%201"))
        .and(body_json(json!({"query": "what is this?", "k": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "a summary"})))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = test_config(server.uri());
    let resp = on_blocking(move || search(&cfg, "col 1", "what is this?", 5))
        .await
        .expect("search should succeed");

    assert_eq!(resp.reply_text(), "a summary");
}
