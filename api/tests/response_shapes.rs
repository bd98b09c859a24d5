use api::{FileListing, SearchResponse, TaskStatus, UploadResponse};
use serde_json::json;

#[test]
fn upload_task_id_prefers_snake_case() {
    let resp: UploadResponse =
        serde_json::from_value(json!({"task_id": "t1", "file_id": "f1", "taskId": "c1"}))
            .expect("upload response should parse");
    assert_eq!(resp.task_id(), Some("t1"));
}

#[test]
fn upload_task_id_falls_back_to_file_id_then_camel_case() {
    let resp: UploadResponse = serde_json::from_value(json!({"file_id": "f1", "taskId": "c1"}))
        .expect("upload response should parse");
    assert_eq!(resp.task_id(), Some("f1"));

    let resp: UploadResponse =
        serde_json::from_value(json!({"taskId": "c1"})).expect("upload response should parse");
    assert_eq!(resp.task_id(), Some("c1"));
}

#[test]
fn upload_without_any_task_id_field_yields_none() {
    let resp: UploadResponse =
        serde_json::from_value(json!({"message": "ok"})).expect("upload response should parse");
    assert_eq!(resp.task_id(), None);
}

#[test]
fn terminal_statuses_are_case_insensitive() {
    for status in ["success", "SUCCESS", "Completed", "done", "DoNe"] {
        let s: TaskStatus = serde_json::from_value(json!({"status": status}))
            .expect("task status should parse");
        assert!(s.is_complete(), "{status} should be terminal");
    }
}

#[test]
fn non_terminal_statuses_keep_pending() {
    for status in ["processing", "pending", "failed", "error", "queued", ""] {
        let s: TaskStatus = serde_json::from_value(json!({"status": status}))
            .expect("task status should parse");
        assert!(!s.is_complete(), "{status} should not be terminal");
    }
    let s: TaskStatus = serde_json::from_value(json!({})).expect("empty status should parse");
    assert!(!s.is_complete());
}

#[test]
fn completed_task_exposes_collection_id() {
    let s: TaskStatus = serde_json::from_value(
        json!({"task_id": "t1", "status": "done", "result": {"file_id": "c42"}}),
    )
    .expect("task status should parse");
    assert!(s.is_complete());
    assert_eq!(s.collection_id(), Some("c42"));
}

#[test]
fn reply_text_probes_fields_in_order() {
    let resp = SearchResponse(json!({"reply": "second", "result": "first"}));
    assert_eq!(resp.reply_text(), "first");

    let resp = SearchResponse(json!({"answer": "third", "reply": "second"}));
    assert_eq!(resp.reply_text(), "second");

    let resp = SearchResponse(json!({"text": "fourth"}));
    assert_eq!(resp.reply_text(), "fourth");
}

#[test]
fn reply_text_skips_null_and_empty_candidates() {
    let resp = SearchResponse(json!({"result": null, "reply": "", "answer": "used"}));
    assert_eq!(resp.reply_text(), "used");
}

#[test]
fn reply_text_renders_non_string_values_as_json() {
    let resp = SearchResponse(json!({"result": {"chunks": [1, 2]}}));
    assert_eq!(resp.reply_text(), r#"{"chunks":[1,2]}"#);
}

#[test]
fn reply_text_dumps_whole_body_when_no_field_matches() {
    let resp = SearchResponse(json!({"hits": []}));
    assert_eq!(resp.reply_text(), r#"{"hits":[]}"#);
}

#[test]
fn file_listing_tolerates_sparse_records() {
    let listing: FileListing = serde_json::from_value(json!({
        "files": [
            {
                "_id": "a1",
                "filerealname": "report.pdf",
                "file_uuid": "col-1",
                "created_at": "2025-01-02T03:04:05Z",
                "file_size": 1234,
                "status": "done"
            },
            {"uuid_filename": "x.pdf"},
            {}
        ]
    }))
    .expect("listing should parse");

    assert_eq!(listing.files.len(), 3);
    assert_eq!(listing.files[0].id.as_deref(), Some("a1"));
    assert_eq!(listing.files[0].file_uuid.as_deref(), Some("col-1"));
    assert_eq!(listing.files[1].uuid_filename.as_deref(), Some("x.pdf"));
    assert!(listing.files[2].id.is_none());
}

#[test]
fn file_listing_without_files_field_is_empty() {
    let listing: FileListing =
        serde_json::from_value(json!({})).expect("empty listing should parse");
    assert!(listing.files.is_empty());
}
