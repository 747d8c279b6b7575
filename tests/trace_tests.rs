use std::sync::Arc;

use serde_json::{Value, json};

use upload_form::{
    handler::{
        error::SubmitError,
        handler::{FormSubmissionHandler, SubmissionOptions, SubmissionState, SubmitEvent},
        regions::FormRegions,
    },
    trace::{
        logger::TraceLogger,
        trace::{TraceEvent, content_digest},
    },
    transport::mock::MockTransport,
};

use crate::common::utils::{TIMEOUT, temp_path, upload_form};

mod common;

fn read_events(path: &std::path::Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn content_digest_is_sha1_hex() {
    assert_eq!(content_digest(b"hello"), "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
}

#[test]
fn disabled_logger_writes_nothing() {
    let tracer = TraceLogger::disabled();
    assert!(!tracer.is_enabled());
    tracer.log(&TraceEvent::now("f", SubmissionState::Idle));
}

#[test]
fn unopenable_path_disables_tracing() {
    let tracer = TraceLogger::new("/nonexistent-dir/trace.jsonl");
    assert!(!tracer.is_enabled());
}

#[test]
fn event_records_error_kind() {
    let event = TraceEvent::now("qa", SubmissionState::Failed)
        .with_outcome("failed")
        .with_error(&SubmitError::Server("bad file".into()));

    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["form_id"], "qa");
    assert_eq!(value["state"], "Failed");
    assert_eq!(value["error_kind"], "server");
    assert_eq!(value["error"], "Server error: bad file");
    assert!(value.get("entries").is_none());
}

#[test]
fn successful_submission_is_traced() {
    let path = temp_path("success.jsonl");
    let tracer = Arc::new(TraceLogger::new(path.to_str().unwrap()));
    let handler = FormSubmissionHandler::new(
        upload_form("semantic", "semantic"),
        FormRegions::new(),
        Arc::new(MockTransport::json(json!({"result": "ok"}))),
        SubmissionOptions::default(),
    )
    .with_tracer(tracer);

    handler.submit(&mut SubmitEvent::new());
    let events = read_events(&path);
    std::fs::remove_file(&path).ok();

    assert_eq!(events.len(), 2);

    assert_eq!(events[0]["form_id"], "semantic");
    assert_eq!(events[0]["state"], "Submitting");
    assert_eq!(events[0]["entries"], json!(["action", "file"]));
    assert_eq!(
        events[0]["file_digests"],
        json!(["doc.txt:aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"])
    );

    assert_eq!(events[1]["state"], "Succeeded");
    assert_eq!(events[1]["outcome"], "rendered");
    assert!(events[1]["error"].is_null());
}

#[test]
fn failed_submission_is_traced_with_error() {
    let path = temp_path("failure.jsonl");
    let handler = FormSubmissionHandler::new(
        upload_form("semantic", "semantic"),
        FormRegions::new(),
        Arc::new(MockTransport::body("Internal Server Error")),
        SubmissionOptions::default(),
    )
    .with_tracer(Arc::new(TraceLogger::new(path.to_str().unwrap())));

    handler.submit(&mut SubmitEvent::new());
    let events = read_events(&path);
    std::fs::remove_file(&path).ok();

    let last = events.last().unwrap();
    assert_eq!(last["state"], "Failed");
    assert_eq!(last["outcome"], "failed");
    assert_eq!(last["error_kind"], "malformed_body");
}

#[test]
fn rejected_resubmit_is_traced() {
    let path = temp_path("rejected.jsonl");
    let (mock, gate) = MockTransport::json(json!({"result": "ok"})).gated();
    let handler = FormSubmissionHandler::new(
        upload_form("semantic", "semantic"),
        FormRegions::new(),
        Arc::new(mock),
        SubmissionOptions::default(),
    )
    .with_tracer(Arc::new(TraceLogger::new(path.to_str().unwrap())));

    let first = handler.spawn_submit(&mut SubmitEvent::new());
    assert!(gate.wait_entered(TIMEOUT));
    handler.spawn_submit(&mut SubmitEvent::new()).join();
    gate.release();
    first.join();

    let events = read_events(&path);
    std::fs::remove_file(&path).ok();

    let outcomes: Vec<_> = events
        .iter()
        .filter_map(|e| e["outcome"].as_str().map(str::to_string))
        .collect();
    assert_eq!(outcomes, vec!["rejected", "rendered"]);
}
