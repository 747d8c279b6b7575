use std::sync::Arc;

use serde_json::json;

use upload_form::{
    form::{error::FormError, form_model::UploadForm},
    handler::{
        error::{GENERIC_ERROR_MESSAGE, SubmitError},
        handler::{
            FormSubmissionHandler, MissingResultPolicy, SubmissionOptions, SubmissionOutcome,
            SubmissionState, SubmissionTask, SubmitEvent,
        },
        page::UploadPage,
        regions::FormRegions,
    },
    render::renderer::RenderedNode,
    report::html::render_html,
    transport::{mock::MockTransport, transport::Transport},
};

use crate::common::utils::{TIMEOUT, upload_form};

mod common;

// =========================================================================
// Helpers
// =========================================================================

fn handler_with(
    transport: Arc<dyn Transport>,
    options: SubmissionOptions,
) -> (FormSubmissionHandler, FormRegions) {
    let regions = FormRegions::new();
    let handler = FormSubmissionHandler::new(
        upload_form("semantic", "semantic"),
        regions.clone(),
        transport,
        options,
    );
    (handler, regions)
}

fn submit_body(body: serde_json::Value) -> (SubmissionOutcome, FormRegions) {
    let (handler, regions) =
        handler_with(Arc::new(MockTransport::json(body)), SubmissionOptions::default());
    let outcome = handler.submit(&mut SubmitEvent::new());
    (outcome, regions)
}

// =========================================================================
// Request side
// =========================================================================

#[test]
fn submit_posts_once_to_process_without_navigation() {
    let transport = Arc::new(MockTransport::json(json!({"result": "ok"})));
    let (handler, _regions) = handler_with(transport.clone(), SubmissionOptions::default());

    let mut event = SubmitEvent::new();
    handler.submit(&mut event);

    assert!(event.default_prevented());
    assert_eq!(transport.request_count(), 1);

    let recorded = &transport.requests()[0];
    assert_eq!(recorded.endpoint, "/process");
    assert_eq!(recorded.request.text_value("action"), Some("semantic"));
    assert_eq!(recorded.request.field_names(), vec!["action", "file"]);
    assert_eq!(recorded.request.files().next().map(|f| f.filename.as_str()), Some("doc.txt"));
}

#[test]
fn submit_uses_configured_endpoint() {
    let transport = Arc::new(MockTransport::json(json!({"result": "ok"})));
    let options = SubmissionOptions {
        endpoint: "/api/process".into(),
        ..SubmissionOptions::default()
    };
    let (handler, _regions) = handler_with(transport.clone(), options);

    handler.submit(&mut SubmitEvent::new());

    assert_eq!(transport.requests()[0].endpoint, "/api/process");
}

#[test]
fn edited_form_values_are_sent_on_next_submit() {
    let transport = Arc::new(MockTransport::json(json!({"result": "ok"})));
    let (handler, _regions) = handler_with(transport.clone(), SubmissionOptions::default());

    handler.submit(&mut SubmitEvent::new());
    {
        let form = handler.form();
        let mut form = form.lock().unwrap();
        assert!(form.set_value("action", "similarity"));
    }
    handler.submit(&mut SubmitEvent::new());

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].request.text_value("action"), Some("semantic"));
    assert_eq!(requests[1].request.text_value("action"), Some("similarity"));
}

// =========================================================================
// Rendering
// =========================================================================

#[test]
fn text_result_converts_newlines_to_line_breaks() {
    let (outcome, regions) = submit_body(json!({"result": "a\nb"}));

    assert!(matches!(outcome, SubmissionOutcome::Rendered(_)));
    assert_eq!(regions.result_nodes(), vec![RenderedNode::Markup("a<br>b".into())]);
    assert_eq!(render_html(&regions.result_nodes()), "a<br>b");
    assert!(regions.error_text().is_empty());
}

#[test]
fn sequence_result_renders_one_block_per_item() {
    let (_outcome, regions) = submit_body(json!({"result": [1, {"x": 2}]}));

    assert_eq!(
        regions.result_nodes(),
        vec![
            RenderedNode::Paragraph("1".into()),
            RenderedNode::Paragraph("{\n  \"x\": 2\n}".into()),
        ]
    );
}

#[test]
fn sequence_strings_are_shown_verbatim() {
    let (_outcome, regions) = submit_body(json!({"result": ["plain <b>text</b>", "x\ny"]}));

    assert_eq!(
        regions.result_nodes(),
        vec![
            RenderedNode::Paragraph("plain <b>text</b>".into()),
            RenderedNode::Paragraph("x\ny".into()),
        ]
    );
    assert_eq!(
        render_html(&regions.result_nodes()),
        "<p>plain &lt;b&gt;text&lt;/b&gt;</p><p>x\ny</p>"
    );
}

#[test]
fn structured_result_renders_preformatted_json() {
    let (_outcome, regions) = submit_body(json!({"result": {"k": "v"}}));

    assert_eq!(
        regions.result_nodes(),
        vec![RenderedNode::Preformatted("{\n  \"k\": \"v\"\n}".into())]
    );
}

#[test]
fn scalar_result_renders_plain_text() {
    let (_outcome, regions) = submit_body(json!({"result": 42}));
    assert_eq!(regions.result_nodes(), vec![RenderedNode::Text("42".into())]);

    let (_outcome, regions) = submit_body(json!({"result": true}));
    assert_eq!(regions.result_nodes(), vec![RenderedNode::Text("true".into())]);
}

#[test]
fn empty_error_field_does_not_block_result() {
    let (outcome, regions) = submit_body(json!({"error": "", "result": "fine"}));

    assert!(matches!(outcome, SubmissionOutcome::Rendered(_)));
    assert!(regions.error_text().is_empty());
}

// =========================================================================
// Failures
// =========================================================================

#[test]
fn error_field_is_shown_and_result_left_empty() {
    let (outcome, regions) = submit_body(json!({"error": "bad file"}));

    assert_eq!(regions.error_text(), "bad file");
    assert!(regions.result_nodes().is_empty());
    match outcome {
        SubmissionOutcome::Failed { message, error } => {
            assert_eq!(message, "bad file");
            assert!(matches!(error, SubmitError::Server(ref m) if m == "bad file"));
        }
        other => panic!("Expected Failed, got {:?}", other),
    }
}

#[test]
fn error_field_wins_over_result() {
    let (_outcome, regions) = submit_body(json!({"error": "nope", "result": "ignored"}));

    assert_eq!(regions.error_text(), "nope");
    assert!(regions.result_nodes().is_empty());
}

#[test]
fn server_error_status_still_shows_message() {
    let transport = Arc::new(MockTransport::with_status(
        500,
        r#"{"error": "An error occurred during processing"}"#,
    ));
    let (handler, regions) = handler_with(transport, SubmissionOptions::default());

    let outcome = handler.submit(&mut SubmitEvent::new());

    assert!(outcome.is_failure());
    assert_eq!(regions.error_text(), "An error occurred during processing");
}

#[test]
fn non_json_body_shows_generic_message() {
    let transport = Arc::new(MockTransport::with_status(
        502,
        "<html><body>Traceback (most recent call last)</body></html>",
    ));
    let (handler, regions) = handler_with(transport, SubmissionOptions::default());

    let outcome = handler.submit(&mut SubmitEvent::new());

    assert_eq!(regions.error_text(), GENERIC_ERROR_MESSAGE);
    assert!(!regions.error_text().contains("Traceback"));
    match outcome {
        SubmissionOutcome::Failed { error, .. } => {
            assert!(matches!(error, SubmitError::MalformedBody { status: 502, .. }));
        }
        other => panic!("Expected Failed, got {:?}", other),
    }
}

#[test]
fn unreachable_server_shows_generic_message() {
    let transport = Arc::new(MockTransport::unreachable("connection refused"));
    let (handler, regions) = handler_with(transport, SubmissionOptions::default());

    let outcome = handler.submit(&mut SubmitEvent::new());

    assert_eq!(regions.error_text(), GENERIC_ERROR_MESSAGE);
    assert!(!regions.loading_visible());
    match outcome {
        SubmissionOutcome::Failed { error, .. } => assert_eq!(error.kind(), "transport"),
        other => panic!("Expected Failed, got {:?}", other),
    }
}

#[test]
fn custom_fallback_message_is_used() {
    let options = SubmissionOptions {
        fallback_message: "Something went wrong".into(),
        ..SubmissionOptions::default()
    };
    let (handler, regions) = handler_with(Arc::new(MockTransport::body("not json")), options);

    handler.submit(&mut SubmitEvent::new());

    assert_eq!(regions.error_text(), "Something went wrong");
}

#[test]
fn missing_result_fails_by_default() {
    let (outcome, regions) = submit_body(json!({"status": "done"}));

    assert_eq!(regions.error_text(), GENERIC_ERROR_MESSAGE);
    match outcome {
        SubmissionOutcome::Failed { error, .. } => {
            assert!(matches!(error, SubmitError::MissingResult));
        }
        other => panic!("Expected Failed, got {:?}", other),
    }
}

#[test]
fn missing_result_can_be_ignored() {
    let options = SubmissionOptions {
        missing_result: MissingResultPolicy::Ignore,
        ..SubmissionOptions::default()
    };
    let (handler, regions) =
        handler_with(Arc::new(MockTransport::json(json!({"result": null}))), options);

    let outcome = handler.submit(&mut SubmitEvent::new());

    assert!(matches!(outcome, SubmissionOutcome::NoResult));
    assert!(regions.error_text().is_empty());
    assert!(regions.result_nodes().is_empty());
    assert!(!regions.loading_visible());
}

#[test]
fn submit_clears_previous_error_and_result() {
    let (handler, regions) = handler_with(
        Arc::new(MockTransport::json(json!({"result": "fresh"}))),
        SubmissionOptions::default(),
    );
    regions.error.lock().unwrap().set_text("old failure");
    regions
        .result
        .lock()
        .unwrap()
        .append(RenderedNode::Text("old result".into()));

    handler.submit(&mut SubmitEvent::new());

    assert!(regions.error_text().is_empty());
    assert_eq!(regions.result_nodes(), vec![RenderedNode::Markup("fresh".into())]);
}

#[test]
fn handler_remains_usable_after_failure() {
    let (handler, regions) = handler_with(
        Arc::new(MockTransport::json(json!({"error": "bad file"}))),
        SubmissionOptions::default(),
    );

    for _ in 0..3 {
        let outcome = handler.submit(&mut SubmitEvent::new());
        assert!(outcome.is_failure());
        assert_eq!(regions.error_text(), "bad file");
        assert_eq!(handler.state(), SubmissionState::Idle);
        assert!(!handler.is_in_flight());
    }
}

// =========================================================================
// Loading indicator and tasks
// =========================================================================

#[test]
fn loading_visible_while_in_flight_then_hidden_on_success() {
    let (mock, gate) = MockTransport::json(json!({"result": "done"})).gated();
    let (handler, regions) = handler_with(Arc::new(mock), SubmissionOptions::default());

    let task = handler.spawn_submit(&mut SubmitEvent::new());
    assert!(regions.loading_visible());

    assert!(gate.wait_entered(TIMEOUT));
    assert!(regions.loading_visible());
    assert_eq!(handler.state(), SubmissionState::Submitting);
    assert!(handler.is_in_flight());

    gate.release();
    let outcome = task.join();

    assert!(matches!(outcome, SubmissionOutcome::Rendered(_)));
    assert!(!regions.loading_visible());
    assert_eq!(handler.state(), SubmissionState::Idle);
    assert!(!handler.is_in_flight());
}

#[test]
fn loading_hidden_after_failure() {
    let (mock, gate) = MockTransport::unreachable("reset by peer").gated();
    let (handler, regions) = handler_with(Arc::new(mock), SubmissionOptions::default());

    let task = handler.spawn_submit(&mut SubmitEvent::new());
    assert!(gate.wait_entered(TIMEOUT));
    assert!(regions.loading_visible());

    gate.release();
    let outcome = task.join();

    assert!(outcome.is_failure());
    assert!(!regions.loading_visible());
    assert_eq!(regions.error_text(), GENERIC_ERROR_MESSAGE);
}

#[test]
fn resubmit_while_in_flight_is_rejected() {
    let (mock, gate) = MockTransport::json(json!({"result": "first"})).gated();
    let mock = Arc::new(mock);
    let (handler, regions) = handler_with(mock.clone(), SubmissionOptions::default());

    let first = handler.spawn_submit(&mut SubmitEvent::new());
    assert!(gate.wait_entered(TIMEOUT));

    let mut event = SubmitEvent::new();
    let second = handler.spawn_submit(&mut event);
    assert!(event.default_prevented());
    assert!(second.is_finished());
    assert!(matches!(second.join(), SubmissionOutcome::Rejected));
    assert!(regions.loading_visible());

    gate.release();
    assert!(matches!(first.join(), SubmissionOutcome::Rendered(_)));
    assert_eq!(mock.request_count(), 1);

    // Guard is released once the first request resolves.
    let third = handler.spawn_submit(&mut SubmitEvent::new());
    assert!(gate.wait_entered(TIMEOUT));
    gate.release();
    assert!(matches!(third.join(), SubmissionOutcome::Rendered(_)));
    assert_eq!(mock.request_count(), 2);
}

#[test]
fn unguarded_resubmit_sends_both_requests() {
    let (mock, gate) = MockTransport::json(json!({"result": "again"})).gated();
    let mock = Arc::new(mock);
    let options = SubmissionOptions {
        guard_in_flight: false,
        ..SubmissionOptions::default()
    };
    let (handler, _regions) = handler_with(mock.clone(), options);

    let first = handler.spawn_submit(&mut SubmitEvent::new());
    assert!(gate.wait_entered(TIMEOUT));
    let second = handler.spawn_submit(&mut SubmitEvent::new());
    assert!(gate.wait_entered(TIMEOUT));

    gate.release();
    gate.release();

    assert!(matches!(first.join(), SubmissionOutcome::Rendered(_)));
    assert!(matches!(second.join(), SubmissionOutcome::Rendered(_)));
    assert_eq!(mock.request_count(), 2);
}

#[test]
fn submitting_one_form_leaves_another_in_flight_form_alone() {
    let (mock_b, gate_b) = MockTransport::json(json!({"result": "from b"})).gated();
    let regions_b = FormRegions::new();
    let handler_b = FormSubmissionHandler::new(
        upload_form("b", "similarity"),
        regions_b.clone(),
        Arc::new(mock_b),
        SubmissionOptions::default(),
    );

    let regions_a = FormRegions::new();
    let handler_a = FormSubmissionHandler::new(
        upload_form("a", "semantic"),
        regions_a.clone(),
        Arc::new(MockTransport::json(json!({"error": "bad file"}))),
        SubmissionOptions::default(),
    );

    let task_b = handler_b.spawn_submit(&mut SubmitEvent::new());
    assert!(gate_b.wait_entered(TIMEOUT));
    let before = regions_b.snapshot();

    let outcome_a = handler_a.submit(&mut SubmitEvent::new());
    assert!(outcome_a.is_failure());
    assert_eq!(regions_a.error_text(), "bad file");
    assert!(!regions_a.loading_visible());

    assert_eq!(regions_b.snapshot(), before);
    assert!(regions_b.loading_visible());
    assert!(regions_b.result_nodes().is_empty());
    assert!(regions_b.error_text().is_empty());

    gate_b.release();
    assert!(matches!(task_b.join(), SubmissionOutcome::Rendered(_)));
    assert_eq!(regions_b.result_nodes(), vec![RenderedNode::Markup("from b".into())]);
    assert_eq!(regions_a.error_text(), "bad file");
}

#[test]
fn ready_task_reports_rejection_without_thread() {
    let task = SubmissionTask::Ready(SubmissionOutcome::Rejected);
    assert!(task.is_finished());
    assert_eq!(task.join().label(), "rejected");
}

// =========================================================================
// Page registry
// =========================================================================

#[test]
fn page_registers_forms_and_routes_submits() {
    let transport = Arc::new(MockTransport::json(json!({"result": "ok"})));
    let mut page = UploadPage::new(transport.clone(), SubmissionOptions::default());

    let regions_a = FormRegions::new();
    let regions_b = FormRegions::new();
    page.register(upload_form("a", "semantic"), regions_a.clone()).unwrap();
    page.register(upload_form("b", "similarity"), regions_b.clone()).unwrap();
    assert_eq!(page.form_ids(), vec!["a", "b"]);
    assert_eq!(page.len(), 2);

    regions_b.error.lock().unwrap().set_text("stale");
    let outcome = page.submit("a").unwrap();

    assert!(matches!(outcome, SubmissionOutcome::Rendered(_)));
    assert_eq!(regions_a.result_nodes(), vec![RenderedNode::Markup("ok".into())]);
    assert_eq!(regions_b.error_text(), "stale");
    assert!(regions_b.result_nodes().is_empty());
    assert_eq!(transport.request_count(), 1);
    assert_eq!(transport.requests()[0].request.text_value("action"), Some("semantic"));
}

#[test]
fn page_rejects_duplicate_form_ids() {
    let mut page = UploadPage::new(
        Arc::new(MockTransport::json(json!({"result": "ok"}))),
        SubmissionOptions::default(),
    );
    page.register(UploadForm::new("qa"), FormRegions::new()).unwrap();

    let err = page
        .register(UploadForm::new("qa"), FormRegions::new())
        .err()
        .expect("duplicate id should be rejected");
    assert!(matches!(err, FormError::DuplicateForm(ref id) if id == "qa"));
    assert_eq!(page.len(), 1);
}

#[test]
fn page_submit_unknown_form_is_none() {
    let page = UploadPage::new(
        Arc::new(MockTransport::json(json!({"result": "ok"}))),
        SubmissionOptions::default(),
    );
    assert!(page.is_empty());
    assert!(page.submit("missing").is_none());
    assert!(page.spawn_submit("missing").is_none());
}

#[test]
fn page_spawned_submissions_resolve_independently() {
    let transport = Arc::new(MockTransport::json(json!({"result": ["one", "two"]})));
    let mut page = UploadPage::new(transport.clone(), SubmissionOptions::default());
    let regions_a = FormRegions::new();
    let regions_b = FormRegions::new();
    page.register(upload_form("a", "semantic"), regions_a.clone()).unwrap();
    page.register(upload_form("b", "semantic"), regions_b.clone()).unwrap();

    let task_a = page.spawn_submit("a").unwrap();
    let task_b = page.spawn_submit("b").unwrap();

    assert!(matches!(task_a.join(), SubmissionOutcome::Rendered(_)));
    assert!(matches!(task_b.join(), SubmissionOutcome::Rendered(_)));
    assert_eq!(regions_a.result_nodes().len(), 2);
    assert_eq!(regions_b.result_nodes().len(), 2);
    assert!(!regions_a.loading_visible());
    assert!(!regions_b.loading_visible());
    assert_eq!(transport.request_count(), 2);
}

#[test]
fn spawn_submit_accepts_form_id_with_nul_byte() {
    let regions = FormRegions::new();
    let handler = FormSubmissionHandler::new(
        upload_form("odd\0id", "semantic"),
        regions.clone(),
        Arc::new(MockTransport::json(json!({"result": "ok"}))),
        SubmissionOptions::default(),
    );

    let outcome = handler.spawn_submit(&mut SubmitEvent::new()).join();

    assert!(matches!(outcome, SubmissionOutcome::Rendered(_)), "got {:?}", outcome);
    assert_eq!(regions.result_nodes(), vec![RenderedNode::Markup("ok".into())]);
    assert!(!regions.loading_visible());
}
