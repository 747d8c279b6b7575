use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};

use crate::{
    form::form_model::{SubmissionRequest, UploadForm},
    handler::{
        error::{GENERIC_ERROR_MESSAGE, SubmitError},
        regions::{FormRegions, lock},
    },
    render::renderer::{RenderedNode, render_payload},
    response::response_model::{ResultPayload, parse_response},
    trace::{logger::TraceLogger, trace::TraceEvent},
    transport::transport::Transport,
};

pub const DEFAULT_ENDPOINT: &str = "/process";

// ============================================================================
// Options
// ============================================================================

/// What to do with a response carrying neither `error` nor `result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingResultPolicy {
    /// Show the fallback error message.
    #[default]
    Fail,
    /// Leave the result region empty and report nothing.
    Ignore,
}

#[derive(Debug, Clone)]
pub struct SubmissionOptions {
    pub endpoint: String,
    pub missing_result: MissingResultPolicy,
    /// Reject a submit while the same form still has a request in flight.
    pub guard_in_flight: bool,
    pub fallback_message: String,
}

impl Default for SubmissionOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            missing_result: MissingResultPolicy::default(),
            guard_in_flight: true,
            fallback_message: GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

// ============================================================================
// Events, states, outcomes
// ============================================================================

/// A submit event delivered to a form.
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress the browser's own submission and navigation.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Result rendered into the result region.
    Rendered(Vec<RenderedNode>),
    /// No result in the response and the policy says to ignore that.
    NoResult,
    /// Message written to the error region.
    Failed { message: String, error: SubmitError },
    /// Same form already had a request in flight; nothing was touched.
    Rejected,
}

impl SubmissionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SubmissionOutcome::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubmissionOutcome::Rendered(_) => "rendered",
            SubmissionOutcome::NoResult => "no_result",
            SubmissionOutcome::Failed { .. } => "failed",
            SubmissionOutcome::Rejected => "rejected",
        }
    }
}

/// A submission running on its own task.
pub enum SubmissionTask {
    /// Finished before a task was needed (rejected, or the task could not start)
    Ready(SubmissionOutcome),
    Running(JoinHandle<SubmissionOutcome>),
}

impl SubmissionTask {
    pub fn is_finished(&self) -> bool {
        match self {
            SubmissionTask::Ready(_) => true,
            SubmissionTask::Running(handle) => handle.is_finished(),
        }
    }

    /// Wait for the submission to resolve.
    pub fn join(self) -> SubmissionOutcome {
        match self {
            SubmissionTask::Ready(outcome) => outcome,
            SubmissionTask::Running(handle) => handle.join().unwrap_or_else(|_| {
                SubmissionOutcome::Failed {
                    message: GENERIC_ERROR_MESSAGE.to_string(),
                    error: SubmitError::TaskFailed("submission task panicked".into()),
                }
            }),
        }
    }
}

// ============================================================================
// Handler
// ============================================================================

/// Intercepts submissions of one upload form and drives its display regions.
///
/// Everything the handler touches belongs to its own form; clones share
/// that form, so a clone can carry a submission onto another task.
#[derive(Clone)]
pub struct FormSubmissionHandler {
    form: Arc<Mutex<UploadForm>>,
    regions: FormRegions,
    transport: Arc<dyn Transport>,
    options: SubmissionOptions,
    state: Arc<Mutex<SubmissionState>>,
    in_flight: Arc<AtomicBool>,
    tracer: Arc<TraceLogger>,
}

impl FormSubmissionHandler {
    pub fn new(
        form: UploadForm,
        regions: FormRegions,
        transport: Arc<dyn Transport>,
        options: SubmissionOptions,
    ) -> Self {
        Self {
            form: Arc::new(Mutex::new(form)),
            regions,
            transport,
            options,
            state: Arc::new(Mutex::new(SubmissionState::Idle)),
            in_flight: Arc::new(AtomicBool::new(false)),
            tracer: Arc::new(TraceLogger::disabled()),
        }
    }

    pub fn with_tracer(mut self, tracer: Arc<TraceLogger>) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn form_id(&self) -> String {
        lock(&self.form).id.clone()
    }

    /// Shared handle to the form, for editing control values between submits.
    pub fn form(&self) -> Arc<Mutex<UploadForm>> {
        Arc::clone(&self.form)
    }

    pub fn state(&self) -> SubmissionState {
        *lock(&self.state)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Handle a submit on the calling thread, returning once the response
    /// has been displayed.
    pub fn submit(&self, event: &mut SubmitEvent) -> SubmissionOutcome {
        match self.begin(event) {
            Some(active) => active.run(),
            None => SubmissionOutcome::Rejected,
        }
    }

    /// Handle a submit, running the request on its own task.
    ///
    /// Regions are cleared and the loading indicator shown before this
    /// returns; the task owns the rest of the submission.
    pub fn spawn_submit(&self, event: &mut SubmitEvent) -> SubmissionTask {
        let Some(active) = self.begin(event) else {
            return SubmissionTask::Ready(SubmissionOutcome::Rejected);
        };

        // Thread names cannot hold NUL bytes.
        let name = format!("submit-{}", self.form_id().replace('\0', ""));
        match thread::Builder::new().name(name).spawn(move || active.run()) {
            Ok(handle) => SubmissionTask::Running(handle),
            Err(e) => {
                // The closure, and the loading guard inside it, is already dropped.
                let error = SubmitError::TaskFailed(e.to_string());
                let message = error.display_message(&self.options.fallback_message);
                lock(&self.regions.error).set_text(&message);
                SubmissionTask::Ready(SubmissionOutcome::Failed { message, error })
            }
        }
    }

    /// Steps that run synchronously with the event: prevent navigation,
    /// clear this form's regions, show its loading indicator.
    fn begin(&self, event: &mut SubmitEvent) -> Option<ActiveSubmission> {
        event.prevent_default();

        let was_in_flight = self.in_flight.swap(true, Ordering::SeqCst);
        if was_in_flight && self.options.guard_in_flight {
            self.tracer
                .log(&TraceEvent::now(&self.form_id(), self.state()).with_outcome("rejected"));
            return None;
        }

        lock(&self.regions.error).clear();
        lock(&self.regions.result).clear();
        lock(&self.regions.loading).show();
        self.set_state(SubmissionState::Submitting);

        Some(ActiveSubmission {
            handler: self.clone(),
        })
    }

    fn exchange(&self, request: &SubmissionRequest) -> Result<Option<ResultPayload>, SubmitError> {
        let response = self.transport.post(&self.options.endpoint, request)?;

        let parsed = parse_response(&response.body).map_err(|source| SubmitError::MalformedBody {
            status: response.status,
            source,
        })?;

        if let Some(message) = parsed.error_message() {
            return Err(SubmitError::Server(message));
        }

        match parsed.into_payload() {
            Some(payload) => Ok(Some(payload)),
            None => match self.options.missing_result {
                MissingResultPolicy::Fail => Err(SubmitError::MissingResult),
                MissingResultPolicy::Ignore => Ok(None),
            },
        }
    }

    fn display(&self, result: Result<Option<ResultPayload>, SubmitError>) -> SubmissionOutcome {
        match result {
            Ok(Some(payload)) => {
                let nodes = render_payload(&payload);
                let mut region = lock(&self.regions.result);
                for node in &nodes {
                    region.append(node.clone());
                }
                drop(region);
                self.set_state(SubmissionState::Succeeded);
                SubmissionOutcome::Rendered(nodes)
            }
            Ok(None) => {
                self.set_state(SubmissionState::Succeeded);
                SubmissionOutcome::NoResult
            }
            Err(error) => {
                let message = error.display_message(&self.options.fallback_message);
                lock(&self.regions.error).set_text(&message);
                self.set_state(SubmissionState::Failed);
                SubmissionOutcome::Failed { message, error }
            }
        }
    }

    fn set_state(&self, state: SubmissionState) {
        *lock(&self.state) = state;
    }

    fn finish(&self) {
        lock(&self.regions.loading).hide();
        self.set_state(SubmissionState::Idle);
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

/// One submission between `begin` and the loading indicator being hidden.
///
/// Dropping it hides the indicator, whichever way the submission ends.
struct ActiveSubmission {
    handler: FormSubmissionHandler,
}

impl ActiveSubmission {
    fn run(self) -> SubmissionOutcome {
        let handler = &self.handler;
        let form_id = handler.form_id();
        let request = lock(&handler.form).serialize();

        handler
            .tracer
            .log(&TraceEvent::now(&form_id, SubmissionState::Submitting).with_request(&request));

        let outcome = handler.display(handler.exchange(&request));

        let mut event = TraceEvent::now(&form_id, handler.state()).with_outcome(outcome.label());
        if let SubmissionOutcome::Failed { error, .. } = &outcome {
            event = event.with_error(error);
        }
        handler.tracer.log(&event);

        outcome
    }
}

impl Drop for ActiveSubmission {
    fn drop(&mut self) {
        self.handler.finish();
    }
}
