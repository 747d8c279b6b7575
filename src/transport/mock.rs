use std::sync::{
    Mutex,
    mpsc::{self, Receiver, RecvTimeoutError, Sender},
};
use std::time::Duration;

use serde_json::Value;

use crate::{
    form::form_model::SubmissionRequest,
    handler::{error::SubmitError, regions::lock},
    transport::transport::{Transport, TransportResponse},
};

#[derive(Debug, Clone)]
enum MockReply {
    Body(TransportResponse),
    Unreachable(String),
}

/// A request the mock received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub endpoint: String,
    pub request: SubmissionRequest,
}

struct Gate {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

/// Test side of a gated mock: observe a request arriving, then let it answer.
pub struct GateHandle {
    entered: Receiver<()>,
    release: Sender<()>,
}

impl GateHandle {
    /// Block until a request is inside `post`, or the timeout passes.
    pub fn wait_entered(&self, timeout: Duration) -> bool {
        match self.entered.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Let one held request return its reply.
    pub fn release(&self) {
        let _ = self.release.send(());
    }
}

/// Canned transport for tests and offline rendering.
pub struct MockTransport {
    reply: MockReply,
    requests: Mutex<Vec<RecordedRequest>>,
    gate: Option<Gate>,
}

impl MockTransport {
    pub fn body(body: &str) -> Self {
        Self::with_reply(MockReply::Body(TransportResponse::ok(body)))
    }

    pub fn json(value: Value) -> Self {
        Self::body(&value.to_string())
    }

    pub fn with_status(status: u16, body: &str) -> Self {
        Self::with_reply(MockReply::Body(TransportResponse {
            status,
            body: body.to_string(),
        }))
    }

    /// Every request fails before reaching a server.
    pub fn unreachable(message: &str) -> Self {
        Self::with_reply(MockReply::Unreachable(message.to_string()))
    }

    /// Hold each request inside `post` until the returned handle releases it.
    pub fn gated(self) -> (Self, GateHandle) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let transport = Self {
            gate: Some(Gate {
                entered: Mutex::new(entered_tx),
                release: Mutex::new(release_rx),
            }),
            ..self
        };
        let handle = GateHandle {
            entered: entered_rx,
            release: release_tx,
        };
        (transport, handle)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    fn with_reply(reply: MockReply) -> Self {
        Self {
            reply,
            requests: Mutex::new(vec![]),
            gate: None,
        }
    }
}

impl Transport for MockTransport {
    fn post(
        &self,
        endpoint: &str,
        request: &SubmissionRequest,
    ) -> Result<TransportResponse, SubmitError> {
        lock(&self.requests).push(RecordedRequest {
            endpoint: endpoint.to_string(),
            request: request.clone(),
        });

        if let Some(gate) = &self.gate {
            let _ = lock(&gate.entered).send(());
            let _ = lock(&gate.release).recv();
        }

        match &self.reply {
            MockReply::Body(response) => Ok(response.clone()),
            MockReply::Unreachable(message) => Err(SubmitError::Transport {
                endpoint: endpoint.to_string(),
                message: message.clone(),
            }),
        }
    }
}
