use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    form::form_model::SubmissionRequest,
    handler::{error::SubmitError, handler::SubmissionState},
};

#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub form_id: String,

    pub state: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_digests: Vec<String>,

    pub outcome: Option<String>,
    pub error_kind: Option<String>,
    pub error: Option<String>,
}

impl TraceEvent {
    pub fn now(form_id: &str, state: SubmissionState) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            form_id: form_id.to_string(),
            state: format!("{:?}", state),
            entries: vec![],
            file_digests: vec![],
            outcome: None,
            error_kind: None,
            error: None,
        }
    }

    /// Field names and SHA-1 digests of uploaded files; never file contents.
    pub fn with_request(mut self, request: &SubmissionRequest) -> Self {
        self.entries = request.field_names();
        self.file_digests = request
            .files()
            .filter(|blob| !blob.filename.is_empty())
            .map(|blob| format!("{}:{}", blob.filename, content_digest(&blob.bytes)))
            .collect();
        self
    }

    pub fn with_outcome(mut self, outcome: impl ToString) -> Self {
        self.outcome = Some(outcome.to_string());
        self
    }

    pub fn with_error(mut self, error: &SubmitError) -> Self {
        self.error_kind = Some(error.kind().to_string());
        self.error = Some(error.to_string());
        self
    }
}

pub fn content_digest(bytes: &[u8]) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
