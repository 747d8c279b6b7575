use crate::{form::form_model::SubmissionRequest, handler::error::SubmitError};

/// Raw reply to a form POST. The body is parsed by the handler, whatever the status.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }
}

/// Sends a serialized form to the processing endpoint.
///
/// Implementations block until the response arrives; the handler runs them
/// on a task of their own when submissions must not block the caller.
pub trait Transport: Send + Sync {
    fn post(
        &self,
        endpoint: &str,
        request: &SubmissionRequest,
    ) -> Result<TransportResponse, SubmitError>;
}
