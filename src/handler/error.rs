use std::fmt;

/// Shown when a failure carries no message fit for the user.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred during processing";

#[derive(Debug)]
pub enum SubmitError {
    /// Request never produced a response (connection refused, reset, ...)
    Transport { endpoint: String, message: String },

    /// Form contents could not be encoded as a multipart body
    Encoding(String),

    /// Response body was not valid JSON
    MalformedBody { status: u16, source: serde_json::Error },

    /// Server answered with an `error` field
    Server(String),

    /// Server answered without a `result` field
    MissingResult,

    /// Submission task ended without reporting back
    TaskFailed(String),
}

impl SubmitError {
    /// Text for the form's error region.
    ///
    /// Only server-provided messages are shown verbatim; every other
    /// failure collapses to `fallback`.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            SubmitError::Server(message) if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SubmitError::Transport { .. } => "transport",
            SubmitError::Encoding(_) => "encoding",
            SubmitError::MalformedBody { .. } => "malformed_body",
            SubmitError::Server(_) => "server",
            SubmitError::MissingResult => "missing_result",
            SubmitError::TaskFailed(_) => "task_failed",
        }
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Transport { endpoint, message } => {
                write!(f, "Request to {} failed: {}", endpoint, message)
            }
            SubmitError::Encoding(msg) => write!(f, "Could not encode form: {}", msg),
            SubmitError::MalformedBody { status, source } => {
                write!(f, "Response (HTTP {}) is not valid JSON: {}", status, source)
            }
            SubmitError::Server(msg) => write!(f, "Server error: {}", msg),
            SubmitError::MissingResult => write!(f, "Response has no result"),
            SubmitError::TaskFailed(msg) => write!(f, "Submission task failed: {}", msg),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmitError::MalformedBody { source, .. } => Some(source),
            _ => None,
        }
    }
}
