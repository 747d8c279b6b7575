use reqwest::blocking::{
    Client,
    multipart::{Form, Part},
};

use crate::{
    form::form_model::{FormEntry, SubmissionRequest},
    handler::error::SubmitError,
    transport::transport::{Transport, TransportResponse},
};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Multipart POST over HTTP.
pub struct HttpTransport {
    pub base_url: String,
    client: Client,
}

impl HttpTransport {
    /// The client carries no request timeout; a slow action waits for its response.
    pub fn new(base_url: &str) -> Result<Self, SubmitError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(None)
            .build()
            .map_err(|e| SubmitError::Transport {
                endpoint: base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self { base_url, client })
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }
}

impl Transport for HttpTransport {
    fn post(
        &self,
        endpoint: &str,
        request: &SubmissionRequest,
    ) -> Result<TransportResponse, SubmitError> {
        let url = self.url_for(endpoint);
        let form = to_multipart(request)?;

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| SubmitError::Transport {
                endpoint: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| SubmitError::Transport {
            endpoint: url,
            message: e.to_string(),
        })?;

        Ok(TransportResponse { status, body })
    }
}

/// Encode a submission as `multipart/form-data`, one part per entry.
pub fn to_multipart(request: &SubmissionRequest) -> Result<Form, SubmitError> {
    let mut form = Form::new();

    for entry in &request.entries {
        form = match entry {
            FormEntry::Text { name, value } => form.text(name.clone(), value.clone()),
            FormEntry::File { name, blob } => {
                let part = Part::bytes(blob.bytes.clone())
                    .file_name(blob.filename.clone())
                    .mime_str(&blob.content_type)
                    .map_err(|e| SubmitError::Encoding(format!("{}: {}", blob.filename, e)))?;
                form.part(name.clone(), part)
            }
        };
    }

    Ok(form)
}
