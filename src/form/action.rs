use std::path::Path;
use std::str::FromStr;

use crate::form::{
    error::FormError,
    form_model::{FileBlob, FormControl, UploadForm},
};

/// 16 MiB, the server's request size limit.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["txt", "pdf"];

/// Processing actions understood by the `/process` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessAction {
    Semantic,
    Similarity,
    Summarization,
    QaUpload,
    QaQuery,
}

impl ProcessAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessAction::Semantic => "semantic",
            ProcessAction::Similarity => "similarity",
            ProcessAction::Summarization => "summarization",
            ProcessAction::QaUpload => "qa_upload",
            ProcessAction::QaQuery => "qa_query",
        }
    }

    /// `qa_query` works against the last uploaded document; everything else uploads one.
    pub fn requires_file(&self) -> bool {
        !matches!(self, ProcessAction::QaQuery)
    }

    pub fn requires_question(&self) -> bool {
        matches!(self, ProcessAction::QaQuery)
    }
}

impl FromStr for ProcessAction {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "semantic" => Ok(ProcessAction::Semantic),
            "similarity" => Ok(ProcessAction::Similarity),
            "summarization" => Ok(ProcessAction::Summarization),
            "qa_upload" => Ok(ProcessAction::QaUpload),
            "qa_query" => Ok(ProcessAction::QaQuery),
            other => Err(FormError::UnknownAction(other.to_string())),
        }
    }
}

/// Client-side checks applied before a file is attached to a form.
#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadLimits {
    pub fn check(&self, blob: &FileBlob) -> Result<(), FormError> {
        if blob.filename.is_empty() {
            return Err(FormError::NoFileSelected);
        }

        let allowed = blob
            .extension()
            .map(|ext| self.allowed_extensions.iter().any(|a| a.eq_ignore_ascii_case(&ext)))
            .unwrap_or(false);
        if !allowed {
            return Err(FormError::InvalidFileType {
                filename: blob.filename.clone(),
            });
        }

        if blob.size() > self.max_upload_bytes {
            return Err(FormError::FileTooLarge {
                filename: blob.filename.clone(),
                size: blob.size(),
                limit: self.max_upload_bytes,
            });
        }

        Ok(())
    }
}

/// Build the form the host pages render for an action: a hidden `action`
/// field, an optional `question`, the `file` input and a submit button.
pub fn build_action_form(
    id: &str,
    action: ProcessAction,
    file: Option<FileBlob>,
    question: Option<&str>,
    limits: &UploadLimits,
) -> Result<UploadForm, FormError> {
    let mut form = UploadForm::new(id).with_control(FormControl::hidden("action", action.as_str()));

    if action.requires_question() || question.is_some() {
        let question = question.unwrap_or_default();
        if action.requires_question() && question.trim().is_empty() {
            return Err(FormError::MissingQuestion);
        }
        form = form.with_control(FormControl::text("question", question));
    }

    if action.requires_file() {
        let blob = file.ok_or(FormError::NoFileSelected)?;
        limits.check(&blob)?;
        form = form.with_control(FormControl::file("file", vec![blob]));
    }

    Ok(form.with_control(FormControl::submit("submit")))
}

/// Convenience wrapper reading the file from disk first.
pub fn build_action_form_from_path(
    id: &str,
    action: ProcessAction,
    path: Option<&Path>,
    question: Option<&str>,
    limits: &UploadLimits,
) -> Result<UploadForm, FormError> {
    let file = match path {
        Some(p) => Some(FileBlob::from_path(p)?),
        None => None,
    };
    build_action_form(id, action, file, question, limits)
}
