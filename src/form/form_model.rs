use std::path::Path;

use crate::form::error::FormError;

/// Content type sent for a file input with nothing selected.
pub const EMPTY_FILE_CONTENT_TYPE: &str = "application/octet-stream";

// ============================================================================
// File blobs
// ============================================================================

/// A file selected in a file input, held in memory until submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct FileBlob {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileBlob {
    pub fn new(filename: &str, content_type: &str, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk. The content type is guessed from the extension.
    pub fn from_path(path: &Path) -> Result<Self, FormError> {
        let bytes = std::fs::read(path).map_err(|e| FormError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = guess_content_type(&filename);

        Ok(Self {
            filename,
            content_type: content_type.to_string(),
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased extension, if the filename has one.
    pub fn extension(&self) -> Option<String> {
        file_extension(&self.filename)
    }
}

pub fn file_extension(filename: &str) -> Option<String> {
    filename.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

pub fn guess_content_type(filename: &str) -> &'static str {
    match file_extension(filename).as_deref() {
        Some("txt") => "text/plain",
        Some("pdf") => "application/pdf",
        Some("json") => "application/json",
        Some("html") | Some("htm") => "text/html",
        Some("csv") => "text/csv",
        _ => EMPTY_FILE_CONTENT_TYPE,
    }
}

// ============================================================================
// Form controls
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Text { value: String },
    Hidden { value: String },
    TextArea { value: String },
    Select { value: String },
    Checkbox { value: String, checked: bool },
    Radio { value: String, checked: bool },
    File { files: Vec<FileBlob> },
    Submit,
    Button,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormControl {
    pub name: String,
    pub kind: ControlKind,
    pub disabled: bool,
}

impl FormControl {
    pub fn text(name: &str, value: &str) -> Self {
        Self::with_kind(name, ControlKind::Text { value: value.to_string() })
    }

    pub fn hidden(name: &str, value: &str) -> Self {
        Self::with_kind(name, ControlKind::Hidden { value: value.to_string() })
    }

    pub fn textarea(name: &str, value: &str) -> Self {
        Self::with_kind(name, ControlKind::TextArea { value: value.to_string() })
    }

    pub fn select(name: &str, value: &str) -> Self {
        Self::with_kind(name, ControlKind::Select { value: value.to_string() })
    }

    pub fn checkbox(name: &str, value: &str, checked: bool) -> Self {
        Self::with_kind(
            name,
            ControlKind::Checkbox {
                value: value.to_string(),
                checked,
            },
        )
    }

    pub fn radio(name: &str, value: &str, checked: bool) -> Self {
        Self::with_kind(
            name,
            ControlKind::Radio {
                value: value.to_string(),
                checked,
            },
        )
    }

    pub fn file(name: &str, files: Vec<FileBlob>) -> Self {
        Self::with_kind(name, ControlKind::File { files })
    }

    pub fn submit(name: &str) -> Self {
        Self::with_kind(name, ControlKind::Submit)
    }

    pub fn button(name: &str) -> Self {
        Self::with_kind(name, ControlKind::Button)
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    fn with_kind(name: &str, kind: ControlKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            disabled: false,
        }
    }

    /// Whether the control contributes entries to a submission.
    ///
    /// Disabled and unnamed controls never do; buttons never do; checkboxes
    /// and radios only when checked.
    pub fn is_successful(&self) -> bool {
        if self.disabled || self.name.is_empty() {
            return false;
        }
        match &self.kind {
            ControlKind::Submit | ControlKind::Button => false,
            ControlKind::Checkbox { checked, .. } | ControlKind::Radio { checked, .. } => *checked,
            _ => true,
        }
    }
}

// ============================================================================
// Upload form
// ============================================================================

/// One upload form instance on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadForm {
    pub id: String,
    pub controls: Vec<FormControl>,
}

impl UploadForm {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            controls: vec![],
        }
    }

    pub fn with_control(mut self, control: FormControl) -> Self {
        self.controls.push(control);
        self
    }

    pub fn control(&self, name: &str) -> Option<&FormControl> {
        self.controls.iter().find(|c| c.name == name)
    }

    /// Set the value of the first value-carrying control with this name.
    /// Returns false when no such control exists.
    pub fn set_value(&mut self, name: &str, new_value: &str) -> bool {
        for control in self.controls.iter_mut().filter(|c| c.name == name) {
            match &mut control.kind {
                ControlKind::Text { value }
                | ControlKind::Hidden { value }
                | ControlKind::TextArea { value }
                | ControlKind::Select { value } => {
                    *value = new_value.to_string();
                    return true;
                }
                _ => {}
            }
        }
        false
    }

    /// Check a checkbox or radio by name and value. Checking a radio
    /// unchecks the other radios of the same group.
    pub fn set_checked(&mut self, name: &str, target: &str, state: bool) -> bool {
        let is_radio_group = self.controls.iter().any(|c| {
            c.name == name && matches!(&c.kind, ControlKind::Radio { value, .. } if value == target)
        });

        let mut found = false;
        for control in self.controls.iter_mut().filter(|c| c.name == name) {
            match &mut control.kind {
                ControlKind::Checkbox { value, checked } if value == target => {
                    *checked = state;
                    found = true;
                }
                ControlKind::Radio { value, checked } => {
                    if value == target {
                        *checked = state;
                        found = true;
                    } else if is_radio_group && state {
                        *checked = false;
                    }
                }
                _ => {}
            }
        }
        found
    }

    /// Replace the selection of a file input.
    pub fn select_files(&mut self, name: &str, selection: Vec<FileBlob>) -> bool {
        for control in self.controls.iter_mut().filter(|c| c.name == name) {
            if let ControlKind::File { files } = &mut control.kind {
                *files = selection;
                return true;
            }
        }
        false
    }

    /// Serialize the current control values, in document order.
    pub fn serialize(&self) -> SubmissionRequest {
        let mut entries = Vec::new();

        for control in self.controls.iter().filter(|c| c.is_successful()) {
            let name = control.name.clone();
            match &control.kind {
                ControlKind::Text { value }
                | ControlKind::Hidden { value }
                | ControlKind::TextArea { value }
                | ControlKind::Select { value }
                | ControlKind::Checkbox { value, .. }
                | ControlKind::Radio { value, .. } => entries.push(FormEntry::Text {
                    name,
                    value: value.clone(),
                }),
                ControlKind::File { files } if files.is_empty() => entries.push(FormEntry::File {
                    name,
                    blob: FileBlob::new("", EMPTY_FILE_CONTENT_TYPE, Vec::new()),
                }),
                ControlKind::File { files } => {
                    for blob in files {
                        entries.push(FormEntry::File {
                            name: name.clone(),
                            blob: blob.clone(),
                        });
                    }
                }
                ControlKind::Submit | ControlKind::Button => {}
            }
        }

        SubmissionRequest { entries }
    }
}

// ============================================================================
// Submission request
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum FormEntry {
    Text { name: String, value: String },
    File { name: String, blob: FileBlob },
}

impl FormEntry {
    pub fn name(&self) -> &str {
        match self {
            FormEntry::Text { name, .. } | FormEntry::File { name, .. } => name,
        }
    }
}

/// Serialized form contents for one submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionRequest {
    pub entries: Vec<FormEntry>,
}

impl SubmissionRequest {
    pub fn field_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name().to_string()).collect()
    }

    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.entries.iter().find_map(|e| match e {
            FormEntry::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn files(&self) -> impl Iterator<Item = &FileBlob> {
        self.entries.iter().filter_map(|e| match e {
            FormEntry::File { blob, .. } => Some(blob),
            _ => None,
        })
    }
}
