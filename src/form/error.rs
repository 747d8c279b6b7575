use std::fmt;

#[derive(Debug)]
pub enum FormError {
    /// Selected file could not be read from disk
    FileRead { path: String, source: std::io::Error },

    /// File input has no file selected
    NoFileSelected,

    /// File extension is not in the allowed set
    InvalidFileType { filename: String },

    /// File exceeds the configured upload limit
    FileTooLarge { filename: String, size: u64, limit: u64 },

    /// Action requires a question but none was given
    MissingQuestion,

    /// A form with the same id is already registered on the page
    DuplicateForm(String),

    /// Action name is not one of the known processing actions
    UnknownAction(String),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::FileRead { path, source } => {
                write!(f, "Could not read '{}': {}", path, source)
            }
            FormError::NoFileSelected => write!(f, "No file selected"),
            FormError::InvalidFileType { filename } => {
                write!(f, "Invalid file type: {}", filename)
            }
            FormError::FileTooLarge { filename, size, limit } => {
                write!(f, "File too large: {} ({} bytes, limit {})", filename, size, limit)
            }
            FormError::MissingQuestion => write!(f, "A question is required for this action"),
            FormError::DuplicateForm(id) => {
                write!(f, "Form '{}' is already registered", id)
            }
            FormError::UnknownAction(name) => write!(f, "Unknown action: {}", name),
        }
    }
}

impl std::error::Error for FormError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormError::FileRead { source, .. } => Some(source),
            _ => None,
        }
    }
}
