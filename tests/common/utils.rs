use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use upload_form::form::form_model::{FileBlob, FormControl, UploadForm};

pub const TIMEOUT: Duration = Duration::from_secs(5);

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Unique path under the system temp dir; the file is not created.
pub fn temp_path(name: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("upload-form-{}-{}-{}", std::process::id(), n, name))
}

pub fn text_file(name: &str, contents: &str) -> FileBlob {
    FileBlob::new(name, "text/plain", contents.as_bytes().to_vec())
}

/// The form the semantic page renders: hidden action, file input, submit.
pub fn upload_form(id: &str, action: &str) -> UploadForm {
    UploadForm::new(id)
        .with_control(FormControl::hidden("action", action))
        .with_control(FormControl::file("file", vec![text_file("doc.txt", "hello")]))
        .with_control(FormControl::submit("submit"))
}
