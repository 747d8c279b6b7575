use std::path::Path;
use std::sync::Arc;

use crate::cli::config::{
    AppConfig, build_submission_options, build_upload_limits, resolve_base_url,
};
use crate::form::action::{ProcessAction, build_action_form_from_path};
use crate::form::form_model::UploadForm;
use crate::handler::handler::{FormSubmissionHandler, SubmissionOutcome, SubmitEvent};
use crate::handler::page::UploadPage;
use crate::handler::regions::FormRegions;
use crate::report::console::format_console;
use crate::report::html::{render_html, render_page};
use crate::trace::logger::TraceLogger;
use crate::transport::http::HttpTransport;
use crate::transport::mock::MockTransport;

// ============================================================================
// submit subcommand
// ============================================================================

pub struct SubmitArgs<'a> {
    pub action: &'a str,
    pub file: Option<&'a str>,
    pub question: Option<&'a str>,
    pub url: Option<&'a str>,
    pub endpoint: Option<&'a str>,
    pub format: &'a str,
    pub output: Option<&'a str>,
}

/// Upload a document and write the rendered result. Returns whether the
/// submission succeeded.
pub fn cmd_submit(
    args: &SubmitArgs<'_>,
    config: &AppConfig,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let action: ProcessAction = args.action.parse()?;
    let limits = build_upload_limits(config);
    let form = build_action_form_from_path(
        action.as_str(),
        action,
        args.file.map(Path::new),
        args.question,
        &limits,
    )?;

    let base_url = resolve_base_url(config, args.url);
    let options = build_submission_options(config, args.endpoint);

    if verbose > 0 {
        eprintln!(
            "Submitting '{}' to {}{}...",
            action.as_str(),
            base_url,
            options.endpoint
        );
    }

    let mut page = UploadPage::new(Arc::new(HttpTransport::new(base_url)?), options)
        .with_tracer(build_tracer(config, verbose));
    let regions = FormRegions::new();
    page.register(form, regions.clone())?;

    let outcome = page
        .spawn_submit(action.as_str())
        .ok_or("form was not registered")?
        .join();

    if verbose > 1 {
        eprintln!("  Outcome: {}", outcome.label());
    }

    write_outcome(action.as_str(), &outcome, &regions, args.format, args.output)?;
    Ok(!outcome.is_failure())
}

// ============================================================================
// render subcommand
// ============================================================================

/// Run a saved response body through the handler as if the server had sent it.
pub fn cmd_render(
    input: &str,
    format: &str,
    output: Option<&str>,
    config: &AppConfig,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let body = std::fs::read_to_string(input)?;

    if verbose > 0 {
        eprintln!("Rendering response from {} ({} bytes)", input, body.len());
    }

    let form_id = form_id_for(input);
    let regions = FormRegions::new();
    let handler = FormSubmissionHandler::new(
        UploadForm::new(&form_id),
        regions.clone(),
        Arc::new(MockTransport::body(&body)),
        build_submission_options(config, None),
    );

    let outcome = handler.submit(&mut SubmitEvent::new());
    write_outcome(&form_id, &outcome, &regions, format, output)?;
    Ok(!outcome.is_failure())
}

// ============================================================================
// Helpers
// ============================================================================

fn build_tracer(config: &AppConfig, verbose: u8) -> Arc<TraceLogger> {
    match config.trace.path.as_deref() {
        Some(path) => {
            if verbose > 1 {
                eprintln!("  Tracing to {}", path);
            }
            Arc::new(TraceLogger::new(path))
        }
        None => Arc::new(TraceLogger::disabled()),
    }
}

fn write_outcome(
    form_id: &str,
    outcome: &SubmissionOutcome,
    regions: &FormRegions,
    format: &str,
    output: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = match format {
        "html" => render_page(
            form_id,
            &render_html(&regions.result_nodes()),
            &regions.error_text(),
        ),
        _ => format_console(form_id, outcome),
    };

    match output {
        Some(path) => std::fs::write(path, &content)?,
        None => print!("{}", content),
    }
    Ok(())
}

/// Derive a form id from a file path: the file stem, sanitized.
pub fn form_id_for(path: &str) -> String {
    let stem = Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let id = sanitize_id(&stem);
    if id.is_empty() { "response".to_string() } else { id }
}

/// Lowercase alphanumerics, everything else collapsed to single dashes.
pub fn sanitize_id(name: &str) -> String {
    let mut out = String::new();
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}
