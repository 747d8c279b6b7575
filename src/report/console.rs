use crate::handler::handler::SubmissionOutcome;

// ============================================================================
// Console reporter
// ============================================================================

/// Format a submission outcome for the terminal.
///
/// ```text
/// === semantic: rendered ===
///
/// first line
/// second line
/// ```
pub fn format_console(form_id: &str, outcome: &SubmissionOutcome) -> String {
    let mut out = format!("=== {}: {} ===\n\n", form_id, outcome.label());

    match outcome {
        SubmissionOutcome::Rendered(nodes) => {
            let blocks: Vec<String> = nodes.iter().map(|n| n.text()).collect();
            out.push_str(&blocks.join("\n\n"));
            out.push('\n');
        }
        SubmissionOutcome::NoResult => out.push_str("(no result)\n"),
        SubmissionOutcome::Failed { message, error } => {
            out.push_str(&format!("[ERROR] {}\n", message));
            if message != &error.to_string() {
                out.push_str(&format!("    cause: {}\n", error));
            }
        }
        SubmissionOutcome::Rejected => {
            out.push_str("A submission for this form is already in flight\n");
        }
    }

    out
}
