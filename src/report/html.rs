use crate::render::renderer::RenderedNode;

// ============================================================================
// Result region markup
// ============================================================================

/// Markup a result region holds after rendering `nodes`.
///
/// `Markup` nodes are inserted as-is; every other node is escaped text.
pub fn render_html(nodes: &[RenderedNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            RenderedNode::Markup(markup) => out.push_str(markup),
            RenderedNode::Paragraph(text) => {
                out.push_str(&format!("<p>{}</p>", escape_html(text)));
            }
            RenderedNode::Preformatted(text) => {
                out.push_str(&format!("<pre>{}</pre>", escape_html(text)));
            }
            RenderedNode::Text(text) => out.push_str(&escape_html(text)),
        }
    }
    out
}

/// Standalone page showing one form's regions, for `--format html`.
pub fn render_page(form_id: &str, result_html: &str, error_text: &str) -> String {
    let error_block = if error_text.is_empty() {
        String::new()
    } else {
        format!(
            "<div class=\"error-message\">{}</div>\n",
            escape_html(error_text)
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
.error-message {{ color: #f44336; }}
.result-box pre {{ background: #f5f5f5; padding: 1em; }}
</style>
</head>
<body>
<form class="upload-form" id="{id}">
{error}<div class="result-box">{result}</div>
</form>
</body>
</html>
"#,
        title = escape_html(form_id),
        id = escape_html(form_id),
        error = error_block,
        result = result_html,
    )
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
