use serde_json::{Number, Value};

use crate::response::response_model::ResultPayload;

/// A node placed into a form's result region.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedNode {
    /// Trusted markup, inserted as-is (text results with `<br>` line breaks)
    Markup(String),
    /// Text in its own paragraph block
    Paragraph(String),
    /// Text in a preformatted block
    Preformatted(String),
    /// Bare text
    Text(String),
}

impl RenderedNode {
    /// Visible text of the node, with markup line breaks turned back into newlines.
    pub fn text(&self) -> String {
        match self {
            RenderedNode::Markup(m) => m.replace("<br>", "\n"),
            RenderedNode::Paragraph(t) | RenderedNode::Preformatted(t) | RenderedNode::Text(t) => {
                t.clone()
            }
        }
    }
}

pub fn render_payload(payload: &ResultPayload) -> Vec<RenderedNode> {
    match payload {
        ResultPayload::Text(text) => vec![render_text(text)],
        ResultPayload::Sequence(items) => render_sequence(items),
        ResultPayload::Structured(map) => {
            vec![RenderedNode::Preformatted(pretty_json(&Value::Object(map.clone())))]
        }
        ResultPayload::Scalar(value) => {
            vec![RenderedNode::Text(normalize_numbers(value).to_string())]
        }
    }
}

fn render_text(text: &str) -> RenderedNode {
    RenderedNode::Markup(text.replace("\r\n", "\n").replace('\n', "<br>"))
}

fn render_sequence(items: &[Value]) -> Vec<RenderedNode> {
    items
        .iter()
        .map(|item| {
            let text = match item {
                Value::String(s) => s.clone(),
                Value::Array(_) | Value::Object(_) => pretty_json(item),
                other => normalize_numbers(other).to_string(),
            };
            RenderedNode::Paragraph(text)
        })
        .collect()
}

/// Two-space indented JSON, keys in received order.
pub fn pretty_json(value: &Value) -> String {
    let value = normalize_numbers(value);
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

/// Largest integer an `f64` holds exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Rewrite whole-valued floats as integers, so `2.0` reads `2` and `1e2` reads `100`.
pub fn normalize_numbers(value: &Value) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
                Value::Number(Number::from(f as i64))
            }
            _ => value.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(normalize_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize_numbers(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}
