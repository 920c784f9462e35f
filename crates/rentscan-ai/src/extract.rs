//! Pull a JSON object out of free-form model output.

use serde_json::{Map, Value};

use crate::VisionError;

const FENCE: &str = "```";

/// Extract the JSON object embedded in a model completion.
///
/// Keeps only the body of the first fenced code block when there is one,
/// then parses the text from the first `{` to the last `}`. The result must
/// be a JSON object.
pub fn extract_json(raw: &str) -> Result<Map<String, Value>, VisionError> {
    let text = raw.trim();
    let fenced = fenced_body(text);
    let body = match &fenced {
        Some(inner) if inner.contains('{') => inner.as_str(),
        _ => text,
    };

    let candidate = match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => return Err(unparsable("no JSON object found", raw)),
    };

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(unparsable("not a JSON object", raw)),
        Err(e) => Err(unparsable(&e.to_string(), raw)),
    }
}

/// Lines between the first fence line and the next one. An unclosed fence
/// runs to the end of the text.
fn fenced_body(text: &str) -> Option<String> {
    let mut lines = text.lines();
    lines.by_ref().find(|line| line.trim_start().starts_with(FENCE))?;
    let body: Vec<&str> = lines
        .take_while(|line| !line.trim_start().starts_with(FENCE))
        .collect();
    Some(body.join("\n"))
}

fn unparsable(reason: &str, raw: &str) -> VisionError {
    VisionError::UnparsableOutput {
        reason: reason.to_string(),
        raw: raw.to_string(),
    }
}
