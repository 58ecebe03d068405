//! Normalizes engine grounding chunks into `Source`s.

use serde_json::Value;

use crate::models::Source;

/// Keeps every chunk that exposes a non-empty `web.title` and `web.uri`, in
/// input order. Anything else (missing `web`, non-string fields, blanks) is
/// dropped silently.
pub fn extract_sources(chunks: &[Value]) -> Vec<Source> {
    chunks.iter().filter_map(source_from_chunk).collect()
}

fn source_from_chunk(chunk: &Value) -> Option<Source> {
    let title = non_empty_str(chunk.pointer("/web/title"))?;
    let uri = non_empty_str(chunk.pointer("/web/uri"))?;
    Some(Source {
        title: title.to_string(),
        uri: uri.to_string(),
    })
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
