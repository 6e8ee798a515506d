//! Best-effort recovery of JSON embedded in free text.

use serde_json::Value;

/// Finds a JSON object inside `text`.
///
/// Tries the span from the first `{` to the last `}` first, then the first
/// balanced `{...}` span. Returns `None` when neither parses as an object.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    parse_object(&text[start..=end]).or_else(|| parse_object(balanced_span(&text[start..])?))
}

fn parse_object(candidate: &str) -> Option<Value> {
    serde_json::from_str::<Value>(candidate)
        .ok()
        .filter(Value::is_object)
}

/// Shortest prefix of `text` (which starts at `{`) with balanced braces,
/// ignoring braces inside string literals.
fn balanced_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
