use serde_json::Value;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// No balanced, parseable JSON object exists in the text, even after
    /// fence stripping, brace scanning and truncation repair.
    NoJsonFound,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::NoJsonFound => {
                write!(f, "No JSON object found in model response")
            }
        }
    }
}

impl Error for ExtractError {}

/// Isolates a syntactically valid JSON-object substring from an arbitrary
/// model response. Tolerates markdown fences, surrounding prose, embedded
/// braces inside string values, and output truncated mid-object.
///
/// On success the returned text is guaranteed to parse to a JSON object
/// (not an array, not null, not a primitive).
pub fn extract(raw: &str) -> Result<String, ExtractError> {
    let candidate = strip_fences(raw.trim());

    // Common case: the whole reply is already the object.
    if parses_to_object(candidate) {
        return Ok(candidate.to_string());
    }

    // Brace-aware scan for the first balanced top-level object. A naive
    // first-`{`/last-`}` slice captures unrelated trailing braces from prose
    // after the object, and breaks when string values contain `{`/`}`.
    let bytes = candidate.as_bytes();
    let mut in_string = false;
    let mut escaped = false;
    let mut depth: usize = 0;
    let mut candidate_start: Option<usize> = None;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => {
                if depth == 0 {
                    candidate_start = Some(i);
                }
                depth += 1;
            }
            b'}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(start) = candidate_start {
                            let slice = &candidate[start..=i];
                            if parses_to_object(slice) {
                                return Ok(slice.to_string());
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    // Truncation repair: an object was opened but never closed, typically a
    // reply cut off at the token limit. Close the remaining depth and retry.
    if depth > 0 {
        if let Some(start) = candidate_start {
            let mut completed = candidate[start..].to_string();
            if in_string {
                completed.push('"');
            }
            for _ in 0..depth {
                completed.push('}');
            }
            if parses_to_object(&completed) {
                return Ok(completed);
            }
        }
    }

    Err(ExtractError::NoJsonFound)
}

fn parses_to_object(text: &str) -> bool {
    matches!(serde_json::from_str::<Value>(text), Ok(Value::Object(_)))
}

/// Strips one leading/trailing markdown fence (``` or ```json, any case)
/// when present at the very edges of the trimmed text. Fences elsewhere in
/// the text are left for the brace scan to deal with.
fn strip_fences(text: &str) -> &str {
    let mut inner = text;
    if let Some(rest) = inner.strip_prefix("```") {
        let rest = rest
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .trim_start();
        // Only commit to the strip if the tag was empty or "json"-like;
        // a fence opening a different language block is not our payload.
        let tag_len = inner.len() - 3 - rest.len();
        let tag = inner[3..3 + tag_len].trim();
        if tag.is_empty() || tag.eq_ignore_ascii_case("json") {
            inner = rest;
        }
    }
    if let Some(rest) = inner.strip_suffix("```") {
        inner = rest.trim_end();
    }
    inner.trim()
}
