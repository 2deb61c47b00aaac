//! Extraction of JSON object literals from DAT payloads.
//!
//! A DAT export is a fixed device preamble followed by loosely concatenated
//! JSON objects, sometimes with garbage or truncated fragments in between.
//! The scanner looks for the next `{`, tries to decode one complete value
//! from there, and on failure steps one character past that brace and
//! resynchronizes on the next one.

use serde_json::{Map, Value};
use tracing::debug;

use crate::{WorkoutError, WorkoutResult};

pub type JsonObject = Map<String, Value>;

/// Scan `payload` for every decodable JSON object, in encounter order.
pub fn extract_json_objects(payload: &str) -> Vec<JsonObject> {
    let mut objects = Vec::new();
    let mut cursor = 0usize;
    let mut skipped = 0usize;

    while let Some(offset) = payload[cursor..].find('{') {
        let start = cursor + offset;
        let mut stream = serde_json::Deserializer::from_str(&payload[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) => {
                if let Value::Object(obj) = value {
                    objects.push(obj);
                }
                cursor = start + stream.byte_offset();
            }
            _ => {
                // `{` is a single byte, so this stays on a char boundary.
                skipped += 1;
                cursor = start + 1;
            }
        }
    }

    debug!(objects = objects.len(), skipped, "scanned payload");
    objects
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\u{0b}'
            | '\u{0c}'
            | '\u{1c}'
            | '\u{1d}'
            | '\u{1e}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Lines split on every Unicode line boundary, `\r\n` counting as one.
/// A trailing terminator does not produce an empty last line.
fn split_lines(raw: &str) -> impl Iterator<Item = &str> {
    let mut rest = raw;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.char_indices().find(|&(_, c)| is_line_break(c)) {
            Some((at, c)) => {
                let line = &rest[..at];
                let mut next = at + c.len_utf8();
                if c == '\r' && rest[next..].starts_with('\n') {
                    next += 1;
                }
                rest = &rest[next..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}

/// Strip the device preamble and extract workout objects.
///
/// Fails with [`WorkoutError::NoWorkoutData`] when nothing decodes, which
/// almost always means the wrong file was supplied.
pub fn parse_dat_payload(raw: &str, header_lines: usize) -> WorkoutResult<Vec<JsonObject>> {
    let body = split_lines(raw)
        .skip(header_lines)
        .collect::<Vec<_>>()
        .join("\n");
    let objects = extract_json_objects(&body);
    if objects.is_empty() {
        return Err(WorkoutError::NoWorkoutData);
    }
    Ok(objects)
}
