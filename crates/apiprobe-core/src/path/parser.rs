//! Path expression parser
//!
//! Grammar: segments separated by `.`; inside a segment every `[]` is an
//! array projection and the text between projections is a property key.
//! `items[]name`, `items.[].name` and `items.[]name` are the same path.
//!
//! Copyright (c) 2025 Apiprobe Team
//! Licensed under the Apache-2.0 license

use super::error::PathError;

const PROJECTION: &str = "[]";

/// One step of a parsed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Select a property of an object, or an index of an array when numeric
    Key(String),
    /// Resolve the rest of the path against every array element
    Project,
}

/// Parse a path string into its segments
pub fn parse(input: &str) -> Result<Vec<Segment>, PathError> {
    let mut segments = Vec::new();
    if input.is_empty() {
        return Ok(segments);
    }

    let mut offset = 0;
    for raw in input.split('.') {
        if raw.is_empty() {
            return Err(PathError::EmptySegment {
                input: input.to_string(),
                position: offset,
            });
        }
        parse_segment(input, raw, offset, &mut segments)?;
        offset += raw.len() + 1;
    }

    Ok(segments)
}

fn parse_segment(
    input: &str,
    raw: &str,
    offset: usize,
    segments: &mut Vec<Segment>,
) -> Result<(), PathError> {
    let mut rest = raw;
    let mut position = offset;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix(PROJECTION) {
            segments.push(Segment::Project);
            rest = after;
            position += PROJECTION.len();
            continue;
        }

        let key_len = rest.find(PROJECTION).unwrap_or(rest.len());
        let key = &rest[..key_len];
        if let Some((index, found)) = key.char_indices().find(|(_, c)| matches!(c, '[' | ']')) {
            return Err(PathError::UnexpectedCharacter {
                input: input.to_string(),
                position: position + index,
                found,
            });
        }
        segments.push(Segment::Key(key.to_string()));
        rest = &rest[key_len..];
        position += key_len;
    }

    Ok(())
}
