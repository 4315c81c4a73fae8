//! YAML frontmatter and heading extraction for notes.
//!
//! Handles the `---` delimited YAML frontmatter in markdown files.
//! Format:
//! ```markdown
//! ---
//! imageNameKey: diagram
//! tags: [design]
//! ---
//!
//! # Body content here
//! ```
//!
//! Notes are user-authored, so a missing or unterminated frontmatter block is
//! not an error: the note simply has no frontmatter.

use std::collections::HashMap;

use crate::error::PasteNameError;

/// Raw frontmatter mapping, keyed by the YAML key rendered as a string.
pub type Frontmatter = HashMap<String, serde_json::Value>;

/// Split a markdown file into frontmatter YAML and body content.
///
/// Returns `(yaml_str, body)` where `yaml_str` is the raw YAML between
/// `---` delimiters and `body` is everything after the closing `---`.
///
/// # Errors
///
/// Returns [`PasteNameError::Parse`] if the file does not open with a
/// frontmatter delimiter or the block is never closed.
pub fn split_frontmatter(content: &str) -> Result<(&str, &str), PasteNameError> {
    let content = content.trim_start_matches('\u{feff}');

    let after_first = content
        .strip_prefix("---")
        .ok_or_else(|| PasteNameError::Parse("note does not start with '---'".to_string()))?;
    let after_first = after_first
        .strip_prefix("\r\n")
        .or_else(|| after_first.strip_prefix('\n'))
        .ok_or_else(|| PasteNameError::Parse("'---' must be on its own line".to_string()))?;

    // Empty frontmatter block: the closing delimiter comes first.
    if let Some(rest) = after_first.strip_prefix("---") {
        return Ok(("", skip_line_end(rest)));
    }

    let close_pos = after_first.find("\n---").ok_or_else(|| {
        PasteNameError::Parse("No closing '---' frontmatter delimiter found".to_string())
    })?;

    let yaml = after_first[..close_pos].trim_end_matches('\r');
    let rest = &after_first[close_pos + 4..]; // skip \n---

    Ok((yaml, skip_line_end(rest)))
}

fn skip_line_end(rest: &str) -> &str {
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    rest.strip_prefix('\n').unwrap_or(rest)
}

/// Parse the frontmatter of a note.
///
/// Returns `(frontmatter, body)`. A note without a frontmatter block yields
/// `None` and the whole content as body.
///
/// # Errors
///
/// Returns [`PasteNameError::Serialization`] if the block is present but is
/// not a YAML mapping.
pub fn parse_frontmatter(content: &str) -> Result<(Option<Frontmatter>, &str), PasteNameError> {
    let Ok((yaml, body)) = split_frontmatter(content) else {
        return Ok((None, content));
    };

    if yaml.trim().is_empty() {
        return Ok((Some(Frontmatter::new()), body));
    }

    let value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| PasteNameError::Serialization(e.to_string()))?;

    let serde_yaml::Value::Mapping(mapping) = value else {
        return Err(PasteNameError::Serialization(
            "frontmatter must be a YAML mapping".to_string(),
        ));
    };

    let mut frontmatter = Frontmatter::with_capacity(mapping.len());
    for (key, value) in mapping {
        let Some(key) = yaml_key_to_string(&key) else {
            continue;
        };
        let value =
            serde_json::to_value(&value).map_err(|e| PasteNameError::Serialization(e.to_string()))?;
        frontmatter.insert(key, value);
    }

    Ok((Some(frontmatter), body))
}

fn yaml_key_to_string(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Text of the first level-1 ATX heading (`# Title`) in a markdown body.
///
/// Headings inside fenced code blocks are ignored; an optional closing
/// sequence of `#` is stripped.
#[must_use]
pub fn first_heading(body: &str) -> Option<String> {
    let mut in_fence: Option<&str> = None;

    for line in body.lines() {
        let trimmed = line.trim_start();

        if let Some(fence) = in_fence {
            if trimmed.starts_with(fence) {
                in_fence = None;
            }
            continue;
        }
        if trimmed.starts_with("```") {
            in_fence = Some("```");
            continue;
        }
        if trimmed.starts_with("~~~") {
            in_fence = Some("~~~");
            continue;
        }

        // At most three spaces of indentation, otherwise it is a code block.
        if line.len() - trimmed.len() > 3 {
            continue;
        }

        let Some(rest) = trimmed.strip_prefix('#') else {
            continue;
        };
        if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
            continue;
        }

        let text = rest.trim();
        let text = strip_closing_hashes(text);
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }

    None
}

fn strip_closing_hashes(text: &str) -> &str {
    let without = text.trim_end_matches('#');
    if without.len() == text.len() {
        return text;
    }
    if without.is_empty() || without.ends_with([' ', '\t']) {
        without.trim_end()
    } else {
        text
    }
}
