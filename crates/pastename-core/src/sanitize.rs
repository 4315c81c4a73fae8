//! File name sanitizing and delimiter validation.

use crate::error::PolicyError;

/// Characters removed from generated names: reserved on common file systems,
/// or breaking wiki links inside notes.
const ILLEGAL_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|', '#', '^', '[', ']'];

/// Delimiter used when a configured one sanitizes to nothing.
pub const FALLBACK_DELIMITER: &str = "-";

fn is_illegal(c: char) -> bool {
    ILLEGAL_CHARS.contains(&c) || c.is_control()
}

/// Remove characters not permitted in file names and trim whitespace.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !is_illegal(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sanitize a delimiter typed into settings, falling back to `-` when
/// nothing usable is left.
#[must_use]
pub fn sanitize_delimiter(delimiter: &str) -> String {
    let cleaned = sanitize_file_name(delimiter);
    if cleaned.is_empty() {
        FALLBACK_DELIMITER.to_string()
    } else {
        cleaned
    }
}

/// Check that `delimiter` can be embedded in a file name.
///
/// # Errors
///
/// Returns [`PolicyError::EmptyDelimiter`] for an empty delimiter and
/// [`PolicyError::IllegalDelimiterChar`] for the first illegal character.
pub fn validate_delimiter(delimiter: &str) -> Result<(), PolicyError> {
    if delimiter.is_empty() {
        return Err(PolicyError::EmptyDelimiter);
    }
    if let Some(ch) = delimiter.chars().find(|c| is_illegal(*c)) {
        return Err(PolicyError::IllegalDelimiterChar {
            delimiter: delimiter.to_string(),
            ch,
        });
    }
    Ok(())
}

/// Whether a rendered stem is worth auto-assigning.
///
/// A stem made only of whitespace and characters of the duplicate-number
/// delimiter (e.g. `-` left over from `{{imageNameKey}}-{{dirName}}` with
/// both empty) is not meaningful.
#[must_use]
pub fn is_meaningful(stem: &str, delimiter: &str) -> bool {
    stem.chars()
        .any(|c| !c.is_whitespace() && !delimiter.contains(c))
}
