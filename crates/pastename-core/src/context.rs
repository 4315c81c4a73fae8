//! Name context: the per-rename values the template renderer reads from.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Frontmatter key holding the note-level naming key.
pub const IMAGE_NAME_KEY: &str = "imageNameKey";

/// Everything the renderer knows about the note an attachment was pasted into.
///
/// Built fresh for every rename and discarded afterwards. Missing values are
/// empty strings, never errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameContext {
    /// `imageNameKey` from the note frontmatter.
    #[serde(default)]
    pub image_name_key: String,

    /// Note base name without extension.
    #[serde(default)]
    pub file_name: String,

    /// Name of the directory holding the note; empty at the vault root.
    #[serde(default)]
    pub dir_name: String,

    /// Text of the first level-1 heading in the note.
    #[serde(default)]
    pub first_heading: String,

    /// Raw frontmatter key/value pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<HashMap<String, serde_json::Value>>,
}

impl NameContext {
    /// Build a context from the pieces of a note.
    ///
    /// `image_name_key` is read out of the frontmatter so callers never have
    /// to special-case it.
    #[must_use]
    pub fn from_note(
        file_name: impl Into<String>,
        dir_name: impl Into<String>,
        first_heading: Option<String>,
        frontmatter: Option<HashMap<String, serde_json::Value>>,
    ) -> Self {
        let image_name_key = frontmatter
            .as_ref()
            .and_then(|fm| fm.get(IMAGE_NAME_KEY))
            .map(value_to_string)
            .unwrap_or_default();

        Self {
            image_name_key,
            file_name: file_name.into(),
            dir_name: dir_name.into(),
            first_heading: first_heading.unwrap_or_default(),
            frontmatter,
        }
    }

    /// String value of a frontmatter key, `None` if the key (or the whole
    /// frontmatter) is absent.
    #[must_use]
    pub fn frontmatter_value(&self, key: &str) -> Option<String> {
        self.frontmatter
            .as_ref()
            .and_then(|fm| fm.get(key))
            .map(value_to_string)
    }
}

/// Render a frontmatter scalar the way it should appear inside a file name.
///
/// Sequences are joined with `,`; mappings fall back to compact JSON.
#[must_use]
pub fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        serde_json::Value::Object(_) => value.to_string(),
    }
}
