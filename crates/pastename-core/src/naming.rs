//! Turning a template and a note context into a candidate file name.

use serde::Serialize;

use crate::context::NameContext;
use crate::dedup::join_name;
use crate::sanitize::{is_meaningful, sanitize_file_name};
use crate::template::{render, RenderOptions};

/// A freshly generated, not yet de-duplicated name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedName {
    /// Sanitized, trimmed stem.
    pub stem: String,
    /// `stem.extension`.
    pub new_name: String,
    /// False when the stem is empty once the delimiter and whitespace are
    /// ignored; such names must go through manual naming instead.
    pub is_meaningful: bool,
}

/// Render `template` against `ctx` and attach `extension`.
#[must_use]
pub fn generate_new_name(
    template: &str,
    ctx: &NameContext,
    extension: &str,
    delimiter: &str,
    opts: &RenderOptions,
) -> GeneratedName {
    finish(&render(template, ctx, opts), extension, delimiter)
}

/// Sanitize an already rendered stem into a [`GeneratedName`].
#[must_use]
pub fn finish(rendered: &str, extension: &str, delimiter: &str) -> GeneratedName {
    let stem = sanitize_file_name(rendered);
    GeneratedName {
        new_name: join_name(&stem, extension),
        is_meaningful: is_meaningful(&stem, delimiter),
        stem,
    }
}
