//! Template renderer for attachment names.
//!
//! A template such as `{{imageNameKey}}-{{DATE:YYYYMMDD}}` is expanded
//! against a [`NameContext`]. Recognized placeholders:
//!
//! - `{{DATE:FORMAT}}`
//! - `{{frontmatter:KEY}}`
//! - `{{imageNameKey}}`, `{{fileName}}`, `{{dirName}}`, `{{firstHeading}}`
//! - `{{uuid}}`, `{{hex}}`, `{{hex4}}`, `{{hex8}}`, `{{hex12}}`
//!
//! All of them are substituted in one scan of the template, so text
//! inserted for one placeholder is never expanded again. Anything else
//! between `{{` and `}}` is left untouched.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Local};
use rand::RngCore;
use regex::{Captures, Regex};

use crate::context::NameContext;
use crate::date_format::format_moment;
use crate::random::{random_hex, random_uuid, DEFAULT_HEX_LEN};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\{\{(?:DATE:(?P<date>[^}]*)|frontmatter:(?P<key>[^}]+)|(?P<name>imageNameKey|fileName|dirName|firstHeading|uuid|hex12|hex8|hex4|hex))\}\}",
    )
    .expect("static regex")
});

/// Rendering knobs that come from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Delimiter between the groups of a `{{uuid}}` token.
    pub uuid_delimiter: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            uuid_delimiter: "-".to_string(),
        }
    }
}

/// Render `template` with the current local time and the thread RNG.
#[must_use]
pub fn render(template: &str, ctx: &NameContext, opts: &RenderOptions) -> String {
    let now = Local::now().fixed_offset();
    render_with(template, ctx, &now, &mut rand::thread_rng(), opts)
}

/// Render `template` with an explicit clock value and random source.
///
/// All date tokens see the same `now`. Every random token draws fresh
/// values from `rng`, in template order.
pub fn render_with<R: RngCore + ?Sized>(
    template: &str,
    ctx: &NameContext,
    now: &DateTime<FixedOffset>,
    rng: &mut R,
    opts: &RenderOptions,
) -> String {
    if template.is_empty() {
        return String::new();
    }

    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            if let Some(format) = caps.name("date") {
                return format_moment(now, format.as_str());
            }
            if let Some(key) = caps.name("key") {
                return ctx.frontmatter_value(key.as_str()).unwrap_or_default();
            }
            match caps.name("name").map_or("", |m| m.as_str()) {
                "imageNameKey" => ctx.image_name_key.clone(),
                "fileName" => ctx.file_name.clone(),
                "dirName" => ctx.dir_name.clone(),
                "firstHeading" => ctx.first_heading.clone(),
                "uuid" => random_uuid(&mut *rng, &opts.uuid_delimiter),
                "hex4" => random_hex(&mut *rng, 4),
                "hex8" => random_hex(&mut *rng, 8),
                "hex12" => random_hex(&mut *rng, 12),
                _ => random_hex(&mut *rng, DEFAULT_HEX_LEN),
            }
        })
        .into_owned()
}
