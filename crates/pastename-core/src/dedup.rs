//! Collision resolution for generated attachment names.
//!
//! Given a candidate `stem.ext` and the names already present in the target
//! directory, the deduplicator decides whether a number must be attached and
//! picks `max(existing numbers) + 1`. Numbers freed by deleted files are never
//! reused, and candidates are never tried one by one.
//!
//! The listing is a point-in-time snapshot. Two renames resolved against the
//! same directory at the same time can pick the same number; callers that
//! rename concurrently must serialize per directory.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::sanitize::validate_delimiter;

/// Where the disambiguating number goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberPosition {
    /// `3-foo.png`
    Prefix,
    /// `foo-3.png`
    #[default]
    Suffix,
}

/// How duplicate names are numbered.
///
/// Only constructible through [`DedupPolicy::new`] (or `Default`), which
/// validates the delimiter, so [`resolve`] can assume it is non-empty and
/// safe inside a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupPolicy {
    position: NumberPosition,
    delimiter: String,
    always_number: bool,
}

impl DedupPolicy {
    /// Build a policy.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] if the delimiter is empty or contains
    /// characters not allowed in file names.
    pub fn new(
        position: NumberPosition,
        delimiter: impl Into<String>,
        always_number: bool,
    ) -> Result<Self, PolicyError> {
        let delimiter = delimiter.into();
        validate_delimiter(&delimiter)?;
        Ok(Self {
            position,
            delimiter,
            always_number,
        })
    }

    #[must_use]
    pub fn position(&self) -> NumberPosition {
        self.position
    }

    #[must_use]
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    #[must_use]
    pub fn always_number(&self) -> bool {
        self.always_number
    }

    fn sibling_pattern(&self, stem: &str, extension: &str) -> Regex {
        let stem = regex::escape(stem);
        let delimiter = regex::escape(&self.delimiter);
        let ext = ext_pattern(extension);
        let pattern = match self.position {
            NumberPosition::Suffix => format!(r"^{stem}{delimiter}(\d+){ext}$"),
            NumberPosition::Prefix => format!(r"^(\d+){delimiter}{stem}{ext}$"),
        };
        // Every interpolated piece is escaped, so the pattern is always valid.
        Regex::new(&pattern).expect("escaped dedup pattern")
    }

    fn numbered(&self, stem: &str, number: u64) -> String {
        match self.position {
            NumberPosition::Suffix => format!("{stem}{}{number}", self.delimiter),
            NumberPosition::Prefix => format!("{number}{}{stem}", self.delimiter),
        }
    }
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self {
            position: NumberPosition::Suffix,
            delimiter: "-".to_string(),
            always_number: false,
        }
    }
}

fn ext_pattern(extension: &str) -> String {
    if extension.is_empty() {
        String::new()
    } else {
        format!(r"\.{}", regex::escape(extension))
    }
}

/// The resolved name and its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalName {
    pub name: String,
    pub stem: String,
    pub extension: String,
}

/// Split a file name into `(stem, extension)` at the last `.`.
///
/// A name without a dot has an empty extension.
#[must_use]
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => (name, ""),
    }
}

/// Join a stem and extension, omitting the dot when there is no extension.
#[must_use]
pub fn join_name(stem: &str, extension: &str) -> String {
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    }
}

/// Resolve `candidate` against the names already in the target directory.
///
/// The candidate is returned unchanged unless it already exists or the
/// policy asks to always number; then `max(existing numbers) + 1` is attached
/// at the configured position.
#[must_use]
pub fn resolve<S: AsRef<str>>(candidate: &str, siblings: &[S], policy: &DedupPolicy) -> FinalName {
    let (stem, extension) = split_name(candidate);
    let pattern = policy.sibling_pattern(stem, extension);

    let mut exists = false;
    let mut numbers = Vec::new();
    for sibling in siblings {
        let sibling = sibling.as_ref();
        if sibling == candidate {
            exists = true;
            continue;
        }
        if let Some(caps) = pattern.captures(sibling) {
            // Numbers that cannot be incremented are ignored.
            if let Some(n) = caps[1].parse::<u64>().ok().filter(|n| n.checked_add(1).is_some()) {
                numbers.push(n);
            }
        }
    }

    if !exists && !policy.always_number {
        return FinalName {
            name: candidate.to_string(),
            stem: stem.to_string(),
            extension: extension.to_string(),
        };
    }

    let next = numbers.iter().copied().max().unwrap_or(0) + 1;
    let new_stem = policy.numbered(stem, next);

    FinalName {
        name: join_name(&new_stem, extension),
        stem: new_stem,
        extension: extension.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn suffix(delimiter: &str) -> DedupPolicy {
        DedupPolicy::new(NumberPosition::Suffix, delimiter, false).unwrap()
    }

    fn prefix(delimiter: &str) -> DedupPolicy {
        DedupPolicy::new(NumberPosition::Prefix, delimiter, false).unwrap()
    }

    #[test]
    fn split_name_uses_last_dot() {
        assert_eq!(split_name("foo.png"), ("foo", "png"));
        assert_eq!(split_name("a.b.c.JPG"), ("a.b.c", "JPG"));
        assert_eq!(split_name("noext"), ("noext", ""));
        assert_eq!(split_name(".hidden"), ("", "hidden"));
    }

    #[test]
    fn non_colliding_candidate_is_unchanged() {
        let out = resolve("bar.png", &["foo.png"], &suffix("-"));
        assert_eq!(out.name, "bar.png");
        assert_eq!(out.stem, "bar");
        assert_eq!(out.extension, "png");
    }

    #[test]
    fn suffix_takes_max_plus_one_without_reusing_gaps() {
        let out = resolve("foo.png", &["foo.png", "foo-1.png", "foo-3.png"], &suffix("-"));
        assert_eq!(out.name, "foo-4.png");
        assert_eq!(out.stem, "foo-4");
    }

    #[test]
    fn collision_without_numbered_siblings_starts_at_one() {
        let out = resolve("foo.png", &["foo.png", "other.png"], &suffix("-"));
        assert_eq!(out.name, "foo-1.png");
    }

    #[test]
    fn always_number_numbers_even_without_collision() {
        let policy = DedupPolicy::new(NumberPosition::Suffix, "-", true).unwrap();
        let siblings: [&str; 0] = [];
        assert_eq!(resolve("bar.png", &siblings, &policy).name, "bar-1.png");

        let out = resolve("bar.png", &["bar-2.png"], &policy);
        assert_eq!(out.name, "bar-3.png");
    }

    #[test]
    fn prefix_policy() {
        let out = resolve("foo.png", &["2-foo.png"], &DedupPolicy::new(NumberPosition::Prefix, "-", true).unwrap());
        assert_eq!(out.name, "3-foo.png");

        let out = resolve("foo.png", &["foo.png", "2-foo.png", "foo-9.png"], &prefix("-"));
        assert_eq!(out.name, "3-foo.png");
    }

    #[test]
    fn prefix_collision_alone_starts_at_one() {
        let out = resolve("foo.png", &["foo.png"], &prefix("_"));
        assert_eq!(out.name, "1_foo.png");
        assert_eq!(out.stem, "1_foo");
    }

    #[test]
    fn numbered_siblings_alone_do_not_force_numbering() {
        let out = resolve("foo.png", &["foo-1.png", "foo-2.png"], &suffix("-"));
        assert_eq!(out.name, "foo.png");
    }

    #[test]
    fn metacharacters_in_stem_are_literal() {
        let out = resolve("a.b+c.png", &["a.b+c.png"], &suffix("-"));
        assert_eq!(out.name, "a.b+c-1.png");

        // `axbbc-5.png` would match an unescaped `a.b+c` pattern.
        let out = resolve("a.b+c.png", &["a.b+c.png", "axbbc-5.png"], &suffix("-"));
        assert_eq!(out.name, "a.b+c-1.png");

        let out = resolve("(x).png", &["(x).png", "(x)-2.png"], &suffix("-"));
        assert_eq!(out.name, "(x)-3.png");
    }

    #[test]
    fn metacharacters_in_stem_are_literal_with_prefix() {
        // `2-axbbc.png` would match an unescaped `a.b+c` pattern.
        let out = resolve("a.b+c.png", &["a.b+c.png", "2-axbbc.png"], &prefix("-"));
        assert_eq!(out.name, "1-a.b+c.png");

        let out = resolve("a.b+c.png", &["a.b+c.png", "4-a.b+c.png"], &prefix("-"));
        assert_eq!(out.name, "5-a.b+c.png");
    }

    #[test]
    fn metacharacters_in_delimiter_are_literal() {
        let policy = suffix(".");
        let out = resolve("foo.png", &["foo.png", "foo.4.png", "fooX7.png"], &policy);
        assert_eq!(out.name, "foo.5.png");

        let policy = suffix("+");
        let out = resolve("foo.png", &["foo.png", "foo+2.png", "foooo2.png"], &policy);
        assert_eq!(out.name, "foo+3.png");
    }

    #[test]
    fn extension_must_match_exactly() {
        let out = resolve("foo.png", &["foo.png", "foo-7.jpg", "foo-2.png"], &suffix("-"));
        assert_eq!(out.name, "foo-3.png");
    }

    #[test]
    fn extension_case_is_preserved() {
        let out = resolve("foo.PNG", &["foo.PNG"], &suffix("-"));
        assert_eq!(out.name, "foo-1.PNG");
        assert_eq!(out.extension, "PNG");
    }

    #[test]
    fn names_without_extension() {
        let out = resolve("README", &["README", "README-1"], &suffix("-"));
        assert_eq!(out.name, "README-2");
        assert_eq!(out.extension, "");
    }

    #[test]
    fn oversized_numbers_are_ignored() {
        let huge = format!("foo-{}.png", "9".repeat(30));
        let out = resolve("foo.png", &["foo.png".to_string(), huge], &suffix("-"));
        assert_eq!(out.name, "foo-1.png");
    }

    #[test]
    fn max_number_is_not_reused() {
        let max = format!("foo-{}.png", u64::MAX);
        let out = resolve("foo.png", &["foo.png".to_string(), max.clone()], &suffix("-"));
        assert_ne!(out.name, max);
        assert_eq!(out.name, "foo-1.png");

        let near = format!("foo-{}.png", u64::MAX - 1);
        let out = resolve("foo.png", &["foo.png".to_string(), near], &suffix("-"));
        assert_eq!(out.name, format!("foo-{}.png", u64::MAX));
    }

    #[test]
    fn policy_rejects_bad_delimiters() {
        assert!(DedupPolicy::new(NumberPosition::Suffix, "", false).is_err());
        assert!(DedupPolicy::new(NumberPosition::Suffix, "/", false).is_err());
        let default = DedupPolicy::default();
        assert_eq!(default.delimiter(), "-");
        assert_eq!(default.position(), NumberPosition::Suffix);
        assert!(!default.always_number());
    }

    proptest! {
        #[test]
        fn resolved_name_never_collides(
            stem in "[a-z.+()]{1,6}",
            numbers in proptest::collection::vec(0u64..50, 0..6),
        ) {
            let candidate = format!("{stem}.png");
            let mut siblings = vec![candidate.clone()];
            siblings.extend(numbers.iter().map(|n| format!("{stem}-{n}.png")));

            let out = resolve(&candidate, &siblings, &suffix("-"));
            prop_assert!(!siblings.contains(&out.name));
            let expected = numbers.iter().copied().max().unwrap_or(0) + 1;
            prop_assert_eq!(out.name, format!("{stem}-{expected}.png"));
        }
    }
}
