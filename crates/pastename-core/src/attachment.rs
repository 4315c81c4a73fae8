//! Deciding which new files are attachments worth renaming.

use glob::{MatchOptions, Pattern};

use crate::dedup::split_name;
use crate::error::PolicyError;

/// Name prefix the editor gives to pasted images.
pub const PASTED_IMAGE_PREFIX: &str = "Pasted image ";

/// Extensions handled when no include patterns are configured.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Whether `name` looks like an auto-named pasted attachment.
#[must_use]
pub fn is_pasted_attachment(name: &str) -> bool {
    name.starts_with(PASTED_IMAGE_PREFIX)
}

/// Include/exclude glob patterns matched against file extensions.
///
/// Matching is case-insensitive; an exclude match always wins.
#[derive(Debug, Clone)]
pub struct AttachmentFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl AttachmentFilter {
    /// Compile the include and exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidExtensionPattern`] for the first pattern
    /// that is not valid glob syntax.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self, PolicyError> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Whether a file named `name` has an accepted extension.
    #[must_use]
    pub fn accepts(&self, name: &str) -> bool {
        let (_, extension) = split_name(name);
        if extension.is_empty() {
            return false;
        }
        let matches = |p: &Pattern| p.matches_with(extension, MATCH_OPTIONS);
        self.include.iter().any(matches) && !self.exclude.iter().any(matches)
    }

    /// Whether a newly created file should be renamed.
    ///
    /// Pasted attachments are always handled; any other file only when
    /// `handle_all` is set and its extension is accepted.
    #[must_use]
    pub fn should_handle(&self, name: &str, handle_all: bool) -> bool {
        is_pasted_attachment(name) || (handle_all && self.accepts(name))
    }
}

impl Default for AttachmentFilter {
    fn default() -> Self {
        let exclude: [&str; 0] = [];
        // Static patterns are plain words and always compile.
        Self::new(DEFAULT_IMAGE_EXTENSIONS, &exclude).unwrap_or(Self {
            include: Vec::new(),
            exclude: Vec::new(),
        })
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>, PolicyError> {
    patterns
        .iter()
        .map(|p| {
            let p = p.as_ref();
            Pattern::new(p).map_err(|e| PolicyError::InvalidExtensionPattern {
                pattern: p.to_string(),
                reason: e.msg.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pasted_prefix_detection() {
        assert!(is_pasted_attachment("Pasted image 20220408101010.png"));
        assert!(!is_pasted_attachment("pasted image 1.png"));
        assert!(!is_pasted_attachment("diagram.png"));
    }

    #[test]
    fn default_filter_accepts_images_case_insensitively() {
        let filter = AttachmentFilter::default();
        assert!(filter.accepts("a.png"));
        assert!(filter.accepts("a.JPG"));
        assert!(filter.accepts("a.b.webp"));
        assert!(!filter.accepts("a.pdf"));
        assert!(!filter.accepts("README"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let filter = AttachmentFilter::new(&["*"], &["md", "canvas"]).unwrap();
        assert!(filter.accepts("report.pdf"));
        assert!(!filter.accepts("note.md"));
        assert!(!filter.accepts("board.canvas"));
    }

    #[test]
    fn glob_classes_in_patterns() {
        let filter = AttachmentFilter::new(&["jp*g", "tif?"], &[]).unwrap();
        assert!(filter.accepts("a.jpeg"));
        assert!(filter.accepts("a.jpg"));
        assert!(filter.accepts("a.tiff"));
        assert!(!filter.accepts("a.tif"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = AttachmentFilter::new(&["[png"], &[]).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidExtensionPattern { .. }));
    }

    #[test]
    fn should_handle_respects_handle_all() {
        let filter = AttachmentFilter::default();
        assert!(filter.should_handle("Pasted image 1.png", false));
        assert!(!filter.should_handle("photo.png", false));
        assert!(filter.should_handle("photo.png", true));
        assert!(!filter.should_handle("doc.pdf", true));
    }
}
