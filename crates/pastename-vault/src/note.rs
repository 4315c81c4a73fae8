//! Building a [`NameContext`] from a note on disk.

use std::path::Path;

use pastename_core::frontmatter::{first_heading, parse_frontmatter, split_frontmatter};
use pastename_core::{NameContext, PasteNameError};
use tracing::{debug, warn};

use crate::fs::VaultFs;
use crate::Vault;

impl<F: VaultFs> Vault<F> {
    /// Read `note` and collect the values its attachments can be named after.
    ///
    /// Broken frontmatter is logged and treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`PasteNameError::Io`] if the note cannot be read.
    pub fn note_context(&self, note: &Path) -> Result<NameContext, PasteNameError> {
        let content = self.fs.read_to_string(note)?;

        let (frontmatter, body) = match parse_frontmatter(&content) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(note = %note.display(), "ignoring unreadable frontmatter: {e}");
                let body = split_frontmatter(&content).map_or(content.as_str(), |(_, body)| body);
                (None, body)
            }
        };

        let file_name = note
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let ctx = NameContext::from_note(
            file_name,
            self.dir_name(note),
            first_heading(body),
            frontmatter,
        );
        debug!(note = %note.display(), ?ctx, "note context");
        Ok(ctx)
    }

    /// Name of the directory holding `note`, empty at the vault root.
    fn dir_name(&self, note: &Path) -> String {
        match note.parent() {
            Some(parent) if parent != self.root && !parent.as_os_str().is_empty() => parent
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }
}
