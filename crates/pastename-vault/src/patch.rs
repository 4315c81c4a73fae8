//! Rewriting attachment links after a rename.

use std::path::{Path, PathBuf};

use pastename_core::link::rewrite_link;
use pastename_core::{LinkStyle, PasteNameError};

use crate::fs::VaultFs;

/// Rewrites the reference to a renamed attachment inside a document.
pub trait ReferencePatcher {
    /// Point the first link to `old_target` at `new_target`.
    ///
    /// Returns `Ok(false)` if no such link exists.
    fn replace_first(
        &self,
        old_target: &str,
        new_target: &str,
        style: LinkStyle,
    ) -> Result<bool, PasteNameError>;
}

/// Patches links in a note file on disk.
pub struct NoteFilePatcher<'a, F: VaultFs> {
    fs: &'a F,
    note: PathBuf,
}

impl<'a, F: VaultFs> NoteFilePatcher<'a, F> {
    pub fn new(fs: &'a F, note: &Path) -> Self {
        Self {
            fs,
            note: note.to_path_buf(),
        }
    }
}

impl<F: VaultFs> ReferencePatcher for NoteFilePatcher<'_, F> {
    fn replace_first(
        &self,
        old_target: &str,
        new_target: &str,
        style: LinkStyle,
    ) -> Result<bool, PasteNameError> {
        let content = self.fs.read_to_string(&self.note)?;
        match rewrite_link(&content, old_target, new_target, style) {
            Some(patched) => {
                self.fs.write(&self.note, &patched)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
