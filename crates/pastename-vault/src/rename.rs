//! Renaming attachments: generate, de-duplicate, move, then fix the link.

use std::io;
use std::path::{Path, PathBuf};

use pastename_core::dedup::{join_name, split_name};
use pastename_core::naming::finish;
use pastename_core::sanitize::sanitize_file_name;
use pastename_core::{render, resolve, GeneratedName, LinkStyle, NameContext, PasteNameError};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::fs::VaultFs;
use crate::patch::{NoteFilePatcher, ReferencePatcher};
use crate::Vault;

/// What happened to the link in the note after the file was renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum LinkPatch {
    Patched,
    /// The note has no link to the old name.
    NotFound,
    /// No note was given.
    NoNote,
    /// The name did not change, so the note was left alone.
    Unchanged,
    /// The note could not be read or written. The rename itself stands.
    Failed { reason: String },
}

/// A completed rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Renamed {
    pub from: PathBuf,
    pub to: PathBuf,
    pub old_name: String,
    pub new_name: String,
    pub link: LinkPatch,
}

/// Result of [`Vault::rename_attachment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenameOutcome {
    Renamed(Renamed),
    /// The generated name was not usable or auto-rename is off. The caller
    /// should ask for a name, prefilled with `suggested_stem`.
    NeedsManualName {
        suggested_stem: String,
        extension: String,
    },
}

impl<F: VaultFs> Vault<F> {
    /// Generate a candidate name for `attachment` from the vault's template.
    ///
    /// Without a note, the template sees an empty context.
    ///
    /// # Errors
    ///
    /// Returns [`PasteNameError::Io`] if the note cannot be read.
    pub fn generate_name(
        &self,
        attachment: &Path,
        note: Option<&Path>,
    ) -> Result<GeneratedName, PasteNameError> {
        let ctx = match note {
            Some(note) => self.note_context(note)?,
            None => NameContext::default(),
        };
        let name = file_name_of(attachment)?;
        let (_, extension) = split_name(&name);
        let rendered = render(
            &self.settings.image_name_pattern,
            &ctx,
            &self.settings.render_options(),
        );
        Ok(finish(&rendered, extension, self.policy.delimiter()))
    }

    /// Name `attachment` after the template and rename it.
    ///
    /// When the generated name is not meaningful, or `auto` is false, nothing
    /// is touched and [`RenameOutcome::NeedsManualName`] is returned; the
    /// suggestion is empty for names that are not meaningful.
    ///
    /// # Errors
    ///
    /// See [`Vault::rename_with_name`].
    pub fn rename_attachment(
        &self,
        attachment: &Path,
        note: Option<&Path>,
        auto: bool,
    ) -> Result<RenameOutcome, PasteNameError> {
        let generated = self.generate_name(attachment, note)?;
        debug!(?generated, "generated name");

        if !generated.is_meaningful || !auto {
            let name = file_name_of(attachment)?;
            let (_, extension) = split_name(&name);
            let suggested_stem = if generated.is_meaningful {
                generated.stem
            } else {
                String::new()
            };
            return Ok(RenameOutcome::NeedsManualName {
                suggested_stem,
                extension: extension.to_string(),
            });
        }

        self.rename_with_name(attachment, &generated.new_name, note)
            .map(RenameOutcome::Renamed)
    }

    /// Rename `attachment` to a user-supplied stem, keeping its extension.
    ///
    /// # Errors
    ///
    /// See [`Vault::rename_with_name`].
    pub fn rename_manual(
        &self,
        attachment: &Path,
        stem: &str,
        note: Option<&Path>,
    ) -> Result<Renamed, PasteNameError> {
        let name = file_name_of(attachment)?;
        let (_, extension) = split_name(&name);
        let stem = sanitize_file_name(stem);
        if stem.is_empty() {
            return Err(empty_name());
        }
        self.rename_with_name(attachment, &join_name(&stem, extension), note)
    }

    /// Rename `attachment` to `new_name` (de-duplicated against its
    /// directory) and point the note's link at the new name.
    ///
    /// # Errors
    ///
    /// - [`PasteNameError::Config`] if `new_name` is empty after sanitizing
    /// - [`PasteNameError::Vault`] if the directory cannot be listed
    /// - [`PasteNameError::Rename`] if the move fails
    ///
    /// In every error case the attachment is left where it was. Problems
    /// with the note after a successful move are reported in
    /// [`Renamed::link`] instead.
    pub fn rename_with_name(
        &self,
        attachment: &Path,
        new_name: &str,
        note: Option<&Path>,
    ) -> Result<Renamed, PasteNameError> {
        let old_name = file_name_of(attachment)?;
        self.rename_linked(
            attachment,
            new_name,
            note,
            &old_name,
            self.settings.link_style(),
        )
    }

    /// Like [`Vault::rename_with_name`], but with the link target and style
    /// as they appear in the note.
    pub(crate) fn rename_linked(
        &self,
        attachment: &Path,
        new_name: &str,
        note: Option<&Path>,
        link_target: &str,
        style: LinkStyle,
    ) -> Result<Renamed, PasteNameError> {
        let new_name = sanitize_file_name(new_name);
        if split_name(&new_name).0.is_empty() {
            return Err(empty_name());
        }

        let old_name = file_name_of(attachment)?;
        let dir = match attachment.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => self.root.as_path(),
        };
        let siblings: Vec<String> = self
            .fs
            .list_file_names(dir)
            .map_err(|e| PasteNameError::Vault(format!("cannot list {}: {e}", dir.display())))?
            .into_iter()
            .filter(|name| *name != old_name)
            .collect();

        let final_name = resolve(&new_name, &siblings, &self.policy);
        debug!(candidate = %new_name, resolved = %final_name.name, "deduplicated name");

        let to = dir.join(&final_name.name);
        if final_name.name == old_name {
            debug!(name = %old_name, "name unchanged");
            return Ok(Renamed {
                from: attachment.to_path_buf(),
                to,
                old_name,
                new_name: final_name.name,
                link: LinkPatch::Unchanged,
            });
        }

        self.fs
            .rename(attachment, &to)
            .map_err(|e| rename_error(&old_name, &final_name.name, &e))?;
        info!(from = %old_name, to = %final_name.name, "renamed attachment");

        let link = match note {
            Some(note) => {
                let new_target = retarget(link_target, &final_name.name);
                patch_link(
                    &NoteFilePatcher::new(&self.fs, note),
                    link_target,
                    &new_target,
                    style,
                )
            }
            None => LinkPatch::NoNote,
        };

        Ok(Renamed {
            from: attachment.to_path_buf(),
            to,
            old_name,
            new_name: final_name.name,
            link,
        })
    }
}

fn patch_link(
    patcher: &dyn ReferencePatcher,
    old_target: &str,
    new_target: &str,
    style: LinkStyle,
) -> LinkPatch {
    match patcher.replace_first(old_target, new_target, style) {
        Ok(true) => LinkPatch::Patched,
        Ok(false) => {
            warn!(link = old_target, "no link to patch");
            LinkPatch::NotFound
        }
        Err(e) => {
            warn!(link = old_target, "failed to patch link: {e}");
            LinkPatch::Failed {
                reason: e.to_string(),
            }
        }
    }
}

/// Swap the last path segment of a link target for `new_name`.
fn retarget(link_target: &str, new_name: &str) -> String {
    match link_target.rfind('/') {
        Some(idx) => format!("{}/{new_name}", &link_target[..idx]),
        None => new_name.to_string(),
    }
}

fn file_name_of(path: &Path) -> Result<String, PasteNameError> {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| PasteNameError::Vault(format!("{} has no file name", path.display())))
}

fn empty_name() -> PasteNameError {
    PasteNameError::Config("new name could not be empty".to_string())
}

fn rename_error(from: &str, to: &str, err: &io::Error) -> PasteNameError {
    PasteNameError::Rename {
        from: from.to_string(),
        to: to.to_string(),
        reason: err.to_string(),
    }
}
