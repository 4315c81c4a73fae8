//! Renaming every attachment embedded in a note by regex.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use pastename_core::dedup::{join_name, split_name};
use pastename_core::link::find_embeds;
use pastename_core::{LinkStyle, PasteNameError};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::fs::VaultFs;
use crate::rename::Renamed;
use crate::Vault;

static NUMBERED_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+)").expect("static regex"));

/// One planned rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameTask {
    /// The attachment on disk.
    pub from: PathBuf,
    /// The link target as written in the note.
    pub link_target: String,
    pub style: LinkStyle,
    pub old_name: String,
    pub new_name: String,
}

/// Outcome of one task in [`Vault::apply_batch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchResult {
    Renamed(Renamed),
    Failed { from: PathBuf, reason: String },
}

impl<F: VaultFs> Vault<F> {
    /// Plan renames for the attachments embedded in `note` whose stem
    /// matches `pattern`.
    ///
    /// With a non-empty `replacement`, every match in the stem is replaced
    /// (`$1`, `$2` refer to capture groups) and the extension is kept.
    /// Otherwise the planned name is the current one. Embeds that do not
    /// resolve to a file are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PasteNameError::Parse`] for an empty or invalid pattern and
    /// [`PasteNameError::Io`] if the note cannot be read.
    pub fn plan_batch(
        &self,
        note: &Path,
        pattern: &str,
        replacement: &str,
    ) -> Result<Vec<RenameTask>, PasteNameError> {
        if pattern.is_empty() {
            return Err(PasteNameError::Parse("name pattern must not be empty".to_string()));
        }
        let regex = Regex::new(pattern)
            .map_err(|e| PasteNameError::Parse(format!("invalid name pattern: {e}")))?;
        let replacement = expand_group_refs(replacement);

        let content = self.fs.read_to_string(note)?;
        let mut seen = HashSet::new();
        let mut tasks = Vec::new();

        for embed in find_embeds(&content) {
            let Some(from) = self.resolve_embed(note, &embed.target) else {
                warn!(target_name = %embed.target, "embedded file not found");
                continue;
            };
            if !seen.insert(from.clone()) {
                continue;
            }
            let Some(old_name) = from.file_name().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            let (stem, extension) = split_name(&old_name);
            if !regex.is_match(stem) {
                continue;
            }

            let new_name = if replacement.is_empty() {
                old_name.clone()
            } else {
                join_name(&regex.replace_all(stem, replacement.as_str()), extension)
            };
            debug!(from = %old_name, to = %new_name, "planned rename");

            tasks.push(RenameTask {
                from,
                link_target: embed.target,
                style: embed.style,
                old_name,
                new_name,
            });
        }
        Ok(tasks)
    }

    /// Run `tasks` in order, patching links in `note`.
    ///
    /// A failed task does not stop the ones after it.
    pub fn apply_batch(&self, note: &Path, tasks: &[RenameTask]) -> Vec<BatchResult> {
        tasks
            .iter()
            .map(|task| {
                match self.rename_linked(
                    &task.from,
                    &task.new_name,
                    Some(note),
                    &task.link_target,
                    task.style,
                ) {
                    Ok(renamed) => BatchResult::Renamed(renamed),
                    Err(e) => {
                        warn!(from = %task.from.display(), "batch rename failed: {e}");
                        BatchResult::Failed {
                            from: task.from.clone(),
                            reason: e.to_string(),
                        }
                    }
                }
            })
            .collect()
    }

    /// Find the file an embed points at: next to the note first, then from
    /// the vault root.
    fn resolve_embed(&self, note: &Path, target: &str) -> Option<PathBuf> {
        let note_dir = note.parent().unwrap_or(self.root.as_path());
        [note_dir.join(target), self.root.join(target)]
            .into_iter()
            .find(|candidate| self.fs.is_file(candidate))
    }
}

/// Rewrite `$1` as `${1}` so a group reference followed by text is not read
/// as a named group.
fn expand_group_refs(replacement: &str) -> String {
    NUMBERED_GROUP.replace_all(replacement, "$${$1}").into_owned()
}
