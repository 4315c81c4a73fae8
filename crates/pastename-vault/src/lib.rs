//! # pastename-vault
//!
//! File system operations and rename orchestration for a notes vault.
//!
//! The vault ties the pure naming engine to real files: it reads the note
//! an attachment belongs to, lists the destination directory, renames the
//! attachment and rewrites the link in the note.

pub mod batch;
pub mod fs;
pub mod note;
pub mod patch;
pub mod rename;
pub mod watcher;

use std::path::{Path, PathBuf};

use pastename_core::settings::SETTINGS_FILE_NAME;
use pastename_core::{AttachmentFilter, DedupPolicy, PasteNameError, Settings};

pub use batch::{BatchResult, RenameTask};
pub use fs::{PhysicalFs, VaultFs};
pub use patch::{NoteFilePatcher, ReferencePatcher};
pub use rename::{LinkPatch, RenameOutcome, Renamed};
pub use watcher::{AttachmentEvent, AttachmentWatcher};

/// A vault rooted at a directory, with validated settings.
pub struct Vault<F: VaultFs = PhysicalFs> {
    root: PathBuf,
    settings: Settings,
    policy: DedupPolicy,
    filter: AttachmentFilter,
    fs: F,
}

impl Vault<PhysicalFs> {
    /// Open the vault at `root`, reading `.pastename.yaml` if present.
    ///
    /// # Errors
    ///
    /// Returns [`PasteNameError::Vault`] if `root` is not a directory, and
    /// the settings errors of [`Settings::load`] and [`Settings::validate`].
    pub fn open(root: &Path) -> Result<Self, PasteNameError> {
        let settings = Settings::load(&root.join(SETTINGS_FILE_NAME))?;
        Self::with_settings(root, settings)
    }

    /// Open the vault at `root` with explicit settings.
    ///
    /// # Errors
    ///
    /// Same as [`Vault::open`], minus reading the settings file.
    pub fn with_settings(root: &Path, settings: Settings) -> Result<Self, PasteNameError> {
        if !root.is_dir() {
            return Err(PasteNameError::Vault(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Self::with_fs(root, settings, PhysicalFs)
    }
}

impl<F: VaultFs> Vault<F> {
    /// Build a vault over a custom file system.
    ///
    /// # Errors
    ///
    /// Returns [`PasteNameError::Policy`] if the settings describe an invalid
    /// duplicate-number delimiter or extension pattern.
    pub fn with_fs(root: &Path, settings: Settings, fs: F) -> Result<Self, PasteNameError> {
        let policy = settings.dedup_policy()?;
        let filter = settings.attachment_filter()?;
        Ok(Self {
            root: root.to_path_buf(),
            settings,
            policy,
            filter,
            fs,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn policy(&self) -> &DedupPolicy {
        &self.policy
    }

    #[must_use]
    pub fn filter(&self) -> &AttachmentFilter {
        &self.filter
    }

    #[must_use]
    pub fn fs(&self) -> &F {
        &self.fs
    }
}
