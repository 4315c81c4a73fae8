//! User settings.
//!
//! Settings are persisted as YAML (`.pastename.yaml` in the vault root).
//! Every field has a default, so a partial or missing file is fine. The
//! naming and filtering policies are only ever built through
//! [`Settings::dedup_policy`] and [`Settings::attachment_filter`], which is
//! where invalid values are rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::attachment::{AttachmentFilter, DEFAULT_IMAGE_EXTENSIONS};
use crate::dedup::{DedupPolicy, NumberPosition};
use crate::error::{PasteNameError, PolicyError};
use crate::link::LinkStyle;
use crate::template::RenderOptions;

/// File name looked up in the vault root when no config path is given.
pub const SETTINGS_FILE_NAME: &str = ".pastename.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Template for new attachment names, e.g. `{{imageNameKey}}-{{DATE:YYYYMMDD}}`.
    pub image_name_pattern: String,
    /// Put the duplicate number in front of the name instead of after it.
    pub dup_number_at_start: bool,
    pub dup_number_delimiter: String,
    /// Number every new name, even without a collision.
    pub always_number: bool,
    /// Rename without asking when the generated name is meaningful.
    pub auto_rename: bool,
    /// Handle every new attachment, not just `Pasted image ...` ones.
    pub handle_all_attachments: bool,
    pub use_markdown_links: bool,
    pub uuid_delimiter: String,
    pub include_extensions: Vec<String>,
    pub exclude_extensions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            image_name_pattern: "{{fileName}}".to_string(),
            dup_number_at_start: false,
            dup_number_delimiter: "-".to_string(),
            always_number: false,
            auto_rename: false,
            handle_all_attachments: false,
            use_markdown_links: false,
            uuid_delimiter: "-".to_string(),
            include_extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            exclude_extensions: Vec::new(),
        }
    }
}

impl Settings {
    /// Parse settings from YAML.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to unit, not to a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Load settings from `path`; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PasteNameError::Io`] if the file exists but cannot be read
    /// and [`PasteNameError::Config`] if it is not valid settings YAML.
    pub fn load(path: &Path) -> Result<Self, PasteNameError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Self::from_yaml(&content)
            .map_err(|e| PasteNameError::Config(format!("{}: {e}", path.display())))
    }

    /// Check every value that could make a later operation misbehave.
    ///
    /// # Errors
    ///
    /// Returns the first [`PolicyError`] found.
    pub fn validate(&self) -> Result<(), PolicyError> {
        self.dedup_policy()?;
        self.attachment_filter()?;
        Ok(())
    }

    /// The duplicate-numbering policy described by these settings.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] if the delimiter is empty or not file-name safe.
    pub fn dedup_policy(&self) -> Result<DedupPolicy, PolicyError> {
        let position = if self.dup_number_at_start {
            NumberPosition::Prefix
        } else {
            NumberPosition::Suffix
        };
        DedupPolicy::new(position, self.dup_number_delimiter.clone(), self.always_number)
    }

    /// The attachment filter described by these settings.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidExtensionPattern`] for a bad glob.
    pub fn attachment_filter(&self) -> Result<AttachmentFilter, PolicyError> {
        AttachmentFilter::new(self.include_extensions.as_slice(), self.exclude_extensions.as_slice())
    }

    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            uuid_delimiter: self.uuid_delimiter.clone(),
        }
    }

    #[must_use]
    pub fn link_style(&self) -> LinkStyle {
        LinkStyle::from_markdown_flag(self.use_markdown_links)
    }
}
