//! Watching a vault for newly pasted attachments.
//!
//! Uses the `notify` crate for cross-platform file system events
//! (FSEvents on macOS, inotify on Linux, ReadDirectoryChanges on Windows).

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, SystemTime};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use pastename_core::{AttachmentFilter, PasteNameError};
use tracing::{debug, trace};

/// Files whose modification time is older than this are not new pastes
/// (copied or synced files keep their original times).
pub const FRESHNESS: Duration = Duration::from_secs(1);

/// Events emitted by the attachment watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentEvent {
    /// An attachment that should be renamed was created.
    Created(PathBuf),
}

/// Watches a vault directory for attachments to rename.
pub struct AttachmentWatcher {
    _watcher: RecommendedWatcher,
    receiver: mpsc::Receiver<AttachmentEvent>,
}

impl AttachmentWatcher {
    /// Start watching `vault_root` recursively.
    ///
    /// Only file creations are reported, and only for files that
    /// [`AttachmentFilter::should_handle`] accepts.
    ///
    /// # Errors
    ///
    /// Returns [`PasteNameError::Io`] if the watcher cannot be created.
    pub fn start(
        vault_root: &Path,
        filter: AttachmentFilter,
        handle_all: bool,
    ) -> Result<Self, PasteNameError> {
        let (tx, rx) = mpsc::channel();
        let vault_root_owned = vault_root.to_path_buf();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let Ok(event) = res else {
                return;
            };
            if !matches!(event.kind, EventKind::Create(_)) {
                return;
            }
            for path in &event.paths {
                if !is_candidate(&vault_root_owned, path, &filter, handle_all) {
                    trace!(path = %path.display(), "ignoring created file");
                    continue;
                }
                if !is_fresh(path) {
                    debug!(path = %path.display(), "ignoring stale file");
                    continue;
                }
                let _ = tx.send(AttachmentEvent::Created(path.clone()));
            }
        })
        .map_err(|e| PasteNameError::Io(std::io::Error::other(e)))?;

        watcher
            .watch(vault_root, RecursiveMode::Recursive)
            .map_err(|e| PasteNameError::Io(std::io::Error::other(e)))?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// Try to receive the next event with a timeout.
    ///
    /// Returns `None` if no event is available within the timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<AttachmentEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Try to receive the next event without blocking.
    pub fn try_recv(&self) -> Option<AttachmentEvent> {
        self.receiver.try_recv().ok()
    }
}

/// Whether a created `path` under `vault_root` names an attachment to rename.
///
/// Anything inside a hidden top-level directory (such as the editor's own
/// config folder) is skipped.
fn is_candidate(vault_root: &Path, path: &Path, filter: &AttachmentFilter, handle_all: bool) -> bool {
    let hidden = path
        .strip_prefix(vault_root)
        .ok()
        .and_then(|rel| rel.components().next())
        .and_then(|c| c.as_os_str().to_str())
        .is_some_and(|s| s.starts_with('.'));
    if hidden {
        return false;
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| filter.should_handle(name, handle_all))
}

fn is_fresh(path: &Path) -> bool {
    let Ok(modified) = std::fs::metadata(path).and_then(|m| m.modified()) else {
        return false;
    };
    // A timestamp in the future counts as fresh.
    SystemTime::now()
        .duration_since(modified)
        .map_or(true, |age| age <= FRESHNESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn watcher_detects_pasted_image() {
        let dir = tempfile::tempdir().unwrap();
        let vault_root = dir.path();
        fs::create_dir_all(vault_root.join("assets")).unwrap();

        let watcher = AttachmentWatcher::start(vault_root, AttachmentFilter::default(), false).unwrap();

        let file = vault_root.join("assets").join("Pasted image 20240101.png");
        fs::write(&file, b"png").unwrap();

        let event = watcher.recv_timeout(Duration::from_secs(2));
        match event {
            Some(AttachmentEvent::Created(path)) => {
                assert!(path.to_string_lossy().contains("Pasted image 20240101.png"));
            }
            None => panic!("Expected watcher to detect pasted image"),
        }
    }

    #[test]
    fn watcher_ignores_other_files_without_handle_all() {
        let dir = tempfile::tempdir().unwrap();
        let vault_root = dir.path();

        let watcher = AttachmentWatcher::start(vault_root, AttachmentFilter::default(), false).unwrap();

        fs::write(vault_root.join("photo.png"), b"png").unwrap();
        fs::write(vault_root.join("note.md"), "# Note").unwrap();

        let event = watcher.recv_timeout(Duration::from_millis(500));
        assert!(event.is_none(), "Watcher should ignore non-pasted files");
    }

    #[test]
    fn candidate_rules() {
        let root = Path::new("/vault");
        let filter = AttachmentFilter::default();

        assert!(is_candidate(root, &root.join("Pasted image 1.png"), &filter, false));
        assert!(!is_candidate(root, &root.join("photo.png"), &filter, false));
        assert!(is_candidate(root, &root.join("photo.png"), &filter, true));
        assert!(!is_candidate(root, &root.join("doc.pdf"), &filter, true));
        assert!(!is_candidate(
            root,
            &root.join(".obsidian").join("Pasted image 1.png"),
            &filter,
            true
        ));
        assert!(is_candidate(
            root,
            &root.join("sub").join(".hidden").join("Pasted image 1.png"),
            &filter,
            false
        ));
    }

    #[test]
    fn freshness_uses_modification_time() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Pasted image 1.png");
        fs::write(&file, b"png").unwrap();
        assert!(is_fresh(&file));

        let old = SystemTime::now() - Duration::from_secs(60);
        fs::File::options()
            .write(true)
            .open(&file)
            .unwrap()
            .set_modified(old)
            .unwrap();
        assert!(!is_fresh(&file));

        assert!(!is_fresh(&dir.path().join("missing.png")));
    }
}
