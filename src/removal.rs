//! Delete endpoint semantics: trash, permanent delete or hide.

use std::fs;
use std::path::Path;

use crate::hidden::{HiddenEntry, HiddenIndex};
use crate::library::mtime_secs;
use crate::paths::resolve;
use crate::types::{DeleteMode, DeleteResponse, Root};

/// Outcome of one delete request. `index_changed` tells the caller whether
/// the hidden index has to be written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub response: DeleteResponse,
    pub index_changed: bool,
}

/// Applies `mode` to every relpath below `root_dir`.
///
/// Invalid or missing paths end up in `failed`; so does anything the
/// filesystem refuses. Nothing here aborts the whole batch.
pub fn remove(
    root: Root,
    root_dir: &Path,
    relpaths: &[String],
    mode: DeleteMode,
    hidden: &mut HiddenIndex,
) -> Removal {
    let mut removed = Vec::new();
    let mut failed = Vec::new();
    let mut index_changed = false;

    for relpath in relpaths {
        let path = match resolve(root_dir, relpath) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!("rejecting {}: {}", relpath, e);
                failed.push(relpath.clone());
                continue;
            }
        };
        // Listing follows links to files, so the same check applies here
        let md = match fs::metadata(&path) {
            Ok(md) if md.is_file() => md,
            _ => {
                failed.push(relpath.clone());
                continue;
            }
        };
        let is_link = fs::symlink_metadata(&path).map(|m| m.file_type().is_symlink()).unwrap_or(false);

        let result = match mode {
            DeleteMode::Hide => {
                hidden.insert(root, relpath, HiddenEntry { mtime: mtime_secs(&md), size: md.len() });
                index_changed = true;
                Ok(())
            }
            // Ein Link hat keinen eigenen Inhalt: nur den Link entfernen, nie das Ziel
            DeleteMode::Trash | DeleteMode::Delete if is_link => fs::remove_file(&path),
            DeleteMode::Trash => trash::delete(&path).or_else(|e| {
                tracing::warn!("trash unavailable for {} ({}); deleting permanently", path.display(), e);
                fs::remove_file(&path)
            }),
            DeleteMode::Delete => fs::remove_file(&path),
        };

        match result {
            Ok(()) => removed.push(relpath.clone()),
            Err(e) => {
                tracing::error!("cannot {} {}: {}", mode.as_str(), path.display(), e);
                failed.push(relpath.clone());
            }
        }
    }

    tracing::info!(
        "{} {}: {} removed, {} failed",
        mode.as_str(),
        root,
        removed.len(),
        failed.len()
    );
    Removal { response: DeleteResponse { removed, failed, mode }, index_changed }
}
