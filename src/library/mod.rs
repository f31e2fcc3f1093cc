//! Directory scan of the output/input roots.
//!
//! A scan walks the root once and returns every visible asset in feed order
//! (newest first, ties by relpath). Paging over that snapshot lives in
//! [`page`].

use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::AppResult;
use crate::hidden::HiddenIndex;
use crate::metadata::WorkflowProbe;
use crate::paths::to_relpath;
use crate::types::{AssetItem, AssetKind, Root};

pub mod page;

pub use page::page;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Dotted, case-insensitive (`.png`).
    pub extensions: Vec<String>,
    /// `false` lists direct children of the root only, unless `scan_depth`
    /// is set.
    pub recursive: bool,
    /// Include files from directories at most this deep (root = 0). Takes
    /// precedence over `recursive`.
    pub scan_depth: Option<u32>,
}

impl ScanOptions {
    /// Maximum walkdir depth for file entries (the root itself is depth 0).
    fn max_entry_depth(&self) -> Option<usize> {
        match (self.scan_depth, self.recursive) {
            (Some(depth), _) => Some(depth as usize + 1),
            (None, false) => Some(1),
            (None, true) => None,
        }
    }
}

/// Suffix matcher over file names. Extensions containing glob syntax or path
/// separators are skipped.
pub fn build_extension_set(extensions: &[String]) -> AppResult<GlobSet> {
    let mut b = GlobSetBuilder::new();
    for ext in extensions {
        let ext = ext.trim();
        if ext.is_empty() {
            continue;
        }
        if ext.contains(['*', '?', '[', ']', '{', '}', '\\', '/']) {
            tracing::warn!("Ignoring extension with glob characters: {}", ext);
            continue;
        }
        let g = GlobBuilder::new(&format!("*{}", ext)).case_insensitive(true).build()?;
        b.add(g);
    }
    Ok(b.build()?)
}

pub(crate) fn mtime_secs(md: &fs::Metadata) -> i64 {
    match md.modified() {
        Ok(t) => match t.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => -(e.duration().as_secs() as i64),
        },
        Err(_) => 0,
    }
}

/// Walks `root_dir` and returns the visible assets in feed order.
///
/// Hidden markers that still match `(mtime, size)` drop the file. Entries
/// that cannot be read are skipped. A missing root yields an empty list.
pub fn scan(
    root: Root,
    root_dir: &Path,
    opts: &ScanOptions,
    hidden: &HiddenIndex,
    probe: &WorkflowProbe,
) -> AppResult<Vec<AssetItem>> {
    if !root_dir.is_dir() {
        tracing::debug!("{} root {} does not exist", root, root_dir.display());
        return Ok(Vec::new());
    }
    let ext_set = build_extension_set(&opts.extensions)?;
    if ext_set.is_empty() {
        return Ok(Vec::new());
    }
    let canonical_root = root_dir.canonicalize()?;

    let mut walker = WalkDir::new(root_dir).min_depth(1).follow_links(false);
    if let Some(depth) = opts.max_entry_depth() {
        walker = walker.max_depth(depth);
    }

    let mut items = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy();
        if !ext_set.is_match(name.as_ref()) {
            continue;
        }

        // Symlinks zählen nur, wenn das Ziel eine Datei innerhalb der Wurzel ist
        let md = if entry.path_is_symlink() {
            match entry.path().canonicalize() {
                Ok(target) if target.starts_with(&canonical_root) => fs::metadata(&target),
                _ => continue,
            }
        } else {
            entry.metadata().map_err(std::io::Error::from)
        };
        let md = match md {
            Ok(md) if md.is_file() => md,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!("cannot stat {}: {}", entry.path().display(), e);
                continue;
            }
        };

        let Some(relpath) = to_relpath(root_dir, entry.path()) else {
            continue;
        };
        let mtime = mtime_secs(&md);
        let size = md.len();
        if hidden.hides(root, &relpath, mtime, size) {
            continue;
        }

        let filename = name.into_owned();
        let kind = AssetKind::from_filename(&filename);
        let has_workflow = kind == AssetKind::Image && probe.has_workflow(entry.path(), mtime, size);
        items.push(AssetItem { relpath, filename, mtime, size, kind, has_workflow });
    }

    items.sort_by(AssetItem::feed_order);
    Ok(items)
}
