//! Thumbnail cache under `{user_dir}/__assets_plus/thumb_cache`.
//!
//! Cache files are named by a SHA-256 over the source snapshot and the
//! requested box, so a changed source or a different size never hits a stale
//! entry. Nothing is invalidated in place; [`ThumbCache::clear`] wipes the
//! directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, ImageReader};
use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;

use crate::error::{AppError, AppResult};
use crate::types::{Root, ThumbClearResponse};

/// Hex SHA-256 of `"{root}/{relpath}:{mtime}:{size}:{w}:{h}"`.
pub fn cache_key(root: Root, relpath: &str, mtime: i64, size: u64, box_size: (u32, u32)) -> String {
    let input = format!("{}/{}:{}:{}:{}:{}", root, relpath, mtime, size, box_size.0, box_size.1);
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Decodes `source` and shrinks it to fit `box_size`, keeping the aspect
/// ratio. Smaller images are kept at their size.
pub fn render(source: &Path, box_size: (u32, u32)) -> AppResult<DynamicImage> {
    let img = ImageReader::open(source)?.with_guessed_format()?.decode()?;
    let (w, h) = box_size;
    if img.width() <= w && img.height() <= h {
        Ok(img)
    } else {
        Ok(img.thumbnail(w, h))
    }
}

#[derive(Clone)]
pub struct ThumbCache {
    dir: PathBuf,
    slots: Arc<Semaphore>,
}

/// Where a thumbnail came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thumb {
    Cached(PathBuf),
    Rendered(PathBuf),
}

impl Thumb {
    pub fn path(&self) -> &Path {
        match self {
            Thumb::Cached(p) | Thumb::Rendered(p) => p,
        }
    }
}

impl ThumbCache {
    pub fn new(dir: PathBuf, concurrency: usize) -> Self {
        Self { dir, slots: Arc::new(Semaphore::new(concurrency.max(1))) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn cache_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.png", key))
    }

    /// Returns the cached PNG for `key`, rendering it from `source` on a miss.
    pub async fn get_or_render(&self, source: &Path, key: &str, box_size: (u32, u32)) -> AppResult<Thumb> {
        let target = self.cache_path(key);
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            return Ok(Thumb::Cached(target));
        }

        let _permit = self
            .slots
            .acquire()
            .await
            .map_err(|_| AppError::ServiceUnavailable("thumbnail renderer is shutting down".to_string()))?;
        // Another request may have rendered it while we waited
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            return Ok(Thumb::Cached(target));
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let source = source.to_path_buf();
        let dest = target.clone();
        let tmp = self.dir.join(format!("{}.{}.tmp", key, uuid::Uuid::new_v4().simple()));
        tokio::task::spawn_blocking(move || -> AppResult<()> {
            let thumb = render(&source, box_size)?;
            // Erst temporär schreiben, dann atomar umbenennen
            if let Err(e) = thumb.save_with_format(&tmp, ImageFormat::Png) {
                let _ = std::fs::remove_file(&tmp);
                return Err(AppError::Internal(anyhow::anyhow!("cannot write thumbnail: {}", e)));
            }
            std::fs::rename(&tmp, &dest)?;
            Ok(())
        })
        .await??;

        Ok(Thumb::Rendered(target))
    }

    /// Removes every cached file and reports how much was freed.
    pub async fn clear(&self) -> AppResult<ThumbClearResponse> {
        let dir = self.dir.clone();
        let resp = tokio::task::spawn_blocking(move || -> AppResult<ThumbClearResponse> {
            let mut resp = ThumbClearResponse { removed: 0, freed_bytes: 0 };
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(resp),
                Err(e) => return Err(e.into()),
            };
            for entry in entries.flatten() {
                let Ok(md) = entry.metadata() else { continue };
                if !md.is_file() {
                    continue;
                }
                match std::fs::remove_file(entry.path()) {
                    Ok(()) => {
                        resp.removed += 1;
                        resp.freed_bytes += md.len();
                    }
                    Err(e) => tracing::warn!("cannot remove {}: {}", entry.path().display(), e),
                }
            }
            Ok(resp)
        })
        .await??;
        Ok(resp)
    }
}
