//! Embedded workflow metadata.
//!
//! Generated PNGs carry their node graph in text chunks named `workflow` and
//! `prompt`. Only those two keys are surfaced.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use lru::LruCache;

pub const WORKFLOW_KEYS: [&str; 2] = ["workflow", "prompt"];

fn is_png(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Reads the `workflow`/`prompt` text chunks (`tEXt`, `zTXt`, `iTXt`).
/// Non-PNG and unreadable files yield an empty map.
pub fn read_text_chunks(path: &Path) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    if !is_png(path) {
        return out;
    }
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!("cannot open {}: {}", path.display(), e);
            return out;
        }
    };
    let reader = match png::Decoder::new(BufReader::new(file)).read_info() {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("not a readable PNG {}: {}", path.display(), e);
            return out;
        }
    };
    let info = reader.info();

    let mut put = |keyword: &str, text: String| {
        if WORKFLOW_KEYS.contains(&keyword) && !text.is_empty() {
            out.entry(keyword.to_string()).or_insert(text);
        }
    };
    for chunk in &info.uncompressed_latin1_text {
        put(&chunk.keyword, chunk.text.clone());
    }
    for chunk in &info.compressed_latin1_text {
        if let Ok(text) = chunk.get_text() {
            put(&chunk.keyword, text);
        }
    }
    for chunk in &info.utf8_text {
        if let Ok(text) = chunk.get_text() {
            put(&chunk.keyword, text);
        }
    }
    out
}

/// Memoizes `has_workflow` per `(path, mtime, size)` so repeated listings
/// do not re-open every PNG.
pub struct WorkflowProbe {
    cache: Mutex<LruCache<(PathBuf, i64, u64), bool>>,
}

impl WorkflowProbe {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { cache: Mutex::new(LruCache::new(cap)) }
    }

    pub fn has_workflow(&self, path: &Path, mtime: i64, size: u64) -> bool {
        let key = (path.to_path_buf(), mtime, size);
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(&hit) = cache.get(&key) {
                return hit;
            }
        }
        let found = !read_text_chunks(path).is_empty();
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, found);
        }
        found
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for WorkflowProbe {
    fn default() -> Self {
        Self::new(4096)
    }
}
