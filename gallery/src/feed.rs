//! Paged list controller.
//!
//! The feed keeps every loaded item in feed order (newest first). Older items
//! arrive page by page through a cursor; newer items arrive through polling
//! and are merged in place. Both paths go through the same keyed union, so a
//! relpath is never present twice.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::model::{AssetItem, ListResponse, PageCursor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: Option<PageCursor>,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollRequest {
    pub since: i64,
    pub limit: usize,
}

/// What a merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Relpaths that were not known before.
    pub added: usize,
    /// Known relpaths whose snapshot changed.
    pub updated: usize,
    /// How many positions the anchor item moved down (negative: up).
    pub anchor_shift: isize,
    /// The poll was truncated by the server limit and brought unknown items;
    /// a gap may exist below them and the feed should be reloaded.
    pub overflowed: bool,
}

#[derive(Debug, Clone)]
pub struct AssetFeed {
    items: Vec<AssetItem>,
    cursor: Option<PageCursor>,
    has_more: bool,
    loading: bool,
    polling: bool,
    newest_mtime: i64,
    limit: usize,
    pages_loaded: usize,
}

impl AssetFeed {
    pub fn new(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            has_more: true,
            loading: false,
            polling: false,
            newest_mtime: 0,
            limit: limit.max(1),
            pages_loaded: 0,
        }
    }

    pub fn items(&self) -> &[AssetItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, relpath: &str) -> Option<&AssetItem> {
        self.items.iter().find(|item| item.relpath == relpath)
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    pub fn cursor(&self) -> Option<&PageCursor> {
        self.cursor.as_ref()
    }

    pub fn newest_mtime(&self) -> i64 {
        self.newest_mtime
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
    }

    /// Drops everything, e.g. on root switch or manual refresh.
    pub fn reset(&mut self) {
        let limit = self.limit;
        *self = Self::new(limit);
    }

    /// Starts loading the next page. Returns `None` while a page is in flight
    /// or once the listing is exhausted.
    pub fn begin_page(&mut self) -> Option<PageRequest> {
        if self.loading || !self.has_more {
            return None;
        }
        self.loading = true;
        Some(PageRequest { cursor: self.cursor.clone(), limit: self.limit })
    }

    pub fn finish_page(&mut self, page: ListResponse) -> MergeOutcome {
        self.loading = false;
        self.pages_loaded += 1;
        self.newest_mtime = self.newest_mtime.max(page.newest_mtime);

        if page.items.is_empty() {
            self.has_more = false;
            return MergeOutcome::default();
        }

        let outcome = self.merge(page.items, None);

        match page.cursor {
            Some(next) if page.has_more => {
                if self.cursor.as_ref().map_or(true, |prev| cursor_order(prev, &next) == Ordering::Less) {
                    self.cursor = Some(next);
                    self.has_more = true;
                } else {
                    // A cursor that does not advance would page forever.
                    self.has_more = false;
                }
            }
            _ => self.has_more = false,
        }
        outcome
    }

    pub fn fail_page(&mut self) {
        self.loading = false;
    }

    /// Starts a poll for items at least as new as the newest known one.
    /// Polling waits until the first page has landed.
    ///
    /// `since` is inclusive, so the items already known at `newest_mtime`
    /// come back on every poll. The limit is widened by their count so a
    /// batch written within one second never fills the page on its own.
    pub fn begin_poll(&mut self) -> Option<PollRequest> {
        if self.polling || self.pages_loaded == 0 {
            return None;
        }
        self.polling = true;
        let known_at_newest = self.items.iter().filter(|item| item.mtime == self.newest_mtime).count();
        Some(PollRequest { since: self.newest_mtime, limit: self.limit + known_at_newest })
    }

    /// Merges polled items. `anchor` is the relpath of the item the user is
    /// looking at, used to report how far it moved.
    pub fn finish_poll(&mut self, page: ListResponse, anchor: Option<&str>) -> MergeOutcome {
        self.polling = false;
        self.newest_mtime = self.newest_mtime.max(page.newest_mtime);
        let truncated = page.has_more;
        let mut outcome = self.merge(page.items, anchor);
        // A full page of known items is no gap
        outcome.overflowed = truncated && outcome.added > 0;
        outcome
    }

    pub fn fail_poll(&mut self) {
        self.polling = false;
    }

    /// Keyed union of `incoming` into the feed, re-sorted into feed order.
    pub fn merge(&mut self, incoming: Vec<AssetItem>, anchor: Option<&str>) -> MergeOutcome {
        let anchor_before = anchor.and_then(|a| self.index_of(a));
        let mut index: HashMap<String, usize> =
            self.items.iter().enumerate().map(|(i, item)| (item.relpath.clone(), i)).collect();

        let mut outcome = MergeOutcome::default();
        for item in incoming {
            self.newest_mtime = self.newest_mtime.max(item.mtime);
            match index.get(&item.relpath) {
                Some(&pos) => {
                    if self.items[pos] != item {
                        self.items[pos] = item;
                        outcome.updated += 1;
                    }
                }
                None => {
                    index.insert(item.relpath.clone(), self.items.len());
                    self.items.push(item);
                    outcome.added += 1;
                }
            }
        }

        if outcome.added > 0 || outcome.updated > 0 {
            self.items.sort_by(AssetItem::feed_order);
        }

        if let (Some(before), Some(after)) = (anchor_before, anchor.and_then(|a| self.index_of(a))) {
            outcome.anchor_shift = after as isize - before as isize;
        }
        outcome
    }

    /// Removes deleted relpaths. Returns how many were present.
    pub fn remove(&mut self, relpaths: &[String]) -> usize {
        let doomed: HashSet<&str> = relpaths.iter().map(String::as_str).collect();
        let before = self.items.len();
        self.items.retain(|item| !doomed.contains(item.relpath.as_str()));
        before - self.items.len()
    }

    fn index_of(&self, relpath: &str) -> Option<usize> {
        self.items.iter().position(|item| item.relpath == relpath)
    }
}

/// Feed order applied to cursor positions.
fn cursor_order(a: &PageCursor, b: &PageCursor) -> Ordering {
    b.mtime.cmp(&a.mtime).then_with(|| a.relpath.cmp(&b.relpath))
}

/// Infinite-scroll trigger: true once the viewport bottom is within
/// `threshold` pixels of the content end.
pub fn should_load_more(scroll_top: f64, viewport_height: f64, content_height: f64, threshold: f64) -> bool {
    content_height - (scroll_top + viewport_height) <= threshold
}
