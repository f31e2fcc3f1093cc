//! Filtered and sorted view over the loaded feed.
//!
//! The lens and the bulk actions operate on the sequence produced here, not
//! on the raw feed, so "next" always means the next visible tile.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::{AssetItem, AssetKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    #[default]
    All,
    Image,
    Video,
}

impl KindFilter {
    fn accepts(self, kind: AssetKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Image => kind == AssetKind::Image,
            KindFilter::Video => kind == AssetKind::Video,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Name,
    Size,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [SortOrder::Newest, SortOrder::Oldest, SortOrder::Name, SortOrder::Size];

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::Name => "name",
            SortOrder::Size => "size",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "oldest" => SortOrder::Oldest,
            "name" => SortOrder::Name,
            "size" => SortOrder::Size,
            _ => SortOrder::Newest,
        }
    }

    fn compare(self, a: &AssetItem, b: &AssetItem) -> Ordering {
        match self {
            SortOrder::Newest => AssetItem::feed_order(a, b),
            SortOrder::Oldest => a.mtime.cmp(&b.mtime).then_with(|| a.relpath.cmp(&b.relpath)),
            SortOrder::Name => a
                .filename
                .to_lowercase()
                .cmp(&b.filename.to_lowercase())
                .then_with(|| a.relpath.cmp(&b.relpath)),
            SortOrder::Size => b.size.cmp(&a.size).then_with(|| AssetItem::feed_order(a, b)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilter {
    pub query: String,
    pub kind: KindFilter,
    pub workflow_only: bool,
    pub sort: SortOrder,
}

impl ViewFilter {
    pub fn matches(&self, item: &AssetItem) -> bool {
        if !self.kind.accepts(item.kind) {
            return false;
        }
        if self.workflow_only && !item.has_workflow {
            return false;
        }
        let haystack = item.relpath.to_lowercase();
        self.query.split_whitespace().all(|term| haystack.contains(&term.to_lowercase()))
    }

    /// Relpaths of the visible sequence, in display order.
    pub fn apply(&self, items: &[AssetItem]) -> Vec<String> {
        let mut visible: Vec<&AssetItem> = items.iter().filter(|item| self.matches(item)).collect();
        if self.sort != SortOrder::Newest {
            visible.sort_by(|a, b| self.sort.compare(a, b));
        }
        visible.into_iter().map(|item| item.relpath.clone()).collect()
    }

    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty() || self.kind != KindFilter::All || self.workflow_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(relpath: &str, mtime: i64, size: u64, has_workflow: bool) -> AssetItem {
        AssetItem {
            relpath: relpath.to_string(),
            filename: relpath.rsplit('/').next().unwrap().to_string(),
            mtime,
            size,
            kind: AssetKind::from_filename(relpath),
            has_workflow,
        }
    }

    fn sample() -> Vec<AssetItem> {
        let mut items = vec![
            item("portraits/Alice.png", 30, 100, true),
            item("portraits/bob.webp", 20, 300, false),
            item("clips/intro.mp4", 10, 900, false),
            item("landscape.png", 40, 50, true),
        ];
        items.sort_by(AssetItem::feed_order);
        items
    }

    #[test]
    fn default_filter_keeps_feed_order() {
        let view = ViewFilter::default().apply(&sample());
        assert_eq!(view, vec!["landscape.png", "portraits/Alice.png", "portraits/bob.webp", "clips/intro.mp4"]);
    }

    #[test]
    fn query_terms_are_case_insensitive_and_conjunctive() {
        let filter = ViewFilter { query: "PORTRAITS ali".into(), ..Default::default() };
        assert_eq!(filter.apply(&sample()), vec!["portraits/Alice.png"]);
        assert!(filter.is_active());
    }

    #[test]
    fn kind_and_workflow_filters() {
        let videos = ViewFilter { kind: KindFilter::Video, ..Default::default() };
        assert_eq!(videos.apply(&sample()), vec!["clips/intro.mp4"]);

        let workflows = ViewFilter { workflow_only: true, ..Default::default() };
        assert_eq!(workflows.apply(&sample()), vec!["landscape.png", "portraits/Alice.png"]);
    }

    #[test]
    fn alternative_sort_orders() {
        let by_name = ViewFilter { sort: SortOrder::Name, ..Default::default() };
        assert_eq!(
            by_name.apply(&sample()),
            vec!["portraits/Alice.png", "portraits/bob.webp", "clips/intro.mp4", "landscape.png"]
        );
        let by_size = ViewFilter { sort: SortOrder::Size, ..Default::default() };
        assert_eq!(by_size.apply(&sample())[0], "clips/intro.mp4");
        let oldest = ViewFilter { sort: SortOrder::Oldest, ..Default::default() };
        assert_eq!(oldest.apply(&sample())[0], "clips/intro.mp4");
        assert_eq!(SortOrder::parse("bogus"), SortOrder::Newest);
    }
}
