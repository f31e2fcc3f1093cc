use crate::types::{AssetItem, ListResponse, PageCursor};

/// Cuts one page out of a scan snapshot that is already in feed order.
///
/// `since` keeps items with `mtime >= since` (poll mode), `cursor` keeps
/// items strictly after the cursor, `limit == 0` disables truncation.
/// `newest_mtime` always reflects the whole snapshot.
pub fn page(items: &[AssetItem], cursor: Option<&PageCursor>, since: Option<i64>, limit: usize) -> ListResponse {
    let newest_mtime = items.iter().map(|i| i.mtime).max().unwrap_or(0);

    let selected = items
        .iter()
        .filter(|i| since.map_or(true, |t| i.mtime >= t))
        .filter(|i| cursor.map_or(true, |c| c.precedes(i)));

    let mut out: Vec<AssetItem> = Vec::new();
    let mut has_more = false;
    for item in selected {
        if limit > 0 && out.len() == limit {
            has_more = true;
            break;
        }
        out.push(item.clone());
    }

    let cursor = if has_more { out.last().map(AssetItem::position) } else { None };
    ListResponse { items: out, cursor, has_more, newest_mtime }
}
