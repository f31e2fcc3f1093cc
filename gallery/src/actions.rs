//! Bulk actions over the selection or a single lens target.

use serde_json::Value;

use crate::feed::AssetFeed;
use crate::model::{DeleteMode, DeleteRequest, DeleteResponse, MetaResponse};
use crate::overlay::Lens;
use crate::selection::Selection;
use crate::view::ViewFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionTarget {
    Selection,
    Single(String),
}

impl ActionTarget {
    pub fn resolve(&self, selection: &Selection) -> Vec<String> {
        match self {
            ActionTarget::Selection => selection.relpaths(),
            ActionTarget::Single(relpath) => vec![relpath.clone()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletePlan {
    Nothing,
    NeedsConfirmation(DeleteRequest),
    Ready(DeleteRequest),
}

impl DeletePlan {
    /// Promotes a confirmed plan to a ready one.
    pub fn confirm(self) -> DeletePlan {
        match self {
            DeletePlan::NeedsConfirmation(req) => DeletePlan::Ready(req),
            other => other,
        }
    }
}

/// Builds the delete request. `mode = None` lets the server apply its default.
pub fn plan_delete(
    target: &ActionTarget,
    selection: &Selection,
    mode: Option<DeleteMode>,
    confirm: bool,
) -> DeletePlan {
    let relpaths = target.resolve(selection);
    if relpaths.is_empty() {
        return DeletePlan::Nothing;
    }
    let request = DeleteRequest { relpaths, mode };
    if confirm {
        DeletePlan::NeedsConfirmation(request)
    } else {
        DeletePlan::Ready(request)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteApplied {
    pub removed: usize,
    pub failed: usize,
}

/// Prunes removed relpaths from the feed and selection and moves the lens to
/// the nearest surviving neighbour in the visible sequence.
pub fn apply_delete(
    response: &DeleteResponse,
    feed: &mut AssetFeed,
    selection: &mut Selection,
    lens: &mut Lens,
    filter: &ViewFilter,
) -> DeleteApplied {
    if response.removed.is_empty() {
        return DeleteApplied { removed: 0, failed: response.failed.len() };
    }
    let before = filter.apply(feed.items());
    feed.remove(&response.removed);
    selection.prune(&response.removed);
    let after = filter.apply(feed.items());
    lens.retarget(&before, &after);
    DeleteApplied { removed: response.removed.len(), failed: response.failed.len() }
}

/// Extracts the embedded workflow graph. Falls back to the prompt graph;
/// malformed or non-object JSON counts as no workflow.
pub fn parse_workflow(meta: &MetaResponse) -> Option<Value> {
    ["workflow", "prompt"].iter().find_map(|key| {
        let raw = meta.metadata.get(*key)?;
        match serde_json::from_str::<Value>(raw) {
            Ok(value @ Value::Object(_)) => Some(value),
            _ => None,
        }
    })
}

/// File name used when saving a workflow next to its image.
pub fn workflow_filename(relpath: &str) -> String {
    let name = relpath.rsplit('/').next().unwrap_or(relpath);
    let stem = match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    };
    format!("{}.json", stem)
}
