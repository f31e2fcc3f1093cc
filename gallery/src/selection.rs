//! Multi-select over relpaths, scoped to one root.

use std::collections::BTreeSet;

use crate::model::Root;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    root: Root,
    selected: BTreeSet<String>,
}

impl Selection {
    pub fn new(root: Root) -> Self {
        Self { root, selected: BTreeSet::new() }
    }

    pub fn root(&self) -> Root {
        self.root
    }

    /// Switching roots invalidates every selected relpath.
    pub fn set_root(&mut self, root: Root) {
        if self.root != root {
            self.root = root;
            self.selected.clear();
        }
    }

    pub fn contains(&self, relpath: &str) -> bool {
        self.selected.contains(relpath)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Returns whether the relpath is selected afterwards.
    pub fn toggle(&mut self, relpath: &str) -> bool {
        if self.selected.remove(relpath) {
            false
        } else {
            self.selected.insert(relpath.to_string());
            true
        }
    }

    pub fn select_all(&mut self, visible: &[String]) {
        self.selected.extend(visible.iter().cloned());
    }

    /// Flips the state of every visible relpath; hidden selections stay.
    pub fn invert(&mut self, visible: &[String]) {
        for relpath in visible {
            if !self.selected.remove(relpath) {
                self.selected.insert(relpath.clone());
            }
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn prune(&mut self, removed: &[String]) {
        for relpath in removed {
            self.selected.remove(relpath);
        }
    }

    /// Drops selections that are no longer part of the loaded feed.
    pub fn retain<'a>(&mut self, existing: impl IntoIterator<Item = &'a str>) {
        let keep: BTreeSet<&str> = existing.into_iter().collect();
        self.selected.retain(|relpath| keep.contains(relpath.as_str()));
    }

    pub fn relpaths(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    /// Number of visible relpaths that are selected.
    pub fn count_visible(&self, visible: &[String]) -> usize {
        visible.iter().filter(|r| self.selected.contains(r.as_str())).count()
    }
}
