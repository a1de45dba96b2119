// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The rendered tree plus its persisted expand/collapse state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{NodeIcon, TreeDocument, TreeNode};
use crate::store::StoreError;

use super::panel::{with_tree_param, PanelLayout};

/// Ids of the opened nodes of one tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeExpansionState {
    pub opened: BTreeSet<String>,
}

impl TreeExpansionState {
    /// Every node that has children is opened.
    pub fn open_all(document: &TreeDocument) -> Self {
        let opened = document
            .root
            .walk()
            .filter(|(_, node)| node.has_children())
            .map(|(_, node)| node.id.clone())
            .collect();
        Self { opened }
    }

    pub fn is_open(&self, node_id: &str) -> bool {
        self.opened.contains(node_id)
    }
}

/// Key under which the expansion state of the tree shown at `location` is stored: the
/// first two path segments, so every page of one root shares the same state.
pub fn expansion_key(location: &str) -> String {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    path.split('/').take(3).collect::<Vec<_>>().join("/")
}

pub trait ExpansionStore {
    fn load(&self, key: &str) -> Option<TreeExpansionState>;
    fn save(&mut self, key: &str, state: &TreeExpansionState) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryExpansionStore {
    states: BTreeMap<String, TreeExpansionState>,
}

impl ExpansionStore for MemoryExpansionStore {
    fn load(&self, key: &str) -> Option<TreeExpansionState> {
        self.states.get(key).cloned()
    }

    fn save(&mut self, key: &str, state: &TreeExpansionState) -> Result<(), StoreError> {
        self.states.insert(key.to_owned(), state.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub node_id: String,
    pub depth: usize,
    pub text: String,
    pub icon: NodeIcon,
    pub has_children: bool,
    pub expanded: bool,
}

#[derive(Debug, Default)]
pub struct TreeView {
    document: Option<TreeDocument>,
    key: String,
    expansion: TreeExpansionState,
    ready: bool,
}

impl TreeView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `document` and restores its expansion state.
    ///
    /// Opens everything only when nothing was ever stored for the key. Activation stays
    /// unbound until [`TreeView::mark_ready`].
    pub fn load(&mut self, document: TreeDocument, location: &str, store: &dyn ExpansionStore) {
        self.key = expansion_key(location);
        self.expansion =
            store.load(&self.key).unwrap_or_else(|| TreeExpansionState::open_all(&document));
        self.document = Some(document);
        self.ready = false;
    }

    /// Binds activation once the restored state has been applied.
    pub fn mark_ready(&mut self) {
        self.ready = self.document.is_some();
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn document(&self) -> Option<&TreeDocument> {
        self.document.as_ref()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn expansion(&self) -> &TreeExpansionState {
        &self.expansion
    }

    pub fn node(&self, node_id: &str) -> Option<&TreeNode> {
        self.document.as_ref()?.find(node_id)
    }

    /// Navigation target for a node: its href carrying the panel visibility.
    pub fn activate(&self, node_id: &str, layout: PanelLayout) -> Option<String> {
        if !self.ready {
            return None;
        }
        let node = self.node(node_id)?;
        Some(with_tree_param(&node.href, layout))
    }

    pub fn set_open(&mut self, node_id: &str, open: bool, store: &mut dyn ExpansionStore) -> bool {
        let Some(node) = self.node(node_id) else {
            return false;
        };
        if !node.has_children() {
            return false;
        }
        let changed = if open {
            self.expansion.opened.insert(node_id.to_owned())
        } else {
            self.expansion.opened.remove(node_id)
        };
        if changed {
            self.persist(store);
        }
        changed
    }

    pub fn toggle(&mut self, node_id: &str, store: &mut dyn ExpansionStore) -> bool {
        let open = !self.expansion.is_open(node_id);
        self.set_open(node_id, open, store)
    }

    /// Opens every ancestor of `node_id` so that it becomes visible.
    pub fn reveal(&mut self, node_id: &str, store: &mut dyn ExpansionStore) {
        let Some(document) = self.document.as_ref() else {
            return;
        };
        let mut path = Vec::new();
        if !path_to(&document.root, node_id, &mut path) {
            return;
        }
        path.pop();
        let mut changed = false;
        for ancestor in path {
            changed |= self.expansion.opened.insert(ancestor);
        }
        if changed {
            self.persist(store);
        }
    }

    /// Nodes currently visible, in display order.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let mut rows = Vec::new();
        if let Some(document) = self.document.as_ref() {
            self.push_rows(&document.root, 0, &mut rows);
        }
        rows
    }

    fn push_rows(&self, node: &TreeNode, depth: usize, rows: &mut Vec<VisibleRow>) {
        let expanded = self.expansion.is_open(&node.id);
        rows.push(VisibleRow {
            node_id: node.id.clone(),
            depth,
            text: node.text.clone(),
            icon: node.icon,
            has_children: node.has_children(),
            expanded,
        });
        if expanded {
            for child in &node.children {
                self.push_rows(child, depth + 1, rows);
            }
        }
    }

    fn persist(&self, store: &mut dyn ExpansionStore) {
        if let Err(err) = store.save(&self.key, &self.expansion) {
            warn!(key = %self.key, error = %err, "failed to persist tree state");
        }
    }
}

fn path_to(node: &TreeNode, target: &str, path: &mut Vec<String>) -> bool {
    path.push(node.id.clone());
    if node.id == target {
        return true;
    }
    for child in &node.children {
        if path_to(child, target, path) {
            return true;
        }
    }
    path.pop();
    false
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{expansion_key, ExpansionStore, MemoryExpansionStore, TreeExpansionState, TreeView};
    use crate::client::panel::PanelLayout;
    use crate::model::{demo_program, ElementId};
    use crate::query::build_tree;

    fn document(root: &str) -> crate::model::TreeDocument {
        build_tree(&demo_program(), &ElementId::new(root).expect("root")).expect("tree")
    }

    #[rstest]
    #[case("/tree/1", "/tree/1")]
    #[case("/tree/1/20?parent_link=104&tree=0", "/tree/1")]
    #[case("/tree/7/25", "/tree/7")]
    #[case("/", "/")]
    fn key_is_the_first_two_path_segments(#[case] location: &str, #[case] expected: &str) {
        assert_eq!(expansion_key(location), expected);
    }

    #[test]
    fn opens_everything_only_without_stored_state() {
        let mut store = MemoryExpansionStore::default();
        let mut view = TreeView::new();
        view.load(document("1"), "/tree/1", &store);
        assert_eq!(view.visible_rows().len(), document("1").node_count());

        store.save("/tree/1", &TreeExpansionState::default()).expect("save");
        view.load(document("1"), "/tree/1/20?parent_link=104", &store);
        assert_eq!(view.visible_rows().len(), 1);
    }

    #[test]
    fn state_is_isolated_per_root() {
        let mut store = MemoryExpansionStore::default();
        store.save("/tree/1", &TreeExpansionState::default()).expect("save");

        let mut view = TreeView::new();
        view.load(document("7"), "/tree/7", &store);
        assert_eq!(view.visible_rows().len(), 2);
    }

    #[test]
    fn toggling_persists_immediately() {
        let mut store = MemoryExpansionStore::default();
        let mut view = TreeView::new();
        view.load(document("1"), "/tree/1", &store);

        assert!(view.toggle("n0-101", &mut store));
        let stored = store.load("/tree/1").expect("persisted");
        assert!(!stored.is_open("n0-101"));
        assert!(stored.is_open("n0"));

        assert!(!view.toggle("n0-101-102-104", &mut store), "leaves do not toggle");
    }

    #[test]
    fn activation_waits_for_ready() {
        let store = MemoryExpansionStore::default();
        let mut view = TreeView::new();
        view.load(document("1"), "/tree/1", &store);
        assert_eq!(view.activate("n0-101-102-104", PanelLayout::Expanded), None);

        view.mark_ready();
        assert_eq!(
            view.activate("n0-101-102-104", PanelLayout::Collapsed).as_deref(),
            Some("/tree/1/20?parent_link=104&tree=0")
        );
        assert_eq!(view.activate("missing", PanelLayout::Collapsed), None);
    }

    #[test]
    fn reveal_opens_the_ancestors() {
        let mut store = MemoryExpansionStore::default();
        store.save("/tree/1", &TreeExpansionState::default()).expect("save");
        let mut view = TreeView::new();
        view.load(document("1"), "/tree/1", &store);

        view.reveal("n0-101-102-104", &mut store);
        let rows = view.visible_rows();
        assert!(rows.iter().any(|row| row.node_id == "n0-101-102-104"));
        assert!(!view.expansion().is_open("n0-101-102-104"));
    }
}
