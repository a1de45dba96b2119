// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Side-panel visibility, persisted per browser session.

use std::collections::HashMap;

use crate::protocol::TREE_PARAM;

pub const TREE_VISIBILITY_KEY: &str = "treeVisibility";

/// Key/value storage scoped to one browser session.
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    values: HashMap<String, String>,
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelLayout {
    Expanded,
    Collapsed,
}

impl PanelLayout {
    /// `"0"` means hidden; anything else, including no value, means shown.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("0") => Self::Collapsed,
            _ => Self::Expanded,
        }
    }

    pub const fn stored_value(self) -> &'static str {
        match self {
            Self::Expanded => "1",
            Self::Collapsed => "0",
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Expanded => Self::Collapsed,
            Self::Collapsed => Self::Expanded,
        }
    }

    pub const fn attributes(self) -> PanelAttributes {
        match self {
            Self::Expanded => {
                PanelAttributes { display: Display::Block, panel_columns: 3, data_columns: 9 }
            }
            Self::Collapsed => {
                PanelAttributes { display: Display::None, panel_columns: 0, data_columns: 12 }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    None,
}

/// Layout of the tree panel and the data pane on a twelve-column grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelAttributes {
    pub display: Display,
    pub panel_columns: u16,
    pub data_columns: u16,
}

impl PanelAttributes {
    pub const GRID_COLUMNS: u16 = 12;
}

pub struct PanelVisibilityController<S: SessionStorage = MemorySessionStorage> {
    storage: S,
    applied: PanelAttributes,
}

impl<S: SessionStorage> PanelVisibilityController<S> {
    pub fn new(storage: S) -> Self {
        let stored = storage.get(TREE_VISIBILITY_KEY);
        let applied = PanelLayout::from_stored(stored.as_deref()).attributes();
        Self { storage, applied }
    }

    pub fn layout(&self) -> PanelLayout {
        PanelLayout::from_stored(self.storage.get(TREE_VISIBILITY_KEY).as_deref())
    }

    /// Attributes most recently applied to the layout.
    pub fn attributes(&self) -> PanelAttributes {
        self.applied
    }

    /// Derives the attribute triple from the stored value and assigns it in one step.
    pub fn apply(&mut self) -> PanelAttributes {
        self.applied = self.layout().attributes();
        self.applied
    }

    pub fn toggle(&mut self) -> PanelAttributes {
        let next = self.layout().toggled();
        self.storage.set(TREE_VISIBILITY_KEY, next.stored_value());
        self.apply()
    }

    /// Honors the `tree` query parameter of a freshly loaded page, then applies.
    pub fn apply_query(&mut self, tree: Option<&str>) -> PanelAttributes {
        if let Some(value @ ("0" | "1")) = tree {
            self.storage.set(TREE_VISIBILITY_KEY, value);
        }
        self.apply()
    }

    /// `location` with the `tree` parameter set to the current visibility.
    pub fn link(&self, location: &str) -> String {
        with_tree_param(location, self.layout())
    }
}

/// Sets `tree=<0|1>` on `location`, replacing any previous value.
pub fn with_tree_param(location: &str, layout: PanelLayout) -> String {
    let (path, query) = location.split_once('?').unwrap_or((location, ""));
    let tree = format!("{TREE_PARAM}={}", layout.stored_value());
    let mut pairs = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some(TREE_PARAM))
        .collect::<Vec<_>>();
    pairs.push(&tree);
    format!("{path}?{}", pairs.join("&"))
}

/// Value of the `tree` query parameter in `location`, if any.
pub fn tree_param(location: &str) -> Option<&str> {
    let (_, query) = location.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == TREE_PARAM)
        .map(|(_, value)| value)
}
