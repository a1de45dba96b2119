// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Rendered tree nodes as exchanged between the management server and the browser.

use serde::{Deserialize, Serialize};

/// Identity attributes attached to each node when it is rendered.
///
/// Fields are optional on the wire; turning them into a typed reference is the job of
/// `client::resolver`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_link_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeIcon {
    Folder,
    Leaf,
    LeafWithPrerequisites,
}

impl NodeIcon {
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Folder => "▸",
            Self::Leaf => "·",
            Self::LeafWithPrerequisites => "✦",
        }
    }
}

/// One node of a rendered tree: display metadata plus identity attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Opaque, unique within one document; used only as the expansion-state key.
    pub id: String,
    pub text: String,
    pub icon: NodeIcon,
    pub href: String,
    #[serde(default)]
    pub attrs: NodeAttrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Depth-first pre-order walk yielding `(depth, node)`.
    pub fn walk(&self) -> impl Iterator<Item = (usize, &TreeNode)> {
        let mut stack = vec![(0usize, self)];
        std::iter::from_fn(move || {
            let (depth, node) = stack.pop()?;
            for child in node.children.iter().rev() {
                stack.push((depth + 1, child));
            }
            Some((depth, node))
        })
    }
}

/// A complete tree as rendered for one root element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDocument {
    pub root_id: String,
    pub root: TreeNode,
}

impl TreeDocument {
    pub fn find(&self, node_id: &str) -> Option<&TreeNode> {
        self.root.walk().map(|(_, node)| node).find(|node| node.id == node_id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.root.walk().map(|(_, node)| node.id.as_str())
    }

    pub fn node_count(&self) -> usize {
        self.root.walk().count()
    }
}

#[cfg(test)]
mod tests {
    use super::{NodeAttrs, NodeIcon, TreeDocument, TreeNode};

    fn node(id: &str, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            id: id.to_owned(),
            text: id.to_uppercase(),
            icon: NodeIcon::Folder,
            href: format!("/tree/1/{id}"),
            attrs: NodeAttrs::default(),
            children,
        }
    }

    #[test]
    fn walk_is_pre_order_with_depths() {
        let root = node("a", vec![node("b", vec![node("c", vec![])]), node("d", vec![])]);
        let order = root.walk().map(|(depth, n)| (depth, n.id.clone())).collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![(0, "a".to_owned()), (1, "b".to_owned()), (2, "c".to_owned()), (1, "d".to_owned())]
        );
    }

    #[test]
    fn document_deserializes_without_optional_fields() {
        let json = r#"{
            "root_id": "1",
            "root": {"id": "n1", "text": "Root", "icon": "folder", "href": "/tree/1"}
        }"#;
        let doc: TreeDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.node_count(), 1);
        assert_eq!(doc.root.attrs, NodeAttrs::default());
        assert!(doc.find("n1").is_some());
        assert!(doc.find("n2").is_none());
    }
}
