// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::fmt;

use crate::model::{
    Element, ElementId, ElementKind, Link, NodeAttrs, NodeIcon, ParentLink, Program,
    TreeDocument, TreeNode,
};
use crate::protocol::FocusDetail;

const ROOT_NODE_ID: &str = "n0";

/// Page location of `element_id` as reached through `parent_link` inside the tree of
/// `root_id`. The root itself lives at `/tree/<root_id>`.
pub fn tree_location(
    root_id: &ElementId,
    element_id: &ElementId,
    parent_link: &ParentLink,
) -> String {
    let root = urlencoding::encode(root_id.as_str());
    if element_id == root_id && parent_link.is_root() {
        return format!("/tree/{root}");
    }
    format!(
        "/tree/{root}/{}?parent_link={}",
        urlencoding::encode(element_id.as_str()),
        urlencoding::encode(parent_link.as_wire())
    )
}

/// Renders the hierarchy below `root_id`.
///
/// Node ids are derived from the chain of link ids leading to the node, so they stay
/// stable across renders and remain unique when an element is reachable twice.
pub fn build_tree(program: &Program, root_id: &ElementId) -> Result<TreeDocument, TreeQueryError> {
    let root = program
        .element(root_id)
        .ok_or_else(|| TreeQueryError::RootNotFound { root_id: root_id.clone() })?;

    let mut path = BTreeSet::new();
    path.insert(root_id.clone());
    let mut node = render_node(root_id, root, &ParentLink::Root, None, ROOT_NODE_ID.to_owned());
    node.children = render_children(program, root_id, root_id, ROOT_NODE_ID, &mut path);

    Ok(TreeDocument { root_id: root_id.to_string(), root: node })
}

fn render_children(
    program: &Program,
    root_id: &ElementId,
    parent: &ElementId,
    parent_node_id: &str,
    path: &mut BTreeSet<ElementId>,
) -> Vec<TreeNode> {
    let mut nodes = Vec::new();
    for link in program.children_of(parent) {
        let Some(child) = program.element(link.child()) else {
            continue;
        };
        // Guard against malformed data; attach refuses to create cycles.
        if !path.insert(link.child().clone()) {
            continue;
        }
        let node_id = format!("{parent_node_id}-{}", link.id());
        let parent_link = ParentLink::Link(link.id().clone());
        let mut node = render_node(root_id, child, &parent_link, Some(link), node_id);
        node.children = render_children(program, root_id, link.child(), &node.id, path);
        path.remove(link.child());
        nodes.push(node);
    }
    nodes
}

fn render_node(
    root_id: &ElementId,
    element: &Element,
    parent_link: &ParentLink,
    link: Option<&Link>,
    node_id: String,
) -> TreeNode {
    let icon = match element.kind() {
        ElementKind::Group { .. } => NodeIcon::Folder,
        ElementKind::LearningUnit { .. } if link.is_some_and(Link::has_prerequisites) => {
            NodeIcon::LeafWithPrerequisites
        }
        ElementKind::LearningUnit { .. } => NodeIcon::Leaf,
    };
    TreeNode {
        id: node_id,
        text: element.verbose(),
        icon,
        href: tree_location(root_id, element.id(), parent_link),
        attrs: NodeAttrs {
            element_id: Some(element.id().to_string()),
            parent_link_id: Some(parent_link.as_wire().to_owned()),
            element_type: Some(element.element_type().as_str().to_owned()),
            title: Some(element.title().to_owned()),
        },
        children: Vec::new(),
    }
}

/// Detail pane content for `element_id` reached through `parent_link`.
pub fn focus_detail(
    program: &Program,
    element_id: &ElementId,
    parent_link: &ParentLink,
) -> Option<FocusDetail> {
    let element = program.element(element_id)?;
    let (kind_label, credits) = match element.kind() {
        ElementKind::Group { group_type } => (group_type.label().to_owned(), None),
        ElementKind::LearningUnit { credits } => ("Learning unit".to_owned(), Some(*credits)),
    };
    Some(FocusDetail {
        element_id: element_id.to_string(),
        acronym: element.acronym().to_owned(),
        title: element.title().to_owned(),
        element_type: element.element_type(),
        kind_label,
        credits,
        parent_link_id: parent_link.as_wire().to_owned(),
        child_count: program.children_of(element_id).len(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeQueryError {
    RootNotFound { root_id: ElementId },
}

impl fmt::Display for TreeQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { root_id } => write!(f, "root element not found (id={root_id})"),
        }
    }
}

impl std::error::Error for TreeQueryError {}

#[cfg(test)]
mod tests {
    use super::{build_tree, focus_detail, tree_location, TreeQueryError};
    use crate::model::{
        demo_program, ElementId, ElementType, Link, LinkId, NodeIcon, ParentLink,
    };

    fn eid(value: &str) -> ElementId {
        ElementId::new(value).expect("element id")
    }

    #[test]
    fn root_node_carries_the_root_sentinel() {
        let doc = build_tree(&demo_program(), &eid("1")).expect("tree");
        assert_eq!(doc.root_id, "1");
        assert_eq!(doc.root.href, "/tree/1");
        assert_eq!(doc.root.attrs.parent_link_id.as_deref(), Some("0"));
        assert_eq!(doc.root.attrs.element_type.as_deref(), Some("group"));
        assert_eq!(doc.root.text, "BIR1BA - Bachelor in Engineering");
    }

    #[test]
    fn children_follow_sibling_order_and_carry_their_link() {
        let doc = build_tree(&demo_program(), &eid("1")).expect("tree");
        let labels =
            doc.root.children.iter().map(|n| n.attrs.element_id.clone()).collect::<Vec<_>>();
        assert_eq!(labels, vec![Some("2".to_owned()), Some("5".to_owned())]);

        let unit = doc.find("n0-101-102-104").expect("LBIR1100 node");
        assert_eq!(unit.attrs.parent_link_id.as_deref(), Some("104"));
        assert_eq!(unit.attrs.element_type.as_deref(), Some(ElementType::LearningUnit.as_str()));
        assert_eq!(unit.href, "/tree/1/20?parent_link=104");
        assert_eq!(unit.icon, NodeIcon::Leaf);
    }

    #[test]
    fn prerequisites_change_the_leaf_icon() {
        let doc = build_tree(&demo_program(), &eid("1")).expect("tree");
        let unit = doc.find("n0-101-103-107").expect("LBIR1201 node");
        assert_eq!(unit.icon, NodeIcon::LeafWithPrerequisites);
    }

    #[test]
    fn shared_elements_get_distinct_node_ids() {
        let mut program = demo_program();
        program.insert_link(Link::new(LinkId::new("200").expect("id"), eid("4"), eid("20"), 5));
        let doc = build_tree(&program, &eid("1")).expect("tree");

        let occurrences = doc
            .root
            .walk()
            .filter(|(_, node)| node.attrs.element_id.as_deref() == Some("20"))
            .map(|(_, node)| node.id.clone())
            .collect::<Vec<_>>();
        assert_eq!(occurrences.len(), 2);
        assert_ne!(occurrences[0], occurrences[1]);
    }

    #[test]
    fn unknown_root_is_an_error() {
        let err = build_tree(&demo_program(), &eid("404")).expect_err("missing root");
        assert_eq!(err, TreeQueryError::RootNotFound { root_id: eid("404") });
    }

    #[test]
    fn trees_are_rooted_independently() {
        let doc = build_tree(&demo_program(), &eid("7")).expect("tree");
        assert_eq!(doc.node_count(), 2);
        assert_eq!(doc.root.href, "/tree/7");
    }

    #[test]
    fn location_for_a_child_includes_the_parent_link() {
        let link = ParentLink::Link(LinkId::new("17").expect("id"));
        assert_eq!(tree_location(&eid("1"), &eid("99"), &link), "/tree/1/99?parent_link=17");
        assert_eq!(tree_location(&eid("1"), &eid("1"), &ParentLink::Root), "/tree/1");
    }

    #[test]
    fn focus_detail_describes_units_and_groups() {
        let program = demo_program();
        let unit = focus_detail(&program, &eid("24"), &ParentLink::Root).expect("unit");
        assert_eq!(unit.credits, Some(6));
        assert_eq!(unit.kind_label, "Learning unit");

        let group = focus_detail(&program, &eid("3"), &ParentLink::Root).expect("group");
        assert_eq!(group.kind_label, "Sub-group");
        assert_eq!(group.child_count, 2);
        assert!(focus_detail(&program, &eid("404"), &ParentLink::Root).is_none());
    }
}
