// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::element::Element;
use super::ids::{ElementId, LinkId};

/// Edge attaching `child` below `parent`; `order` sorts siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    id: LinkId,
    parent: ElementId,
    child: ElementId,
    order: u32,
    prerequisites: bool,
}

impl Link {
    pub fn new(id: LinkId, parent: ElementId, child: ElementId, order: u32) -> Self {
        Self { id, parent, child, order, prerequisites: false }
    }

    pub fn id(&self) -> &LinkId {
        &self.id
    }

    pub fn parent(&self) -> &ElementId {
        &self.parent
    }

    pub fn child(&self) -> &ElementId {
        &self.child
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn set_order(&mut self, order: u32) {
        self.order = order;
    }

    /// Whether the child learning unit carries prerequisites within this parent.
    pub fn has_prerequisites(&self) -> bool {
        self.prerequisites
    }

    pub fn with_prerequisites(mut self, prerequisites: bool) -> Self {
        self.prerequisites = prerequisites;
        self
    }
}

/// In-memory academic program: elements plus the links forming the hierarchy.
///
/// The same element may appear below several parents (one link each).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    elements: BTreeMap<ElementId, Element>,
    links: BTreeMap<LinkId, Link>,
    next_link: u64,
}

impl Program {
    pub fn new() -> Self {
        Self { elements: BTreeMap::new(), links: BTreeMap::new(), next_link: 1 }
    }

    pub fn insert_element(&mut self, element: Element) {
        self.elements.insert(element.id().clone(), element);
    }

    pub fn element(&self, element_id: &ElementId) -> Option<&Element> {
        self.elements.get(element_id)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn link(&self, link_id: &LinkId) -> Option<&Link> {
        self.links.get(link_id)
    }

    pub fn link_mut(&mut self, link_id: &LinkId) -> Option<&mut Link> {
        self.links.get_mut(link_id)
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// Allocates a fresh link id; ids start at 1 so they never collide with the root sentinel.
    pub fn allocate_link_id(&mut self) -> LinkId {
        let next = self.next_link.max(1);
        self.next_link = next + 1;
        LinkId::from_number(next)
    }

    pub fn insert_link(&mut self, link: Link) {
        if let Ok(numeric) = link.id().as_str().parse::<u64>() {
            self.next_link = self.next_link.max(numeric + 1);
        }
        self.links.insert(link.id().clone(), link);
    }

    pub fn remove_link(&mut self, link_id: &LinkId) -> Option<Link> {
        self.links.remove(link_id)
    }

    /// Links below `parent`, sorted by sibling order.
    pub fn children_of(&self, parent: &ElementId) -> Vec<&Link> {
        let mut children =
            self.links.values().filter(|link| link.parent() == parent).collect::<Vec<_>>();
        children.sort_by(|a, b| a.order().cmp(&b.order()).then_with(|| a.id().cmp(b.id())));
        children
    }

    pub fn parents_of<'a>(&'a self, child: &'a ElementId) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.values().filter(move |link| link.child() == child)
    }

    /// Whether `ancestor` is `element` itself or reachable upwards from it.
    pub fn is_ancestor_or_self(&self, ancestor: &ElementId, element: &ElementId) -> bool {
        let mut pending = vec![element.clone()];
        let mut seen = std::collections::BTreeSet::new();
        while let Some(current) = pending.pop() {
            if &current == ancestor {
                return true;
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            pending.extend(self.parents_of(&current).map(|link| link.parent().clone()));
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::{Link, Program};
    use crate::model::{Element, ElementId, GroupType, LinkId};

    fn eid(value: &str) -> ElementId {
        ElementId::new(value).unwrap()
    }

    fn small_program() -> Program {
        let mut program = Program::new();
        program.insert_element(Element::group(eid("1"), "ROOT", "Root", GroupType::Training));
        program.insert_element(Element::group(eid("2"), "CC", "Core", GroupType::CommonCore));
        program.insert_element(Element::learning_unit(eid("3"), "LU", "Unit", 5));
        program.insert_link(Link::new(LinkId::new("10").unwrap(), eid("1"), eid("2"), 0));
        program.insert_link(Link::new(LinkId::new("11").unwrap(), eid("2"), eid("3"), 0));
        program
    }

    #[test]
    fn allocated_ids_continue_after_inserted_links() {
        let mut program = small_program();
        assert_eq!(program.allocate_link_id().as_str(), "12");
        assert_eq!(program.allocate_link_id().as_str(), "13");
    }

    #[test]
    fn fresh_program_never_allocates_zero() {
        let mut program = Program::default();
        assert_eq!(program.allocate_link_id().as_str(), "1");
    }

    #[test]
    fn shared_element_lists_every_parent_link() {
        let mut program = small_program();
        program.insert_link(Link::new(LinkId::new("20").unwrap(), eid("1"), eid("3"), 1));
        let child = eid("3");
        let parents: Vec<&str> =
            program.parents_of(&child).map(|link| link.parent().as_str()).collect();
        assert_eq!(parents, vec!["2", "1"]);
        assert_eq!(program.parents_of(&eid("1")).count(), 0);
    }

    #[test]
    fn ancestry_follows_links_upwards() {
        let program = small_program();
        assert!(program.is_ancestor_or_self(&eid("1"), &eid("3")));
        assert!(program.is_ancestor_or_self(&eid("3"), &eid("3")));
        assert!(!program.is_ancestor_or_self(&eid("3"), &eid("1")));
    }
}
