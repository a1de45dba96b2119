// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structural mutations of a program tree.
//!
//! A batch of ops is applied to a copy of the program and committed only if every op
//! succeeds, so a failing batch leaves the program untouched. Each batch reports a
//! minimal delta of the links it touched.

use std::collections::BTreeSet;
use std::fmt;

use crate::model::{ElementId, ElementType, GroupType, Link, LinkId, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOp {
    Attach { parent: ElementId, child: ElementId },
    Detach { link_id: LinkId },
    Reorder { link_id: LinkId, direction: Direction },
}

/// Links touched by an applied batch, sorted by id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<LinkId>,
    pub removed: Vec<LinkId>,
    pub reordered: Vec<LinkId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub applied: usize,
    pub delta: Delta,
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<LinkId>,
    removed: BTreeSet<LinkId>,
    reordered: BTreeSet<LinkId>,
}

impl DeltaBuilder {
    fn record_added(&mut self, link_id: LinkId) {
        self.reordered.remove(&link_id);
        self.added.insert(link_id);
    }

    fn record_removed(&mut self, link_id: LinkId) {
        self.reordered.remove(&link_id);
        if !self.added.remove(&link_id) {
            self.removed.insert(link_id);
        }
    }

    fn record_reordered(&mut self, link_id: LinkId) {
        if self.added.contains(&link_id) || self.removed.contains(&link_id) {
            return;
        }
        self.reordered.insert(link_id);
    }

    fn finish(self) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            reordered: self.reordered.into_iter().collect(),
        }
    }
}

pub fn apply_ops(program: &mut Program, ops: &[LinkOp]) -> Result<ApplyResult, ApplyError> {
    if ops.is_empty() {
        return Ok(ApplyResult { applied: 0, delta: Delta::default() });
    }

    let mut draft = program.clone();
    let mut delta = DeltaBuilder::default();
    for op in ops {
        apply_op(&mut draft, op, &mut delta)?;
    }

    *program = draft;
    Ok(ApplyResult { applied: ops.len(), delta: delta.finish() })
}

fn apply_op(
    program: &mut Program,
    op: &LinkOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        LinkOp::Attach { parent, child } => {
            let link_id = attach(program, parent, child)?;
            delta.record_added(link_id);
        }
        LinkOp::Detach { link_id } => {
            program
                .remove_link(link_id)
                .ok_or_else(|| ApplyError::LinkNotFound { link_id: link_id.clone() })?;
            delta.record_removed(link_id.clone());
        }
        LinkOp::Reorder { link_id, direction } => {
            if let Some(swapped) = reorder(program, link_id, *direction)? {
                delta.record_reordered(link_id.clone());
                delta.record_reordered(swapped);
            }
        }
    }
    Ok(())
}

fn attach(
    program: &mut Program,
    parent: &ElementId,
    child: &ElementId,
) -> Result<LinkId, ApplyError> {
    let parent_element = program
        .element(parent)
        .ok_or_else(|| ApplyError::ElementNotFound { element_id: parent.clone() })?;
    let child_element = program
        .element(child)
        .ok_or_else(|| ApplyError::ElementNotFound { element_id: child.clone() })?;

    let Some(parent_type) = parent_element.group_type() else {
        return Err(ApplyError::LeafCannotHost { parent: parent_element.acronym().to_owned() });
    };
    if let Some(child_type) = child_element.group_type() {
        if !parent_type.may_contain(child_type) {
            return Err(ApplyError::IncompatibleTypes {
                parent: parent_element.acronym().to_owned(),
                parent_type,
                child: child_element.acronym().to_owned(),
                child_type,
            });
        }
    }
    if child_element.element_type() == ElementType::Group
        && program.is_ancestor_or_self(child, parent)
    {
        return Err(ApplyError::WouldCreateCycle {
            parent: parent_element.acronym().to_owned(),
            child: child_element.acronym().to_owned(),
        });
    }
    if program.children_of(parent).iter().any(|link| link.child() == child) {
        return Err(ApplyError::AlreadyAttached {
            parent: parent_element.acronym().to_owned(),
            child: child_element.acronym().to_owned(),
        });
    }

    let order = program
        .children_of(parent)
        .last()
        .map(|link| link.order().saturating_add(1))
        .unwrap_or(0);
    let link_id = program.allocate_link_id();
    program.insert_link(Link::new(link_id.clone(), parent.clone(), child.clone(), order));
    Ok(link_id)
}

/// Swaps `link_id` with its neighbour; `None` when it is already at that end.
fn reorder(
    program: &mut Program,
    link_id: &LinkId,
    direction: Direction,
) -> Result<Option<LinkId>, ApplyError> {
    let parent = program
        .link(link_id)
        .ok_or_else(|| ApplyError::LinkNotFound { link_id: link_id.clone() })?
        .parent()
        .clone();

    let siblings =
        program.children_of(&parent).into_iter().map(|link| link.id().clone()).collect::<Vec<_>>();
    let Some(position) = siblings.iter().position(|id| id == link_id) else {
        return Ok(None);
    };
    let neighbour = match direction {
        Direction::Up if position > 0 => position - 1,
        Direction::Down if position + 1 < siblings.len() => position + 1,
        _ => return Ok(None),
    };

    // Renumber densely first so that swapping orders is always a strict swap.
    for (order, id) in siblings.iter().enumerate() {
        if let Some(link) = program.link_mut(id) {
            link.set_order(order as u32);
        }
    }
    let other = siblings[neighbour].clone();
    if let Some(link) = program.link_mut(link_id) {
        link.set_order(neighbour as u32);
    }
    if let Some(link) = program.link_mut(&other) {
        link.set_order(position as u32);
    }
    Ok(Some(other))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    ElementNotFound { element_id: ElementId },
    LinkNotFound { link_id: LinkId },
    LeafCannotHost { parent: String },
    IncompatibleTypes {
        parent: String,
        parent_type: GroupType,
        child: String,
        child_type: GroupType,
    },
    WouldCreateCycle { parent: String, child: String },
    AlreadyAttached { parent: String, child: String },
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElementNotFound { element_id } => {
                write!(f, "element not found (id={element_id})")
            }
            Self::LinkNotFound { link_id } => write!(f, "link not found (id={link_id})"),
            Self::LeafCannotHost { parent } => {
                write!(f, "\"{parent}\" is a learning unit and cannot contain other elements")
            }
            Self::IncompatibleTypes { parent, parent_type, child, child_type } => write!(
                f,
                "You cannot attach \"{child}\" (type \"{}\") to \"{parent}\" (type \"{}\")",
                child_type.label(),
                parent_type.label()
            ),
            Self::WouldCreateCycle { .. } => {
                f.write_str("It is forbidden to attach an element to one of its included elements.")
            }
            Self::AlreadyAttached { parent, child } => {
                write!(f, "\"{child}\" is already attached to \"{parent}\"")
            }
        }
    }
}

impl std::error::Error for ApplyError {}
