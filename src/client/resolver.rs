// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use crate::model::{
    ElementId, ElementReference, ElementType, IdError, ParentLink, ParseElementTypeError,
    TreeNode,
};

/// Turns a rendered node into the identity the management endpoint needs.
///
/// Identity is read from the node's explicit attributes only; the node id is never
/// parsed. Resolution is local and constant time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeNodeResolver;

impl TreeNodeResolver {
    pub fn resolve(&self, node: &TreeNode) -> Result<ElementReference, MalformedNodeError> {
        let attrs = &node.attrs;

        let element_id = attrs
            .element_id
            .as_deref()
            .ok_or_else(|| MalformedNodeError::new(node, MalformedReason::MissingElementId))?;
        let element_id = ElementId::new(element_id)
            .map_err(|err| MalformedNodeError::new(node, MalformedReason::InvalidElementId(err)))?;

        let parent_link = match attrs.parent_link_id.as_deref() {
            None | Some("") => ParentLink::Root,
            Some(raw) => ParentLink::parse(raw).map_err(|err| {
                MalformedNodeError::new(node, MalformedReason::InvalidParentLink(err))
            })?,
        };

        let element_type = attrs
            .element_type
            .as_deref()
            .ok_or_else(|| MalformedNodeError::new(node, MalformedReason::MissingElementType))?
            .parse::<ElementType>()
            .map_err(|err| {
                MalformedNodeError::new(node, MalformedReason::UnknownElementType(err))
            })?;

        Ok(ElementReference::new(element_id, parent_link, element_type))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    MissingElementId,
    InvalidElementId(IdError),
    InvalidParentLink(IdError),
    MissingElementType,
    UnknownElementType(ParseElementTypeError),
}

/// A node whose attributes do not describe an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedNodeError {
    node_id: String,
    reason: MalformedReason,
}

impl MalformedNodeError {
    fn new(node: &TreeNode, reason: MalformedReason) -> Self {
        Self { node_id: node.id.clone(), reason }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn reason(&self) -> &MalformedReason {
        &self.reason
    }
}

impl fmt::Display for MalformedNodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node_id = &self.node_id;
        match &self.reason {
            MalformedReason::MissingElementId => write!(f, "node {node_id} has no element id"),
            MalformedReason::InvalidElementId(err) => {
                write!(f, "node {node_id} has an invalid element id: {err}")
            }
            MalformedReason::InvalidParentLink(err) => {
                write!(f, "node {node_id} has an invalid parent link: {err}")
            }
            MalformedReason::MissingElementType => write!(f, "node {node_id} has no element type"),
            MalformedReason::UnknownElementType(err) => write!(f, "node {node_id}: {err}"),
        }
    }
}

impl std::error::Error for MalformedNodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.reason {
            MalformedReason::InvalidElementId(err) | MalformedReason::InvalidParentLink(err) => {
                Some(err)
            }
            MalformedReason::UnknownElementType(err) => Some(err),
            _ => None,
        }
    }
}
