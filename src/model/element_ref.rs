// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::element::{ElementType, ParseElementTypeError};
use super::ids::{ElementId, IdError, LinkId};

/// Wire value standing for "no removable parent link".
pub const ROOT_LINK_SENTINEL: &str = "0";

/// The edge connecting an element to its current parent in one rendered tree.
///
/// The tree root has no such edge and is encoded as [`ROOT_LINK_SENTINEL`] on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParentLink {
    Root,
    Link(LinkId),
}

impl ParentLink {
    /// Parses the wire form; `"0"` is the root sentinel.
    pub fn parse(value: &str) -> Result<Self, IdError> {
        if value == ROOT_LINK_SENTINEL {
            return Ok(Self::Root);
        }
        LinkId::new(value.to_owned()).map(Self::Link)
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    pub fn link_id(&self) -> Option<&LinkId> {
        match self {
            Self::Root => None,
            Self::Link(link_id) => Some(link_id),
        }
    }

    pub fn as_wire(&self) -> &str {
        match self {
            Self::Root => ROOT_LINK_SENTINEL,
            Self::Link(link_id) => link_id.as_str(),
        }
    }
}

impl From<LinkId> for ParentLink {
    fn from(link_id: LinkId) -> Self {
        if link_id.as_str() == ROOT_LINK_SENTINEL {
            Self::Root
        } else {
            Self::Link(link_id)
        }
    }
}

impl fmt::Display for ParentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Structured identity of one rendered tree node.
///
/// Values are derived on demand from the live node for a single action and are never
/// cached beyond it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementReference {
    element_id: ElementId,
    parent_link: ParentLink,
    element_type: ElementType,
}

impl ElementReference {
    pub fn new(element_id: ElementId, parent_link: ParentLink, element_type: ElementType) -> Self {
        Self { element_id, parent_link, element_type }
    }

    /// Builds a reference from raw wire strings.
    pub fn from_wire(
        element_id: &str,
        parent_link_id: &str,
        element_type: &str,
    ) -> Result<Self, ParseElementReferenceError> {
        let element_id = ElementId::new(element_id.to_owned())
            .map_err(ParseElementReferenceError::InvalidElementId)?;
        let parent_link = ParentLink::parse(parent_link_id)
            .map_err(ParseElementReferenceError::InvalidParentLink)?;
        let element_type =
            element_type.parse().map_err(ParseElementReferenceError::InvalidElementType)?;
        Ok(Self { element_id, parent_link, element_type })
    }

    pub fn element_id(&self) -> &ElementId {
        &self.element_id
    }

    pub fn parent_link(&self) -> &ParentLink {
        &self.parent_link
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn is_root(&self) -> bool {
        self.parent_link.is_root()
    }
}

impl fmt::Display for ElementReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} (link {})", self.element_type, self.element_id, self.parent_link)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseElementReferenceError {
    InvalidElementId(IdError),
    InvalidParentLink(IdError),
    InvalidElementType(ParseElementTypeError),
}

impl fmt::Display for ParseElementReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidElementId(err) => write!(f, "invalid element id: {err}"),
            Self::InvalidParentLink(err) => write!(f, "invalid parent link id: {err}"),
            Self::InvalidElementType(err) => write!(f, "invalid element type: {err}"),
        }
    }
}

impl std::error::Error for ParseElementReferenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidElementId(err) | Self::InvalidParentLink(err) => Some(err),
            Self::InvalidElementType(err) => Some(err),
        }
    }
}
