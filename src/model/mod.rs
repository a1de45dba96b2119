// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Programs contain elements (groups and learning units) joined by links; rendered trees
//! carry each element's identity as explicit node attributes.

pub mod element;
pub mod element_ref;
pub mod fixtures;
pub mod ids;
pub mod node;
pub mod program;

pub use element::{Element, ElementKind, ElementType, GroupType, ParseElementTypeError};
pub use element_ref::{ElementReference, ParentLink, ParseElementReferenceError, ROOT_LINK_SENTINEL};
pub use fixtures::{demo_program, DEMO_ROOT_ID, DEMO_SECOND_ROOT_ID};
pub use ids::{ElementId, Id, IdError, LinkId, SessionKey, ANONYMOUS_SESSION};
pub use node::{NodeAttrs, NodeIcon, TreeDocument, TreeNode};
pub use program::{Link, Program};
