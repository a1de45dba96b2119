// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over a program.
//!
//! Queries provide derived views (rendered trees, detail panes) that the server hands to
//! the browser.

pub mod tree;

pub use tree::{build_tree, focus_detail, tree_location, TreeQueryError};
