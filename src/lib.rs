// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Cursus: tree-interaction protocol for academic program trees.
//!
//! A terminal browser drives a management server over HTTP: nodes are staged, attached,
//! detached, moved and reordered through one canonical action request.

pub mod client;
pub mod config;
pub mod logging;
pub mod model;
pub mod ops;
pub mod protocol;
pub mod query;
pub mod server;
pub mod store;
pub mod tui;
