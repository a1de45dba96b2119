// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence of browser UI state on disk.
//!
//! The state folder holds the per-tree expand/collapse state and the terminal browser's
//! log file.

pub mod state_folder;

pub use state_folder::{StateFolder, StoreError, WriteDurability};
