// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Wire protocol shared by the browser and the management server.

pub mod action;
pub mod messages;
pub mod request;

pub use action::{HttpMethod, ParseTreeActionError, TreeAction};
pub use messages::{
    FocusDetail, FormField, FormFragment, FormResponse, MessageLevel, Notice, PageSnapshot,
    StageRequest, StagedSummary,
};
pub use request::{build_action_request, ActionRequest, ParseActionRequestError};

/// Header marking a request as a fragment load rather than a page navigation.
pub const FRAGMENT_HEADER: &str = "x-requested-with";
pub const FRAGMENT_HEADER_VALUE: &str = "XMLHttpRequest";

/// Header carrying the browser session key.
pub const SESSION_HEADER: &str = "x-session-id";

/// Query parameter toggling initial side-panel visibility.
pub const TREE_PARAM: &str = "tree";
