// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Browser side of the tree-interaction protocol.
//!
//! A context-menu choice flows through [`TreeNodeResolver`] and [`ActionDispatcher`] into
//! effects that a [`Browser`] executes asynchronously; results come back as
//! [`ClientEvent`]s.

pub mod browser;
pub mod dispatcher;
pub mod modal;
pub mod panel;
pub mod resolver;
pub mod staging;
pub mod tree_view;

pub use browser::{http_client, Browser, BrowserError, HttpBrowser};
pub use dispatcher::{
    ActionDispatcher, ActionHandler, Dispatch, DispatchContext, Effect, MenuEntry, MenuState,
    PendingMoveToken,
};
pub use modal::{FormSubmission, FormValidationState, ModalFormController};
pub use panel::{
    tree_param, with_tree_param, Display, MemorySessionStorage, PanelAttributes, PanelLayout,
    PanelVisibilityController, SessionStorage, TREE_VISIBILITY_KEY,
};
pub use resolver::{MalformedNodeError, MalformedReason, TreeNodeResolver};
pub use staging::{
    HttpStagingTransport, SelectionStagingClient, StagingError, StagingFuture, StagingTransport,
};
pub use tree_view::{
    expansion_key, ExpansionStore, MemoryExpansionStore, TreeExpansionState, TreeView, VisibleRow,
};

use crate::protocol::{FormFragment, Notice, PageSnapshot};

/// Completion of an asynchronous browser operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    PageLoaded(PageSnapshot),
    NavigationFailed { url: String, message: String },
    FragmentLoaded(FormFragment),
    FormInvalid(FormFragment),
    FormCompleted { location: String },
    FormFailed { message: String },
    Notice(Notice),
}
