// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Context-menu state machine.
//!
//! The dispatcher turns an action chosen on a tree node into a list of [`Effect`]s. It
//! never performs I/O itself: the browser executes the effects and reports back through
//! `ClientEvent`s. The menu state of a node is recomputed on every open.

use tracing::debug;

use crate::model::{ElementId, ElementReference, ElementType, ParentLink, TreeNode};
use crate::protocol::{build_action_request, HttpMethod, StageRequest, StagedSummary, TreeAction};

use super::resolver::{MalformedNodeError, TreeNodeResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    /// Root learning unit: it can only be selected.
    Selectable,
    /// Non-root learning unit: can be moved around but cannot host children.
    AttachOnly,
    /// Root group: nothing may act on its (nonexistent) parent link.
    RootLocked,
    Normal,
}

impl MenuState {
    pub fn of(reference: &ElementReference) -> Self {
        match (reference.is_root(), reference.element_type()) {
            (true, ElementType::LearningUnit) => Self::Selectable,
            (false, ElementType::LearningUnit) => Self::AttachOnly,
            (true, ElementType::Group) => Self::RootLocked,
            (false, ElementType::Group) => Self::Normal,
        }
    }
}

/// Work the browser must carry out for a dispatched action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fire-and-forget POST to the staging endpoint.
    Stage(StageRequest),
    Navigate { method: HttpMethod, url: String },
    /// Load a form fragment and show it in a modal dialog.
    OpenModal { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Effects(Vec<Effect>),
    Disabled,
    /// A modal from an earlier action is still open.
    Busy,
    Malformed(MalformedNodeError),
}

/// Page-level inputs shared by every handler.
#[derive(Debug, Clone, Copy)]
pub struct DispatchContext<'a> {
    pub root_id: &'a ElementId,
    pub management_path: &'a str,
    /// Location of the current page; the server redirects back to it.
    pub source: &'a str,
}

impl DispatchContext<'_> {
    fn url(&self, reference: &ElementReference, action: TreeAction) -> String {
        build_action_request(self.root_id, reference, action, self.source).url(self.management_path)
    }
}

pub struct ActionHandler {
    pub action: TreeAction,
    pub label: &'static str,
    pub separator_before: bool,
    pub is_enabled: fn(&ElementReference) -> bool,
    pub execute: fn(&DispatchContext<'_>, &ElementReference) -> Vec<Effect>,
}

pub static HANDLERS: [ActionHandler; 6] = [
    ActionHandler {
        action: TreeAction::Select,
        label: "Select",
        separator_before: false,
        is_enabled: always,
        execute: execute_select,
    },
    ActionHandler {
        action: TreeAction::Attach,
        label: "Attach",
        separator_before: true,
        is_enabled: can_host_children,
        execute: execute_attach,
    },
    ActionHandler {
        action: TreeAction::Detach,
        label: "Detach",
        separator_before: false,
        is_enabled: has_parent_link,
        execute: execute_detach,
    },
    ActionHandler {
        action: TreeAction::Move,
        label: "Move",
        separator_before: false,
        is_enabled: has_parent_link,
        execute: execute_move,
    },
    ActionHandler {
        action: TreeAction::Up,
        label: "Move up",
        separator_before: true,
        is_enabled: has_parent_link,
        execute: execute_up,
    },
    ActionHandler {
        action: TreeAction::Down,
        label: "Move down",
        separator_before: false,
        is_enabled: has_parent_link,
        execute: execute_down,
    },
];

pub fn handler(action: TreeAction) -> &'static ActionHandler {
    match action {
        TreeAction::Select => &HANDLERS[0],
        TreeAction::Attach => &HANDLERS[1],
        TreeAction::Detach => &HANDLERS[2],
        TreeAction::Move => &HANDLERS[3],
        TreeAction::Up => &HANDLERS[4],
        TreeAction::Down => &HANDLERS[5],
    }
}

fn always(_: &ElementReference) -> bool {
    true
}

fn can_host_children(reference: &ElementReference) -> bool {
    reference.element_type().can_host_children()
}

fn has_parent_link(reference: &ElementReference) -> bool {
    !reference.is_root()
}

fn execute_select(_: &DispatchContext<'_>, reference: &ElementReference) -> Vec<Effect> {
    vec![Effect::Stage(StageRequest::for_reference(reference, TreeAction::Select))]
}

fn execute_attach(ctx: &DispatchContext<'_>, reference: &ElementReference) -> Vec<Effect> {
    if !can_host_children(reference) {
        return Vec::new();
    }
    vec![Effect::Navigate { method: HttpMethod::Get, url: ctx.url(reference, TreeAction::Attach) }]
}

fn execute_detach(ctx: &DispatchContext<'_>, reference: &ElementReference) -> Vec<Effect> {
    if reference.is_root() {
        return Vec::new();
    }
    vec![
        Effect::OpenModal { url: ctx.url(reference, TreeAction::Detach) },
        Effect::Stage(StageRequest::for_reference(reference, TreeAction::Detach)),
    ]
}

fn execute_move(ctx: &DispatchContext<'_>, reference: &ElementReference) -> Vec<Effect> {
    if reference.is_root() {
        return Vec::new();
    }
    vec![
        Effect::Stage(StageRequest::for_reference(reference, TreeAction::Move)),
        Effect::OpenModal { url: ctx.url(reference, TreeAction::Move) },
    ]
}

fn execute_up(ctx: &DispatchContext<'_>, reference: &ElementReference) -> Vec<Effect> {
    execute_reorder(ctx, reference, TreeAction::Up)
}

fn execute_down(ctx: &DispatchContext<'_>, reference: &ElementReference) -> Vec<Effect> {
    execute_reorder(ctx, reference, TreeAction::Down)
}

fn execute_reorder(
    ctx: &DispatchContext<'_>,
    reference: &ElementReference,
    action: TreeAction,
) -> Vec<Effect> {
    if reference.is_root() {
        return Vec::new();
    }
    vec![Effect::Navigate { method: HttpMethod::Post, url: ctx.url(reference, action) }]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub action: TreeAction,
    pub label: &'static str,
    pub separator_before: bool,
    pub enabled: bool,
}

/// Local mirror of a move in progress, used for the "moving ..." banner.
///
/// The server's staged slot stays authoritative; this only reflects what this browser
/// last asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMoveToken {
    pub element_id: ElementId,
    pub origin: ParentLink,
    pub label: String,
}

#[derive(Debug, Default)]
pub struct ActionDispatcher {
    resolver: TreeNodeResolver,
    busy: bool,
    pending_move: Option<PendingMoveToken>,
}

impl ActionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn pending_move(&self) -> Option<&PendingMoveToken> {
        self.pending_move.as_ref()
    }

    /// Releases the busy guard once the modal opened by detach or move is gone.
    pub fn modal_closed(&mut self) {
        self.busy = false;
    }

    pub fn clear_pending_move(&mut self) {
        self.pending_move = None;
    }

    /// Aligns the move mirror with the staged element a freshly loaded page reports.
    ///
    /// An attach only ends the move once the server has cleared the slot, so a refused
    /// attach keeps the banner.
    pub fn sync_pending_move(&mut self, staged: Option<&StagedSummary>) {
        let moving =
            staged.and_then(|staged| staged.moving_from.as_deref().map(|from| (staged, from)));
        let Some((staged, from_link)) = moving else {
            self.clear_pending_move();
            return;
        };
        let same_element = self
            .pending_move
            .as_ref()
            .is_some_and(|token| token.element_id.as_str() == staged.element_id);
        if same_element {
            return;
        }
        match (ElementId::new(staged.element_id.as_str()), ParentLink::parse(from_link)) {
            (Ok(element_id), Ok(origin)) => {
                self.pending_move =
                    Some(PendingMoveToken { element_id, origin, label: staged.label.clone() });
            }
            _ => {
                debug!(element_id = %staged.element_id, "ignoring malformed staged move");
                self.clear_pending_move();
            }
        }
    }

    pub fn menu_state(&self, node: &TreeNode) -> Result<MenuState, MalformedNodeError> {
        self.resolver.resolve(node).map(|reference| MenuState::of(&reference))
    }

    /// Menu entries for `node`, computed from its live attributes.
    pub fn menu(&self, node: &TreeNode) -> Result<Vec<MenuEntry>, MalformedNodeError> {
        let reference = self.resolver.resolve(node)?;
        Ok(HANDLERS
            .iter()
            .map(|handler| MenuEntry {
                action: handler.action,
                label: handler.label,
                separator_before: handler.separator_before,
                enabled: (handler.is_enabled)(&reference),
            })
            .collect())
    }

    pub fn dispatch(
        &mut self,
        ctx: &DispatchContext<'_>,
        node: &TreeNode,
        action: TreeAction,
    ) -> Dispatch {
        if self.busy {
            debug!(action = %action, node = %node.id, "dispatch ignored while a modal is open");
            return Dispatch::Busy;
        }

        let reference = match self.resolver.resolve(node) {
            Ok(reference) => reference,
            Err(err) => {
                debug!(action = %action, error = %err, "dispatch aborted");
                return Dispatch::Malformed(err);
            }
        };

        let handler = handler(action);
        if !(handler.is_enabled)(&reference) {
            return Dispatch::Disabled;
        }
        let effects = (handler.execute)(ctx, &reference);
        if effects.is_empty() {
            return Dispatch::Disabled;
        }

        match action {
            TreeAction::Select => self.clear_pending_move(),
            TreeAction::Move => {
                self.pending_move = Some(PendingMoveToken {
                    element_id: reference.element_id().clone(),
                    origin: reference.parent_link().clone(),
                    label: node.text.clone(),
                });
            }
            TreeAction::Attach | TreeAction::Detach | TreeAction::Up | TreeAction::Down => {}
        }
        if effects.iter().any(|effect| matches!(effect, Effect::OpenModal { .. })) {
            self.busy = true;
        }

        debug!(action = %action, reference = %reference, effects = effects.len(), "dispatched");
        Dispatch::Effects(effects)
    }
}
