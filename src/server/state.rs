// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Program plus per-session staging slots and flash messages.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::model::{
    ElementId, ElementReference, ElementType, Link, LinkId, ParentLink, Program, SessionKey,
};
use crate::ops::{apply_ops, Direction, LinkOp};
use crate::protocol::{
    ActionRequest, FormField, FormFragment, Notice, PageSnapshot, StageRequest, StagedSummary,
    TreeAction,
};
use crate::query::{build_tree, focus_detail, tree_location};

use super::error::ServerError;

pub const NOTHING_STAGED: &str = "Please Select or Move an item before Attach it";
pub const ROOT_NOT_DETACHABLE: &str = "It is not possible to detach the root element.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedOrigin {
    Selected,
    /// Attaching completes the move by removing this link.
    Moving { from_link: LinkId },
}

/// The single element a session has staged for a later attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedElement {
    pub element_id: ElementId,
    pub element_type: ElementType,
    pub origin: StagedOrigin,
}

#[derive(Debug, Default)]
struct SessionState {
    pending: Option<StagedElement>,
    flash: Vec<Notice>,
}

#[derive(Debug)]
pub struct ManagementState {
    program: Program,
    sessions: HashMap<SessionKey, SessionState>,
}

impl ManagementState {
    pub fn new(program: Program) -> Self {
        Self { program, sessions: HashMap::new() }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn pending(&self, session: &SessionKey) -> Option<&StagedElement> {
        self.sessions.get(session)?.pending.as_ref()
    }

    pub fn flash(&mut self, session: &SessionKey, notice: Notice) {
        self.sessions.entry(session.clone()).or_default().flash.push(notice);
    }

    fn take_flash(&mut self, session: &SessionKey) -> Vec<Notice> {
        self.sessions
            .get_mut(session)
            .map(|state| std::mem::take(&mut state.flash))
            .unwrap_or_default()
    }

    fn set_pending(&mut self, session: &SessionKey, staged: StagedElement) {
        self.sessions.entry(session.clone()).or_default().pending = Some(staged);
    }

    fn staged_summary(&self, session: &SessionKey) -> Option<StagedSummary> {
        let staged = self.pending(session)?;
        let label = self
            .program
            .element(&staged.element_id)
            .map(|element| element.verbose())
            .unwrap_or_else(|| staged.element_id.to_string());
        let moving_from = match &staged.origin {
            StagedOrigin::Selected => None,
            StagedOrigin::Moving { from_link } => Some(from_link.to_string()),
        };
        Some(StagedSummary { element_id: staged.element_id.to_string(), label, moving_from })
    }

    fn acronym(&self, element_id: &ElementId) -> String {
        self.program
            .element(element_id)
            .map(|element| element.acronym().to_owned())
            .unwrap_or_else(|| element_id.to_string())
    }

    /// Overwrites the session's slot; the last call to arrive wins.
    pub fn stage(
        &mut self,
        session: &SessionKey,
        request: &StageRequest,
    ) -> Result<Notice, ServerError> {
        let element_id = ElementId::new(request.element_id.as_str())
            .map_err(|err| ServerError::BadRequest(format!("invalid element_id: {err}")))?;
        let element = self
            .program
            .element(&element_id)
            .ok_or_else(|| ServerError::NotFound(format!("element {element_id}")))?;

        let origin = match (request.action, request.parent_link_id.as_deref()) {
            (TreeAction::Move, Some(raw)) => match ParentLink::parse(raw) {
                Ok(ParentLink::Link(from_link)) => StagedOrigin::Moving { from_link },
                Ok(ParentLink::Root) => StagedOrigin::Selected,
                Err(err) => {
                    return Err(ServerError::BadRequest(format!("invalid parent_link_id: {err}")));
                }
            },
            _ => StagedOrigin::Selected,
        };
        let staged = StagedElement { element_id, element_type: element.element_type(), origin };
        let notice = Notice::success(format!("Selected element : \"{}\"", element.acronym()));

        info!(
            session = %session,
            element_id = %staged.element_id,
            action = %request.action,
            "staged"
        );
        self.set_pending(session, staged);
        Ok(notice)
    }

    /// Attaches the staged element below the request's element. Always answers with a
    /// notice that is also flashed for the next page.
    pub fn attach(&mut self, session: &SessionKey, request: &ActionRequest) -> Notice {
        let notice = self.try_attach(session, request);
        self.flash(session, notice.clone());
        notice
    }

    fn try_attach(&mut self, session: &SessionKey, request: &ActionRequest) -> Notice {
        let Some(staged) = self.pending(session).cloned() else {
            return Notice::warning(NOTHING_STAGED);
        };

        let parent = request.element_id.clone();
        let mut ops =
            vec![LinkOp::Attach { parent: parent.clone(), child: staged.element_id.clone() }];
        if let StagedOrigin::Moving { from_link } = &staged.origin {
            let still_linked = self
                .program
                .link(from_link)
                .is_some_and(|link| link.child() == &staged.element_id);
            if still_linked {
                ops.push(LinkOp::Detach { link_id: from_link.clone() });
            }
        }

        match apply_ops(&mut self.program, &ops) {
            Ok(result) => {
                info!(
                    session = %session,
                    parent = %parent,
                    child = %staged.element_id,
                    added = result.delta.added.len(),
                    removed = result.delta.removed.len(),
                    "attached"
                );
                if let Some(state) = self.sessions.get_mut(session) {
                    state.pending = None;
                }
                Notice::success(format!("Attached to \"{}\"", self.acronym(&parent)))
            }
            Err(err) => {
                warn!(session = %session, parent = %parent, error = %err, "attach refused");
                Notice::warning(err.to_string())
            }
        }
    }

    fn parent_link_of(&self, request: &ActionRequest) -> Result<&Link, String> {
        let ParentLink::Link(link_id) = &request.parent_link else {
            return Err(ROOT_NOT_DETACHABLE.to_owned());
        };
        match self.program.link(link_id) {
            Some(link) if link.child() == &request.element_id => Ok(link),
            _ => Err(format!(
                "\"{}\" is no longer attached at this position",
                self.acronym(&request.element_id)
            )),
        }
    }

    /// The confirmation form shown for detach and move.
    pub fn form(
        &self,
        request: &ActionRequest,
        management_path: &str,
    ) -> Result<FormFragment, ServerError> {
        let child = self.acronym(&request.element_id);
        let mut errors = Vec::new();
        let parent = match self.parent_link_of(request) {
            Ok(link) => self.acronym(link.parent()),
            Err(message) => {
                errors.push(message);
                String::new()
            }
        };

        let (title, body, submit_label) = match request.action {
            TreeAction::Detach => (
                format!("Detach {child}"),
                vec![format!("Are you sure you want to detach \"{child}\" from \"{parent}\"?")],
                "Detach",
            ),
            TreeAction::Move => (
                format!("Move {child}"),
                vec![
                    format!("\"{child}\" will be moved out of \"{parent}\"."),
                    "Open the new parent and choose Attach to complete the move.".to_owned(),
                ],
                "Move",
            ),
            action => return Err(ServerError::MethodNotAllowed { action, method: "GET" }),
        };

        Ok(FormFragment {
            title,
            body,
            action: request.url(management_path),
            submit_label: submit_label.to_owned(),
            fields: vec![FormField { name: "confirm".to_owned(), value: "1".to_owned() }],
            errors,
        })
    }

    pub fn detach(
        &mut self,
        session: &SessionKey,
        request: &ActionRequest,
        management_path: &str,
    ) -> Result<Result<Notice, FormFragment>, ServerError> {
        let link = match self.parent_link_of(request) {
            Ok(link) => link.clone(),
            Err(_) => return self.form(request, management_path).map(Err),
        };
        let notice = Notice::success(format!(
            "\"{}\" has been detached from \"{}\"",
            self.acronym(link.child()),
            self.acronym(link.parent())
        ));

        match apply_ops(&mut self.program, &[LinkOp::Detach { link_id: link.id().clone() }]) {
            Ok(_) => {
                info!(session = %session, link = %link.id(), "detached");
                self.flash(session, notice.clone());
                Ok(Ok(notice))
            }
            Err(err) => {
                let mut fragment = self.form(request, management_path)?;
                fragment.errors.push(err.to_string());
                Ok(Err(fragment))
            }
        }
    }

    /// Confirms a move: the staged slot now holds the element and its origin link.
    pub fn confirm_move(
        &mut self,
        session: &SessionKey,
        request: &ActionRequest,
        management_path: &str,
    ) -> Result<Result<Notice, FormFragment>, ServerError> {
        let link = match self.parent_link_of(request) {
            Ok(link) => link.clone(),
            Err(_) => return self.form(request, management_path).map(Err),
        };
        let reference = request.reference();
        let staged = StagedElement {
            element_id: reference.element_id().clone(),
            element_type: reference.element_type(),
            origin: StagedOrigin::Moving { from_link: link.id().clone() },
        };
        let notice = Notice::success(format!(
            "Selected element : \"{}\" (moving out of \"{}\")",
            self.acronym(link.child()),
            self.acronym(link.parent())
        ));
        info!(session = %session, link = %link.id(), "move staged");
        self.set_pending(session, staged);
        self.flash(session, notice.clone());
        Ok(Ok(notice))
    }

    pub fn reorder(
        &mut self,
        session: &SessionKey,
        request: &ActionRequest,
        direction: Direction,
    ) -> Notice {
        let notice = match &request.parent_link {
            ParentLink::Root => Notice::warning(ROOT_NOT_DETACHABLE),
            ParentLink::Link(link_id) => {
                let op = LinkOp::Reorder { link_id: link_id.clone(), direction };
                match apply_ops(&mut self.program, &[op]) {
                    Ok(_) => Notice::success(format!(
                        "The {} has been moved",
                        self.acronym(&request.element_id)
                    )),
                    Err(err) => Notice::warning(err.to_string()),
                }
            }
        };
        self.flash(session, notice.clone());
        notice
    }

    /// Renders the page for `element_id` (or the root) and drains the session's flash.
    pub fn page(
        &mut self,
        session: &SessionKey,
        root_id: &ElementId,
        focus: Option<(&ElementId, &ParentLink)>,
        location: &str,
    ) -> Result<PageSnapshot, ServerError> {
        let root = self
            .program
            .element(root_id)
            .ok_or_else(|| ServerError::NotFound(format!("element {root_id}")))?;
        let title = root.verbose();
        let tree = build_tree(&self.program, root_id)
            .map_err(|err| ServerError::NotFound(err.to_string()))?;
        let root_link = ParentLink::Root;
        let (element_id, parent_link) = focus.unwrap_or((root_id, &root_link));
        let focus = focus_detail(&self.program, element_id, parent_link)
            .ok_or_else(|| ServerError::NotFound(format!("element {element_id}")))?;
        let staged = self.staged_summary(session);

        Ok(PageSnapshot {
            location: location.to_owned(),
            root_id: root_id.to_string(),
            title,
            tree,
            focus: Some(focus),
            messages: self.take_flash(session),
            form: None,
            staged,
        })
    }

    /// Page location to return to after an action, defaulting to the tree root.
    pub fn return_location(request: &ActionRequest) -> String {
        let source = request.source.as_str();
        if source.starts_with('/') && !source.starts_with("//") {
            return source.to_owned();
        }
        tree_location(&request.root_id, &request.root_id, &ParentLink::Root)
    }

    /// Page location of the element a request acts on.
    pub fn element_location(request: &ActionRequest) -> String {
        let reference: ElementReference = request.reference();
        tree_location(&request.root_id, reference.element_id(), reference.parent_link())
    }
}
