// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use axum::extract::rejection::FormRejection;
use axum::extract::{OriginalUri, Path, Query, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::Deserialize;
use tracing::debug;

use crate::model::{ElementId, ParentLink, SessionKey};
use crate::ops::Direction;
use crate::protocol::{
    ActionRequest, FormResponse, Notice, StageRequest, TreeAction, FRAGMENT_HEADER,
    FRAGMENT_HEADER_VALUE, SESSION_HEADER,
};

use super::error::ServerError;
use super::state::ManagementState;
use super::ManagementServer;

fn session_of(headers: &HeaderMap) -> SessionKey {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| SessionKey::new(value).ok())
        .unwrap_or_else(SessionKey::anonymous)
}

fn wants_fragment(headers: &HeaderMap) -> bool {
    headers
        .get(FRAGMENT_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case(FRAGMENT_HEADER_VALUE))
}

fn parse_request(query: Option<String>) -> Result<ActionRequest, ServerError> {
    ActionRequest::parse_query(query.as_deref().unwrap_or_default())
        .map_err(|err| ServerError::BadRequest(err.to_string()))
}

fn parse_element_id(raw: &str) -> Result<ElementId, ServerError> {
    ElementId::new(raw).map_err(|err| ServerError::BadRequest(format!("invalid element id: {err}")))
}

fn location_of(uri: &OriginalUri) -> String {
    uri.path_and_query().map(|pq| pq.as_str().to_owned()).unwrap_or_else(|| uri.path().to_owned())
}

fn redirect_back(request: &ActionRequest) -> Response {
    Redirect::to(&ManagementState::return_location(request)).into_response()
}

pub(super) async fn stage(
    State(server): State<ManagementServer>,
    headers: HeaderMap,
    form: Result<Form<StageRequest>, FormRejection>,
) -> Result<Json<Notice>, ServerError> {
    let Form(request) = form.map_err(|err| ServerError::BadRequest(err.body_text()))?;
    let session = session_of(&headers);
    let notice = server.state.lock().await.stage(&session, &request)?;
    Ok(Json(notice))
}

pub(super) async fn management_get(
    State(server): State<ManagementServer>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response, ServerError> {
    let request = parse_request(query)?;
    let session = session_of(&headers);
    debug!(
        session = %session,
        action = %request.action,
        element_id = %request.element_id,
        "management GET"
    );

    let mut state = server.state.lock().await;
    match request.action {
        TreeAction::Attach => {
            state.attach(&session, &request);
            Ok(redirect_back(&request))
        }
        TreeAction::Detach | TreeAction::Move => {
            let fragment = state.form(&request, &server.management_path)?;
            if wants_fragment(&headers) {
                return Ok(Json(fragment).into_response());
            }
            let location = ManagementState::element_location(&request);
            let mut page = state.page(
                &session,
                &request.root_id,
                Some((&request.element_id, &request.parent_link)),
                &location,
            )?;
            page.form = Some(fragment);
            Ok(Json(page).into_response())
        }
        action @ (TreeAction::Select | TreeAction::Up | TreeAction::Down) => {
            Err(ServerError::MethodNotAllowed { action, method: "GET" })
        }
    }
}

pub(super) async fn management_post(
    State(server): State<ManagementServer>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response, ServerError> {
    let request = parse_request(query)?;
    let session = session_of(&headers);
    debug!(
        session = %session,
        action = %request.action,
        element_id = %request.element_id,
        "management POST"
    );

    let mut state = server.state.lock().await;
    let outcome = match request.action {
        TreeAction::Select => {
            let stage = StageRequest::for_reference(&request.reference(), TreeAction::Select);
            return Ok(Json(state.stage(&session, &stage)?).into_response());
        }
        TreeAction::Attach => {
            state.attach(&session, &request);
            return Ok(redirect_back(&request));
        }
        TreeAction::Up | TreeAction::Down => {
            let direction =
                if request.action == TreeAction::Up { Direction::Up } else { Direction::Down };
            state.reorder(&session, &request, direction);
            return Ok(redirect_back(&request));
        }
        TreeAction::Detach => state.detach(&session, &request, &server.management_path)?,
        TreeAction::Move => state.confirm_move(&session, &request, &server.management_path)?,
    };

    Ok(match outcome {
        Ok(_) => Json(FormResponse::Done { location: ManagementState::return_location(&request) })
            .into_response(),
        Err(fragment) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(FormResponse::Invalid { fragment }),
        )
            .into_response(),
    })
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct FocusQuery {
    parent_link: Option<String>,
}

pub(super) async fn tree_root(
    State(server): State<ManagementServer>,
    headers: HeaderMap,
    uri: OriginalUri,
    Path(root_id): Path<String>,
) -> Result<Response, ServerError> {
    let root_id = parse_element_id(&root_id)?;
    let session = session_of(&headers);
    let page = server.state.lock().await.page(&session, &root_id, None, &location_of(&uri))?;
    Ok(Json(page).into_response())
}

pub(super) async fn tree_element(
    State(server): State<ManagementServer>,
    headers: HeaderMap,
    uri: OriginalUri,
    Path((root_id, element_id)): Path<(String, String)>,
    Query(focus): Query<FocusQuery>,
) -> Result<Response, ServerError> {
    let root_id = parse_element_id(&root_id)?;
    let element_id = parse_element_id(&element_id)?;
    let parent_link = match focus.parent_link.as_deref() {
        None | Some("") => ParentLink::Root,
        Some(raw) => ParentLink::parse(raw)
            .map_err(|err| ServerError::BadRequest(format!("invalid parent_link: {err}")))?,
    };
    let session = session_of(&headers);
    let page = server.state.lock().await.page(
        &session,
        &root_id,
        Some((&element_id, &parent_link)),
        &location_of(&uri),
    )?;
    Ok(Json(page).into_response())
}
