// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canonical management-endpoint requests and their query-string form.
//!
//! Canonical query (keys always in this order):
//! `root_id=<id>&element_id=<id>&parent_link_id=<id|0>&action=<action>&source=<location>&element_type=<type>`

use std::fmt;

use crate::model::{
    ElementId, ElementReference, ElementType, IdError, ParentLink, ParseElementTypeError,
};

use super::action::{ParseTreeActionError, TreeAction};

const KEY_ORDER: [&str; 6] =
    ["root_id", "element_id", "parent_link_id", "action", "source", "element_type"];

/// Payload sent to the management endpoint for one context-menu action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub root_id: ElementId,
    pub element_id: ElementId,
    pub parent_link: ParentLink,
    pub action: TreeAction,
    /// Location of the originating page, used by the server to redirect back.
    pub source: String,
    pub element_type: ElementType,
}

/// Builds the request for `action` on `reference`. Pure and total; enablement is not
/// checked here.
pub fn build_action_request(
    root_id: &ElementId,
    reference: &ElementReference,
    action: TreeAction,
    source: &str,
) -> ActionRequest {
    ActionRequest {
        root_id: root_id.clone(),
        element_id: reference.element_id().clone(),
        parent_link: reference.parent_link().clone(),
        action,
        source: source.to_owned(),
        element_type: reference.element_type(),
    }
}

impl ActionRequest {
    pub fn reference(&self) -> ElementReference {
        ElementReference::new(self.element_id.clone(), self.parent_link.clone(), self.element_type)
    }

    fn values(&self) -> [&str; 6] {
        [
            self.root_id.as_str(),
            self.element_id.as_str(),
            self.parent_link.as_wire(),
            self.action.as_str(),
            &self.source,
            self.element_type.as_str(),
        ]
    }

    pub fn to_query_string(&self) -> String {
        KEY_ORDER
            .iter()
            .zip(self.values())
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `<endpoint>?<canonical query>`.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{endpoint}?{}", self.to_query_string())
    }

    /// Decodes a query string produced by [`ActionRequest::to_query_string`].
    ///
    /// Key order is not enforced; unknown keys are ignored. A missing `parent_link_id`
    /// decodes as the root sentinel.
    pub fn parse_query(query: &str) -> Result<Self, ParseActionRequestError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut fields: [Option<String>; 6] = Default::default();

        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let Some(slot) = KEY_ORDER.iter().position(|known| *known == key) else {
                continue;
            };
            let value = urlencoding::decode(&value.replace('+', " "))
                .map_err(|_| ParseActionRequestError::InvalidEncoding { key: KEY_ORDER[slot] })?
                .into_owned();
            fields[slot] = Some(value);
        }

        let [root_id, element_id, parent_link_id, action, source, element_type] = fields;

        let root_id = root_id.ok_or(ParseActionRequestError::Missing { key: "root_id" })?;
        let root_id = ElementId::new(root_id)
            .map_err(|source| ParseActionRequestError::InvalidId { key: "root_id", source })?;
        let element_id = element_id.ok_or(ParseActionRequestError::Missing { key: "element_id" })?;
        let element_id = ElementId::new(element_id)
            .map_err(|source| ParseActionRequestError::InvalidId { key: "element_id", source })?;
        let parent_link = match parent_link_id.as_deref() {
            None | Some("") => ParentLink::Root,
            Some(raw) => ParentLink::parse(raw).map_err(|source| {
                ParseActionRequestError::InvalidId { key: "parent_link_id", source }
            })?,
        };
        let action = action
            .ok_or(ParseActionRequestError::Missing { key: "action" })?
            .parse::<TreeAction>()
            .map_err(ParseActionRequestError::InvalidAction)?;
        let element_type = element_type
            .ok_or(ParseActionRequestError::Missing { key: "element_type" })?
            .parse::<ElementType>()
            .map_err(ParseActionRequestError::InvalidElementType)?;

        Ok(Self {
            root_id,
            element_id,
            parent_link,
            action,
            source: source.unwrap_or_default(),
            element_type,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseActionRequestError {
    Missing { key: &'static str },
    InvalidEncoding { key: &'static str },
    InvalidId { key: &'static str, source: IdError },
    InvalidAction(ParseTreeActionError),
    InvalidElementType(ParseElementTypeError),
}

impl fmt::Display for ParseActionRequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { key } => write!(f, "missing query parameter '{key}'"),
            Self::InvalidEncoding { key } => {
                write!(f, "query parameter '{key}' is not valid UTF-8")
            }
            Self::InvalidId { key, source } => write!(f, "invalid '{key}': {source}"),
            Self::InvalidAction(err) => write!(f, "{err}"),
            Self::InvalidElementType(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ParseActionRequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidId { source, .. } => Some(source),
            Self::InvalidAction(err) => Some(err),
            Self::InvalidElementType(err) => Some(err),
            _ => None,
        }
    }
}
