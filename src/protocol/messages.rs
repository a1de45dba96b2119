// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use crate::model::{ElementReference, ElementType, TreeDocument};

use super::action::TreeAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Inline notification, as returned by the staging endpoint and carried by pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub level: MessageLevel,
}

impl Notice {
    pub fn new(level: MessageLevel, message: impl Into<String>) -> Self {
        Self { message: message.into(), level }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(MessageLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(MessageLevel::Warning, message)
    }
}

/// Form body of a staging call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRequest {
    pub element_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementType>,
    pub action: TreeAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_link_id: Option<String>,
}

impl StageRequest {
    pub fn for_reference(reference: &ElementReference, action: TreeAction) -> Self {
        let parent_link_id = (action == TreeAction::Move)
            .then(|| reference.parent_link().as_wire().to_owned());
        Self {
            element_id: reference.element_id().to_string(),
            element_type: Some(reference.element_type()),
            action,
            parent_link_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

/// Server-rendered form destined for a modal dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFragment {
    pub title: String,
    pub body: Vec<String>,
    /// Submission target (path plus query).
    pub action: String,
    pub submit_label: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl FormFragment {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Outcome of submitting a modal form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FormResponse {
    Done { location: String },
    Invalid { fragment: FormFragment },
}

/// Details about the element a page is focused on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusDetail {
    pub element_id: String,
    pub acronym: String,
    pub title: String,
    pub element_type: ElementType,
    pub kind_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<u32>,
    pub parent_link_id: String,
    pub child_count: usize,
}

/// The element a session has staged, as reported on every page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedSummary {
    pub element_id: String,
    /// Node text of the element, e.g. `LBIR1100 - Mathematics 1`.
    pub label: String,
    /// Link the element leaves once attached elsewhere; absent for a plain selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moving_from: Option<String>,
}

/// A full page: the tree plus whatever the page is showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Path plus query of this page.
    pub location: String,
    pub root_id: String,
    pub title: String,
    pub tree: TreeDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<FocusDetail>,
    #[serde(default)]
    pub messages: Vec<Notice>,
    /// Present when the page is the non-fragment rendering of a modal form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<FormFragment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staged: Option<StagedSummary>,
}
