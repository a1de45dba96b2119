// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::protocol::{FormField, FormFragment};

/// Validation bookkeeping for the form currently shown in the modal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValidationState {
    pub submissions: u32,
    pub errors: Vec<String>,
    pub in_flight: bool,
}

/// One submission of the modal form, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub action: String,
    pub fields: Vec<FormField>,
    pub attempt: u32,
}

/// Hosts the form fragment loaded for detach and move.
///
/// An invalid submission replaces the fragment in place and the next submission goes to
/// the re-rendered form's action; the modal closes only on success or cancel.
#[derive(Debug, Default)]
pub struct ModalFormController {
    fragment: Option<FormFragment>,
    state: FormValidationState,
}

impl ModalFormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, fragment: FormFragment) {
        self.state = FormValidationState {
            errors: fragment.errors.clone(),
            ..FormValidationState::default()
        };
        self.fragment = Some(fragment);
    }

    pub fn is_open(&self) -> bool {
        self.fragment.is_some()
    }

    pub fn fragment(&self) -> Option<&FormFragment> {
        self.fragment.as_ref()
    }

    pub fn state(&self) -> &FormValidationState {
        &self.state
    }

    /// Starts a submission; `None` if nothing is open or one is already in flight.
    pub fn submit(&mut self) -> Option<FormSubmission> {
        let fragment = self.fragment.as_ref()?;
        if self.state.in_flight {
            return None;
        }
        self.state.in_flight = true;
        self.state.submissions = self.state.submissions.saturating_add(1);
        Some(FormSubmission {
            action: fragment.action.clone(),
            fields: fragment.fields.clone(),
            attempt: self.state.submissions,
        })
    }

    /// Re-renders the server's invalid fragment in the same modal.
    pub fn rerender(&mut self, fragment: FormFragment) {
        if self.fragment.is_none() {
            return;
        }
        self.state.in_flight = false;
        self.state.errors = fragment.errors.clone();
        self.fragment = Some(fragment);
    }

    /// The submission never got an answer; the form stays open for another try.
    pub fn submission_failed(&mut self, message: impl Into<String>) {
        if self.fragment.is_none() {
            return;
        }
        self.state.in_flight = false;
        self.state.errors = vec![message.into()];
    }

    /// Closes after a successful submission.
    pub fn complete(&mut self) {
        self.close();
    }

    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.fragment = None;
        self.state = FormValidationState::default();
    }
}
