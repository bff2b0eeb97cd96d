//! Submission forms and the state they share.
//!
//! Each form checks its payload against the submission's schema before
//! sending, so field errors show up without a round trip. The server checks
//! again and has the last word.

pub mod membership;
pub mod mentorship;
pub mod upload;

use std::collections::HashMap;

use dioxus::prelude::*;
use ltdk_shared::{SubmissionKind, SubmitResponse, ValidationError};
use serde_json::Value;

use crate::api_client::ApiClient;
use crate::backend::submit_action;

pub use membership::MembershipForm;
pub use mentorship::{MenteeForm, MentorForm};
pub use upload::UploadForm;

/// First message per field path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<String> {
        self.0.get(field).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&ValidationError> for FieldErrors {
    fn from(err: &ValidationError) -> Self {
        let mut errors = HashMap::new();
        for field in &err.errors {
            errors
                .entry(field.path.clone())
                .or_insert_with(|| field.message.clone());
        }
        Self(errors)
    }
}

/// Check `payload` the way the server will.
pub fn check(kind: SubmissionKind, payload: &Value) -> FieldErrors {
    match kind.schema().validate(payload) {
        Ok(_) => FieldErrors::default(),
        Err(err) => FieldErrors::from(&err),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormStatus {
    Editing,
    Submitting,
    Done(SubmitResponse),
}

/// State of one form's submission. Copyable like the signals it holds.
#[derive(Clone, Copy, PartialEq)]
pub struct Submission {
    kind: SubmissionKind,
    api: Signal<ApiClient>,
    pub status: Signal<FormStatus>,
    pub errors: Signal<FieldErrors>,
}

impl Submission {
    pub fn is_submitting(&self) -> bool {
        matches!(*self.status.read(), FormStatus::Submitting)
    }

    /// The accepted response once the server has stored the submission.
    pub fn accepted(&self) -> Option<SubmitResponse> {
        match &*self.status.read() {
            FormStatus::Done(response) if response.success => Some(response.clone()),
            _ => None,
        }
    }

    /// The server's message after a rejection.
    pub fn rejection(&self) -> Option<String> {
        match &*self.status.read() {
            FormStatus::Done(response) if !response.success => Some(response.message.clone()),
            _ => None,
        }
    }

    pub fn error(&self, field: &str) -> Option<String> {
        self.errors.read().get(field)
    }

    /// Check locally, then send to the server action.
    pub fn submit(mut self, payload: Value) {
        let errors = check(self.kind, &payload);
        let valid = errors.is_empty();
        self.errors.set(errors);
        if !valid || self.is_submitting() {
            return;
        }

        self.status.set(FormStatus::Submitting);
        let api = self.api.peek().clone();
        let kind = self.kind;
        let mut status = self.status;
        spawn(async move {
            let response = submit_action(&api, kind, &payload).await;
            status.set(FormStatus::Done(response));
        });
    }
}

pub fn use_submission(kind: SubmissionKind) -> Submission {
    Submission {
        kind,
        api: use_signal(ApiClient::for_current_origin),
        status: use_signal(|| FormStatus::Editing),
        errors: use_signal(FieldErrors::default),
    }
}

/// Success panel replacing a submitted form.
#[component]
pub fn SubmittedNotice(title: String, message: String) -> Element {
    rsx! {
        div { class: "rounded-md border border-emerald-200 bg-emerald-50 p-6 text-center",
            h4 { class: "text-lg font-semibold text-emerald-900", "{title}" }
            p { class: "mt-2 text-sm text-emerald-800", "{message}" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_membership_has_no_field_errors() {
        let payload = json!({
            "name": "Ibrahim Moussa",
            "promotion": "2010",
            "email": "ibrahim@example.ne",
            "phone": "+227 90 00 00 00",
        });
        assert!(check(SubmissionKind::Membership, &payload).is_empty());
    }

    #[test]
    fn errors_are_keyed_by_field() {
        let payload = json!({ "name": "", "promotion": "2010", "email": "pas-un-email", "phone": "" });
        let errors = check(SubmissionKind::Membership, &payload);
        assert_eq!(errors.get("name").as_deref(), Some("Le nom est requis."));
        assert_eq!(errors.get("email").as_deref(), Some("L'email est invalide."));
        assert!(errors.get("promotion").is_none());
    }

    #[test]
    fn exam_upload_requires_year_and_series() {
        let payload = json!({
            "title": "Bac 2022 Maths",
            "subject": "Mathématiques",
            "fileURL": "https://files.example/bac.pdf",
            "category": "sujet_bac",
        });
        let errors = check(SubmissionKind::Document, &payload);
        assert!(errors.get("year").is_some());
    }
}
