use dioxus::prelude::*;
use ltdk_shared::SubmissionKind;
use serde_json::json;

use super::{use_submission, SubmittedNotice};
use crate::components::ui::{Button, ErrorNotice, SelectField, TextAreaField, TextField};

const SUBMITTED_MESSAGE: &str = "Merci ! Nous vous mettrons en relation dès que possible.";

/// Offer to mentor current students or recent graduates.
#[component]
pub fn MentorForm(on_done: EventHandler<()>) -> Element {
    let submission = use_submission(SubmissionKind::Mentor);
    let mut name = use_signal(String::new);
    let mut contact = use_signal(String::new);
    let mut promotion = use_signal(String::new);
    let mut field = use_signal(String::new);
    let mut motivation = use_signal(String::new);

    if submission.accepted().is_some() {
        return rsx! {
            SubmittedNotice { title: "Demande Soumise", message: SUBMITTED_MESSAGE }
            Button {
                class: "mt-4 w-full",
                variant: crate::components::ui::ButtonVariant::Outline,
                onclick: move |_| on_done.call(()),
                "Fermer"
            }
        };
    }

    let submitting = submission.is_submitting();

    rsx! {
        form {
            class: "space-y-4",
            onsubmit: move |e: FormEvent| {
                e.prevent_default();
                submission.submit(json!({
                    "name": name(),
                    "contact": contact(),
                    "promotion": promotion(),
                    "field": field(),
                    "motivation": motivation(),
                }));
            },
            TextField {
                label: "Nom complet",
                value: name(),
                error: submission.error("name"),
                oninput: move |e: FormEvent| name.set(e.value()),
            }
            TextField {
                label: "Email ou téléphone",
                value: contact(),
                error: submission.error("contact"),
                oninput: move |e: FormEvent| contact.set(e.value()),
            }
            div { class: "grid gap-4 md:grid-cols-2",
                TextField {
                    label: "Promotion",
                    value: promotion(),
                    placeholder: "Ex : 2005",
                    error: submission.error("promotion"),
                    oninput: move |e: FormEvent| promotion.set(e.value()),
                }
                TextField {
                    label: "Domaine d'expertise",
                    value: field(),
                    placeholder: "Ex : Génie Civil",
                    error: submission.error("field"),
                    oninput: move |e: FormEvent| field.set(e.value()),
                }
            }
            TextAreaField {
                label: "Motivation",
                value: motivation(),
                placeholder: "Pourquoi souhaitez-vous devenir mentor ?",
                error: submission.error("motivation"),
                oninput: move |e: FormEvent| motivation.set(e.value()),
            }
            if let Some(message) = submission.rejection() {
                ErrorNotice { title: "Erreur", message }
            }
            Button {
                r#type: "submit",
                class: "w-full",
                disabled: submitting,
                if submitting { "Envoi en cours..." } else { "Devenir Mentor" }
            }
        }
    }
}

/// Request for a mentor from a student or young graduate.
#[component]
pub fn MenteeForm(on_done: EventHandler<()>) -> Element {
    let submission = use_submission(SubmissionKind::Mentee);
    let mut name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut promotion = use_signal(String::new);
    let mut domain = use_signal(String::new);
    let mut status = use_signal(|| "student".to_string());
    let mut need = use_signal(String::new);

    if submission.accepted().is_some() {
        return rsx! {
            SubmittedNotice { title: "Demande Soumise", message: SUBMITTED_MESSAGE }
            Button {
                class: "mt-4 w-full",
                variant: crate::components::ui::ButtonVariant::Outline,
                onclick: move |_| on_done.call(()),
                "Fermer"
            }
        };
    }

    let submitting = submission.is_submitting();
    let statuses = vec![
        ("student".to_string(), "Élève au LTDK".to_string()),
        ("young_alumni".to_string(), "Jeune diplômé(e)".to_string()),
    ];

    rsx! {
        form {
            class: "space-y-4",
            onsubmit: move |e: FormEvent| {
                e.prevent_default();
                submission.submit(json!({
                    "name": name(),
                    "email": email(),
                    "promotion": promotion(),
                    "domain": domain(),
                    "status": status(),
                    "need": need(),
                }));
            },
            TextField {
                label: "Nom complet",
                value: name(),
                error: submission.error("name"),
                oninput: move |e: FormEvent| name.set(e.value()),
            }
            TextField {
                label: "Email",
                value: email(),
                input_type: "email",
                error: submission.error("email"),
                oninput: move |e: FormEvent| email.set(e.value()),
            }
            div { class: "grid gap-4 md:grid-cols-2",
                TextField {
                    label: "Promotion / Classe",
                    value: promotion(),
                    error: submission.error("promotion"),
                    oninput: move |e: FormEvent| promotion.set(e.value()),
                }
                TextField {
                    label: "Domaine d'intérêt",
                    value: domain(),
                    error: submission.error("domain"),
                    oninput: move |e: FormEvent| domain.set(e.value()),
                }
            }
            SelectField {
                label: "Statut",
                value: status(),
                options: statuses,
                error: submission.error("status"),
                onchange: move |e: FormEvent| status.set(e.value()),
            }
            TextAreaField {
                label: "Votre besoin",
                value: need(),
                placeholder: "Décrivez ce que vous attendez d'un mentor",
                error: submission.error("need"),
                oninput: move |e: FormEvent| need.set(e.value()),
            }
            if let Some(message) = submission.rejection() {
                ErrorNotice { title: "Erreur", message }
            }
            Button {
                r#type: "submit",
                class: "w-full",
                disabled: submitting,
                if submitting { "Envoi en cours..." } else { "Trouver un Mentor" }
            }
        }
    }
}
