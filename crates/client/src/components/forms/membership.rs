use dioxus::prelude::*;
use ltdk_shared::SubmissionKind;
use serde_json::json;

use super::{use_submission, SubmittedNotice};
use crate::components::ui::{Button, ErrorNotice, TextField};

/// Application to join the alumni association.
#[component]
pub fn MembershipForm() -> Element {
    let submission = use_submission(SubmissionKind::Membership);
    let mut name = use_signal(String::new);
    let mut promotion = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut phone = use_signal(String::new);

    if submission.accepted().is_some() {
        return rsx! {
            SubmittedNotice {
                title: "Demande d'adhésion envoyée",
                message: "Merci ! Votre demande a été reçue. Nous vous contacterons bientôt.",
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
                    "promotion": promotion(),
                    "email": email(),
                    "phone": phone(),
                }));
            },
            div { class: "grid gap-4 md:grid-cols-2",
                TextField {
                    label: "Nom complet",
                    value: name(),
                    placeholder: "Votre nom et prénom",
                    error: submission.error("name"),
                    oninput: move |e: FormEvent| name.set(e.value()),
                }
                TextField {
                    label: "Promotion",
                    value: promotion(),
                    placeholder: "Ex : 2010",
                    error: submission.error("promotion"),
                    oninput: move |e: FormEvent| promotion.set(e.value()),
                }
                TextField {
                    label: "Email",
                    value: email(),
                    input_type: "email",
                    placeholder: "vous@exemple.com",
                    error: submission.error("email"),
                    oninput: move |e: FormEvent| email.set(e.value()),
                }
                TextField {
                    label: "Téléphone",
                    value: phone(),
                    input_type: "tel",
                    placeholder: "+227 ...",
                    error: submission.error("phone"),
                    oninput: move |e: FormEvent| phone.set(e.value()),
                }
            }
            if let Some(message) = submission.rejection() {
                ErrorNotice { title: "Erreur", message }
            }
            Button {
                r#type: "submit",
                class: "w-full",
                disabled: submitting,
                if submitting { "Envoi en cours..." } else { "Soumettre ma demande d'adhésion" }
            }
        }
    }
}
