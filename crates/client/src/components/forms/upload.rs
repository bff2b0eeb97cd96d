use dioxus::prelude::*;
use ltdk_shared::{pipeline, SubmissionKind, SubmitError};
use serde_json::{json, Value};

use super::{FieldErrors, SubmittedNotice};
use crate::backend::use_connection;
use crate::components::ui::{Button, ButtonVariant, ErrorNotice, SelectField, TextField};

fn options(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(v, l)| (v.to_string(), l.to_string())).collect()
}

/// Contribution to the library. Written straight to the `documents`
/// collection, which the backend lets clients append to.
#[component]
pub fn UploadForm() -> Element {
    let connection = use_connection();
    let mut title = use_signal(String::new);
    let mut subject = use_signal(String::new);
    let mut category = use_signal(|| "autre_document".to_string());
    let mut doc_type = use_signal(|| "cours".to_string());
    let mut year = use_signal(String::new);
    let mut series = use_signal(String::new);
    let mut file_url = use_signal(String::new);

    let mut errors = use_signal(FieldErrors::default);
    let mut failure = use_signal(|| None::<String>);
    let mut uploading = use_signal(|| false);
    let mut uploaded = use_signal(|| false);

    if uploaded() {
        return rsx! {
            SubmittedNotice {
                title: "Merci pour votre contribution",
                message: "Document téléversé avec succès.",
            }
            Button {
                class: "mt-4 w-full",
                variant: ButtonVariant::Outline,
                onclick: move |_| {
                    title.set(String::new());
                    subject.set(String::new());
                    file_url.set(String::new());
                    uploaded.set(false);
                },
                "Proposer un autre document"
            }
        };
    }

    let is_exam = category() == "sujet_bac";

    let on_submit = move |e: FormEvent| {
        e.prevent_default();
        if uploading() {
            return;
        }
        let mut payload = json!({
            "title": title(),
            "subject": subject(),
            "category": category(),
            "fileURL": file_url(),
        });
        if let Value::Object(fields) = &mut payload {
            if category() == "sujet_bac" {
                fields.insert("year".into(), Value::from(year()));
                fields.insert("series".into(), Value::from(series()));
            } else {
                fields.insert("type".into(), Value::from(doc_type()));
            }
        }

        let found = super::check(SubmissionKind::Document, &payload);
        let valid = found.is_empty();
        errors.set(found);
        failure.set(None);
        if !valid {
            return;
        }

        let connection = match &connection {
            Ok(connection) => connection.clone(),
            Err(e) => {
                failure.set(Some(e.to_string()));
                return;
            }
        };
        uploading.set(true);
        spawn(async move {
            match pipeline::submit_checked(connection.store(), SubmissionKind::Document, &payload).await {
                Ok(id) => {
                    crate::log_info!("library document {} uploaded", id);
                    uploaded.set(true);
                }
                Err(SubmitError::Invalid(err)) => errors.set(FieldErrors::from(&err)),
                Err(SubmitError::Backend(err)) => {
                    crate::log_error!("library upload failed: {}", err);
                    failure.set(Some(err.to_string()));
                }
            }
            uploading.set(false);
        });
    };

    rsx! {
        form { class: "space-y-4", onsubmit: on_submit,
            TextField {
                label: "Titre",
                value: title(),
                placeholder: "Ex : Cours d'électricité générale",
                error: errors.read().get("title"),
                oninput: move |e: FormEvent| title.set(e.value()),
            }
            TextField {
                label: "Matière",
                value: subject(),
                placeholder: "Ex : Électrotechnique",
                error: errors.read().get("subject"),
                oninput: move |e: FormEvent| subject.set(e.value()),
            }
            SelectField {
                label: "Catégorie",
                value: category(),
                options: options(&[("sujet_bac", "Sujet de Bac"), ("autre_document", "Autre document")]),
                error: errors.read().get("category"),
                onchange: move |e: FormEvent| category.set(e.value()),
            }
            if is_exam {
                div { class: "grid gap-4 md:grid-cols-2",
                    TextField {
                        label: "Année",
                        value: year(),
                        input_type: "number",
                        placeholder: "Ex : 2023",
                        error: errors.read().get("year"),
                        oninput: move |e: FormEvent| year.set(e.value()),
                    }
                    TextField {
                        label: "Série",
                        value: series(),
                        placeholder: "Ex : F3",
                        error: errors.read().get("series"),
                        oninput: move |e: FormEvent| series.set(e.value()),
                    }
                }
            } else {
                SelectField {
                    label: "Type",
                    value: doc_type(),
                    options: options(&[("cours", "Cours"), ("td", "TD"), ("exercice", "Exercice")]),
                    error: errors.read().get("type"),
                    onchange: move |e: FormEvent| doc_type.set(e.value()),
                }
            }
            TextField {
                label: "Lien du fichier",
                value: file_url(),
                input_type: "url",
                placeholder: "https://...",
                error: errors.read().get("fileURL"),
                oninput: move |e: FormEvent| file_url.set(e.value()),
            }
            if let Some(message) = failure() {
                ErrorNotice { title: "Échec du téléversement", message }
            }
            Button {
                r#type: "submit",
                class: "w-full",
                disabled: uploading(),
                if uploading() { "Téléversement..." } else { "Téléverser" }
            }
        }
    }
}
