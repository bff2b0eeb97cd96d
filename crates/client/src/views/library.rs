use dioxus::prelude::*;
use ltdk_shared::{Direction, QueryDescriptor, DOCUMENTS};

use crate::backend::use_collection;
use crate::components::forms::UploadForm;
use crate::components::ui::{Card, CardBody, CardHeader, ErrorNotice, SelectField, Spinner, TextField};
use crate::content::{
    document_types, exam_series, exam_subjects, exam_years, other_documents, DocSearch, ExamSearch,
    LibraryDocument, ALL,
};

pub fn library_documents() -> QueryDescriptor {
    QueryDescriptor::new(DOCUMENTS).order_by("createdAt", Direction::Desc)
}

#[derive(Clone, Copy, PartialEq)]
enum Tab {
    Exams,
    Documents,
}

fn with_all(values: impl IntoIterator<Item = String>, all_label: &str) -> Vec<(String, String)> {
    std::iter::once((ALL.to_string(), all_label.to_string()))
        .chain(values.into_iter().map(|v| (v.clone(), v)))
        .collect()
}

#[component]
pub fn Library() -> Element {
    let documents = use_collection(|| Some(library_documents()));
    let mut tab = use_signal(|| Tab::Exams);

    let state = documents.read();
    let docs: Vec<LibraryDocument> = state.records().iter().map(LibraryDocument::from_record).collect();
    let loading = state.loading && state.data.is_none();

    let tab_class = move |which: Tab| {
        if tab() == which {
            "border-b-2 border-emerald-800 px-4 py-2 font-semibold text-emerald-900"
        } else {
            "px-4 py-2 text-gray-500 hover:text-emerald-800"
        }
    };

    rsx! {
        section { class: "bg-emerald-900 text-white",
            div { class: "mx-auto max-w-6xl px-4 py-14 text-center",
                h1 { class: "text-3xl font-bold md:text-4xl", "Bibliothèque Numérique" }
                p { class: "mt-3 text-emerald-100",
                    "Sujets d'examens, cours et exercices mis à disposition par la communauté du LTDK."
                }
            }
        }

        div { class: "mx-auto grid max-w-6xl gap-8 px-4 py-12 lg:grid-cols-3",
            div { class: "lg:col-span-2",
                div { class: "mb-6 flex gap-2 border-b border-gray-200",
                    button { class: tab_class(Tab::Exams), onclick: move |_| tab.set(Tab::Exams),
                        "Banque des Sujets de Bac"
                    }
                    button { class: tab_class(Tab::Documents), onclick: move |_| tab.set(Tab::Documents),
                        "Documents (Cours, TD, Exercices)"
                    }
                }
                if let Some(error) = &state.error {
                    ErrorNotice {
                        title: "Impossible de charger la bibliothèque",
                        message: error.to_string(),
                    }
                }
                if loading {
                    Spinner { label: "Chargement des documents..." }
                } else if tab() == Tab::Exams {
                    ExamBank { docs: docs.clone() }
                } else {
                    DocumentShelf { docs: docs.clone() }
                }
            }
            aside {
                Card {
                    CardHeader {
                        title: "Proposer du Contenu",
                        subtitle: "Enseignants ou anciens, contribuez à la bibliothèque.",
                    }
                    CardBody { UploadForm {} }
                }
            }
        }
    }
}

#[component]
fn ExamBank(docs: Vec<LibraryDocument>) -> Element {
    let mut search = use_signal(ExamSearch::default);
    let results = exam_subjects(&docs, &search.read());
    let years = with_all(exam_years(&docs).into_iter().map(|y| y.to_string()), "Toutes les années");
    let series = with_all(exam_series(&docs), "Toutes les séries");

    rsx! {
        div { class: "mb-6 grid gap-4 md:grid-cols-3",
            TextField {
                label: "Mot-clé",
                value: search.read().keyword.clone(),
                placeholder: "Matière, titre...",
                oninput: move |e: FormEvent| search.write().keyword = e.value(),
            }
            SelectField {
                label: "Année",
                value: search.read().year.clone(),
                options: years,
                onchange: move |e: FormEvent| search.write().year = e.value(),
            }
            SelectField {
                label: "Série",
                value: search.read().series.clone(),
                options: series,
                onchange: move |e: FormEvent| search.write().series = e.value(),
            }
        }
        if results.is_empty() {
            p { class: "py-10 text-center text-gray-500", "Aucun sujet de bac trouvé pour les filtres sélectionnés." }
        } else {
            div { class: "overflow-x-auto rounded-lg border border-gray-200 bg-white",
                table { class: "min-w-full divide-y divide-gray-200 text-sm",
                    thead { class: "bg-gray-50 text-left text-xs uppercase text-gray-500",
                        tr {
                            th { class: "px-4 py-3", "Année" }
                            th { class: "px-4 py-3", "Série" }
                            th { class: "px-4 py-3", "Matière" }
                            th { class: "px-4 py-3" }
                        }
                    }
                    tbody { class: "divide-y divide-gray-100",
                        for doc in results {
                            tr { key: "{doc.id}",
                                td { class: "px-4 py-3", {doc.year.map(|y| y.to_string()).unwrap_or_default()} }
                                td { class: "px-4 py-3", {doc.series.clone().unwrap_or_default()} }
                                td { class: "px-4 py-3",
                                    p { class: "font-medium text-emerald-950", "{doc.subject}" }
                                    p { class: "text-xs text-gray-500", "{doc.title}" }
                                }
                                td { class: "px-4 py-3 text-right",
                                    a {
                                        class: "text-emerald-800 underline",
                                        href: "{doc.file_url}",
                                        target: "_blank",
                                        rel: "noopener noreferrer",
                                        "Télécharger"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn DocumentShelf(docs: Vec<LibraryDocument>) -> Element {
    let mut search = use_signal(DocSearch::default);
    let results = other_documents(&docs, &search.read());
    let types = with_all(document_types(&docs), "Tous les types");

    rsx! {
        div { class: "mb-6 grid gap-4 md:grid-cols-2",
            TextField {
                label: "Mot-clé",
                value: search.read().keyword.clone(),
                placeholder: "Matière, titre...",
                oninput: move |e: FormEvent| search.write().keyword = e.value(),
            }
            SelectField {
                label: "Type",
                value: search.read().doc_type.clone(),
                options: types,
                onchange: move |e: FormEvent| search.write().doc_type = e.value(),
            }
        }
        if results.is_empty() {
            p { class: "py-10 text-center text-gray-500", "Aucun document trouvé pour les filtres sélectionnés." }
        } else {
            div { class: "grid gap-4 md:grid-cols-2",
                for doc in results {
                    Card { key: "{doc.id}", class: "p-5",
                        if let Some(kind) = &doc.doc_type {
                            span { class: "rounded-full bg-emerald-100 px-2 py-0.5 text-xs font-semibold uppercase text-emerald-800",
                                "{kind}"
                            }
                        }
                        h3 { class: "mt-2 font-semibold text-emerald-950", "{doc.title}" }
                        p { class: "text-sm text-gray-500", "{doc.subject}" }
                        a {
                            class: "mt-3 inline-block text-sm text-emerald-800 underline",
                            href: "{doc.file_url}",
                            target: "_blank",
                            rel: "noopener noreferrer",
                            "Ouvrir le document"
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_options_start_with_all() {
        let options = with_all(vec!["F3".to_string(), "G2".to_string()], "Toutes les séries");
        assert_eq!(options[0], (ALL.to_string(), "Toutes les séries".to_string()));
        assert_eq!(options[2], ("G2".to_string(), "G2".to_string()));
    }

    #[test]
    fn library_lists_newest_documents_first() {
        let query = library_documents();
        assert_eq!(query.collection, "documents");
        assert_eq!(query.order_by[0].direction, Direction::Desc);
    }
}
