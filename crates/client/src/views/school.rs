use dioxus::prelude::*;
use ltdk_shared::{Direction, QueryDescriptor};

use crate::backend::use_collection;
use crate::components::ui::{Card, Spinner};
use crate::content::{administration_or_defaults, infrastructure_or_defaults, school_history, stats_or_defaults};

pub fn administration() -> QueryDescriptor {
    QueryDescriptor::new("schoolOfficials")
        .where_eq("type", "administration")
        .order_by("order", Direction::Asc)
}

/// One section of the school page content. History has no ordering.
pub fn page_section(section: &str) -> QueryDescriptor {
    let query = QueryDescriptor::new("schoolPageContent").where_eq("section", section);
    if section == "history" {
        query
    } else {
        query.order_by("order", Direction::Asc)
    }
}

#[component]
pub fn School() -> Element {
    let admin = use_collection(|| Some(administration()));
    let stats = use_collection(|| Some(page_section("statistics")));
    let history = use_collection(|| Some(page_section("history")));
    let infra = use_collection(|| Some(page_section("infrastructure")));

    let admin_state = admin.read();
    let stats_state = stats.read();
    let history_state = history.read();
    let infra_state = infra.read();

    let staff = administration_or_defaults(admin_state.records());
    let figures = stats_or_defaults(stats_state.records());
    let story = school_history(history_state.records());
    let facilities = infrastructure_or_defaults(infra_state.records());

    let loading_admin = admin_state.loading && admin_state.data.is_none();
    let loading_stats = stats_state.loading && stats_state.data.is_none();
    let loading_history = history_state.loading && history_state.data.is_none();
    let loading_infra = infra_state.loading && infra_state.data.is_none();

    rsx! {
        div { class: "bg-gray-100",
            div { class: "mx-auto max-w-6xl px-4 py-16",
                div { class: "mx-auto max-w-3xl text-center",
                    h1 { class: "text-4xl font-bold text-emerald-900", "Le Lycée Technique Dan Kassawa" }
                    p { class: "mt-4 text-lg text-gray-600",
                        "Un pôle d'excellence pour la formation technique et professionnelle au Niger depuis 1967."
                    }
                }

                section { class: "mt-16",
                    Card { class: "p-8 text-center",
                        h2 { class: "text-2xl font-bold text-emerald-900", "Notre Histoire" }
                        if loading_history {
                            Spinner {}
                        } else {
                            p { class: "mx-auto mt-4 max-w-3xl text-gray-600", "{story}" }
                        }
                    }
                }

                section { class: "mt-20",
                    h2 { class: "mb-10 text-center text-3xl font-bold text-emerald-900", "Nos Infrastructures" }
                    if loading_infra {
                        Spinner {}
                    } else {
                        div { class: "grid gap-8 md:grid-cols-2",
                            for facility in facilities {
                                div { key: "{facility.id}", class: "relative aspect-video w-full overflow-hidden rounded-lg bg-emerald-800",
                                    if let Some(image) = &facility.image_url {
                                        img { class: "h-full w-full object-cover", src: "{image}", alt: "{facility.title}" }
                                    }
                                    div { class: "absolute bottom-0 left-0 rounded-tr-lg bg-emerald-900/80 p-4 text-white",
                                        "{facility.title}"
                                    }
                                }
                            }
                        }
                    }
                }

                section { class: "mt-20 text-center",
                    h2 { class: "mb-10 text-3xl font-bold text-emerald-900", "Le Lycée en Chiffres" }
                    if loading_stats {
                        Spinner {}
                    } else {
                        div { class: "grid gap-8 md:grid-cols-3",
                            for stat in figures {
                                Card { key: "{stat.id}", class: "p-8",
                                    p { class: "text-4xl font-bold text-emerald-900", "{stat.value}" }
                                    p { class: "mt-2 text-gray-600", "{stat.label}" }
                                }
                            }
                        }
                    }
                }

                section { class: "mt-20 text-center",
                    h2 { class: "mb-10 text-3xl font-bold text-emerald-900", "Administration" }
                    if loading_admin {
                        Spinner {}
                    } else {
                        div { class: "grid gap-8 sm:grid-cols-2 lg:grid-cols-4",
                            for person in staff {
                                Card { key: "{person.id}", class: "p-6",
                                    h3 { class: "font-semibold text-emerald-950", "{person.name}" }
                                    p { class: "mt-1 font-semibold text-amber-600", "{person.role}" }
                                }
                            }
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
    use ltdk_shared::Fields;
    use serde_json::json;

    fn row(id: &str, value: serde_json::Value) -> (String, Fields) {
        (id.to_string(), value.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn administration_lists_only_administration_staff_in_order() {
        let rows = [
            row("censeur", json!({ "type": "administration", "order": 2 })),
            row("headmaster", json!({ "name": "M. Noungo Oumarou" })),
            row("proviseur", json!({ "type": "administration", "order": 1 })),
        ];
        let ids: Vec<_> = administration()
            .evaluate(rows.iter().map(|(id, fields)| (id, fields)))
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["proviseur", "censeur"]);
    }

    #[test]
    fn history_section_is_unordered() {
        assert!(page_section("history").order_by.is_empty());
        assert_eq!(page_section("statistics").order_by.len(), 1);
    }
}
