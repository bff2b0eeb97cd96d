use dioxus::prelude::*;
use ltdk_shared::{Direction, QueryDescriptor};

use crate::backend::use_collection;
use crate::components::ui::{Button, ButtonVariant, Card, CardHeader, ErrorNotice, Spinner};
use crate::components::PostCard;
use crate::content::Post;

/// Every association post, newest first.
pub fn association_feed() -> QueryDescriptor {
    QueryDescriptor::new("posts").order_by("createdAt", Direction::Desc)
}

const ASSOCIATIONS: [(&str, &str); 2] = [
    (
        "Club des Jeunes Musulmans (CJM)",
        "Le CJM organise des activités culturelles, des cours de soutien et des actions sociales pour renforcer la fraternité et les valeurs morales au sein du lycée.",
    ),
    (
        "Association des Jeunes Progressistes (AJP)",
        "L'AJP promeut l'engagement citoyen, l'excellence académique et l'ouverture d'esprit à travers des débats, des conférences et des projets communautaires.",
    ),
];

const OPPORTUNITIES: [(&str, &str, &str); 3] = [
    (
        "Bourse d'Excellence AELTDK",
        "Récompense les meilleurs élèves de chaque filière pour leurs performances académiques.",
        "Ouvert",
    ),
    (
        "Stages de vacances chez Nigelec",
        "Immersion professionnelle pour les élèves en électrotechnique et maintenance.",
        "Fermé",
    ),
    (
        "Concours National d'Innovation",
        "Participez et représentez le LTDK avec vos projets les plus créatifs.",
        "À venir",
    ),
];

fn status_class(status: &str) -> &'static str {
    match status {
        "Ouvert" => "bg-green-100 text-green-800",
        "Fermé" => "bg-red-100 text-red-800",
        _ => "bg-blue-100 text-blue-800",
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Tab {
    Feed,
    Opportunities,
}

fn tab_variant(selected: bool) -> ButtonVariant {
    if selected {
        ButtonVariant::Primary
    } else {
        ButtonVariant::Outline
    }
}

#[component]
pub fn Students() -> Element {
    let mut tab = use_signal(|| Tab::Feed);

    rsx! {
        div { class: "bg-gray-100",
            div { class: "mx-auto max-w-5xl px-4 py-16",
                div { class: "mx-auto max-w-3xl text-center",
                    h1 { class: "text-4xl font-bold text-emerald-900", "Espace Élèves" }
                    p { class: "mt-4 text-lg text-gray-600",
                        "Le cœur de la vie étudiante, des associations et des opportunités au LTDK."
                    }
                }

                section { class: "mt-16",
                    h2 { class: "mb-10 text-center text-3xl font-bold text-emerald-900", "La Vie Associative" }
                    div { class: "grid gap-8 md:grid-cols-2",
                        for (name, text) in ASSOCIATIONS {
                            Card { key: "{name}", class: "p-6 text-center",
                                h3 { class: "text-lg font-semibold text-emerald-900", "{name}" }
                                p { class: "mt-3 text-sm text-gray-600", "{text}" }
                            }
                        }
                    }
                }

                div { class: "mt-16 grid grid-cols-2 gap-2",
                    Button {
                        variant: tab_variant(tab() == Tab::Feed),
                        onclick: move |_| tab.set(Tab::Feed),
                        "Fil d'Actualités Associatif"
                    }
                    Button {
                        variant: tab_variant(tab() == Tab::Opportunities),
                        onclick: move |_| tab.set(Tab::Opportunities),
                        "Opportunités"
                    }
                }
                div { class: "mt-6",
                    {match tab() {
                        Tab::Feed => rsx! { AssociationFeed {} },
                        Tab::Opportunities => rsx! { OpportunityBoard {} },
                    }}
                }
            }
        }
    }
}

#[component]
fn AssociationFeed() -> Element {
    let feed = use_collection(|| Some(association_feed()));
    let state = feed.read();
    let posts: Vec<Post> = state.records().iter().map(Post::from_record).collect();

    rsx! {
        if let Some(error) = &state.error {
            ErrorNotice {
                title: "Impossible de charger les publications",
                message: error.to_string(),
            }
        }
        if state.loading && state.data.is_none() {
            Spinner {}
        } else if posts.is_empty() {
            Card { class: "text-center",
                CardHeader {
                    title: "Aucune publication pour le moment",
                    subtitle: "Revenez bientôt pour voir les actualités des associations !",
                }
            }
        } else {
            div { class: "space-y-6",
                for post in posts {
                    PostCard { key: "{post.id}", post: post.clone() }
                }
            }
        }
    }
}

#[component]
fn OpportunityBoard() -> Element {
    rsx! {
        Card {
            CardHeader {
                title: "Tableau des Opportunités",
                subtitle: "Bourses, stages, concours... Retrouvez ici les opportunités pour enrichir votre parcours.",
            }
            div { class: "space-y-4 px-6 pb-6",
                for (title, description, status, badge) in OPPORTUNITIES.map(|(t, d, s)| (t, d, s, status_class(s))) {
                    div { key: "{title}", class: "flex items-start gap-4 rounded-md border p-4",
                        div { class: "flex-grow",
                            h3 { class: "font-semibold", "{title}" }
                            p { class: "text-sm text-gray-600", "{description}" }
                        }
                        span { class: "rounded-full px-2 py-1 text-xs font-semibold {badge}", "{status}" }
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
    fn feed_has_no_association_filter() {
        let query = association_feed();
        assert!(query.filters.is_empty());
        assert_eq!(query.order_by[0].field, "createdAt");
        assert_eq!(query.order_by[0].direction, Direction::Desc);
    }

    #[test]
    fn statuses_have_distinct_badges() {
        assert_ne!(status_class("Ouvert"), status_class("Fermé"));
        assert_eq!(status_class("À venir"), status_class("Bientôt"));
    }
}
