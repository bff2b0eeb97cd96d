use dioxus::prelude::*;
use ltdk_shared::{Direction, QueryDescriptor};

use crate::backend::use_collection;
use crate::components::forms::{MembershipForm, MenteeForm, MentorForm};
use crate::components::ui::{Button, ButtonVariant, Card, CardBody, CardHeader, ErrorNotice, Spinner};
use crate::components::PostCard;
use crate::content::{alumni_or_examples, example_amicale_post, posts_or, Alumnus};

pub fn amicale_posts() -> QueryDescriptor {
    QueryDescriptor::new("posts")
        .where_eq("association", "amicale")
        .order_by("createdAt", Direction::Desc)
}

pub fn portraits() -> QueryDescriptor {
    QueryDescriptor::new("alumniPortraits").order_by("order", Direction::Asc)
}

const OBJECTIVES: [(&str, &str); 4] = [
    (
        "Réseau et Solidarité",
        "Créer un réseau solide entre les anciens élèves pour l'entraide et le partage d'opportunités.",
    ),
    (
        "Rayonnement du Lycée",
        "Contribuer au prestige et à la visibilité du LTDK au niveau national et international.",
    ),
    (
        "Soutien aux Élèves",
        "Accompagner les élèves actuels à travers le mentorat, les bourses et l'orientation.",
    ),
    (
        "Promotion de l'Excellence",
        "Encourager la réussite et l'innovation au sein de la communauté du LTDK.",
    ),
];

#[derive(Clone, Copy, PartialEq)]
enum MentorshipPanel {
    Closed,
    Mentor,
    Mentee,
}

#[component]
pub fn Alumni() -> Element {
    rsx! {
        section { class: "bg-emerald-900 text-white",
            div { class: "mx-auto max-w-6xl px-4 py-16 text-center",
                h1 { class: "text-3xl font-bold md:text-4xl", "Amicale des Anciens Élèves du LTDK (AELTDK)" }
                p { class: "mt-4 text-lg text-emerald-100",
                    "Ensemble, pour le rayonnement du LTDK et la réussite de ses élèves."
                }
            }
        }

        section { class: "mx-auto max-w-6xl px-4 py-12",
            h2 { class: "mb-6 text-2xl font-bold text-emerald-900", "Nos Objectifs" }
            div { class: "grid gap-6 sm:grid-cols-2 lg:grid-cols-4",
                for (title, text) in OBJECTIVES {
                    Card { key: "{title}", class: "p-6",
                        h3 { class: "font-semibold text-emerald-900", "{title}" }
                        p { class: "mt-2 text-sm text-gray-600", "{text}" }
                    }
                }
            }
        }

        AmicaleFeed {}
        PortraitGallery {}
        Mentorship {}

        section { class: "mx-auto max-w-3xl px-4 py-12",
            Card {
                CardHeader {
                    title: "Rejoindre l'Amicale",
                    subtitle: "Remplissez ce formulaire pour devenir membre de l'AELTDK.",
                }
                CardBody { MembershipForm {} }
            }
        }
    }
}

#[component]
fn AmicaleFeed() -> Element {
    let feed = use_collection(|| Some(amicale_posts()));
    let state = feed.read();
    let posts = posts_or(state.records(), || vec![example_amicale_post()]);

    rsx! {
        section { class: "bg-white py-12",
            div { class: "mx-auto max-w-4xl px-4",
                h2 { class: "mb-6 text-2xl font-bold text-emerald-900", "Activités de l'Amicale" }
                if let Some(error) = &state.error {
                    ErrorNotice {
                        title: "Impossible de charger les activités",
                        message: error.to_string(),
                    }
                }
                if state.loading && state.data.is_none() {
                    Spinner { label: "Chargement des activités..." }
                } else {
                    div { class: "space-y-6",
                        for post in posts {
                            PostCard { key: "{post.id}", post: post.clone() }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn PortraitGallery() -> Element {
    let gallery = use_collection(|| Some(portraits()));
    let alumni = alumni_or_examples(gallery.read().records());

    rsx! {
        section { class: "mx-auto max-w-6xl px-4 py-12",
            h2 { class: "mb-6 text-2xl font-bold text-emerald-900", "Portraits d'Anciens" }
            div { class: "grid gap-6 md:grid-cols-3",
                for alumnus in alumni {
                    PortraitCard { key: "{alumnus.id}", alumnus: alumnus.clone() }
                }
            }
        }
    }
}

#[component]
fn PortraitCard(alumnus: Alumnus) -> Element {
    let initial = alumnus.name.chars().next().unwrap_or('?').to_string();
    rsx! {
        Card { class: "p-6 text-center",
            if let Some(photo) = &alumnus.photo_url {
                img { class: "mx-auto h-24 w-24 rounded-full object-cover", src: "{photo}", alt: "{alumnus.name}" }
            } else {
                div { class: "mx-auto flex h-24 w-24 items-center justify-center rounded-full bg-emerald-100 text-2xl font-bold text-emerald-800",
                    "{initial}"
                }
            }
            h3 { class: "mt-4 font-semibold text-emerald-950", "{alumnus.name}" }
            p { class: "text-sm text-amber-700", "{alumnus.promotion}" }
            p { class: "mt-3 text-sm italic text-gray-600", "\"{alumnus.testimonial}\"" }
        }
    }
}

fn toggle_variant(selected: bool) -> ButtonVariant {
    if selected {
        ButtonVariant::Primary
    } else {
        ButtonVariant::Outline
    }
}

#[component]
fn Mentorship() -> Element {
    let mut panel = use_signal(|| MentorshipPanel::Closed);

    rsx! {
        section { class: "bg-emerald-50 py-12",
            div { class: "mx-auto max-w-3xl px-4 text-center",
                h2 { class: "text-2xl font-bold text-emerald-900", "Programme de Mentorat" }
                p { class: "mt-3 text-gray-700",
                    "Partagez votre expérience avec les élèves et jeunes diplômés, ou trouvez un ancien pour vous guider."
                }
                div { class: "mt-6 flex flex-wrap justify-center gap-4",
                    Button {
                        variant: toggle_variant(panel() == MentorshipPanel::Mentor),
                        onclick: move |_| panel.set(MentorshipPanel::Mentor),
                        "Devenir Mentor"
                    }
                    Button {
                        variant: toggle_variant(panel() == MentorshipPanel::Mentee),
                        onclick: move |_| panel.set(MentorshipPanel::Mentee),
                        "Trouver un Mentor"
                    }
                }
            }
            div { class: "mx-auto mt-8 max-w-2xl px-4",
                {match panel() {
                    MentorshipPanel::Closed => rsx! {},
                    MentorshipPanel::Mentor => rsx! {
                        Card {
                            CardHeader { title: "Devenir Mentor" }
                            CardBody { MentorForm { on_done: move |_| panel.set(MentorshipPanel::Closed) } }
                        }
                    },
                    MentorshipPanel::Mentee => rsx! {
                        Card {
                            CardHeader { title: "Trouver un Mentor" }
                            CardBody { MenteeForm { on_done: move |_| panel.set(MentorshipPanel::Closed) } }
                        }
                    },
                }}
            }
        }
    }
}
