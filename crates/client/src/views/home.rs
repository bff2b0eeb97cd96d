use dioxus::prelude::*;
use ltdk_shared::{Direction, DocumentRef, QueryDescriptor};

use crate::backend::{use_collection, use_doc};
use crate::components::ui::{Card, Spinner};
use crate::content::{default_news, format_day, posts_or, Official};
use crate::Route;

/// Latest three general news items, newest first.
pub fn latest_news() -> QueryDescriptor {
    QueryDescriptor::new("posts")
        .where_eq("association", "")
        .order_by("createdAt", Direction::Desc)
        .limit(3)
}

pub fn headmaster_doc() -> DocumentRef {
    DocumentRef::new("schoolOfficials", "headmaster")
}

const QUICK_LINKS: [(&str, &str, &str); 5] = [
    ("Le Lycée", "Découvrez notre histoire et nos valeurs.", "/school"),
    ("Filières", "Explorez nos programmes de formation.", "/courses"),
    ("Anciens", "Rejoignez le réseau des anciens élèves.", "/alumni"),
    ("Bibliothèque", "Accédez aux ressources pédagogiques.", "/library"),
    ("Contact", "Prenez contact avec notre administration.", "/contact"),
];

#[component]
pub fn Home() -> Element {
    let headmaster = use_doc(|| Some(headmaster_doc()));
    let news = use_collection(|| Some(latest_news()));

    let official = Official::headmaster(headmaster.read().data.as_ref());
    let initials = official.initials();
    let news_state = news.read();
    let posts = posts_or(news_state.records(), default_news);
    let loading_news = news_state.loading && news_state.data.is_none();

    rsx! {
        section { class: "relative bg-emerald-900 text-white",
            div { class: "mx-auto max-w-6xl px-4 py-24 text-center",
                h1 { class: "text-4xl font-extrabold md:text-5xl", "Lycée Technique Dan Kassawa de Maradi" }
                p { class: "mt-4 text-xl text-amber-300", "Ensemble bâtissons le Niger" }
                Link {
                    to: Route::Courses {},
                    class: "mt-8 inline-block rounded-md bg-amber-500 px-6 py-3 font-semibold text-emerald-950 hover:bg-amber-400",
                    "Découvrir les filières"
                }
            }
        }

        section { class: "mx-auto max-w-6xl px-4 py-16",
            h2 { class: "mb-8 text-center text-3xl font-bold text-emerald-900", "Message de bienvenue du Proviseur" }
            Card { class: "flex flex-col items-center gap-6 p-8 md:flex-row",
                if let Some(photo) = &official.photo_url {
                    img { class: "h-32 w-32 rounded-full object-cover", src: "{photo}", alt: "{official.name}" }
                } else {
                    div { class: "flex h-32 w-32 flex-shrink-0 items-center justify-center rounded-full bg-emerald-800 text-3xl font-bold text-white",
                        "{initials}"
                    }
                }
                div {
                    p { class: "italic text-gray-700", "{official.message}" }
                    p { class: "mt-4 font-semibold text-emerald-900", "{official.name}" }
                    p { class: "text-sm text-gray-500", "{official.role}" }
                }
            }
        }

        section { class: "bg-white py-16",
            div { class: "mx-auto max-w-6xl px-4",
                h2 { class: "mb-8 text-center text-3xl font-bold text-emerald-900", "Accès Rapide" }
                div { class: "grid gap-6 sm:grid-cols-2 lg:grid-cols-5",
                    for (title, blurb, href) in QUICK_LINKS {
                        Link { key: "{title}", to: href,
                            Card { class: "h-full p-6 transition-shadow hover:shadow-md",
                                h3 { class: "text-lg font-semibold text-emerald-900", "{title}" }
                                p { class: "mt-2 text-sm text-gray-600", "{blurb}" }
                            }
                        }
                    }
                }
            }
        }

        section { class: "mx-auto max-w-6xl px-4 py-16",
            h2 { class: "mb-8 text-center text-3xl font-bold text-emerald-900", "Actualités Récentes" }
            if loading_news {
                Spinner {}
            } else {
                div { class: "grid gap-6 md:grid-cols-3",
                    for post in posts {
                        Card { key: "{post.id}", class: "overflow-hidden",
                            if let Some(image) = &post.image_url {
                                img { class: "h-44 w-full object-cover", src: "{image}", alt: "{post.title}" }
                            } else {
                                div { class: "h-44 w-full bg-gradient-to-br from-emerald-800 to-emerald-600" }
                            }
                            div { class: "p-5",
                                if let Some(day) = post.created_at.map(format_day) {
                                    p { class: "text-xs font-medium uppercase text-amber-600", "{day}" }
                                }
                                h3 { class: "mt-1 font-semibold text-emerald-950", "{post.title}" }
                                p { class: "mt-2 text-sm text-gray-600", "{post.content}" }
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

    fn post(id: &str, association: &str, seconds: i64) -> (String, Fields) {
        let fields = json!({
            "title": id,
            "association": association,
            "createdAt": { "seconds": seconds, "nanoseconds": 0 },
        });
        (id.to_string(), fields.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn latest_news_keeps_three_general_posts_newest_first() {
        let records = [
            post("a", "", 10),
            post("b", "amicale", 50),
            post("c", "", 30),
            post("d", "", 20),
            post("e", "", 40),
        ];
        let ids: Vec<_> = latest_news()
            .evaluate(records.iter().map(|(id, fields)| (id, fields)))
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["e", "c", "d"]);
    }
}
