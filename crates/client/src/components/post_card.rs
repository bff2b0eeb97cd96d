use dioxus::prelude::*;

use crate::content::{time_ago, Post};

#[component]
pub fn PostCard(post: Post) -> Element {
    let when = post
        .created_at
        .map(|ts| time_ago(ts, chrono::Utc::now()))
        .unwrap_or_default();
    let author = post.author_name.clone().unwrap_or_else(|| "LTDK".to_string());
    let initial = author.chars().next().unwrap_or('?').to_uppercase().to_string();
    let badge = post.association.to_uppercase();

    rsx! {
        article { class: "overflow-hidden rounded-lg border border-gray-200 bg-white shadow-sm",
            if let Some(image) = &post.image_url {
                img { class: "h-48 w-full object-cover", src: "{image}", alt: "{post.title}" }
            }
            div { class: "p-5",
                div { class: "flex items-center gap-3",
                    if let Some(photo) = &post.author_photo_url {
                        img { class: "h-9 w-9 rounded-full object-cover", src: "{photo}", alt: "{author}" }
                    } else {
                        div { class: "flex h-9 w-9 items-center justify-center rounded-full bg-emerald-800 text-sm font-bold text-white",
                            "{initial}"
                        }
                    }
                    div { class: "min-w-0 flex-1",
                        h3 { class: "truncate font-semibold text-emerald-950", "{post.title}" }
                        p { class: "text-xs text-gray-500", "Par {author} • {when}" }
                    }
                    if !badge.is_empty() {
                        span { class: "rounded-full bg-amber-100 px-2 py-0.5 text-xs font-semibold text-amber-800",
                            "{badge}"
                        }
                    }
                }
                p { class: "mt-4 whitespace-pre-line text-sm text-gray-700", "{post.content}" }
            }
        }
    }
}
