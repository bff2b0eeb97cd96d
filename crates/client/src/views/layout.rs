//! Header, footer and navigation shared by every page.

use dioxus::prelude::*;

use crate::Route;

const NAV: [(&str, &str); 7] = [
    ("Accueil", "/"),
    ("Le Lycée", "/school"),
    ("Filières", "/courses"),
    ("Amicale", "/alumni"),
    ("Bibliothèque", "/library"),
    ("Élèves", "/students"),
    ("Contact", "/contact"),
];

fn nav_class(active: bool) -> &'static str {
    if active {
        "text-amber-400"
    } else {
        "hover:text-amber-300"
    }
}

#[component]
pub fn SiteLayout() -> Element {
    let mut menu_open = use_signal(|| false);
    let route = use_route::<Route>();
    let current = route.to_string();

    rsx! {
        div { class: "flex min-h-screen flex-col bg-gray-50 text-gray-900",
            header { class: "sticky top-0 z-40 bg-emerald-900 text-white shadow",
                div { class: "mx-auto flex h-16 max-w-6xl items-center justify-between px-4",
                    Link { to: Route::Home {}, class: "flex items-center gap-2 text-lg font-bold",
                        span { class: "flex h-9 w-9 items-center justify-center rounded-full bg-amber-500 text-sm text-emerald-950", "LT" }
                        "LTDK Maradi"
                    }
                    nav { class: "hidden gap-6 text-sm font-medium md:flex",
                        for (label, href) in NAV {
                            Link {
                                key: "{href}",
                                to: href,
                                class: nav_class(current == href),
                                "{label}"
                            }
                        }
                    }
                    button {
                        class: "md:hidden",
                        onclick: move |_| menu_open.set(!menu_open()),
                        svg {
                            class: "h-6 w-6",
                            fill: "none",
                            stroke: "currentColor",
                            view_box: "0 0 24 24",
                            path {
                                stroke_linecap: "round",
                                stroke_linejoin: "round",
                                stroke_width: "2",
                                d: "M4 6h16M4 12h16M4 18h16",
                            }
                        }
                    }
                }
                if menu_open() {
                    nav { class: "flex flex-col gap-1 border-t border-emerald-800 px-4 py-3 md:hidden",
                        for (label, href) in NAV {
                            Link {
                                key: "{href}",
                                to: href,
                                class: "rounded px-2 py-2 hover:bg-emerald-800",
                                onclick: move |_| menu_open.set(false),
                                "{label}"
                            }
                        }
                    }
                }
            }

            main { class: "flex-1", Outlet::<Route> {} }

            footer { class: "bg-emerald-950 text-emerald-100",
                div { class: "mx-auto grid max-w-6xl gap-8 px-4 py-10 md:grid-cols-3",
                    div {
                        p { class: "text-lg font-bold text-white", "LTDK Maradi" }
                        p { class: "mt-2 text-sm",
                            "Lycée Technique Dan Kassawa de Maradi. Former une élite technique responsable au service du développement du Niger."
                        }
                    }
                    div {
                        p { class: "font-semibold text-white", "Liens utiles" }
                        ul { class: "mt-2 space-y-1 text-sm",
                            for (label, href) in NAV {
                                li { key: "{href}", Link { to: href, class: "hover:text-amber-300", "{label}" } }
                            }
                        }
                    }
                    div {
                        p { class: "font-semibold text-white", "Contact" }
                        p { class: "mt-2 text-sm", "BP 123, Maradi, Niger" }
                        p { class: "text-sm", "contact@ltdk-maradi.ne" }
                    }
                }
                p { class: "border-t border-emerald-900 py-4 text-center text-xs text-emerald-300",
                    "© LTDK Maradi. Tous droits réservés."
                }
            }
        }
    }
}

#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        div { class: "mx-auto max-w-xl px-4 py-24 text-center",
            h1 { class: "text-4xl font-bold text-emerald-900", "Page introuvable" }
            p { class: "mt-4 text-gray-600", "La page /{path} n'existe pas." }
            Link { to: Route::Home {}, class: "mt-6 inline-block text-emerald-800 underline", "Retour à l'accueil" }
        }
    }
}
