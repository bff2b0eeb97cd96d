use dioxus::prelude::*;
use ltdk_shared::DocumentRef;

use crate::backend::use_doc;
use crate::components::ui::{Card, Spinner};
use crate::content::ContactInfo;

pub fn contact_doc() -> DocumentRef {
    DocumentRef::new("contactInfo", "main")
}

#[component]
pub fn Contact() -> Element {
    let contact = use_doc(|| Some(contact_doc()));
    let state = contact.read();
    let info = ContactInfo::from_record(state.data.as_ref());
    let loading = state.loading && state.data.is_none();

    rsx! {
        section { class: "bg-emerald-900 text-white",
            div { class: "mx-auto max-w-6xl px-4 py-14 text-center",
                h1 { class: "text-3xl font-bold md:text-4xl", "Contactez-nous" }
                p { class: "mt-3 text-emerald-100", "Notre administration est à votre écoute." }
            }
        }

        div { class: "mx-auto grid max-w-6xl gap-8 px-4 py-12 md:grid-cols-2",
            Card { class: "p-8",
                h2 { class: "mb-6 text-2xl font-bold text-emerald-900", "Nos Coordonnées" }
                if loading {
                    Spinner {}
                } else {
                    dl { class: "space-y-5",
                        div {
                            dt { class: "text-sm font-semibold text-gray-500", "Adresse" }
                            dd { class: "text-gray-900", "{info.address}" }
                        }
                        div {
                            dt { class: "text-sm font-semibold text-gray-500", "Téléphone" }
                            dd { a { class: "text-emerald-800 hover:underline", href: "tel:{info.phone}", "{info.phone}" } }
                        }
                        div {
                            dt { class: "text-sm font-semibold text-gray-500", "Email" }
                            dd { a { class: "text-emerald-800 hover:underline", href: "mailto:{info.email}", "{info.email}" } }
                        }
                    }
                }
            }
            Card { class: "min-h-[320px] overflow-hidden",
                if let Some(src) = &info.maps_embed_url {
                    iframe {
                        class: "h-full min-h-[320px] w-full border-0",
                        src: "{src}",
                        title: "Carte Google Maps",
                    }
                } else {
                    div { class: "flex h-full min-h-[320px] items-center justify-center bg-gray-100 text-gray-500",
                        "Carte Google Maps"
                    }
                }
            }
        }
    }
}
