//! LTDK Client - Dioxus web application
//!
//! The public site of the Lycée Technique Dan Kassawa de Maradi: pages backed
//! by live queries against the LTDK server, and the forms that feed it.

pub mod api_client;
pub mod backend;
pub mod components;
pub mod content;
pub mod logging;
pub mod routes;
pub mod views;
pub mod ws;

use dioxus::prelude::*;

pub use api_client::ApiClient;
pub use backend::{BackendProvider, RemoteStore};
pub use routes::Route;

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

#[component]
pub fn App() -> Element {
    rsx! {
        document::Title { "LTDK Maradi" }
        document::Script { src: TAILWIND_CDN }

        BackendProvider {
            Router::<Route> {}
        }
    }
}
