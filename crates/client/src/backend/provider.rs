//! Makes the backend connection available to the component tree.

use dioxus::prelude::*;
use ltdk_shared::{ConfigError, Connection, ContextError};

/// Context value carrying the shared connection.
#[derive(Clone, Debug)]
pub struct BackendHandle(pub Connection);

impl PartialEq for BackendHandle {
    fn eq(&self, other: &Self) -> bool {
        self.0.same_app(&other.0)
    }
}

/// Initializes the backend connection once, then provides it to `children`.
///
/// Children are not rendered until the connection exists. A configuration
/// error replaces the whole subtree with a "service unavailable" notice.
#[component]
pub fn BackendProvider(children: Element) -> Element {
    let mut init = use_signal(|| None::<Result<BackendHandle, ConfigError>>);

    use_effect(move || {
        if init.peek().is_none() {
            let result = super::initialize().map(BackendHandle);
            if let Err(e) = &result {
                crate::log_error!("backend initialization failed: {}", e);
            }
            init.set(Some(result));
        }
    });

    let current = init.read().clone();
    match current {
        None => rsx! {
            div { class: "flex h-screen w-full items-center justify-center",
                div { class: "flex flex-col items-center gap-4",
                    div { class: "h-10 w-10 animate-spin rounded-full border-4 border-emerald-700 border-t-transparent" }
                    p { class: "text-gray-500", "Initialisation de la connexion..." }
                }
            }
        },
        Some(Err(error)) => rsx! {
            div { class: "flex h-screen w-full items-center justify-center p-8",
                div { class: "max-w-md text-center",
                    h1 { class: "text-2xl font-bold text-red-700", "Service indisponible" }
                    p { class: "mt-4 text-gray-600",
                        "Le site ne peut pas se connecter à sa base de données pour le moment."
                    }
                    p { class: "mt-2 text-xs text-gray-400", "{error}" }
                }
            }
        },
        Some(Ok(handle)) => rsx! {
            ConnectionScope { handle, {children} }
        },
    }
}

#[component]
fn ConnectionScope(handle: BackendHandle, children: Element) -> Element {
    use_context_provider(|| handle.clone());
    children
}

/// The connection provided by the nearest [`BackendProvider`].
pub fn use_connection() -> Result<Connection, ContextError> {
    use_hook(|| try_consume_context::<BackendHandle>())
        .map(|handle| handle.0)
        .ok_or(ContextError::NotProvided)
}
