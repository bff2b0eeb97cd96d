use dioxus::prelude::*;

#[component]
pub fn Spinner(#[props(optional)] label: Option<String>) -> Element {
    rsx! {
        div { class: "flex flex-col items-center justify-center gap-3 py-10 text-gray-500",
            div { class: "h-8 w-8 animate-spin rounded-full border-4 border-emerald-800 border-t-transparent" }
            if let Some(label) = label {
                p { class: "text-sm", "{label}" }
            }
        }
    }
}

/// Inline error banner for a failed load or submission.
#[component]
pub fn ErrorNotice(title: String, message: String) -> Element {
    rsx! {
        div { class: "rounded-md border border-red-200 bg-red-50 px-4 py-3 text-sm text-red-800",
            p { class: "font-semibold", "{title}" }
            p { "{message}" }
        }
    }
}
