use dioxus::prelude::*;

const INPUT: &str = "w-full rounded-md border border-gray-300 bg-white px-3 py-2 text-sm text-gray-900 placeholder-gray-400 transition-colors focus:outline-none focus:ring-2 focus:ring-emerald-600/40 focus:border-emerald-700";
const INPUT_INVALID: &str = "border-red-500 focus:ring-red-500/40 focus:border-red-600";

fn input_class(error: &Option<String>) -> String {
    match error {
        Some(_) => format!("{} {}", INPUT, INPUT_INVALID),
        None => INPUT.to_string(),
    }
}

#[component]
fn FieldFrame(label: String, error: Option<String>, children: Element) -> Element {
    rsx! {
        label { class: "block space-y-1",
            span { class: "text-sm font-medium text-gray-700", "{label}" }
            {children}
            if let Some(message) = error {
                span { class: "block text-xs text-red-600", "{message}" }
            }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct TextFieldProps {
    pub label: String,
    pub value: String,
    pub oninput: EventHandler<FormEvent>,
    #[props(optional)]
    pub placeholder: Option<String>,
    /// HTML input type, `text` when unset.
    #[props(optional)]
    pub input_type: Option<String>,
    #[props(optional)]
    pub error: Option<String>,
}

#[component]
pub fn TextField(props: TextFieldProps) -> Element {
    let class = input_class(&props.error);
    rsx! {
        FieldFrame { label: props.label, error: props.error,
            input {
                class,
                r#type: props.input_type.unwrap_or_else(|| "text".to_string()),
                value: "{props.value}",
                placeholder: props.placeholder.unwrap_or_default(),
                oninput: move |e| props.oninput.call(e),
            }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct TextAreaFieldProps {
    pub label: String,
    pub value: String,
    pub oninput: EventHandler<FormEvent>,
    #[props(optional)]
    pub placeholder: Option<String>,
    #[props(optional)]
    pub error: Option<String>,
}

#[component]
pub fn TextAreaField(props: TextAreaFieldProps) -> Element {
    let class = format!("{} min-h-[100px] resize-y", input_class(&props.error));
    rsx! {
        FieldFrame { label: props.label, error: props.error,
            textarea {
                class,
                value: "{props.value}",
                placeholder: props.placeholder.unwrap_or_default(),
                oninput: move |e| props.oninput.call(e),
            }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct SelectFieldProps {
    pub label: String,
    pub value: String,
    /// `(value, label)` pairs in display order.
    pub options: Vec<(String, String)>,
    pub onchange: EventHandler<FormEvent>,
    #[props(optional)]
    pub error: Option<String>,
}

#[component]
pub fn SelectField(props: SelectFieldProps) -> Element {
    let class = input_class(&props.error);
    rsx! {
        FieldFrame { label: props.label, error: props.error,
            select {
                class,
                value: "{props.value}",
                onchange: move |e| props.onchange.call(e),
                for (value, label) in props.options.iter() {
                    option {
                        key: "{value}",
                        value: "{value}",
                        selected: *value == props.value,
                        "{label}"
                    }
                }
            }
        }
    }
}
