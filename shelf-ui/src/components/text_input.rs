//! Labelled text input with inline errors

use dioxus::prelude::*;

#[component]
pub fn TextInput(
    id: String,
    label: String,
    value: String,
    on_input: EventHandler<String>,
    #[props(default)] required: bool,
    #[props(default)] errors: Vec<String>,
    #[props(default)] placeholder: Option<&'static str>,
    #[props(default)] inputmode: Option<&'static str>,
    #[props(default)] autofocus: bool,
) -> Element {
    let invalid = !errors.is_empty();
    let class = if invalid {
        "form-input form-input-invalid"
    } else {
        "form-input"
    };

    rsx! {
        div { class: "form-field",
            label { r#for: "{id}",
                "{label}"
                if required {
                    span { class: "required-mark", " *" }
                }
            }
            input {
                r#type: "text",
                id: "{id}",
                name: "{id}",
                class,
                value: "{value}",
                placeholder,
                inputmode,
                aria_invalid: if invalid { Some("true") } else { None },
                oninput: move |e| on_input.call(e.value()),
                onmounted: move |event| async move {
                    if autofocus {
                        let _ = event.data().set_focus(true).await;
                    }
                },
            }
            for error in errors.iter() {
                p { class: "form-error", "{error}" }
            }
        }
    }
}
