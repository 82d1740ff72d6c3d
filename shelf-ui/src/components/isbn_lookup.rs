use crate::components::{Button, ButtonVariant, Modal, TextInput};
use dioxus::prelude::*;

/// Type an ISBN to prefill the add form
#[component]
pub fn IsbnLookupModal(
    is_open: ReadSignal<bool>,
    value: String,
    on_input: EventHandler<String>,
    on_submit: EventHandler<()>,
    on_close: EventHandler<()>,
) -> Element {
    rsx! {
        Modal {
            is_open,
            title: "Add by ISBN".to_string(),
            on_close,
            form {
                class: "isbn-form",
                onsubmit: move |evt| {
                    evt.prevent_default();
                    on_submit.call(());
                },
                TextInput {
                    id: "isbn-lookup".to_string(),
                    label: "ISBN".to_string(),
                    value,
                    placeholder: Some("978…"),
                    inputmode: Some("numeric"),
                    autofocus: true,
                    on_input,
                }
                div { class: "modal-actions",
                    Button {
                        variant: ButtonVariant::Secondary,
                        onclick: move |_| on_close.call(()),
                        "Cancel"
                    }
                    Button {
                        variant: ButtonVariant::Primary,
                        r#type: Some("submit"),
                        onclick: move |_| {},
                        "Search"
                    }
                }
            }
        }
    }
}
