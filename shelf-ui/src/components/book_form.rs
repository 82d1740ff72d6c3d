//! Add/edit form
//!
//! One input per [`FormField`], in form order. Field errors from local
//! validation and from the server are shown under their input.

use crate::components::{Button, ButtonVariant, Modal, TextInput};
use dioxus::prelude::*;
use shelf_core::controller::FormState;
use shelf_core::{FormField, FormMode};

#[component]
pub fn BookFormModal(
    is_open: ReadSignal<bool>,
    form: FormState,
    on_field: EventHandler<(FormField, String)>,
    on_submit: EventHandler<()>,
    on_close: EventHandler<()>,
) -> Element {
    let (title, submit_label) = match form.mode {
        FormMode::Add => ("Add a book", "Add"),
        FormMode::Edit => ("Edit book", "Save"),
    };
    let submitting = form.submitting;

    rsx! {
        Modal {
            is_open,
            title: title.to_string(),
            class: Some("modal-form".to_string()),
            on_close,
            form {
                class: "book-form",
                novalidate: true,
                onsubmit: move |evt| {
                    evt.prevent_default();
                    on_submit.call(());
                },
                div { class: "form-grid",
                    for (index, field) in FormField::ALL.into_iter().enumerate() {
                        TextInput {
                            key: "{field.name()}",
                            id: format!("book-{}", field.name()),
                            label: field.label().to_string(),
                            value: form.fields.get(field).to_string(),
                            required: field.is_required(),
                            errors: form.field_errors(field).to_vec(),
                            inputmode: input_mode(field),
                            autofocus: index == 0,
                            on_input: move |value: String| on_field.call((field, value)),
                        }
                    }
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
                        loading: submitting,
                        onclick: move |_| {},
                        "{submit_label}"
                    }
                }
            }
        }
    }
}

fn input_mode(field: FormField) -> Option<&'static str> {
    match field {
        FormField::Volume | FormField::Year => Some("numeric"),
        _ => None,
    }
}
