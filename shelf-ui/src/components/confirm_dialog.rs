use crate::components::{Button, ButtonVariant, Modal};
use dioxus::prelude::*;

/// Asks before a destructive action
#[component]
pub fn ConfirmDialogView(
    is_open: ReadSignal<bool>,
    title: String,
    message: String,
    #[props(default = "Delete".to_string())] confirm_label: String,
    #[props(default = "Cancel".to_string())] cancel_label: String,
    on_confirm: EventHandler<()>,
    on_cancel: EventHandler<()>,
) -> Element {
    rsx! {
        Modal {
            is_open,
            title,
            class: Some("modal-confirm".to_string()),
            on_close: move |_| on_cancel.call(()),
            p { class: "confirm-message", "{message}" }
            div { class: "modal-actions",
                Button {
                    variant: ButtonVariant::Secondary,
                    onclick: move |_| on_cancel.call(()),
                    "{cancel_label}"
                }
                Button {
                    variant: ButtonVariant::Danger,
                    onclick: move |_| on_confirm.call(()),
                    "{confirm_label}"
                }
            }
        }
    }
}
