use crate::components::{Button, ButtonVariant, Modal};
use dioxus::prelude::*;

/// Camera preview for barcode scanning.
///
/// The decoder renders its video into the element with `target_id`, so the
/// element is kept in the DOM for as long as the modal is open.
#[component]
pub fn ScannerModal(is_open: ReadSignal<bool>, target_id: String, on_close: EventHandler<()>) -> Element {
    rsx! {
        Modal {
            is_open,
            title: "Scan a barcode".to_string(),
            class: Some("modal-scanner".to_string()),
            on_close,
            div { id: "{target_id}", class: "scanner-viewport" }
            p { class: "scanner-hint", "Hold the barcode on the back of the book in front of the camera." }
            div { class: "modal-actions",
                Button {
                    variant: ButtonVariant::Secondary,
                    onclick: move |_| on_close.call(()),
                    "Close"
                }
            }
        }
    }
}
