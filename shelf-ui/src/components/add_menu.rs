//! "Add book" button and its drop-down of add methods

use crate::components::FaIcon;
use crate::wasm_utils::{event_within, DocumentEventListener};
use dioxus::prelude::*;

const MENU_ID: &str = "add-book-menu";

#[component]
pub fn AddBookMenu(
    is_open: ReadSignal<bool>,
    on_toggle: EventHandler<()>,
    /// Any click outside the menu while it is open
    on_dismiss: EventHandler<()>,
    on_manual: EventHandler<()>,
    on_isbn: EventHandler<()>,
    on_scan: EventHandler<()>,
) -> Element {
    let mut outside_listener: Signal<Option<DocumentEventListener>> = use_signal(|| None);

    use_effect(move || {
        if !is_open() {
            outside_listener.set(None);
            return;
        }
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let listener = DocumentEventListener::new(document, "click", move |event| {
            if !event_within(&event, MENU_ID) {
                on_dismiss.call(());
            }
        });
        outside_listener.set(Some(listener));
    });

    rsx! {
        div { id: MENU_ID, class: "add-menu",
            button {
                class: "btn btn-primary add-menu-toggle",
                r#type: "button",
                aria_haspopup: "menu",
                aria_expanded: if is_open() { "true" } else { "false" },
                onclick: move |_| on_toggle.call(()),
                FaIcon { name: "fa-plus" }
                "Add book"
            }
            if is_open() {
                ul { class: "add-menu-items", role: "menu",
                    AddMenuItem { icon: "fa-keyboard", label: "Enter manually", on_select: on_manual }
                    AddMenuItem { icon: "fa-hashtag", label: "Look up an ISBN", on_select: on_isbn }
                    AddMenuItem { icon: "fa-barcode", label: "Scan a barcode", on_select: on_scan }
                }
            }
        }
    }
}

#[component]
fn AddMenuItem(icon: &'static str, label: &'static str, on_select: EventHandler<()>) -> Element {
    rsx! {
        li { role: "none",
            button {
                class: "add-menu-item",
                r#type: "button",
                role: "menuitem",
                onclick: move |_| on_select.call(()),
                FaIcon { name: icon }
                "{label}"
            }
        }
    }
}
