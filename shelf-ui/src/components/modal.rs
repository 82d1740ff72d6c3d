//! Modal built on the native `<dialog>` element
//!
//! `showModal()` gives top-layer rendering, a focus trap and Escape to close.
//! `showModal()` throws when the dialog is already open, so the `open`
//! attribute is checked first.

use std::sync::atomic::{AtomicU64, Ordering};

use dioxus::prelude::*;
use wasm_bindgen::JsCast;

static MODAL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Call a no-argument method of the dialog element by name
fn call_dialog_method(element: &web_sys::Element, method: &str) {
    if let Ok(value) = js_sys::Reflect::get(element, &method.into()) {
        if let Some(func) = value.dyn_ref::<js_sys::Function>() {
            let _ = func.call0(element);
        }
    }
}

#[component]
pub fn Modal(
    is_open: ReadSignal<bool>,
    /// Escape key, backdrop click or the close button
    on_close: EventHandler<()>,
    title: String,
    children: Element,
    #[props(default)] class: Option<String>,
) -> Element {
    let dialog_id = use_hook(|| {
        let id = MODAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        format!("modal-{id}")
    });
    let dialog_id_for_effect = dialog_id.clone();

    use_effect(move || {
        let is_open = is_open();

        let Some(element) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(&dialog_id_for_effect))
        else {
            return;
        };

        match (is_open, element.has_attribute("open")) {
            (true, false) => call_dialog_method(&element, "showModal"),
            (false, true) => call_dialog_method(&element, "close"),
            _ => {}
        }
    });

    let dialog_class = class.unwrap_or_default();

    rsx! {
        dialog {
            id: "{dialog_id}",
            class: "modal {dialog_class}",
            oncancel: move |evt| {
                evt.prevent_default();
                on_close.call(());
            },
            if is_open() {
                div {
                    class: "modal-backdrop",
                    onclick: move |_| on_close.call(()),
                    div {
                        class: "modal-content",
                        onclick: move |evt| evt.stop_propagation(),
                        header { class: "modal-header",
                            h2 { "{title}" }
                            button {
                                class: "modal-close",
                                r#type: "button",
                                aria_label: "Close",
                                onclick: move |_| on_close.call(()),
                                i { class: "fa-solid fa-xmark" }
                            }
                        }
                        {children}
                    }
                }
            }
        }
    }
}
