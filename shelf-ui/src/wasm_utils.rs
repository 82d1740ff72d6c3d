//! Browser interop helpers
//!
//! A JavaScript listener backed by a Rust `Closure` must keep the closure
//! alive while attached. [`DocumentEventListener`] owns both and detaches the
//! listener on drop, so storing it in a `Signal<Option<_>>` and setting that
//! to `None` removes the listener.

use wasm_bindgen::prelude::*;

/// A document-level event listener that detaches itself when dropped
pub struct DocumentEventListener {
    document: web_sys::Document,
    event_name: &'static str,
    callback: Closure<dyn FnMut(JsValue)>,
}

impl DocumentEventListener {
    pub fn new(
        document: web_sys::Document,
        event_name: &'static str,
        callback: impl FnMut(JsValue) + 'static,
    ) -> Self {
        let callback: Closure<dyn FnMut(JsValue)> = Closure::wrap(Box::new(callback));

        if document
            .add_event_listener_with_callback(event_name, callback.as_ref().unchecked_ref())
            .is_err()
        {
            tracing::warn!("Could not attach document {} listener", event_name);
        }

        Self {
            document,
            event_name,
            callback,
        }
    }
}

impl Drop for DocumentEventListener {
    fn drop(&mut self) {
        let _ = self.document.remove_event_listener_with_callback(
            self.event_name,
            self.callback.as_ref().unchecked_ref(),
        );
    }
}

/// Whether `event` happened inside the element with id `element_id`
pub fn event_within(event: &JsValue, element_id: &str) -> bool {
    let target = event
        .dyn_ref::<web_sys::Event>()
        .and_then(|e| e.target())
        .and_then(|t| t.dyn_into::<web_sys::Node>().ok());
    let container = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(element_id));

    match (container, target) {
        (Some(container), Some(target)) => container.contains(Some(&target)),
        _ => false,
    }
}
