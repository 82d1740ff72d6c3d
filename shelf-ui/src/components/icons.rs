//! Font Awesome icons. The stylesheet is loaded by the page.

use dioxus::prelude::*;
use shelf_core::ReadingStatus;

/// Cross, dash or check for not read, reading and read
#[component]
pub fn StatusIcon(status: ReadingStatus) -> Element {
    rsx! {
        i { class: status.icon_class(), aria_label: status.label() }
    }
}

#[component]
pub fn FaIcon(name: &'static str) -> Element {
    rsx! {
        i { class: "fa-solid {name}", aria_hidden: "true" }
    }
}
