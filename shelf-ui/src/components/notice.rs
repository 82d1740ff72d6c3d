//! Dismissible banner for [`Notice`]s

use crate::components::ChromelessButton;
use dioxus::prelude::*;
use shelf_core::{Notice, NoticeLevel};

#[component]
pub fn NoticeBanner(notice: Notice, on_dismiss: EventHandler<()>) -> Element {
    let (class, icon) = match notice.level {
        NoticeLevel::Info => ("notice notice-info", "fa-solid fa-circle-check"),
        NoticeLevel::Warning => ("notice notice-warning", "fa-solid fa-triangle-exclamation"),
        NoticeLevel::Error => ("notice notice-error", "fa-solid fa-circle-exclamation"),
    };

    rsx! {
        div { class, role: "status",
            i { class: icon }
            span { class: "notice-text", "{notice.text}" }
            ChromelessButton {
                class: Some("notice-dismiss".to_string()),
                aria_label: Some("Dismiss".to_string()),
                onclick: move |_| on_dismiss.call(()),
                i { class: "fa-solid fa-xmark" }
            }
        }
    }
}
