use crate::components::{Button, ButtonVariant, FaIcon, Modal, StatusIcon};
use dioxus::prelude::*;
use shelf_core::BookRecord;

/// Read-only details of one book with edit and delete actions
#[component]
pub fn ViewBookModal(
    is_open: ReadSignal<bool>,
    book: Option<BookRecord>,
    on_close: EventHandler<()>,
    on_edit: EventHandler<()>,
    on_delete: EventHandler<()>,
) -> Element {
    let Some(book) = book else {
        return rsx! {};
    };
    let fields = &book.fields;
    let status = book.status.unwrap_or_default();

    let series = match (&fields.series, fields.volume) {
        (Some(series), Some(volume)) => Some(format!("{series} #{volume}")),
        (Some(series), None) => Some(series.clone()),
        (None, _) => None,
    };
    let author = format!("{} {}", fields.author_first, fields.author_last);
    let details: Vec<(&'static str, Option<String>)> = vec![
        ("Author", Some(author.trim().to_string())),
        ("Series", series),
        ("Year", fields.year.map(|y| y.to_string())),
        ("Language", fields.language.clone()),
        ("Genre", fields.genre.clone()),
        ("Written form", fields.written_form.clone()),
        ("Publisher", fields.publisher.clone()),
        ("Collection", fields.collection.clone()),
        ("ISBN", fields.isbn.clone()),
    ];

    rsx! {
        Modal {
            is_open,
            title: fields.title.clone(),
            on_close,
            dl { class: "book-details",
                for (label, value) in details {
                    if let Some(value) = value {
                        dt { "{label}" }
                        dd { "{value}" }
                    }
                }
                dt { "Status" }
                dd {
                    StatusIcon { status }
                    " {status.label()}"
                }
            }
            div { class: "modal-actions",
                Button {
                    variant: ButtonVariant::Danger,
                    onclick: move |_| on_delete.call(()),
                    FaIcon { name: "fa-trash" }
                    "Delete"
                }
                Button {
                    variant: ButtonVariant::Primary,
                    onclick: move |_| on_edit.call(()),
                    FaIcon { name: "fa-pen" }
                    "Edit"
                }
            }
        }
    }
}
