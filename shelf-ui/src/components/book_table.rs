//! The book table
//!
//! Rows arrive already ordered; this only renders them. A row click opens
//! the book, the status button cycles the reading status without opening it.

use crate::components::StatusIcon;
use dioxus::prelude::*;
use shelf_core::{BookId, Row};

#[component]
pub fn BookTable(
    rows: Vec<Row>,
    on_row_click: EventHandler<BookId>,
    on_status_click: EventHandler<BookId>,
) -> Element {
    if rows.is_empty() {
        return rsx! {
            p { class: "book-table-empty", "No books in the library yet." }
        };
    }

    rsx! {
        table { class: "book-table",
            thead {
                tr {
                    th { "Author" }
                    th { "Title" }
                    th { "Series" }
                    th { "Year" }
                    th { class: "book-status-column", "Status" }
                }
            }
            tbody {
                for row in rows {
                    BookRow {
                        key: "{row.id()}",
                        row,
                        on_row_click,
                        on_status_click,
                    }
                }
            }
        }
    }
}

#[component]
fn BookRow(
    row: Row,
    on_row_click: EventHandler<BookId>,
    on_status_click: EventHandler<BookId>,
) -> Element {
    let id = row.id().clone();
    let id_attr = id.to_string();
    let status_id = id.clone();
    let status = row.status();

    rsx! {
        tr {
            class: "book-row",
            "data-book-id": "{id_attr}",
            onclick: move |_| on_row_click.call(id.clone()),
            td { "{row.author_display()}" }
            td { "{row.title()}" }
            td { "{row.series_display()}" }
            td { "{row.year_display()}" }
            td { class: "book-status-column",
                button {
                    class: "status-toggle",
                    r#type: "button",
                    title: status.label(),
                    "data-current-status": status.as_str(),
                    onclick: move |evt| {
                        evt.stop_propagation();
                        on_status_click.call(status_id.clone());
                    },
                    StatusIcon { status }
                }
            }
        }
    }
}
