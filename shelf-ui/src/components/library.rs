//! Library page view - pure rendering, no data fetching
//!
//! Reads [`UiState`] and reports every interaction as a [`Msg`]; the page
//! that owns the state decides what happens next.

use crate::components::{
    AddBookMenu, BookFormModal, BookTable, ConfirmDialogView, IsbnLookupModal, NoticeBanner,
    ScannerModal, ViewBookModal,
};
use dioxus::prelude::*;
use shelf_core::{BookId, FormField, Modal, Msg, UiState};

#[component]
pub fn LibraryView(
    state: ReadSignal<UiState>,
    /// Element id the scanner renders its camera preview into
    scanner_target: String,
    on_msg: EventHandler<Msg>,
) -> Element {
    let view_open: ReadSignal<bool> =
        use_memo(move || state.read().is_open(Modal::ViewBook)).into();
    let form_open: ReadSignal<bool> =
        use_memo(move || state.read().is_open(Modal::BookForm)).into();
    let isbn_open: ReadSignal<bool> =
        use_memo(move || state.read().is_open(Modal::IsbnLookup)).into();
    let scanner_open: ReadSignal<bool> =
        use_memo(move || state.read().is_open(Modal::Scanner)).into();
    let menu_open: ReadSignal<bool> = use_memo(move || state.read().add_menu_open).into();
    let confirm_open: ReadSignal<bool> =
        use_memo(move || state.read().pending_delete.is_some()).into();

    let current = state.read();
    let rows = current.table.rows().to_vec();
    let viewing = current.viewing.clone();
    let form = current.form.clone();
    let isbn_input = current.isbn_input.clone();
    let notice = current.notice.clone();
    let delete_title = viewing
        .as_ref()
        .map(|b| b.fields.title.clone())
        .unwrap_or_default();
    drop(current);

    rsx! {
        div { class: "library-page",
            header { class: "library-header",
                h1 { "Library" }
                div { class: "library-actions",
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        title: "Reload",
                        onclick: move |_| on_msg.call(Msg::ReloadRequested),
                        i { class: "fa-solid fa-rotate" }
                    }
                    AddBookMenu {
                        is_open: menu_open,
                        on_toggle: move |_| on_msg.call(Msg::AddMenuToggled),
                        on_dismiss: move |_| on_msg.call(Msg::AddMenuDismissed),
                        on_manual: move |_| on_msg.call(Msg::ManualAddChosen),
                        on_isbn: move |_| on_msg.call(Msg::IsbnAddChosen),
                        on_scan: move |_| on_msg.call(Msg::ScanAddChosen),
                    }
                }
            }

            if let Some(notice) = notice {
                NoticeBanner {
                    notice,
                    on_dismiss: move |_| on_msg.call(Msg::NoticeDismissed),
                }
            }

            BookTable {
                rows,
                on_row_click: move |id: BookId| on_msg.call(Msg::RowClicked(id)),
                on_status_click: move |id: BookId| on_msg.call(Msg::StatusClicked(id)),
            }

            ViewBookModal {
                is_open: view_open,
                book: viewing,
                on_close: move |_| on_msg.call(Msg::ModalClosed),
                on_edit: move |_| on_msg.call(Msg::EditClicked),
                on_delete: move |_| on_msg.call(Msg::DeleteClicked),
            }
            ConfirmDialogView {
                is_open: confirm_open,
                title: "Delete this book?".to_string(),
                message: format!("\"{delete_title}\" will be removed from the library."),
                on_confirm: move |_| on_msg.call(Msg::DeleteConfirmed),
                on_cancel: move |_| on_msg.call(Msg::DeleteCancelled),
            }
            BookFormModal {
                is_open: form_open,
                form,
                on_field: move |(field, value): (FormField, String)| {
                    on_msg.call(Msg::FormFieldChanged(field, value))
                },
                on_submit: move |_| on_msg.call(Msg::FormSubmitted),
                on_close: move |_| on_msg.call(Msg::ModalClosed),
            }
            IsbnLookupModal {
                is_open: isbn_open,
                value: isbn_input,
                on_input: move |value: String| on_msg.call(Msg::IsbnInputChanged(value)),
                on_submit: move |_| on_msg.call(Msg::IsbnSubmitted),
                on_close: move |_| on_msg.call(Msg::ModalClosed),
            }
            ScannerModal {
                is_open: scanner_open,
                target_id: scanner_target,
                on_close: move |_| on_msg.call(Msg::ModalClosed),
            }
        }
    }
}
