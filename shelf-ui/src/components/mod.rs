//! View components for the library page

pub mod add_menu;
pub mod book_form;
pub mod book_table;
pub mod button;
pub mod confirm_dialog;
pub mod icons;
pub mod isbn_lookup;
pub mod library;
pub mod modal;
pub mod notice;
pub mod scanner;
pub mod text_input;
pub mod view_book;

pub use add_menu::AddBookMenu;
pub use book_form::BookFormModal;
pub use book_table::BookTable;
pub use button::{Button, ButtonVariant, ChromelessButton};
pub use confirm_dialog::ConfirmDialogView;
pub use icons::{FaIcon, StatusIcon};
pub use isbn_lookup::IsbnLookupModal;
pub use library::LibraryView;
pub use modal::Modal;
pub use notice::NoticeBanner;
pub use scanner::ScannerModal;
pub use text_input::TextInput;
pub use view_book::ViewBookModal;
