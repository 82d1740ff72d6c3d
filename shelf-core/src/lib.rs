//! shelf-core - Book catalog client logic
//!
//! Records, the catalog API client, table ordering, form validation, the
//! barcode scanner session and the page controller. Nothing here touches
//! the DOM, so it builds and tests natively as well as for the browser.

pub mod api;
pub mod config;
pub mod controller;
pub mod form;
pub mod model;
pub mod scanner;
pub mod table;

pub use api::{ApiError, BookApi, HttpBookApi, Mutation};
pub use config::{ClientConfig, ConfigError, ScannerConfig};
pub use controller::{drive, Effect, FormMode, Modal, Msg, Notice, NoticeLevel, UiState};
pub use form::{BookForm, FieldErrors, FormField};
pub use model::{BookFields, BookId, BookRecord, ReadingStatus, SnapshotError};
pub use scanner::{run_scanner, Decoder, ScannerCommand, ScannerController, ScannerError};
pub use table::{Row, TableSynchronizer};
