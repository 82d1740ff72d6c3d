//! Page state and the single handler that mutates it
//!
//! [`UiState::update`] is synchronous: it applies one [`Msg`] and returns at
//! most one [`Effect`]. API effects are executed by [`drive`], whose reply is
//! fed back as the next message, so no borrow of the state is ever held
//! while a request is in flight.

use crate::api::{ApiError, BookApi, Mutation, LOCAL_VALIDATION_MESSAGE};
use crate::form::{BookForm, FieldErrors, FormField};
use crate::model::{BookFields, BookId, BookRecord, ReadingStatus};
use crate::scanner::{ScannerCommand, ScannerError};
use crate::table::TableSynchronizer;
use tracing::{debug, info, warn};

/// The dialogs of the library page. At most one is open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modal {
    ViewBook,
    BookForm,
    IsbnLookup,
    Scanner,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Add,
    Edit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message for the user, shown until dismissed or replaced
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// The add/edit form
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormState {
    pub mode: FormMode,
    /// Set in edit mode
    pub book_id: Option<BookId>,
    pub fields: BookForm,
    pub errors: FieldErrors,
    /// A create or update is in flight
    pub submitting: bool,
}

impl FormState {
    fn add(fields: BookForm) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    pub fn field_errors(&self, field: FormField) -> &[String] {
        self.errors
            .get(field.name())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Msg {
    RowClicked(BookId),
    StatusClicked(BookId),
    AddMenuToggled,
    AddMenuDismissed,
    ManualAddChosen,
    IsbnAddChosen,
    ScanAddChosen,
    EditClicked,
    DeleteClicked,
    DeleteConfirmed,
    DeleteCancelled,
    FormFieldChanged(FormField, String),
    FormSubmitted,
    IsbnInputChanged(String),
    IsbnSubmitted,
    ModalClosed,
    NoticeDismissed,
    ReloadRequested,

    BookLoaded(Result<BookRecord, ApiError>),
    BookSaved {
        mode: FormMode,
        result: Result<Mutation, ApiError>,
    },
    BookDeleted {
        id: BookId,
        result: Result<(), ApiError>,
    },
    StatusSaved {
        id: BookId,
        status: ReadingStatus,
        result: Result<(), ApiError>,
    },
    IsbnResolved(Result<BookFields, ApiError>),
    BookScanned(BookFields),
    ScanMissed {
        code: String,
        error: ApiError,
    },
    ScannerFailed(ScannerError),
    LibraryLoaded(Result<Vec<BookRecord>, ApiError>),
}

/// An API call requested by [`UiState::update`]
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    List,
    Fetch(BookId),
    Create(BookForm),
    Update(BookId, BookForm),
    SetStatus(BookId, ReadingStatus),
    Delete(BookId),
    LookupIsbn(String),
}

impl Request {
    /// Perform the call and wrap its outcome in the reply message
    pub async fn execute<A: BookApi + ?Sized>(self, api: &A) -> Msg {
        match self {
            Request::List => Msg::LibraryLoaded(api.list().await),
            Request::Fetch(id) => Msg::BookLoaded(api.read(&id).await),
            Request::Create(form) => Msg::BookSaved {
                mode: FormMode::Add,
                result: api.create(&form).await,
            },
            Request::Update(id, form) => Msg::BookSaved {
                mode: FormMode::Edit,
                result: api.update(&id, &form).await,
            },
            Request::SetStatus(id, status) => {
                let result = api.update_status(&id, status).await;
                Msg::StatusSaved { id, status, result }
            }
            Request::Delete(id) => {
                let result = api.delete(&id).await;
                Msg::BookDeleted { id, result }
            }
            Request::LookupIsbn(isbn) => Msg::IsbnResolved(api.read_by_isbn(&isbn).await),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Api(Request),
    Scanner(ScannerCommand),
}

/// Everything the library page shows, besides the DOM itself
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UiState {
    pub table: TableSynchronizer,
    pub modal: Option<Modal>,
    pub add_menu_open: bool,
    /// Record shown in the view modal
    pub viewing: Option<BookRecord>,
    pub form: FormState,
    pub isbn_input: String,
    /// Book awaiting delete confirmation
    pub pending_delete: Option<BookId>,
    pub notice: Option<Notice>,
}

impl UiState {
    pub fn new(snapshot: Vec<BookRecord>) -> Self {
        Self {
            table: TableSynchronizer::from_snapshot(snapshot),
            ..Default::default()
        }
    }

    pub fn is_open(&self, modal: Modal) -> bool {
        self.modal == Some(modal)
    }

    pub fn update(&mut self, msg: Msg) -> Option<Effect> {
        match msg {
            Msg::RowClicked(id) => Some(Effect::Api(Request::Fetch(id))),
            Msg::BookLoaded(Ok(record)) => {
                self.viewing = Some(record);
                self.pending_delete = None;
                self.modal = Some(Modal::ViewBook);
                None
            }
            Msg::BookLoaded(Err(e)) => {
                self.fail(format!("Could not load the book: {}", e.message()));
                None
            }

            Msg::StatusClicked(id) => {
                let status = self.table.get(&id)?.status().next();
                Some(Effect::Api(Request::SetStatus(id, status)))
            }
            Msg::StatusSaved {
                id,
                status,
                result: Ok(()),
            } => {
                if !self.table.apply_status_toggle(&id, status) {
                    debug!("Status saved for book {} which is no longer listed", id);
                }
                if let Some(viewing) = self.viewing.as_mut().filter(|r| r.id == id) {
                    viewing.status = Some(status);
                }
                None
            }
            Msg::StatusSaved { result: Err(e), .. } => {
                self.fail(format!("Could not change the status: {}", e.message()));
                None
            }

            Msg::AddMenuToggled => {
                self.add_menu_open = !self.add_menu_open;
                None
            }
            Msg::AddMenuDismissed => {
                self.add_menu_open = false;
                None
            }
            Msg::ManualAddChosen => {
                self.add_menu_open = false;
                self.form = FormState::default();
                self.modal = Some(Modal::BookForm);
                None
            }
            Msg::IsbnAddChosen => {
                self.add_menu_open = false;
                self.isbn_input.clear();
                self.modal = Some(Modal::IsbnLookup);
                None
            }
            Msg::ScanAddChosen => {
                self.add_menu_open = false;
                self.modal = Some(Modal::Scanner);
                Some(Effect::Scanner(ScannerCommand::Open))
            }

            Msg::EditClicked => {
                let record = self.viewing.as_ref()?;
                self.form = FormState {
                    mode: FormMode::Edit,
                    book_id: Some(record.id.clone()),
                    fields: BookForm::from(&record.fields),
                    ..Default::default()
                };
                self.pending_delete = None;
                self.modal = Some(Modal::BookForm);
                None
            }

            Msg::DeleteClicked => {
                self.pending_delete = self.viewing.as_ref().map(|r| r.id.clone());
                None
            }
            Msg::DeleteConfirmed => {
                let id = self.pending_delete.take()?;
                Some(Effect::Api(Request::Delete(id)))
            }
            Msg::DeleteCancelled => {
                self.pending_delete = None;
                None
            }
            Msg::BookDeleted { id, result: Ok(()) } => {
                self.table.apply_delete(&id);
                if self.viewing.as_ref().is_some_and(|r| r.id == id) {
                    self.viewing = None;
                    if self.is_open(Modal::ViewBook) {
                        self.modal = None;
                    }
                }
                info!("Deleted book {}", id);
                self.notice = Some(Notice::info("Book deleted."));
                None
            }
            Msg::BookDeleted { result: Err(e), .. } => {
                self.fail(format!("Could not delete the book: {}", e.message()));
                None
            }

            Msg::FormFieldChanged(field, value) => {
                self.form.fields.set(field, value);
                self.form.errors.remove(field.name());
                None
            }
            Msg::FormSubmitted => self.submit_form(),
            Msg::BookSaved { mode, result } => {
                self.book_saved(mode, result);
                None
            }

            Msg::IsbnInputChanged(value) => {
                self.isbn_input = value;
                None
            }
            Msg::IsbnSubmitted => {
                let isbn = self.isbn_input.trim();
                if isbn.is_empty() {
                    self.notice = Some(Notice::warning("Enter an ISBN to look up."));
                    return None;
                }
                Some(Effect::Api(Request::LookupIsbn(isbn.to_string())))
            }
            Msg::IsbnResolved(Ok(fields)) => {
                self.open_prefilled_form(&fields);
                None
            }
            Msg::IsbnResolved(Err(e)) => {
                self.fail(format!("No book found: {}", e.message()));
                None
            }

            Msg::BookScanned(fields) => {
                if !self.is_open(Modal::Scanner) {
                    debug!("Ignoring scan result, scanner is closed");
                    return None;
                }
                self.open_prefilled_form(&fields);
                Some(Effect::Scanner(ScannerCommand::Close))
            }
            Msg::ScanMissed { code, error } => {
                if self.is_open(Modal::Scanner) {
                    self.notice = Some(Notice::warning(format!(
                        "No book found for {code}: {}",
                        error.message()
                    )));
                }
                None
            }
            Msg::ScannerFailed(e) => {
                warn!("Scanner failed: {}", e);
                self.notice = Some(Notice::error(e.notice()));
                None
            }

            Msg::ModalClosed => {
                let closed = self.modal.take();
                self.pending_delete = None;
                match closed {
                    Some(Modal::Scanner) => Some(Effect::Scanner(ScannerCommand::Close)),
                    _ => None,
                }
            }
            Msg::NoticeDismissed => {
                self.notice = None;
                None
            }

            Msg::ReloadRequested => Some(Effect::Api(Request::List)),
            Msg::LibraryLoaded(Ok(books)) => {
                self.table.replace_all(books);
                None
            }
            Msg::LibraryLoaded(Err(e)) => {
                self.fail(format!("Could not reload the library: {}", e.message()));
                None
            }
        }
    }

    fn submit_form(&mut self) -> Option<Effect> {
        if self.form.submitting {
            return None;
        }

        let fields = self.form.fields.normalized();
        self.form.fields = fields.clone();
        if let Err(errors) = fields.validate() {
            self.form.errors = errors;
            self.notice = Some(Notice::warning(LOCAL_VALIDATION_MESSAGE));
            return None;
        }
        self.form.errors.clear();

        let request = match (self.form.mode, self.form.book_id.clone()) {
            (FormMode::Add, _) => Request::Create(fields),
            (FormMode::Edit, Some(id)) => Request::Update(id, fields),
            (FormMode::Edit, None) => {
                warn!("Edit form has no book id");
                self.fail("This book can no longer be edited.".to_string());
                return None;
            }
        };
        self.form.submitting = true;
        Some(Effect::Api(request))
    }

    fn book_saved(&mut self, mode: FormMode, result: Result<Mutation, ApiError>) {
        self.form.submitting = false;
        match result {
            Ok(Mutation {
                book,
                message: Some(message),
            }) => {
                info!("Saved book {} ({:?})", book.id, mode);
                if self.is_open(Modal::BookForm) {
                    self.modal = None;
                }
                self.table.apply_insert_or_update(book);
                self.notice = Some(Notice::info(message));
            }
            Ok(Mutation { message: None, .. }) => {
                warn!("Save in {:?} mode returned no confirmation", mode);
                self.notice = Some(Notice::warning("The book was not saved."));
            }
            Err(ApiError::Validation { message, fields }) => {
                self.form.errors = fields;
                self.notice = Some(Notice::warning(message));
            }
            Err(e) => self.fail(format!("Could not save the book: {}", e.message())),
        }
    }

    fn open_prefilled_form(&mut self, fields: &BookFields) {
        self.form = FormState::add(BookForm::from(fields));
        self.isbn_input.clear();
        self.modal = Some(Modal::BookForm);
    }

    fn fail(&mut self, text: String) {
        warn!("{}", text);
        self.notice = Some(Notice::error(text));
    }
}

/// Run `msg` through `update` until no effect remains.
///
/// `update` is called once per message and must not hold its borrow beyond
/// the call; API requests are awaited in between.
pub async fn drive<A: BookApi + ?Sized>(
    api: &A,
    msg: Msg,
    mut update: impl FnMut(Msg) -> Option<Effect>,
    mut scanner: impl FnMut(ScannerCommand),
) {
    let mut next = Some(msg);
    while let Some(msg) = next.take() {
        match update(msg) {
            Some(Effect::Api(request)) => next = Some(request.execute(api).await),
            Some(Effect::Scanner(command)) => scanner(command),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    /// In-memory catalog answering like the real API
    #[derive(Default)]
    struct FakeCatalog {
        books: RefCell<Vec<BookRecord>>,
        isbns: HashMap<String, BookFields>,
        next_id: Cell<u64>,
        calls: RefCell<Vec<String>>,
        fail_next: RefCell<Option<ApiError>>,
        withhold_confirmation: bool,
    }

    impl FakeCatalog {
        fn with_books(books: Vec<BookRecord>) -> Self {
            Self {
                books: RefCell::new(books),
                next_id: Cell::new(100),
                ..Default::default()
            }
        }

        fn called(&self, name: String) -> Result<(), ApiError> {
            self.calls.borrow_mut().push(name);
            match self.fail_next.borrow_mut().take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        fn record_from(id: &BookId, form: &BookForm) -> BookRecord {
            let mut value = serde_json::to_value(form).unwrap();
            value["id"] = json!(id.as_str());
            serde_json::from_value(value).unwrap()
        }

        fn confirm(&self, text: &str) -> Option<String> {
            (!self.withhold_confirmation).then(|| text.to_string())
        }
    }

    #[async_trait(?Send)]
    impl BookApi for FakeCatalog {
        async fn list(&self) -> Result<Vec<BookRecord>, ApiError> {
            self.called("list".into())?;
            Ok(self.books.borrow().clone())
        }

        async fn create(&self, form: &BookForm) -> Result<Mutation, ApiError> {
            self.called(format!("create {}", form.title))?;
            let id = BookId::from(self.next_id.get());
            self.next_id.set(self.next_id.get() + 1);
            let book = Self::record_from(&id, form);
            self.books.borrow_mut().push(book.clone());
            Ok(Mutation {
                book,
                message: self.confirm("Book added."),
            })
        }

        async fn read(&self, id: &BookId) -> Result<BookRecord, ApiError> {
            self.called(format!("read {id}"))?;
            self.books
                .borrow()
                .iter()
                .find(|b| &b.id == id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound("book not found".into()))
        }

        async fn read_by_isbn(&self, isbn: &str) -> Result<BookFields, ApiError> {
            self.called(format!("isbn {isbn}"))?;
            self.isbns
                .get(isbn)
                .cloned()
                .ok_or_else(|| ApiError::NotFound("isbn not found".into()))
        }

        async fn update(&self, id: &BookId, form: &BookForm) -> Result<Mutation, ApiError> {
            self.called(format!("update {id}"))?;
            let book = Self::record_from(id, form);
            Ok(Mutation {
                book,
                message: self.confirm("Book updated."),
            })
        }

        async fn update_status(&self, id: &BookId, status: ReadingStatus) -> Result<(), ApiError> {
            self.called(format!("status {id} {status}"))
        }

        async fn delete(&self, id: &BookId) -> Result<(), ApiError> {
            self.called(format!("delete {id}"))?;
            self.books.borrow_mut().retain(|b| &b.id != id);
            Ok(())
        }
    }

    fn book(id: &str, last: &str, year: i32, title: &str) -> BookRecord {
        BookRecord::new(
            id,
            BookFields {
                title: title.into(),
                author_last: last.into(),
                year: Some(year),
                ..Default::default()
            },
        )
    }

    fn library() -> Vec<BookRecord> {
        vec![
            book("1", "Asimov", 1951, "Foundation"),
            book("7", "Banks", 1987, "Consider Phlebas").with_status(ReadingStatus::Reading),
            book("9", "Clarke", 1968, "2001"),
        ]
    }

    /// Drive one message, collecting scanner commands
    async fn send(state: &mut UiState, api: &FakeCatalog, msg: Msg) -> Vec<ScannerCommand> {
        let mut commands = Vec::new();
        drive(api, msg, |m| state.update(m), |c| commands.push(c)).await;
        commands
    }

    fn ids(state: &UiState) -> Vec<&str> {
        state.table.rows().iter().map(|r| r.id().as_str()).collect()
    }

    #[tokio::test]
    async fn row_click_opens_the_view_modal() {
        let api = FakeCatalog::with_books(library());
        let mut state = UiState::new(library());

        send(&mut state, &api, Msg::RowClicked(BookId::new("9"))).await;

        assert_eq!(state.modal, Some(Modal::ViewBook));
        assert_eq!(state.viewing.as_ref().unwrap().fields.title, "2001");
    }

    #[tokio::test]
    async fn failed_fetch_opens_nothing() {
        let api = FakeCatalog::with_books(library());
        let mut state = UiState::new(library());

        send(&mut state, &api, Msg::RowClicked(BookId::new("404"))).await;

        assert_eq!(state.modal, None);
        assert_eq!(state.notice.as_ref().unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn status_click_cycles_in_place() {
        let api = FakeCatalog::with_books(library());
        let mut state = UiState::new(library());
        let id = BookId::new("7");

        send(&mut state, &api, Msg::StatusClicked(id.clone())).await;

        assert_eq!(*api.calls.borrow(), vec!["status 7 read".to_string()]);
        let row = state.table.get(&id).unwrap();
        assert_eq!(row.status(), ReadingStatus::Read);
        assert_eq!(row.status().icon_class(), "fa-solid fa-check");
        assert_eq!(state.table.position(&id), Some(1));
    }

    #[tokio::test]
    async fn failed_status_change_keeps_the_old_status() {
        let api = FakeCatalog::with_books(library());
        *api.fail_next.borrow_mut() = Some(ApiError::Server("database is locked".into()));
        let mut state = UiState::new(library());

        send(&mut state, &api, Msg::StatusClicked(BookId::new("1"))).await;

        let row = state.table.get(&BookId::new("1")).unwrap();
        assert_eq!(row.status(), ReadingStatus::NotRead);
        assert!(state.notice.unwrap().text.contains("database is locked"));
    }

    #[tokio::test]
    async fn unknown_isbn_keeps_the_lookup_open() {
        let api = FakeCatalog::with_books(vec![]);
        let mut state = UiState::default();

        send(&mut state, &api, Msg::IsbnAddChosen).await;
        send(&mut state, &api, Msg::IsbnInputChanged(" 9780000000000 ".into())).await;
        send(&mut state, &api, Msg::IsbnSubmitted).await;

        assert_eq!(*api.calls.borrow(), vec!["isbn 9780000000000".to_string()]);
        assert_eq!(state.modal, Some(Modal::IsbnLookup));
        assert!(state.notice.unwrap().text.contains("isbn not found"));
        assert_eq!(state.form, FormState::default());
    }

    #[tokio::test]
    async fn found_isbn_opens_a_prefilled_add_form() {
        let mut api = FakeCatalog::with_books(vec![]);
        api.isbns.insert(
            "9780441013593".into(),
            BookFields {
                title: "Dune".into(),
                author_last: "Herbert".into(),
                year: Some(1965),
                ..Default::default()
            },
        );
        let mut state = UiState::default();
        state.form.mode = FormMode::Edit;
        state.form.fields.title = "left over".into();

        send(&mut state, &api, Msg::IsbnAddChosen).await;
        send(&mut state, &api, Msg::IsbnInputChanged("9780441013593".into())).await;
        send(&mut state, &api, Msg::IsbnSubmitted).await;

        assert_eq!(state.modal, Some(Modal::BookForm));
        assert_eq!(state.form.mode, FormMode::Add);
        assert_eq!(state.form.fields.title, "Dune");
        assert_eq!(state.form.fields.year, "1965");
        assert_eq!(state.isbn_input, "");
    }

    #[tokio::test]
    async fn empty_isbn_is_rejected_without_a_request() {
        let api = FakeCatalog::with_books(vec![]);
        let mut state = UiState::default();

        send(&mut state, &api, Msg::IsbnAddChosen).await;
        send(&mut state, &api, Msg::IsbnInputChanged("   ".into())).await;
        send(&mut state, &api, Msg::IsbnSubmitted).await;

        assert!(api.calls.borrow().is_empty());
        assert_eq!(state.modal, Some(Modal::IsbnLookup));
        assert_eq!(state.notice.unwrap().level, NoticeLevel::Warning);
    }

    async fn fill_and_submit(state: &mut UiState, api: &FakeCatalog, values: &[(FormField, &str)]) {
        for (field, value) in values {
            send(state, api, Msg::FormFieldChanged(*field, value.to_string())).await;
        }
        send(state, api, Msg::FormSubmitted).await;
    }

    #[tokio::test]
    async fn manual_add_inserts_the_new_row_in_order() {
        let api = FakeCatalog::with_books(library());
        let mut state = UiState::new(library());

        send(&mut state, &api, Msg::AddMenuToggled).await;
        assert!(state.add_menu_open);
        send(&mut state, &api, Msg::ManualAddChosen).await;
        assert!(!state.add_menu_open);
        assert_eq!(state.modal, Some(Modal::BookForm));

        fill_and_submit(
            &mut state,
            &api,
            &[
                (FormField::Title, " I, Robot "),
                (FormField::AuthorLast, "asimov"),
                (FormField::Year, "1950"),
            ],
        )
        .await;

        assert_eq!(*api.calls.borrow(), vec!["create I, Robot".to_string()]);
        assert_eq!(state.modal, None);
        assert_eq!(ids(&state), vec!["100", "1", "7", "9"]);
        assert_eq!(state.table.rows()[0].record().fields.author_last, "Asimov");
        assert_eq!(state.notice, Some(Notice::info("Book added.")));
    }

    #[tokio::test]
    async fn save_without_confirmation_leaves_the_form_open() {
        let api = FakeCatalog {
            withhold_confirmation: true,
            ..FakeCatalog::with_books(vec![])
        };
        let mut state = UiState::default();

        send(&mut state, &api, Msg::ManualAddChosen).await;
        fill_and_submit(
            &mut state,
            &api,
            &[(FormField::Title, "Dune"), (FormField::AuthorLast, "Herbert")],
        )
        .await;

        assert_eq!(state.modal, Some(Modal::BookForm));
        assert!(state.table.is_empty());
        assert!(!state.form.submitting);
        assert_eq!(state.notice.unwrap().level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn invalid_form_is_not_sent() {
        let api = FakeCatalog::with_books(vec![]);
        let mut state = UiState::default();

        send(&mut state, &api, Msg::ManualAddChosen).await;
        fill_and_submit(
            &mut state,
            &api,
            &[(FormField::Title, "Dune"), (FormField::Year, "65")],
        )
        .await;

        assert!(api.calls.borrow().is_empty());
        assert_eq!(state.modal, Some(Modal::BookForm));
        assert_eq!(
            state.notice,
            Some(Notice::warning(LOCAL_VALIDATION_MESSAGE))
        );
        assert!(!state.form.field_errors(FormField::AuthorLast).is_empty());
        assert!(!state.form.field_errors(FormField::Year).is_empty());

        send(
            &mut state,
            &api,
            Msg::FormFieldChanged(FormField::Year, "1965".into()),
        )
        .await;
        assert!(state.form.field_errors(FormField::Year).is_empty());
    }

    #[tokio::test]
    async fn server_validation_errors_reach_the_form() {
        let api = FakeCatalog::with_books(vec![]);
        let mut fields = FieldErrors::new();
        fields.insert("isbn".into(), vec!["Already in the library.".into()]);
        *api.fail_next.borrow_mut() = Some(ApiError::Validation {
            message: "Duplicate ISBN".into(),
            fields,
        });
        let mut state = UiState::default();

        send(&mut state, &api, Msg::ManualAddChosen).await;
        fill_and_submit(
            &mut state,
            &api,
            &[
                (FormField::Title, "Dune"),
                (FormField::AuthorLast, "Herbert"),
                (FormField::Isbn, "9780441013593"),
            ],
        )
        .await;

        assert_eq!(state.modal, Some(Modal::BookForm));
        assert_eq!(
            state.form.field_errors(FormField::Isbn),
            ["Already in the library.".to_string()]
        );
        assert_eq!(state.notice.unwrap().text, "Duplicate ISBN");
    }

    #[tokio::test]
    async fn edit_replaces_the_row_and_keeps_its_status() {
        let api = FakeCatalog::with_books(library());
        let mut state = UiState::new(library());
        let id = BookId::new("7");

        send(&mut state, &api, Msg::RowClicked(id.clone())).await;
        send(&mut state, &api, Msg::EditClicked).await;
        assert_eq!(state.form.mode, FormMode::Edit);
        assert_eq!(state.form.book_id, Some(id.clone()));
        assert_eq!(state.form.fields.title, "Consider Phlebas");

        fill_and_submit(&mut state, &api, &[(FormField::AuthorLast, "Zelazny")]).await;

        assert_eq!(*api.calls.borrow().last().unwrap(), "update 7");
        assert_eq!(state.modal, None);
        assert_eq!(ids(&state), vec!["1", "9", "7"]);
        assert_eq!(state.table.get(&id).unwrap().status(), ReadingStatus::Reading);
    }

    #[tokio::test]
    async fn delete_waits_for_confirmation() {
        let api = FakeCatalog::with_books(library());
        let mut state = UiState::new(library());

        send(&mut state, &api, Msg::RowClicked(BookId::new("1"))).await;
        send(&mut state, &api, Msg::DeleteClicked).await;
        assert_eq!(state.pending_delete, Some(BookId::new("1")));
        send(&mut state, &api, Msg::DeleteCancelled).await;
        assert_eq!(state.table.len(), 3);
        assert_eq!(api.calls.borrow().len(), 1);

        send(&mut state, &api, Msg::DeleteClicked).await;
        send(&mut state, &api, Msg::DeleteConfirmed).await;

        assert_eq!(*api.calls.borrow().last().unwrap(), "delete 1");
        assert_eq!(ids(&state), vec!["7", "9"]);
        assert_eq!(state.modal, None);
        assert_eq!(state.viewing, None);
    }

    #[tokio::test]
    async fn failed_delete_leaves_the_modal_open() {
        let api = FakeCatalog::with_books(library());
        let mut state = UiState::new(library());

        send(&mut state, &api, Msg::RowClicked(BookId::new("1"))).await;
        send(&mut state, &api, Msg::DeleteClicked).await;
        *api.fail_next.borrow_mut() = Some(ApiError::Network("offline".into()));
        send(&mut state, &api, Msg::DeleteConfirmed).await;

        assert_eq!(state.modal, Some(Modal::ViewBook));
        assert_eq!(state.table.len(), 3);
        assert_eq!(state.notice.unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn scanner_modal_sends_open_and_close() {
        let api = FakeCatalog::with_books(vec![]);
        let mut state = UiState::default();

        let commands = send(&mut state, &api, Msg::ScanAddChosen).await;
        assert_eq!(commands, vec![ScannerCommand::Open]);
        assert_eq!(state.modal, Some(Modal::Scanner));

        let commands = send(&mut state, &api, Msg::ModalClosed).await;
        assert_eq!(commands, vec![ScannerCommand::Close]);
        assert_eq!(state.modal, None);
    }

    #[tokio::test]
    async fn scanned_book_prefills_the_form_only_while_scanning() {
        let api = FakeCatalog::with_books(vec![]);
        let mut state = UiState::default();
        let dune = BookFields {
            title: "Dune".into(),
            author_last: "Herbert".into(),
            ..Default::default()
        };

        send(&mut state, &api, Msg::BookScanned(dune.clone())).await;
        assert_eq!(state.modal, None);

        send(&mut state, &api, Msg::ScanAddChosen).await;
        send(
            &mut state,
            &api,
            Msg::ScanMissed {
                code: "9780000000000".into(),
                error: ApiError::NotFound("isbn not found".into()),
            },
        )
        .await;
        assert_eq!(state.modal, Some(Modal::Scanner));
        assert!(state.notice.as_ref().unwrap().text.contains("9780000000000"));

        let commands = send(&mut state, &api, Msg::BookScanned(dune)).await;
        assert_eq!(commands, vec![ScannerCommand::Close]);
        assert_eq!(state.modal, Some(Modal::BookForm));
        assert_eq!(state.form.fields.title, "Dune");
    }

    #[tokio::test]
    async fn scanner_failure_becomes_a_notice() {
        let api = FakeCatalog::with_books(vec![]);
        let mut state = UiState::default();

        send(&mut state, &api, Msg::ScanAddChosen).await;
        send(
            &mut state,
            &api,
            Msg::ScannerFailed(ScannerError::PermissionDenied),
        )
        .await;

        let notice = state.notice.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.text.contains("Camera access was denied"));
    }

    #[tokio::test]
    async fn reload_replaces_the_table() {
        let api = FakeCatalog::with_books(vec![book("42", "Adams", 1979, "Hitchhiker")]);
        let mut state = UiState::new(library());

        send(&mut state, &api, Msg::ReloadRequested).await;

        assert_eq!(ids(&state), vec!["42"]);
    }

    #[test]
    fn menu_dismiss_and_notice_dismiss() {
        let mut state = UiState::default();
        state.update(Msg::AddMenuToggled);
        state.update(Msg::AddMenuDismissed);
        assert!(!state.add_menu_open);

        state.notice = Some(Notice::info("hello"));
        assert_eq!(state.update(Msg::NoticeDismissed), None);
        assert_eq!(state.notice, None);
    }

    #[test]
    fn second_submit_while_saving_is_ignored() {
        let mut state = UiState::default();
        state.update(Msg::ManualAddChosen);
        state.update(Msg::FormFieldChanged(FormField::Title, "Dune".into()));
        state.update(Msg::FormFieldChanged(FormField::AuthorLast, "Herbert".into()));

        assert!(matches!(
            state.update(Msg::FormSubmitted),
            Some(Effect::Api(Request::Create(_)))
        ));
        assert_eq!(state.update(Msg::FormSubmitted), None);
    }
}
