//! Client for the catalog's JSON REST API
//!
//! Every response is wrapped in an envelope:
//! `{"status": "success" | "fail" | "error", "data": {...}, "message": "..."}`.
//! [`decode_envelope`] turns that into either the success payload or an
//! [`ApiError`]; [`HttpBookApi`] does the HTTP part.

use crate::config::ClientConfig;
use crate::form::{BookForm, FieldErrors};
use crate::model::{BookFields, BookId, BookRecord, ReadingStatus};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Paths of the catalog API, relative to the configured base
pub mod endpoints {
    use crate::model::BookId;

    pub const BOOKS: &str = "/api/books";

    pub fn book(id: &BookId) -> String {
        format!("{BOOKS}/{}", urlencoding::encode(id.as_str()))
    }

    pub fn book_by_isbn(isbn: &str) -> String {
        format!("{BOOKS}/isbn/{}", urlencoding::encode(isbn))
    }

    pub fn book_status(id: &BookId) -> String {
        format!("{}/status", book(id))
    }
}

/// The logical operation a response belongs to.
///
/// Decides how a `fail` envelope without field detail is classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Read,
    ReadByIsbn,
    Update,
    UpdateStatus,
    Delete,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Read => "read",
            Self::ReadByIsbn => "read by ISBN",
            Self::Update => "update",
            Self::UpdateStatus => "update status",
            Self::Delete => "delete",
        }
    }

    fn submits_form(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid book: {message}")]
    Validation { message: String, fields: FieldErrors },
    #[error("server error: {0}")]
    Server(String),
    #[error("network error: {0}")]
    Network(String),
}

impl ApiError {
    /// Text suitable for showing to the user
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(message) | Self::Server(message) | Self::Network(message) => message,
            Self::Validation { message, .. } => message,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { fields, .. } => Some(fields),
            _ => None,
        }
    }
}

/// Message for field errors found before a request is sent
pub const LOCAL_VALIDATION_MESSAGE: &str = "Please correct the highlighted fields.";

impl From<FieldErrors> for ApiError {
    fn from(fields: FieldErrors) -> Self {
        ApiError::Validation {
            message: LOCAL_VALIDATION_MESSAGE.to_string(),
            fields,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

/// `data` of a success envelope
#[derive(Debug, Default, PartialEq)]
pub struct Payload {
    pub book: Option<Value>,
    pub books: Option<Value>,
    pub message: Option<String>,
}

impl Payload {
    fn from_data(data: Option<Value>) -> Self {
        let Some(Value::Object(mut map)) = data else {
            return Self::default();
        };
        let message = match map.remove("message") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
            _ => None,
        };
        Self {
            book: map.remove("book").filter(|v| !v.is_null()),
            books: map.remove("books").filter(|v| !v.is_null()),
            message,
        }
    }

    /// Decode the `book` entry, which the operation requires
    pub fn book<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let value = self
            .book
            .clone()
            .ok_or_else(|| ApiError::Server("response carried no book".to_string()))?;
        serde_json::from_value(value).map_err(|e| ApiError::Server(format!("invalid book: {e}")))
    }

    /// Decode the `books` collection; absent means empty
    pub fn books(&self) -> Result<Vec<BookRecord>, ApiError> {
        match &self.books {
            None => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| ApiError::Server(format!("invalid book list: {e}"))),
        }
    }
}

/// Classify a response body.
///
/// The envelope wins over the HTTP status: a 400 carrying a `fail` envelope
/// is a `fail`, not a server error.
pub fn decode_envelope(op: Operation, http_status: u16, body: &str) -> Result<Payload, ApiError> {
    let envelope: Envelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !(200..300).contains(&http_status) => {
            return Err(ApiError::Server(format!(
                "{} failed with HTTP {http_status}",
                op.name()
            )));
        }
        Err(e) => {
            return Err(ApiError::Server(format!(
                "{} returned an unreadable response: {e}",
                op.name()
            )));
        }
    };

    match envelope.status.as_str() {
        "success" => Ok(Payload::from_data(envelope.data)),
        "fail" => Err(classify_fail(op, envelope)),
        "error" => Err(ApiError::Server(failure_message(op, &envelope))),
        other => Err(ApiError::Server(format!(
            "{} returned unknown status {other:?}",
            op.name()
        ))),
    }
}

fn classify_fail(op: Operation, envelope: Envelope) -> ApiError {
    let message = failure_message(op, &envelope);
    let fields = envelope
        .data
        .as_ref()
        .map(field_errors_of)
        .unwrap_or_default();

    if !fields.is_empty() || op.submits_form() {
        ApiError::Validation { message, fields }
    } else {
        ApiError::NotFound(message)
    }
}

/// `data.error`, then the top-level `message`, then a generic text
fn failure_message(op: Operation, envelope: &Envelope) -> String {
    envelope
        .data
        .as_ref()
        .and_then(|d| d.get("error"))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .or(envelope.message.as_deref().filter(|s| !s.trim().is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} failed", op.name()))
}

/// Field-level detail of a `fail` envelope: either an `errors` map or any
/// keys of `data` other than `error`.
fn field_errors_of(data: &Value) -> FieldErrors {
    let Some(map) = data.as_object() else {
        return FieldErrors::new();
    };
    let source = match map.get("errors").and_then(Value::as_object) {
        Some(errors) => errors,
        None => map,
    };

    let mut fields = FieldErrors::new();
    for (key, value) in source {
        if key == "error" || key == "errors" {
            continue;
        }
        let messages: Vec<String> = match value {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            Value::Null => continue,
            other => vec![other.to_string()],
        };
        fields.insert(key.clone(), messages);
    }
    fields
}

/// Result of a create or update
#[derive(Clone, Debug, PartialEq)]
pub struct Mutation {
    pub book: BookRecord,
    /// Confirmation text; its absence means the change was not applied
    pub message: Option<String>,
}

/// The catalog operations the UI needs
#[async_trait(?Send)]
pub trait BookApi {
    async fn list(&self) -> Result<Vec<BookRecord>, ApiError>;

    async fn create(&self, form: &BookForm) -> Result<Mutation, ApiError>;

    async fn read(&self, id: &BookId) -> Result<BookRecord, ApiError>;

    /// Look a book up by ISBN. The result has no id until it is saved.
    async fn read_by_isbn(&self, isbn: &str) -> Result<BookFields, ApiError>;

    async fn update(&self, id: &BookId, form: &BookForm) -> Result<Mutation, ApiError>;

    async fn update_status(&self, id: &BookId, status: ReadingStatus) -> Result<(), ApiError>;

    async fn delete(&self, id: &BookId) -> Result<(), ApiError>;
}

/// [`BookApi`] over HTTP
#[derive(Clone, Debug)]
pub struct HttpBookApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpBookApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.api_base)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        op: Operation,
        request: reqwest::RequestBuilder,
    ) -> Result<Payload, ApiError> {
        let response = request.send().await.map_err(|e| {
            warn!("{} request did not complete: {}", op.name(), e);
            ApiError::Network(e.to_string())
        })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            warn!("{} response body could not be read: {}", op.name(), e);
            ApiError::Network(e.to_string())
        })?;

        debug!("{} -> HTTP {}", op.name(), status);
        decode_envelope(op, status, &body).inspect_err(|e| warn!("{} failed: {}", op.name(), e))
    }

    async fn submit(
        &self,
        op: Operation,
        request: reqwest::RequestBuilder,
        form: &BookForm,
    ) -> Result<Mutation, ApiError> {
        let body = form
            .to_body()
            .map_err(|e| ApiError::Server(format!("could not encode form: {e}")))?;
        let payload = self
            .send(op, request.header(CONTENT_TYPE, FORM_CONTENT_TYPE).body(body))
            .await?;
        Ok(Mutation {
            book: payload.book()?,
            message: payload.message,
        })
    }
}

#[async_trait(?Send)]
impl BookApi for HttpBookApi {
    async fn list(&self) -> Result<Vec<BookRecord>, ApiError> {
        debug!("Listing books");
        let request = self.http.get(self.url(endpoints::BOOKS));
        self.send(Operation::List, request).await?.books()
    }

    async fn create(&self, form: &BookForm) -> Result<Mutation, ApiError> {
        debug!("Creating book '{}'", form.title);
        let request = self.http.post(self.url(endpoints::BOOKS));
        self.submit(Operation::Create, request, form).await
    }

    async fn read(&self, id: &BookId) -> Result<BookRecord, ApiError> {
        debug!("Reading book {}", id);
        let request = self.http.get(self.url(&endpoints::book(id)));
        self.send(Operation::Read, request).await?.book()
    }

    async fn read_by_isbn(&self, isbn: &str) -> Result<BookFields, ApiError> {
        debug!("Looking up ISBN {}", isbn);
        let request = self.http.get(self.url(&endpoints::book_by_isbn(isbn)));
        self.send(Operation::ReadByIsbn, request).await?.book()
    }

    async fn update(&self, id: &BookId, form: &BookForm) -> Result<Mutation, ApiError> {
        debug!("Updating book {}", id);
        let request = self.http.put(self.url(&endpoints::book(id)));
        self.submit(Operation::Update, request, form).await
    }

    async fn update_status(&self, id: &BookId, status: ReadingStatus) -> Result<(), ApiError> {
        debug!("Setting status of book {} to {}", id, status);
        let body = format!("status={}", status.as_str());
        let request = self
            .http
            .patch(self.url(&endpoints::book_status(id)))
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);
        self.send(Operation::UpdateStatus, request).await?;
        Ok(())
    }

    async fn delete(&self, id: &BookId) -> Result<(), ApiError> {
        debug!("Deleting book {}", id);
        let request = self.http.delete(self.url(&endpoints::book(id)));
        self.send(Operation::Delete, request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_encode_path_segments() {
        assert_eq!(endpoints::book(&BookId::new("7")), "/api/books/7");
        assert_eq!(endpoints::book(&BookId::new("a b/c")), "/api/books/a%20b%2Fc");
        assert_eq!(
            endpoints::book_by_isbn("978-0441"),
            "/api/books/isbn/978-0441"
        );
        assert_eq!(
            endpoints::book_status(&BookId::new("7")),
            "/api/books/7/status"
        );
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        assert_eq!(
            HttpBookApi::new("http://shelf.local/").base_url(),
            "http://shelf.local"
        );
    }

    #[test]
    fn success_payload_exposes_book_and_message() {
        let payload = decode_envelope(
            Operation::Create,
            201,
            r#"{"status":"success","data":{"book":{"id":3,"title":"Dune","author_last":"Herbert"},"message":"Book added"}}"#,
        )
        .unwrap();

        let book: BookRecord = payload.book().unwrap();
        assert_eq!(book.id, BookId::new("3"));
        assert_eq!(payload.message.as_deref(), Some("Book added"));
    }

    #[test]
    fn success_without_book_is_a_server_error_when_one_is_needed() {
        let payload =
            decode_envelope(Operation::Read, 200, r#"{"status":"success","data":null}"#).unwrap();
        assert!(matches!(payload.book::<BookRecord>(), Err(ApiError::Server(_))));
        assert!(payload.books().unwrap().is_empty());
    }

    #[test]
    fn isbn_fail_is_not_found() {
        let err = decode_envelope(
            Operation::ReadByIsbn,
            404,
            r#"{"status":"fail","data":{"error":"isbn not found"}}"#,
        )
        .unwrap_err();
        assert_eq!(err, ApiError::NotFound("isbn not found".to_string()));
    }

    #[test]
    fn create_fail_is_validation_even_without_fields() {
        let err = decode_envelope(
            Operation::Create,
            400,
            r#"{"status":"fail","data":{"error":"Title is required"}}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ApiError::Validation {
                message: "Title is required".to_string(),
                fields: FieldErrors::new(),
            }
        );
    }

    #[test]
    fn field_detail_makes_any_fail_a_validation_error() {
        let err = decode_envelope(
            Operation::Delete,
            400,
            r#"{"status":"fail","data":{"errors":{"year":["Out of range"],"isbn":"Bad"}}}"#,
        )
        .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields["year"], vec!["Out of range".to_string()]);
        assert_eq!(fields["isbn"], vec!["Bad".to_string()]);
        assert_eq!(err.message(), "delete failed");

        let err = decode_envelope(
            Operation::Update,
            400,
            r#"{"status":"fail","data":{"error":"invalid","title":"This field is required."}}"#,
        )
        .unwrap_err();
        assert_eq!(err.message(), "invalid");
        assert!(err.field_errors().unwrap().contains_key("title"));
    }

    #[test]
    fn error_envelope_uses_top_level_message() {
        let err = decode_envelope(
            Operation::Delete,
            500,
            r#"{"status":"error","message":"database is locked"}"#,
        )
        .unwrap_err();
        assert_eq!(err, ApiError::Server("database is locked".to_string()));
    }

    #[test]
    fn unstructured_bodies_are_server_errors() {
        let err = decode_envelope(Operation::Read, 502, "<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err, ApiError::Server("read failed with HTTP 502".to_string()));

        let err = decode_envelope(Operation::Read, 200, "not json").unwrap_err();
        assert!(matches!(err, ApiError::Server(_)));

        let err = decode_envelope(Operation::Read, 200, r#"{"status":"maybe"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Server(_)));
    }

    #[test]
    fn local_field_errors_become_validation() {
        let mut fields = FieldErrors::new();
        fields.insert("title".into(), vec!["This field is required.".into()]);
        let err = ApiError::from(fields.clone());
        assert_eq!(err.field_errors(), Some(&fields));
    }
}
