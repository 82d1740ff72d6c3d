//! Add/edit form values, normalization and validation
//!
//! The form mirrors the HTML form the server expects: every field is a string
//! and is sent form-encoded. Normalization and validation follow the server's
//! own rules so that obviously bad input is caught before a round trip.

use crate::model::BookFields;
use serde::Serialize;
use std::collections::BTreeMap;

/// Field name to error messages
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const MIN_YEAR: i32 = 1000;
pub const MAX_YEAR: i32 = 2100;

/// A field of the add/edit form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormField {
    Title,
    AuthorLast,
    AuthorFirst,
    Series,
    Volume,
    Year,
    Language,
    Genre,
    WrittenForm,
    Publisher,
    Collection,
    Isbn,
}

impl FormField {
    /// Form order
    pub const ALL: [FormField; 12] = [
        FormField::Title,
        FormField::AuthorLast,
        FormField::AuthorFirst,
        FormField::Series,
        FormField::Volume,
        FormField::Year,
        FormField::Language,
        FormField::Genre,
        FormField::WrittenForm,
        FormField::Publisher,
        FormField::Collection,
        FormField::Isbn,
    ];

    /// Name of the form-encoded field
    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::AuthorLast => "author_last",
            Self::AuthorFirst => "author_first",
            Self::Series => "series",
            Self::Volume => "volume",
            Self::Year => "year",
            Self::Language => "language",
            Self::Genre => "genre",
            Self::WrittenForm => "written_form",
            Self::Publisher => "publisher",
            Self::Collection => "collection",
            Self::Isbn => "isbn",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::AuthorLast => "Author last name",
            Self::AuthorFirst => "Author first name",
            Self::Series => "Series",
            Self::Volume => "Volume",
            Self::Year => "Year",
            Self::Language => "Language",
            Self::Genre => "Genre",
            Self::WrittenForm => "Written form",
            Self::Publisher => "Publisher",
            Self::Collection => "Collection",
            Self::Isbn => "ISBN",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, Self::Title | Self::AuthorLast)
    }
}

/// Values of the add/edit form, as typed
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BookForm {
    pub title: String,
    pub author_last: String,
    pub author_first: String,
    pub series: String,
    pub volume: String,
    pub year: String,
    pub language: String,
    pub genre: String,
    pub written_form: String,
    pub publisher: String,
    pub collection: String,
    pub isbn: String,
}

impl BookForm {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::AuthorLast => &self.author_last,
            FormField::AuthorFirst => &self.author_first,
            FormField::Series => &self.series,
            FormField::Volume => &self.volume,
            FormField::Year => &self.year,
            FormField::Language => &self.language,
            FormField::Genre => &self.genre,
            FormField::WrittenForm => &self.written_form,
            FormField::Publisher => &self.publisher,
            FormField::Collection => &self.collection,
            FormField::Isbn => &self.isbn,
        }
    }

    pub fn set(&mut self, field: FormField, value: String) {
        let slot = match field {
            FormField::Title => &mut self.title,
            FormField::AuthorLast => &mut self.author_last,
            FormField::AuthorFirst => &mut self.author_first,
            FormField::Series => &mut self.series,
            FormField::Volume => &mut self.volume,
            FormField::Year => &mut self.year,
            FormField::Language => &mut self.language,
            FormField::Genre => &mut self.genre,
            FormField::WrittenForm => &mut self.written_form,
            FormField::Publisher => &mut self.publisher,
            FormField::Collection => &mut self.collection,
            FormField::Isbn => &mut self.isbn,
        };
        *slot = value;
    }

    /// Trimmed copy; names, language and genre are also capitalized.
    pub fn normalized(&self) -> BookForm {
        let mut out = BookForm::default();
        for field in FormField::ALL {
            let value = self.get(field).trim();
            let value = match field {
                FormField::AuthorLast
                | FormField::AuthorFirst
                | FormField::Language
                | FormField::Genre => capitalize(value),
                FormField::Isbn => normalize_isbn(value),
                _ => value.to_string(),
            };
            out.set(field, value);
        }
        out
    }

    /// Check the values against the catalog's form rules.
    ///
    /// Call on a normalized form.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut push = |field: FormField, message: &str| {
            errors
                .entry(field.name().to_string())
                .or_default()
                .push(message.to_string());
        };

        for field in FormField::ALL {
            if field.is_required() && self.get(field).is_empty() {
                push(field, "This field is required.");
            }
        }

        if !self.volume.is_empty() && self.volume.parse::<u32>().is_err() {
            push(FormField::Volume, "Must be a whole number of zero or more.");
        }
        if !self.series.is_empty() && self.volume.is_empty() {
            push(FormField::Volume, "A volume is required when a series is set.");
        }

        if !self.year.is_empty() {
            match self.year.parse::<i32>() {
                Ok(year) if (MIN_YEAR..=MAX_YEAR).contains(&year) => {}
                _ => push(FormField::Year, "Must be a year between 1000 and 2100."),
            }
        }

        if !self.isbn.is_empty() && !is_isbn_shaped(&self.isbn) {
            push(FormField::Isbn, "Must be a 10 or 13 digit ISBN.");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Form-encoded request body
    pub fn to_body(&self) -> Result<String, serde_urlencoded::ser::Error> {
        serde_urlencoded::to_string(self)
    }
}

impl From<&BookFields> for BookForm {
    fn from(fields: &BookFields) -> Self {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            title: fields.title.clone(),
            author_last: fields.author_last.clone(),
            author_first: fields.author_first.clone(),
            series: opt(&fields.series),
            volume: fields.volume.map(|v| v.to_string()).unwrap_or_default(),
            year: fields.year.map(|y| y.to_string()).unwrap_or_default(),
            language: opt(&fields.language),
            genre: opt(&fields.genre),
            written_form: opt(&fields.written_form),
            publisher: opt(&fields.publisher),
            collection: opt(&fields.collection),
            isbn: opt(&fields.isbn),
        }
    }
}

/// Strip the separators people type or scanners emit inside an ISBN.
pub fn normalize_isbn(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Length and character check only; the checksum is the server's business.
fn is_isbn_shaped(isbn: &str) -> bool {
    let bytes = isbn.as_bytes();
    match bytes.len() {
        13 => bytes.iter().all(u8::is_ascii_digit),
        10 => {
            bytes[..9].iter().all(u8::is_ascii_digit)
                && (bytes[9].is_ascii_digit() || bytes[9] == b'X')
        }
        _ => false,
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
