//! Book records as exchanged with the catalog API and embedded in the page

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque identifier of a book. The server sends it as a JSON number or string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for BookId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for BookId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for BookId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match lenient::Scalar::deserialize(deserializer)? {
            lenient::Scalar::Int(n) => Ok(Self(n.to_string())),
            lenient::Scalar::Float(n) => Ok(Self(n.to_string())),
            lenient::Scalar::Text(s) if !s.trim().is_empty() => Ok(Self(s.trim().to_string())),
            lenient::Scalar::Text(_) => Err(serde::de::Error::custom("empty book id")),
        }
    }
}

/// Reading status of a book
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    #[default]
    NotRead,
    Reading,
    Read,
}

impl ReadingStatus {
    /// Wire value used by the API and the status form field
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotRead => "not_read",
            Self::Reading => "reading",
            Self::Read => "read",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "not_read" => Some(Self::NotRead),
            "reading" => Some(Self::Reading),
            "read" => Some(Self::Read),
            _ => None,
        }
    }

    /// Next status in the toggle cycle: not read, reading, read, not read.
    pub fn next(self) -> Self {
        match self {
            Self::NotRead => Self::Reading,
            Self::Reading => Self::Read,
            Self::Read => Self::NotRead,
        }
    }

    /// Toggle from a raw wire value. Anything unrecognized goes to `Reading`.
    pub fn cycle_raw(raw: &str) -> Self {
        Self::parse(raw).map(Self::next).unwrap_or(Self::Reading)
    }

    /// Font Awesome classes for the status button
    pub fn icon_class(self) -> &'static str {
        match self {
            Self::NotRead => "fa-solid fa-xmark",
            Self::Reading => "fa-solid fa-minus",
            Self::Read => "fa-solid fa-check",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NotRead => "Not read",
            Self::Reading => "Reading",
            Self::Read => "Read",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive fields of a book, without identity or status.
///
/// This is also the shape of an ISBN lookup result, which has no id yet.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct BookFields {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub author_first: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub author_last: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub series: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_volume")]
    pub volume: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_year")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub written_form: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub publisher: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub collection: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub isbn: Option<String>,
}

/// A book as stored by the server
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BookRecord {
    pub id: BookId,
    #[serde(flatten)]
    pub fields: BookFields,
    /// Absent in edit confirmations and for books that were never toggled
    #[serde(default, deserialize_with = "lenient::opt_status")]
    pub status: Option<ReadingStatus>,
}

impl BookRecord {
    pub fn new(id: impl Into<BookId>, fields: BookFields) -> Self {
        Self {
            id: id.into(),
            fields,
            status: None,
        }
    }

    pub fn with_status(mut self, status: ReadingStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Parse the JSON array the page embeds for the initial table
    pub fn parse_snapshot(raw: &str) -> Result<Vec<Self>, SnapshotError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("invalid book snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Deserializers that accept what the server actually sends: numbers as
/// strings, empty strings for absent values, dates where a year is expected.
mod lenient {
    use super::ReadingStatus;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum Scalar {
        Int(i64),
        Float(f64),
        Text(String),
    }

    impl Scalar {
        fn into_text(self) -> Option<String> {
            let text = match self {
                Scalar::Int(n) => n.to_string(),
                Scalar::Float(n) => n.to_string(),
                Scalar::Text(s) => s.trim().to_string(),
            };
            (!text.is_empty()).then_some(text)
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(opt_text(d)?.unwrap_or_default())
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<Scalar>::deserialize(d)?.and_then(Scalar::into_text))
    }

    pub fn opt_volume<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(match Option::<Scalar>::deserialize(d)? {
            Some(Scalar::Int(n)) => u32::try_from(n).ok(),
            Some(Scalar::Float(n)) if n >= 0.0 && n.fract() == 0.0 => Some(n as u32),
            Some(Scalar::Text(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// Accepts `1951`, `"1951"` and dates such as `"1951-06-01"`.
    pub fn opt_year<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
        Ok(match Option::<Scalar>::deserialize(d)? {
            Some(Scalar::Int(n)) => i32::try_from(n).ok(),
            Some(Scalar::Float(n)) if n.fract() == 0.0 => Some(n as i32),
            Some(Scalar::Text(s)) => {
                let digits: String = s
                    .trim()
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                digits.parse().ok()
            }
            _ => None,
        })
    }

    pub fn opt_status<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<ReadingStatus>, D::Error> {
        Ok(Option::<Scalar>::deserialize(d)?
            .and_then(Scalar::into_text)
            .and_then(|s| ReadingStatus::parse(&s)))
    }
}
