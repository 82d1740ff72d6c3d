//! In-memory book table kept in sync with the server after each mutation
//!
//! Rows are rebuilt and re-sorted as a whole on insert and edit. Status
//! toggles patch the cached status in place and never move a row.

use crate::model::{BookId, BookRecord, ReadingStatus};
use std::cmp::Ordering;
use tracing::debug;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// One rendered book plus the status shown on its toggle button
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    record: BookRecord,
    status: ReadingStatus,
}

impl Row {
    pub fn new(record: BookRecord, status: ReadingStatus) -> Self {
        Self { record, status }
    }

    pub fn id(&self) -> &BookId {
        &self.record.id
    }

    pub fn record(&self) -> &BookRecord {
        &self.record
    }

    pub fn status(&self) -> ReadingStatus {
        self.status
    }

    pub fn title(&self) -> &str {
        &self.record.fields.title
    }

    /// "First Last"
    pub fn author_display(&self) -> String {
        let fields = &self.record.fields;
        format!("{} {}", fields.author_first, fields.author_last)
            .trim()
            .to_string()
    }

    /// "Series #volume", empty when the book is not part of a series
    pub fn series_display(&self) -> String {
        let fields = &self.record.fields;
        match (&fields.series, fields.volume) {
            (Some(series), Some(volume)) => format!("{series} #{volume}"),
            (Some(series), None) => series.clone(),
            (None, _) => String::new(),
        }
    }

    pub fn year_display(&self) -> String {
        self.record
            .fields
            .year
            .map(|y| y.to_string())
            .unwrap_or_default()
    }

    fn sort_key(&self) -> SortKey {
        let fields = &self.record.fields;
        let number = |n: Option<String>| n.unwrap_or_default();
        SortKey([
            CollationKey::new(&fields.author_last),
            CollationKey::new(&fields.author_first),
            CollationKey::new(&number(fields.year.map(|y| y.to_string()))),
            CollationKey::new(fields.series.as_deref().unwrap_or_default()),
            CollationKey::new(&number(fields.volume.map(|v| v.to_string()))),
            CollationKey::new(&fields.title),
        ])
    }
}

/// Case- and accent-insensitive comparison key for one column.
///
/// Strings that fold to the same key are ordered by their raw form.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CollationKey {
    folded: String,
    raw: String,
}

impl CollationKey {
    fn new(value: &str) -> Self {
        let raw = value.trim();
        let folded = raw
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .collect::<String>()
            .to_lowercase();
        Self {
            folded,
            raw: raw.to_string(),
        }
    }
}

/// Author last, author first, year, series, volume, title
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey([CollationKey; 6]);

/// Compare two rows in table order
pub fn compare_rows(a: &Row, b: &Row) -> Ordering {
    a.sort_key().cmp(&b.sort_key())
}

/// The working set of rows, always in table order with unique ids
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableSynchronizer {
    rows: Vec<Row>,
}

impl TableSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the table from the snapshot embedded in the page.
    ///
    /// A repeated id keeps its last occurrence.
    pub fn from_snapshot(records: Vec<BookRecord>) -> Self {
        let mut table = Self::new();
        table.replace_all(records);
        table
    }

    /// Rebuild the whole table from a fresh list of records
    pub fn replace_all(&mut self, records: Vec<BookRecord>) {
        self.rows.clear();
        for record in records {
            self.remove(&record.id);
            let status = record.status.unwrap_or_default();
            self.rows.push(Row::new(record, status));
        }
        self.sort();
        debug!("Table rebuilt with {} rows", self.rows.len());
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &BookId) -> Option<&Row> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn position(&self, id: &BookId) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }

    /// Insert a new book or replace an edited one, then re-sort.
    ///
    /// An edited row keeps the status it was showing, since edit
    /// confirmations do not carry a status. Returns the row's new position.
    pub fn apply_insert_or_update(&mut self, record: BookRecord) -> usize {
        let id = record.id.clone();
        let status = match self.remove(&id) {
            Some(previous) => previous.status,
            None => record.status.unwrap_or_default(),
        };
        self.rows.push(Row::new(record, status));
        self.sort();

        let position = self.position(&id).unwrap_or(self.rows.len() - 1);
        debug!("Row {} placed at {}", id, position);
        position
    }

    /// Remove a deleted book. Unknown ids are ignored.
    pub fn apply_delete(&mut self, id: &BookId) -> Option<Row> {
        let removed = self.remove(id);
        if removed.is_none() {
            debug!("Delete for absent row {}", id);
        }
        removed
    }

    /// Record a new status on an existing row without moving it.
    ///
    /// Returns false when no row has this id.
    pub fn apply_status_toggle(&mut self, id: &BookId, status: ReadingStatus) -> bool {
        match self.rows.iter_mut().find(|row| row.id() == id) {
            Some(row) => {
                row.status = status;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: &BookId) -> Option<Row> {
        let index = self.position(id)?;
        Some(self.rows.remove(index))
    }

    /// Stable, so rows with equal keys keep their current relative order.
    fn sort(&mut self) {
        self.rows.sort_by_cached_key(Row::sort_key);
    }
}
