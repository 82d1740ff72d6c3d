//! Data the server embeds in the page as JSON `<script>` elements

use shelf_core::{BookRecord, ClientConfig};
use tracing::{error, info};

/// Initial book list
pub const BOOKS_DATA_ID: &str = "books-data";
/// Optional client configuration
pub const CONFIG_ID: &str = "shelf-config";

fn script_text(id: &str) -> Option<String> {
    web_sys::window()?
        .document()?
        .get_element_by_id(id)?
        .text_content()
}

fn page_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

/// The snapshot of books rendered with the page. A missing or broken
/// snapshot gives an empty table, which a reload can fill.
pub fn load_snapshot() -> Vec<BookRecord> {
    let Some(raw) = script_text(BOOKS_DATA_ID) else {
        info!("No #{} element, starting with an empty library", BOOKS_DATA_ID);
        return Vec::new();
    };
    BookRecord::parse_snapshot(&raw).unwrap_or_else(|e| {
        error!("Could not read the embedded library: {}", e);
        Vec::new()
    })
}

/// Client configuration, with the API defaulting to the page's own origin
pub fn load_config() -> ClientConfig {
    let mut config = ClientConfig::from_embedded(script_text(CONFIG_ID).as_deref());
    if config.api_base.is_empty() {
        config.api_base = page_origin().unwrap_or_default();
    }
    config
}
