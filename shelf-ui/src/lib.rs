//! shelf-ui - View components for the book library
//!
//! Pure rendering: components take state and report interactions through
//! event handlers. Fetching and state changes live in the page that uses them.

pub mod components;
pub mod wasm_utils;

pub use components::*;
