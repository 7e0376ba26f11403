//! Utility functions for working with Part lists.

use crate::types::Part;
use serde_json::Value;

/// Extracts text content from all text Parts in a list.
///
/// # Example
///
/// ```
/// use a2a_bridge::types::Part;
/// use a2a_bridge::utils::get_text_parts;
///
/// let parts = vec![Part::text("Hello"), Part::text("World")];
/// assert_eq!(get_text_parts(&parts), vec!["Hello", "World"]);
/// ```
pub fn get_text_parts(parts: &[Part]) -> Vec<String> {
    parts
        .iter()
        .filter_map(|part| part.as_text().map(str::to_string))
        .collect()
}

/// Extracts data content from all data Parts in a list.
pub fn get_data_parts(parts: &[Part]) -> Vec<Value> {
    parts
        .iter()
        .filter_map(|part| match part {
            Part::Data { data, .. } => Some(data.clone()),
            _ => None,
        })
        .collect()
}

/// Text of the first text Part, or `None` when there is none.
///
/// Data parts are skipped, so `[data, text("q")]` yields `"q"`.
pub fn first_text(parts: &[Part]) -> Option<&str> {
    parts.iter().find_map(Part::as_text)
}
