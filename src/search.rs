use std::collections::HashSet;

use crate::error::PortalError;
use crate::record::Record;

/// Queries shorter than this (in characters) produce no suggestions.
pub const MIN_SUGGEST_CHARS: usize = 2;
pub const MAX_SUGGESTIONS: usize = 10;

/// One field value matching the text being typed.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub text: String,
    pub field: String,
    /// Position of the owning record in the dataset.
    pub record_index: usize,
}

/// Normalize a string for case-insensitive matching.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
}

/// Trim a submitted query, rejecting one that is empty after trimming.
pub fn normalize_query(query: &str) -> Result<String, PortalError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(PortalError::EmptyQuery)
    } else {
        Ok(trimmed.to_string())
    }
}

/// String-valued fields of `record` containing `needle` (already normalized).
pub fn matching_fields<'a>(
    record: &'a Record,
    needle: &'a str,
) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
    record.fields().filter_map(move |(name, value)| {
        let text = value.as_str()?;
        normalize(text).contains(needle).then_some((name, text))
    })
}

/// Autocomplete candidates for `query`.
///
/// Every matching field of every record yields one candidate; candidates are
/// then deduplicated by text (first occurrence wins) and capped at
/// `MAX_SUGGESTIONS`. Linear in records x fields.
pub fn suggest(records: &[Record], query: &str) -> Vec<Suggestion> {
    if query.chars().count() < MIN_SUGGEST_CHARS {
        return Vec::new();
    }
    let needle = normalize(query);

    let mut seen: HashSet<&str> = HashSet::new();
    let mut suggestions = Vec::new();
    for (record_index, record) in records.iter().enumerate() {
        for (field, text) in matching_fields(record, &needle) {
            if !seen.insert(text) {
                continue;
            }
            suggestions.push(Suggestion {
                text: text.to_string(),
                field: field.to_string(),
                record_index,
            });
            if suggestions.len() == MAX_SUGGESTIONS {
                return suggestions;
            }
        }
    }
    suggestions
}
