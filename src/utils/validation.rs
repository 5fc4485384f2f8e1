use validator::ValidationError;

use crate::error::{Error, Result};

/// Trims, mapping blank input to `None`.
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trims each entry and drops the blank ones; order and duplicates are kept.
pub fn clean_list(values: Option<Vec<String>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Trims and cuts to at most `max_chars` characters.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.trim().chars().take(max_chars).collect()
}

pub fn ensure_url(value: &str, message: &str) -> Result<()> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|_| Error::BadRequest(message.to_string()))
}

pub fn non_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
