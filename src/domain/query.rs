use crate::domain::ValidationError;

/// Trim a user-supplied search keyword, rejecting blank input.
pub fn normalize_keyword(raw: &str) -> Result<String, ValidationError> {
    let keyword = raw.trim();
    if keyword.is_empty() {
        return Err(ValidationError::EmptyKeyword);
    }
    Ok(keyword.to_string())
}
