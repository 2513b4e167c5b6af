//! Identifier validation for SQL injection prevention.
//!
//! Table and column names cannot be passed as statement parameters, only
//! values can. Every identifier spliced into generated SQL text must pass
//! [`check_identifier`] first. The gateway writes identifiers unquoted, so
//! the accepted alphabet is restricted to ASCII letters, digits and `_`.

/// Maximum identifier length (conservative limit across databases).
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Check an identifier, returning a description of the problem if it is unsafe.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers exceeding maximum length
/// - Identifiers starting with a digit
/// - Any character other than ASCII letters, digits and underscore
pub fn check_identifier(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("Identifier cannot be empty".to_string());
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(format!(
            "Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        ));
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(format!("Identifier cannot start with a digit: {:?}", name));
    }

    if let Some(bad) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(format!(
            "SECURITY: Identifier contains invalid character {:?}: {:?}",
            bad, name
        ));
    }

    Ok(())
}

/// True if `name` is safe to splice into SQL text.
pub fn is_valid_identifier(name: &str) -> bool {
    check_identifier(name).is_ok()
}
