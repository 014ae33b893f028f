//! Field validation helpers shared by the domain payloads.
//!
//! Rules follow the column sizes and check constraints of the schema, so a
//! payload that passes here only fails in the database on uniqueness or
//! foreign-key grounds.

use crate::AppError;

/// Require `value` to have between `min` and `max` characters.
///
/// # Errors
///
/// Returns a validation error naming `field` otherwise.
pub fn length(field: &str, value: &str, min: usize, max: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

/// Like [`length`], for optional fields.
///
/// # Errors
///
/// Returns a validation error if the value is present and out of range.
pub fn optional_length(
    field: &str,
    value: Option<&str>,
    min: usize,
    max: usize,
) -> Result<(), AppError> {
    value.map_or(Ok(()), |v| length(field, v, min, max))
}

/// Require `value` to be exactly `count` ASCII digits.
///
/// # Errors
///
/// Returns a validation error naming `field` otherwise.
pub fn digits(field: &str, value: &str, count: usize) -> Result<(), AppError> {
    if value.len() != count || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::validation(format!(
            "{field} must be exactly {count} digits"
        )));
    }
    Ok(())
}

/// Like [`digits`], for optional fields.
///
/// # Errors
///
/// Returns a validation error if the value is present and malformed.
pub fn optional_digits(field: &str, value: Option<&str>, count: usize) -> Result<(), AppError> {
    value.map_or(Ok(()), |v| digits(field, v, count))
}

/// Loose e-mail check: `local@domain` with a dot in the domain, at most 100 characters.
///
/// # Errors
///
/// Returns a validation error naming `field` if the address is malformed.
pub fn optional_email(field: &str, value: Option<&str>) -> Result<(), AppError> {
    let Some(email) = value else {
        return Ok(());
    };

    let valid = email.chars().count() <= 100
        && !email.chars().any(char::is_whitespace)
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
            });

    if valid {
        Ok(())
    } else {
        Err(AppError::validation(format!("{field} is not a valid e-mail address")))
    }
}

/// Require an id to be strictly positive.
///
/// # Errors
///
/// Returns a validation error naming `field` otherwise.
pub fn positive(field: &str, value: i64) -> Result<(), AppError> {
    if value <= 0 {
        return Err(AppError::validation(format!("{field} must be greater than 0")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits() {
        assert!(digits("dni", "12345678", 8).is_ok());
        assert!(digits("dni", "1234567", 8).is_err());
        assert!(digits("dni", "1234567a", 8).is_err());
    }

    #[test]
    fn test_length_counts_chars() {
        assert!(length("name", "Ñu", 2, 100).is_ok());
        assert!(length("name", "A", 2, 100).is_err());
    }

    #[test]
    fn test_optional_email() {
        assert!(optional_email("email", None).is_ok());
        assert!(optional_email("email", Some("ana@unmsm.edu.pe")).is_ok());
        assert!(optional_email("email", Some("ana@localhost")).is_err());
        assert!(optional_email("email", Some("@unmsm.edu.pe")).is_err());
        assert!(optional_email("email", Some("ana maria@unmsm.edu.pe")).is_err());
    }

    #[test]
    fn test_positive() {
        assert!(positive("id", 1).is_ok());
        assert!(positive("id", 0).is_err());
    }
}
