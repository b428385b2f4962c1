//! Input validation helpers
//!
//! Centralized text length constants and validation functions for the CRUD
//! handlers. SurrealDB does not enforce text lengths, so limits live here.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product names, user names
pub const MAX_NAME_LEN: usize = 200;

/// Product descriptions
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;
pub const MIN_PASSWORD_LEN: usize = 8;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::field(field, format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::field(
            field,
            format!("{field} is too long ({} chars, max {max_len})", value.len()),
        ));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::field(
            field,
            format!("{field} is too long ({} chars, max {max_len})", v.len()),
        ));
    }
    Ok(())
}

/// Minimal shape check for email addresses; full RFC validation is not the goal.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    });
    if !valid {
        return Err(AppError::field("email", "email is not a valid address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::field(
            "password",
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::field(
            "password",
            format!("password must be at most {MAX_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_blank() {
        assert!(validate_required_text("  ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("Keyboard", "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn required_text_rejects_overlong() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_required_text(&long, "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn email_shape_check() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@nodot").is_err());
    }

    #[test]
    fn password_length_bounds() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long-enough-secret").is_ok());
    }
}
