use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::{ValidationError, ValidationErrors};

/// Longest title the agenda backend accepts
pub const MAX_TITLE_CHARS: usize = 255;

// local@domain.tld with no whitespace and exactly one '@'
static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Title must be non-blank and at most 255 characters
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(error("required", "O título é obrigatório."));
    }

    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(error("length", "O título não pode ter mais de 255 caracteres."));
    }

    Ok(())
}

/// Patient email must be present and look like local@domain.tld
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(error("required", "O e-mail do paciente é obrigatório."));
    }

    if !EMAIL_SHAPE.is_match(email) {
        return Err(error("email", "Insira um e-mail válido."));
    }

    Ok(())
}

/// Message shown next to a field, falling back to the error code
pub fn message_of(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

/// Convert validation errors to a readable string
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value for field '{}'", field));
            messages.push(message);
        }
    }

    messages.sort();
    messages.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_titles_are_required() {
        for title in ["", "   ", "\t\n"] {
            let err = validate_title(title).unwrap_err();
            assert_eq!(err.code, "required");
        }
    }

    #[test]
    fn test_title_length_limit_counts_characters() {
        assert!(validate_title(&"a".repeat(255)).is_ok());
        assert!(validate_title(&"é".repeat(255)).is_ok());

        let err = validate_title(&"a".repeat(256)).unwrap_err();
        assert_eq!(err.code, "length");
    }

    #[test]
    fn test_long_blank_title_reports_required() {
        let err = validate_title(&" ".repeat(300)).unwrap_err();
        assert_eq!(err.code, "required");
    }

    #[test]
    fn test_email_shapes() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("paciente@email.com.br").is_ok());

        assert_eq!(validate_email("").unwrap_err().code, "required");
        for bad in ["ab.co", "a@bco", "a b@c.co", "a@b .co", "a@@b.co", "@b.co", "a@b."] {
            assert_eq!(validate_email(bad).unwrap_err().code, "email", "{bad} should be rejected");
        }
    }

    #[test]
    fn test_message_of_prefers_message() {
        assert_eq!(message_of(&validate_email("").unwrap_err()), "O e-mail do paciente é obrigatório.");
        assert_eq!(message_of(&ValidationError::new("range")), "range");
    }
}
