//! Input validation for contact form fields.
//!
//! All functions are pure: they classify a raw field value and return
//! either `Ok(())` or a specific [`ValidationError`]. Nothing here
//! touches the database.
//!
//! Phone numbers use a syntactic rule (optional `+`, digits only after
//! stripping common separators, 7-20 digits) rather than a full
//! numbering-plan check, so a number is never rejected for belonging to
//! an unknown country.

use thiserror::Error;

/// Per-field validation failure reasons.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name is empty or whitespace only.
    #[error("name is required")]
    NameRequired,
    /// Name exceeds the maximum length after trimming.
    #[error("name is too long ({actual} chars, max {max})")]
    NameTooLong { max: usize, actual: usize },
    /// Phone number is empty or whitespace only.
    #[error("phone number is required")]
    PhoneRequired,
    /// Phone number is not a plausible dialable number.
    #[error("phone number is invalid")]
    PhoneInvalid,
    /// Email is present but not syntactically valid.
    #[error("email address is invalid")]
    EmailInvalid,
}

/// Result of validating a single field.
pub type ValidationResult = Result<(), ValidationError>;

/// Maximum allowed name length, in characters after trimming.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Minimum digits in a phone number.
pub const MIN_PHONE_DIGITS: usize = 7;

/// Maximum digits in a phone number.
pub const MAX_PHONE_DIGITS: usize = 20;

/// Validate a name: required, at most [`MAX_NAME_LENGTH`] characters
/// after trimming.
pub fn validate_name(name: &str) -> ValidationResult {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }

    let actual = name.chars().count();
    if actual > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong {
            max: MAX_NAME_LENGTH,
            actual,
        });
    }

    Ok(())
}

/// Validate a phone number.
///
/// Spaces, hyphens and parentheses are ignored. What remains must be an
/// optional leading `+` followed only by digits, with the digit count
/// in `[MIN_PHONE_DIGITS, MAX_PHONE_DIGITS]`.
pub fn validate_phone(phone: &str) -> ValidationResult {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::PhoneRequired);
    }

    let stripped: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let digits = stripped.strip_prefix('+').unwrap_or(&stripped);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PhoneInvalid);
    }

    if digits.len() < MIN_PHONE_DIGITS || digits.len() > MAX_PHONE_DIGITS {
        return Err(ValidationError::PhoneInvalid);
    }

    Ok(())
}

/// Validate an email address. Empty is valid: the field is optional.
///
/// Non-empty values get a structural local@domain.tld check:
/// - exactly one @
/// - non-empty local part and domain
/// - domain contains a dot, with no leading/trailing/consecutive dots
/// - total length at most [`MAX_EMAIL_LENGTH`]
pub fn validate_email(email: &str) -> ValidationResult {
    let email = email.trim();

    if email.is_empty() {
        return Ok(());
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailInvalid);
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::EmailInvalid);
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ValidationError::EmailInvalid);
    }

    if !domain.contains('.') {
        return Err(ValidationError::EmailInvalid);
    }

    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return Err(ValidationError::EmailInvalid);
    }

    Ok(())
}

/// Validate an address. Addresses are free-form and always valid.
pub fn validate_address(_address: &str) -> ValidationResult {
    Ok(())
}

/// True when all save-gating fields validate. Address never gates a save.
pub fn is_form_valid(
    name: &ValidationResult,
    phone: &ValidationResult,
    email: &ValidationResult,
) -> bool {
    name.is_ok() && phone.is_ok() && email.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_valid() {
        assert!(validate_name("Alice").is_ok());
        assert!(validate_name("  Alice  ").is_ok());
        assert!(validate_name(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn test_validate_name_required() {
        assert_eq!(validate_name(""), Err(ValidationError::NameRequired));
        assert_eq!(validate_name("   "), Err(ValidationError::NameRequired));
    }

    #[test]
    fn test_validate_name_too_long() {
        let long = "a".repeat(101);
        assert_eq!(
            validate_name(&long),
            Err(ValidationError::NameTooLong {
                max: 100,
                actual: 101
            })
        );
        // Surrounding whitespace does not count toward the limit.
        assert!(validate_name(&format!("  {}  ", "a".repeat(100))).is_ok());
    }

    #[test]
    fn test_validate_phone_valid() {
        assert!(validate_phone("+14155551234").is_ok());
        assert!(validate_phone("4155551234").is_ok());
        assert!(validate_phone("(415) 555-1234").is_ok());
        assert!(validate_phone("415-555-1234").is_ok());
        assert!(validate_phone("1234567").is_ok()); // minimum digits
        assert!(validate_phone(&format!("+{}", "1".repeat(20))).is_ok()); // maximum digits
    }

    #[test]
    fn test_validate_phone_required() {
        assert_eq!(validate_phone(""), Err(ValidationError::PhoneRequired));
        assert_eq!(validate_phone("  "), Err(ValidationError::PhoneRequired));
    }

    #[test]
    fn test_validate_phone_invalid() {
        assert_eq!(validate_phone("+"), Err(ValidationError::PhoneInvalid));
        assert_eq!(validate_phone("123456"), Err(ValidationError::PhoneInvalid)); // too short
        assert_eq!(
            validate_phone(&"1".repeat(21)),
            Err(ValidationError::PhoneInvalid) // too long
        );
        assert_eq!(
            validate_phone("call me"),
            Err(ValidationError::PhoneInvalid)
        );
        assert_eq!(
            validate_phone("+1 (415) CALL"),
            Err(ValidationError::PhoneInvalid)
        );
        // + only allowed in leading position
        assert_eq!(
            validate_phone("415+5551234"),
            Err(ValidationError::PhoneInvalid)
        );
    }

    #[test]
    fn test_validate_email_optional() {
        assert!(validate_email("").is_ok());
        assert!(validate_email("   ").is_ok());
    }

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name@domain.co.uk").is_ok());
        assert!(validate_email(" test@example.com ").is_ok()); // trimmed
    }

    #[test]
    fn test_validate_email_invalid() {
        for email in [
            "test.example.com",   // no @
            "test@example@com",   // multiple @
            "@example.com",       // missing local part
            "test@",              // missing domain
            "test@localhost",     // no dot in domain
            "test@.example.com",  // leading dot
            "test@example.com.",  // trailing dot
            "test@example..com",  // consecutive dots
        ] {
            assert_eq!(
                validate_email(email),
                Err(ValidationError::EmailInvalid),
                "expected {email:?} to be invalid"
            );
        }

        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(validate_email(&long), Err(ValidationError::EmailInvalid));
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address("").is_ok());
        assert!(validate_address("221B Baker Street").is_ok());
    }

    #[test]
    fn test_is_form_valid() {
        let ok: ValidationResult = Ok(());
        let bad: ValidationResult = Err(ValidationError::NameRequired);

        assert!(is_form_valid(&ok, &ok, &ok));
        assert!(!is_form_valid(&bad, &ok, &ok));
        assert!(!is_form_valid(&ok, &Err(ValidationError::PhoneInvalid), &ok));
        assert!(!is_form_valid(&ok, &ok, &Err(ValidationError::EmailInvalid)));
    }
}
