use crate::error::{AppError, AppResult};
use crate::models::{EntityKind, PersonDetails};
use email_address::EmailAddress;

/// Upper bound for any single text column
pub const MAX_FIELD_LENGTH: usize = 255;

/// Validates the mutable fields of a roster record before it is written
pub fn validate_person(kind: EntityKind, details: &PersonDetails) -> AppResult<()> {
    validate_required_text(kind, "firstName", &details.first_name)?;
    validate_required_text(kind, "lastName", &details.last_name)?;
    validate_required_text(kind, "email", &details.email)?;

    if !validate_email(details.email.trim()) {
        return Err(AppError::BadRequest(format!(
            "{} email '{}' is not a valid email address",
            kind, details.email
        )));
    }

    Ok(())
}

fn validate_required_text(kind: EntityKind, attribute: &str, value: &str) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!(
            "{} {} must not be empty",
            kind, attribute
        )));
    }
    if trimmed.chars().count() > MAX_FIELD_LENGTH {
        return Err(AppError::BadRequest(format!(
            "{} {} must be at most {} characters",
            kind, attribute, MAX_FIELD_LENGTH
        )));
    }
    Ok(())
}

/// Validates email format according to RFC 5322
pub fn validate_email(email: &str) -> bool {
    EmailAddress::is_valid(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_person() {
        let details = PersonDetails::new("Ramesh", "Fegade", "ramesh@gmail.com");
        assert!(validate_person(EntityKind::Employee, &details).is_ok());
    }

    #[test]
    fn test_blank_names_rejected() {
        let details = PersonDetails::new("   ", "Fegade", "ramesh@gmail.com");
        let err = validate_person(EntityKind::Employee, &details).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("firstName")));

        let details = PersonDetails::new("Ramesh", "", "ramesh@gmail.com");
        let err = validate_person(EntityKind::Student, &details).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("lastName")));
    }

    #[test]
    fn test_invalid_email_rejected() {
        let details = PersonDetails::new("Ramesh", "Fegade", "not-an-email");
        assert!(validate_person(EntityKind::Employee, &details).is_err());

        let details = PersonDetails::new("Ramesh", "Fegade", "");
        assert!(validate_person(EntityKind::Employee, &details).is_err());
    }

    #[test]
    fn test_overlong_field_rejected() {
        let long_name = "a".repeat(MAX_FIELD_LENGTH + 1);
        let details = PersonDetails::new(long_name, "Fegade", "ramesh@gmail.com");
        assert!(validate_person(EntityKind::Employee, &details).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("arun@gmail.com"));
        assert!(validate_email("first.last+tag@example.co.uk"));
        assert!(!validate_email("arun@"));
        assert!(!validate_email("@gmail.com"));
    }
}
