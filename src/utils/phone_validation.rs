//! Phone number validation for outbound test calls.
//!
//! Validation is deliberately permissive: digits with an optional leading `+`.
//! Twilio performs the authoritative check (E.164, geo permissions), so this
//! only rejects input that can never be dialed, such as letters or embedded
//! punctuation.

/// Validates and normalizes a phone number.
///
/// # Validation Rules
///
/// - Must not be empty (after trimming whitespace)
/// - Must contain only digits (`0-9`), with an optional `+` prefix
/// - If `+` is present, it must be at the very beginning
///
/// # Returns
///
/// - `Ok(String)` - The trimmed phone number, ready for the provider's `To`/`From` fields
/// - `Err(String)` - A human-readable error message
///
/// # Examples
///
/// ```
/// use callcheck::utils::phone_validation::validate_phone_number;
///
/// assert_eq!(validate_phone_number(" +15551234567 ").unwrap(), "+15551234567");
/// assert!(validate_phone_number("555-1234").is_err());
/// ```
pub fn validate_phone_number(phone: &str) -> Result<String, String> {
    let trimmed = phone.trim();

    if trimmed.is_empty() {
        return Err("Phone number cannot be empty".to_string());
    }

    let (has_plus, digits_part) = match trimmed.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    if digits_part.is_empty() {
        return Err("Phone number must contain at least one digit".to_string());
    }

    let offset = usize::from(has_plus);
    for (i, ch) in digits_part.chars().enumerate() {
        if ch == '+' {
            return Err(format!(
                "Invalid character '+' at position {} - plus sign is only allowed at the beginning",
                i + offset
            ));
        }
        if !ch.is_ascii_digit() {
            return Err(format!(
                "Invalid character '{}' at position {} - only digits (0-9) and optional leading '+' are allowed",
                ch,
                i + offset
            ));
        }
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_international_numbers() {
        assert_eq!(validate_phone_number("+1").unwrap(), "+1");
        assert_eq!(validate_phone_number("+15551234567").unwrap(), "+15551234567");
        assert_eq!(validate_phone_number("+447123456789").unwrap(), "+447123456789");
    }

    #[test]
    fn test_valid_national_and_extension() {
        assert_eq!(validate_phone_number("07123456789").unwrap(), "07123456789");
        assert_eq!(validate_phone_number("1234").unwrap(), "1234");
    }

    #[test]
    fn test_whitespace_trimming() {
        assert_eq!(
            validate_phone_number("  +15551234567\n").unwrap(),
            "+15551234567"
        );
    }

    #[test]
    fn test_invalid_empty() {
        assert_eq!(
            validate_phone_number("").unwrap_err(),
            "Phone number cannot be empty"
        );
        assert_eq!(
            validate_phone_number("   ").unwrap_err(),
            "Phone number cannot be empty"
        );
    }

    #[test]
    fn test_invalid_plus_only() {
        assert_eq!(
            validate_phone_number("+").unwrap_err(),
            "Phone number must contain at least one digit"
        );
    }

    #[test]
    fn test_invalid_plus_not_at_beginning() {
        let err = validate_phone_number("1+234").unwrap_err();
        assert!(err.contains("plus sign is only allowed at the beginning"));
        assert!(err.contains("position 1"));
    }

    #[test]
    fn test_invalid_characters() {
        assert!(
            validate_phone_number("+1555abc")
                .unwrap_err()
                .contains("Invalid character 'a' at position 5")
        );
        assert!(
            validate_phone_number("555-1234")
                .unwrap_err()
                .contains("Invalid character '-'")
        );
        assert!(
            validate_phone_number("(555)1234")
                .unwrap_err()
                .contains("Invalid character '('")
        );
        assert!(
            validate_phone_number("555 1234")
                .unwrap_err()
                .contains("Invalid character ' '")
        );
    }
}
