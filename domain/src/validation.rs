use crate::DomainError;
use once_cell::sync::Lazy;
use regex::Regex;

/// `(DD) DDDDD-DDDD` or `(DD) DDDD-DDDD`.
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\([0-9]{2}\)\s[0-9]{4,5}-[0-9]{4}$").expect("phone pattern must compile")
});

/// `local@domain.tld`, none of the parts containing whitespace or `@`.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile")
});

pub const INVALID_PHONE: &str =
    "Telefone inválido. Use o formato (XX) XXXXX-XXXX ou (XX) XXXX-XXXX";
pub const INVALID_EMAIL: &str = "Email inválido";

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_PATTERN.is_match(phone)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn check_phone(phone: &str) -> Result<(), DomainError> {
    if is_valid_phone(phone) {
        Ok(())
    } else {
        Err(DomainError::invalid_field("telefone", INVALID_PHONE))
    }
}

pub fn check_email(email: &str) -> Result<(), DomainError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(DomainError::invalid_field("email", INVALID_EMAIL))
    }
}

/// Empty strings count as "not supplied".
pub fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
