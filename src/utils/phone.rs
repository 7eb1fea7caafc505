use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^\+?[0-9][0-9 ()\-]{3,18}$").expect("valid phone regex"))
}

/// Trim a free-form phone number and check it looks dialable
pub fn normalize_phone(phone: &str) -> AppResult<String> {
    let phone = phone.trim();
    if !phone_regex().is_match(phone) {
        return Err(AppError::field(
            "phone",
            "must contain 4-20 digits, optionally with +, spaces, dashes or parentheses",
        ));
    }
    Ok(phone.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone(" +995 555 12-34-56 ").unwrap(), "+995 555 12-34-56");
        assert_eq!(normalize_phone("555123456").unwrap(), "555123456");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(normalize_phone("").is_err());
        assert!(normalize_phone("call me").is_err());
        assert!(normalize_phone("+1 555 123 4567 8901 2345").is_err());
    }
}
