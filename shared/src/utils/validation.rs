//! Common validation helpers

/// Check if a string is not blank
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Check if a string length (in characters) is within bounds
pub fn char_len_between(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

/// Check if an email address is valid (basic check)
pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("a"));
        assert!(!not_blank("   "));
    }

    #[test]
    fn test_char_len_counts_characters_not_bytes() {
        assert!(char_len_between("ééé", 1, 3));
        assert!(!char_len_between("", 1, 3));
    }

    #[test]
    fn test_email_check() {
        assert!(is_valid_email("ana@example.com"));
        assert!(!is_valid_email("ana.example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ana@example."));
    }
}
