/// Country code prepended to bare 10-digit numbers.
pub const COUNTRY_CODE: &str = "91";

/// Normalizes a phone number to E.164-style digits with country code 91.
/// Accepts 10 digits (prepends 91) or 12 digits already starting with 91.
/// Anything else is rejected.
pub fn normalize_phone(input: &str) -> Option<String> {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        return Some(format!("{}{}", COUNTRY_CODE, digits));
    }
    if digits.len() == 12 && digits.starts_with(COUNTRY_CODE) {
        return Some(digits);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_digits_get_country_code() {
        assert_eq!(
            normalize_phone("9876543210").as_deref(),
            Some("919876543210")
        );
    }

    #[test]
    fn twelve_digits_with_prefix_pass_through() {
        assert_eq!(
            normalize_phone("919876543210").as_deref(),
            Some("919876543210")
        );
    }

    #[test]
    fn formatting_characters_are_stripped() {
        assert_eq!(
            normalize_phone("+91 98765-43210").as_deref(),
            Some("919876543210")
        );
        assert_eq!(
            normalize_phone(" 98765 43210 ").as_deref(),
            Some("919876543210")
        );
    }

    #[test]
    fn wrong_lengths_are_rejected() {
        assert_eq!(normalize_phone("98765"), None);
        assert_eq!(normalize_phone("987654321"), None);
        assert_eq!(normalize_phone("98765432101"), None);
        assert_eq!(normalize_phone("9198765432101"), None);
        assert_eq!(normalize_phone(""), None);
    }

    #[test]
    fn twelve_digits_with_wrong_prefix_are_rejected() {
        assert_eq!(normalize_phone("449876543210"), None);
    }
}
