//! Token normalizers

use std::sync::LazyLock;

use regex::Regex;

/// Token normalization applied before vocabulary lookup
pub type Normalizer = Box<dyn Fn(&str) -> String>;

/// Digits with optional thousands groups and decimals: `12`, `1,000`, `3.14`
static NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(,\d+)*(\.\d+)?$").expect("Invalid number regex"));

/// Placeholder for numeric tokens
pub const NUMBER_TOKEN: &str = "<NUM>";

/// Lowercase the token
pub fn lowercase(token: &str) -> String {
    token.to_lowercase()
}

/// Lowercase the token and collapse numbers into [`NUMBER_TOKEN`]
pub fn replace_number(token: &str) -> String {
    let lowered = token.to_lowercase();
    if NUMBER_REGEX.is_match(&lowered) {
        NUMBER_TOKEN.to_string()
    } else {
        lowered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase() {
        assert_eq!(lowercase("Hello"), "hello");
        assert_eq!(lowercase("ÉCOLE"), "école");
    }

    #[test]
    fn test_replace_number_matches_numbers() {
        for token in ["7", "2024", "1,000", "1,000,000.25", "3.14"] {
            assert_eq!(replace_number(token), NUMBER_TOKEN, "{token}");
        }
    }

    #[test]
    fn test_replace_number_keeps_other_tokens() {
        assert_eq!(replace_number("Apple"), "apple");
        assert_eq!(replace_number("1,"), "1,");
        assert_eq!(replace_number(".5"), ".5");
        assert_eq!(replace_number("3rd"), "3rd");
        assert_eq!(replace_number("-4"), "-4");
    }
}
