//! Utility functions and helpers.

pub mod http;

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?").expect("valid amount pattern")
    })
}

/// Extract the first numeric amount from a free-text price.
///
/// Thousands separators and decimals are accepted; currency symbols and
/// trailing text are ignored.
///
/// # Examples
/// ```
/// use kigu_directory::utils::extract_amount;
///
/// assert_eq!(extract_amount("¥150,000~"), Some(150000.0));
/// assert_eq!(extract_amount("Varies"), None);
/// ```
pub fn extract_amount(text: &str) -> Option<f64> {
    let found = amount_pattern().find(text)?;
    found.as_str().replace(',', "").parse().ok()
}

/// Case-fold and strip diacritics for accent-insensitive matching.
///
/// # Examples
/// ```
/// use kigu_directory::utils::fold_text;
///
/// assert_eq!(fold_text("Café TŌKYŌ"), "cafe tokyo");
/// ```
pub fn fold_text(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Format a whole amount with comma thousands separators.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_amount() {
        assert_eq!(extract_amount("1000"), Some(1000.0));
        assert_eq!(extract_amount("$1,250.50 and up"), Some(1250.5));
        assert_eq!(extract_amount("from 80000 JPY"), Some(80000.0));
        assert_eq!(extract_amount("300-500"), Some(300.0));
        assert_eq!(extract_amount("Varies"), None);
        assert_eq!(extract_amount(""), None);
    }

    #[test]
    fn test_fold_text() {
        assert_eq!(fold_text("Éclair"), "eclair");
        assert_eq!(fold_text("Tokyo, Japan"), "tokyo, japan");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(10), "10");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(-4500), "-4,500");
    }
}
