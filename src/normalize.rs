//! Key normalization.
//!
//! Raw field values are turned into canonical keys before they reach the
//! identity index. `None` means "no identity signal of this type".

use std::sync::OnceLock;

use regex::Regex;

static NON_DIGITS: OnceLock<Regex> = OnceLock::new();
static NANP_DIGITS: OnceLock<Regex> = OnceLock::new();

fn non_digits() -> &'static Regex {
    // Literal pattern; compiling it cannot fail.
    NON_DIGITS.get_or_init(|| Regex::new(r"\D").expect("static regex"))
}

// Optional country code, then area code, exchange and line. Anything after the
// first ten national digits (extensions) is ignored.
fn nanp_digits() -> &'static Regex {
    NANP_DIGITS.get_or_init(|| Regex::new(r"^1?(\d{3})(\d{3})(\d{4})").expect("static regex"))
}

/// Returns the email address trimmed and lowercased.
///
/// ```
/// use ownermatch::normalize;
///
/// assert_eq!(normalize::email(Some(" Test@example.com ")).as_deref(), Some("test@example.com"));
/// assert_eq!(normalize::email(Some("   ")), None);
/// ```
#[must_use]
pub fn email(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Returns the phone number as `DDD-DDD-DDDD`, dropping a leading `1`.
///
/// Returns `None` when fewer than ten national digits are present.
///
/// ```
/// use ownermatch::normalize;
///
/// assert_eq!(normalize::phone(Some("1 (555) 123-4567")).as_deref(), Some("555-123-4567"));
/// assert_eq!(normalize::phone(Some("(555) 123-456")), None);
/// ```
#[must_use]
pub fn phone(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    if raw.trim().is_empty() {
        return None;
    }

    let digits = non_digits().replace_all(raw, "");
    let caps = nanp_digits().captures(&digits)?;
    Some(format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_patterns() {
        assert!(std::ptr::eq(non_digits(), non_digits()));
        assert_eq!(non_digits().replace_all("(555) 512-3456", ""), "5555123456");
        let caps = nanp_digits().captures("15555123456").unwrap();
        assert_eq!((&caps[1], &caps[2], &caps[3]), ("555", "512", "3456"));
    }

    #[test]
    fn test_email_padded_mixed_case() {
        assert_eq!(email(Some(" Test@example.com ")).as_deref(), Some("test@example.com"));
    }

    #[test]
    fn test_email_blank() {
        assert_eq!(email(Some("")), None);
        assert_eq!(email(Some("     ")), None);
        assert_eq!(email(None), None);
    }

    #[test]
    fn test_phone_valid_forms() {
        for (raw, expected) in [
            ("+15551234567", "555-123-4567"),
            ("555.123.4567", "555-123-4567"),
            ("1 (555) 123-4567", "555-123-4567"),
            ("(555) 123-4567 ext: 23", "555-123-4567"),
            ("555.512.3456 ext 23", "555-512-3456"),
            ("1(123)456-7890", "123-456-7890"),
        ] {
            assert_eq!(phone(Some(raw)).as_deref(), Some(expected), "input {raw:?}");
        }
    }

    #[test]
    fn test_phone_ten_digits_starting_with_one() {
        // Not enough digits to drop the leading 1, so it is the area code.
        assert_eq!(phone(Some("123-456-7890")).as_deref(), Some("123-456-7890"));
    }

    #[test]
    fn test_phone_invalid() {
        assert_eq!(phone(Some("(555) 123-456")), None);
        assert_eq!(phone(Some("")), None);
        assert_eq!(phone(Some("   ")), None);
        assert_eq!(phone(Some("no digits here")), None);
        assert_eq!(phone(None), None);
    }
}
