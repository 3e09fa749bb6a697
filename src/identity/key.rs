//! Key types scoping the identity index.
//!
//! Every stored key belongs to exactly one family. Two families are used by
//! the resolver (email and phone); further families can be added without
//! touching the index.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which field family a key comes from.
///
/// # Examples
///
/// ```
/// use ownermatch::KeyType;
///
/// let kind = KeyType::try_from("Phone".to_string()).unwrap();
/// assert_eq!(kind, KeyType::Phone);
/// assert_eq!(KeyType::Custom("fax".into()).to_string(), "custom:fax");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KeyType {
    /// A normalized email address
    Email,
    /// A normalized `DDD-DDD-DDDD` phone number
    Phone,
    /// Any other key family
    Custom(String),
}

impl TryFrom<String> for KeyType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim();
        if value.is_empty() {
            return Err("key type cannot be empty".to_string());
        }

        let bytes = value.as_bytes();
        if bytes.len() >= 7 && bytes[..7].eq_ignore_ascii_case(b"custom:") {
            let rest = value[7..].trim();
            if rest.is_empty() {
                return Err("custom key type cannot be empty".to_string());
            }
            return Ok(Self::Custom(rest.to_string()));
        }

        if value.eq_ignore_ascii_case("email") {
            Ok(Self::Email)
        } else if value.eq_ignore_ascii_case("phone") {
            Ok(Self::Phone)
        } else {
            Err(format!(
                "unknown key type: {value}. Use email, phone, or prefix other families with custom:<name>"
            ))
        }
    }
}

impl From<KeyType> for String {
    fn from(value: KeyType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::Phone => write!(f, "phone"),
            Self::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}
