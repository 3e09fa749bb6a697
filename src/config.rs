//! Match configuration.
//!
//! A [`MatchConfig`] fixes, for one input stream, which key families are used
//! and which headers supply them. Header selection happens once at
//! construction and never changes mid-stream.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Header prefix identifying email columns.
pub const EMAIL_HEADER_PREFIX: &str = "Email";

/// Header prefix identifying phone columns.
pub const PHONE_HEADER_PREFIX: &str = "Phone";

/// Which identifying fields records are matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MatchMode {
    /// Match on email only.
    Email,
    /// Match on phone only.
    Phone,
    /// Match on either, merging transitively across both.
    EmailOrPhone,
}

impl MatchMode {
    /// All supported modes.
    pub const ALL: [Self; 3] = [Self::Email, Self::Phone, Self::EmailOrPhone];

    /// Snake-case name (`email_or_phone`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::EmailOrPhone => "email_or_phone",
        }
    }

    /// Kebab-case name (`email-or-phone`), as used in file names and flags.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::EmailOrPhone => "email-or-phone",
        }
    }

    /// Returns true if email keys take part in matching.
    #[must_use]
    pub const fn uses_email(self) -> bool {
        matches!(self, Self::Email | Self::EmailOrPhone)
    }

    /// Returns true if phone keys take part in matching.
    #[must_use]
    pub const fn uses_phone(self) -> bool {
        matches!(self, Self::Phone | Self::EmailOrPhone)
    }
}

impl FromStr for MatchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Self::ALL
            .into_iter()
            .find(|mode| {
                value.eq_ignore_ascii_case(mode.as_str()) || value.eq_ignore_ascii_case(mode.slug())
            })
            .ok_or_else(|| ConfigError::unsupported(s))
    }
}

impl TryFrom<String> for MatchMode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MatchMode> for String {
    fn from(value: MatchMode) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexicographically smallest header starting with `prefix`.
fn select_header(headers: &[String], prefix: &str) -> Option<String> {
    headers
        .iter()
        .filter(|h| h.starts_with(prefix))
        .min()
        .cloned()
}

/// Resolved match configuration for one stream.
///
/// # Examples
///
/// ```
/// use ownermatch::{MatchConfig, MatchMode};
///
/// let config = MatchConfig::new(MatchMode::EmailOrPhone, ["OwnerId", "Email1", "Email", "Phone"])?;
/// assert_eq!(config.email_header(), Some("Email"));
/// assert_eq!(config.phone_header(), Some("Phone"));
/// # Ok::<(), ownermatch::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMatchConfig")]
pub struct MatchConfig {
    mode: MatchMode,
    headers: Vec<String>,
    email_header: Option<String>,
    phone_header: Option<String>,
}

/// Serialized form accepted on input. Resolved headers are recomputed, never trusted.
#[derive(Deserialize)]
struct RawMatchConfig {
    mode: MatchMode,
    headers: Vec<String>,
}

impl TryFrom<RawMatchConfig> for MatchConfig {
    type Error = ConfigError;

    fn try_from(raw: RawMatchConfig) -> Result<Self, Self::Error> {
        Self::new(raw.mode, raw.headers)
    }
}

impl MatchConfig {
    /// Validates the header list and resolves the key headers for `mode`.
    ///
    /// # Errors
    /// - `EmptyHeaders`: if `headers` yields nothing
    pub fn new<I, S>(mode: MatchMode, headers: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        if headers.is_empty() {
            return Err(ConfigError::EmptyHeaders);
        }

        let email_header = mode
            .uses_email()
            .then(|| select_header(&headers, EMAIL_HEADER_PREFIX))
            .flatten();
        let phone_header = mode
            .uses_phone()
            .then(|| select_header(&headers, PHONE_HEADER_PREFIX))
            .flatten();

        Ok(Self {
            mode,
            headers,
            email_header,
            phone_header,
        })
    }

    /// Parses `mode` and builds the configuration.
    ///
    /// # Errors
    /// - `UnsupportedMatchMode`: if `mode` is not a supported mode
    /// - `EmptyHeaders`: if `headers` yields nothing
    pub fn parse<I, S>(mode: &str, headers: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(mode.parse()?, headers)
    }

    /// The configured mode.
    #[must_use]
    pub const fn mode(&self) -> MatchMode {
        self.mode
    }

    /// The full header list, in input order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Returns true if email keys take part in matching.
    #[must_use]
    pub const fn uses_email(&self) -> bool {
        self.mode.uses_email()
    }

    /// Returns true if phone keys take part in matching.
    #[must_use]
    pub const fn uses_phone(&self) -> bool {
        self.mode.uses_phone()
    }

    /// Header supplying email values, if email matching is enabled and one exists.
    #[must_use]
    pub fn email_header(&self) -> Option<&str> {
        self.email_header.as_deref()
    }

    /// Header supplying phone values, if phone matching is enabled and one exists.
    #[must_use]
    pub fn phone_header(&self) -> Option<&str> {
        self.phone_header.as_deref()
    }
}
