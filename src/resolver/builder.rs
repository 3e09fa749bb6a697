//! Resolver builder.
//!
//! The `ResolverBuilder` provides a fluent API for configuring an
//! [`OwnershipResolver`]. Everything is validated in `build()`, so a resolver
//! that exists is ready to process records.

use crate::config::MatchConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::resolver::{OwnershipResolver, DEFAULT_OWNER_FIELD, DEFAULT_PERSON_PREFIX};

/// Builder for [`OwnershipResolver`].
///
/// # Example
/// ```
/// use ownermatch::{MatchConfig, MatchMode, OwnershipResolver};
///
/// let resolver = OwnershipResolver::builder()
///     .config(MatchConfig::new(MatchMode::EmailOrPhone, ["Owner", "Email", "Phone"])?)
///     .owner_field("Owner")
///     .id_prefix("customer")
///     .build()?;
/// assert_eq!(resolver.index().prefix(), "customer");
/// # Ok::<(), ownermatch::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ResolverBuilder {
    config: Option<MatchConfig>,
    owner_field: String,
    id_prefix: String,
    preserve_existing_owner: bool,
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self {
            config: None,
            owner_field: DEFAULT_OWNER_FIELD.to_string(),
            id_prefix: DEFAULT_PERSON_PREFIX.to_string(),
            preserve_existing_owner: false,
        }
    }
}

impl ResolverBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the match configuration (required).
    #[must_use]
    pub fn config(mut self, config: MatchConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the field owner ids are written to (default: `OwnerId`).
    #[must_use]
    pub fn owner_field(mut self, field: impl Into<String>) -> Self {
        self.owner_field = field.into();
        self
    }

    /// Set the owner id prefix (default: `person`).
    #[must_use]
    pub fn id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Leave records that already carry an owner untouched in email-or-phone
    /// mode (default: false).
    #[must_use]
    pub fn preserve_existing_owner(mut self, preserve: bool) -> Self {
        self.preserve_existing_owner = preserve;
        self
    }

    /// Build the resolver.
    ///
    /// # Errors
    /// - `MissingField`: if no configuration was set
    /// - `EmptyOwnerField`: if the owner field is empty or whitespace
    /// - `EmptyIdPrefix`: if the id prefix is empty
    pub fn build(self) -> ConfigResult<OwnershipResolver> {
        let config = self.config.ok_or_else(|| ConfigError::MissingField {
            field: "config".to_string(),
        })?;

        if self.owner_field.trim().is_empty() {
            return Err(ConfigError::EmptyOwnerField);
        }

        if self.id_prefix.is_empty() {
            return Err(ConfigError::EmptyIdPrefix);
        }

        Ok(OwnershipResolver::from_parts(
            config,
            self.owner_field,
            self.id_prefix,
            self.preserve_existing_owner,
        ))
    }
}
