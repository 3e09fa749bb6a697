//! Ownership resolution.
//!
//! The resolver walks records strictly in input order and assigns each one an
//! owner id. Every decision depends on index state built by earlier records,
//! so reordering the input changes the output.
//!
//! In email-or-phone mode, merges are forward-only and directional:
//! - an owned email pulls an unowned phone into its identity;
//! - an owned phone wins otherwise, and the record's email key is moved into
//!   the phone's identity even if it already belonged to another one.
//!
//! Records already emitted under the old email owner are not revisited.

mod builder;
mod stats;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{MatchConfig, MatchMode};
use crate::error::{ConfigError, ConfigResult};
use crate::identity::{IdentityIndex, KeyType};
use crate::normalize;
use crate::record::Record;

pub use builder::ResolverBuilder;
pub use stats::ResolverStats;

/// Owner field used when none is configured.
pub const DEFAULT_OWNER_FIELD: &str = "OwnerId";

/// Owner id prefix used when none is configured.
pub const DEFAULT_PERSON_PREFIX: &str = "person";

/// Which branch produced a record's owner id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Email-only mode: looked up or minted by email.
    EmailMatch,
    /// Phone-only mode: looked up or minted by phone.
    PhoneMatch,
    /// The email was owned and the phone was not; the phone joins the email owner.
    JoinedEmailOwner,
    /// The phone was owned; the email joins the phone owner.
    JoinedPhoneOwner,
    /// Neither key was owned; a new identity was minted.
    TookOwnership,
    /// The record already carried an owner and was left alone.
    Preserved,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EmailMatch => "email_match",
            Self::PhoneMatch => "phone_match",
            Self::JoinedEmailOwner => "joined_email_owner",
            Self::JoinedPhoneOwner => "joined_phone_owner",
            Self::TookOwnership => "took_ownership",
            Self::Preserved => "preserved",
        };
        f.write_str(name)
    }
}

/// Outcome of resolving one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Owner id written to the record.
    pub owner: String,
    /// Branch taken.
    pub decision: Decision,
    /// True if the owner id was minted by this record.
    pub minted: bool,
    /// True if this record moved its email key away from a different owner.
    pub reassigned: bool,
}

fn raw_field<'r>(record: &'r Record, enabled: bool, header: Option<&str>) -> Option<&'r str> {
    if enabled {
        header.and_then(|h| record.get(h))
    } else {
        None
    }
}

/// Normalized keys for the record currently being resolved.
///
/// Built once per record and dropped before the next one.
#[derive(Debug, Default)]
struct RecordKeys {
    email: Option<String>,
    phone: Option<String>,
}

impl RecordKeys {
    fn read(config: &MatchConfig, record: &Record) -> Self {
        Self {
            email: normalize::email(raw_field(record, config.uses_email(), config.email_header())),
            phone: normalize::phone(raw_field(record, config.uses_phone(), config.phone_header())),
        }
    }

    fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

/// Assigns owner ids to an ordered stream of records.
///
/// # Examples
///
/// ```
/// use ownermatch::{MatchConfig, MatchMode, OwnershipResolver, Record};
///
/// let headers = ["OwnerId", "Email"];
/// let config = MatchConfig::new(MatchMode::Email, headers)?;
/// let mut resolver = OwnershipResolver::new(config);
///
/// let owners: Vec<String> = ["a@x.com", "A@X.COM ", "b@x.com"]
///     .into_iter()
///     .map(|email| {
///         let mut record = Record::from_row(&headers, &["", email]);
///         resolver.resolve(&mut record).owner
///     })
///     .collect();
///
/// assert_eq!(owners, ["person1", "person1", "person2"]);
/// # Ok::<(), ownermatch::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct OwnershipResolver {
    config: MatchConfig,
    index: IdentityIndex,
    owner_field: String,
    preserve_existing_owner: bool,
    stats: ResolverStats,
}

impl OwnershipResolver {
    /// Creates a resolver with the default owner field and id prefix.
    #[must_use]
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            index: IdentityIndex::new(DEFAULT_PERSON_PREFIX),
            owner_field: DEFAULT_OWNER_FIELD.to_string(),
            preserve_existing_owner: false,
            stats: ResolverStats::default(),
        }
    }

    /// Returns a builder for a customized resolver.
    #[must_use]
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// Creates a resolver for a header row, using its first column as the owner field.
    ///
    /// # Errors
    /// - `UnsupportedMatchMode`: if `mode` is not a supported mode
    /// - `EmptyHeaders`: if `headers` is empty
    /// - `EmptyOwnerField`: if the first header is blank
    pub fn for_headers<S: AsRef<str>>(mode: &str, headers: &[S]) -> ConfigResult<Self> {
        let mode: MatchMode = mode.parse()?;
        let first = headers.first().ok_or(ConfigError::EmptyHeaders)?;
        let owner_field = first.as_ref().to_string();
        let config = MatchConfig::new(mode, headers.iter().map(|h| h.as_ref().to_string()))?;

        Self::builder()
            .config(config)
            .owner_field(owner_field)
            .build()
    }

    pub(crate) fn from_parts(
        config: MatchConfig,
        owner_field: String,
        id_prefix: String,
        preserve_existing_owner: bool,
    ) -> Self {
        Self {
            config,
            index: IdentityIndex::new(id_prefix),
            owner_field,
            preserve_existing_owner,
            stats: ResolverStats::default(),
        }
    }

    /// The match configuration in use.
    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Name of the field owner ids are written to.
    #[must_use]
    pub fn owner_field(&self) -> &str {
        &self.owner_field
    }

    /// Read-only view of the identity index.
    #[must_use]
    pub const fn index(&self) -> &IdentityIndex {
        &self.index
    }

    /// Counters accumulated since construction or the last reset.
    #[must_use]
    pub const fn stats(&self) -> ResolverStats {
        self.stats
    }

    /// Clears the index and counters. Only call between independent streams.
    pub fn reset(&mut self) {
        self.index.reset();
        self.stats = ResolverStats::default();
    }

    /// Resolves one record and writes its owner id into the owner field.
    pub fn resolve(&mut self, record: &mut Record) -> Resolution {
        let resolution = match self.preserved_owner(record) {
            Some(owner) => Resolution {
                owner,
                decision: Decision::Preserved,
                minted: false,
                reassigned: false,
            },
            None => {
                let keys = RecordKeys::read(&self.config, record);
                let resolution = self.decide(&keys);
                record.set(&self.owner_field, resolution.owner.as_str());
                resolution
            }
        };

        self.stats.observe(&resolution);
        tracing::debug!(
            owner = %resolution.owner,
            decision = %resolution.decision,
            minted = resolution.minted,
            "resolved record"
        );
        resolution
    }

    /// Resolves `record` and returns it with the owner field populated.
    #[must_use]
    pub fn resolve_record(&mut self, mut record: Record) -> Record {
        self.resolve(&mut record);
        record
    }

    /// Resolves every record in order and returns them in the same order.
    pub fn resolve_all<I>(&mut self, records: I) -> Vec<Record>
    where
        I: IntoIterator<Item = Record>,
    {
        let resolved: Vec<Record> = records
            .into_iter()
            .map(|record| self.resolve_record(record))
            .collect();

        let stats = self.stats;
        tracing::info!(
            mode = %self.config.mode(),
            records = stats.records,
            minted = stats.minted,
            matched = stats.matched,
            reassigned = stats.reassigned,
            preserved = stats.preserved,
            "resolved record stream"
        );
        resolved
    }

    fn preserved_owner(&self, record: &Record) -> Option<String> {
        if !self.preserve_existing_owner || self.config.mode() != MatchMode::EmailOrPhone {
            return None;
        }
        record
            .get(&self.owner_field)
            .filter(|owner| !owner.is_empty())
            .map(str::to_string)
    }

    fn decide(&mut self, keys: &RecordKeys) -> Resolution {
        match self.config.mode() {
            MatchMode::Email => self.match_single(keys.email(), &KeyType::Email, Decision::EmailMatch),
            MatchMode::Phone => self.match_single(keys.phone(), &KeyType::Phone, Decision::PhoneMatch),
            MatchMode::EmailOrPhone => self.match_either(keys),
        }
    }

    fn match_single(&mut self, key: Option<&str>, kind: &KeyType, decision: Decision) -> Resolution {
        let before = self.index.counter();
        let owner = self.index.get_or_create(key, kind);
        Resolution {
            owner,
            decision,
            minted: self.index.counter() != before,
            reassigned: false,
        }
    }

    // Phone ownership takes precedence over email ownership. The order of the
    // arms below is the merge policy.
    fn match_either(&mut self, keys: &RecordKeys) -> Resolution {
        let email_owner = self.index.lookup(keys.email(), &KeyType::Email);
        let phone_owner = self.index.lookup(keys.phone(), &KeyType::Phone);

        match (email_owner, phone_owner) {
            (Some(owner), None) => {
                self.index.force_set(keys.phone(), &owner, &KeyType::Phone);
                Resolution {
                    owner,
                    decision: Decision::JoinedEmailOwner,
                    minted: false,
                    reassigned: false,
                }
            }
            (email_owner, Some(owner)) => {
                let reassigned = email_owner.as_ref().is_some_and(|prev| *prev != owner);
                if reassigned {
                    tracing::debug!(
                        key_type = %KeyType::Email,
                        from = ?email_owner,
                        to = %owner,
                        "email key moved to phone owner"
                    );
                }
                self.index.force_set(keys.email(), &owner, &KeyType::Email);
                Resolution {
                    owner,
                    decision: Decision::JoinedPhoneOwner,
                    minted: false,
                    reassigned,
                }
            }
            (None, None) => Resolution {
                owner: self.take_ownership(keys),
                decision: Decision::TookOwnership,
                minted: true,
                reassigned: false,
            },
        }
    }

    fn take_ownership(&mut self, keys: &RecordKeys) -> String {
        match (keys.email(), keys.phone()) {
            (None, None) => self.index.get_or_create(None, &KeyType::Email),
            (Some(email), None) => self.index.get_or_create(Some(email), &KeyType::Email),
            (None, Some(phone)) => self.index.get_or_create(Some(phone), &KeyType::Phone),
            (Some(email), Some(phone)) => {
                let owner = self.index.get_or_create(Some(email), &KeyType::Email);
                self.index.force_set(Some(phone), &owner, &KeyType::Phone);
                owner
            }
        }
    }
}
