//! # ownermatch - Incremental owner identity resolution
//!
//! ownermatch assigns a stable owner id to every record of an ordered stream,
//! matching records on an email field, a phone field, or either. Records that
//! share a normalized key share an owner; in email-or-phone mode, ownership
//! propagates transitively across the two key families.
//!
//! ## Core Concepts
//!
//! - **Key**: a normalized email (`a@x.com`) or phone (`555-123-4567`) value
//! - **IdentityIndex**: type-scoped key-to-id map with one shared counter
//! - **OwnershipResolver**: per-record decision logic with forward-only merges
//! - **MatchConfig**: the match mode plus the headers that supply each key
//!
//! Resolution is single-pass and order-dependent. Earlier decisions are never
//! revisited, and the same input in the same order always yields the same ids.
//!
//! ## Usage
//!
//! ```rust
//! use ownermatch::{MatchConfig, MatchMode, OwnershipResolver, Record};
//!
//! let headers = ["OwnerId", "Email", "Phone"];
//! let config = MatchConfig::new(MatchMode::EmailOrPhone, headers)?;
//! let mut resolver = OwnershipResolver::new(config);
//!
//! let out = resolver.resolve_all([
//!     Record::from_row(&headers, &["", "a@x.com", "555-123-4567"]),
//!     Record::from_row(&headers, &["", "b@x.com", "(555) 123-4567"]),
//!     Record::from_row(&headers, &["", "B@X.com", ""]),
//! ]);
//!
//! let owners: Vec<_> = out.iter().filter_map(|r| r.get("OwnerId")).collect();
//! assert_eq!(owners, ["person1", "person1", "person1"]);
//! # Ok::<(), ownermatch::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod identity;
pub mod normalize;
pub mod record;
pub mod resolver;

// Re-export primary types at crate root for convenience
pub use config::{MatchConfig, MatchMode};
pub use error::{ConfigError, ConfigResult};
pub use identity::{IdentityIndex, KeyType};
pub use record::Record;
pub use resolver::{Decision, OwnershipResolver, Resolution, ResolverBuilder, ResolverStats};
