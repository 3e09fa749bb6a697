//! Type-scoped key-to-id index.
//!
//! The index maps `(KeyType, key)` to an owner id drawn from a single counter
//! shared by every key type. Ids are rendered as `<prefix><n>` with no
//! separator.
//!
//! Two write paths exist and are kept apart on purpose:
//! - [`IdentityIndex::get_or_create`] mints a new id on a miss.
//! - [`IdentityIndex::force_set`] records an existing id under a key,
//!   overwriting whatever that key held before. This is the merge primitive.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::identity::KeyType;

/// Prefix used by [`IdentityIndex::default`].
pub const DEFAULT_ID_PREFIX: &str = "record";

/// A stored id.
///
/// Ids minted by the index, or forced with this index's prefix followed by a
/// number, are kept as numbers. Anything else handed to `force_set` is kept
/// verbatim and rendered back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum IdValue {
    Number(u64),
    Verbatim(String),
}

/// Key-to-id index with a shared, monotonically increasing counter.
///
/// # Examples
///
/// ```
/// use ownermatch::{IdentityIndex, KeyType};
///
/// let mut index = IdentityIndex::new("person");
/// assert_eq!(index.get_or_create(Some("a@x.com"), &KeyType::Email), "person1");
/// assert_eq!(index.get_or_create(Some("555-111-4444"), &KeyType::Phone), "person2");
/// assert_eq!(index.get_or_create(Some("a@x.com"), &KeyType::Email), "person1");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "IndexSnapshot")]
pub struct IdentityIndex {
    prefix: String,
    counter: u64,
    entries: HashMap<KeyType, HashMap<String, IdValue>>,
}

/// Unvalidated index state as read from a snapshot.
#[derive(Deserialize)]
struct IndexSnapshot {
    prefix: String,
    counter: u64,
    entries: HashMap<KeyType, HashMap<String, IdValue>>,
}

impl TryFrom<IndexSnapshot> for IdentityIndex {
    type Error = String;

    // The counter must cover every stored number, or the next mint reuses an id.
    fn try_from(snapshot: IndexSnapshot) -> Result<Self, Self::Error> {
        let highest = snapshot
            .entries
            .values()
            .flat_map(HashMap::values)
            .filter_map(|value| match value {
                IdValue::Number(n) => Some(*n),
                IdValue::Verbatim(_) => None,
            })
            .max()
            .unwrap_or(0);
        if snapshot.counter < highest {
            return Err(format!(
                "counter {} is behind stored id {}{highest}",
                snapshot.counter, snapshot.prefix
            ));
        }
        Ok(Self {
            prefix: snapshot.prefix,
            counter: snapshot.counter,
            entries: snapshot.entries,
        })
    }
}

impl Default for IdentityIndex {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PREFIX)
    }
}

fn usable(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.is_empty())
}

impl IdentityIndex {
    /// Creates an empty index rendering ids with `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
            entries: HashMap::new(),
        }
    }

    /// Returns the id prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the last number minted (0 before the first mint).
    #[must_use]
    pub const fn counter(&self) -> u64 {
        self.counter
    }

    /// Number of stored entries across all key types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// Returns true if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the id stored for `(kind, key)`, minting one on a miss.
    ///
    /// A miss always advances the counter. The new id is stored only for a
    /// non-empty key, so absent and empty keys never match anything, not even
    /// each other.
    pub fn get_or_create(&mut self, key: Option<&str>, kind: &KeyType) -> String {
        if let Some(existing) = self.lookup(key, kind) {
            return existing;
        }

        self.counter += 1;
        let minted = self.counter;

        if let Some(key) = usable(key) {
            self.store(kind, key, IdValue::Number(minted));
        }

        self.render(&IdValue::Number(minted))
    }

    /// Records `id` under `(kind, key)`, replacing any previous mapping.
    ///
    /// No-op for an absent or empty key. Never touches the counter.
    pub fn force_set(&mut self, key: Option<&str>, id: &str, kind: &KeyType) {
        let Some(key) = usable(key) else {
            return;
        };
        let value = self.extract_numeric(id);
        self.store(kind, key, value);
    }

    /// Returns the id stored for `(kind, key)` without creating anything.
    #[must_use]
    pub fn lookup(&self, key: Option<&str>, kind: &KeyType) -> Option<String> {
        let key = usable(key)?;
        self.entries
            .get(kind)
            .and_then(|by_key| by_key.get(key))
            .map(|value| self.render(value))
    }

    /// Returns true if `(kind, key)` has a stored mapping.
    #[must_use]
    pub fn contains(&self, key: Option<&str>, kind: &KeyType) -> bool {
        usable(key).is_some_and(|key| {
            self.entries
                .get(kind)
                .is_some_and(|by_key| by_key.contains_key(key))
        })
    }

    /// Clears every entry and restarts the counter. Only for a fresh run.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.counter = 0;
        tracing::debug!(prefix = %self.prefix, "identity index reset");
    }

    fn store(&mut self, kind: &KeyType, key: &str, value: IdValue) {
        self.entries
            .entry(kind.clone())
            .or_default()
            .insert(key.to_string(), value);
    }

    fn extract_numeric(&self, id: &str) -> IdValue {
        id.strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.parse::<u64>().ok())
            .map_or_else(|| IdValue::Verbatim(id.to_string()), IdValue::Number)
    }

    fn render(&self, value: &IdValue) -> String {
        match value {
            IdValue::Number(n) => format!("{}{n}", self.prefix),
            IdValue::Verbatim(raw) => raw.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_kind() -> KeyType {
        KeyType::Custom("test".to_string())
    }

    #[test]
    fn test_contains_after_create() {
        let mut index = IdentityIndex::default();
        index.get_or_create(Some("test"), &test_kind());
        assert!(index.contains(Some("test"), &test_kind()));
    }

    #[test]
    fn test_contains_unseen() {
        let index = IdentityIndex::default();
        assert!(!index.contains(Some("test"), &test_kind()));
        assert!(!index.contains(None, &test_kind()));
    }

    #[test]
    fn test_new_key_gets_first_id() {
        let mut index = IdentityIndex::default();
        assert_eq!(index.get_or_create(Some("new-string"), &test_kind()), "record1");
    }

    #[test]
    fn test_seen_key_returns_its_id() {
        let mut index = IdentityIndex::default();
        for s in ["sample", "test", "new-string", "values"] {
            index.get_or_create(Some(s), &test_kind());
        }
        assert_eq!(index.get_or_create(Some("new-string"), &test_kind()), "record3");
        assert_eq!(index.counter(), 4);
    }

    #[test]
    fn test_custom_prefix() {
        let mut index = IdentityIndex::new("test_prefix");
        assert_eq!(index.get_or_create(Some("new-string"), &test_kind()), "test_prefix1");
        assert_eq!(index.prefix(), "test_prefix");
    }

    #[test]
    fn test_empty_and_absent_keys_mint_fresh_ids() {
        let mut index = IdentityIndex::default();
        assert_eq!(index.get_or_create(Some(""), &KeyType::Email), "record1");
        assert_eq!(index.get_or_create(None, &KeyType::Email), "record2");
        assert_eq!(index.get_or_create(Some(""), &KeyType::Email), "record3");
        assert!(index.is_empty());
    }

    #[test]
    fn test_counter_is_shared_across_types() {
        let mut index = IdentityIndex::new("person");
        assert_eq!(index.get_or_create(Some("a"), &KeyType::Email), "person1");
        assert_eq!(index.get_or_create(Some("b"), &KeyType::Phone), "person2");
        // Same key string under a different type is a different entry.
        assert_eq!(index.get_or_create(Some("a"), &KeyType::Phone), "person3");
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_force_set_verbatim_id() {
        let mut index = IdentityIndex::default();
        index.force_set(Some("email@example.com"), "existing_id", &test_kind());
        assert_eq!(
            index.lookup(Some("email@example.com"), &test_kind()).as_deref(),
            Some("existing_id")
        );
    }

    #[test]
    fn test_force_set_overwrites_and_keeps_counter() {
        let mut index = IdentityIndex::new("person");
        index.get_or_create(Some("a@x.com"), &KeyType::Email);
        index.get_or_create(Some("b@x.com"), &KeyType::Email);

        index.force_set(Some("a@x.com"), "person2", &KeyType::Email);

        assert_eq!(index.lookup(Some("a@x.com"), &KeyType::Email).as_deref(), Some("person2"));
        assert_eq!(index.counter(), 2);
        assert_eq!(index.get_or_create(Some("c@x.com"), &KeyType::Email), "person3");
    }

    #[test]
    fn test_force_set_ignores_empty_key() {
        let mut index = IdentityIndex::new("person");
        index.force_set(Some(""), "person1", &KeyType::Phone);
        index.force_set(None, "person1", &KeyType::Phone);
        assert!(index.is_empty());
    }

    #[test]
    fn test_force_set_records_id_under_other_type() {
        let mut index = IdentityIndex::new("person");
        let owner = index.get_or_create(Some("a@x.com"), &KeyType::Email);
        index.force_set(Some("555-111-4444"), &owner, &KeyType::Phone);
        assert_eq!(index.lookup(Some("555-111-4444"), &KeyType::Phone), Some(owner));
    }

    #[test]
    fn test_lookup_does_not_mint() {
        let index = IdentityIndex::default();
        assert_eq!(index.lookup(Some("missing"), &KeyType::Email), None);
        assert_eq!(index.counter(), 0);
    }

    #[test]
    fn test_reset() {
        let mut index = IdentityIndex::default();
        index.get_or_create(Some("a"), &KeyType::Email);
        index.get_or_create(Some("b"), &KeyType::Phone);
        index.reset();
        assert!(index.is_empty());
        assert_eq!(index.counter(), 0);
        assert_eq!(index.get_or_create(Some("b"), &KeyType::Phone), "record1");
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut index = IdentityIndex::new("person");
        index.get_or_create(Some("a@x.com"), &KeyType::Email);
        index.force_set(Some("555-111-4444"), "legacy-7", &KeyType::Phone);

        let json = serde_json::to_string(&index).unwrap();
        let back: IdentityIndex = serde_json::from_str(&json).unwrap();

        assert_eq!(back.counter(), 1);
        assert_eq!(back.lookup(Some("a@x.com"), &KeyType::Email).as_deref(), Some("person1"));
        assert_eq!(
            back.lookup(Some("555-111-4444"), &KeyType::Phone).as_deref(),
            Some("legacy-7")
        );
    }

    #[test]
    fn test_snapshot_with_stale_counter_rejected() {
        let json = r#"{"prefix":"person","counter":0,"entries":{"email":{"a@x.com":1}}}"#;
        let err = serde_json::from_str::<IdentityIndex>(json).unwrap_err();
        assert!(err.to_string().contains("counter 0 is behind stored id person1"));
    }

    #[test]
    fn test_restored_index_keeps_minting_fresh_ids() {
        let json = r#"{"prefix":"person","counter":3,"entries":{"email":{"a@x.com":3},"phone":{"555-111-4444":"legacy-9"}}}"#;
        let mut index: IdentityIndex = serde_json::from_str(json).unwrap();
        assert_eq!(index.get_or_create(Some("b@x.com"), &KeyType::Email), "person4");
        assert_eq!(index.get_or_create(Some("a@x.com"), &KeyType::Email), "person3");
    }
}
