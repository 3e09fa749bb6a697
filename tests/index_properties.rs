use ownermatch::{IdentityIndex, KeyType, MatchConfig, MatchMode, OwnershipResolver, Record};
use proptest::prelude::*;

fn kind_strategy() -> impl Strategy<Value = KeyType> {
    prop_oneof![
        Just(KeyType::Email),
        Just(KeyType::Phone),
        "[a-z]{1,6}".prop_map(KeyType::Custom),
    ]
}

proptest! {
    #[test]
    fn repeated_get_or_create_is_stable(key in "[a-z0-9@.]{1,12}", kind in kind_strategy()) {
        let mut index = IdentityIndex::new("person");
        let first = index.get_or_create(Some(key.as_str()), &kind);
        let counter = index.counter();
        let second = index.get_or_create(Some(key.as_str()), &kind);
        prop_assert_eq!(first, second);
        prop_assert_eq!(index.counter(), counter);
    }

    #[test]
    fn empty_keys_are_never_cached(calls in 1usize..20, kind in kind_strategy()) {
        let mut index = IdentityIndex::new("person");
        for n in 1..=calls {
            let key = if n % 2 == 0 { Some("") } else { None };
            prop_assert_eq!(index.get_or_create(key, &kind), format!("person{n}"));
        }
        prop_assert!(index.is_empty());
    }

    #[test]
    fn counter_is_shared_across_types(
        keys in prop::collection::hash_set("[a-z]{1,8}", 1..16),
    ) {
        let mut index = IdentityIndex::new("person");
        for (n, key) in keys.iter().enumerate() {
            let kind = if n % 2 == 0 { KeyType::Email } else { KeyType::Phone };
            prop_assert_eq!(index.get_or_create(Some(key.as_str()), &kind), format!("person{}", n + 1));
        }
    }

    #[test]
    fn force_set_overwrites_silently(
        key in "[a-z]{1,8}",
        prior in 1u64..100,
        forced in 1u64..100,
        kind in kind_strategy(),
    ) {
        let mut index = IdentityIndex::new("person");
        index.force_set(Some(key.as_str()), &format!("person{prior}"), &kind);
        index.force_set(Some(key.as_str()), &format!("person{forced}"), &kind);
        let expected = format!("person{forced}");
        prop_assert_eq!(index.lookup(Some(key.as_str()), &kind), Some(expected));
        prop_assert_eq!(index.counter(), 0);
    }

    #[test]
    fn resolution_is_deterministic(
        rows in prop::collection::vec(("[ab]?@x", "(555-000-000[0-3])?"), 0..40),
    ) {
        let headers = ["OwnerId", "Email", "Phone"];
        let records: Vec<Record> = rows
            .iter()
            .map(|(email, phone)| Record::from_row(&headers, &["", email.as_str(), phone.as_str()]))
            .collect();

        let config = MatchConfig::new(MatchMode::EmailOrPhone, headers).unwrap();
        let mut resolver = OwnershipResolver::new(config);
        let first = resolver.resolve_all(records.clone());
        resolver.reset();
        let second = resolver.resolve_all(records);
        prop_assert_eq!(first, second);
    }
}
