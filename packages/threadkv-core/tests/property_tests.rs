use proptest::prelude::*;
use threadkv_core::{InMemoryNodeStore, KvClient};

proptest! {
    #[test]
    fn root_level_appends_read_back_in_order(
        values in prop::collection::vec("[a-z]{1,8}", 0..6),
    ) {
        let mut kv = KvClient::new(InMemoryNodeStore::new(), "testdb");
        kv.set("k", "root").unwrap();
        for value in &values {
            kv.append("k", value, None).unwrap();
        }

        let tree = kv.get("k").unwrap();
        prop_assert_eq!(&tree.value, "root");
        let read: Vec<_> = tree.children.iter().map(|c| c.value.clone()).collect();
        prop_assert_eq!(read, values);

        // Reading again must be structurally identical.
        prop_assert_eq!(kv.get("k").unwrap(), tree);
    }

    #[test]
    fn set_get_round_trips_arbitrary_scalars(
        key in "[a-zA-Z0-9 _.-]{1,24}",
        value in ".{0,64}",
    ) {
        let mut kv = KvClient::new(InMemoryNodeStore::new(), "testdb");
        kv.set(&key, &value).unwrap();

        let tree = kv.get(&key).unwrap();
        prop_assert_eq!(tree.value, value);
        prop_assert!(tree.children.is_empty());
    }

    #[test]
    fn chained_appends_always_address_an_existing_node(
        depth in 1usize..6,
    ) {
        let mut kv = KvClient::new(InMemoryNodeStore::new(), "testdb");
        kv.set("k", "0").unwrap();

        // Always append under the node created by the previous step, so the
        // raw structure stays a single chain addressed by all-zero paths.
        for i in 1..=depth {
            let path = vec![0usize; i];
            kv.append("k", &i.to_string(), Some(&path)).unwrap();
        }

        let mut node = kv.get("k").unwrap();
        let mut count = 0usize;
        while let Some(next) = node.children.into_iter().next() {
            count += 1;
            node = next;
        }
        prop_assert_eq!(count, depth);
    }
}
