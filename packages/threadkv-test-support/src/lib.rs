#![forbid(unsafe_code)]
//! Conformance checks for [`NodeStore`] backends. Each check takes a fresh
//! store and panics on a contract violation, so adapter crates can run the
//! whole suite from a single test:
//!
//! ```
//! use threadkv_core::InMemoryNodeStore;
//! threadkv_test_support::run_conformance_suite(InMemoryNodeStore::new);
//! ```

use threadkv_core::{Error, NodeStore, ParentRef};

const NS: &str = "conformance";

/// Runs every check against freshly made stores.
pub fn run_conformance_suite<S: NodeStore>(mut make: impl FnMut() -> S) {
    check_create_then_list(&mut make());
    check_list_respects_limit(&mut make());
    check_list_is_scoped_to_namespace(&mut make());
    check_search_returns_exact_matches(&mut make());
    check_replies_preserve_attachment_order(&mut make());
    check_replies_materialize_full_depth(&mut make());
    check_delete_removes_the_root(&mut make());
    check_delete_cascades_below_the_root(&mut make());
    check_missing_refs_are_backend_errors(&mut make());
}

pub fn check_create_then_list<S: NodeStore>(store: &mut S) {
    let id = store.create_root(NS, "key", "").expect("create_root");
    let roots = store.list_roots(NS, 100).expect("list_roots");
    assert!(
        roots.iter().any(|r| r.id == id && r.title == "key"),
        "a created root must appear in list_roots with its title"
    );
}

pub fn check_list_respects_limit<S: NodeStore>(store: &mut S) {
    for i in 0..4 {
        store.create_root(NS, &format!("key{i}"), "").expect("create_root");
    }
    let roots = store.list_roots(NS, 2).expect("list_roots");
    assert_eq!(roots.len(), 2, "list_roots must honor the limit");
}

pub fn check_list_is_scoped_to_namespace<S: NodeStore>(store: &mut S) {
    store.create_root(NS, "here", "").expect("create_root");
    store.create_root("elsewhere", "there", "").expect("create_root");
    let roots = store.list_roots(NS, 100).expect("list_roots");
    assert!(
        roots.iter().all(|r| r.title != "there"),
        "list_roots must not leak roots from other namespaces"
    );
}

pub fn check_search_returns_exact_matches<S: NodeStore>(store: &mut S) {
    let id = store.create_root(NS, "needle", "").expect("create_root");
    let hits = store.search_roots(NS, "needle").expect("search_roots");
    // Search may be approximate, but an exact match it does return must
    // carry the right title and ref.
    for hit in &hits {
        if hit.id == id {
            assert_eq!(hit.title, "needle");
            return;
        }
    }
    panic!("search_roots returned no candidate for an exact title");
}

pub fn check_replies_preserve_attachment_order<S: NodeStore>(store: &mut S) {
    let root = store.create_root(NS, "key", "").expect("create_root");
    let parent = ParentRef::Root(root.clone());
    for text in ["a", "b", "c"] {
        store.attach_child(&parent, text).expect("attach_child");
    }
    let replies = store.replies(&root).expect("replies");
    let texts: Vec<_> = replies.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(texts, ["a", "b", "c"], "reply order must be insertion order");
}

pub fn check_replies_materialize_full_depth<S: NodeStore>(store: &mut S) {
    let root = store.create_root(NS, "key", "").expect("create_root");
    let top = store
        .attach_child(&ParentRef::Root(root.clone()), "top")
        .expect("attach_child");
    let mid = store
        .attach_child(&ParentRef::Child(top), "mid")
        .expect("attach_child");
    store
        .attach_child(&ParentRef::Child(mid), "leaf")
        .expect("attach_child");

    let replies = store.replies(&root).expect("replies");
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].children[0].text, "mid");
    assert_eq!(
        replies[0].children[0].children[0].text, "leaf",
        "replies must come back nested to full depth in one call"
    );
}

pub fn check_delete_removes_the_root<S: NodeStore>(store: &mut S) {
    let id = store.create_root(NS, "doomed", "").expect("create_root");
    store.delete_root(&id).expect("delete_root");
    let roots = store.list_roots(NS, 100).expect("list_roots");
    assert!(roots.iter().all(|r| r.id != id), "deleted roots must not list");
}

pub fn check_delete_cascades_below_the_root<S: NodeStore>(store: &mut S) {
    let root = store.create_root(NS, "doomed", "").expect("create_root");
    let child = store
        .attach_child(&ParentRef::Root(root.clone()), "top")
        .expect("attach_child");
    store.delete_root(&root).expect("delete_root");

    // The subtree must be gone as a backend-side cascade: a stale child ref
    // is no longer attachable.
    let err = store
        .attach_child(&ParentRef::Child(child), "orphan")
        .expect_err("attaching under a cascaded-away node must fail");
    assert!(matches!(err, Error::Backend(_)));
}

pub fn check_missing_refs_are_backend_errors<S: NodeStore>(store: &mut S) {
    let phantom = store.create_root(NS, "phantom", "").expect("create_root");
    store.delete_root(&phantom).expect("delete_root");

    assert!(matches!(store.delete_root(&phantom), Err(Error::Backend(_))));
    assert!(matches!(store.replies(&phantom), Err(Error::Backend(_))));
    assert!(matches!(
        store.attach_child(&ParentRef::Root(phantom), "x"),
        Err(Error::Backend(_))
    ));
}
