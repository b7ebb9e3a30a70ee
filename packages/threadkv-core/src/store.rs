use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};
use crate::ids::{ChildId, ParentRef, RootId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A reply node as materialized by the backend: text plus nested replies.
/// Children are in insertion order, and that order is what index paths
/// address.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    pub id: ChildId,
    pub text: String,
    pub children: Vec<Node>,
}

/// Listing and search result: enough to address a root and read its key.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RootSummary {
    pub id: RootId,
    pub title: String,
}

/// Backend contract the engine builds on. Each method is an independent
/// call with no atomicity across calls; implementations surface every
/// failure as [`Error::Backend`] and never retry.
pub trait NodeStore {
    /// Creates a root node in `namespace`. Does not check for an existing
    /// title; key uniqueness is the caller's concern.
    fn create_root(&mut self, namespace: &str, title: &str, body: &str) -> Result<RootId>;

    /// Attaches a reply under a root or under another reply.
    fn attach_child(&mut self, parent: &ParentRef, text: &str) -> Result<ChildId>;

    /// Deletes a root. The backend cascades the delete to every node
    /// beneath it; callers never delete replies individually.
    fn delete_root(&mut self, root: &RootId) -> Result<()>;

    /// Returns the root's top-level replies, each fully populated with its
    /// own nested replies in one call.
    fn replies(&self, root: &RootId) -> Result<Vec<Node>>;

    /// Lists up to `limit` roots in the namespace, in backend order (not
    /// guaranteed to be insertion order).
    fn list_roots(&self, namespace: &str, limit: usize) -> Result<Vec<RootSummary>>;

    /// Best-effort title search. The result is a candidate set: possibly
    /// fuzzy, possibly incomplete. Callers must filter for exact matches
    /// locally and tolerate a matching root missing from the results.
    fn search_roots(&self, namespace: &str, query: &str) -> Result<Vec<RootSummary>>;
}

#[derive(Debug, Default)]
struct RootRecord {
    namespace: String,
    title: String,
    children: Vec<ChildId>,
}

#[derive(Debug, Default)]
struct NodeRecord {
    text: String,
    children: Vec<ChildId>,
}

#[derive(Debug, Default)]
struct StoreState {
    roots: HashMap<RootId, RootRecord>,
    nodes: HashMap<ChildId, NodeRecord>,
    concealed: HashSet<RootId>,
    next_id: u64,
}

impl StoreState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn materialize(&self, id: &ChildId) -> Node {
        let record = &self.nodes[id];
        Node {
            id: id.clone(),
            text: record.text.clone(),
            children: record.children.iter().map(|c| self.materialize(c)).collect(),
        }
    }

    /// Removes a subtree from the node table, mimicking the backend-side
    /// cascade that accompanies a root delete.
    fn cascade_delete(&mut self, start: Vec<ChildId>) {
        let mut pending = start;
        while let Some(id) = pending.pop() {
            if let Some(record) = self.nodes.remove(&id) {
                pending.extend(record.children);
            }
        }
    }
}

/// In-memory reference backend. One exclusive lock guards all state, and the
/// handle is cheap to clone so several clients can act against the same
/// store, the way independent actors hit a shared real backend.
///
/// `search_roots` here scans for exact title equality, which is stronger
/// than a real backend's approximate search; use [`conceal_from_search`]
/// to exercise the gap where search misses a root that listing still shows.
///
/// [`conceal_from_search`]: InMemoryNodeStore::conceal_from_search
#[derive(Clone, Debug, Default)]
pub struct InMemoryNodeStore {
    inner: Arc<Mutex<StoreState>>,
}

impl InMemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hides a root from `search_roots` without removing it, simulating a
    /// backend whose search fails to return a matching root.
    pub fn conceal_from_search(&self, root: &RootId) {
        self.lock().concealed.insert(root.clone());
    }

    /// Number of live roots across all namespaces.
    pub fn root_count(&self) -> usize {
        self.lock().roots.len()
    }

    /// Number of live reply nodes across all roots.
    pub fn node_count(&self) -> usize {
        self.lock().nodes.len()
    }

    /// Drops all state, including the id counter.
    pub fn reset(&self) {
        *self.lock() = StoreState::default();
    }
}

impl NodeStore for InMemoryNodeStore {
    fn create_root(&mut self, namespace: &str, title: &str, _body: &str) -> Result<RootId> {
        let mut state = self.lock();
        let id = RootId::new(format!("root-{}", state.next_id()));
        state.roots.insert(
            id.clone(),
            RootRecord {
                namespace: namespace.to_string(),
                title: title.to_string(),
                children: Vec::new(),
            },
        );
        Ok(id)
    }

    fn attach_child(&mut self, parent: &ParentRef, text: &str) -> Result<ChildId> {
        let mut state = self.lock();
        let id = ChildId::new(format!("node-{}", state.next_id()));
        match parent {
            ParentRef::Root(root) => {
                let record = state
                    .roots
                    .get_mut(root)
                    .ok_or_else(|| Error::Backend(format!("no such root: {}", root.as_str())))?;
                record.children.push(id.clone());
            }
            ParentRef::Child(child) => {
                let record = state
                    .nodes
                    .get_mut(child)
                    .ok_or_else(|| Error::Backend(format!("no such node: {}", child.as_str())))?;
                record.children.push(id.clone());
            }
        }
        state.nodes.insert(
            id.clone(),
            NodeRecord {
                text: text.to_string(),
                children: Vec::new(),
            },
        );
        Ok(id)
    }

    fn delete_root(&mut self, root: &RootId) -> Result<()> {
        let mut state = self.lock();
        let record = state
            .roots
            .remove(root)
            .ok_or_else(|| Error::Backend(format!("no such root: {}", root.as_str())))?;
        state.concealed.remove(root);
        state.cascade_delete(record.children);
        Ok(())
    }

    fn replies(&self, root: &RootId) -> Result<Vec<Node>> {
        let state = self.lock();
        let record = state
            .roots
            .get(root)
            .ok_or_else(|| Error::Backend(format!("no such root: {}", root.as_str())))?;
        Ok(record.children.iter().map(|c| state.materialize(c)).collect())
    }

    fn list_roots(&self, namespace: &str, limit: usize) -> Result<Vec<RootSummary>> {
        let state = self.lock();
        Ok(state
            .roots
            .iter()
            .filter(|(_, record)| record.namespace == namespace)
            .take(limit)
            .map(|(id, record)| RootSummary {
                id: id.clone(),
                title: record.title.clone(),
            })
            .collect())
    }

    fn search_roots(&self, namespace: &str, query: &str) -> Result<Vec<RootSummary>> {
        let state = self.lock();
        Ok(state
            .roots
            .iter()
            .filter(|(id, record)| {
                record.namespace == namespace
                    && record.title == query
                    && !state.concealed.contains(id)
            })
            .map(|(id, record)| RootSummary {
                id: id.clone(),
                title: record.title.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attach(store: &mut InMemoryNodeStore, parent: &ParentRef, text: &str) -> ChildId {
        store.attach_child(parent, text).unwrap()
    }

    #[test]
    fn replies_preserve_insertion_order() {
        let mut store = InMemoryNodeStore::new();
        let root = store.create_root("ns", "key", "").unwrap();
        let parent = ParentRef::Root(root.clone());
        attach(&mut store, &parent, "a");
        attach(&mut store, &parent, "b");
        attach(&mut store, &parent, "c");

        let replies = store.replies(&root).unwrap();
        let texts: Vec<_> = replies.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, ["a", "b", "c"]);
    }

    #[test]
    fn attach_nests_under_replies() {
        let mut store = InMemoryNodeStore::new();
        let root = store.create_root("ns", "key", "").unwrap();
        let top = attach(&mut store, &ParentRef::Root(root.clone()), "top");
        attach(&mut store, &ParentRef::Child(top.clone()), "inner");

        let replies = store.replies(&root).unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].children.len(), 1);
        assert_eq!(replies[0].children[0].text, "inner");
    }

    #[test]
    fn delete_root_cascades_to_all_descendants() {
        let mut store = InMemoryNodeStore::new();
        let root = store.create_root("ns", "key", "").unwrap();
        let top = attach(&mut store, &ParentRef::Root(root.clone()), "top");
        let mid = attach(&mut store, &ParentRef::Child(top), "mid");
        attach(&mut store, &ParentRef::Child(mid), "leaf");
        assert_eq!(store.node_count(), 3);

        store.delete_root(&root).unwrap();
        assert_eq!(store.root_count(), 0);
        assert_eq!(store.node_count(), 0);
    }

    #[test]
    fn delete_missing_root_is_a_backend_error() {
        let mut store = InMemoryNodeStore::new();
        let err = store.delete_root(&RootId::new("root-404")).unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
    }

    #[test]
    fn attach_to_missing_parent_is_a_backend_error() {
        let mut store = InMemoryNodeStore::new();
        let err = store
            .attach_child(&ParentRef::Child(ChildId::new("node-404")), "x")
            .unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
    }

    #[test]
    fn list_roots_is_scoped_to_namespace_and_bounded() {
        let mut store = InMemoryNodeStore::new();
        for i in 0..5 {
            store.create_root("a", &format!("key{i}"), "").unwrap();
        }
        store.create_root("b", "other", "").unwrap();

        assert_eq!(store.list_roots("a", 100).unwrap().len(), 5);
        assert_eq!(store.list_roots("a", 3).unwrap().len(), 3);
        assert_eq!(store.list_roots("b", 100).unwrap().len(), 1);
    }

    #[test]
    fn search_matches_exact_titles_only() {
        let mut store = InMemoryNodeStore::new();
        store.create_root("ns", "alpha", "").unwrap();
        store.create_root("ns", "alphabet", "").unwrap();

        let hits = store.search_roots("ns", "alpha").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "alpha");
    }

    #[test]
    fn concealed_roots_are_listed_but_not_searchable() {
        let mut store = InMemoryNodeStore::new();
        let root = store.create_root("ns", "ghost", "").unwrap();
        store.conceal_from_search(&root);

        assert!(store.search_roots("ns", "ghost").unwrap().is_empty());
        assert_eq!(store.list_roots("ns", 100).unwrap().len(), 1);
    }

    #[test]
    fn cloned_handles_share_state() {
        let mut store = InMemoryNodeStore::new();
        let other = store.clone();
        store.create_root("ns", "key", "").unwrap();
        assert_eq!(other.root_count(), 1);
    }
}
