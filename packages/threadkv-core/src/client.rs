use crate::codec::{merge_replies, ValueTree};
use crate::error::{Error, Result};
use crate::ids::ParentRef;
use crate::path;
use crate::store::{NodeStore, RootSummary};

/// Upper bound on roots fetched by [`KvClient::keys`]. The backend may hold
/// more; this client does not follow further pages.
pub const LIST_LIMIT: usize = 100;

/// Key/value facade over a [`NodeStore`]. One key maps to one root node by
/// exact title; the value is the merged tree of that root's replies,
/// recomputed on every read.
///
/// Every operation is a sequence of independent backend calls with no
/// locking or retry around it, so concurrent actors on the same key can
/// interleave: overwrites are last-write-wins and a key being overwritten
/// can read as briefly absent.
pub struct KvClient<S: NodeStore> {
    store: S,
    namespace: String,
}

impl<S: NodeStore> KvClient<S> {
    pub fn new(store: S, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Creates or overwrites `key` with a scalar value. An existing root is
    /// deleted first; delete and create are separate backend calls, so a
    /// create failure after the delete leaves the key absent, not restored.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(existing) = self.find_root(key)? {
            self.store.delete_root(&existing.id)?;
        }
        let root = self.store.create_root(&self.namespace, key, "")?;
        self.store.attach_child(&ParentRef::Root(root), value)?;
        Ok(())
    }

    /// Returns the merged value tree for `key`. A root with zero replies is
    /// indistinguishable from an absent key and also reads as
    /// [`Error::KeyNotFound`].
    pub fn get(&self, key: &str) -> Result<ValueTree> {
        let root = self.require_root(key)?;
        let replies = self.store.replies(&root.id)?;
        merge_replies(&replies).ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// Appends `value` to an existing key's tree. With no parent path the
    /// reply attaches directly to the root and becomes a new top-level
    /// sibling, which the merge rule folds in on the next read. A non-empty
    /// path addresses a node in the raw reply structure and the reply nests
    /// beneath it. An empty path behaves like an absent one; the two stay
    /// distinct in the signature.
    pub fn append(&mut self, key: &str, value: &str, parent: Option<&[usize]>) -> Result<()> {
        let root = self.require_root(key)?;
        let target = match parent {
            None | Some([]) => ParentRef::Root(root.id),
            Some(indices) => {
                let replies = self.store.replies(&root.id)?;
                let node = path::resolve(&replies, indices)?;
                ParentRef::Child(node.id.clone())
            }
        };
        self.store.attach_child(&target, value)?;
        Ok(())
    }

    /// Removes `key` and its whole tree. The backend cascades the delete to
    /// every reply beneath the root.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        let root = self.require_root(key)?;
        self.store.delete_root(&root.id)
    }

    /// Lists up to [`LIST_LIMIT`] keys in the namespace, in backend order.
    pub fn keys(&self) -> Result<Vec<String>> {
        let roots = self.store.list_roots(&self.namespace, LIST_LIMIT)?;
        Ok(roots.into_iter().map(|root| root.title).collect())
    }

    /// True iff an exact-title lookup finds a root for `key`.
    pub fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.find_root(key)?.is_some())
    }

    /// Exact key lookup over the backend's approximate search. The search
    /// result is only a candidate set; the first exact title match wins. A
    /// backend whose search misses the matching root makes the key read as
    /// absent, and with duplicate titles whichever candidate the backend
    /// returned first is authoritative.
    fn find_root(&self, key: &str) -> Result<Option<RootSummary>> {
        let candidates = self.store.search_roots(&self.namespace, key)?;
        Ok(candidates.into_iter().find(|c| c.title == key))
    }

    fn require_root(&self, key: &str) -> Result<RootSummary> {
        self.find_root(key)?
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }
}
