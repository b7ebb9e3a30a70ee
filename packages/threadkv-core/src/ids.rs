#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque backend handle for a root node (a topic). Backed by a string to
/// support arbitrary backend identifier formats.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RootId(pub String);

impl RootId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque backend handle for a reply node attached beneath a root.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChildId(pub String);

impl ChildId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Attachment target for a new reply. Tagged so the node kind never has to
/// be inferred from identifier formats.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParentRef {
    Root(RootId),
    Child(ChildId),
}
