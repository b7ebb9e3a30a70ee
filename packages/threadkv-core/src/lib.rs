#![forbid(unsafe_code)]
//! Key/value semantics mapped onto a threaded-discussion backend: titles act
//! as keys, reply trees act as values. The backend only offers create, delete,
//! list, and search primitives with no transactions, so this crate stays
//! honest about the weak consistency that falls out of composing them.

pub mod client;
pub mod codec;
pub mod error;
pub mod ids;
pub mod path;
pub mod store;

pub use client::{KvClient, LIST_LIMIT};
pub use codec::{merge_replies, ValueTree};
pub use error::{Error, Result};
pub use ids::{ChildId, ParentRef, RootId};
pub use store::{InMemoryNodeStore, Node, NodeStore, RootSummary};
