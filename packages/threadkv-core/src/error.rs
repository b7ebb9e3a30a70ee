use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// No root carries this title, or the root has no replies to read.
    #[error("key not found: {0}")]
    KeyNotFound(String),
    /// Path navigation failed: empty where a target is required, index out
    /// of range, or the path descends past a leaf.
    #[error("invalid path: {0:?}")]
    InvalidPath(Vec<usize>),
    /// A backend primitive failed. Never retried here; the message carries
    /// the underlying cause.
    #[error("backend error: {0}")]
    Backend(String),
}
