#![forbid(unsafe_code)]
//! HTTP collaborator for `threadkv-core`: a blocking [`NodeStore`] adapter
//! for a discussion-board REST API plus the on-disk credential configuration
//! the CLI persists.
//!
//! Every trait method is one independent network round trip; failures map to
//! `Error::Backend` and nothing is retried here.
//!
//! [`NodeStore`]: threadkv_core::NodeStore

mod api;
mod config;
mod store;

pub use config::{Config, ConfigError};
pub use store::HttpNodeStore;
