//! Remote record backend for the game backlog.
//!
//! [`RemoteBackend`] plugs into `backlog_store::RecordStore` and forwards
//! each change to the backlog API server through [`ApiClient`].

pub mod backend;
pub mod client;
pub mod error;

pub use backend::RemoteBackend;
pub use client::ApiClient;
pub use error::ClientError;
