//! HTTP transport implementation
//!
//! Provides the default reqwest-backed [`Transport`](crate::Transport).
//! Deadlines and retries are applied above this layer.

pub mod client;

pub use client::{HttpTransport, HttpTransportConfig};
