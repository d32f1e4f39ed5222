//! HTTP layer: request descriptors, the retrying executor, and middleware.
//!
//! The wire exchange itself is delegated to a
//! [`Transport`](turbonotion_transport::Transport); this module decides what
//! to send, how long to wait, and whether to try again.

pub use request::{API_VERSION_PREFIX, Method, QueryValue, Request, START_CURSOR};

pub(crate) use executor::Executor;

mod executor;
pub mod middleware;
mod request;
