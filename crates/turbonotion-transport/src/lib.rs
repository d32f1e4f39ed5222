//! Injectable transport layer for TurboNotion
//!
//! The request executor never talks to the network directly. It hands a fully
//! built [`HttpRequest`] to a [`Transport`] and gets back an [`HttpResponse`]
//! or a [`TransportError`]. The default implementation is [`HttpTransport`]
//! (reqwest); tests substitute a scripted fake to drive the executor
//! deterministically.
//!
//! # Architecture
//!
//! - **Transport trait**: one async method, one attempt, no retries
//! - **HTTP transport**: REST calls via reqwest with connection pooling
//! - **Error handling**: transport-level failures only (DNS, reset, I/O);
//!   non-2xx statuses are successful transport round trips

#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! # Usage
//!
//! ```ignore
//! use turbonotion_transport::{HttpRequest, HttpTransport, Transport};
//!
//! let transport = HttpTransport::new()?;
//! let request = HttpRequest::new("GET", "https://api.notion.com/v1/users/me")
//!     .with_header("Notion-Version", "2022-06-28");
//! let response = transport.send_http(request).await?;
//! ```

pub mod error;
pub mod http;
pub mod traits;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use http::{HttpTransport, HttpTransportConfig};
pub use traits::{HttpRequest, HttpResponse, Transport};
