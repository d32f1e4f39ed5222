//! # TurboNotion
//!
//! Resilient Rust client for the Notion API:
//! - Typed error taxonomy with classification predicates
//! - Per-attempt timeouts
//! - Automatic retries for rate-limited requests, honoring `Retry-After`
//! - Cursor pagination: eager, lazy (pull or stream), and with counts
//! - Pre-flight payload validation
//! - Optional client-side rate limiting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use turbonotion::{Client, Request};
//! use serde_json::{Value, json};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("secret_...")?;
//!
//!     let query = Request::post("/databases/d9824bdc84454327be8b5b47500af6ce/query")
//!         .body(json!({ "filter": { "property": "Done", "checkbox": { "equals": false } } }));
//!
//!     let open_tasks: Vec<Value> = client.collect_all(&query).await?;
//!     println!("{} open tasks", open_tasks.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Testing with a fake transport
//!
//! Any [`Transport`] can stand in for the network, which keeps retry and
//! pagination tests deterministic:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use turbonotion::{Client, Transport};
//!
//! # fn example(fake: Arc<dyn Transport>) -> turbonotion::Result<()> {
//! let client = Client::builder().auth("secret_test").transport(fake).build()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use client::{Client, NotionClientBuilder};
pub use config::{ClientConfig, ClientConfigBuilder, RateLimitConfig};
pub use error::{ApiError, ApiErrorCode, Error, Result};
pub use crate::http::{Method, QueryValue, Request};
pub use pagination::{
    Page, PaginatedCollection, Paginator, collect_paginated, collect_paginated_with_meta,
};
pub use turbonotion_transport::{HttpRequest, HttpResponse, Transport, TransportError};

// Module declarations
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod pagination;
pub mod validation;

// Re-export key dependencies for convenience
pub use async_trait::async_trait;
pub use serde_json::Value as JsonValue;

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use turbonotion::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Client, ClientConfig, Error, Page, Paginator, Request, Result,
        validation::{validate_array_length, validate_string_length},
    };
}

/// SDK version, automatically updated from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com";

/// Default `Notion-Version` header value
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
