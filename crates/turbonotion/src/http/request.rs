//! Request descriptor
//!
//! A [`Request`] names one logical API operation: method, path relative to the
//! versioned API root, ordered query entries, and an optional JSON body. It
//! is built fluently, then handed by reference to the executor, which never
//! modifies it.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use url::Url;

/// API version segment prefixed to every request path.
pub const API_VERSION_PREFIX: &str = "v1";

/// Query parameter and body field carrying the pagination cursor.
pub const START_CURSOR: &str = "start_cursor";

/// HTTP methods used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl Method {
    /// Upper-case method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Whether requests with this method carry their parameters in a body.
    pub fn has_body(&self) -> bool {
        matches!(self, Method::Post | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar query string value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// Text, sent verbatim (percent-encoded)
    Text(String),
    /// Signed integer
    Integer(i64),
    /// Unsigned integer
    Unsigned(u64),
    /// Floating point number
    Float(f64),
    /// `true` / `false`
    Boolean(bool),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Text(s) => f.write_str(s),
            QueryValue::Integer(n) => write!(f, "{}", n),
            QueryValue::Unsigned(n) => write!(f, "{}", n),
            QueryValue::Float(n) => write!(f, "{}", n),
            QueryValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        QueryValue::Text(value.clone())
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Integer(value.into())
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Integer(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Unsigned(value.into())
    }
}

impl From<u64> for QueryValue {
    fn from(value: u64) -> Self {
        QueryValue::Unsigned(value)
    }
}

impl From<usize> for QueryValue {
    fn from(value: usize) -> Self {
        QueryValue::Unsigned(value as u64)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Boolean(value)
    }
}

/// Description of one API call.
///
/// # Examples
///
/// ```rust
/// use turbonotion::http::{Method, Request};
/// use serde_json::json;
///
/// let list = Request::get("/users").query("page_size", 50u32);
/// assert_eq!(list.method(), Method::Get);
///
/// let query = Request::post("/databases/d9824bdc/query")
///     .body(json!({ "filter": { "property": "Done", "checkbox": { "equals": true } } }));
/// assert!(query.body_value().is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    path: String,
    query: Vec<(String, QueryValue)>,
    body: Option<Value>,
}

impl Request {
    /// Create a request with no query and no body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// `GET path`
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// `POST path`
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// `PATCH path`
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    /// `DELETE path`
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query entry. Entries keep insertion order.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a query entry only when `value` is present.
    pub fn query_opt<V: Into<QueryValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Set the JSON body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` and set it as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if `body` cannot be represented as JSON.
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(Error::Serialization)?;
        Ok(self.body(value))
    }

    /// Copy of this request positioned at `cursor`.
    ///
    /// GET and DELETE carry the cursor as the `start_cursor` query entry;
    /// POST and PATCH carry it as a `start_cursor` field of the JSON object
    /// body, creating an empty object when there is no body yet. `None`
    /// removes any cursor already present. A non-object body is left as is.
    pub fn with_start_cursor(&self, cursor: Option<&str>) -> Self {
        let mut request = self.clone();

        if request.method.has_body() {
            match (cursor, &mut request.body) {
                (Some(cursor), Some(Value::Object(map))) => {
                    map.insert(START_CURSOR.to_string(), Value::String(cursor.to_string()));
                }
                (Some(cursor), body @ None) => {
                    let mut map = serde_json::Map::new();
                    map.insert(START_CURSOR.to_string(), Value::String(cursor.to_string()));
                    *body = Some(Value::Object(map));
                }
                (None, Some(Value::Object(map))) => {
                    map.remove(START_CURSOR);
                }
                _ => {}
            }
        } else {
            request.query.retain(|(key, _)| key != START_CURSOR);
            if let Some(cursor) = cursor {
                request
                    .query
                    .push((START_CURSOR.to_string(), QueryValue::from(cursor)));
            }
        }

        request
    }

    /// HTTP method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Path relative to the versioned API root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query entries in insertion order.
    pub fn query_pairs(&self) -> &[(String, QueryValue)] {
        &self.query
    }

    /// JSON body, if any.
    pub fn body_value(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Full URL: `base` + `/v1/` + path + query string.
    ///
    /// Any path already present on `base` is kept as a prefix, so a base of
    /// `http://localhost:8080/proxy` yields `http://localhost:8080/proxy/v1/...`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `base` cannot hold a path.
    pub fn url(&self, base: &Url) -> Result<Url> {
        if base.cannot_be_a_base() {
            return Err(Error::InvalidUrl(format!(
                "Base URL '{}' cannot carry a path",
                base
            )));
        }

        let mut url = base.clone();
        url.set_path(&format!(
            "{}/{}/{}",
            base.path().trim_end_matches('/'),
            API_VERSION_PREFIX,
            self.path.trim_start_matches('/')
        ));
        url.set_query(None);
        url.set_fragment(None);

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, &value.to_string());
            }
        }

        Ok(url)
    }
}
