//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use turbonotion::{Client, HttpRequest, HttpResponse, Transport, TransportError};

/// One scripted transport outcome.
pub enum Reply {
    /// Respond with this status, headers, and body
    Response(HttpResponse),
    /// Fail at the transport level
    Fail(TransportError),
    /// Never answer (until the caller's deadline drops the future)
    Hang,
}

/// Build a JSON response.
pub fn json(status: u16, body: Value) -> Reply {
    Reply::Response(HttpResponse::new(
        status,
        HashMap::from([("content-type".to_string(), "application/json".to_string())]),
        body.to_string().into_bytes(),
    ))
}

/// Build a response with a raw body and extra headers.
pub fn raw(status: u16, headers: &[(&str, &str)], body: &str) -> Reply {
    Reply::Response(HttpResponse::new(
        status,
        headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        body.as_bytes().to_vec(),
    ))
}

/// A 429 with the API's error body and an optional `Retry-After` header.
pub fn rate_limited(retry_after: Option<&str>) -> Reply {
    let body = r#"{"object":"error","status":429,"code":"rate_limited","message":"You have been rate limited. Please try again in a few minutes."}"#;
    match retry_after {
        Some(value) => raw(429, &[("Retry-After", value)], body),
        None => raw(429, &[], body),
    }
}

/// A recorded call: the request plus when (tokio clock) it arrived.
#[derive(Debug, Clone)]
pub struct Call {
    pub request: HttpRequest,
    pub at: Instant,
}

/// Transport that replays scripted replies in order and records every call.
///
/// Panics if called more times than replies were scripted.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Gaps between consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        self.calls()
            .windows(2)
            .map(|pair| pair[1].at - pair[0].at)
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_http(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(Call {
            request,
            at: Instant::now(),
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport called more times than scripted");

        match reply {
            Reply::Response(response) => Ok(response),
            Reply::Fail(err) => Err(err),
            Reply::Hang => std::future::pending().await,
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Client wired to `transport` with test credentials.
pub fn client_with(transport: &ScriptedTransport) -> turbonotion::NotionClientBuilder {
    Client::builder()
        .auth("secret_test")
        .transport(Arc::new(transport.clone()))
}

/// Assert a duration is `expected` within a small scheduling tolerance.
pub fn assert_about(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(50),
        "expected ~{:?}, got {:?}",
        expected,
        actual
    );
}
