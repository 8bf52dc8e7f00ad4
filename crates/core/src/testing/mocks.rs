//! Mock implementations of core ports
//!
//! Provides mock objects for testing purposes.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::auth::ports::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

type Reply = Result<HttpResponse, TransportError>;
type RouteMap = Arc<Mutex<HashMap<(HttpMethod, String), VecDeque<Reply>>>>;
type RequestLog = Arc<Mutex<Vec<HttpRequest>>>;

/// Scripted HTTP transport.
///
/// Replies are queued per `(method, url)`. Each request consumes the front
/// reply, except the last one which keeps answering. Unscripted routes get
/// a 404.
///
/// ```
/// use authkit_core::testing::MockTransport;
/// use authkit_core::{HttpMethod, HttpRequest, HttpTransport};
///
/// # tokio_test::block_on(async {
/// let transport = MockTransport::new();
/// let body = serde_json::json!({"ok": true});
/// transport.respond_json(HttpMethod::Get, "https://id.example.com/x", 200, body);
///
/// let response = transport.execute(HttpRequest::get("https://id.example.com/x")).await.unwrap();
/// assert_eq!(response.status, 200);
/// assert_eq!(transport.request_count(HttpMethod::Get, "https://id.example.com/x"), 1);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: RouteMap,
    requests: RequestLog,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw reply for `method url`.
    pub fn respond(&self, method: HttpMethod, url: &str, status: u16, body: &str) {
        self.push(method, url, Ok(HttpResponse::new(status, body)));
    }

    /// Queue a JSON reply for `method url`.
    pub fn respond_json(&self, method: HttpMethod, url: &str, status: u16, body: Value) {
        self.push(method, url, Ok(HttpResponse::new(status, body.to_string())));
    }

    /// Queue a transport failure for `method url`.
    pub fn fail(&self, method: HttpMethod, url: &str, error: TransportError) {
        self.push(method, url, Err(error));
    }

    fn push(&self, method: HttpMethod, url: &str, reply: Reply) {
        self.routes.lock().entry((method, url.to_string())).or_default().push_back(reply);
    }

    /// Every request executed so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self, method: HttpMethod, url: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.method == method && r.url == url).count()
    }

    pub fn total_requests(&self) -> usize {
        self.requests.lock().len()
    }

    /// Most recent request to `method url`.
    pub fn last_request(&self, method: HttpMethod, url: &str) -> Option<HttpRequest> {
        self.requests.lock().iter().rev().find(|r| r.method == method && r.url == url).cloned()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let key = (request.method, request.url.clone());
        self.requests.lock().push(request);

        let mut routes = self.routes.lock();
        match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => {
                queue.pop_front().unwrap_or_else(|| Ok(not_found()))
            }
            Some(queue) => queue.front().cloned().unwrap_or_else(|| Ok(not_found())),
            None => Ok(not_found()),
        }
    }
}

fn not_found() -> HttpResponse {
    HttpResponse::new(404, r#"{"error":"not_found","error_description":"no mock route"}"#)
}
