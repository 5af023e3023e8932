//! Fetch abstraction and its HTTP-shaped implementation.
//!
//! The coordinator depends on two capabilities: resolve a page request to a
//! photo list plus next-page cursor, and resolve a URL to raw bytes. Both are
//! asynchronous (completing exactly once for non-cancelled calls) and both
//! return a cancellation handle.
//!
//! [`HttpGateway`] implements them over a [`Transport`] trait — raw
//! `GET url + headers -> status + body` is the only concern left outside the
//! crate. URL construction, API-key header assembly, status classification,
//! and wire decoding all live here so they stay testable with injected
//! fixtures.

use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::workers::Workers;
use crate::error::{ApiError, Error, Result};
use crate::photo::PageResponse;

/// Default feed endpoint (version and collection baked into the path).
pub const DEFAULT_BASE_URL: &str = "https://api.pexels.com/v1/curated";

/// Fixed page size of the feed.
pub const PHOTOS_PER_PAGE: u32 = 20;

/// Identifies which page to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// 1-based page number on the configured endpoint.
    Number(u32),
    /// Full next-page URL returned by the previous response.
    Url(String),
}

pub type PageCompletion = Box<dyn FnOnce(Result<PageResponse>) + Send + 'static>;
pub type BytesCompletion = Box<dyn FnOnce(Result<Vec<u8>>) + Send + 'static>;

/// Cancellation handle for an in-flight fetch.
///
/// Cancelling makes the completion fire with [`Error::Cancelled`]; consumers
/// ignore that silently rather than reporting a failure.
#[derive(Debug, Clone, Default)]
pub struct FetchHandle {
    cancelled: Arc<AtomicBool>,
}

impl FetchHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Abstract fetch capability the coordinator consumes.
pub trait FetchGateway: Send + Sync {
    /// Resolve a page request to records plus next-page cursor.
    fn fetch_page(&self, request: PageRequest, completion: PageCompletion) -> FetchHandle;

    /// Resolve a URL to raw bytes.
    fn fetch_bytes(&self, url: &str, completion: BytesCompletion) -> FetchHandle;
}

/// Raw HTTP response as seen by the gateway.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Socket-level transport. Implementations may block; the gateway always
/// calls this from a worker thread.
pub trait Transport: Send + Sync {
    fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> std::result::Result<HttpResponse, String>;
}

/// Gateway configuration, passed explicitly at construction (no process-wide
/// mutable key state).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Opaque API key sent as the `Authorization` header on page fetches.
    /// `None` fails fast with [`Error::ApiKeyMissing`] before any dispatch.
    pub api_key: Option<String>,
    pub per_page: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            per_page: PHOTOS_PER_PAGE,
        }
    }
}

/// Builds page URLs on the configured endpoint.
#[derive(Debug, Clone)]
pub struct UrlFactory {
    base_url: String,
    per_page: u32,
}

impl UrlFactory {
    pub fn new(base_url: impl Into<String>, per_page: u32) -> Self {
        Self {
            base_url: base_url.into(),
            per_page,
        }
    }

    /// URL for a 1-based page number, or [`Error::InvalidUrl`] when the
    /// configured endpoint is malformed. Never reaches the network on error.
    pub fn page_url(&self, page: u32) -> Result<String> {
        let base = self.base_url.trim_end_matches('/');
        let rest = base
            .strip_prefix("https://")
            .or_else(|| base.strip_prefix("http://"));
        let host_nonempty = rest
            .map(|r| !r.split('/').next().unwrap_or("").is_empty())
            .unwrap_or(false);
        if !host_nonempty {
            return Err(Error::InvalidUrl(self.base_url.clone()));
        }
        Ok(format!("{}?page={}&per_page={}", base, page, self.per_page))
    }
}

/// Production gateway: page and byte fetches executed on the worker pool over
/// an injected transport.
pub struct HttpGateway {
    transport: Arc<dyn Transport>,
    workers: Arc<Workers>,
    url_factory: UrlFactory,
    api_key: Option<String>,
}

impl HttpGateway {
    pub fn new(transport: Arc<dyn Transport>, workers: Arc<Workers>, config: GatewayConfig) -> Self {
        Self {
            transport,
            workers,
            url_factory: UrlFactory::new(config.base_url, config.per_page),
            api_key: config.api_key,
        }
    }
}

/// Decode a page body; malformed pages fall back to the error-shaped payload.
fn decode_page(body: &[u8]) -> Result<PageResponse> {
    match serde_json::from_slice::<PageResponse>(body) {
        Ok(page) => Ok(page),
        Err(e) => {
            debug!("Page decode failed ({}), trying error body", e);
            Err(decode_error_body(body))
        }
    }
}

/// Non-2xx or undecodable payloads: prefer the structured error body, give up
/// with the generic invalid-data condition.
fn decode_error_body(body: &[u8]) -> Error {
    match serde_json::from_slice::<ApiError>(body) {
        Ok(api) => Error::Api(api),
        Err(_) => Error::InvalidData,
    }
}

impl FetchGateway for HttpGateway {
    fn fetch_page(&self, request: PageRequest, completion: PageCompletion) -> FetchHandle {
        let handle = FetchHandle::new();

        // Fail-fast paths complete before any dispatch.
        let Some(api_key) = self.api_key.clone() else {
            completion(Err(Error::ApiKeyMissing));
            return handle;
        };
        let url = match request {
            PageRequest::Number(page) => match self.url_factory.page_url(page) {
                Ok(url) => url,
                Err(e) => {
                    completion(Err(e));
                    return handle;
                }
            },
            PageRequest::Url(url) => url,
        };

        let transport = Arc::clone(&self.transport);
        let fetch = handle.clone();
        self.workers.execute(move || {
            if fetch.is_cancelled() {
                completion(Err(Error::Cancelled));
                return;
            }
            let response = match transport.get(&url, &[("Authorization", api_key.as_str())]) {
                Ok(response) => response,
                Err(e) => {
                    completion(Err(Error::Transport(e)));
                    return;
                }
            };
            if fetch.is_cancelled() {
                completion(Err(Error::Cancelled));
                return;
            }
            if !(200..=299).contains(&response.status) {
                completion(Err(decode_error_body(&response.body)));
                return;
            }
            completion(decode_page(&response.body));
        });

        handle
    }

    fn fetch_bytes(&self, url: &str, completion: BytesCompletion) -> FetchHandle {
        let handle = FetchHandle::new();
        let url = url.to_string();
        let transport = Arc::clone(&self.transport);
        let fetch = handle.clone();

        // Image hosts take no auth header.
        self.workers.execute(move || {
            if fetch.is_cancelled() {
                completion(Err(Error::Cancelled));
                return;
            }
            let response = match transport.get(&url, &[]) {
                Ok(response) => response,
                Err(e) => {
                    completion(Err(Error::Transport(e)));
                    return;
                }
            };
            if fetch.is_cancelled() {
                completion(Err(Error::Cancelled));
                return;
            }
            if !(200..=299).contains(&response.status) {
                completion(Err(Error::InvalidData));
                return;
            }
            completion(Ok(response.body));
        });

        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records requests and replays programmed responses.
    struct FakeTransport {
        requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
        responses: Mutex<Vec<std::result::Result<HttpResponse, String>>>,
        // When set, get() blocks until released (for cancellation tests).
        gate: Option<crossbeam_channel::Receiver<()>>,
    }

    impl FakeTransport {
        fn replying(responses: Vec<std::result::Result<HttpResponse, String>>) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                responses: Mutex::new(responses),
                gate: None,
            }
        }

        fn ok(status: u16, body: &[u8]) -> std::result::Result<HttpResponse, String> {
            Ok(HttpResponse {
                status,
                body: body.to_vec(),
            })
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last_request(&self) -> (String, Vec<(String, String)>) {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Transport for FakeTransport {
        fn get(
            &self,
            url: &str,
            headers: &[(&str, &str)],
        ) -> std::result::Result<HttpResponse, String> {
            if let Some(gate) = &self.gate {
                gate.recv().ok();
            }
            let owned_headers = headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), owned_headers));
            self.responses
                .lock()
                .unwrap()
                .remove(0)
        }
    }

    const PAGE_BODY: &[u8] = br#"{
        "next_page": "https://api.example.com/v1/curated?page=2&per_page=20",
        "photos": []
    }"#;

    fn gateway_with(
        transport: Arc<FakeTransport>,
        api_key: Option<&str>,
    ) -> HttpGateway {
        let config = GatewayConfig {
            base_url: "https://api.example.com/v1/curated".into(),
            api_key: api_key.map(String::from),
            per_page: 20,
        };
        HttpGateway::new(transport, Arc::new(Workers::new(1)), config)
    }

    fn fetch_page_blocking(
        gateway: &HttpGateway,
        request: PageRequest,
    ) -> Result<PageResponse> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        gateway.fetch_page(request, Box::new(move |result| {
            tx.send(result).unwrap();
        }));
        rx.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_page_url_and_auth_header() {
        let transport = Arc::new(FakeTransport::replying(vec![FakeTransport::ok(
            200, PAGE_BODY,
        )]));
        let gateway = gateway_with(Arc::clone(&transport), Some("secret-key"));

        let page = fetch_page_blocking(&gateway, PageRequest::Number(2)).unwrap();
        assert!(page.next_page.contains("page=2"));

        let (url, headers) = transport.last_request();
        assert_eq!(
            url,
            "https://api.example.com/v1/curated?page=2&per_page=20"
        );
        assert_eq!(
            headers,
            vec![("Authorization".to_string(), "secret-key".to_string())]
        );
    }

    #[test]
    fn test_cursor_url_passes_through() {
        let transport = Arc::new(FakeTransport::replying(vec![FakeTransport::ok(
            200, PAGE_BODY,
        )]));
        let gateway = gateway_with(Arc::clone(&transport), Some("k"));

        let cursor = "https://api.example.com/v1/curated?page=7&per_page=20";
        fetch_page_blocking(&gateway, PageRequest::Url(cursor.into())).unwrap();
        assert_eq!(transport.last_request().0, cursor);
    }

    #[test]
    fn test_missing_api_key_fails_before_network() {
        let transport = Arc::new(FakeTransport::replying(vec![]));
        let gateway = gateway_with(Arc::clone(&transport), None);

        let result = fetch_page_blocking(&gateway, PageRequest::Number(1));
        assert_eq!(result.unwrap_err(), Error::ApiKeyMissing);
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn test_malformed_base_url_fails_before_network() {
        let transport = Arc::new(FakeTransport::replying(vec![]));
        let config = GatewayConfig {
            base_url: "not a url".into(),
            api_key: Some("k".into()),
            per_page: 20,
        };
        let gateway = HttpGateway::new(Arc::clone(&transport) as Arc<dyn Transport>, Arc::new(Workers::new(1)), config);

        let (tx, rx) = crossbeam_channel::bounded(1);
        gateway.fetch_page(PageRequest::Number(1), Box::new(move |result| {
            tx.send(result).unwrap();
        }));
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn test_unauthorized_surfaces_structured_error() {
        let transport = Arc::new(FakeTransport::replying(vec![FakeTransport::ok(
            401,
            br#"{"status": 401, "code": "unauthorized"}"#,
        )]));
        let gateway = gateway_with(transport, Some("expired"));

        let error = fetch_page_blocking(&gateway, PageRequest::Number(1)).unwrap_err();
        match error {
            Error::Api(api) => assert!(api.is_authorization_error()),
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_2xx_with_garbage_body_is_invalid_data() {
        let transport = Arc::new(FakeTransport::replying(vec![FakeTransport::ok(
            500,
            b"<html>oops</html>",
        )]));
        let gateway = gateway_with(transport, Some("k"));

        let error = fetch_page_blocking(&gateway, PageRequest::Number(1)).unwrap_err();
        assert_eq!(error, Error::InvalidData);
    }

    #[test]
    fn test_2xx_error_shaped_body_falls_back_to_api_error() {
        let transport = Arc::new(FakeTransport::replying(vec![FakeTransport::ok(
            200,
            br#"{"status": 429, "code": "rate_limited"}"#,
        )]));
        let gateway = gateway_with(transport, Some("k"));

        let error = fetch_page_blocking(&gateway, PageRequest::Number(1)).unwrap_err();
        assert!(matches!(error, Error::Api(api) if api.code == "rate_limited"));
    }

    #[test]
    fn test_2xx_garbage_body_is_invalid_data() {
        let transport = Arc::new(FakeTransport::replying(vec![FakeTransport::ok(
            200,
            b"not json",
        )]));
        let gateway = gateway_with(transport, Some("k"));

        let error = fetch_page_blocking(&gateway, PageRequest::Number(1)).unwrap_err();
        assert_eq!(error, Error::InvalidData);
    }

    #[test]
    fn test_transport_error_reported_verbatim() {
        let transport = Arc::new(FakeTransport::replying(vec![Err(
            "connection refused".to_string(),
        )]));
        let gateway = gateway_with(transport, Some("k"));

        let error = fetch_page_blocking(&gateway, PageRequest::Number(1)).unwrap_err();
        assert_eq!(error, Error::Transport("connection refused".into()));
    }

    #[test]
    fn test_fetch_bytes_success_and_status_check() {
        let transport = Arc::new(FakeTransport::replying(vec![
            FakeTransport::ok(200, b"image-bytes"),
            FakeTransport::ok(404, b"gone"),
        ]));
        let gateway = gateway_with(Arc::clone(&transport), Some("k"));

        let (tx, rx) = crossbeam_channel::bounded(1);
        let tx2 = tx.clone();
        gateway.fetch_bytes("https://images.example.com/1.jpg", Box::new(move |result| {
            tx2.send(result).unwrap();
        }));
        let bytes = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
        assert_eq!(bytes, b"image-bytes");
        // No auth header on image hosts.
        assert!(transport.last_request().1.is_empty());

        gateway.fetch_bytes("https://images.example.com/2.jpg", Box::new(move |result| {
            tx.send(result).unwrap();
        }));
        let error = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap_err();
        assert_eq!(error, Error::InvalidData);
    }

    #[test]
    fn test_cancel_during_transport_completes_with_cancelled() {
        let (release_tx, release_rx) = crossbeam_channel::bounded(1);
        let transport = Arc::new(FakeTransport {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(vec![FakeTransport::ok(200, PAGE_BODY)]),
            gate: Some(release_rx),
        });
        let gateway = gateway_with(transport, Some("k"));

        let (tx, rx) = crossbeam_channel::bounded(1);
        let handle = gateway.fetch_page(PageRequest::Number(1), Box::new(move |result| {
            tx.send(result).unwrap();
        }));

        // The worker is blocked inside the transport; cancel, then release.
        handle.cancel();
        release_tx.send(()).unwrap();

        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(result.unwrap_err(), Error::Cancelled);
    }

    #[test]
    fn test_url_factory_validation() {
        assert!(UrlFactory::new("https://api.example.com/v1/curated", 20)
            .page_url(1)
            .is_ok());
        assert!(UrlFactory::new("https://", 20).page_url(1).is_err());
        assert!(UrlFactory::new("ftp://api.example.com", 20).page_url(1).is_err());
        assert!(UrlFactory::new("", 20).page_url(1).is_err());
    }
}
