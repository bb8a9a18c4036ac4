//! HTTP transport implementation using hyper-util.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::{BodyStream, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;
use volley_core::ResponseBody;

use crate::{
    Error, Request, Response, Result,
    config::{ClientConfig, ClientConfigBuilder},
    connector::https_connector,
    middleware::LoggingLayer,
};

// ============================================================================
// Type-Erased Service for Middleware Composition
// ============================================================================

/// Type-erased service for middleware composition.
pub type BoxedService = BoxCloneService<Request, Response, Error>;

/// Future type for Tower Service implementation.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'static>>;

/// Makes a [`BoxedService`] `Sync`, as required by [`crate::HttpClient`].
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, request: Request) -> ServiceFuture {
        // Lock only long enough to clone the service
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        Box::pin(async move { service.call(request).await })
    }
}

// ============================================================================
// Raw Client
// ============================================================================

#[derive(Clone)]
struct RawHyperClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    timeout: Duration,
}

impl RawHyperClient {
    fn new(config: &ClientConfig) -> Self {
        let connector = https_connector(config.connect_timeout);
        let inner = Client::builder(TokioExecutor::new()).build(connector);
        Self {
            inner,
            timeout: config.timeout,
        }
    }

    /// Headers are attached verbatim; hyper only fills `host` and
    /// `content-length` when they are missing.
    fn build_hyper_request(request: Request) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());

        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = body.map_or_else(Full::default, Full::new);
        builder
            .body(body)
            .map_err(|e| Error::request_construction(e.to_string()))
    }

    /// Repeated header lines are joined with `", "` in arrival order.
    /// Values that are not UTF-8 are decoded lossily.
    fn extract_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        let mut extracted = HashMap::with_capacity(headers.keys_len());
        for (name, value) in headers {
            let value = String::from_utf8_lossy(value.as_bytes());
            match extracted.entry(name.as_str().to_owned()) {
                Entry::Occupied(mut entry) => {
                    let joined: &mut String = entry.get_mut();
                    joined.push_str(", ");
                    joined.push_str(&value);
                }
                Entry::Vacant(entry) => {
                    entry.insert(value.into_owned());
                }
            }
        }
        extracted
    }

    async fn execute(&self, request: Request) -> Result<Response> {
        let url = request.url().clone();
        let hyper_request = Self::build_hyper_request(request)?;

        let response = tokio::time::timeout(self.timeout, self.inner.request(hyper_request))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(Self::map_hyper_error)?;

        let status = response.status().as_u16();
        let headers = Self::extract_headers(response.headers());

        // Trailer frames carry no data and become empty chunks
        let body: ResponseBody = Box::pin(
            BodyStream::new(response.into_body())
                .map_ok(|frame| frame.into_data().unwrap_or_default())
                .map_err(|e| Error::body_read(e.to_string())),
        );

        Ok(Response::new(status, headers, body).with_url(url))
    }

    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        use std::error::Error as _;

        // The interesting message usually sits in the source chain
        let mut msg = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            msg = format!("{msg}: {cause}");
            source = cause.source();
        }

        if msg.contains("ssl") || msg.contains("tls") || msg.contains("certificate") {
            return Error::tls_with_source(msg, err);
        }
        Error::connection_with_source(msg, err)
    }
}

impl Service<Request> for RawHyperClient {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let client = self.clone();
        Box::pin(async move { client.execute(request).await })
    }
}

// ============================================================================
// Public Client
// ============================================================================

/// HTTP transport using hyper-util, with TLS and tower middleware support.
///
/// Requires a Tokio runtime.
///
/// # Example
///
/// ```ignore
/// use volley::HyperClient;
/// use std::time::Duration;
///
/// let transport = HyperClient::builder()
///     .timeout(Duration::from_secs(10))
///     .with_logging()
///     .build();
/// ```
#[derive(Clone)]
pub struct HyperClient {
    service: SyncService,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// Create a new transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new transport with custom configuration (no middleware).
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let raw = RawHyperClient::new(&config);
        Self::with_service(BoxCloneService::new(raw), config)
    }

    fn with_service(service: BoxedService, config: ClientConfig) -> Self {
        Self {
            service: SyncService::new(service),
            config,
        }
    }

    /// Create a new transport builder.
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder::default()
    }

    /// Get the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl volley_core::HttpClient for HyperClient {
    async fn execute(&self, request: Request) -> Result<Response> {
        self.service.call(request).await
    }
}

impl Service<Request> for HyperClient {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        self.service.call(request)
    }
}

type LayerFn = Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>;

/// Builder for [`HyperClient`].
#[derive(Default)]
pub struct HyperClientBuilder {
    config: ClientConfigBuilder,
    layers: Vec<LayerFn>,
}

impl std::fmt::Debug for HyperClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClientBuilder")
            .field("config", &self.config)
            .field("layers_count", &self.layers.len())
            .finish()
    }
}

impl HyperClientBuilder {
    /// Set the request timeout (wait for the response head).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Add a Tower layer to the transport.
    ///
    /// The first layer added is the outermost one.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request, Response = Response, Error = Error> + Clone + Send + 'static,
        <L::Service as Service<Request>>::Future: Send,
    {
        self.layers.push(Arc::new(move |service| {
            BoxCloneService::new(layer.layer(service))
        }));
        self
    }

    /// Log each exchange at info level.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Log each exchange at debug level, headers included.
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Build the transport with all configured middleware.
    #[must_use]
    pub fn build(self) -> HyperClient {
        let config = self.config.build();
        let mut service: BoxedService = BoxCloneService::new(RawHyperClient::new(&config));

        for layer_fn in self.layers.iter().rev() {
            service = layer_fn(service);
        }

        HyperClient::with_service(service, config)
    }
}

#[cfg(test)]
mod tests {
    use volley_core::Method;

    use super::*;

    #[test]
    fn transport_default() {
        let client = HyperClient::new();
        assert_eq!(client.config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn transport_builder() {
        let client = HyperClient::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(2))
            .build();

        assert_eq!(client.config().timeout, Duration::from_secs(60));
        assert_eq!(client.config().connect_timeout, Duration::from_secs(2));
    }

    #[test]
    fn builder_counts_layers() {
        let builder = HyperClient::builder().with_logging().with_debug_logging();
        let debug = format!("{builder:?}");
        assert!(debug.contains("layers_count: 2"), "{debug}");
    }

    #[test]
    fn invalid_header_is_request_construction_error() {
        let url = url::Url::parse("http://localhost/").expect("url");
        let request = Request::builder(Method::Get, url)
            .header("bad header", "value")
            .build();

        let err = RawHyperClient::build_hyper_request(request).expect_err("invalid header name");
        assert!(matches!(err, Error::RequestConstruction(_)), "{err}");
    }

    #[test]
    fn repeated_response_headers_are_joined() {
        let mut headers = http::HeaderMap::new();
        headers.append("set-cookie", http::HeaderValue::from_static("a=1"));
        headers.append("set-cookie", http::HeaderValue::from_static("b=2"));
        headers.insert(
            "x-latin1",
            http::HeaderValue::from_bytes(b"caf\xe9").expect("obs-text value"),
        );
        headers.insert("content-type", http::HeaderValue::from_static("text/plain"));

        let extracted = RawHyperClient::extract_headers(&headers);

        assert_eq!(extracted.len(), 3);
        assert_eq!(extracted["set-cookie"], "a=1, b=2");
        assert_eq!(extracted["x-latin1"], "caf\u{fffd}");
        assert_eq!(extracted["content-type"], "text/plain");
    }

    #[test]
    fn headers_are_sent_verbatim() {
        let url = url::Url::parse("http://localhost/items?page=2").expect("url");
        let request = Request::builder(Method::Post, url)
            .header("content-type", "text/plain")
            .header("x-trace", "abc")
            .body("hello")
            .build();

        let hyper_request = RawHyperClient::build_hyper_request(request).expect("request");
        assert_eq!(hyper_request.method(), http::Method::POST);
        assert_eq!(hyper_request.uri().to_string(), "http://localhost/items?page=2");
        assert_eq!(hyper_request.headers().len(), 2);
        assert_eq!(hyper_request.headers()["x-trace"], "abc");
    }
}
