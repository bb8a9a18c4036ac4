//! Fluent client: request configuration and single dispatch.

use std::sync::Arc;

use bytes::Bytes;

use crate::{
    ContentType, HttpClient, HyperClient, Method, Request, RequestSpec, Response, Result,
};

/// HTTP client carrying a reusable [`RequestSpec`].
///
/// Configuration methods mutate the client in place and return it for
/// chaining. Every later dispatch sees the accumulated headers, query and
/// body, so a client is a template for a family of requests: use separate
/// clients (or [`Clone`] one) for independent configurations.
///
/// Reconfiguring takes `&mut self` and dispatching takes `&self`, so a
/// client cannot be reconfigured while a fan-out is using it.
///
/// # Example
///
/// ```ignore
/// use volley::{Client, FanOut, Method};
///
/// let mut client = Client::new();
/// client
///     .with_header("accept", "application/json")
///     .with_query_param("page", "1");
///
/// let mut response = client.get("https://api.example.com/users").await?;
/// let body = response.body_map().await?;
/// ```
pub struct Client<C = HyperClient> {
    pub(crate) transport: Arc<C>,
    pub(crate) spec: Arc<RequestSpec>,
}

impl<C> Clone for Client<C> {
    /// The clone shares the transport; its configuration is independent.
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            spec: Arc::clone(&self.spec),
        }
    }
}

impl<C> std::fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

impl Client<HyperClient> {
    /// Create a client over a default [`HyperClient`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport(HyperClient::new())
    }
}

impl Default for Client<HyperClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Client<C> {
    /// Create a client over a custom transport.
    #[must_use]
    pub fn with_transport(transport: C) -> Self {
        Self {
            transport: Arc::new(transport),
            spec: Arc::new(RequestSpec::default()),
        }
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &C {
        &self.transport
    }

    /// The accumulated configuration.
    #[must_use]
    pub fn request_spec(&self) -> &RequestSpec {
        &self.spec
    }

    fn spec_mut(&mut self) -> &mut RequestSpec {
        Arc::make_mut(&mut self.spec)
    }

    /// Merge headers, overwriting by name.
    ///
    /// Names not present in `headers` keep their previous value. Nothing is
    /// validated here; invalid names or values fail at dispatch.
    pub fn with_headers<K, V>(&mut self, headers: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let spec = self.spec_mut();
        for (name, value) in headers {
            spec.set_header(name.as_ref(), value.into());
        }
        self
    }

    /// Set a single header.
    pub fn with_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> &mut Self {
        self.with_headers([(name, value)])
    }

    /// Merge query parameters, overwriting by name.
    ///
    /// At dispatch these replace whatever query the target URL carries.
    pub fn with_query<K, V>(&mut self, query: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let spec = self.spec_mut();
        for (name, value) in query {
            spec.set_query(name.into(), value.into());
        }
        self
    }

    /// Set a single query parameter.
    pub fn with_query_param(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.with_query([(name, value)])
    }

    /// Replace the body.
    pub fn with_body(&mut self, body: impl Into<Bytes>) -> &mut Self {
        self.spec_mut().set_body(body.into());
        self
    }

    /// Replace the body with `value` serialized as JSON, and set the
    /// `content-type` header accordingly.
    pub fn with_json<T: serde::Serialize>(&mut self, value: &T) -> Result<&mut Self> {
        let body = crate::to_json(value)?;
        Ok(self
            .with_header("content-type", ContentType::Json.as_str())
            .with_body(body))
    }

    /// Replace the body with `value` form-urlencoded, and set the
    /// `content-type` header accordingly.
    pub fn with_form<T: serde::Serialize>(&mut self, value: &T) -> Result<&mut Self> {
        let body = crate::to_form(value)?;
        Ok(self
            .with_header("content-type", ContentType::FormUrlEncoded.as_str())
            .with_body(body))
    }

    /// Drop all accumulated headers, query parameters and body.
    pub fn reset(&mut self) -> &mut Self {
        self.spec = Arc::new(RequestSpec::default());
        self
    }

    /// The request a dispatch of `method` to `url` would send, without
    /// sending it.
    pub fn build_request(&self, method: Method, url: &str) -> Result<Request> {
        self.spec.to_request(method, url)
    }
}

impl<C: HttpClient> Client<C> {
    /// Issue `method` against `url` with the current configuration.
    ///
    /// The response body is left unconsumed. No retry is attempted.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::MalformedUrl`] if `url` does not parse.
    /// - [`crate::Error::RequestConstruction`] if the request cannot be built.
    /// - A transport error if the exchange does not complete.
    pub async fn send(&self, method: Method, url: &str) -> Result<Response> {
        dispatch(self.transport.as_ref(), &self.spec, method, url).await
    }

    /// Issue a GET request.
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.send(Method::Get, url).await
    }

    /// Issue a POST request.
    pub async fn post(&self, url: &str) -> Result<Response> {
        self.send(Method::Post, url).await
    }

    /// Issue a PUT request.
    pub async fn put(&self, url: &str) -> Result<Response> {
        self.send(Method::Put, url).await
    }

    /// Issue a PATCH request.
    pub async fn patch(&self, url: &str) -> Result<Response> {
        self.send(Method::Patch, url).await
    }

    /// Issue a DELETE request.
    pub async fn delete(&self, url: &str) -> Result<Response> {
        self.send(Method::Delete, url).await
    }
}

/// Resolve, send, and tag the response with the URL actually requested.
pub(crate) async fn dispatch<C: HttpClient>(
    transport: &C,
    spec: &RequestSpec,
    method: Method,
    url: &str,
) -> Result<Response> {
    let request = spec.to_request(method, url)?;
    let resolved = request.url().clone();
    let response = transport.execute(request).await?;
    Ok(response.with_url(resolved))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert2::{check, let_assert};

    use super::*;
    use crate::Error;

    /// Transport answering every request with its own URL as the body.
    struct Echo;

    impl HttpClient for Echo {
        async fn execute(&self, request: Request) -> Result<Response> {
            Ok(Response::from_bytes(
                200,
                HashMap::new(),
                request.url().to_string(),
            ))
        }
    }

    #[test]
    fn headers_merge_last_write_wins() {
        let mut client = Client::with_transport(Echo);
        client
            .with_headers(HashMap::from([("a", "1"), ("b", "2")]))
            .with_headers(HashMap::from([("B", "20"), ("c", "30")]));

        let headers = client.request_spec().headers();
        check!(headers.len() == 3);
        check!(headers["a"] == "1");
        check!(headers["b"] == "20");
        check!(headers["c"] == "30");
        check!(client.request_spec().header("d").is_none());
    }

    #[test]
    fn query_replaces_url_query() {
        let mut client = Client::with_transport(Echo);
        client
            .with_query(HashMap::from([("page", "1"), ("q", "rust")]))
            .with_query_param("page", "2");

        let request = client
            .build_request(Method::Get, "https://api.example.com/search?q=go&limit=5")
            .expect("request");

        check!(request.url().query() == Some("page=2&q=rust"));
    }

    #[test]
    fn second_body_replaces_first() {
        let mut client = Client::with_transport(Echo);
        client.with_body("first").with_body("second");

        let request = client
            .build_request(Method::Post, "https://api.example.com/items")
            .expect("request");

        check!(request.body() == Some(&Bytes::from_static(b"second")));
    }

    #[test]
    fn with_json_sets_body_and_content_type() {
        let mut client = Client::with_transport(Echo);
        client
            .with_json(&serde_json::json!({"name": "volley"}))
            .expect("json");

        let spec = client.request_spec();
        check!(spec.header("Content-Type") == Some("application/json"));
        check!(spec.body() == Some(&Bytes::from_static(br#"{"name":"volley"}"#)));
    }

    #[test]
    fn clone_has_independent_configuration() {
        let mut original = Client::with_transport(Echo);
        original.with_header("x-origin", "original");

        let mut copy = original.clone();
        copy.with_header("x-origin", "copy").with_body("payload");

        check!(original.request_spec().header("x-origin") == Some("original"));
        check!(original.request_spec().body().is_none());
        check!(copy.request_spec().header("x-origin") == Some("copy"));
    }

    #[test]
    fn reset_clears_everything() {
        let mut client = Client::with_transport(Echo);
        client
            .with_header("a", "1")
            .with_query_param("b", "2")
            .with_body("c")
            .reset();

        check!(*client.request_spec() == RequestSpec::default());
    }

    #[tokio::test]
    async fn send_tags_response_with_resolved_url() {
        let mut client = Client::with_transport(Echo);
        client.with_query_param("page", "7");

        let mut response = client
            .get("https://api.example.com/users?page=1")
            .await
            .expect("response");

        let expected = "https://api.example.com/users?page=7";
        check!(response.url().map(url::Url::as_str) == Some(expected));
        check!(response.text().await.expect("body") == expected);
    }

    #[tokio::test]
    async fn send_rejects_malformed_url() {
        let client = Client::with_transport(Echo);

        let_assert!(Err(err) = client.delete("://missing-scheme").await);
        check!(err.is_malformed_url());
        let_assert!(Error::MalformedUrl { .. } = err);
    }
}
