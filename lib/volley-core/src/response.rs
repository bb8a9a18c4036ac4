//! HTTP response handling.
//!
//! A [`Response`] carries status and headers eagerly and the body as an
//! unconsumed stream of chunks. The body can be consumed exactly once, by
//! [`Response::bytes`], [`Response::text`], [`Response::json`] or
//! [`Response::body_map`]; later attempts fail with [`Error::BodyRead`].
//!
//! # Example
//!
//! ```ignore
//! let mut response = client.get("https://api.example.com/users/1").await?;
//! let user: User = response.json().await?;
//! ```

use std::collections::HashMap;
use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;

use crate::Error;

/// A streaming body: chunks of bytes arriving over time.
pub type ResponseBody = Pin<Box<dyn Stream<Item = crate::Result<Bytes>> + Send>>;

/// HTTP response with status, headers, and a single-use body.
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    url: Option<url::Url>,
    body: Option<ResponseBody>,
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("url", &self.url.as_ref().map(url::Url::as_str))
            .field("body_consumed", &self.body.is_none())
            .finish()
    }
}

impl Response {
    /// Creates a new response around a streaming body.
    ///
    /// Header names are stored lower-cased.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: ResponseBody) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        Self {
            status,
            headers,
            url: None,
            body: Some(body),
        }
    }

    /// Creates a response whose body is already buffered.
    #[must_use]
    pub fn from_bytes(status: u16, headers: HashMap<String, String>, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self::new(
            status,
            headers,
            Box::pin(futures_util::stream::once(async move { Ok::<_, Error>(body) })),
        )
    }

    /// Records the URL this response answers.
    #[must_use]
    pub fn with_url(mut self, url: url::Url) -> Self {
        self.url = Some(url);
        self
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers, keyed by lower-case name.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Declared `Content-Type`, verbatim.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// The resolved request URL, when the dispatcher recorded it.
    #[must_use]
    pub const fn url(&self) -> Option<&url::Url> {
        self.url.as_ref()
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 3xx.
    #[must_use]
    pub const fn is_redirection(&self) -> bool {
        self.status >= 300 && self.status < 400
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Returns `true` once the body has been taken.
    #[must_use]
    pub const fn is_body_consumed(&self) -> bool {
        self.body.is_none()
    }

    /// Take the body stream, leaving the response marked as consumed.
    pub fn take_body(&mut self) -> crate::Result<ResponseBody> {
        self.body
            .take()
            .ok_or_else(|| Error::body_read("body already consumed"))
    }

    /// Drain the whole body into memory.
    ///
    /// The stream is dropped, and so closed, whether draining succeeds or not.
    pub async fn bytes(&mut self) -> crate::Result<Bytes> {
        let mut body = self.take_body()?;
        let mut collected = Vec::new();

        while let Some(chunk) = body.next().await {
            collected.extend_from_slice(&chunk?);
        }

        Ok(Bytes::from(collected))
    }

    /// Drain the body as UTF-8 text.
    pub async fn text(&mut self) -> crate::Result<String> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            Error::decode(self.content_type().unwrap_or("text/plain"), e.to_string())
        })
    }

    /// Drain the body and deserialize it as JSON.
    pub async fn json<T: serde::de::DeserializeOwned>(&mut self) -> crate::Result<T> {
        let bytes = self.bytes().await?;
        crate::from_json(&bytes)
    }
}
