//! Accumulated request configuration.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::{Error, Method, Request, Result};

/// Headers, query parameters and body a [`crate::Client`] applies to every
/// request it dispatches.
///
/// Header names are stored lower-cased so the last write for a name wins
/// whatever its casing. Query parameters are kept sorted by key, which is
/// the order they are encoded in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSpec {
    headers: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
    body: Option<Bytes>,
}

impl RequestSpec {
    /// Configured headers, keyed by lower-case name.
    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Single header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Configured query parameters.
    #[must_use]
    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Configured body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub(crate) fn set_header(&mut self, name: &str, value: String) {
        self.headers.insert(name.to_ascii_lowercase(), value);
    }

    pub(crate) fn set_query(&mut self, name: String, value: String) {
        self.query.insert(name, value);
    }

    pub(crate) fn set_body(&mut self, body: Bytes) {
        self.body = Some(body);
    }

    /// Resolve `url` against this configuration.
    ///
    /// The query component of `url` is replaced, never merged.
    pub fn to_request(&self, method: Method, url: &str) -> Result<Request> {
        let parsed = url::Url::parse(url).map_err(|e| Error::malformed_url(url, e))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::request_construction(format!(
                "unsupported protocol scheme '{}'",
                parsed.scheme()
            )));
        }

        let mut builder = Request::builder(method, parsed)
            .replace_query(&self.query)
            .headers(self.headers.iter().map(|(name, value)| (name, value.clone())));

        if let Some(body) = &self.body {
            builder = builder.body(body.clone());
        }

        Ok(builder.build())
    }
}
