//! The transport boundary.
//!
//! [`HttpClient`] is the one capability the dispatcher needs: send a fully
//! built [`Request`] and get back a [`Response`] with an unconsumed body.
//! `volley::HyperClient` is the default implementation; tests and callers can
//! plug in their own.

use std::future::Future;

use crate::{Request, Response, Result};

/// Core HTTP transport trait.
///
/// Implementations must not retry and must not read the response body.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange does not complete:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    /// - Requests the transport cannot encode
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

impl<C: HttpClient> HttpClient for std::sync::Arc<C> {
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        (**self).execute(request)
    }
}
