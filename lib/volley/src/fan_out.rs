//! Fan-out dispatch: one request shape, many target URLs.
//!
//! The three [`FanOut`] modes differ in how failures and ordering are
//! reported:
//!
//! | Mode | Order of results | A failing URL |
//! |---|---|---|
//! | [`FanOut::Sequential`] | input order | aborts the call, earlier responses are dropped |
//! | [`FanOut::Concurrent`] | input order, failures skipped | logged and omitted |
//! | [`FanOut::ConcurrentAsCompleted`] | completion order | logged and omitted |
//!
//! Concurrent modes never return an error: compare the number of responses
//! with the number of URLs to detect omissions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, warn};

use crate::client::dispatch;
use crate::{Client, HttpClient, Method, Response, Result};

/// How [`Client::fan_out`] drives its URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FanOut {
    /// One URL at a time, stopping at the first failure.
    #[default]
    Sequential,
    /// One task per URL, all spawned up front. Task `i` owns result slot `i`.
    Concurrent,
    /// One task per URL, all spawned up front. Results are gathered as
    /// tasks finish.
    ConcurrentAsCompleted,
}

impl From<bool> for FanOut {
    /// `true` selects [`FanOut::Concurrent`].
    fn from(concurrent: bool) -> Self {
        if concurrent {
            Self::Concurrent
        } else {
            Self::Sequential
        }
    }
}

impl<C: HttpClient + 'static> Client<C> {
    /// Issue `method` against every URL, sequentially or concurrently.
    ///
    /// Shorthand for [`Client::fan_out`] with [`FanOut::from`]`(concurrent)`.
    pub async fn do_all<I>(&self, method: Method, urls: I, concurrent: bool) -> Result<Vec<Response>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.fan_out(method, urls, FanOut::from(concurrent)).await
    }

    /// Issue `method` against every URL with the current configuration.
    ///
    /// Concurrent modes spawn Tokio tasks and must run inside a Tokio
    /// runtime; on a multi-thread runtime the requests proceed in parallel.
    /// The call returns once every task has finished.
    ///
    /// # Errors
    ///
    /// Only [`FanOut::Sequential`] fails, with the first URL's error.
    pub async fn fan_out<I>(&self, method: Method, urls: I, mode: FanOut) -> Result<Vec<Response>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let urls: Vec<String> = urls.into_iter().map(|url| url.as_ref().to_owned()).collect();

        match mode {
            FanOut::Sequential => self.sequential(method, &urls).await,
            FanOut::Concurrent => Ok(self.concurrent(method, urls, true).await),
            FanOut::ConcurrentAsCompleted => Ok(self.concurrent(method, urls, false).await),
        }
    }

    async fn sequential(&self, method: Method, urls: &[String]) -> Result<Vec<Response>> {
        let mut responses = Vec::with_capacity(urls.len());

        for url in urls {
            match dispatch(self.transport.as_ref(), &self.spec, method, url).await {
                Ok(response) => responses.push(response),
                Err(err) => {
                    warn!(
                        %method,
                        url = url.as_str(),
                        error = %err,
                        discarded = responses.len(),
                        "sequential fan-out aborted"
                    );
                    return Err(err);
                }
            }
        }

        debug!(%method, count = responses.len(), "sequential fan-out finished");
        Ok(responses)
    }

    /// Spawn one task per URL into a [`JoinSet`] and keep every success.
    ///
    /// Task `i` owns slot `i`: with `in_order` the successes are returned in
    /// input order, otherwise in completion order. Dropping the returned
    /// future aborts the tasks still in flight.
    async fn concurrent(&self, method: Method, urls: Vec<String>, in_order: bool) -> Vec<Response> {
        let mut tasks = JoinSet::new();
        let mut slots = HashMap::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            let transport = Arc::clone(&self.transport);
            let spec = Arc::clone(&self.spec);
            let url = url.clone();
            let handle = tasks.spawn(async move { dispatch(transport.as_ref(), &spec, method, &url).await });
            slots.insert(handle.id(), index);
        }

        let mut settled = Vec::with_capacity(urls.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            let id = match &joined {
                Ok((id, _)) => *id,
                Err(err) => err.id(),
            };
            let Some(&index) = slots.get(&id) else {
                continue;
            };
            let url = urls.get(index).map_or("", String::as_str);
            let outcome = joined.map(|(_, result)| result);
            if let Some(response) = settle(method, url, outcome) {
                settled.push((index, response));
            }
        }

        if in_order {
            settled.sort_unstable_by_key(|(index, _)| *index);
        }

        debug!(
            %method,
            requested = urls.len(),
            succeeded = settled.len(),
            in_order,
            "concurrent fan-out finished"
        );
        settled.into_iter().map(|(_, response)| response).collect()
    }
}

/// Keep a successful response; log anything else, panics included, and drop it.
fn settle(
    method: Method,
    url: &str,
    outcome: std::result::Result<Result<Response>, JoinError>,
) -> Option<Response> {
    match outcome {
        Ok(Ok(response)) => Some(response),
        Ok(Err(err)) => {
            warn!(%method, url, error = %err, "request failed, omitted from fan-out results");
            None
        }
        Err(err) => {
            warn!(%method, url, error = %err, "request task did not complete, omitted from fan-out results");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use assert2::check;

    use super::*;
    use crate::Request;

    /// Answers with an empty 200, but panics on `/boom`.
    struct PanicOnBoom;

    impl HttpClient for PanicOnBoom {
        async fn execute(&self, request: Request) -> Result<Response> {
            assert!(request.url().path() != "/boom", "transport blew up");
            Ok(Response::from_bytes(200, HashMap::new(), ""))
        }
    }

    /// Never answers; counts the requests started and still in flight.
    struct Stalled {
        started: Arc<AtomicUsize>,
        in_flight: Arc<AtomicUsize>,
    }

    struct InFlight(Arc<AtomicUsize>);

    impl Drop for InFlight {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl HttpClient for Stalled {
        async fn execute(&self, _request: Request) -> Result<Response> {
            self.started.fetch_add(1, Ordering::SeqCst);
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            let _guard = InFlight(Arc::clone(&self.in_flight));
            std::future::pending().await
        }
    }

    fn paths(responses: &[Response]) -> Vec<&str> {
        responses
            .iter()
            .filter_map(|response| response.url().map(url::Url::path))
            .collect()
    }

    #[test]
    fn fan_out_from_flag() {
        assert_eq!(FanOut::from(false), FanOut::Sequential);
        assert_eq!(FanOut::from(true), FanOut::Concurrent);
        assert_eq!(FanOut::default(), FanOut::Sequential);
    }

    #[tokio::test]
    async fn panicked_task_is_omitted_in_concurrent_modes() {
        let client = Client::with_transport(PanicOnBoom);
        let urls = [
            "http://localhost/a",
            "http://localhost/boom",
            "http://localhost/c",
        ];

        let responses = client
            .fan_out(Method::Get, urls, FanOut::Concurrent)
            .await
            .expect("never fails");
        check!(paths(&responses) == ["/a", "/c"]);

        let responses = client
            .fan_out(Method::Get, urls, FanOut::ConcurrentAsCompleted)
            .await
            .expect("never fails");
        check!(responses.len() == 2);
    }

    #[tokio::test]
    async fn dropping_fan_out_aborts_in_flight_requests() {
        let started = Arc::new(AtomicUsize::new(0));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let client = Client::with_transport(Stalled {
            started: Arc::clone(&started),
            in_flight: Arc::clone(&in_flight),
        });
        let urls = ["http://localhost/1", "http://localhost/2", "http://localhost/3"];

        for mode in [FanOut::Concurrent, FanOut::ConcurrentAsCompleted] {
            let fan_out = client.fan_out(Method::Get, urls, mode);
            let timed_out = tokio::time::timeout(Duration::from_millis(50), fan_out).await;
            check!(timed_out.is_err());

            for _ in 0..50 {
                if in_flight.load(Ordering::SeqCst) == 0 {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            check!(in_flight.load(Ordering::SeqCst) == 0, "mode {mode:?}");
        }
        check!(started.load(Ordering::SeqCst) == 6);
    }
}
