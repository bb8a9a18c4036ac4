//! Fluent HTTP client with sequential and concurrent fan-out.
//!
//! A [`Client`] accumulates headers, query parameters and a body, then
//! issues requests with a verb method or fans the same request out over
//! many URLs. Responses decode into a generic map driven by their declared
//! content type.
//!
//! # Example
//!
//! ```ignore
//! use volley::prelude::*;
//!
//! let mut client = Client::new();
//! client.with_header("accept", "application/json");
//!
//! let responses = client
//!     .fan_out(
//!         Method::Get,
//!         ["https://a.example.com/health", "https://b.example.com/health"],
//!         FanOut::Concurrent,
//!     )
//!     .await?;
//!
//! for mut response in responses {
//!     let body = response.body_map().await?;
//!     println!("{:?}: {body:?}", response.url());
//! }
//! ```

mod client;
mod config;
mod connector;
mod fan_out;
pub mod middleware;
pub mod prelude;
mod spec;
mod transport;

pub use client::Client;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use fan_out::FanOut;
pub use spec::RequestSpec;
pub use transport::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use volley_core::{
    BoxError, ContentType, DecodedBody, Error, HttpClient, Method, RAW_KEY, Request, RequestBuilder,
    Response, ResponseBody, Result, StatusCode, decode_body, from_json, header, to_form, to_json,
};

pub use url;
