//! Core types and traits for the volley HTTP client.
//!
//! This crate provides the foundational types used by volley:
//! - [`Method`] - HTTP method enum
//! - [`Request`] and [`RequestBuilder`] - immutable request descriptions
//! - [`Response`] - HTTP response with a single-use streaming body
//! - [`DecodedBody`] and [`decode_body`] - content-type driven body decoding
//! - [`Error`] and [`Result`] - Error handling
//! - [`HttpClient`] - transport trait

mod body;
mod client;
mod decode;
mod error;
mod method;
pub mod prelude;
mod request;
mod response;

pub use body::{ContentType, from_json, to_form, to_json};
pub use client::HttpClient;
pub use decode::{DecodedBody, RAW_KEY, decode_body};
pub use error::{BoxError, Error, Result};
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::{Response, ResponseBody};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
