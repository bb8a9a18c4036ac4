//! Prelude module for convenient imports.
//!
//! ```ignore
//! use volley::prelude::*;
//! ```

pub use crate::{
    Client, ClientConfig, ContentType, DecodedBody, Error, FanOut, HttpClient, HyperClient,
    Method, Request, RequestSpec, Response, Result,
};
