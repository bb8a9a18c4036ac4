//! Prelude module for convenient imports.
//!
//! ```ignore
//! use volley_core::prelude::*;
//! ```

pub use crate::{
    ContentType, DecodedBody, Error, HttpClient, Method, Request, RequestBuilder, Response,
    ResponseBody, Result, decode_body, from_json, to_form, to_json,
};
