//! Content-type driven body decoding.
//!
//! [`Response::body_map`] drains the body once and normalises it into a
//! [`DecodedBody`], choosing the parser from the exact `Content-Type` value:
//!
//! | Content-Type | Result |
//! |---|---|
//! | `application/json` | the top-level JSON object |
//! | `application/x-www-form-urlencoded` | first value of each key, as a string |
//! | `text/plain`, `text/html`, `text/xml`, other, absent | `{"raw": <text>}` |

use serde_json::{Map, Value};

use crate::{ContentType, Error, Response, Result};

/// Key holding the body text for non-structured content types.
pub const RAW_KEY: &str = "raw";

/// A decoded response body.
pub type DecodedBody = Map<String, Value>;

impl Response {
    /// Drain the body and decode it according to the declared content type.
    ///
    /// # Errors
    ///
    /// - [`Error::BodyRead`] if the stream fails or the body was already consumed.
    /// - [`Error::Decode`] if the selected parser rejects the body.
    pub async fn body_map(&mut self) -> Result<DecodedBody> {
        let body = self.bytes().await?;
        decode_body(self.content_type(), &body)
    }
}

/// Decode an already-buffered body.
///
/// `content_type` is matched verbatim; parameters such as `charset` make the
/// value unrecognised and select the raw fallback.
pub fn decode_body(content_type: Option<&str>, body: &[u8]) -> Result<DecodedBody> {
    match content_type.and_then(ContentType::from_header) {
        Some(ContentType::Json) => decode_json(body),
        Some(ContentType::FormUrlEncoded) => decode_form(body),
        Some(ContentType::PlainText | ContentType::Html | ContentType::Xml) | None => {
            Ok(wrap_raw(body))
        }
    }
}

fn decode_json(body: &[u8]) -> Result<DecodedBody> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| Error::decode(ContentType::Json.as_str(), e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::decode(
            ContentType::Json.as_str(),
            format!("expected a JSON object, found {}", json_kind(&other)),
        )),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn decode_form(body: &[u8]) -> Result<DecodedBody> {
    let form_error = |message: String| Error::decode(ContentType::FormUrlEncoded.as_str(), message);

    let text = std::str::from_utf8(body).map_err(|e| form_error(e.to_string()))?;
    validate_form(text).map_err(form_error)?;

    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(text).map_err(|e| form_error(e.to_string()))?;

    let mut map = Map::new();
    for (key, value) in pairs {
        map.entry(key).or_insert(Value::String(value));
    }
    Ok(map)
}

/// Reject what a strict form parser refuses: `;` separators and `%` not
/// followed by two hex digits.
fn validate_form(text: &str) -> std::result::Result<(), String> {
    if text.contains(';') {
        return Err("invalid semicolon separator".to_string());
    }

    let bytes = text.as_bytes();
    for (index, _) in text.match_indices('%') {
        let escape = bytes.get(index + 1..index + 3);
        let valid = escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            let end = (index + 3).min(text.len());
            let snippet = text.get(index..end).unwrap_or("%");
            return Err(format!("invalid URL escape {snippet:?}"));
        }
    }
    Ok(())
}

fn wrap_raw(body: &[u8]) -> DecodedBody {
    let mut map = Map::new();
    map.insert(
        RAW_KEY.to_string(),
        Value::String(String::from_utf8_lossy(body).into_owned()),
    );
    map
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;

    fn response(content_type: Option<&str>, body: &'static str) -> Response {
        let headers = content_type
            .map(|ct| HashMap::from([("Content-Type".to_string(), ct.to_string())]))
            .unwrap_or_default();
        Response::from_bytes(200, headers, body)
    }

    #[tokio::test]
    async fn json_object_becomes_map() {
        let mut response = response(Some("application/json"), r#"{"a":1}"#);

        let decoded = response.body_map().await.expect("decode");
        check!(decoded.len() == 1);
        check!(decoded["a"] == json!(1));
    }

    #[tokio::test]
    async fn invalid_json_is_decode_error() {
        let mut response = response(Some("application/json"), "{not json");

        let_assert!(Err(Error::Decode { content_type, .. }) = response.body_map().await);
        check!(content_type == "application/json");
    }

    #[test]
    fn json_array_is_decode_error() {
        let_assert!(Err(err) = decode_body(Some("application/json"), b"[1,2]"));
        check!(err.to_string().contains("an array"));
    }

    #[tokio::test]
    async fn form_keeps_first_value() {
        let mut response = response(Some("application/x-www-form-urlencoded"), "a=1&a=2&b=3");

        let decoded = response.body_map().await.expect("decode");
        check!(decoded.len() == 2);
        check!(decoded["a"] == json!("1"));
        check!(decoded["b"] == json!("3"));
    }

    #[test]
    fn form_decodes_escapes() {
        let decoded = decode_body(
            Some("application/x-www-form-urlencoded"),
            b"q=rust+lang&path=%2Fhome",
        )
        .expect("decode");

        check!(decoded["q"] == json!("rust lang"));
        check!(decoded["path"] == json!("/home"));
    }

    #[test]
    fn malformed_form_is_decode_error() {
        for body in ["a=%zz", "a=1%", "a=1;b=2", "a=%4"] {
            let_assert!(
                Err(err) = decode_body(Some("application/x-www-form-urlencoded"), body.as_bytes())
            );
            check!(err.is_decode(), "body: {body}");
        }
    }

    #[tokio::test]
    async fn text_types_are_wrapped_raw() {
        for content_type in ["text/plain", "text/html", "text/xml"] {
            let mut response = response(Some(content_type), "hello");

            let decoded = response.body_map().await.expect("decode");
            check!(decoded.len() == 1);
            check!(decoded[RAW_KEY] == json!("hello"));
        }
    }

    #[tokio::test]
    async fn unknown_or_missing_content_type_falls_back_to_raw() {
        for content_type in [None, Some("image/png"), Some("text/plain; charset=utf-8")] {
            let mut response = response(content_type, "hello");

            let decoded = response.body_map().await.expect("decode");
            check!(decoded == wrap_raw(b"hello"));
        }
    }

    #[tokio::test]
    async fn json_with_charset_parameter_is_raw() {
        let mut response = response(Some("application/json; charset=utf-8"), r#"{"a":1}"#);

        let decoded = response.body_map().await.expect("decode");
        check!(decoded[RAW_KEY] == json!(r#"{"a":1}"#));
    }

    #[tokio::test]
    async fn decoding_twice_fails() {
        let mut response = response(Some("text/plain"), "hello");

        response.body_map().await.expect("first decode");

        let_assert!(Err(err) = response.body_map().await);
        check!(err.is_body_read());
    }

    #[tokio::test]
    async fn failed_decode_still_consumes_body() {
        let mut response = response(Some("application/json"), "nope");

        let_assert!(Err(_) = response.body_map().await);
        check!(response.is_body_consumed());
    }
}
