//! Body serialization utilities.

use bytes::Bytes;

use crate::Result;

/// Content types the response decoder recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// `application/json`
    Json,
    /// `application/x-www-form-urlencoded`
    FormUrlEncoded,
    /// `text/plain`
    PlainText,
    /// `text/html`
    Html,
    /// `text/xml`
    Xml,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
            Self::PlainText => "text/plain",
            Self::Html => "text/html",
            Self::Xml => "text/xml",
        }
    }

    /// Match a header value exactly.
    ///
    /// Parameters are not stripped: `text/plain; charset=utf-8` is not
    /// recognised.
    #[must_use]
    pub fn from_header(value: &str) -> Option<Self> {
        [
            Self::Json,
            Self::FormUrlEncoded,
            Self::PlainText,
            Self::Html,
            Self::Xml,
        ]
        .into_iter()
        .find(|content_type| content_type.as_str() == value)
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serialize a value to JSON bytes.
///
/// # Example
///
/// ```
/// use volley_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User { name: String }
///
/// let user = User { name: "Alice".to_string() };
/// let bytes = to_json(&user).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"Alice"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Serialize a value to form URL-encoded bytes.
///
/// # Example
///
/// ```
/// use volley_core::to_form;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Login { username: String, password: String }
///
/// let login = Login { username: "alice".to_string(), password: "secret".to_string() };
/// let bytes = to_form(&login).expect("serialize");
/// assert_eq!(bytes.as_ref(), b"username=alice&password=secret");
/// ```
pub fn to_form<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_urlencoded::to_string(value)
        .map(|s| Bytes::from(s.into_bytes()))
        .map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_from_header_is_exact() {
        assert_eq!(
            ContentType::from_header("application/json"),
            Some(ContentType::Json)
        );
        assert_eq!(ContentType::from_header("text/xml"), Some(ContentType::Xml));
        assert_eq!(ContentType::from_header("application/json; charset=utf-8"), None);
        assert_eq!(ContentType::from_header("Application/JSON"), None);
        assert_eq!(ContentType::from_header("image/png"), None);
    }

    #[test]
    fn content_type_display() {
        assert_eq!(
            ContentType::FormUrlEncoded.to_string(),
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn from_json_missing_field_error_with_path() {
        #[derive(Debug, serde::Deserialize)]
        struct Address {
            #[allow(dead_code)]
            city: String,
        }

        #[derive(Debug, serde::Deserialize)]
        struct User {
            #[allow(dead_code)]
            address: Address,
        }

        let result: Result<User> = from_json(br#"{"address":{}}"#);

        let msg = result.expect_err("should fail").to_string();
        assert!(msg.contains("address"), "Expected path in error: {msg}");
        assert!(msg.contains("city"), "Expected field in error: {msg}");
    }
}
