//! Raw engine response.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

/// Response of a single round trip, before any classification.
///
/// The status is optional: a transport may hand back a response whose status
/// line could not be read.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: Option<u16>,
    headers: HeaderMap,
    body: Bytes,
}

impl RawResponse {
    /// Create a response from a status and body.
    pub fn new(status: Option<u16>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Attach response headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Create a response from a reqwest response.
    pub(crate) async fn from_reqwest(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(Self {
            status: Some(status),
            headers,
            body,
        })
    }

    /// Get the numeric status code, if one was received.
    pub fn status_code(&self) -> Option<u16> {
        self.status
    }

    /// Get the status code as a printable label.
    pub fn status_label(&self) -> String {
        self.status
            .map_or_else(|| "Unknown".to_string(), |s| s.to_string())
    }

    /// Get the HTTP reason phrase for the status.
    pub fn reason_phrase(&self) -> Option<&'static str> {
        self.status
            .and_then(|s| StatusCode::from_u16(s).ok())
            .and_then(|s| s.canonical_reason())
    }

    /// Get the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the response body as bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_reason_phrase() {
        assert_eq!(RawResponse::new(Some(404), "").reason_phrase(), Some("Not Found"));
        assert_eq!(RawResponse::new(Some(200), "").reason_phrase(), Some("OK"));
        assert_eq!(RawResponse::new(None, "").reason_phrase(), None);
    }

    #[test]
    fn test_status_label() {
        assert_eq!(RawResponse::new(Some(503), "").status_label(), "503");
        assert_eq!(RawResponse::new(None, "").status_label(), "Unknown");
    }

    #[test]
    fn test_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-elastic-product", "Elasticsearch".parse().unwrap());

        let response = RawResponse::new(Some(200), "").with_headers(headers);
        assert_eq!(response.headers()["x-elastic-product"], "Elasticsearch");
        assert!(RawResponse::new(Some(200), "").headers().is_empty());
    }

    #[test]
    fn test_json_body() {
        let response = RawResponse::new(Some(200), r#"{"_id":"abc123"}"#);
        let body: Value = response.json().unwrap();
        assert_eq!(body["_id"], "abc123");
        assert!(RawResponse::new(Some(200), "not json").json::<Value>().is_err());
    }
}
