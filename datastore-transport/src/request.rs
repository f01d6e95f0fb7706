//! Engine request description.

use http::Method;

/// Request body sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// A single UTF-8 JSON document.
    Json(String),
    /// A newline-delimited JSON command stream.
    NdJson(String),
}

impl RequestBody {
    /// Content type header value for this body.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json(_) => "application/json",
            Self::NdJson(_) => "application/x-ndjson",
        }
    }

    /// Body payload.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Json(s) | Self::NdJson(s) => s,
        }
    }
}

/// One logical request against the engine's HTTP API.
///
/// The path is kept as raw segments; the transport encodes them when the
/// final URL is assembled, so index names and ids never need escaping here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequest {
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<RequestBody>,
}

impl EngineRequest {
    /// Create a new request.
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Create a GET request.
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, segments)
    }

    /// Create a POST request.
    pub fn post<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::POST, segments)
    }

    /// Create a PUT request.
    pub fn put<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::PUT, segments)
    }

    /// Create a DELETE request.
    pub fn delete<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::DELETE, segments)
    }

    /// Create a HEAD request.
    pub fn head<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::HEAD, segments)
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set a JSON body.
    pub fn json(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Json(body.into()));
        self
    }

    /// Set a newline-delimited JSON body.
    pub fn ndjson(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::NdJson(body.into()));
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Raw path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Query parameters.
    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    /// Request body, if any.
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Path as it appears in logs, e.g. `/metrics-1/_doc/abc`.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Resolve the request against a node URL.
    pub fn url(&self, node: &url::Url) -> crate::Result<url::Url> {
        let mut url = node.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| crate::TransportError::InvalidUrl(node.to_string()))?;
            path.pop_if_empty();
            path.extend(&self.segments);
        }

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}
