//! Transport trait and the HTTP implementation.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, trace};

use crate::{EngineRequest, RawResponse, Result, TransportConfig, TransportError};

/// Performs exactly one round trip against the engine.
///
/// Implementations return every HTTP response they receive, whatever its
/// status, unless they choose to report it as [`TransportError::Status`].
/// Failures must be tagged at this boundary so the caller never inspects
/// error sources to decide whether to retry.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Perform a single round trip.
    async fn perform(&self, request: &EngineRequest) -> Result<RawResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn perform(&self, request: &EngineRequest) -> Result<RawResponse> {
        (**self).perform(request).await
    }
}

/// `reqwest`-backed transport.
///
/// Requests are spread over the configured nodes round-robin, so a retried
/// request may land on a different node than the attempt before it.
#[derive(Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
    nodes: Arc<Vec<url::Url>>,
    next_node: Arc<AtomicUsize>,
    config: Arc<TransportConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    pub fn new(config: TransportConfig) -> Result<Self> {
        if config.nodes.is_empty() {
            return Err(TransportError::Build("No nodes provided".to_string()));
        }

        let nodes = config
            .nodes
            .iter()
            .map(|node| url::Url::parse(node))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let inner = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        debug!(nodes = ?config.nodes, "HTTP transport initialized");

        Ok(Self {
            inner,
            nodes: Arc::new(nodes),
            next_node: Arc::new(AtomicUsize::new(0)),
            config: Arc::new(config),
        })
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn node(&self) -> &url::Url {
        let index = self.next_node.fetch_add(1, Ordering::Relaxed) % self.nodes.len();
        &self.nodes[index]
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn perform(&self, request: &EngineRequest) -> Result<RawResponse> {
        let url = request.url(self.node())?;
        trace!(method = %request.method(), %url, "Sending engine request");

        let mut builder = self.inner.request(request.method().clone(), url);

        if let Some(username) = &self.config.username {
            builder = builder.basic_auth(username, self.config.password.as_ref());
        }

        if let Some(body) = request.body() {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, body.content_type())
                .body(body.as_str().to_owned());
        }

        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, start.elapsed()))?;

        RawResponse::from_reqwest(response)
            .await
            .map_err(|e| TransportError::from_reqwest(e, start.elapsed()))
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("nodes", &self.config.nodes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::time::Duration;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_rejects_empty_node_list() {
        let result = HttpTransport::new(TransportConfig::cluster(Vec::new()));
        assert!(matches!(result, Err(TransportError::Build(_))));
    }

    #[test]
    fn test_rejects_invalid_node_url() {
        let result = HttpTransport::new(TransportConfig::new("not a url"));
        assert!(matches!(result, Err(TransportError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/metrics-1/_doc/abc123"))
            .and(header("content-type", "application/json"))
            .and(body_string(r#"{"name":"temp"}"#))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("x-elastic-product", "Elasticsearch")
                    .set_body_json(json!({ "_id": "abc123", "_index": "metrics-1" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(TransportConfig::new(server.uri())).unwrap();
        let request = EngineRequest::put(["metrics-1", "_doc", "abc123"]).json(r#"{"name":"temp"}"#);

        let response = transport.perform(&request).await.unwrap();
        assert_eq!(response.status_code(), Some(201));
        assert_eq!(response.headers()["x-elastic-product"], "Elasticsearch");

        let body: Value = response.json().unwrap();
        assert_eq!(body["_id"], "abc123");
    }

    #[tokio::test]
    async fn test_error_status_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(TransportConfig::new(server.uri())).unwrap();
        let response = transport
            .perform(&EngineRequest::head(["missing"]))
            .await
            .unwrap();

        assert_eq!(response.status_code(), Some(404));
        assert_eq!(response.reason_phrase(), Some("Not Found"));
    }

    #[tokio::test]
    async fn test_query_parameters_and_ndjson() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/_bulk"))
            .and(query_param("refresh", "true"))
            .and(header("content-type", "application/x-ndjson"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(TransportConfig::new(server.uri())).unwrap();
        let request = EngineRequest::post(["_bulk"])
            .query("refresh", "true")
            .ndjson("{\"update\":{}}\n{\"doc\":{}}\n");

        let response = transport.perform(&request).await.unwrap();
        assert_eq!(response.status_code(), Some(200));
    }

    #[tokio::test]
    async fn test_slow_engine_is_reported_as_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow/_search"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let config =
            TransportConfig::new(server.uri()).with_request_timeout(Duration::from_millis(50));
        let transport = HttpTransport::new(config).unwrap();

        let error = transport
            .perform(&EngineRequest::get(["slow", "_search"]))
            .await
            .unwrap_err();

        assert!(error.is_transient(), "expected timeout, got {error:?}");
    }

    #[tokio::test]
    async fn test_round_robin_over_nodes() {
        let first = MockServer::start().await;
        let second = MockServer::start().await;
        for server in [&first, &second] {
            Mock::given(method("POST"))
                .and(path("/_refresh"))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(server)
                .await;
        }

        let transport =
            HttpTransport::new(TransportConfig::cluster(vec![first.uri(), second.uri()])).unwrap();
        let request = EngineRequest::post(["_refresh"]);

        transport.perform(&request).await.unwrap();
        transport.perform(&request).await.unwrap();
    }
}
