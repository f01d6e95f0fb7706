//! Datastore client implementation.

use crate::{
    bulk::BulkPlan,
    classify::ResponseClass,
    config::ClientConfig,
    error::{ClientError, Result},
    executor::RequestExecutor,
    index::IndexManager,
    metrics::ClientMetrics,
    model::{ModelContext, QueryConverter},
    request::{BulkUpdateRequest, InsertRequest, UpdateRequest},
    resource::{self, MULTI_INDEX},
    response::{BulkUpdateResponse, InsertResponse, ResultList, UpdateResponse},
    search::{self, TotalHits},
};
use datastore_transport::{EngineRequest, HttpTransport, RawResponse, Transport};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// State shared by the client and its index manager.
#[derive(Debug)]
pub(crate) struct ClientCore {
    transport: Arc<dyn Transport>,
    executor: RequestExecutor,
    config: ClientConfig,
}

impl ClientCore {
    /// Perform `request` through the executor.
    pub(crate) async fn send(
        &self,
        request: EngineRequest,
        index: &str,
        operation: &str,
    ) -> Result<RawResponse> {
        let transport = self.transport.as_ref();
        let request = &request;
        self.executor
            .execute(move || transport.perform(request), index, operation)
            .await
    }
}

/// Client for a document search engine.
///
/// Cloning is cheap; clones share the transport, the executor and its
/// metrics.
pub struct DatastoreClient<M, Q> {
    core: Arc<ClientCore>,
    model: Arc<M>,
    converter: Arc<Q>,
}

impl<M, Q> Clone for DatastoreClient<M, Q> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            model: Arc::clone(&self.model),
            converter: Arc::clone(&self.converter),
        }
    }
}

impl<M, Q> std::fmt::Debug for DatastoreClient<M, Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatastoreClient")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<M: ModelContext, Q: QueryConverter> DatastoreClient<M, Q> {
    /// Start building a client.
    pub fn builder() -> DatastoreClientBuilder<M, Q> {
        DatastoreClientBuilder::new()
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.core.config
    }

    /// Get the executor metrics.
    pub fn metrics(&self) -> &ClientMetrics {
        self.core.executor.metrics()
    }

    /// Get the model context.
    pub fn model_context(&self) -> &M {
        &self.model
    }

    /// Get an index manager for index operations.
    pub fn indices(&self) -> IndexManager {
        IndexManager::new(Arc::clone(&self.core))
    }

    /// Insert a record.
    ///
    /// Without an explicit id the engine generates one.
    pub async fn insert(&self, request: &InsertRequest<M::Storable>) -> Result<InsertResponse> {
        let document = self.model.marshal(request.storable())?;
        debug!(index = request.index(), ?document, "Insert - converted object");

        let body = to_json(&document)?;
        let response = self
            .core
            .send(
                resource::insert(request.index(), request.id()).json(body),
                request.index(),
                "INSERT",
            )
            .await?;

        if !ResponseClass::of(&response).is_success() {
            return Err(ClientError::action_response("Insert", &response));
        }

        let body = read_json(&response)?;
        Ok(InsertResponse {
            id: required_str(&body, "_id")?.to_string(),
            index: required_str(&body, "_index")?.to_string(),
        })
    }

    /// Insert or update a record addressed by index and id.
    pub async fn upsert(&self, request: &UpdateRequest<M::Storable>) -> Result<UpdateResponse> {
        let document = self.model.marshal(request.storable())?;
        debug!(index = request.index(), id = request.id(), ?document, "Upsert - converted object");

        let body = to_json(&json!({ "doc": document, "doc_as_upsert": true }))?;
        let response = self
            .core
            .send(
                resource::upsert(request.index(), request.id()).json(body),
                request.index(),
                "UPSERT",
            )
            .await?;

        if !ResponseClass::of(&response).is_success() {
            return Err(ClientError::action_response("Update", &response));
        }

        let body = read_json(&response)?;
        Ok(UpdateResponse::succeeded(
            Some(required_str(&body, "_id")?.to_string()),
            required_str(&body, "_index")?,
        ))
    }

    /// Upsert a batch in one round trip.
    ///
    /// Item failures are reported in-band, in submission order; only a
    /// failure of the whole call is an error.
    pub async fn upsert_bulk(
        &self,
        request: &BulkUpdateRequest<M::Storable>,
    ) -> Result<BulkUpdateResponse> {
        if request.is_empty() {
            return Ok(BulkUpdateResponse::default());
        }

        let plan = BulkPlan::encode(self.model.as_ref(), request)?;
        if !plan.has_submissions() {
            return Ok(BulkUpdateResponse::new(plan.into_local_outcomes()));
        }

        let response = self
            .core
            .send(
                resource::bulk().ndjson(plan.body().to_string()),
                MULTI_INDEX,
                "UPSERT BULK",
            )
            .await?;

        if !ResponseClass::of(&response).is_success() {
            return Err(ClientError::action_response("Upsert", &response));
        }

        let outcomes = plan.reconcile(&read_json(&response)?)?;
        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        if failed > 0 {
            info!(items = outcomes.len(), failed, "Bulk upsert completed with failures");
        }

        Ok(BulkUpdateResponse::new(outcomes))
    }

    /// Run a query and hydrate its hits.
    ///
    /// A 400 or 404 answer reads as an empty result.
    pub async fn query(&self, index: &str, query: &Q::Query) -> Result<ResultList<M::Storable>> {
        let body = self.converter.convert_query(query)?;
        debug!(index, query = %body, "Query - converted query");

        let response = self
            .core
            .send(resource::search(index).json(to_json(&body)?), index, "QUERY")
            .await?;

        match ResponseClass::of(&response) {
            ResponseClass::Success => search::hydrate(
                self.model.as_ref(),
                self.converter.fetch_style(query),
                &read_json(&response)?,
            ),
            ResponseClass::BadRequest | ResponseClass::NotFound => Ok(ResultList::empty()),
            ResponseClass::Other => Err(ClientError::action_response("Query", &response)),
        }
    }

    /// First record matching a query.
    pub async fn find(&self, index: &str, query: &Q::Query) -> Result<Option<M::Storable>> {
        Ok(self.query(index, query).await?.into_iter().next())
    }

    /// Count the documents matching a query.
    ///
    /// Fails with [`ClientError::LimitsExceeded`] when the engine only
    /// reports a lower bound.
    pub async fn count(&self, index: &str, query: &Q::Query) -> Result<u64> {
        let body = self.converter.convert_query(query)?;
        debug!(index, query = %body, "Count - converted query");

        let response = self
            .core
            .send(resource::search(index).json(to_json(&body)?), index, "COUNT")
            .await?;

        match ResponseClass::of(&response) {
            ResponseClass::Success => TotalHits::from_response(&read_json(&response)?)?.exact_count(),
            ResponseClass::BadRequest | ResponseClass::NotFound => Ok(0),
            ResponseClass::Other => Err(ClientError::action_response("Count", &response)),
        }
    }

    /// Delete a document. Deleting an absent document succeeds.
    pub async fn delete(&self, index: &str, id: &str) -> Result<()> {
        debug!(index, id, "Delete");

        let response = self
            .core
            .send(resource::delete(index, id), index, "DELETE")
            .await?;

        if ResponseClass::of(&response).is_accepted_by(&[ResponseClass::NotFound]) {
            Ok(())
        } else {
            Err(ClientError::action_response("Delete", &response))
        }
    }

    /// Delete every document matching a query.
    ///
    /// A missing index deletes nothing. A rejected query deletes nothing too
    /// while `delete_by_query_tolerates_bad_request` is set.
    pub async fn delete_by_query(&self, index: &str, query: &Q::Query) -> Result<()> {
        let body = self.converter.convert_query(query)?;
        debug!(index, query = %body, "Delete by query - converted query");

        let response = self
            .core
            .send(
                resource::delete_by_query(index).json(to_json(&body)?),
                index,
                "DELETE BY QUERY",
            )
            .await?;

        match ResponseClass::of(&response) {
            ResponseClass::Success | ResponseClass::NotFound => Ok(()),
            ResponseClass::BadRequest if self.core.config.delete_by_query_tolerates_bad_request => {
                warn!(index, query = %body, "Delete by query rejected as bad request, nothing deleted");
                Ok(())
            }
            _ => Err(ClientError::action_response("Delete by query", &response)),
        }
    }
}

/// Builder for [`DatastoreClient`].
pub struct DatastoreClientBuilder<M, Q> {
    config: Option<ClientConfig>,
    transport: Option<Arc<dyn Transport>>,
    model: Option<M>,
    converter: Option<Q>,
    metrics: Option<ClientMetrics>,
}

impl<M: ModelContext, Q: QueryConverter> DatastoreClientBuilder<M, Q> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            config: None,
            transport: None,
            model: None,
            converter: None,
            metrics: None,
        }
    }

    /// Set the client configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use this transport instead of one built from the configuration.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Set the model context.
    pub fn model_context(mut self, model: M) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the query converter.
    pub fn query_converter(mut self, converter: Q) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Record into these metrics instead of fresh ones.
    pub fn metrics(mut self, metrics: ClientMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<DatastoreClient<M, Q>> {
        let config = self
            .config
            .ok_or_else(|| ClientError::Initialization("client configuration not set".to_string()))?;
        let model = self
            .model
            .ok_or_else(|| ClientError::Initialization("model context not set".to_string()))?;
        let converter = self
            .converter
            .ok_or_else(|| ClientError::Initialization("query converter not set".to_string()))?;

        config.validate()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let transport = HttpTransport::new(config.transport_config()).map_err(|e| {
                    ClientError::Initialization(format!("cannot create transport: {e}"))
                })?;
                Arc::new(transport) as Arc<dyn Transport>
            }
        };

        let metrics = match self.metrics {
            Some(metrics) => metrics,
            None => ClientMetrics::new().map_err(|e| {
                ClientError::Initialization(format!("cannot create metrics: {e}"))
            })?,
        };

        info!(nodes = ?config.nodes, "Initializing datastore client");

        Ok(DatastoreClient {
            core: Arc::new(ClientCore {
                transport,
                executor: RequestExecutor::new(config.retry_config(), metrics),
                config,
            }),
            model: Arc::new(model),
            converter: Arc::new(converter),
        })
    }
}

impl<M: ModelContext, Q: QueryConverter> Default for DatastoreClientBuilder<M, Q> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(ClientError::RequestEntityWrite)
}

fn read_json(response: &RawResponse) -> Result<Value> {
    response.json().map_err(ClientError::ResponseEntityRead)
}

fn required_str<'a>(body: &'a Value, key: &str) -> Result<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::Internal(format!("Response has no '{key}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{document::Document, document::FetchStyle, error::MarshalResult};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn perform(&self, _request: &EngineRequest) -> datastore_transport::Result<RawResponse> {
            Err(datastore_transport::TransportError::Connection("unreachable".to_string()))
        }
    }

    struct Plain;

    impl ModelContext for Plain {
        type Storable = Value;

        fn id_key_name(&self) -> &str {
            "id"
        }

        fn marshal(&self, storable: &Value) -> MarshalResult<Document> {
            Document::from_value(storable.clone())
        }

        fn unmarshal(&self, document: Document) -> MarshalResult<Value> {
            Ok(document.into_value())
        }
    }

    struct Raw;

    impl QueryConverter for Raw {
        type Query = Value;

        fn convert_query(&self, query: &Value) -> MarshalResult<Value> {
            Ok(query.clone())
        }

        fn fetch_style(&self, _query: &Value) -> FetchStyle {
            FetchStyle::SourceFull
        }
    }

    #[test]
    fn test_build_requires_collaborators() {
        let missing_config = DatastoreClient::<Plain, Raw>::builder()
            .model_context(Plain)
            .query_converter(Raw)
            .build();
        assert!(matches!(missing_config, Err(ClientError::Initialization(_))));

        let missing_model = DatastoreClient::<Plain, Raw>::builder()
            .config(ClientConfig::default())
            .query_converter(Raw)
            .build();
        assert!(matches!(missing_model, Err(ClientError::Initialization(_))));

        let missing_converter = DatastoreClient::<Plain, Raw>::builder()
            .config(ClientConfig::default())
            .model_context(Plain)
            .build();
        assert!(matches!(missing_converter, Err(ClientError::Initialization(_))));
    }

    #[test]
    fn test_build_rejects_bad_node_url() {
        let result = DatastoreClient::<Plain, Raw>::builder()
            .config(ClientConfig::new("not a url"))
            .model_context(Plain)
            .query_converter(Raw)
            .build();
        assert!(matches!(result, Err(ClientError::Initialization(_))));
    }

    #[tokio::test]
    async fn test_clones_share_metrics() {
        let client = DatastoreClient::builder()
            .config(ClientConfig::default())
            .transport(Unreachable)
            .model_context(Plain)
            .query_converter(Raw)
            .build()
            .unwrap();

        let clone = client.clone();
        let result = clone.delete("metrics-1", "abc").await;

        assert!(matches!(result, Err(ClientError::Transport { .. })));
        assert_eq!(client.metrics().timeout_retry_count(), 0);
        assert_eq!(client.config().retry_attempt_max, 3);
    }
}
