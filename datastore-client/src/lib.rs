//! Resilient client for a document-oriented search engine.
//!
//! This crate sits between application code and the engine's HTTP API:
//! - Timed-out round trips are retried with jittered backoff and counted
//! - Every engine answer is classified before it is interpreted
//! - Records are marshalled through a caller-supplied [`ModelContext`]
//! - Bulk upserts report per-item failures in-band, in submission order
//!
//! # Example
//!
//! ```rust,no_run
//! use datastore_client::prelude::*;
//! use serde::{Deserialize, Serialize};
//! use serde_json::{Value, json};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Kind {
//!     Metric,
//! }
//!
//! impl StorableKind for Kind {
//!     fn from_type_descriptor(descriptor: &str) -> Option<Self> {
//!         descriptor.starts_with("metrics-").then_some(Kind::Metric)
//!     }
//! }
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Metric {
//!     #[serde(default)]
//!     id: String,
//!     name: String,
//!     value: f64,
//! }
//!
//! struct JsonQueries;
//!
//! impl QueryConverter for JsonQueries {
//!     type Query = Value;
//!
//!     fn convert_query(&self, query: &Value) -> MarshalResult<Value> {
//!         Ok(query.clone())
//!     }
//!
//!     fn fetch_style(&self, _query: &Value) -> FetchStyle {
//!         FetchStyle::SourceFull
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let model = TypedModelContext::<Kind, Metric>::new("id")
//!         .with_decoder(Kind::Metric, |document| document.decode());
//!
//!     let client = DatastoreClient::builder()
//!         .config(ClientConfig::new("http://localhost:9200"))
//!         .model_context(model)
//!         .query_converter(JsonQueries)
//!         .build()?;
//!
//!     let metric = Metric { id: String::new(), name: "temperature".into(), value: 21.5 };
//!     let inserted = client.insert(&InsertRequest::new("metrics-1", metric)).await?;
//!
//!     let query = json!({ "query": { "ids": { "values": [inserted.id] } } });
//!     let results = client.query("metrics-1", &query).await?;
//!     println!("{} of {} hits", results.len(), results.total_count());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod bulk;
mod classify;
mod client;
mod config;
mod document;
mod error;
mod executor;
mod index;
mod metrics;
mod model;
mod request;
mod resource;
mod response;
mod search;

pub use bulk::EMPTY_ERROR_MESSAGE;
pub use classify::ResponseClass;
pub use client::{DatastoreClient, DatastoreClientBuilder};
pub use config::ClientConfig;
pub use document::{Document, FetchStyle, QUERY_FETCH_STYLE_KEY, TYPE_DESCRIPTOR_KEY};
pub use error::{ClientError, MarshalError, MarshalResult, Result};
pub use executor::RequestExecutor;
pub use index::IndexManager;
pub use metrics::{ClientMetrics, RETRY_LIMIT_REACHED_COUNTER, TIMEOUT_RETRY_COUNTER};
pub use model::{Decoder, ModelContext, QueryConverter, StorableKind, TypedModelContext};
pub use request::{BulkUpdateRequest, IndexRequest, InsertRequest, UpdateRequest};
pub use resource::{INDEX_ALL, MULTI_INDEX};
pub use response::{BulkUpdateResponse, IndexResponse, InsertResponse, ResultList, UpdateResponse};
pub use search::{MAX_TOTAL_HITS, TotalHits};

pub use datastore_transport as transport;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::client::DatastoreClient;
    pub use crate::config::ClientConfig;
    pub use crate::document::{Document, FetchStyle};
    pub use crate::error::{ClientError, MarshalResult};
    pub use crate::model::{ModelContext, QueryConverter, StorableKind, TypedModelContext};
    pub use crate::request::{BulkUpdateRequest, IndexRequest, InsertRequest, UpdateRequest};
    pub use crate::response::{BulkUpdateResponse, IndexResponse, InsertResponse, ResultList};
}
