//! # Datastore Transport
//!
//! The HTTP boundary between the datastore client and a document-oriented
//! search engine.
//!
//! ## Features
//!
//! - **Single round trips**: a [`Transport`] performs exactly one request and
//!   hands back the raw response, whatever its status
//! - **Tagged failures**: every failure is classified once, at the boundary,
//!   as transient ([`TransportError::Timeout`]) or not
//! - **Jittered backoff**: [`RetryConfig`] draws sleeps uniformly from half to
//!   the full configured base wait
//! - **Node rotation**: [`HttpTransport`] spreads requests across nodes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use datastore_transport::{EngineRequest, HttpTransport, Transport, TransportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::new(TransportConfig::new("http://localhost:9200"))?;
//!
//!     let response = transport
//!         .perform(&EngineRequest::head(["metrics-1"]))
//!         .await?;
//!
//!     println!("Status: {}", response.status_label());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;
mod retry;

pub use client::{HttpTransport, Transport};
pub use config::TransportConfig;
pub use error::{Result, TransportError};
pub use request::{EngineRequest, RequestBody};
pub use response::RawResponse;
pub use retry::{RetryConfig, jittered};

// Re-export common types
pub use bytes::Bytes;
pub use http::Method;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::client::{HttpTransport, Transport};
    pub use crate::config::TransportConfig;
    pub use crate::error::{Result, TransportError};
    pub use crate::request::{EngineRequest, RequestBody};
    pub use crate::response::RawResponse;
    pub use crate::retry::RetryConfig;
}
