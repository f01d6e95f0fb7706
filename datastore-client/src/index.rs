//! Index management operations.

use crate::{
    classify::ResponseClass,
    client::{ClientCore, to_json},
    error::{ClientError, Result},
    request::IndexRequest,
    resource::{self, INDEX_ALL},
    response::IndexResponse,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Index manager for index-level operations.
#[derive(Debug, Clone)]
pub struct IndexManager {
    core: Arc<ClientCore>,
}

impl IndexManager {
    pub(crate) fn new(core: Arc<ClientCore>) -> Self {
        Self { core }
    }

    /// Check whether an index exists.
    pub async fn exists(&self, request: &IndexRequest) -> Result<IndexResponse> {
        let index = request.index();
        debug!(index, "Index exists");

        let response = self
            .core
            .send(resource::index_exists(index), index, "INDEX EXIST")
            .await?;

        match ResponseClass::of(&response) {
            ResponseClass::Success => Ok(IndexResponse::exists(true)),
            ResponseClass::NotFound => Ok(IndexResponse::exists(false)),
            _ => Err(ClientError::action_response("Index exists", &response)),
        }
    }

    /// List the indices whose name matches a prefix pattern, such as `1-data-*`.
    pub async fn find(&self, request: &IndexRequest) -> Result<IndexResponse> {
        let prefix = request.index();
        debug!(prefix, "Find indexes");

        let response = self
            .core
            .send(resource::find_indexes(prefix), prefix, "FIND INDEXES")
            .await?;

        match ResponseClass::of(&response) {
            ResponseClass::Success => {
                let body = response.text().map_err(|e| {
                    ClientError::Internal(format!("Cannot convert the indexes list: {e}"))
                })?;
                let indexes = body
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect();
                Ok(IndexResponse::listing(indexes))
            }
            ResponseClass::NotFound => Ok(IndexResponse::listing(Vec::new())),
            _ => Err(ClientError::action_response("Find indexes", &response)),
        }
    }

    /// Create an index with the given settings and mappings body.
    pub async fn create(&self, index: &str, settings: &Value) -> Result<()> {
        debug!(index, %settings, "Create index");

        let response = self
            .core
            .send(
                resource::create_index(index).json(to_json(settings)?),
                index,
                "CREATE INDEX",
            )
            .await?;

        require_success("Create index", &response)
    }

    /// Check whether an index has a mapping.
    pub async fn mapping_exists(&self, index: &str) -> Result<bool> {
        debug!(index, "Mapping exists");

        let response = self
            .core
            .send(resource::mapping_exists(index), index, "MAPPING EXIST")
            .await?;

        match ResponseClass::of(&response) {
            ResponseClass::Success => Ok(true),
            ResponseClass::NotFound => Ok(false),
            _ => Err(ClientError::action_response("Mapping exists", &response)),
        }
    }

    /// Put a mapping on an index.
    pub async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<()> {
        debug!(index, %mapping, "Create mapping");

        let response = self
            .core
            .send(
                resource::put_mapping(index).json(to_json(mapping)?),
                index,
                "PUT MAPPING",
            )
            .await?;

        require_success("Create mapping", &response)
    }

    /// Refresh one index.
    pub async fn refresh(&self, index: &str) -> Result<()> {
        debug!(index, "Refresh index");

        let response = self
            .core
            .send(resource::refresh_index(index), index, "REFRESH INDEX")
            .await?;

        require_success("Refresh indexes", &response)
    }

    /// Refresh every index.
    pub async fn refresh_all(&self) -> Result<()> {
        debug!("Refresh all indexes");

        let response = self
            .core
            .send(resource::refresh_all(), INDEX_ALL, "REFRESH INDEX")
            .await?;

        require_success("Refresh all indexes", &response)
    }

    /// Delete every index.
    pub async fn delete_all(&self) -> Result<()> {
        debug!("Delete all indexes");

        let response = self
            .core
            .send(resource::delete_index(INDEX_ALL), INDEX_ALL, "DELETE INDEX")
            .await?;

        require_success("Delete all indexes", &response)
    }

    /// Delete indices one by one. Absent indices are skipped.
    ///
    /// Stops at the first index that cannot be deleted.
    pub async fn delete<I, S>(&self, indexes: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for index in indexes {
            let index = index.as_ref();
            debug!(index, "Deleting index");

            let response = self
                .core
                .send(resource::delete_index(index), index, "DELETE INDEX")
                .await?;

            match ResponseClass::of(&response) {
                ResponseClass::Success => debug!(index, "Index deleted"),
                ResponseClass::NotFound => debug!(index, "Index does not exist"),
                _ => return Err(ClientError::action_response("Delete indexes", &response)),
            }
        }

        Ok(())
    }
}

fn require_success(action: &str, response: &datastore_transport::RawResponse) -> Result<()> {
    if ResponseClass::of(response).is_success() {
        Ok(())
    } else {
        Err(ClientError::action_response(action, response))
    }
}
