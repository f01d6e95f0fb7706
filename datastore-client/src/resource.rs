//! Engine resource paths, one constructor per operation.

use datastore_transport::EngineRequest;

/// Index name addressing every index.
pub const INDEX_ALL: &str = "_all";

/// Index label used in logs for calls spanning several indices.
pub const MULTI_INDEX: &str = "multi-index";

const DOC: &str = "_doc";

pub(crate) fn insert(index: &str, id: Option<&str>) -> EngineRequest {
    match id {
        Some(id) => EngineRequest::put([index, DOC, id]),
        None => EngineRequest::post([index, DOC]),
    }
}

pub(crate) fn upsert(index: &str, id: &str) -> EngineRequest {
    EngineRequest::post([index, "_update", id])
}

pub(crate) fn bulk() -> EngineRequest {
    EngineRequest::post(["_bulk"])
}

pub(crate) fn search(index: &str) -> EngineRequest {
    EngineRequest::get([index, "_search"])
}

pub(crate) fn delete(index: &str, id: &str) -> EngineRequest {
    EngineRequest::delete([index, DOC, id])
}

pub(crate) fn delete_by_query(index: &str) -> EngineRequest {
    EngineRequest::post([index, "_delete_by_query"])
}

pub(crate) fn index_exists(index: &str) -> EngineRequest {
    EngineRequest::head([index])
}

pub(crate) fn find_indexes(prefix: &str) -> EngineRequest {
    EngineRequest::get(["_cat", "indices", prefix]).query("h", "index")
}

pub(crate) fn create_index(index: &str) -> EngineRequest {
    EngineRequest::put([index])
}

pub(crate) fn delete_index(index: &str) -> EngineRequest {
    EngineRequest::delete([index])
}

pub(crate) fn mapping_exists(index: &str) -> EngineRequest {
    EngineRequest::get([index, "_mapping"])
}

pub(crate) fn put_mapping(index: &str) -> EngineRequest {
    EngineRequest::put([index, "_mapping"])
}

pub(crate) fn refresh_index(index: &str) -> EngineRequest {
    EngineRequest::post([index, "_refresh"])
}

pub(crate) fn refresh_all() -> EngineRequest {
    EngineRequest::post(["_refresh"])
}
