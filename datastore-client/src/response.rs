//! Operation responses.

/// Result of a successful insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertResponse {
    /// Id of the stored document.
    pub id: String,
    /// Index the document was stored in.
    pub index: String,
}

/// Outcome of a single upsert.
///
/// A bulk upsert reports failed items in-band through `failure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResponse {
    /// Document id, when the engine reported one.
    pub id: Option<String>,
    /// Index of the document.
    pub index: String,
    /// Failure reason for a failed item.
    pub failure: Option<String>,
}

impl UpdateResponse {
    /// A succeeded upsert.
    pub fn succeeded(id: Option<String>, index: impl Into<String>) -> Self {
        Self {
            id,
            index: index.into(),
            failure: None,
        }
    }

    /// A failed upsert.
    pub fn failed(id: Option<String>, index: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id,
            index: index.into(),
            failure: Some(reason.into()),
        }
    }

    /// Whether the upsert succeeded.
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Per-item outcomes of a bulk upsert, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkUpdateResponse {
    responses: Vec<UpdateResponse>,
}

impl BulkUpdateResponse {
    /// Create from ordered outcomes.
    pub fn new(responses: Vec<UpdateResponse>) -> Self {
        Self { responses }
    }

    /// Outcomes in submission order.
    pub fn responses(&self) -> &[UpdateResponse] {
        &self.responses
    }

    /// Consume into the ordered outcomes.
    pub fn into_responses(self) -> Vec<UpdateResponse> {
        self.responses
    }

    /// Number of outcomes.
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Whether there are no outcomes.
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &UpdateResponse> {
        self.responses.iter().filter(|r| !r.is_success())
    }

    /// Whether any item failed.
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Result of an index administration call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexResponse {
    /// Whether the index exists.
    pub index_exists: bool,
    /// Index names found.
    pub indexes: Vec<String>,
}

impl IndexResponse {
    /// Existence answer.
    pub fn exists(index_exists: bool) -> Self {
        Self {
            index_exists,
            indexes: Vec::new(),
        }
    }

    /// Listing answer.
    pub fn listing(indexes: Vec<String>) -> Self {
        Self {
            index_exists: !indexes.is_empty(),
            indexes,
        }
    }
}

/// Hydrated query results.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultList<T> {
    total_count: u64,
    total_hits_exceeds_count: bool,
    items: Vec<T>,
}

impl<T> ResultList<T> {
    /// Create an empty result with a known total.
    pub fn new(total_count: u64) -> Self {
        Self {
            total_count,
            total_hits_exceeds_count: false,
            items: Vec::new(),
        }
    }

    /// An empty result with a total of zero.
    pub fn empty() -> Self {
        Self::new(0)
    }

    /// Total number of matching documents reported by the engine.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Whether `total_count` is a lower bound rather than an exact value.
    pub fn total_hits_exceeds_count(&self) -> bool {
        self.total_hits_exceeds_count
    }

    pub(crate) fn set_total_hits_exceeds_count(&mut self, exceeds: bool) {
        self.total_hits_exceeds_count = exceeds;
    }

    pub(crate) fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Hydrated records, in hit order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume into the hydrated records.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// First record, if any.
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// Number of hydrated records.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no records were returned.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> IntoIterator for ResultList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
