//! Operation requests.

/// Insert a record, optionally under an explicit id.
#[derive(Debug, Clone)]
pub struct InsertRequest<S> {
    index: String,
    id: Option<String>,
    storable: S,
}

impl<S> InsertRequest<S> {
    /// Insert with an engine-generated id.
    pub fn new(index: impl Into<String>, storable: S) -> Self {
        Self {
            index: index.into(),
            id: None,
            storable,
        }
    }

    /// Insert under an explicit id.
    pub fn with_id(index: impl Into<String>, id: impl Into<String>, storable: S) -> Self {
        Self {
            index: index.into(),
            id: Some(id.into()),
            storable,
        }
    }

    /// Target index.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Explicit id, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Record to insert.
    pub fn storable(&self) -> &S {
        &self.storable
    }
}

/// Insert or update a record addressed by `(index, id)`.
#[derive(Debug, Clone)]
pub struct UpdateRequest<S> {
    index: String,
    id: String,
    storable: S,
}

impl<S> UpdateRequest<S> {
    /// Create an upsert request.
    pub fn new(index: impl Into<String>, id: impl Into<String>, storable: S) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            storable,
        }
    }

    /// Target index.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Document id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Record to upsert.
    pub fn storable(&self) -> &S {
        &self.storable
    }
}

/// Ordered batch of independently addressed upserts.
#[derive(Debug, Clone)]
pub struct BulkUpdateRequest<S> {
    requests: Vec<UpdateRequest<S>>,
}

impl<S> BulkUpdateRequest<S> {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self {
            requests: Vec::new(),
        }
    }

    /// Append an upsert.
    pub fn add(&mut self, request: UpdateRequest<S>) {
        self.requests.push(request);
    }

    /// Append an upsert, builder style.
    pub fn with(mut self, request: UpdateRequest<S>) -> Self {
        self.add(request);
        self
    }

    /// Upserts in submission order.
    pub fn requests(&self) -> &[UpdateRequest<S>] {
        &self.requests
    }

    /// Number of upserts.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl<S> Default for BulkUpdateRequest<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> FromIterator<UpdateRequest<S>> for BulkUpdateRequest<S> {
    fn from_iter<I: IntoIterator<Item = UpdateRequest<S>>>(iter: I) -> Self {
        Self {
            requests: iter.into_iter().collect(),
        }
    }
}

/// Index administration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRequest {
    index: String,
}

impl IndexRequest {
    /// Create a request for an index name or prefix.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
        }
    }

    /// Index name or prefix.
    pub fn index(&self) -> &str {
        &self.index
    }
}
