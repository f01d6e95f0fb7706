//! Marshalling context and query conversion.
//!
//! The client never knows the concrete record types it stores. It goes
//! through a [`ModelContext`] to turn records into documents and back, and
//! through a [`QueryConverter`] to turn caller queries into engine JSON.

use crate::{
    document::{Document, FetchStyle, QUERY_FETCH_STYLE_KEY, TYPE_DESCRIPTOR_KEY},
    error::{MarshalError, MarshalResult},
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Converts records to and from documents.
pub trait ModelContext: Send + Sync {
    /// Record type handled by this context.
    type Storable: Send + Sync;

    /// Name of the field receiving the document id during hydration.
    fn id_key_name(&self) -> &str;

    /// Produce the field map of a record, without synthetic keys.
    fn marshal(&self, storable: &Self::Storable) -> MarshalResult<Document>;

    /// Rebuild a record from a document carrying all three synthetic keys.
    fn unmarshal(&self, document: Document) -> MarshalResult<Self::Storable>;
}

/// Converts caller queries into engine query bodies.
pub trait QueryConverter: Send + Sync {
    /// Query type accepted by this converter.
    type Query: Send + Sync;

    /// Convert a query to its JSON body.
    fn convert_query(&self, query: &Self::Query) -> MarshalResult<Value>;

    /// Fetch style requested by a query.
    fn fetch_style(&self, query: &Self::Query) -> FetchStyle;
}

/// Closed set of record kinds a [`TypedModelContext`] can decode.
///
/// The kind is derived from the type descriptor, which in turn is the name
/// of the index a document was read from.
pub trait StorableKind: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Map a type descriptor to a kind.
    fn from_type_descriptor(descriptor: &str) -> Option<Self>;
}

/// Decoder for one record kind.
pub type Decoder<S> = fn(Document) -> MarshalResult<S>;

/// Model context dispatching decoding on a closed kind tag.
///
/// Records are marshalled with serde. Decoding looks the kind up from the
/// type descriptor and calls the decoder registered for it; there is no
/// open-ended instantiation.
///
/// # Example
///
/// ```rust
/// use datastore_client::{Document, MarshalResult, StorableKind, TypedModelContext};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Kind {
///     Metric,
/// }
///
/// impl StorableKind for Kind {
///     fn from_type_descriptor(descriptor: &str) -> Option<Self> {
///         descriptor.starts_with("metrics-").then_some(Kind::Metric)
///     }
/// }
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct Metric {
///     name: String,
/// }
///
/// fn decode_metric(document: Document) -> MarshalResult<Metric> {
///     document.decode()
/// }
///
/// let context = TypedModelContext::<Kind, Metric>::new("id").with_decoder(Kind::Metric, decode_metric);
/// ```
pub struct TypedModelContext<K, S> {
    id_key: String,
    decoders: HashMap<K, Decoder<S>>,
}

impl<K: StorableKind, S> TypedModelContext<K, S> {
    /// Create a context whose records carry their id under `id_key`.
    pub fn new(id_key: impl Into<String>) -> Self {
        Self {
            id_key: id_key.into(),
            decoders: HashMap::new(),
        }
    }

    /// Register the decoder for a kind.
    pub fn with_decoder(mut self, kind: K, decoder: Decoder<S>) -> Self {
        self.decoders.insert(kind, decoder);
        self
    }

    /// Resolve the decoder for a type descriptor.
    fn decoder_for(&self, descriptor: &str) -> MarshalResult<Decoder<S>> {
        let kind = K::from_type_descriptor(descriptor)
            .ok_or_else(|| MarshalError::UnknownType(descriptor.to_string()))?;

        self.decoders
            .get(&kind)
            .copied()
            .ok_or_else(|| MarshalError::NoDecoder(format!("{kind:?}")))
    }
}

impl<K, S> ModelContext for TypedModelContext<K, S>
where
    K: StorableKind,
    S: Serialize + Send + Sync,
{
    type Storable = S;

    fn id_key_name(&self) -> &str {
        &self.id_key
    }

    fn marshal(&self, storable: &S) -> MarshalResult<Document> {
        Document::from_serialize(storable)
    }

    fn unmarshal(&self, document: Document) -> MarshalResult<S> {
        for key in [TYPE_DESCRIPTOR_KEY, self.id_key.as_str(), QUERY_FETCH_STYLE_KEY] {
            if !document.contains_key(key) {
                return Err(MarshalError::MissingKey(key.to_string()));
            }
        }

        let descriptor = document
            .type_descriptor()
            .ok_or_else(|| MarshalError::UnknownType(document[TYPE_DESCRIPTOR_KEY].to_string()))?
            .to_string();

        let decoder = self.decoder_for(&descriptor)?;
        decoder(document)
    }
}

impl<K: Debug, S> Debug for TypedModelContext<K, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedModelContext")
            .field("id_key", &self.id_key)
            .field("kinds", &self.decoders.keys().collect::<Vec<_>>())
            .finish()
    }
}
