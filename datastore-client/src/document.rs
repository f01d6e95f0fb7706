//! Document representation and synthetic keys.

use crate::error::{MarshalError, MarshalResult};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// Key carrying the type descriptor during hydration.
pub const TYPE_DESCRIPTOR_KEY: &str = "type_descriptor";

/// Key carrying the query fetch style during hydration.
pub const QUERY_FETCH_STYLE_KEY: &str = "query_fetch_style";

/// How a hydrated record should be shaped.
///
/// Carried through hydration as a synthetic key and never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchStyle {
    /// Only stored fields are fetched.
    Fields,
    /// A selected subset of the source is fetched.
    SourceSelect,
    /// The whole source is fetched.
    #[default]
    SourceFull,
}

/// Flat field map exchanged with the engine.
///
/// # Example
///
/// ```rust
/// use datastore_client::{Document, FetchStyle};
///
/// let mut document = Document::new();
/// document.insert("name", "temperature");
/// document
///     .inject_synthetic_keys("metrics-1", "id", "abc123", FetchStyle::SourceFull)
///     .unwrap();
///
/// assert_eq!(document.type_descriptor(), Some("metrics-1"));
/// assert_eq!(document.fetch_style().unwrap(), FetchStyle::SourceFull);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a document from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> MarshalResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(MarshalError::NotAnObject),
        }
    }

    /// Marshal any serializable record into a document.
    pub fn from_serialize<T: Serialize + ?Sized>(record: &T) -> MarshalResult<Self> {
        Self::from_value(serde_json::to_value(record)?)
    }

    /// Decode the document into a concrete type.
    ///
    /// Unknown keys, synthetic ones included, are left to the target's serde
    /// attributes.
    pub fn decode<T: DeserializeOwned>(self) -> MarshalResult<T> {
        Ok(serde_json::from_value(Value::Object(self.0))?)
    }

    /// Get a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a field.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Check whether a field is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Consume into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Inject the three synthetic hydration keys.
    pub fn inject_synthetic_keys(
        &mut self,
        type_descriptor: &str,
        id_key: &str,
        id: &str,
        fetch_style: FetchStyle,
    ) -> MarshalResult<()> {
        self.insert(TYPE_DESCRIPTOR_KEY, type_descriptor);
        self.insert(id_key, id);
        self.insert(QUERY_FETCH_STYLE_KEY, serde_json::to_value(fetch_style)?);
        Ok(())
    }

    /// Type descriptor, if present and a string.
    pub fn type_descriptor(&self) -> Option<&str> {
        self.get(TYPE_DESCRIPTOR_KEY).and_then(Value::as_str)
    }

    /// Fetch style carried by the document.
    pub fn fetch_style(&self) -> MarshalResult<FetchStyle> {
        let value = self
            .get(QUERY_FETCH_STYLE_KEY)
            .ok_or_else(|| MarshalError::MissingKey(QUERY_FETCH_STYLE_KEY.to_string()))?;
        Ok(FetchStyle::deserialize(value)?)
    }
}

impl std::ops::Index<&str> for Document {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&Value::Null)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
