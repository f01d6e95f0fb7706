//! Search response parsing and hit hydration.

use crate::{
    document::{Document, FetchStyle},
    error::{ClientError, MarshalError, Result},
    model::ModelContext,
    response::ResultList,
};
use serde_json::Value;

/// Largest total the result counter can represent.
pub const MAX_TOTAL_HITS: u64 = i32::MAX as u64;

/// Relation reported for an exact total.
pub const RELATION_EQ: &str = "eq";

/// Relation reported when the engine stopped counting.
pub const RELATION_GTE: &str = "gte";

/// Total hit count as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalHits {
    /// Reported value.
    pub value: u64,
    /// Reported relation, absent for the legacy integer form.
    pub relation: Option<String>,
}

impl TotalHits {
    /// Parse `hits.total` in either the object or the legacy integer form.
    ///
    /// An absent total reads as zero. A total past `u64` is an overflow; a
    /// negative, fractional or non-numeric total is an internal error.
    pub fn from_response(body: &Value) -> Result<Self> {
        let total = match body.pointer("/hits/total") {
            Some(Value::Object(total)) => Self {
                value: total.get("value").map_or(Ok(0), parse_total)?,
                relation: total
                    .get("relation")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            Some(total) => Self {
                value: parse_total(total)?,
                relation: None,
            },
            None => Self {
                value: 0,
                relation: None,
            },
        };
        Ok(total)
    }

    /// Whether the value is a lower bound.
    pub fn is_lower_bound(&self) -> bool {
        self.relation.as_deref().is_some_and(|r| r != RELATION_EQ)
    }

    /// Value checked against [`MAX_TOTAL_HITS`].
    pub fn checked_value(&self) -> Result<u64> {
        if self.value > MAX_TOTAL_HITS {
            return Err(ClientError::HitsOverflow { total: self.value });
        }
        Ok(self.value)
    }

    /// Value for a count, which must be exact.
    pub fn exact_count(&self) -> Result<u64> {
        if self.relation.as_deref() == Some(RELATION_GTE) {
            return Err(ClientError::LimitsExceeded(
                "max result window overflow, unable to count the precise number of documents"
                    .to_string(),
            ));
        }
        self.checked_value()
    }
}

fn parse_total(value: &Value) -> Result<u64> {
    if let Some(total) = value.as_u64() {
        return Ok(total);
    }
    match value.as_f64() {
        Some(total) if total >= 0.0 && total.fract() == 0.0 => {
            if total >= u64::MAX as f64 {
                Err(ClientError::HitsOverflow { total: u64::MAX })
            } else {
                Ok(total as u64)
            }
        }
        _ => Err(ClientError::Internal(format!("Invalid total hits value: {value}"))),
    }
}

/// Hydrate every hit of a search response.
///
/// Any hit that cannot be hydrated fails the whole result.
pub(crate) fn hydrate<M: ModelContext>(
    model: &M,
    fetch_style: FetchStyle,
    body: &Value,
) -> Result<ResultList<M::Storable>> {
    let total = TotalHits::from_response(body)?;
    let mut results = ResultList::new(total.checked_value()?);
    results.set_total_hits_exceeds_count(total.is_lower_bound());

    let Some(hits) = body.pointer("/hits/hits").and_then(Value::as_array) else {
        return Ok(results);
    };

    for hit in hits {
        let id = hit_field(hit, "_id")?;
        let index = hit_field(hit, "_index")?;

        let mut document = match hit.get("_source") {
            None | Some(Value::Null) => Document::new(),
            Some(Value::Object(source)) => Document::from(source.clone()),
            Some(_) => return Err(MarshalError::NotAnObject.into()),
        };
        document.inject_synthetic_keys(index, model.id_key_name(), id, fetch_style)?;

        results.push(model.unmarshal(document)?);
    }

    Ok(results)
}

fn hit_field<'a>(hit: &'a Value, key: &str) -> Result<&'a str> {
    hit.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::Internal(format!("Search hit has no '{key}': {hit}")))
}
