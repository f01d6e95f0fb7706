//! Bulk upsert encoding and per-item reconciliation.

use crate::{
    classify::ResponseClass,
    error::{ClientError, Result},
    model::ModelContext,
    request::BulkUpdateRequest,
    response::UpdateResponse,
};
use serde_json::{Value, json};
use tracing::{debug, info};

/// Failure reason used when a failed item carries no message.
pub const EMPTY_ERROR_MESSAGE: &str = "Empty error message";

const UPDATE_KEY: &str = "update";

/// Position of a submitted item in the caller's batch.
#[derive(Debug)]
enum Slot {
    /// Sent to the engine; resolved from the response.
    Submitted,
    /// Rejected locally before submission.
    Rejected(UpdateResponse),
}

/// Encoded bulk body plus the bookkeeping needed to reconcile its response.
#[derive(Debug)]
pub(crate) struct BulkPlan {
    body: String,
    slots: Vec<Slot>,
    submitted: usize,
}

impl BulkPlan {
    /// Encode every item as an `update` header line and a `doc_as_upsert` body line.
    ///
    /// Items that fail to marshal are kept as in-band failures and left out
    /// of the body.
    pub(crate) fn encode<M: ModelContext>(
        model: &M,
        request: &BulkUpdateRequest<M::Storable>,
    ) -> Result<Self> {
        let mut body = String::new();
        let mut slots = Vec::with_capacity(request.len());
        let mut submitted = 0;

        for item in request.requests() {
            let document = match model.marshal(item.storable()) {
                Ok(document) => document,
                Err(e) => {
                    info!(index = item.index(), id = item.id(), error = %e, "Cannot marshal bulk item");
                    slots.push(Slot::Rejected(UpdateResponse::failed(
                        Some(item.id().to_string()),
                        item.index(),
                        e.to_string(),
                    )));
                    continue;
                }
            };

            let header = json!({ "update": { "_id": item.id(), "_index": item.index() } });
            let source = json!({ "doc": document, "doc_as_upsert": true });

            for line in [header, source] {
                body.push_str(&serde_json::to_string(&line).map_err(ClientError::RequestEntityWrite)?);
                body.push('\n');
            }

            slots.push(Slot::Submitted);
            submitted += 1;
        }

        debug!(items = slots.len(), submitted, "Encoded bulk upsert");

        Ok(Self {
            body,
            slots,
            submitted,
        })
    }

    /// NDJSON body.
    pub(crate) fn body(&self) -> &str {
        &self.body
    }

    /// Whether any item needs a round trip.
    pub(crate) fn has_submissions(&self) -> bool {
        self.submitted > 0
    }

    /// Outcomes when nothing was submitted.
    pub(crate) fn into_local_outcomes(self) -> Vec<UpdateResponse> {
        self.slots
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Rejected(outcome) => Some(outcome),
                Slot::Submitted => None,
            })
            .collect()
    }

    /// Match response items to submitted items by position.
    ///
    /// The returned outcomes follow the caller's batch order, including items
    /// rejected before submission.
    pub(crate) fn reconcile(self, response: &Value) -> Result<Vec<UpdateResponse>> {
        let items = response
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| ClientError::Internal("Bulk response has no 'items' array".to_string()))?;

        if items.len() != self.submitted {
            return Err(ClientError::Internal(format!(
                "Bulk response has {} items for {} submitted",
                items.len(),
                self.submitted
            )));
        }

        let mut items = items.iter();
        let mut outcomes = Vec::with_capacity(self.slots.len());

        for slot in self.slots {
            let outcome = match slot {
                Slot::Rejected(outcome) => outcome,
                Slot::Submitted => {
                    let item = items.next().ok_or_else(|| {
                        ClientError::Internal("Bulk response ended early".to_string())
                    })?;
                    reconcile_item(item)?
                }
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

/// Turn one tagged bulk result into an outcome.
pub(crate) fn reconcile_item(item: &Value) -> Result<UpdateResponse> {
    let result = item.get(UPDATE_KEY).ok_or_else(|| {
        ClientError::Internal(format!("Bulk item has no '{UPDATE_KEY}' result: {item}"))
    })?;

    let id = result.get("_id").and_then(Value::as_str).map(str::to_string);
    let index = result
        .get("_index")
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::Internal(format!("Bulk item has no '_index': {result}")))?;
    let status = result.get("status").and_then(Value::as_i64);

    if ResponseClass::from_status(status).is_success() {
        return Ok(UpdateResponse::succeeded(id, index));
    }

    let reason = failure_message(result);
    info!(?id, index, ?status, reason, "Bulk item failed");
    Ok(UpdateResponse::failed(id, index, reason))
}

fn failure_message(result: &Value) -> &str {
    fn non_blank(value: Option<&Value>) -> Option<&str> {
        value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
    }

    non_blank(result.get("error").and_then(|e| e.get("reason")))
        .or_else(|| non_blank(result.get("result")))
        .unwrap_or(EMPTY_ERROR_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        document::Document,
        error::{MarshalError, MarshalResult},
        request::UpdateRequest,
    };

    #[derive(Debug)]
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

    fn batch(items: &[(&str, Value)]) -> BulkUpdateRequest<Value> {
        items
            .iter()
            .map(|(id, v)| UpdateRequest::new("metrics-1", *id, v.clone()))
            .collect()
    }

    #[test]
    fn test_encode_ndjson() {
        let plan = BulkPlan::encode(&Plain, &batch(&[("a", json!({"x": 1}))])).unwrap();
        let lines: Vec<Value> = plan
            .body()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert!(plan.body().ends_with('\n'));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], json!({"update": {"_id": "a", "_index": "metrics-1"}}));
        assert_eq!(lines[1], json!({"doc": {"x": 1}, "doc_as_upsert": true}));
    }

    #[test]
    fn test_reconcile_preserves_order() {
        let plan = BulkPlan::encode(
            &Plain,
            &batch(&[("a", json!({})), ("b", json!({})), ("c", json!({}))]),
        )
        .unwrap();

        let response = json!({
            "errors": true,
            "items": [
                {"update": {"_id": "a", "_index": "metrics-1", "status": 200, "result": "created"}},
                {"update": {"_id": "b", "_index": "metrics-1", "status": 400,
                    "error": {"type": "mapper_parsing_exception", "reason": "failed to parse"}}},
                {"update": {"_id": "c", "_index": "metrics-1", "status": 201, "result": "updated"}}
            ]
        });

        let outcomes = plan.reconcile(&response).unwrap();
        assert_eq!(
            outcomes,
            vec![
                UpdateResponse::succeeded(Some("a".into()), "metrics-1"),
                UpdateResponse::failed(Some("b".into()), "metrics-1", "failed to parse"),
                UpdateResponse::succeeded(Some("c".into()), "metrics-1"),
            ]
        );
    }

    #[test]
    fn test_failure_message_fallback() {
        let with_result = json!({"update": {"_index": "i", "status": 409, "result": "noop"}});
        assert_eq!(reconcile_item(&with_result).unwrap().failure.as_deref(), Some("noop"));

        let blank_reason = json!({"update": {"_index": "i", "status": 500,
            "error": {"reason": "  "}, "result": "conflict"}});
        assert_eq!(reconcile_item(&blank_reason).unwrap().failure.as_deref(), Some("conflict"));

        let nothing = json!({"update": {"_id": null, "_index": "i", "status": 500}});
        let outcome = reconcile_item(&nothing).unwrap();
        assert_eq!(outcome.id, None);
        assert_eq!(outcome.failure.as_deref(), Some(EMPTY_ERROR_MESSAGE));
    }

    #[test]
    fn test_missing_update_key_is_internal() {
        let item = json!({"index": {"_index": "i", "status": 200}});
        assert!(matches!(reconcile_item(&item), Err(ClientError::Internal(_))));

        let no_index = json!({"update": {"_id": "a", "status": 200}});
        assert!(matches!(reconcile_item(&no_index), Err(ClientError::Internal(_))));
    }

    #[test]
    fn test_item_count_mismatch_is_internal() {
        let plan = BulkPlan::encode(&Plain, &batch(&[("a", json!({})), ("b", json!({}))])).unwrap();
        let response = json!({"items": [{"update": {"_id": "a", "_index": "i", "status": 200}}]});

        assert!(matches!(plan.reconcile(&response), Err(ClientError::Internal(_))));
    }

    #[test]
    fn test_marshal_failure_isolated_to_item() {
        let plan = BulkPlan::encode(
            &Plain,
            &batch(&[("a", json!({})), ("b", json!("not an object")), ("c", json!({}))]),
        )
        .unwrap();

        assert_eq!(plan.body().lines().count(), 4);

        let response = json!({"items": [
            {"update": {"_id": "a", "_index": "metrics-1", "status": 200}},
            {"update": {"_id": "c", "_index": "metrics-1", "status": 200}}
        ]});

        let outcomes = plan.reconcile(&response).unwrap();
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_success());
        assert_eq!(outcomes[1].id.as_deref(), Some("b"));
        assert_eq!(
            outcomes[1].failure.as_deref(),
            Some(MarshalError::NotAnObject.to_string().as_str())
        );
        assert!(outcomes[2].is_success());
    }

    #[test]
    fn test_all_rejected_needs_no_round_trip() {
        let plan = BulkPlan::encode(&Plain, &batch(&[("a", json!(1))])).unwrap();
        assert!(!plan.has_submissions());
        assert_eq!(plan.into_local_outcomes().len(), 1);
    }
}
