//! Record Storage Contract
//!
//! Every piece of catalog data lives in a managed record backend that exposes
//! five table-scoped calls. This module defines that contract ([`RecordClient`])
//! together with the query DSL and the response envelope exactly as they travel
//! on the wire, so any adapter (HTTP, in-process, mock) can be swapped in without
//! touching the services.
//!
//! ## Wire shapes
//!
//! ```json
//! {
//!   "fields": [{"field": {"Name": "Id"}}],
//!   "where": [{"FieldName": "userId_c", "Operator": "EqualTo", "Values": [7]}],
//!   "whereGroups": [{"operator": "OR", "subGroups": [
//!       {"conditions": [{"fieldName": "title_c", "operator": "Contains", "values": ["x"]}]}
//!   ]}],
//!   "orderBy": [{"fieldName": "playCount_c", "sorttype": "DESC"}],
//!   "pagingInfo": {"limit": 10, "offset": 0}
//! }
//! ```
//!
//! Note the casing differences between `where` conditions (`FieldName`) and
//! group conditions (`fieldName`). The backend is strict about both.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::platform::PlatformSendSync;

/// Name of the primary key column present in every table.
pub const ID_FIELD: &str = "Id";

/// A single row as the backend sees it.
pub type Record = serde_json::Map<String, Value>;

/// Column reference inside a field projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldName {
    #[serde(rename = "Name")]
    pub name: String,
}

/// One entry of the `fields` projection: `{"field": {"Name": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelector {
    pub field: FieldName,
}

impl FieldSelector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            field: FieldName { name: name.into() },
        }
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }
}

/// Comparison operators understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    EqualTo,
    NotEqualTo,
    Contains,
}

/// Top-level `where` condition. Keys are PascalCase on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "FieldName")]
    pub field_name: String,
    #[serde(rename = "Operator")]
    pub operator: Operator,
    #[serde(rename = "Values")]
    pub values: Vec<Value>,
}

impl Condition {
    pub fn equal_to(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field_name: field.into(),
            operator: Operator::EqualTo,
            values: vec![value.into()],
        }
    }
}

/// Condition nested inside a [`WhereGroup`]. Keys are camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCondition {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    pub operator: Operator,
    pub values: Vec<Value>,
}

impl GroupCondition {
    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self {
            field_name: field.into(),
            operator: Operator::Contains,
            values: vec![Value::String(needle.into())],
        }
    }
}

/// Conditions inside one sub-group are AND-ed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSet {
    pub conditions: Vec<GroupCondition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupOperator {
    #[serde(rename = "OR")]
    Or,
    #[serde(rename = "AND")]
    And,
}

/// Sub-groups combined with `operator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereGroup {
    pub operator: GroupOperator,
    #[serde(rename = "subGroups")]
    pub sub_groups: Vec<ConditionSet>,
}

impl WhereGroup {
    /// OR across single-condition sub-groups.
    pub fn any_of(conditions: impl IntoIterator<Item = GroupCondition>) -> Self {
        Self {
            operator: GroupOperator::Or,
            sub_groups: conditions
                .into_iter()
                .map(|condition| ConditionSet {
                    conditions: vec![condition],
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortType {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    pub sorttype: SortType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingInfo {
    pub limit: u32,
    pub offset: u32,
}

/// Query passed to `fetch_records` and (projection only) `get_record_by_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordQuery {
    pub fields: Vec<FieldSelector>,
    #[serde(rename = "where", default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(rename = "whereGroups", default, skip_serializing_if = "Vec::is_empty")]
    pub where_groups: Vec<WhereGroup>,
    #[serde(rename = "orderBy", default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(rename = "pagingInfo", default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<PagingInfo>,
}

impl RecordQuery {
    /// Projection-only query over `fields`.
    pub fn select(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().copied().map(FieldSelector::new).collect(),
            ..Self::default()
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn group(mut self, group: WhereGroup) -> Self {
        self.where_groups.push(group);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, sorttype: SortType) -> Self {
        self.order_by.push(OrderBy {
            field_name: field.into(),
            sorttype,
        });
        self
    }

    pub fn page(mut self, limit: u32, offset: u32) -> Self {
        self.paging = Some(PagingInfo { limit, offset });
        self
    }

    /// Names of the projected columns, in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldSelector::name)
    }
}

/// Body of `create_record` and `update_record`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordBatch {
    pub records: Vec<Record>,
}

impl RecordBatch {
    pub fn single(record: Record) -> Self {
        Self {
            records: vec![record],
        }
    }
}

/// Body of `delete_record`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    #[serde(rename = "RecordIds")]
    pub record_ids: Vec<i64>,
}

/// Per-record outcome inside a mutation envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BatchResult {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Uniform response wrapper returned by every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<BatchResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    pub fn with_data(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            results: None,
            message: None,
        }
    }

    pub fn with_results(results: Vec<BatchResult>) -> Self {
        Self {
            success: true,
            data: None,
            results: Some(results),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            results: None,
            message: Some(message.into()),
        }
    }

    /// Message for logs, falling back to a generic text.
    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or("Unknown backend error")
    }
}

/// Session-scoped client for the managed record backend.
///
/// `Err` means the call never produced an envelope (transport, decoding,
/// cancellation). A reachable backend that rejects the call answers with
/// `Ok(Envelope { success: false, .. })`.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait RecordClient: PlatformSendSync {
    async fn fetch_records(&self, table: &str, query: &RecordQuery) -> Result<Envelope>;

    async fn get_record_by_id(&self, table: &str, id: i64, query: &RecordQuery)
        -> Result<Envelope>;

    async fn create_record(&self, table: &str, payload: &RecordBatch) -> Result<Envelope>;

    async fn update_record(&self, table: &str, payload: &RecordBatch) -> Result<Envelope>;

    async fn delete_record(&self, table: &str, payload: &DeleteRequest) -> Result<Envelope>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_projection_wire_shape() {
        let query = RecordQuery::select(&["Id", "name_c"]);

        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"fields": [{"field": {"Name": "Id"}}, {"field": {"Name": "name_c"}}]})
        );
    }

    #[test]
    fn test_full_query_wire_shape() {
        let query = RecordQuery::select(&["Id"])
            .filter(Condition::equal_to("userId_c", 7))
            .group(WhereGroup::any_of([
                GroupCondition::contains("title_c", "love"),
                GroupCondition::contains("artist_c", "love"),
            ]))
            .order_by("playCount_c", SortType::Desc)
            .page(10, 0);

        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "fields": [{"field": {"Name": "Id"}}],
                "where": [{"FieldName": "userId_c", "Operator": "EqualTo", "Values": [7]}],
                "whereGroups": [{
                    "operator": "OR",
                    "subGroups": [
                        {"conditions": [{"fieldName": "title_c", "operator": "Contains", "values": ["love"]}]},
                        {"conditions": [{"fieldName": "artist_c", "operator": "Contains", "values": ["love"]}]}
                    ]
                }],
                "orderBy": [{"fieldName": "playCount_c", "sorttype": "DESC"}],
                "pagingInfo": {"limit": 10, "offset": 0}
            })
        );
    }

    #[test]
    fn test_mutation_payload_shapes() {
        let mut record = Record::new();
        record.insert(ID_FIELD.to_string(), json!(3));
        record.insert("name_c".to_string(), json!("Road trip"));

        assert_eq!(
            serde_json::to_value(RecordBatch::single(record)).unwrap(),
            json!({"records": [{"Id": 3, "name_c": "Road trip"}]})
        );
        assert_eq!(
            serde_json::to_value(DeleteRequest { record_ids: vec![3] }).unwrap(),
            json!({"RecordIds": [3]})
        );
    }

    #[test]
    fn test_envelope_decoding() {
        let envelope: Envelope = serde_json::from_value(json!({
            "success": true,
            "results": [
                {"success": true, "data": {"Id": 1}},
                {"success": false, "message": "Name is required"}
            ]
        }))
        .unwrap();

        let results = envelope.results.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], BatchResult::ok(json!({"Id": 1})));
        assert_eq!(results[1], BatchResult::failed("Name is required"));

        let failure: Envelope =
            serde_json::from_value(json!({"success": false, "message": "Table not found"}))
                .unwrap();
        assert!(!failure.success);
        assert_eq!(failure.message_or_default(), "Table not found");
        assert_eq!(
            Envelope::with_data(json!([])).message_or_default(),
            "Unknown backend error"
        );
    }
}
