//! In-process record backend.
//!
//! Implements the full [`RecordClient`] contract over plain in-memory tables so
//! the services can run without a hosted project: offline demos, fixtures and
//! integration tests. Filtering, ordering, paging and projection follow the
//! hosted backend's semantics closely enough for the services' queries.

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    records::{
        BatchResult, Condition, ConditionSet, DeleteRequest, Envelope, GroupCondition,
        GroupOperator, Operator, Record, RecordBatch, RecordClient, RecordQuery, SortType,
        WhereGroup, ID_FIELD,
    },
};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Mutex, MutexGuard};
use tracing::trace;

#[derive(Debug, Default)]
struct MemoryTable {
    next_id: i64,
    rows: Vec<Record>,
}

impl MemoryTable {
    fn insert(&mut self, mut record: Record) -> Record {
        let id = match record.get(ID_FIELD).and_then(Value::as_i64) {
            Some(id) => {
                self.next_id = self.next_id.max(id);
                id
            }
            None => {
                self.next_id += 1;
                self.next_id
            }
        };
        record.insert(ID_FIELD.to_string(), Value::from(id));
        self.rows.push(record.clone());
        record
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.get(ID_FIELD).and_then(Value::as_i64) == Some(id))
    }
}

/// Record backend that keeps every table in memory.
#[derive(Debug, Default)]
pub struct MemoryRecordClient {
    tables: Mutex<HashMap<String, MemoryTable>>,
    forced_failure: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl MemoryRecordClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `table` with rows. Rows without an `Id` get the next free one.
    pub fn with_table(self, table: &str, rows: impl IntoIterator<Item = Value>) -> Self {
        {
            let mut tables = self.lock_tables();
            let entry = tables.entry(table.to_string()).or_default();
            for row in rows {
                if let Value::Object(record) = row {
                    entry.insert(record);
                }
            }
        }
        self
    }

    /// Snapshot of a table's rows in insertion order.
    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.lock_tables()
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    /// Make every subsequent call answer `success: false` with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.lock_failure() = Some(message.into());
    }

    pub fn clear_failure(&self) {
        *self.lock_failure() = None;
    }

    /// Number of calls received so far, regardless of outcome.
    pub fn call_count(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    fn lock_tables(&self) -> MutexGuard<'_, HashMap<String, MemoryTable>> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_failure(&self) -> MutexGuard<'_, Option<String>> {
        self.forced_failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin_call(&self, operation: &str, table: &str) -> Option<Envelope> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        trace!(operation, table, "Memory record call");
        self.lock_failure().clone().map(Envelope::failure)
    }
}

fn lookup_key(value: &Value) -> &Value {
    match value {
        Value::Object(map) => map.get(ID_FIELD).unwrap_or(value),
        other => other,
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    let (left, right) = (lookup_key(left), lookup_key(right));
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => left == right,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Object(map) => map
            .get("Name")
            .map(text_of)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

fn matches(row: &Record, field: &str, operator: Operator, values: &[Value]) -> bool {
    let cell = row.get(field).unwrap_or(&Value::Null);
    match operator {
        Operator::EqualTo => values.iter().any(|v| values_equal(cell, v)),
        Operator::NotEqualTo => !values.iter().any(|v| values_equal(cell, v)),
        Operator::Contains => {
            let haystack = text_of(cell).to_lowercase();
            values
                .iter()
                .any(|needle| haystack.contains(&text_of(needle).to_lowercase()))
        }
    }
}

fn condition_matches(row: &Record, condition: &Condition) -> bool {
    matches(row, &condition.field_name, condition.operator, &condition.values)
}

fn group_condition_matches(row: &Record, condition: &GroupCondition) -> bool {
    matches(row, &condition.field_name, condition.operator, &condition.values)
}

fn set_matches(row: &Record, set: &ConditionSet) -> bool {
    set.conditions
        .iter()
        .all(|condition| group_condition_matches(row, condition))
}

fn group_matches(row: &Record, group: &WhereGroup) -> bool {
    match group.operator {
        GroupOperator::Or => group.sub_groups.iter().any(|set| set_matches(row, set)),
        GroupOperator::And => group.sub_groups.iter().all(|set| set_matches(row, set)),
    }
}

fn compare_cells(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let left = left.map(lookup_key).filter(|v| !v.is_null());
    let right = right.map(lookup_key).filter(|v| !v.is_null());
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => text_of(a).cmp(&text_of(b)),
        },
    }
}

fn project(row: &Record, query: &RecordQuery) -> Value {
    if query.fields.is_empty() {
        return Value::Object(row.clone());
    }
    let projected: Record = query
        .field_names()
        .filter_map(|name| row.get(name).map(|v| (name.to_string(), v.clone())))
        .collect();
    Value::Object(projected)
}

#[async_trait]
impl RecordClient for MemoryRecordClient {
    async fn fetch_records(&self, table: &str, query: &RecordQuery) -> Result<Envelope> {
        if let Some(failure) = self.begin_call("fetch", table) {
            return Ok(failure);
        }

        let tables = self.lock_tables();
        let Some(source) = tables.get(table) else {
            return Ok(Envelope::with_data(Value::Array(Vec::new())));
        };

        let mut rows: Vec<&Record> = source
            .rows
            .iter()
            .filter(|row| query.conditions.iter().all(|c| condition_matches(row, c)))
            .filter(|row| query.where_groups.iter().all(|g| group_matches(row, g)))
            .collect();

        rows.sort_by(|a, b| {
            query
                .order_by
                .iter()
                .map(|order| {
                    let ordering =
                        compare_cells(a.get(&order.field_name), b.get(&order.field_name));
                    match order.sorttype {
                        SortType::Asc => ordering,
                        SortType::Desc => ordering.reverse(),
                    }
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        let (offset, limit) = query
            .paging
            .map(|p| (p.offset as usize, p.limit as usize))
            .unwrap_or((0, usize::MAX));

        let data = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| project(row, query))
            .collect();

        Ok(Envelope::with_data(Value::Array(data)))
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        query: &RecordQuery,
    ) -> Result<Envelope> {
        if let Some(failure) = self.begin_call("get_by_id", table) {
            return Ok(failure);
        }

        let tables = self.lock_tables();
        let row = tables
            .get(table)
            .and_then(|t| t.position(id).map(|index| &t.rows[index]));

        Ok(match row {
            Some(row) => Envelope::with_data(project(row, query)),
            None => Envelope::failure(format!("Record {} not found in {}", id, table)),
        })
    }

    async fn create_record(&self, table: &str, payload: &RecordBatch) -> Result<Envelope> {
        if let Some(failure) = self.begin_call("create", table) {
            return Ok(failure);
        }

        let mut tables = self.lock_tables();
        let target = tables.entry(table.to_string()).or_default();
        let results = payload
            .records
            .iter()
            .map(|record| {
                let mut record = record.clone();
                record.remove(ID_FIELD);
                BatchResult::ok(Value::Object(target.insert(record)))
            })
            .collect();

        Ok(Envelope::with_results(results))
    }

    async fn update_record(&self, table: &str, payload: &RecordBatch) -> Result<Envelope> {
        if let Some(failure) = self.begin_call("update", table) {
            return Ok(failure);
        }

        let mut tables = self.lock_tables();
        let target = tables.entry(table.to_string()).or_default();
        let results = payload
            .records
            .iter()
            .map(|patch| {
                let Some(id) = patch.get(ID_FIELD).and_then(Value::as_i64) else {
                    return BatchResult::failed("Id is required for update");
                };
                let Some(index) = target.position(id) else {
                    return BatchResult::failed(format!("Record {} not found", id));
                };
                let row = &mut target.rows[index];
                for (key, value) in patch {
                    row.insert(key.clone(), value.clone());
                }
                BatchResult::ok(Value::Object(row.clone()))
            })
            .collect();

        Ok(Envelope::with_results(results))
    }

    async fn delete_record(&self, table: &str, payload: &DeleteRequest) -> Result<Envelope> {
        if let Some(failure) = self.begin_call("delete", table) {
            return Ok(failure);
        }

        let mut tables = self.lock_tables();
        let target = tables.entry(table.to_string()).or_default();
        let results = payload
            .record_ids
            .iter()
            .map(|&id| match target.position(id) {
                Some(index) => {
                    target.rows.remove(index);
                    BatchResult::ok(serde_json::json!({ ID_FIELD: id }))
                }
                None => BatchResult::failed(format!("Record {} not found", id)),
            })
            .collect();

        Ok(Envelope::with_results(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::records::GroupCondition;
    use serde_json::json;

    fn songs() -> MemoryRecordClient {
        MemoryRecordClient::new().with_table(
            "songs_c",
            vec![
                json!({"title_c": "Blue", "artist_c": "Joni", "playCount_c": 50, "genre_c": {"Id": 1, "Name": "Folk"}}),
                json!({"title_c": "Red", "artist_c": "Taylor", "playCount_c": 90, "genre_c": 2}),
                json!({"title_c": "Kind of Blue", "artist_c": "Miles", "playCount_c": 70, "genre_c": 3}),
            ],
        )
    }

    fn ids(envelope: &Envelope) -> Vec<i64> {
        envelope
            .data
            .as_ref()
            .and_then(Value::as_array)
            .map(|rows| rows.iter().filter_map(|r| r["Id"].as_i64()).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_seeding_assigns_incremental_ids() {
        let client = songs();
        let rows = client.rows("songs_c");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2]["Id"], json!(3));
    }

    #[tokio::test]
    async fn test_fetch_with_group_contains_and_projection() {
        let client = songs();
        let query = RecordQuery::select(&["Id", "title_c"]).group(WhereGroup::any_of([
            GroupCondition::contains("title_c", "blue"),
            GroupCondition::contains("artist_c", "taylor"),
        ]));

        let envelope = client.fetch_records("songs_c", &query).await.unwrap();
        assert_eq!(ids(&envelope), vec![1, 2, 3]);
        assert_eq!(
            envelope.data.unwrap()[0],
            json!({"Id": 1, "title_c": "Blue"})
        );
    }

    #[tokio::test]
    async fn test_fetch_equality_matches_lookup_objects() {
        let client = songs();
        let query = RecordQuery::select(&["Id"]).filter(Condition::equal_to("genre_c", 1));

        let envelope = client.fetch_records("songs_c", &query).await.unwrap();
        assert_eq!(ids(&envelope), vec![1]);
    }

    #[tokio::test]
    async fn test_fetch_order_and_paging() {
        let client = songs();
        let query = RecordQuery::select(&["Id"])
            .order_by("playCount_c", SortType::Desc)
            .page(2, 0);

        let envelope = client.fetch_records("songs_c", &query).await.unwrap();
        assert_eq!(ids(&envelope), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_batch_results_report_missing_rows() {
        let client = songs();

        let deleted = client
            .delete_record("songs_c", &DeleteRequest { record_ids: vec![1, 99] })
            .await
            .unwrap();
        let results = deleted.results.unwrap();
        assert!(results[0].success);
        assert!(!results[1].success);
        assert_eq!(client.rows("songs_c").len(), 2);

        let mut patch = Record::new();
        patch.insert("title_c".to_string(), json!("nope"));
        let updated = client
            .update_record("songs_c", &RecordBatch::single(patch))
            .await
            .unwrap();
        assert_eq!(
            updated.results.unwrap()[0].message.as_deref(),
            Some("Id is required for update")
        );
    }

    #[tokio::test]
    async fn test_forced_failure_and_call_count() {
        let client = songs();
        client.fail_with("Service unavailable");

        let envelope = client
            .fetch_records("songs_c", &RecordQuery::default())
            .await
            .unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.message.as_deref(), Some("Service unavailable"));

        client.clear_failure();
        let found = client
            .get_record_by_id("songs_c", 2, &RecordQuery::select(&["title_c"]))
            .await
            .unwrap();
        assert_eq!(found.data, Some(json!({"title_c": "Red"})));
        assert_eq!(client.call_count(), 2);
    }
}
