//! Generic repository over one backend table.
//!
//! All entity services are thin configuration on top of [`RecordRepository`]:
//! it owns the envelope handling, batch-result rules, id coercion, logging and
//! change events, so the per-table services only shape queries.

use bridge_traits::records::{
    BatchResult, DeleteRequest, Envelope, Record, RecordBatch, RecordClient, RecordQuery, ID_FIELD,
};
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

use crate::error::{LibraryError, Result};
use crate::ids::{IntoRecordId, RecordId};
use crate::models::Entity;

pub struct RecordRepository<E: Entity> {
    client: Arc<dyn RecordClient>,
    events: Option<EventBus>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for RecordRepository<E> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            events: self.events.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> RecordRepository<E> {
    pub fn new(client: Arc<dyn RecordClient>) -> Self {
        Self {
            client,
            events: None,
            _entity: PhantomData,
        }
    }

    /// Publish a [`LibraryEvent`] after every successful mutation.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Query projecting the entity's fields, ready for filters.
    pub fn query(&self) -> RecordQuery {
        RecordQuery::select(E::FIELDS)
    }

    /// Fetch rows matching `query`.
    ///
    /// Missing `data` is an empty result. `success: false` and transport
    /// failures are errors.
    #[instrument(skip(self, query), fields(table = E::TABLE))]
    pub async fn fetch_all(&self, query: RecordQuery) -> Result<Vec<E>> {
        let envelope = self
            .client
            .fetch_records(E::TABLE, &query)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch {} records", E::LABEL);
                LibraryError::from(e)
            })?;

        if !envelope.success {
            error!(message = envelope.message_or_default(), "Backend rejected {} query", E::LABEL);
            return Err(service_error::<E>(&envelope));
        }

        let rows = decode_rows::<E>(envelope.data)?;
        debug!(count = rows.len(), "Fetched {} records", E::LABEL);
        Ok(rows)
    }

    /// Like [`fetch_all`](Self::fetch_all), but every failure becomes `[]`.
    pub async fn fetch_or_empty(&self, query: RecordQuery) -> Vec<E> {
        match self.fetch_all(query).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(table = E::TABLE, error = %e, "Returning empty {} list", E::LABEL);
                Vec::new()
            }
        }
    }

    /// Fetch one row. Not found and every kind of failure yield `None`.
    #[instrument(skip(self, id), fields(table = E::TABLE, id = %id))]
    pub async fn find_by_id(&self, id: impl IntoRecordId) -> Option<E> {
        let Some(record_id) = id.into_record_id() else {
            warn!("Cannot look up {} with a non-numeric id", E::LABEL);
            return None;
        };

        let envelope = match self
            .client
            .get_record_by_id(E::TABLE, record_id, &self.query())
            .await
        {
            Ok(envelope) => envelope,
            Err(e) => {
                error!(error = %e, "Failed to fetch {} {}", E::LABEL, record_id);
                return None;
            }
        };

        if !envelope.success {
            warn!(message = envelope.message_or_default(), "Backend rejected {} lookup", E::LABEL);
            return None;
        }

        match envelope.data {
            None | Some(Value::Null) => None,
            Some(row) => match serde_json::from_value(row) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    error!(error = %e, "Undecodable {} row", E::LABEL);
                    None
                }
            },
        }
    }

    /// Create one record from a draft.
    ///
    /// Returns the first successfully created row, or `None` when the backend
    /// reports no successful result.
    #[instrument(skip(self, draft), fields(table = E::TABLE))]
    pub async fn create<D: Serialize>(&self, draft: &D) -> Result<Option<E>> {
        let record = to_record(draft)?;
        let envelope = self
            .client
            .create_record(E::TABLE, &RecordBatch::single(record))
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to create {}", E::LABEL);
                LibraryError::from(e)
            })?;

        let Some(successful) = settle_batch::<E>(envelope, "create")? else {
            return Ok(None);
        };

        let created = first_row::<E>(successful)?;
        if let Some(entity) = &created {
            self.announce(LibraryEvent::RecordCreated {
                table: E::TABLE.to_string(),
                id: Some(entity.id()),
            });
        }
        Ok(created)
    }

    /// Update one record. Only keys present in `patch` are sent alongside `Id`.
    #[instrument(skip(self, id, patch), fields(table = E::TABLE, id = %id))]
    pub async fn update<P: Serialize>(&self, id: impl IntoRecordId, patch: &P) -> Result<Option<E>> {
        let record_id = coerce_id(&id)?;

        let mut record = to_record(patch)?;
        record.remove(ID_FIELD);
        let mut payload = Record::new();
        payload.insert(ID_FIELD.to_string(), Value::from(record_id));
        payload.extend(record);

        let envelope = self
            .client
            .update_record(E::TABLE, &RecordBatch::single(payload))
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to update {} {}", E::LABEL, record_id);
                LibraryError::from(e)
            })?;

        let Some(successful) = settle_batch::<E>(envelope, "update")? else {
            return Ok(None);
        };

        let updated = first_row::<E>(successful)?;
        if updated.is_some() {
            self.announce(LibraryEvent::RecordUpdated {
                table: E::TABLE.to_string(),
                id: record_id,
            });
        }
        Ok(updated)
    }

    /// Delete one record. `true` iff at least one batch result succeeded.
    #[instrument(skip(self, id), fields(table = E::TABLE, id = %id))]
    pub async fn delete(&self, id: impl IntoRecordId) -> Result<bool> {
        let record_id = coerce_id(&id)?;

        let envelope = self
            .client
            .delete_record(
                E::TABLE,
                &DeleteRequest {
                    record_ids: vec![record_id],
                },
            )
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to delete {} {}", E::LABEL, record_id);
                LibraryError::from(e)
            })?;

        let deleted = settle_batch::<E>(envelope, "delete")?
            .map_or(false, |successful| !successful.is_empty());

        if deleted {
            self.announce(LibraryEvent::RecordDeleted {
                table: E::TABLE.to_string(),
                id: record_id,
            });
        }
        Ok(deleted)
    }

    fn announce(&self, event: LibraryEvent) {
        if let Some(bus) = &self.events {
            if bus.emit(CoreEvent::Library(event)).is_err() {
                debug!("No subscribers for library event");
            }
        }
    }
}

fn coerce_id(id: &impl IntoRecordId) -> Result<RecordId> {
    id.into_record_id()
        .ok_or_else(|| LibraryError::invalid_id(ID_FIELD, id))
}

fn service_error<E: Entity>(envelope: &Envelope) -> LibraryError {
    LibraryError::Service {
        table: E::TABLE.to_string(),
        message: envelope.message_or_default().to_string(),
    }
}

fn to_record<T: Serialize>(value: &T) -> Result<Record> {
    match serde_json::to_value(value) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(other) => Err(LibraryError::InvalidInput {
            field: "record".to_string(),
            message: format!("expected an object, got {}", other),
        }),
        Err(e) => Err(LibraryError::InvalidInput {
            field: "record".to_string(),
            message: e.to_string(),
        }),
    }
}

fn decode_rows<E: Entity>(data: Option<Value>) -> Result<Vec<E>> {
    match data {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(rows) => serde_json::from_value(rows).map_err(|source| {
            error!(table = E::TABLE, error = %source, "Undecodable {} rows", E::LABEL);
            LibraryError::Decode {
                table: E::TABLE.to_string(),
                source,
            }
        }),
    }
}

/// Apply the batch rules shared by create, update and delete.
///
/// `Ok(None)` when the envelope carries no `results`; otherwise the
/// successful results. A failed result with a message is an error.
fn settle_batch<E: Entity>(envelope: Envelope, action: &str) -> Result<Option<Vec<BatchResult>>> {
    if !envelope.success {
        error!(
            table = E::TABLE,
            message = envelope.message_or_default(),
            "Backend rejected {} {}",
            E::LABEL,
            action
        );
        return Err(service_error::<E>(&envelope));
    }

    let Some(results) = envelope.results else {
        debug!(table = E::TABLE, "{} {} returned no results", E::LABEL, action);
        return Ok(None);
    };

    let (successful, failed): (Vec<_>, Vec<_>) =
        results.into_iter().partition(|result| result.success);

    if !failed.is_empty() {
        error!(
            table = E::TABLE,
            failed = failed.len(),
            "Failed to {} {} {} record(s)",
            action,
            failed.len(),
            E::LABEL
        );
        if let Some(message) = failed.iter().find_map(|result| result.message.clone()) {
            return Err(LibraryError::BatchFailed {
                table: E::TABLE.to_string(),
                message,
                failed: failed.len(),
            });
        }
    }

    Ok(Some(successful))
}

fn first_row<E: Entity>(successful: Vec<BatchResult>) -> Result<Option<E>> {
    match successful.into_iter().next().and_then(|result| result.data) {
        None | Some(Value::Null) => Ok(None),
        Some(row) => serde_json::from_value(row)
            .map(Some)
            .map_err(|source| LibraryError::Decode {
                table: E::TABLE.to_string(),
                source,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Genre;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use mockall::mock;
    use serde_json::json;

    mock! {
        Records {}

        #[async_trait]
        impl RecordClient for Records {
            async fn fetch_records(&self, table: &str, query: &RecordQuery) -> BridgeResult<Envelope>;
            async fn get_record_by_id(&self, table: &str, id: i64, query: &RecordQuery) -> BridgeResult<Envelope>;
            async fn create_record(&self, table: &str, payload: &RecordBatch) -> BridgeResult<Envelope>;
            async fn update_record(&self, table: &str, payload: &RecordBatch) -> BridgeResult<Envelope>;
            async fn delete_record(&self, table: &str, payload: &DeleteRequest) -> BridgeResult<Envelope>;
        }
    }

    fn repo(mock: MockRecords) -> RecordRepository<Genre> {
        RecordRepository::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_fetch_all_missing_data_is_empty() {
        let mut mock = MockRecords::new();
        mock.expect_fetch_records()
            .withf(|table, query| table == "genres_c" && query.field_names().eq(["Id", "name_c", "icon_c"]))
            .returning(|_, _| Ok(Envelope::with_results(vec![])));

        let repo = repo(mock);
        let rows = repo.fetch_all(repo.query()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_rejection_is_service_error() {
        let mut mock = MockRecords::new();
        mock.expect_fetch_records()
            .returning(|_, _| Ok(Envelope::failure("Table not found")));

        let repo = repo(mock);
        let err = repo.fetch_all(repo.query()).await.unwrap_err();
        assert!(matches!(err, LibraryError::Service { message, .. } if message == "Table not found"));
        assert!(repo.fetch_or_empty(repo.query()).await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_transport_error() {
        let mut mock = MockRecords::new();
        mock.expect_fetch_records()
            .returning(|_, _| Err(BridgeError::OperationFailed("connection reset".into())));

        let repo = repo(mock);
        assert!(matches!(
            repo.fetch_all(repo.query()).await,
            Err(LibraryError::Bridge(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_id_failures_are_none() {
        let mut mock = MockRecords::new();
        mock.expect_get_record_by_id()
            .withf(|_, id, _| *id == 1)
            .returning(|_, _, _| Ok(Envelope::failure("not found")));
        mock.expect_get_record_by_id()
            .withf(|_, id, _| *id == 2)
            .returning(|_, _, _| Err(BridgeError::OperationFailed("timeout".into())));
        mock.expect_get_record_by_id()
            .withf(|_, id, _| *id == 3)
            .returning(|_, _, _| Ok(Envelope::with_data(json!({"Id": 3, "name_c": "Jazz"}))));

        let repo = repo(mock);
        assert!(repo.find_by_id(1).await.is_none());
        assert!(repo.find_by_id("2").await.is_none());
        assert!(repo.find_by_id("genre").await.is_none());
        assert_eq!(repo.find_by_id(" 3").await.unwrap().name, "Jazz");
    }

    #[tokio::test]
    async fn test_update_with_empty_patch_sends_only_id() {
        let mut mock = MockRecords::new();
        mock.expect_update_record()
            .withf(|_, payload| payload.records == vec![json!({"Id": 9}).as_object().unwrap().clone()])
            .times(1)
            .returning(|_, _| Ok(Envelope::with_results(vec![BatchResult::ok(json!({"Id": 9}))])));

        let updated = repo(mock)
            .update("9", &json!({}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, 9);
    }

    #[tokio::test]
    async fn test_update_rejects_non_numeric_id() {
        let repo = repo(MockRecords::new());
        assert!(matches!(
            repo.update("abc", &json!({})).await,
            Err(LibraryError::InvalidInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_raises_first_failure_message() {
        let mut mock = MockRecords::new();
        mock.expect_create_record().returning(|_, _| {
            Ok(Envelope::with_results(vec![
                BatchResult::ok(json!({"Id": 1, "name_c": "Rock"})),
                BatchResult {
                    success: false,
                    data: None,
                    message: None,
                },
                BatchResult::failed("name_c is required"),
            ]))
        });

        let err = repo(mock).create(&json!({"name_c": "Rock"})).await.unwrap_err();
        assert_eq!(err.to_string(), "name_c is required");
    }

    #[tokio::test]
    async fn test_create_without_results_is_none() {
        let mut mock = MockRecords::new();
        mock.expect_create_record()
            .returning(|_, _| Ok(Envelope::with_data(json!(null))));

        assert!(repo(mock).create(&json!({"name_c": "Pop"})).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_batch_outcomes() {
        let mut mock = MockRecords::new();
        mock.expect_delete_record()
            .withf(|_, payload| payload.record_ids == vec![1])
            .returning(|_, _| {
                Ok(Envelope::with_results(vec![BatchResult {
                    success: false,
                    data: None,
                    message: None,
                }]))
            });
        mock.expect_delete_record()
            .withf(|_, payload| payload.record_ids == vec![2])
            .returning(|_, _| Ok(Envelope::with_results(vec![BatchResult::failed("locked")])));
        mock.expect_delete_record()
            .withf(|_, payload| payload.record_ids == vec![3])
            .returning(|_, _| Ok(Envelope::with_results(vec![BatchResult::ok(json!(null))])));

        let repo = repo(mock);
        assert!(!repo.delete(1).await.unwrap());
        assert!(matches!(repo.delete(2).await, Err(LibraryError::BatchFailed { .. })));
        assert!(repo.delete(3).await.unwrap());
    }

    #[tokio::test]
    async fn test_mutations_announce_events() {
        let mut mock = MockRecords::new();
        mock.expect_delete_record()
            .returning(|_, _| Ok(Envelope::with_results(vec![BatchResult::ok(json!(null))])));

        let bus = EventBus::new(4);
        let mut events = bus.subscribe();
        let repo = repo(mock).with_event_bus(bus);

        repo.delete(5).await.unwrap();

        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Library(LibraryEvent::RecordDeleted {
                table: "genres_c".to_string(),
                id: 5
            })
        );
    }
}
