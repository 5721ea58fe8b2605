use std::{
    collections::{HashSet, VecDeque},
    time::Duration,
};

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::{
    models::{RecordId, snapshot::Snapshot},
    records::{
        Collection, FetchParams, ID_FIELD, Record, RecordStore, StoreError, coerce_foreign_keys,
        parse_id, project_fields,
    },
};

/// Simulated round-trip delay per kind of operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub read: Duration,
    pub search: Duration,
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Latency {
    /// Delays of a remote backend, heavier operations waiting longer
    pub fn simulated() -> Self {
        Self {
            read: Duration::from_millis(200),
            search: Duration::from_millis(400),
            create: Duration::from_millis(300),
            update: Duration::from_millis(250),
            delete: Duration::from_millis(150),
        }
    }

    pub fn none() -> Self {
        Self {
            read: Duration::ZERO,
            search: Duration::ZERO,
            create: Duration::ZERO,
            update: Duration::ZERO,
            delete: Duration::ZERO,
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Get,
    Create,
    Update,
    Delete,
}

/// In-memory record store.
///
/// One instance is built per process (or per test) and handed to the services
/// by reference. Failures can be scripted with [`MemoryRecordStore::fail_next`]
/// to exercise rollback paths.
pub struct MemoryRecordStore {
    data: RwLock<Snapshot>,
    latency: Latency,
    scripted_failures: Mutex<VecDeque<(Operation, String)>>,
}

impl MemoryRecordStore {
    #[cfg(test)]
    pub fn new(latency: Latency) -> Self {
        Self::from_snapshot(Snapshot::default(), latency)
    }

    pub fn from_snapshot(mut snapshot: Snapshot, latency: Latency) -> Self {
        snapshot.last_id = snapshot.max_id();
        Self {
            data: RwLock::new(snapshot),
            latency,
            scripted_failures: Mutex::new(VecDeque::new()),
        }
    }

    /// Copy of every collection, ready to be persisted
    pub async fn snapshot(&self) -> Snapshot {
        self.data.read().await.clone()
    }

    /// Makes the next call of `operation` fail with `message`
    #[cfg(test)]
    pub async fn fail_next(&self, operation: Operation, message: &str) {
        self.scripted_failures
            .lock()
            .await
            .push_back((operation, message.to_string()));
    }

    async fn begin(&self, operation: Operation, delay: Duration) -> Result<(), StoreError> {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut failures = self.scripted_failures.lock().await;
        if let Some(index) = failures.iter().position(|(op, _)| *op == operation) {
            if let Some((_, message)) = failures.remove(index) {
                warn!(?operation, %message, "scripted record store failure");
                return Err(StoreError::Rejected(message));
            }
        }
        Ok(())
    }
}

fn record_id(record: &Record) -> Option<RecordId> {
    record.get(ID_FIELD).and_then(parse_id)
}

impl RecordStore for MemoryRecordStore {
    async fn fetch_records(
        &self,
        collection: Collection,
        params: &FetchParams,
    ) -> Result<Vec<Record>, StoreError> {
        let delay = if params.is_search() {
            self.latency.search
        } else {
            self.latency.read
        };
        self.begin(Operation::Fetch, delay).await?;

        let data = self.data.read().await;
        let records: Vec<Record> = data
            .records(collection)
            .iter()
            .filter(|r| params.matches(r))
            .map(|r| params.project(r))
            .collect();

        debug!(%collection, count = records.len(), "fetched records");
        Ok(records)
    }

    async fn get_record_by_id(
        &self,
        collection: Collection,
        id: RecordId,
        fields: &[String],
    ) -> Result<Record, StoreError> {
        self.begin(Operation::Get, self.latency.read).await?;

        let data = self.data.read().await;
        data.records(collection)
            .iter()
            .find(|r| record_id(r) == Some(id))
            .map(|r| project_fields(r, fields))
            .ok_or(StoreError::NotFound { collection, id })
    }

    async fn create_record(
        &self,
        collection: Collection,
        records: Vec<Record>,
    ) -> Result<Vec<Record>, StoreError> {
        self.begin(Operation::Create, self.latency.create).await?;

        let mut data = self.data.write().await;
        let mut created = Vec::with_capacity(records.len());
        for mut record in records {
            data.last_id += 1;
            record.insert(ID_FIELD.to_string(), Value::from(data.last_id));
            coerce_foreign_keys(&mut record);
            data.records_mut(collection).push(record.clone());
            created.push(record);
        }

        debug!(%collection, count = created.len(), "created records");
        Ok(created)
    }

    async fn update_record(
        &self,
        collection: Collection,
        records: Vec<Record>,
    ) -> Result<Vec<Record>, StoreError> {
        self.begin(Operation::Update, self.latency.update).await?;

        let mut data = self.data.write().await;

        // Resolve every target first so a bad id leaves the collection untouched
        let mut targets = Vec::with_capacity(records.len());
        for record in &records {
            let id = record_id(record).ok_or(StoreError::MissingId(collection))?;
            let index = data
                .records(collection)
                .iter()
                .position(|r| record_id(r) == Some(id))
                .ok_or(StoreError::NotFound { collection, id })?;
            targets.push(index);
        }

        let stored = data.records_mut(collection);
        let mut updated = Vec::with_capacity(records.len());
        for (index, mut changes) in targets.into_iter().zip(records) {
            changes.remove(ID_FIELD);
            coerce_foreign_keys(&mut changes);
            let target = &mut stored[index];
            target.extend(changes);
            updated.push(target.clone());
        }

        debug!(%collection, count = updated.len(), "updated records");
        Ok(updated)
    }

    async fn delete_record(
        &self,
        collection: Collection,
        ids: &[RecordId],
    ) -> Result<bool, StoreError> {
        self.begin(Operation::Delete, self.latency.delete).await?;

        let requested: HashSet<RecordId> = ids.iter().copied().collect();
        let mut data = self.data.write().await;
        let stored = data.records_mut(collection);
        let before = stored.len();
        stored.retain(|r| record_id(r).is_none_or(|id| !requested.contains(&id)));
        let removed = before - stored.len();

        debug!(%collection, removed, requested = requested.len(), "deleted records");
        Ok(removed == requested.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Condition, Operator};
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids_and_coerces_keys() {
        let store = MemoryRecordStore::new(Latency::none());
        let created = store
            .create_record(
                Collection::Task,
                vec![
                    record(json!({"title": "a", "projectId": "3"})),
                    record(json!({"title": "b", "projectId": "x"})),
                ],
            )
            .await
            .unwrap();

        assert_eq!(created[0][ID_FIELD], json!(1));
        assert_eq!(created[1][ID_FIELD], json!(2));
        assert_eq!(created[0]["projectId"], json!(3));
        assert_eq!(created[1]["projectId"], Value::Null);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = MemoryRecordStore::new(Latency::none());
        store
            .create_record(Collection::Project, vec![record(json!({"title": "a"}))])
            .await
            .unwrap();
        assert!(store.delete_record(Collection::Project, &[1]).await.unwrap());

        let created = store
            .create_record(Collection::Project, vec![record(json!({"title": "b"}))])
            .await
            .unwrap();
        assert_eq!(created[0][ID_FIELD], json!(2));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryRecordStore::new(Latency::none());
        store
            .create_record(
                Collection::Task,
                vec![record(json!({"title": "a", "status": "To Do"}))],
            )
            .await
            .unwrap();

        let updated = store
            .update_record(Collection::Task, vec![record(json!({"Id": 1, "status": "Done"}))])
            .await
            .unwrap();
        assert_eq!(updated[0]["title"], json!("a"));
        assert_eq!(updated[0]["status"], json!("Done"));
    }

    #[tokio::test]
    async fn test_update_unknown_id_changes_nothing() {
        let store = MemoryRecordStore::new(Latency::none());
        store
            .create_record(Collection::Task, vec![record(json!({"status": "To Do"}))])
            .await
            .unwrap();

        let result = store
            .update_record(
                Collection::Task,
                vec![
                    record(json!({"Id": 1, "status": "Done"})),
                    record(json!({"Id": 99, "status": "Done"})),
                ],
            )
            .await;
        assert_eq!(
            result,
            Err(StoreError::NotFound {
                collection: Collection::Task,
                id: 99
            })
        );

        let stored = store
            .get_record_by_id(Collection::Task, 1, &[])
            .await
            .unwrap();
        assert_eq!(stored["status"], json!("To Do"));
    }

    #[tokio::test]
    async fn test_fetch_filters_and_projects() {
        let store = MemoryRecordStore::new(Latency::none());
        store
            .create_record(
                Collection::Task,
                vec![
                    record(json!({"title": "a", "projectId": 1})),
                    record(json!({"title": "b", "projectId": 2})),
                ],
            )
            .await
            .unwrap();

        let mut params = FetchParams::with_fields(&["title"]);
        params = params.filter(Condition::new("projectId", Operator::EqualTo, 2));
        let records = store.fetch_records(Collection::Task, &params).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(Value::Object(records[0].clone()), json!({"Id": 2, "title": "b"}));
    }

    #[tokio::test]
    async fn test_scripted_failure_is_consumed_once() {
        let store = MemoryRecordStore::new(Latency::none());
        store.fail_next(Operation::Fetch, "backend down").await;

        let first = store
            .fetch_records(Collection::Task, &FetchParams::default())
            .await;
        assert_eq!(first, Err(StoreError::Rejected("backend down".to_string())));

        let second = store
            .fetch_records(Collection::Task, &FetchParams::default())
            .await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_delete_reports_missing_ids() {
        let store = MemoryRecordStore::new(Latency::none());
        assert!(!store.delete_record(Collection::Comment, &[5]).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_with_repeated_ids_reports_success() {
        let store = MemoryRecordStore::new(Latency::none());
        store
            .create_record(
                Collection::Comment,
                vec![record(json!({"content": "a"})), record(json!({"content": "b"}))],
            )
            .await
            .unwrap();

        assert!(store.delete_record(Collection::Comment, &[1, 2, 1]).await.unwrap());
        let left = store
            .fetch_records(Collection::Comment, &FetchParams::default())
            .await
            .unwrap();
        assert!(left.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_latency_delays_reads() {
        let store = MemoryRecordStore::new(Latency::simulated());
        let started = tokio::time::Instant::now();
        store
            .fetch_records(Collection::User, &FetchParams::default())
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(200));
    }
}
