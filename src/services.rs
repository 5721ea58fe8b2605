use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

use crate::{
    models::{RecordId, validation::ValidationErrors},
    records::{Record, StoreError},
};

pub mod calendar;
pub mod comments;
pub mod projects;
pub mod tasks;
pub mod users;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: RecordId },

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Record store error: {0}")]
    Remote(#[from] StoreError),

    #[error("Malformed {entity} record: {source}")]
    Malformed {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ServiceError {
    /// Translates a store-level miss into the entity-level one
    pub(crate) fn from_store(entity: &'static str, error: StoreError) -> Self {
        match error {
            StoreError::NotFound { id, .. } => ServiceError::NotFound { entity, id },
            other => ServiceError::Remote(other),
        }
    }
}

pub(crate) fn decode<T: DeserializeOwned>(
    entity: &'static str,
    record: Record,
) -> Result<T, ServiceError> {
    serde_json::from_value(Value::Object(record))
        .map_err(|source| ServiceError::Malformed { entity, source })
}

pub(crate) fn decode_all<T: DeserializeOwned>(
    entity: &'static str,
    records: Vec<Record>,
) -> Result<Vec<T>, ServiceError> {
    records.into_iter().map(|r| decode(entity, r)).collect()
}

/// Decodes the first record echoed back by a create or update
pub(crate) fn decode_echo<T: DeserializeOwned>(
    entity: &'static str,
    records: Vec<Record>,
) -> Result<T, ServiceError> {
    let record = records.into_iter().next().ok_or_else(|| {
        ServiceError::Remote(StoreError::Rejected(format!(
            "no {} record returned",
            entity.to_lowercase()
        )))
    })?;
    decode(entity, record)
}

pub(crate) fn encode<T: Serialize>(entity: &'static str, value: &T) -> Result<Record, ServiceError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(_) => Err(ServiceError::Remote(StoreError::Rejected(format!(
            "{} did not serialize to a record",
            entity.to_lowercase()
        )))),
        Err(source) => Err(ServiceError::Malformed { entity, source }),
    }
}

/// Id-only record carrying `changes`, as sent to `update_record`
pub(crate) fn patch(id: RecordId, changes: Value) -> Record {
    let mut record = match changes {
        Value::Object(map) => map,
        _ => Record::new(),
    };
    record.insert(crate::records::ID_FIELD.to_string(), Value::from(id));
    record
}

pub(crate) fn field_names(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}
