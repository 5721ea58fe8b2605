use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::RecordId;

pub mod fixtures;
pub mod memory;

/// A plain record as exchanged with the record store
pub type Record = serde_json::Map<String, Value>;

/// Identifier field carried by every record
pub const ID_FIELD: &str = "Id";

/// Fields that hold record ids of other collections
pub const FOREIGN_KEY_FIELDS: [&str; 5] = ["projectId", "assigneeId", "taskId", "userId", "Owner"];

/// Named collections of the record store
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    #[serde(rename = "project")]
    Project,
    #[serde(rename = "task")]
    Task,
    #[serde(rename = "app_User")]
    User,
    #[serde(rename = "app_Comment")]
    Comment,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Project,
        Collection::Task,
        Collection::User,
        Collection::Comment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Project => "project",
            Collection::Task => "task",
            Collection::User => "app_User",
            Collection::Comment => "app_Comment",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    EqualTo,
    GreaterThanOrEqualTo,
    LessThanOrEqualTo,
    /// Case-insensitive substring over a string, or over any element of a
    /// string array
    Contains,
}

/// A single `where` clause. Matches when any of `values` satisfies `operator`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub values: Vec<Value>,
}

impl Condition {
    pub fn new(field: &str, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            operator,
            values: vec![value.into()],
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        let Some(actual) = record.get(&self.field) else {
            return false;
        };
        self.values
            .iter()
            .any(|expected| compare(actual, self.operator, expected))
    }
}

fn compare(actual: &Value, operator: Operator, expected: &Value) -> bool {
    match operator {
        Operator::EqualTo => match (actual.as_f64(), expected.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => actual == expected,
        },
        Operator::GreaterThanOrEqualTo => {
            matches!(order(actual, expected), Some(Ordering::Greater | Ordering::Equal))
        }
        Operator::LessThanOrEqualTo => {
            matches!(order(actual, expected), Some(Ordering::Less | Ordering::Equal))
        }
        Operator::Contains => {
            let Some(needle) = expected.as_str().map(str::to_lowercase) else {
                return false;
            };
            match actual {
                Value::String(s) => s.to_lowercase().contains(&needle),
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|s| s.to_lowercase().contains(&needle)),
                _ => false,
            }
        }
    }
}

/// Numbers compare numerically, strings lexically (ISO dates sort correctly
/// that way). Anything else, including null, is unordered.
fn order(actual: &Value, expected: &Value) -> Option<Ordering> {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}

/// Parameters of a fetch: field projection plus `where` clauses.
///
/// Every condition in `where_all` must match. When `where_any` is not empty,
/// at least one of its conditions must match as well.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchParams {
    pub fields: Vec<String>,
    pub where_all: Vec<Condition>,
    pub where_any: Vec<Condition>,
}

impl FetchParams {
    pub fn with_fields(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.where_all.push(condition);
        self
    }

    pub fn any(mut self, condition: Condition) -> Self {
        self.where_any.push(condition);
        self
    }

    pub fn is_search(&self) -> bool {
        !self.where_any.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.where_all.iter().all(|c| c.matches(record))
            && (self.where_any.is_empty() || self.where_any.iter().any(|c| c.matches(record)))
    }

    /// Keeps only the requested fields, and always the `Id`.
    /// An empty field list keeps everything.
    pub fn project(&self, record: &Record) -> Record {
        project_fields(record, &self.fields)
    }
}

pub fn project_fields(record: &Record, fields: &[String]) -> Record {
    if fields.is_empty() {
        return record.clone();
    }
    record
        .iter()
        .filter(|(key, _)| key.as_str() == ID_FIELD || fields.iter().any(|f| f == *key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Record {id} not found in '{collection}'")]
    NotFound { collection: Collection, id: RecordId },

    #[error("Record sent to '{0}' has no valid Id")]
    MissingId(Collection),

    #[error("Record store rejected the request: {0}")]
    Rejected(String),
}

/// Generic CRUD against named collections.
///
/// Implementations own their records; callers only ever see copies.
pub trait RecordStore {
    async fn fetch_records(
        &self,
        collection: Collection,
        params: &FetchParams,
    ) -> Result<Vec<Record>, StoreError>;

    async fn get_record_by_id(
        &self,
        collection: Collection,
        id: RecordId,
        fields: &[String],
    ) -> Result<Record, StoreError>;

    /// Creates every record and echoes them back with their assigned `Id`
    async fn create_record(
        &self,
        collection: Collection,
        records: Vec<Record>,
    ) -> Result<Vec<Record>, StoreError>;

    /// Merges each record into the stored record with the same `Id`
    async fn update_record(
        &self,
        collection: Collection,
        records: Vec<Record>,
    ) -> Result<Vec<Record>, StoreError>;

    /// Returns `true` when every id was found and removed
    async fn delete_record(&self, collection: Collection, ids: &[RecordId])
    -> Result<bool, StoreError>;
}

/// Reads a record id out of a loosely typed value.
///
/// Integers, integral floats and strings holding an integer are accepted.
/// Zero is not a valid id.
pub fn parse_id(value: &Value) -> Option<RecordId> {
    let id = match value {
        Value::Number(n) => match n.as_i64() {
            Some(id) => Some(id),
            None => n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as RecordId),
        },
        Value::String(s) => s.trim().parse::<RecordId>().ok(),
        _ => None,
    };
    id.filter(|id| *id != 0)
}

/// Coerces one foreign key value: a valid id becomes an integer, anything
/// else becomes null.
pub fn coerce_id(value: &Value) -> Value {
    parse_id(value).map(Value::from).unwrap_or(Value::Null)
}

/// Coerces every foreign key field present in `record`
pub fn coerce_foreign_keys(record: &mut Record) {
    for field in FOREIGN_KEY_FIELDS {
        if let Some(value) = record.get_mut(field) {
            *value = coerce_id(value);
        }
    }
}
