use serde_json::Value;

use crate::{models::parse_tags, storage::StorageError};

type MigrationFn = fn(Value) -> Result<Value, StorageError>;

fn get_migrations() -> Vec<MigrationFn> {
    vec![migrate_v1_to_v2]
}

/// Returns 1 if version field is missing (assumes v1, our first versioned schema)
pub fn detect_version(value: &Value) -> Result<u32, StorageError> {
    match value.get("version") {
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| StorageError::MalformedVersion(v.to_string())),
        None => Ok(1),
    }
}

/// Migrations are applied sequentially: v1→v2→v3→...→target
pub fn apply_migrations(
    mut data: Value,
    from_version: u32,
    to_version: u32,
) -> Result<Value, StorageError> {
    if from_version == to_version {
        return Ok(data);
    }

    if from_version > to_version {
        return Err(StorageError::FutureVersion(from_version));
    }

    if from_version == 0 {
        return Err(StorageError::UnsupportedVersion(from_version));
    }

    let migrations = get_migrations();

    for version in from_version..to_version {
        let migration_idx = (version - 1) as usize; // v1→v2 is at index 0

        if migration_idx >= migrations.len() {
            return Err(StorageError::UnsupportedVersion(version));
        }

        data = migrations[migration_idx](data)?;
    }

    Ok(data)
}

/// v1 stored task tags as one comma separated string
fn migrate_v1_to_v2(mut value: Value) -> Result<Value, StorageError> {
    if let Some(obj) = value.as_object_mut() {
        obj.insert("version".to_string(), Value::from(2));

        if let Some(tasks) = obj.get_mut("task").and_then(|t| t.as_array_mut()) {
            for task in tasks {
                let Some(task_obj) = task.as_object_mut() else {
                    continue;
                };
                let tags = match task_obj.get("tags") {
                    Some(Value::String(joined)) => parse_tags(joined),
                    Some(Value::Null) | None => vec![],
                    Some(_) => continue,
                };
                task_obj.insert("tags".to_string(), Value::from(tags));
            }
        }
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_version_with_version_field() {
        let json = json!({"version": 2, "task": []});
        assert_eq!(detect_version(&json).unwrap(), 2);
    }

    #[test]
    fn test_detect_version_without_version_field() {
        let json = json!({"task": [], "project": []});
        assert_eq!(detect_version(&json).unwrap(), 1);
    }

    #[test]
    fn test_detect_version_rejects_non_numbers() {
        let json = json!({"version": "two"});
        assert!(matches!(
            detect_version(&json),
            Err(StorageError::MalformedVersion(_))
        ));
    }

    #[test]
    fn test_apply_migrations_same_version() {
        let data = json!({"version": 2});
        let result = apply_migrations(data.clone(), 2, 2).unwrap();
        assert_eq!(result, data);
    }

    #[test]
    fn test_apply_migrations_future_version() {
        let data = json!({"version": 5});
        let result = apply_migrations(data, 5, 2);
        assert!(matches!(result, Err(StorageError::FutureVersion(5))));
    }

    #[test]
    fn test_v1_tags_are_split_into_arrays() {
        let data = json!({
            "task": [
                {"Id": 1, "tags": "design, ux,"},
                {"Id": 2, "tags": null},
                {"Id": 3, "tags": ["kept"]},
                {"Id": 4}
            ]
        });

        let migrated = apply_migrations(data, 1, 2).unwrap();
        assert_eq!(migrated["version"], json!(2));
        assert_eq!(migrated["task"][0]["tags"], json!(["design", "ux"]));
        assert_eq!(migrated["task"][1]["tags"], json!([]));
        assert_eq!(migrated["task"][2]["tags"], json!(["kept"]));
        assert_eq!(migrated["task"][3]["tags"], json!([]));
    }
}
