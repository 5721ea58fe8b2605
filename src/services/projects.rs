use jiff::{Timestamp, civil::Date};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    models::{
        RecordId,
        project::{Project, ProjectDraft},
        task::Task,
    },
    records::{Collection, Condition, FetchParams, Operator, RecordStore},
    services::{ServiceError, decode, decode_all, decode_echo, encode, field_names, patch},
};

const ENTITY: &str = "Project";

pub const PROJECT_FIELDS: [&str; 8] = [
    "title",
    "description",
    "status",
    "deadline",
    "completionPercentage",
    "createdAt",
    "updatedAt",
    "attachments",
];

pub async fn get_all_projects(store: &impl RecordStore) -> Result<Vec<Project>, ServiceError> {
    let params = FetchParams::with_fields(&PROJECT_FIELDS);
    let records = store.fetch_records(Collection::Project, &params).await?;
    decode_all(ENTITY, records)
}

pub async fn get_project(store: &impl RecordStore, id: RecordId) -> Result<Project, ServiceError> {
    let record = store
        .get_record_by_id(Collection::Project, id, &field_names(&PROJECT_FIELDS))
        .await
        .map_err(|e| ServiceError::from_store(ENTITY, e))?;
    decode(ENTITY, record)
}

/// Projects whose deadline falls within `start..=end`
pub async fn get_projects_by_date_range(
    store: &impl RecordStore,
    start: Date,
    end: Date,
) -> Result<Vec<Project>, ServiceError> {
    let params = FetchParams::with_fields(&PROJECT_FIELDS)
        .filter(Condition::new(
            "deadline",
            Operator::GreaterThanOrEqualTo,
            start.to_string(),
        ))
        .filter(Condition::new(
            "deadline",
            Operator::LessThanOrEqualTo,
            end.to_string(),
        ));
    let records = store.fetch_records(Collection::Project, &params).await?;
    decode_all(ENTITY, records)
}

pub async fn create_project(
    store: &impl RecordStore,
    draft: ProjectDraft,
) -> Result<Project, ServiceError> {
    draft.validate()?;

    let now = Timestamp::now();
    let record = encode(
        ENTITY,
        &json!({
            "title": draft.title.trim(),
            "description": draft.description.trim(),
            "status": draft.status,
            "deadline": draft.deadline,
            "completionPercentage": 0,
            "attachments": draft.attachments,
            "createdAt": now,
            "updatedAt": now,
        }),
    )?;

    let created = store.create_record(Collection::Project, vec![record]).await?;
    let project: Project = decode_echo(ENTITY, created)?;
    info!(id = project.id, title = %project.title, "project created");
    Ok(project)
}

pub async fn update_project(
    store: &impl RecordStore,
    id: RecordId,
    draft: ProjectDraft,
) -> Result<Project, ServiceError> {
    draft.validate()?;

    let record = patch(
        id,
        json!({
            "title": draft.title.trim(),
            "description": draft.description.trim(),
            "status": draft.status,
            "deadline": draft.deadline,
            "attachments": draft.attachments,
            "updatedAt": Timestamp::now(),
        }),
    );
    let updated = store
        .update_record(Collection::Project, vec![record])
        .await
        .map_err(|e| ServiceError::from_store(ENTITY, e))?;
    decode_echo(ENTITY, updated)
}

/// Persists a new completion percentage, clamped to 100
pub async fn update_project_progress(
    store: &impl RecordStore,
    id: RecordId,
    percentage: u8,
) -> Result<Project, ServiceError> {
    let record = patch(
        id,
        json!({
            "completionPercentage": percentage.min(100),
            "updatedAt": Timestamp::now(),
        }),
    );
    let updated = store
        .update_record(Collection::Project, vec![record])
        .await
        .map_err(|e| ServiceError::from_store(ENTITY, e))?;
    decode_echo(ENTITY, updated)
}

/// Deletes the project only. Its tasks keep their `projectId`.
pub async fn delete_project(store: &impl RecordStore, id: RecordId) -> Result<(), ServiceError> {
    let deleted = store.delete_record(Collection::Project, &[id]).await?;
    if !deleted {
        return Err(ServiceError::NotFound { entity: ENTITY, id });
    }
    info!(id, "project deleted");
    Ok(())
}

/// Recomputes completion from `tasks` and persists it when it changed.
///
/// Returns the updated project, or `None` when nothing had to be written
/// (no tasks, or the stored value is already current).
pub async fn sync_completion(
    store: &impl RecordStore,
    project: &Project,
    tasks: &[Task],
) -> Result<Option<Project>, ServiceError> {
    let Some(completion) = project.completion_from_tasks(tasks) else {
        return Ok(None);
    };
    if completion == project.completion_percentage {
        return Ok(None);
    }

    match update_project_progress(store, project.id, completion).await {
        Ok(updated) => {
            info!(id = project.id, completion, "project completion updated");
            Ok(Some(updated))
        }
        Err(e) => {
            warn!(id = project.id, error = %e, "failed to update project completion");
            Err(e)
        }
    }
}
