use jiff::{Timestamp, civil::Date};
use serde_json::json;
use tracing::{debug, info};

use crate::{
    models::{
        RecordId, normalize_tags,
        task::{Task, TaskDraft, TaskStatus},
    },
    records::{Collection, Condition, FetchParams, Operator, RecordStore},
    services::{ServiceError, decode, decode_all, decode_echo, encode, field_names, patch},
};

const ENTITY: &str = "Task";

pub const TASK_FIELDS: [&str; 10] = [
    "title",
    "description",
    "status",
    "priority",
    "dueDate",
    "projectId",
    "assigneeId",
    "tags",
    "createdAt",
    "updatedAt",
];

async fn fetch_tasks(
    store: &impl RecordStore,
    params: FetchParams,
) -> Result<Vec<Task>, ServiceError> {
    let records = store.fetch_records(Collection::Task, &params).await?;
    decode_all(ENTITY, records)
}

fn task_params() -> FetchParams {
    FetchParams::with_fields(&TASK_FIELDS)
}

pub async fn get_all_tasks(store: &impl RecordStore) -> Result<Vec<Task>, ServiceError> {
    fetch_tasks(store, task_params()).await
}

pub async fn get_task(store: &impl RecordStore, id: RecordId) -> Result<Task, ServiceError> {
    let record = store
        .get_record_by_id(Collection::Task, id, &field_names(&TASK_FIELDS))
        .await
        .map_err(|e| ServiceError::from_store(ENTITY, e))?;
    decode(ENTITY, record)
}

pub async fn get_tasks_by_project(
    store: &impl RecordStore,
    project_id: RecordId,
) -> Result<Vec<Task>, ServiceError> {
    let params =
        task_params().filter(Condition::new("projectId", Operator::EqualTo, project_id));
    fetch_tasks(store, params).await
}

pub async fn get_tasks_by_assignee(
    store: &impl RecordStore,
    assignee_id: RecordId,
) -> Result<Vec<Task>, ServiceError> {
    let params =
        task_params().filter(Condition::new("assigneeId", Operator::EqualTo, assignee_id));
    fetch_tasks(store, params).await
}

/// Tasks whose title, description or tags contain `query`
pub async fn search_tasks(
    store: &impl RecordStore,
    query: &str,
) -> Result<Vec<Task>, ServiceError> {
    let params = task_params()
        .any(Condition::new("title", Operator::Contains, query))
        .any(Condition::new("description", Operator::Contains, query))
        .any(Condition::new("tags", Operator::Contains, query));
    fetch_tasks(store, params).await
}

/// Tasks due within `start..=end`
pub async fn get_tasks_by_date_range(
    store: &impl RecordStore,
    start: Date,
    end: Date,
) -> Result<Vec<Task>, ServiceError> {
    let params = task_params()
        .filter(Condition::new(
            "dueDate",
            Operator::GreaterThanOrEqualTo,
            start.to_string(),
        ))
        .filter(Condition::new(
            "dueDate",
            Operator::LessThanOrEqualTo,
            end.to_string(),
        ));
    fetch_tasks(store, params).await
}

/// Fails with `NotFound` when the draft points at a project that is gone
async fn ensure_project_exists(
    store: &impl RecordStore,
    draft: &TaskDraft,
) -> Result<(), ServiceError> {
    if let Some(project_id) = draft.project_id {
        store
            .get_record_by_id(Collection::Project, project_id, &[])
            .await
            .map_err(|e| ServiceError::from_store("Project", e))?;
    }
    Ok(())
}

/// Creates a task after validating the draft and checking that its project
/// exists.
pub async fn create_task(store: &impl RecordStore, draft: TaskDraft) -> Result<Task, ServiceError> {
    draft.validate()?;
    ensure_project_exists(store, &draft).await?;

    let now = Timestamp::now();
    let record = encode(
        ENTITY,
        &json!({
            "title": draft.title.trim(),
            "description": draft.description.trim(),
            "status": draft.status,
            "priority": draft.priority,
            "dueDate": draft.due_date,
            "projectId": draft.project_id,
            "assigneeId": draft.assignee_id,
            "tags": normalize_tags(draft.tags),
            "createdAt": now,
            "updatedAt": now,
        }),
    )?;

    let created = store.create_record(Collection::Task, vec![record]).await?;
    let task: Task = decode_echo(ENTITY, created)?;
    info!(id = task.id, title = %task.title, "task created");
    Ok(task)
}

pub async fn update_task(
    store: &impl RecordStore,
    id: RecordId,
    draft: TaskDraft,
) -> Result<Task, ServiceError> {
    draft.validate()?;
    ensure_project_exists(store, &draft).await?;

    let record = patch(
        id,
        json!({
            "title": draft.title.trim(),
            "description": draft.description.trim(),
            "status": draft.status,
            "priority": draft.priority,
            "dueDate": draft.due_date,
            "projectId": draft.project_id,
            "assigneeId": draft.assignee_id,
            "tags": normalize_tags(draft.tags),
            "updatedAt": Timestamp::now(),
        }),
    );
    update(store, record).await
}

pub async fn update_task_status(
    store: &impl RecordStore,
    id: RecordId,
    status: TaskStatus,
) -> Result<Task, ServiceError> {
    debug!(id, %status, "updating task status");
    let record = patch(
        id,
        json!({
            "status": status,
            "updatedAt": Timestamp::now(),
        }),
    );
    update(store, record).await
}

pub async fn update_task_due_date(
    store: &impl RecordStore,
    id: RecordId,
    due_date: Option<Date>,
) -> Result<Task, ServiceError> {
    let record = patch(
        id,
        json!({
            "dueDate": due_date,
            "updatedAt": Timestamp::now(),
        }),
    );
    update(store, record).await
}

async fn update(
    store: &impl RecordStore,
    record: crate::records::Record,
) -> Result<Task, ServiceError> {
    let updated = store
        .update_record(Collection::Task, vec![record])
        .await
        .map_err(|e| ServiceError::from_store(ENTITY, e))?;
    decode_echo(ENTITY, updated)
}

pub async fn delete_task(store: &impl RecordStore, id: RecordId) -> Result<(), ServiceError> {
    let deleted = store.delete_record(Collection::Task, &[id]).await?;
    if !deleted {
        return Err(ServiceError::NotFound { entity: ENTITY, id });
    }
    info!(id, "task deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::task::Priority,
        records::{fixtures, memory::{Latency, MemoryRecordStore}},
    };
    use jiff::civil::date;

    fn seeded() -> MemoryRecordStore {
        MemoryRecordStore::from_snapshot(fixtures::seed(), Latency::none())
    }

    fn draft(title: &str, project_id: RecordId) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            project_id: Some(project_id),
            ..TaskDraft::default()
        }
    }

    #[tokio::test]
    async fn test_create_task_normalizes_fields() {
        let store = seeded();
        let mut input = draft("  Write copy ", 5);
        input.tags = vec!["content".to_string(), " content ".to_string(), "".to_string()];
        input.priority = Priority::High;

        let task = create_task(&store, input).await.unwrap();
        assert_eq!(task.title, "Write copy");
        assert_eq!(task.tags, vec!["content".to_string()]);
        assert_eq!(task.status, TaskStatus::ToDo);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[tokio::test]
    async fn test_create_task_requires_existing_project() {
        let store = seeded();
        let error = create_task(&store, draft("Lost", 404)).await.unwrap_err();
        assert!(matches!(
            error,
            ServiceError::NotFound { entity: "Project", id: 404 }
        ));
    }

    #[tokio::test]
    async fn test_update_task_replaces_editable_fields() {
        let store = seeded();
        let before = get_task(&store, 11).await.unwrap();

        let mut edit = TaskDraft::from(&before);
        edit.title = "  Polish onboarding  ".to_string();
        edit.priority = Priority::Critical;
        edit.project_id = Some(5);
        edit.tags = vec!["ux".to_string(), "ux".to_string()];

        let updated = update_task(&store, 11, edit).await.unwrap();
        assert_eq!(updated.title, "Polish onboarding");
        assert_eq!(updated.priority, Priority::Critical);
        assert_eq!(updated.project_id, Some(5));
        assert_eq!(updated.tags, vec!["ux".to_string()]);
        assert_eq!(updated.created_at, before.created_at);
        assert!(updated.updated_at > before.updated_at);
        assert_eq!(get_task(&store, 11).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_task_rejects_missing_project() {
        let store = seeded();
        let before = get_task(&store, 11).await.unwrap();
        let edit = TaskDraft {
            project_id: Some(404),
            ..TaskDraft::from(&before)
        };

        let error = update_task(&store, 11, edit).await.unwrap_err();
        assert!(matches!(
            error,
            ServiceError::NotFound { entity: "Project", id: 404 }
        ));
        assert_eq!(get_task(&store, 11).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_task_validates_before_writing() {
        let store = seeded();
        let before = get_task(&store, 11).await.unwrap();
        let edit = TaskDraft {
            title: "   ".to_string(),
            ..TaskDraft::from(&before)
        };

        let error = update_task(&store, 11, edit).await.unwrap_err();
        assert!(matches!(error, ServiceError::Validation(_)));
        assert_eq!(get_task(&store, 11).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_filters_by_project_and_assignee() {
        let store = seeded();
        let by_project = get_tasks_by_project(&store, 7).await.unwrap();
        assert_eq!(
            by_project.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![14, 15]
        );

        let by_assignee = get_tasks_by_assignee(&store, 1).await.unwrap();
        assert_eq!(
            by_assignee.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![8, 11, 13]
        );
    }

    #[tokio::test]
    async fn test_search_looks_at_title_description_and_tags() {
        let store = seeded();
        let ids: Vec<_> = search_tasks(&store, "API")
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![13]);

        let ids: Vec<_> = search_tasks(&store, "staging")
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![15]);
    }

    #[tokio::test]
    async fn test_date_range_is_inclusive() {
        let store = seeded();
        let tasks = get_tasks_by_date_range(&store, date(2026, 10, 2), date(2026, 10, 9))
            .await
            .unwrap();
        let ids: Vec<_> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![8, 13, 15]);
    }

    #[tokio::test]
    async fn test_status_and_due_date_setters_touch_updated_at() {
        let store = seeded();
        let before = get_task(&store, 11).await.unwrap();

        let moved = update_task_status(&store, 11, TaskStatus::Review)
            .await
            .unwrap();
        assert_eq!(moved.status, TaskStatus::Review);
        assert!(moved.updated_at > before.updated_at);
        assert_eq!(moved.title, before.title);

        let rescheduled = update_task_due_date(&store, 11, Some(date(2026, 12, 1)))
            .await
            .unwrap();
        assert_eq!(rescheduled.due_date, Some(date(2026, 12, 1)));
    }

    #[tokio::test]
    async fn test_update_unknown_task_is_not_found() {
        let store = seeded();
        let error = update_task_status(&store, 999, TaskStatus::Done)
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "Task not found");

        let error = delete_task(&store, 999).await.unwrap_err();
        assert!(matches!(error, ServiceError::NotFound { id: 999, .. }));
    }
}
