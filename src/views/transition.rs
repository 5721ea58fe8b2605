use jiff::Timestamp;
use tracing::warn;

use crate::{
    models::{
        RecordId,
        project::Project,
        task::{Task, TaskStatus},
    },
    records::RecordStore,
    services::{ServiceError, projects::sync_completion, tasks::update_task_status},
};

/// Moves a task to `status`.
///
/// The local copy in `tasks` changes first so the board reflects the move
/// right away. If the store rejects the update the local copy is restored
/// and the error returned; the project is left untouched in that case.
/// On success, a loaded owning `project` gets its completion recomputed
/// from `tasks` and persisted when it changed.
pub async fn change_task_status(
    store: &impl RecordStore,
    tasks: &mut [Task],
    project: Option<&mut Project>,
    task_id: RecordId,
    status: TaskStatus,
) -> Result<Task, ServiceError> {
    let index = tasks
        .iter()
        .position(|t| t.id == task_id)
        .ok_or(ServiceError::NotFound {
            entity: "Task",
            id: task_id,
        })?;

    let previous = tasks[index].clone();
    tasks[index].status = status;
    tasks[index].updated_at = Timestamp::now();

    let saved = match update_task_status(store, task_id, status).await {
        Ok(saved) => saved,
        Err(e) => {
            warn!(task_id, %status, error = %e, "status change failed, rolling back");
            tasks[index] = previous;
            return Err(e);
        }
    };
    tasks[index] = saved.clone();

    if let Some(project) = project {
        if saved.project_id == Some(project.id) {
            // A failed progress write does not undo the status change
            if let Ok(Some(updated)) = sync_completion(store, project, tasks).await {
                *project = updated;
            }
        }
    }

    Ok(saved)
}

/// Quick-cycle affordance: advances To Do → In Progress → Review → Done → To Do
pub async fn cycle_task_status(
    store: &impl RecordStore,
    tasks: &mut [Task],
    project: Option<&mut Project>,
    task_id: RecordId,
) -> Result<Task, ServiceError> {
    let current = tasks
        .iter()
        .find(|t| t.id == task_id)
        .map(|t| t.status)
        .ok_or(ServiceError::NotFound {
            entity: "Task",
            id: task_id,
        })?;
    change_task_status(store, tasks, project, task_id, current.next()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        records::{
            fixtures,
            memory::{Latency, MemoryRecordStore, Operation},
        },
        services::{
            projects::get_project,
            tasks::{get_task, get_tasks_by_project},
        },
    };

    fn seeded() -> MemoryRecordStore {
        MemoryRecordStore::from_snapshot(fixtures::seed(), Latency::none())
    }

    #[tokio::test]
    async fn test_status_change_recomputes_project_completion() {
        let store = seeded();
        let mut project = get_project(&store, 5).await.unwrap();
        let mut tasks = get_tasks_by_project(&store, 5).await.unwrap();
        assert_eq!(project.completion_percentage, 25);

        let saved = change_task_status(&store, &mut tasks, Some(&mut project), 9, TaskStatus::Done)
            .await
            .unwrap();

        assert_eq!(saved.status, TaskStatus::Done);
        assert_eq!(project.completion_percentage, 50);
        assert_eq!(get_project(&store, 5).await.unwrap().completion_percentage, 50);
        assert_eq!(
            tasks.iter().find(|t| t.id == 9).map(|t| t.status),
            Some(TaskStatus::Done)
        );
    }

    #[tokio::test]
    async fn test_failed_update_rolls_back_local_state() {
        let store = seeded();
        let mut project = get_project(&store, 5).await.unwrap();
        let mut tasks = get_tasks_by_project(&store, 5).await.unwrap();
        let before = tasks.clone();

        store.fail_next(Operation::Update, "network error").await;
        let result =
            change_task_status(&store, &mut tasks, Some(&mut project), 10, TaskStatus::Done).await;

        assert!(matches!(result, Err(ServiceError::Remote(_))));
        assert_eq!(tasks, before);
        assert_eq!(project.completion_percentage, 25);
        assert_eq!(
            get_task(&store, 10).await.unwrap().status,
            TaskStatus::InProgress
        );
    }

    #[tokio::test]
    async fn test_four_quick_cycles_restore_status() {
        let store = seeded();
        let mut tasks = get_tasks_by_project(&store, 6).await.unwrap();
        let original = tasks[0].status;

        let mut seen = vec![];
        for _ in 0..4 {
            let saved = cycle_task_status(&store, &mut tasks, None, 12).await.unwrap();
            seen.push(saved.status);
        }

        assert_eq!(
            seen,
            vec![
                TaskStatus::InProgress,
                TaskStatus::Review,
                TaskStatus::Done,
                TaskStatus::ToDo
            ]
        );
        assert_eq!(tasks[0].status, original);
    }

    #[tokio::test]
    async fn test_done_task_cycles_back_to_to_do() {
        let store = seeded();
        let mut project = get_project(&store, 7).await.unwrap();
        let mut tasks = get_tasks_by_project(&store, 7).await.unwrap();

        let saved = cycle_task_status(&store, &mut tasks, Some(&mut project), 14)
            .await
            .unwrap();
        assert_eq!(saved.status, TaskStatus::ToDo);
        assert_eq!(project.completion_percentage, 50);
    }

    #[tokio::test]
    async fn test_unknown_task_is_not_found() {
        let store = seeded();
        let mut tasks = vec![];
        let result = cycle_task_status(&store, &mut tasks, None, 1).await;
        assert!(matches!(result, Err(ServiceError::NotFound { id: 1, .. })));
    }
}
