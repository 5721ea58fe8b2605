use jiff::civil::Date;

use crate::{
    models::{
        RecordId,
        calendar::CalendarEvent,
        task::{Task, TaskDraft, TaskStatus},
    },
    records::RecordStore,
    services::{
        ServiceError,
        projects::get_projects_by_date_range,
        tasks::{create_task, get_tasks_by_date_range, update_task_due_date},
    },
};

/// Events for every task due and every project deadline in `start..=end`,
/// sorted by date. Tasks come before projects on the same day, and each
/// keeps its fetch order.
pub async fn get_calendar_events(
    store: &impl RecordStore,
    start: Date,
    end: Date,
) -> Result<Vec<CalendarEvent>, ServiceError> {
    let (tasks, projects) = tokio::try_join!(
        get_tasks_by_date_range(store, start, end),
        get_projects_by_date_range(store, start, end),
    )?;

    let mut events: Vec<CalendarEvent> = tasks
        .iter()
        .filter_map(CalendarEvent::from_task)
        .chain(projects.iter().filter_map(CalendarEvent::from_project))
        .collect();
    events.sort_by_key(|event| event.date);
    Ok(events)
}

/// Creates a To Do task due on `date`
pub async fn create_task_on_date(
    store: &impl RecordStore,
    date: Date,
    draft: TaskDraft,
) -> Result<Task, ServiceError> {
    let draft = TaskDraft {
        due_date: Some(date),
        status: TaskStatus::ToDo,
        ..draft
    };
    create_task(store, draft).await
}

pub async fn move_task_to_date(
    store: &impl RecordStore,
    task_id: RecordId,
    date: Date,
) -> Result<Task, ServiceError> {
    update_task_due_date(store, task_id, Some(date)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::calendar::EventKind,
        records::{
            fixtures,
            memory::{Latency, MemoryRecordStore},
        },
    };
    use jiff::civil::date;

    #[tokio::test]
    async fn test_events_merge_tasks_and_projects_by_date() {
        let store = MemoryRecordStore::from_snapshot(fixtures::seed(), Latency::none());
        let events = get_calendar_events(&store, date(2026, 10, 1), date(2026, 10, 31))
            .await
            .unwrap();

        let keys: Vec<_> = events.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "task-8",
                "task-15",
                "project-7",
                "task-13",
                "task-9",
                "task-10",
                "task-12",
            ]
        );
        assert_eq!(events[2].kind(), EventKind::Project);
        assert!(events.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[tokio::test]
    async fn test_task_created_from_calendar_is_due_that_day() {
        let store = MemoryRecordStore::from_snapshot(fixtures::seed(), Latency::none());
        let task = create_task_on_date(
            &store,
            date(2026, 11, 2),
            TaskDraft {
                title: "Kickoff".to_string(),
                project_id: Some(6),
                status: TaskStatus::Review,
                ..TaskDraft::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(task.due_date, Some(date(2026, 11, 2)));
        assert_eq!(task.status, TaskStatus::ToDo);
    }
}
