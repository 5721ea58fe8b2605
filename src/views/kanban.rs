use tracing::debug;

use crate::{
    models::{
        RecordId,
        project::Project,
        task::{Task, TaskStatus},
    },
    records::RecordStore,
    services::{ServiceError, projects::get_project, tasks::get_tasks_by_project},
    views::transition::change_task_status,
};

/// One status column of the board
#[derive(Debug)]
pub struct Column<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<&'a Task>,
    /// Highlighted while a dragged card hovers over it
    pub is_drop_target: bool,
    /// Only the To Do column offers to create a task
    pub accepts_new_task: bool,
}

impl Column<'_> {
    /// An empty column renders a placeholder instead of cards
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    NothingDragged,
    /// The card was dropped on the column it already sits in
    Unchanged,
    Moved(Task),
}

#[derive(Debug, Default)]
pub struct KanbanBoard {
    pub project: Option<Project>,
    pub tasks: Vec<Task>,
    dragged: Option<RecordId>,
    drop_target: Option<TaskStatus>,
}

impl KanbanBoard {
    pub fn new(project: Option<Project>, tasks: Vec<Task>) -> Self {
        Self {
            project,
            tasks,
            dragged: None,
            drop_target: None,
        }
    }

    /// Loads a project and its tasks concurrently
    pub async fn load(store: &impl RecordStore, project_id: RecordId) -> Result<Self, ServiceError> {
        let (project, tasks) = tokio::try_join!(
            get_project(store, project_id),
            get_tasks_by_project(store, project_id),
        )?;
        debug!(project_id, tasks = tasks.len(), "board loaded");
        Ok(Self::new(Some(project), tasks))
    }

    pub fn columns(&self) -> Vec<Column<'_>> {
        TaskStatus::ALL
            .into_iter()
            .map(|status| Column {
                status,
                tasks: self.tasks.iter().filter(|t| t.status == status).collect(),
                is_drop_target: self.drop_target == Some(status),
                accepts_new_task: status == TaskStatus::ToDo,
            })
            .collect()
    }

    pub fn drag_start(&mut self, task_id: RecordId) -> bool {
        if self.tasks.iter().any(|t| t.id == task_id) {
            self.dragged = Some(task_id);
            true
        } else {
            false
        }
    }

    pub fn drag_over(&mut self, status: TaskStatus) {
        self.drop_target = Some(status);
    }

    pub fn drag_leave(&mut self) {
        self.drop_target = None;
    }

    /// Drops the dragged card on the `status` column.
    ///
    /// Dropping on the card's own column makes no store call at all.
    pub async fn drop_on(
        &mut self,
        store: &impl RecordStore,
        status: TaskStatus,
    ) -> Result<DropOutcome, ServiceError> {
        self.drag_leave();
        let Some(task_id) = self.dragged.take() else {
            return Ok(DropOutcome::NothingDragged);
        };
        let Some(current) = self.tasks.iter().find(|t| t.id == task_id) else {
            return Ok(DropOutcome::NothingDragged);
        };
        if current.status == status {
            return Ok(DropOutcome::Unchanged);
        }

        let saved =
            change_task_status(store, &mut self.tasks, self.project.as_mut(), task_id, status)
                .await?;
        Ok(DropOutcome::Moved(saved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::task::sample_task,
        records::{
            fixtures,
            memory::{Latency, MemoryRecordStore, Operation},
        },
        services::tasks::get_task,
    };

    fn seeded() -> MemoryRecordStore {
        MemoryRecordStore::from_snapshot(fixtures::seed(), Latency::none())
    }

    #[test]
    fn test_columns_partition_tasks_in_display_order() {
        let board = KanbanBoard::new(
            None,
            vec![
                sample_task(1, TaskStatus::Done),
                sample_task(2, TaskStatus::ToDo),
                sample_task(3, TaskStatus::Done),
            ],
        );
        let columns = board.columns();

        let statuses: Vec<_> = columns.iter().map(|c| c.status).collect();
        assert_eq!(statuses, TaskStatus::ALL.to_vec());
        assert_eq!(columns[0].tasks.len(), 1);
        assert!(columns[1].is_empty());
        assert!(columns[2].is_empty());
        let done: Vec<_> = columns[3].tasks.iter().map(|t| t.id).collect();
        assert_eq!(done, vec![1, 3]);

        let creators: Vec<_> = columns.iter().map(|c| c.accepts_new_task).collect();
        assert_eq!(creators, vec![true, false, false, false]);
    }

    #[test]
    fn test_drag_over_and_leave_only_touch_highlight() {
        let mut board = KanbanBoard::new(None, vec![sample_task(1, TaskStatus::ToDo)]);
        assert!(board.drag_start(1));
        board.drag_over(TaskStatus::Review);

        let highlighted: Vec<_> = board
            .columns()
            .iter()
            .filter(|c| c.is_drop_target)
            .map(|c| c.status)
            .collect();
        assert_eq!(highlighted, vec![TaskStatus::Review]);

        board.drag_leave();
        assert!(board.columns().iter().all(|c| !c.is_drop_target));
        assert_eq!(board.tasks[0].status, TaskStatus::ToDo);
        assert_eq!(board.dragged, Some(1));
    }

    #[test]
    fn test_drag_start_ignores_unknown_cards() {
        let mut board = KanbanBoard::new(None, vec![sample_task(1, TaskStatus::ToDo)]);
        assert!(!board.drag_start(99));
        assert_eq!(board.dragged, None);
    }

    #[tokio::test]
    async fn test_drop_on_same_column_makes_no_store_call() {
        let store = seeded();
        let mut board = KanbanBoard::load(&store, 5).await.unwrap();

        // Any update reaching the store would consume this failure
        store.fail_next(Operation::Update, "should not be called").await;

        assert!(board.drag_start(9));
        let outcome = board.drop_on(&store, TaskStatus::Review).await.unwrap();
        assert_eq!(outcome, DropOutcome::Unchanged);
        assert_eq!(board.dragged, None);

        // The scripted failure is still pending
        assert!(board.drag_start(9));
        let result = board.drop_on(&store, TaskStatus::Done).await;
        assert!(matches!(result, Err(ServiceError::Remote(_))));
        assert_eq!(get_task(&store, 9).await.unwrap().status, TaskStatus::Review);
    }

    #[tokio::test]
    async fn test_drop_moves_card_and_updates_completion() {
        let store = seeded();
        let mut board = KanbanBoard::load(&store, 5).await.unwrap();

        board.drag_start(11);
        board.drag_over(TaskStatus::Done);
        let outcome = board.drop_on(&store, TaskStatus::Done).await.unwrap();

        let DropOutcome::Moved(task) = outcome else {
            panic!("expected a move, got {outcome:?}");
        };
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(board.drop_target, None);
        assert_eq!(board.columns()[3].tasks.len(), 2);
        assert_eq!(
            board.project.as_ref().map(|p| p.completion_percentage),
            Some(50)
        );
    }

    #[tokio::test]
    async fn test_drop_without_drag_is_ignored() {
        let store = seeded();
        let mut board = KanbanBoard::load(&store, 6).await.unwrap();
        let outcome = board.drop_on(&store, TaskStatus::Done).await.unwrap();
        assert_eq!(outcome, DropOutcome::NothingDragged);
    }

    #[tokio::test]
    async fn test_load_unknown_project_fails() {
        let store = seeded();
        let result = KanbanBoard::load(&store, 404).await;
        assert!(matches!(result, Err(ServiceError::NotFound { .. })));
    }
}
