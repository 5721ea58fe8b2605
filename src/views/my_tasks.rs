use jiff::civil::Date;
use tracing::debug;

use crate::{
    models::{
        RecordId,
        project::Project,
        task::{Task, TaskStatus},
        user::User,
    },
    records::RecordStore,
    services::{
        ServiceError, projects::get_all_projects, tasks::get_tasks_by_assignee,
        users::get_all_users,
    },
    session::Session,
    views::{
        filter::{SortField, SortOrder, TaskFilter, group_by_status, sort_tasks},
        state::{LoadGuard, LoadTicket, ViewState},
    },
};

/// Everything the "my tasks" list shows
#[derive(Debug, Clone, PartialEq)]
pub struct MyTasks {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub users: Vec<User>,
}

impl MyTasks {
    pub fn project_title(&self, project_id: Option<RecordId>) -> Option<&str> {
        let id = project_id?;
        self.projects
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.title.as_str())
    }

    pub fn user_name(&self, user_id: Option<RecordId>) -> Option<&str> {
        let id = user_id?;
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.name.as_str())
    }

    /// Filtered and sorted tasks
    pub fn visible(&self, filter: &TaskFilter, sort: (SortField, SortOrder), today: Date) -> Vec<&Task> {
        let mut tasks = filter.apply(&self.tasks, today);
        sort_tasks(&mut tasks, sort.0, sort.1);
        tasks
    }
}

/// Tasks assigned to the session user, with the lookups to label them
pub async fn fetch_my_tasks(
    store: &impl RecordStore,
    session: &Session,
) -> Result<MyTasks, ServiceError> {
    let (tasks, projects, users) = tokio::try_join!(
        get_tasks_by_assignee(store, session.user_id),
        get_all_projects(store),
        get_all_users(store),
    )?;
    Ok(MyTasks {
        tasks,
        projects,
        users,
    })
}

#[derive(Debug)]
pub struct MyTasksView {
    pub state: ViewState<MyTasks>,
    pub filter: TaskFilter,
    pub sort: (SortField, SortOrder),
    guard: LoadGuard,
}

impl Default for MyTasksView {
    fn default() -> Self {
        Self::new()
    }
}

impl MyTasksView {
    pub fn new() -> Self {
        Self {
            state: ViewState::Loading,
            filter: TaskFilter::default(),
            sort: (SortField::default(), SortOrder::default()),
            guard: LoadGuard::new(),
        }
    }

    /// Marks the view as loading and hands out the ticket its result must carry
    pub fn begin(&mut self) -> LoadTicket {
        self.state = ViewState::Loading;
        self.guard.begin()
    }

    /// Applies a load result unless a newer load has started since.
    /// Returns whether the result was applied.
    pub fn apply(&mut self, ticket: LoadTicket, result: Result<MyTasks, ServiceError>) -> bool {
        if !self.guard.is_current(ticket) {
            debug!("discarding stale task list");
            return false;
        }
        self.state = ViewState::from_result(result, |data| data.tasks.is_empty());
        true
    }

    pub async fn load(&mut self, store: &impl RecordStore, session: &Session) -> bool {
        let ticket = self.begin();
        let result = fetch_my_tasks(store, session).await;
        self.apply(ticket, result)
    }

    /// Filtered and sorted tasks grouped by status, empty when not loaded
    pub fn groups(&self, today: Date) -> Vec<(TaskStatus, Vec<&Task>)> {
        match self.state.data() {
            Some(data) => group_by_status(&data.visible(&self.filter, self.sort, today)),
            None => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{
        fixtures,
        memory::{Latency, MemoryRecordStore, Operation},
    };
    use jiff::civil::date;

    fn seeded() -> MemoryRecordStore {
        MemoryRecordStore::from_snapshot(fixtures::seed(), Latency::none())
    }

    #[tokio::test]
    async fn test_loads_tasks_of_session_user() {
        let store = seeded();
        let mut view = MyTasksView::new();
        assert_eq!(view.state, ViewState::Loading);
        assert!(view.load(&store, &Session::new(1)).await);

        let data = view.state.data().unwrap();
        let ids: Vec<_> = data.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![8, 11, 13]);
        assert_eq!(data.project_title(Some(6)), Some("Mobile App"));
        assert_eq!(data.user_name(Some(3)), Some("Priya Patel"));
        assert_eq!(data.project_title(None), None);

        let groups = view.groups(date(2026, 10, 16));
        let statuses: Vec<_> = groups.iter().map(|(s, _)| *s).collect();
        assert_eq!(
            statuses,
            vec![TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done]
        );
    }

    #[tokio::test]
    async fn test_user_without_tasks_is_empty() {
        let store = seeded();
        let mut view = MyTasksView::new();
        view.load(&store, &Session::new(99)).await;
        assert_eq!(view.state, ViewState::Empty);
    }

    #[tokio::test]
    async fn test_failed_load_offers_retry() {
        let store = seeded();
        let mut view = MyTasksView::new();
        store.fail_next(Operation::Fetch, "offline").await;
        view.load(&store, &Session::new(1)).await;
        assert!(matches!(view.state, ViewState::Failed { .. }));

        view.load(&store, &Session::new(1)).await;
        assert!(view.state.data().is_some());
    }

    #[tokio::test]
    async fn test_stale_result_is_discarded() {
        let store = seeded();
        let mut view = MyTasksView::new();

        let first = view.begin();
        let second = view.begin();
        let newer = fetch_my_tasks(&store, &Session::new(2)).await;
        let older = fetch_my_tasks(&store, &Session::new(1)).await;

        assert!(view.apply(second, newer));
        assert!(!view.apply(first, older));
        let ids: Vec<_> = view.state.data().unwrap().tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![10, 14]);
    }
}
