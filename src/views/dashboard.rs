use jiff::{SignedDuration, Timestamp, civil::Date};

use crate::{
    models::{
        project::{Project, ProjectStatus, completion_percentage},
        task::{Task, TaskStatus},
    },
    records::RecordStore,
    services::{
        ServiceError, projects::get_all_projects, tasks::get_all_tasks, users::get_all_users,
    },
    session::Session,
};

/// Activity older than this drops off the dashboard
const RECENT_WINDOW: SignedDuration = SignedDuration::from_hours(7 * 24);
const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub active_projects: usize,
    pub completed_projects: usize,
    pub total_tasks: usize,
    /// Share of all tasks that are done, 0 without tasks
    pub completion_rate: u8,
    pub my_tasks: usize,
    pub my_done: usize,
    pub overdue: usize,
    pub user_count: usize,
    /// Tasks updated recently, newest first
    pub recent: Vec<Task>,
}

impl Dashboard {
    pub fn compute(
        projects: &[Project],
        tasks: &[Task],
        user_count: usize,
        session: &Session,
        today: Date,
        now: Timestamp,
    ) -> Self {
        let count_projects =
            |status: ProjectStatus| projects.iter().filter(|p| p.status == status).count();
        let done = tasks.iter().filter(|t| t.status == TaskStatus::Done).count();
        let mine: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.assignee_id == Some(session.user_id))
            .collect();

        let mut recent: Vec<Task> = tasks
            .iter()
            .filter(|t| now.duration_since(t.updated_at) <= RECENT_WINDOW)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        recent.truncate(RECENT_LIMIT);

        Self {
            active_projects: count_projects(ProjectStatus::Active),
            completed_projects: count_projects(ProjectStatus::Completed),
            total_tasks: tasks.len(),
            completion_rate: completion_percentage(done, tasks.len()).unwrap_or(0),
            my_tasks: mine.len(),
            my_done: mine.iter().filter(|t| t.status == TaskStatus::Done).count(),
            overdue: tasks.iter().filter(|t| t.is_overdue(today)).count(),
            user_count,
            recent,
        }
    }

    pub async fn load(
        store: &impl RecordStore,
        session: &Session,
        today: Date,
        now: Timestamp,
    ) -> Result<Self, ServiceError> {
        let (projects, tasks, users) = tokio::try_join!(
            get_all_projects(store),
            get_all_tasks(store),
            get_all_users(store),
        )?;
        Ok(Self::compute(&projects, &tasks, users.len(), session, today, now))
    }
}
