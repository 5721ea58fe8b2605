use std::fmt;

use crate::{
    models::{
        task::{Task, TaskStatus},
        user::User,
    },
    records::RecordStore,
    services::{ServiceError, tasks::get_all_tasks, users::get_all_users},
};

/// Bars are scaled against at least this many active tasks
const BAR_SCALE_FLOOR: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    Available,
    Light,
    Moderate,
    Heavy,
}

impl Workload {
    pub fn from_active(active: usize) -> Self {
        match active {
            8.. => Workload::Heavy,
            5.. => Workload::Moderate,
            3.. => Workload::Light,
            _ => Workload::Available,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Workload::Available => "Available",
            Workload::Light => "Light",
            Workload::Moderate => "Moderate",
            Workload::Heavy => "Heavy",
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamMember {
    pub user: User,
    /// Assigned tasks not yet done
    pub active: usize,
    pub completed: usize,
    pub total: usize,
    pub workload: Workload,
    /// Width of the workload bar, 0 to 100
    pub bar_percentage: u8,
}

pub fn bar_percentage(active: usize, max_active: usize) -> u8 {
    let scale = max_active.max(BAR_SCALE_FLOOR);
    ((active * 100 / scale).min(100)) as u8
}

/// Workload of every user, in user order
pub fn team_workload(users: &[User], tasks: &[Task]) -> Vec<TeamMember> {
    let counts: Vec<(usize, usize)> = users
        .iter()
        .map(|user| {
            let assigned = tasks.iter().filter(|t| t.assignee_id == Some(user.id));
            assigned.fold((0, 0), |(active, completed), task| {
                if task.status == TaskStatus::Done {
                    (active, completed + 1)
                } else {
                    (active + 1, completed)
                }
            })
        })
        .collect();
    let max_active = counts.iter().map(|(active, _)| *active).max().unwrap_or(0);

    users
        .iter()
        .zip(counts)
        .map(|(user, (active, completed))| TeamMember {
            user: user.clone(),
            active,
            completed,
            total: active + completed,
            workload: Workload::from_active(active),
            bar_percentage: bar_percentage(active, max_active),
        })
        .collect()
}

pub async fn load_team(store: &impl RecordStore) -> Result<Vec<TeamMember>, ServiceError> {
    let (users, tasks) = tokio::try_join!(get_all_users(store), get_all_tasks(store))?;
    Ok(team_workload(&users, &tasks))
}
