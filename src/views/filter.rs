use std::cmp::Ordering;

use jiff::civil::{Date, date};

use crate::models::{
    project::{Project, ProjectStatus},
    task::{Priority, Task, TaskStatus},
};

/// Task list filters. Every set criterion must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub query: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub overdue_only: bool,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task, today: Date) -> bool {
        let query = self.query.as_deref().map(str::trim).unwrap_or_default();
        (query.is_empty() || task.matches_text(&query.to_lowercase()))
            && self.status.is_none_or(|status| task.status == status)
            && self.priority.is_none_or(|priority| task.priority == priority)
            && (!self.overdue_only || task.is_overdue(today))
    }

    /// Matching tasks, in their original order
    pub fn apply<'a>(&self, tasks: &'a [Task], today: Date) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t, today)).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    pub query: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        let query = self
            .query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .unwrap_or_default();
        (query.is_empty()
            || project.title.to_lowercase().contains(&query)
            || project.description.to_lowercase().contains(&query))
            && self.status.is_none_or(|status| project.status == status)
    }

    pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        projects.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Non-empty status groups in board order
pub fn group_by_status<'a>(tasks: &[&'a Task]) -> Vec<(TaskStatus, Vec<&'a Task>)> {
    TaskStatus::ALL
        .into_iter()
        .map(|status| {
            let group: Vec<&Task> = tasks.iter().copied().filter(|t| t.status == status).collect();
            (status, group)
        })
        .filter(|(_, group)| !group.is_empty())
        .collect()
}

/// Task count per status, in board order, zero counts included
pub fn count_by_status(tasks: &[Task]) -> [(TaskStatus, usize); 4] {
    TaskStatus::ALL.map(|status| (status, tasks.iter().filter(|t| t.status == status).count()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortField {
    Title,
    Status,
    Priority,
    #[default]
    DueDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Tasks without a due date sort as if due on the last representable day
const NO_DUE_DATE: Date = date(9999, 12, 31);

fn compare(a: &Task, b: &Task, field: SortField) -> Ordering {
    match field {
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::Status => a.status.rank().cmp(&b.status.rank()),
        SortField::Priority => a.priority.cmp(&b.priority),
        SortField::DueDate => a
            .due_date
            .unwrap_or(NO_DUE_DATE)
            .cmp(&b.due_date.unwrap_or(NO_DUE_DATE)),
    }
}

/// Stable sort; equal tasks keep their relative order in both directions
pub fn sort_tasks(tasks: &mut [&Task], field: SortField, order: SortOrder) {
    tasks.sort_by(|a, b| {
        let ordering = compare(a, b, field);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{project::sample_project, task::sample_task};

    fn task(id: i64, status: TaskStatus, title: &str) -> Task {
        Task {
            title: title.to_string(),
            ..sample_task(id, status)
        }
    }

    fn ids(tasks: &[&Task]) -> Vec<i64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_query_is_case_insensitive_and_checks_tags() {
        let mut tagged = task(1, TaskStatus::ToDo, "Write docs");
        tagged.tags = vec!["Backend".to_string()];
        let tasks = vec![tagged, task(2, TaskStatus::ToDo, "Backend cleanup"), task(3, TaskStatus::Done, "Ship")];

        let filter = TaskFilter {
            query: Some("  BACKEND ".to_string()),
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter.apply(&tasks, date(2024, 3, 1))), vec![1, 2]);
    }

    #[test]
    fn test_criteria_combine_and_preserve_order() {
        let mut tasks = vec![
            task(1, TaskStatus::ToDo, "a"),
            task(2, TaskStatus::Review, "b"),
            task(3, TaskStatus::ToDo, "c"),
        ];
        tasks[0].priority = Priority::High;
        tasks[2].priority = Priority::High;

        let filter = TaskFilter {
            status: Some(TaskStatus::ToDo),
            priority: Some(Priority::High),
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter.apply(&tasks, date(2024, 3, 1))), vec![1, 3]);
        assert_eq!(TaskFilter::default().apply(&tasks, date(2024, 3, 1)).len(), 3);
    }

    #[test]
    fn test_status_filter_partitions_collection() {
        let tasks: Vec<Task> = (1..=12)
            .map(|id| task(id, TaskStatus::ALL[(id as usize * 7) % 4], "t"))
            .collect();
        let today = date(2024, 3, 1);

        for status in TaskStatus::ALL {
            let filter = TaskFilter {
                status: Some(status),
                ..TaskFilter::default()
            };
            let matched = filter.apply(&tasks, today);
            assert!(matched.iter().all(|t| t.status == status));
            assert!(matched.windows(2).all(|w| w[0].id < w[1].id));

            let rest = tasks.iter().filter(|t| !filter.matches(t, today)).count();
            assert_eq!(matched.len() + rest, tasks.len());
        }
    }

    #[test]
    fn test_overdue_excludes_done_and_today() {
        let today = date(2024, 3, 10);
        let mut tasks = vec![
            task(1, TaskStatus::ToDo, "late"),
            task(2, TaskStatus::Done, "late but done"),
            task(3, TaskStatus::Review, "due today"),
            task(4, TaskStatus::ToDo, "no date"),
        ];
        tasks[0].due_date = Some(date(2024, 3, 9));
        tasks[1].due_date = Some(date(2024, 3, 1));
        tasks[2].due_date = Some(today);

        let filter = TaskFilter {
            overdue_only: true,
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter.apply(&tasks, today)), vec![1]);
    }

    #[test]
    fn test_grouping_skips_empty_statuses() {
        let tasks = vec![
            task(1, TaskStatus::Done, "a"),
            task(2, TaskStatus::ToDo, "b"),
            task(3, TaskStatus::Done, "c"),
        ];
        let refs: Vec<&Task> = tasks.iter().collect();
        let groups = group_by_status(&refs);

        let shape: Vec<_> = groups.iter().map(|(s, g)| (*s, ids(g))).collect();
        assert_eq!(
            shape,
            vec![(TaskStatus::ToDo, vec![2]), (TaskStatus::Done, vec![1, 3])]
        );
        assert_eq!(
            count_by_status(&tasks),
            [
                (TaskStatus::ToDo, 1),
                (TaskStatus::InProgress, 0),
                (TaskStatus::Review, 0),
                (TaskStatus::Done, 2)
            ]
        );
    }

    #[test]
    fn test_sort_by_due_date_puts_undated_last() {
        let mut tasks = vec![
            task(1, TaskStatus::ToDo, "undated"),
            task(2, TaskStatus::ToDo, "later"),
            task(3, TaskStatus::ToDo, "sooner"),
        ];
        tasks[1].due_date = Some(date(2024, 5, 1));
        tasks[2].due_date = Some(date(2024, 4, 1));

        let mut refs: Vec<&Task> = tasks.iter().collect();
        sort_tasks(&mut refs, SortField::DueDate, SortOrder::Asc);
        assert_eq!(ids(&refs), vec![3, 2, 1]);

        sort_tasks(&mut refs, SortField::DueDate, SortOrder::Desc);
        assert_eq!(ids(&refs), vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let tasks = vec![
            task(1, TaskStatus::Review, "b"),
            task(2, TaskStatus::ToDo, "B"),
            task(3, TaskStatus::Review, "a"),
        ];
        let mut refs: Vec<&Task> = tasks.iter().collect();

        sort_tasks(&mut refs, SortField::Status, SortOrder::Asc);
        assert_eq!(ids(&refs), vec![2, 1, 3]);

        sort_tasks(&mut refs, SortField::Title, SortOrder::Asc);
        assert_eq!(ids(&refs), vec![3, 2, 1]);
    }

    #[test]
    fn test_project_filter() {
        let mut planning = sample_project(2);
        planning.status = ProjectStatus::Planning;
        planning.description = "Native apps".to_string();
        let projects = vec![sample_project(1), planning];

        let by_text = ProjectFilter {
            query: Some("native".to_string()),
            ..ProjectFilter::default()
        };
        let found: Vec<_> = by_text.apply(&projects).iter().map(|p| p.id).collect();
        assert_eq!(found, vec![2]);

        let by_status = ProjectFilter {
            status: Some(ProjectStatus::Active),
            ..ProjectFilter::default()
        };
        let found: Vec<_> = by_status.apply(&projects).iter().map(|p| p.id).collect();
        assert_eq!(found, vec![1]);
    }
}
