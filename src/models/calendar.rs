use jiff::civil::Date;
use serde::Serialize;

use crate::models::{
    RecordId,
    project::{Project, ProjectStatus},
    task::{Priority, Task},
};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Task,
    Project,
}

/// Back-reference to the record an event was synthesized from
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum EventSource {
    Task(Task),
    Project(Project),
}

/// Calendar entry derived from a task due date or a project deadline.
/// Never persisted.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    /// "task-3" or "project-1"
    pub key: String,
    pub title: String,
    pub date: Date,
    #[serde(rename = "data")]
    pub source: EventSource,
}

impl CalendarEvent {
    pub fn from_task(task: &Task) -> Option<Self> {
        let date = task.due_date?;
        Some(Self {
            key: format!("task-{}", task.id),
            title: task.title.clone(),
            date,
            source: EventSource::Task(task.clone()),
        })
    }

    pub fn from_project(project: &Project) -> Option<Self> {
        let date = project.deadline?;
        Some(Self {
            key: format!("project-{}", project.id),
            title: project.title.clone(),
            date,
            source: EventSource::Project(project.clone()),
        })
    }

    pub fn kind(&self) -> EventKind {
        match self.source {
            EventSource::Task(_) => EventKind::Task,
            EventSource::Project(_) => EventKind::Project,
        }
    }

    pub fn task_id(&self) -> Option<RecordId> {
        match &self.source {
            EventSource::Task(task) => Some(task.id),
            EventSource::Project(_) => None,
        }
    }

    /// Only task events can be dragged to another day
    pub fn is_draggable(&self) -> bool {
        self.kind() == EventKind::Task
    }

    /// Display color class: tasks by priority, projects by status
    pub fn color_class(&self) -> &'static str {
        match &self.source {
            EventSource::Task(task) => match task.priority {
                Priority::High => "bg-error text-white",
                Priority::Medium => "bg-warning text-white",
                Priority::Low => "bg-info text-white",
                Priority::Critical => "bg-gray-500 text-white",
            },
            EventSource::Project(project) => match project.status {
                ProjectStatus::Completed => "bg-success text-white",
                ProjectStatus::Active => "bg-primary text-white",
                ProjectStatus::Planning => "bg-secondary text-white",
                ProjectStatus::OnHold => "bg-gray-500 text-white",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        project::sample_project,
        task::{TaskStatus, sample_task},
    };
    use jiff::civil::date;

    #[test]
    fn test_task_without_due_date_produces_no_event() {
        let task = sample_task(1, TaskStatus::ToDo);
        assert!(CalendarEvent::from_task(&task).is_none());
    }

    #[test]
    fn test_event_kind_and_dragability() {
        let mut task = sample_task(4, TaskStatus::ToDo);
        task.due_date = Some(date(2024, 3, 15));
        task.priority = Priority::High;
        let event = CalendarEvent::from_task(&task).unwrap();
        assert_eq!(event.key, "task-4");
        assert_eq!(event.kind(), EventKind::Task);
        assert!(event.is_draggable());
        assert_eq!(event.color_class(), "bg-error text-white");

        let mut project = sample_project(2);
        project.deadline = Some(date(2024, 3, 30));
        let event = CalendarEvent::from_project(&project).unwrap();
        assert_eq!(event.kind(), EventKind::Project);
        assert!(!event.is_draggable());
        assert_eq!(event.task_id(), None);
        assert_eq!(event.color_class(), "bg-primary text-white");
    }
}
