// src/models/task.rs

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::models::{RecordId, validation::ValidationErrors};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier assigned by the record store
    #[serde(rename = "Id")]
    pub id: RecordId,
    /// Title of the task
    pub title: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Kanban column the task sits in
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    /// Day the task is due, if any
    #[serde(default)]
    pub due_date: Option<Date>,
    /// The project this task belongs to. Can dangle once the project is deleted
    #[serde(default)]
    pub project_id: Option<RecordId>,
    /// The user the task is assigned to
    #[serde(default)]
    pub assignee_id: Option<RecordId>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    /// A task is overdue when its due date is strictly before `today` and it
    /// is not done yet.
    pub fn is_overdue(&self, today: Date) -> bool {
        match self.due_date {
            Some(due) => due < today && self.status != TaskStatus::Done,
            None => false,
        }
    }

    /// Case-insensitive substring match over title, description and tags.
    /// `needle` must already be lowercase.
    pub fn matches_text(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// Task workflow states, in quick-cycle order
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    /// Next status of the quick-cycle affordance. Done wraps back to To Do.
    pub fn next(self) -> TaskStatus {
        match self {
            TaskStatus::ToDo => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Review,
            TaskStatus::Review => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::ToDo,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Review => "Review",
            TaskStatus::Done => "Done",
        }
    }

    /// Position in the display order
    pub fn rank(self) -> usize {
        match self {
            TaskStatus::ToDo => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Review => 2,
            TaskStatus::Done => 3,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Lowercases and drops separators so "In Progress", "in-progress" and
/// "inprogress" compare equal.
pub(crate) fn squash(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = squash(s);
        TaskStatus::ALL
            .into_iter()
            .find(|status| squash(status.label()) == wanted)
            .ok_or_else(|| UnknownVariant {
                kind: "status",
                value: s.to_string(),
            })
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = squash(s);
        Priority::ALL
            .into_iter()
            .find(|priority| squash(priority.label()) == wanted)
            .ok_or_else(|| UnknownVariant {
                kind: "priority",
                value: s.to_string(),
            })
    }
}

/// Form data for creating or editing a task
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<Date>,
    pub project_id: Option<RecordId>,
    pub assignee_id: Option<RecordId>,
    pub tags: Vec<String>,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title, "Title is required");
        if self.project_id.is_none() {
            errors.add("projectId", "Project is required");
        }
        errors.into_result()
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            project_id: task.project_id,
            assignee_id: task.assignee_id,
            tags: task.tags.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_task(id: RecordId, status: TaskStatus) -> Task {
    let created: Timestamp = "2024-03-01T09:00:00Z".parse().unwrap();
    Task {
        id,
        title: format!("Task {id}"),
        description: String::new(),
        status,
        priority: Priority::Medium,
        due_date: None,
        project_id: Some(1),
        assignee_id: None,
        tags: vec![],
        created_at: created,
        updated_at: created,
    }
}
