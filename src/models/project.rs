use std::{fmt, str::FromStr};

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    RecordId,
    task::{Task, TaskStatus, UnknownVariant, squash},
    validation::ValidationErrors,
};

/// Largest attachment accepted, 10 MiB
pub const MAX_ATTACHMENT_SIZE: u64 = 10 * 1024 * 1024;

/// Most files one project may carry
pub const MAX_ATTACHMENTS: usize = 5;

/// File extensions an attachment may carry
pub const ACCEPTED_EXTENSIONS: [&str; 8] = [
    ".pdf", ".doc", ".docx", ".txt", ".jpg", ".jpeg", ".png", ".gif",
];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Identifier assigned by the record store
    #[serde(rename = "Id")]
    pub id: RecordId,
    /// Title of the project
    pub title: String,
    /// Description of the project
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    /// Deadline of the project
    #[serde(default)]
    pub deadline: Option<Date>,
    /// Share of the project's tasks that are done, 0 to 100
    #[serde(default)]
    pub completion_percentage: u8,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectStatus {
    #[default]
    Planning,
    Active,
    #[serde(rename = "On Hold")]
    OnHold,
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Planning,
        ProjectStatus::Active,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::Planning => "Planning",
            ProjectStatus::Active => "Active",
            ProjectStatus::OnHold => "On Hold",
            ProjectStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProjectStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = squash(s);
        ProjectStatus::ALL
            .into_iter()
            .find(|status| squash(status.label()) == wanted)
            .ok_or_else(|| UnknownVariant {
                kind: "project status",
                value: s.to_string(),
            })
    }
}

/// Metadata of a file attached to a project
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// MIME type reported for the file
    #[serde(rename = "type", default)]
    pub mime_type: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("File \"{name}\" is too large. Maximum size is {max_mb}MB")]
    TooLarge { name: String, max_mb: u64 },

    #[error("File type \"{0}\" is not supported")]
    UnsupportedType(String),
}

impl Attachment {
    /// Attachment metadata for a file of `size` bytes named `name`
    pub fn from_file(name: &str, size: u64) -> Self {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        let mime_type = match extension.as_str() {
            "pdf" => "application/pdf",
            "doc" => "application/msword",
            "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "txt" => "text/plain",
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            _ => "application/octet-stream",
        };
        Self {
            name: name.to_string(),
            size,
            mime_type: mime_type.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), AttachmentError> {
        if self.size > MAX_ATTACHMENT_SIZE {
            return Err(AttachmentError::TooLarge {
                name: self.name.clone(),
                max_mb: MAX_ATTACHMENT_SIZE / 1024 / 1024,
            });
        }

        let extension = match self.name.rsplit_once('.') {
            Some((_, ext)) => format!(".{}", ext.to_lowercase()),
            None => String::new(),
        };
        if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AttachmentError::UnsupportedType(extension));
        }

        Ok(())
    }
}

/// `round(100 * done / total)`, or `None` for a project without tasks
pub fn completion_percentage(done: usize, total: usize) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let done = done.min(total);
    // Integer half-up rounding of 100 * done / total
    let percentage = (200 * done + total) / (2 * total);
    Some(percentage.min(100) as u8)
}

impl Project {
    /// Completion derived from the tasks in `tasks` that belong to this project
    pub fn completion_from_tasks(&self, tasks: &[Task]) -> Option<u8> {
        let owned = tasks.iter().filter(|t| t.project_id == Some(self.id));
        let (total, done) = owned.fold((0, 0), |(total, done), task| {
            (total + 1, done + usize::from(task.status == TaskStatus::Done))
        });
        completion_percentage(done, total)
    }
}

/// Form data for creating or editing a project
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub deadline: Option<Date>,
    pub attachments: Vec<Attachment>,
}

impl ProjectDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title, "Title is required");
        errors.require("description", &self.description, "Description is required");
        if self.deadline.is_none() {
            errors.add("deadline", "Deadline is required");
        }
        if self.attachments.len() > MAX_ATTACHMENTS {
            errors.add(
                "attachments",
                format!("Maximum {MAX_ATTACHMENTS} files allowed"),
            );
        } else if let Some(error) = self.attachments.iter().find_map(|a| a.validate().err()) {
            errors.add("attachments", error.to_string());
        }
        errors.into_result()
    }
}

impl From<&Project> for ProjectDraft {
    fn from(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            description: project.description.clone(),
            status: project.status,
            deadline: project.deadline,
            attachments: project.attachments.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_project(id: RecordId) -> Project {
    let created: Timestamp = "2024-02-01T09:00:00Z".parse().unwrap();
    Project {
        id,
        title: format!("Project {id}"),
        description: "Sample".to_string(),
        status: ProjectStatus::Active,
        deadline: None,
        completion_percentage: 0,
        created_at: created,
        updated_at: created,
        attachments: vec![],
    }
}
