use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::models::{RecordId, validation::ValidationErrors};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "Id")]
    pub id: RecordId,
    /// Task the comment was left on
    #[serde(default)]
    pub task_id: Option<RecordId>,
    /// Author of the comment
    #[serde(default)]
    pub user_id: Option<RecordId>,
    pub content: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentDraft {
    pub task_id: RecordId,
    pub content: String,
}

impl CommentDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_content(&self.content)
    }
}

pub fn validate_content(content: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("content", content, "Comment cannot be empty");
    errors.into_result()
}
