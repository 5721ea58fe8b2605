use serde::{Deserialize, Serialize};

use crate::models::{RecordId, validation::ValidationErrors};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    #[serde(rename = "Id")]
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Avatar image URL
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: String,
}

impl User {
    /// Up to two uppercase initials, used when no avatar is set
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: String,
}

impl UserDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name, "Name is required");
        errors.require("email", &self.email, "Email is required");
        errors.into_result()
    }
}
