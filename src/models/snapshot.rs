use serde::{Deserialize, Serialize};

use crate::{
    models::RecordId,
    records::{Collection, ID_FIELD, Record},
};

/// Current schema version
pub const CURRENT_VERSION: u32 = 2;

/// Every record collection, as persisted between runs
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub version: u32,
    /// Last identifier handed out. Ids are never reused, even after deletes
    #[serde(default)]
    pub last_id: RecordId,
    #[serde(rename = "project", default)]
    pub projects: Vec<Record>,
    #[serde(rename = "task", default)]
    pub tasks: Vec<Record>,
    #[serde(rename = "app_User", default)]
    pub users: Vec<Record>,
    #[serde(rename = "app_Comment", default)]
    pub comments: Vec<Record>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            last_id: 0,
            projects: vec![],
            tasks: vec![],
            users: vec![],
            comments: vec![],
        }
    }
}

impl Snapshot {
    pub fn records(&self, collection: Collection) -> &Vec<Record> {
        match collection {
            Collection::Project => &self.projects,
            Collection::Task => &self.tasks,
            Collection::User => &self.users,
            Collection::Comment => &self.comments,
        }
    }

    pub fn records_mut(&mut self, collection: Collection) -> &mut Vec<Record> {
        match collection {
            Collection::Project => &mut self.projects,
            Collection::Task => &mut self.tasks,
            Collection::User => &mut self.users,
            Collection::Comment => &mut self.comments,
        }
    }

    /// Highest `Id` handed out so far, either recorded or found in a collection
    pub fn max_id(&self) -> RecordId {
        Collection::ALL
            .iter()
            .flat_map(|c| self.records(*c))
            .filter_map(|r| r.get(ID_FIELD).and_then(|v| v.as_i64()))
            .fold(self.last_id, RecordId::max)
    }
}
