use std::{env, path::PathBuf};

use crate::models::RecordId;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Where the snapshot of every collection is kept
    pub store_path: PathBuf,
    /// User the CLI acts as
    pub user_id: RecordId,
    /// Whether record store calls wait like a remote backend would
    pub simulate_latency: bool,
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskboard")
        .join("store.json")
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            store_path: lookup("TASKBOARD_STORE")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_store_path),
            user_id: lookup("TASKBOARD_USER_ID")
                .and_then(|id| id.trim().parse().ok())
                .unwrap_or(1),
            simulate_latency: lookup("TASKBOARD_LATENCY")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "on" | "1" | "true"))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.user_id, 1);
        assert!(!config.simulate_latency);
        assert!(config.store_path.ends_with("taskboard/store.json"));
    }

    #[test]
    fn test_reads_overrides() {
        let config = Config::from_lookup(|key| match key {
            "TASKBOARD_STORE" => Some("/tmp/board.json".to_string()),
            "TASKBOARD_USER_ID" => Some("3".to_string()),
            "TASKBOARD_LATENCY" => Some("ON".to_string()),
            _ => None,
        });
        assert_eq!(config.store_path, PathBuf::from("/tmp/board.json"));
        assert_eq!(config.user_id, 3);
        assert!(config.simulate_latency);
    }

    #[test]
    fn test_garbage_user_id_falls_back() {
        let config = Config::from_lookup(|key| (key == "TASKBOARD_USER_ID").then(|| "me".to_string()));
        assert_eq!(config.user_id, 1);
    }
}
