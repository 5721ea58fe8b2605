// src/models.rs

pub mod calendar;
pub mod comment;
pub mod project;
pub mod snapshot;
pub mod task;
pub mod user;
pub mod validation;

/// Integer identifier assigned by the record store
pub type RecordId = i64;

/// Splits a comma separated tag input, trimming entries and dropping blanks
/// and repeats while keeping the order of first appearance.
pub fn parse_tags(input: &str) -> Vec<String> {
    normalize_tags(input.split(',').map(str::to_string))
}

pub fn normalize_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || normalized.iter().any(|t| t == tag) {
            continue;
        }
        normalized.push(tag.to_string());
    }
    normalized
}
