use jiff::Timestamp;
use serde_json::json;
use tracing::info;

use crate::{
    models::{
        RecordId,
        comment::{Comment, CommentDraft, validate_content},
    },
    records::{Collection, Condition, FetchParams, Operator, RecordStore},
    services::{ServiceError, decode_all, decode_echo, encode, patch},
    session::Session,
};

const ENTITY: &str = "Comment";

pub const COMMENT_FIELDS: [&str; 4] = ["taskId", "userId", "content", "createdAt"];

pub async fn get_all_comments(store: &impl RecordStore) -> Result<Vec<Comment>, ServiceError> {
    let params = FetchParams::with_fields(&COMMENT_FIELDS);
    let records = store.fetch_records(Collection::Comment, &params).await?;
    decode_all(ENTITY, records)
}

/// Comments left on a task, oldest first
pub async fn get_comments_by_task(
    store: &impl RecordStore,
    task_id: RecordId,
) -> Result<Vec<Comment>, ServiceError> {
    let params = FetchParams::with_fields(&COMMENT_FIELDS)
        .filter(Condition::new("taskId", Operator::EqualTo, task_id));
    let records = store.fetch_records(Collection::Comment, &params).await?;
    let mut comments: Vec<Comment> = decode_all(ENTITY, records)?;
    comments.sort_by_key(|c| c.created_at);
    Ok(comments)
}

/// Appends a comment authored by the session user
pub async fn create_comment(
    store: &impl RecordStore,
    session: &Session,
    draft: CommentDraft,
) -> Result<Comment, ServiceError> {
    draft.validate()?;

    let record = encode(
        ENTITY,
        &json!({
            "taskId": draft.task_id,
            "userId": session.user_id,
            "content": draft.content.trim(),
            "createdAt": Timestamp::now(),
        }),
    )?;
    let created = store.create_record(Collection::Comment, vec![record]).await?;
    let comment: Comment = decode_echo(ENTITY, created)?;
    info!(id = comment.id, task_id = draft.task_id, "comment added");
    Ok(comment)
}

pub async fn update_comment(
    store: &impl RecordStore,
    id: RecordId,
    content: &str,
) -> Result<Comment, ServiceError> {
    validate_content(content)?;

    let record = patch(id, json!({ "content": content.trim() }));
    let updated = store
        .update_record(Collection::Comment, vec![record])
        .await
        .map_err(|e| ServiceError::from_store(ENTITY, e))?;
    decode_echo(ENTITY, updated)
}

pub async fn delete_comment(store: &impl RecordStore, id: RecordId) -> Result<(), ServiceError> {
    if !store.delete_record(Collection::Comment, &[id]).await? {
        return Err(ServiceError::NotFound { entity: ENTITY, id });
    }
    Ok(())
}
