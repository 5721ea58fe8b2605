use serde_json::json;

use crate::{
    models::{
        RecordId,
        user::{User, UserDraft},
    },
    records::{Collection, FetchParams, RecordStore},
    services::{ServiceError, decode, decode_all, decode_echo, encode, field_names, patch},
};

const ENTITY: &str = "User";

pub const USER_FIELDS: [&str; 4] = ["name", "email", "avatar", "role"];

pub async fn get_all_users(store: &impl RecordStore) -> Result<Vec<User>, ServiceError> {
    let params = FetchParams::with_fields(&USER_FIELDS);
    let records = store.fetch_records(Collection::User, &params).await?;
    decode_all(ENTITY, records)
}

pub async fn get_user(store: &impl RecordStore, id: RecordId) -> Result<User, ServiceError> {
    let record = store
        .get_record_by_id(Collection::User, id, &field_names(&USER_FIELDS))
        .await
        .map_err(|e| ServiceError::from_store(ENTITY, e))?;
    decode(ENTITY, record)
}

pub async fn create_user(store: &impl RecordStore, draft: UserDraft) -> Result<User, ServiceError> {
    draft.validate()?;
    let record = encode(
        ENTITY,
        &json!({
            "name": draft.name.trim(),
            "email": draft.email.trim(),
            "avatar": draft.avatar,
            "role": draft.role.trim(),
        }),
    )?;
    let created = store.create_record(Collection::User, vec![record]).await?;
    decode_echo(ENTITY, created)
}

pub async fn update_user(
    store: &impl RecordStore,
    id: RecordId,
    draft: UserDraft,
) -> Result<User, ServiceError> {
    draft.validate()?;
    let record = patch(
        id,
        json!({
            "name": draft.name.trim(),
            "email": draft.email.trim(),
            "avatar": draft.avatar,
            "role": draft.role.trim(),
        }),
    );
    let updated = store
        .update_record(Collection::User, vec![record])
        .await
        .map_err(|e| ServiceError::from_store(ENTITY, e))?;
    decode_echo(ENTITY, updated)
}

pub async fn delete_user(store: &impl RecordStore, id: RecordId) -> Result<(), ServiceError> {
    if !store.delete_record(Collection::User, &[id]).await? {
        return Err(ServiceError::NotFound { entity: ENTITY, id });
    }
    Ok(())
}
