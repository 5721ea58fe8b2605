use crate::models::RecordId;

/// Who is using the board. Threaded explicitly through every call that acts
/// on behalf of "the current user".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: RecordId,
}

impl Session {
    pub fn new(user_id: RecordId) -> Self {
        Self { user_id }
    }
}
