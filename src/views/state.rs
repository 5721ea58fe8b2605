use crate::services::ServiceError;

/// What a view is showing. A view is always in exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    /// Load failed; the view offers a retry
    Failed { message: String },
    Loaded(T),
    Empty,
}

impl<T> ViewState<T> {
    pub fn from_result(
        result: Result<T, ServiceError>,
        is_empty: impl FnOnce(&T) -> bool,
    ) -> Self {
        match result {
            Ok(data) if is_empty(&data) => ViewState::Empty,
            Ok(data) => ViewState::Loaded(data),
            Err(e) => ViewState::Failed {
                message: e.to_string(),
            },
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(data) => Some(data),
            _ => None,
        }
    }
}

/// Ticket handed out when a load starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Generation counter guarding against late results.
///
/// Each load takes a ticket; only the result of the most recent ticket may be
/// applied. Anything older arrived after the view moved on and is dropped.
#[derive(Debug, Default)]
pub struct LoadGuard {
    generation: u64,
}

impl LoadGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }
}
