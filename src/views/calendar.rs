use jiff::{Span, ToSpan, civil::Date};
use tracing::{debug, warn};

use crate::{
    models::{calendar::CalendarEvent, task::{Task, TaskDraft}},
    records::RecordStore,
    services::{
        ServiceError,
        calendar::{create_task_on_date, get_calendar_events, move_task_to_date},
    },
    views::kanban::DropOutcome,
};

/// Cells shown per day before the rest collapse into "+N more"
pub const MAX_VISIBLE_EVENTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CalendarMode {
    #[default]
    Month,
    Week,
    Day,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: Date,
    /// Always true in day view
    pub in_current_month: bool,
    pub is_today: bool,
    /// `YYYY-MM-DD`
    pub key: String,
}

fn week_start(date: Date) -> Date {
    let offset = i64::from(date.weekday().to_sunday_zero_offset());
    date.saturating_sub(offset.days())
}

fn week_end(date: Date) -> Date {
    let offset = i64::from(6 - date.weekday().to_sunday_zero_offset());
    date.saturating_add(offset.days())
}

/// First and last day rendered for `reference` in `mode`, both inclusive
pub fn visible_range(reference: Date, mode: CalendarMode) -> (Date, Date) {
    match mode {
        CalendarMode::Month => (
            week_start(reference.first_of_month()),
            week_end(reference.last_of_month()),
        ),
        CalendarMode::Week => (week_start(reference), week_end(reference)),
        CalendarMode::Day => (reference, reference),
    }
}

/// Day cells for `reference` in `mode`, in order.
///
/// Month view runs from the Sunday on or before the 1st through the Saturday
/// on or after the last day, so its length is always a multiple of 7.
pub fn generate_days(reference: Date, mode: CalendarMode, today: Date) -> Vec<DayCell> {
    let (start, end) = visible_range(reference, mode);
    start
        .series(1.day())
        .take_while(|date| *date <= end)
        .map(|date| DayCell {
            date,
            in_current_month: mode == CalendarMode::Day
                || (date.year() == reference.year() && date.month() == reference.month()),
            is_today: date == today,
            key: date.to_string(),
        })
        .collect()
}

/// Moves the reference date one unit of `mode` forward (or backward)
/// Moves `reference` by `steps` months, weeks or days (backwards when
/// negative), clamped to the supported date range
pub fn navigate(reference: Date, mode: CalendarMode, steps: i64) -> Date {
    let span = match mode {
        CalendarMode::Month => Span::new().try_months(steps),
        CalendarMode::Week => Span::new().try_weeks(steps),
        CalendarMode::Day => Span::new().try_days(steps),
    };
    match span {
        Ok(span) => reference.saturating_add(span),
        Err(_) if steps > 0 => Date::MAX,
        Err(_) => Date::MIN,
    }
}

#[derive(Debug, PartialEq)]
pub struct DayEvents<'a> {
    pub visible: Vec<&'a CalendarEvent>,
    /// Number of events hidden behind "+N more"
    pub overflow: usize,
}

/// Events on `date`, keeping the order of `events`
pub fn events_for_day(events: &[CalendarEvent], date: Date) -> DayEvents<'_> {
    let mut on_day = events.iter().filter(|event| event.date == date);
    let visible: Vec<_> = on_day.by_ref().take(MAX_VISIBLE_EVENTS).collect();
    DayEvents {
        visible,
        overflow: on_day.count(),
    }
}

#[derive(Debug)]
pub struct CalendarBoard {
    pub reference: Date,
    pub mode: CalendarMode,
    pub today: Date,
    pub events: Vec<CalendarEvent>,
    dragged: Option<String>,
}

impl CalendarBoard {
    pub fn new(reference: Date, mode: CalendarMode, today: Date) -> Self {
        Self {
            reference,
            mode,
            today,
            events: vec![],
            dragged: None,
        }
    }

    pub fn days(&self) -> Vec<DayCell> {
        generate_days(self.reference, self.mode, self.today)
    }

    pub fn range(&self) -> (Date, Date) {
        visible_range(self.reference, self.mode)
    }

    /// Fetches the events of the visible range
    pub async fn load(&mut self, store: &impl RecordStore) -> Result<(), ServiceError> {
        let (start, end) = self.range();
        self.events = get_calendar_events(store, start, end).await?;
        debug!(%start, %end, events = self.events.len(), "calendar loaded");
        Ok(())
    }

    pub fn navigate(&mut self, steps: i64) {
        self.reference = navigate(self.reference, self.mode, steps);
    }

    pub fn events_on(&self, date: Date) -> DayEvents<'_> {
        events_for_day(&self.events, date)
    }

    /// Starts dragging the event with `key`. Project events cannot be dragged.
    pub fn drag_start(&mut self, key: &str) -> bool {
        let draggable = self
            .events
            .iter()
            .any(|event| event.key == key && event.is_draggable());
        self.dragged = draggable.then(|| key.to_string());
        draggable
    }

    /// Reschedules the dragged task to `date`, then refreshes the events
    pub async fn drop_on(
        &mut self,
        store: &impl RecordStore,
        date: Date,
    ) -> Result<DropOutcome, ServiceError> {
        let Some(key) = self.dragged.take() else {
            return Ok(DropOutcome::NothingDragged);
        };
        let Some(event) = self.events.iter().find(|event| event.key == key) else {
            return Ok(DropOutcome::NothingDragged);
        };
        let Some(task_id) = event.task_id() else {
            return Ok(DropOutcome::NothingDragged);
        };
        if event.date == date {
            return Ok(DropOutcome::Unchanged);
        }

        let saved = move_task_to_date(store, task_id, date).await?;
        self.refresh(store).await;
        Ok(DropOutcome::Moved(saved))
    }

    /// Creates a task due on `date` and refreshes the events
    pub async fn create_task(
        &mut self,
        store: &impl RecordStore,
        date: Date,
        draft: TaskDraft,
    ) -> Result<Task, ServiceError> {
        let task = create_task_on_date(store, date, draft).await?;
        self.refresh(store).await;
        Ok(task)
    }

    /// Reloads after a saved change. The change stands even if the reload
    /// fails; the grid keeps its previous events until the next load.
    async fn refresh(&mut self, store: &impl RecordStore) {
        if let Err(e) = self.load(store).await {
            warn!(error = %e, "failed to refresh calendar events");
        }
    }
}
