pub mod calendar;
pub mod dashboard;
pub mod filter;
pub mod kanban;
pub mod my_tasks;
pub mod state;
pub mod team;
pub mod transition;
