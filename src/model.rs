//! Core data model for the tracked-item flow.
//!
//! These types represent the conceptual architecture: catalog items,
//! day-part buckets, weekly schedules, per-item answers, and the single
//! mutable result aggregate the navigator owns.

mod aggregate;
mod answer;
mod item;
mod schedule;
mod time_window;

pub use aggregate::ResultAggregate;
pub use answer::{ItemAnswer, LogRecord};
pub use item::{Item, Section};
pub use schedule::{Trigger, WeeklySchedule, every_day};
pub use time_window::TimeWindow;
