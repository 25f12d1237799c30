//! regimen — the navigator and schedule/result core of a repeatable
//! tracked-item data-collection flow.
//!
//! A participant selects items to monitor (e.g. medications), supplies
//! structured details per item (dosage, weekly schedule), and later
//! logs daily occurrences against those schedules. This crate decides
//! which screen comes next, merges partial answers into one running
//! result, partitions today's schedules into "due now" and "missed",
//! and diff-reconciles local-notification requests.
//!
//! Screen rendering, remote sync, and the host's step/task type system
//! are external collaborators; see [`navigator::StepNavigator`] for the
//! seam they plug into.

pub mod availability;
pub mod catalog;
pub mod model;
pub mod navigator;
pub mod reminder;
pub mod snapshot;
pub mod storage;

pub use availability::{Availability, DueGroup};
pub use catalog::{Catalog, CatalogError, DetailTemplate};
pub use model::{
    Item, ItemAnswer, LogRecord, ResultAggregate, Section, TimeWindow, Trigger, WeeklySchedule,
};
pub use navigator::{FlowConfig, LogEntry, Redirect, Step, StepNavigator, StepOutcome};
pub use reminder::{
    NotificationPort, PortError, ReminderConfig, ReminderDiff, ReminderRequest,
};
pub use snapshot::{Snapshot, SnapshotError};
pub use storage::{SnapshotStore, StorageError};
