//! The persisted snapshot: what survives between runs.
//!
//! The core only encodes and decodes — the persistence collaborator
//! moves bytes. Hydration rebuilds the aggregate from a snapshot,
//! discarding log records not dated today; a snapshot that fails to
//! decode is treated as absent (logged, never surfaced to the
//! participant).

use jiff::Timestamp;
use jiff::civil::{Date, DateTime, Time, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{ItemAnswer, LogRecord, ResultAggregate, WeeklySchedule};
use crate::reminder::ReminderConfig;

/// Errors from snapshot encoding or decoding.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, SnapshotError>;

/// The serialized run state. Weekdays are numbered 1 (Sunday) through
/// 7 (Saturday); times are `"HH:MM"`; a missing `timeOfDay` means
/// anytime. `reminders` absent means never configured, `[]` means
/// explicitly cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub identifier: Uuid,
    pub start_date: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Timestamp>,

    pub items: Vec<SnapshotItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Vec<u16>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotItem {
    pub identifier: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,

    #[serde(default)]
    pub schedule_items: Vec<SnapshotSchedule>,

    #[serde(default)]
    pub timestamps: Vec<SnapshotStamp>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSchedule {
    pub days_of_week: Vec<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStamp {
    pub schedule_time: String,
    pub logged_at: DateTime,
}

/// Captures the current run state for persistence.
pub fn capture(aggregate: &ResultAggregate, reminders: &ReminderConfig) -> Snapshot {
    Snapshot {
        identifier: aggregate.id,
        start_date: aggregate.start_date,
        end_date: aggregate.end_date,
        items: aggregate.answers.iter().map(capture_item).collect(),
        reminders: match reminders {
            ReminderConfig::Unset => None,
            ReminderConfig::Cleared => Some(Vec::new()),
            ReminderConfig::Leads(leads) => Some(leads.clone()),
        },
    }
}

/// Serializes a snapshot to pretty JSON.
pub fn encode(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Deserializes a snapshot from JSON.
pub fn decode(json: &str) -> Result<Snapshot> {
    Ok(serde_json::from_str(json)?)
}

/// Decodes a snapshot, recovering from malformed input by treating it
/// as absent. The failure is logged; the participant never sees it.
pub fn decode_or_absent(json: &str) -> Option<Snapshot> {
    match decode(json) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            log::warn!("discarding undecodable snapshot: {e}");
            None
        }
    }
}

/// Rebuilds the aggregate and reminder configuration from a snapshot.
/// Log records not dated `today` are discarded.
pub fn hydrate(snapshot: &Snapshot, today: Date) -> (ResultAggregate, ReminderConfig) {
    let mut aggregate = ResultAggregate::new();
    aggregate.id = snapshot.identifier;
    aggregate.start_date = snapshot.start_date;
    aggregate.end_date = snapshot.end_date;
    aggregate.answers = snapshot.items.iter().map(|i| hydrate_item(i, today)).collect();

    let reminders = match &snapshot.reminders {
        None => ReminderConfig::Unset,
        Some(leads) if leads.is_empty() => ReminderConfig::Cleared,
        Some(leads) => ReminderConfig::Leads(leads.clone()),
    };
    (aggregate, reminders)
}

fn capture_item(answer: &ItemAnswer) -> SnapshotItem {
    SnapshotItem {
        identifier: answer.item_id.clone(),
        dosage: answer.dosage.clone(),
        schedule_items: answer
            .schedules
            .iter()
            .map(|s| SnapshotSchedule {
                days_of_week: s.days.iter().map(|&d| weekday_number(d)).collect(),
                time_of_day: s.time_of_day.map(format_time),
            })
            .collect(),
        timestamps: answer
            .logs
            .iter()
            .map(|r| SnapshotStamp {
                schedule_time: r.slot.clone(),
                logged_at: r.logged_at,
            })
            .collect(),
    }
}

fn hydrate_item(item: &SnapshotItem, today: Date) -> ItemAnswer {
    let mut answer = ItemAnswer::new(item.identifier.clone());
    answer.dosage = item.dosage.clone();
    answer.schedules = item
        .schedule_items
        .iter()
        .map(|s| match &s.time_of_day {
            Some(text) => WeeklySchedule::at(weekdays(&s.days_of_week), parse_time(text)),
            None => WeeklySchedule::anytime(weekdays(&s.days_of_week)),
        })
        .collect();
    answer.logs = item
        .timestamps
        .iter()
        .filter(|stamp| stamp.logged_at.date() == today)
        .map(|stamp| LogRecord {
            slot: stamp.schedule_time.clone(),
            logged_at: stamp.logged_at,
        })
        .collect();
    answer
}

fn weekdays(numbers: &[u8]) -> Vec<Weekday> {
    numbers.iter().filter_map(|&n| weekday_from_number(n)).collect()
}

/// 1 = Sunday … 7 = Saturday.
#[allow(clippy::cast_sign_loss)] // Offsets are 1..=7.
fn weekday_number(weekday: Weekday) -> u8 {
    weekday.to_sunday_one_offset() as u8
}

fn weekday_from_number(number: u8) -> Option<Weekday> {
    let number = i8::try_from(number).ok()?;
    match Weekday::from_sunday_one_offset(number) {
        Ok(weekday) => Some(weekday),
        Err(_) => {
            debug_assert!(false, "weekday number out of range: {number}");
            log::warn!("dropping out-of-range weekday number {number}");
            None
        }
    }
}

fn format_time(time: Time) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Parses `"HH:MM"`. Out-of-range or malformed input is a contract
/// violation: debug builds assert, release builds degrade to 00:00.
fn parse_time(text: &str) -> Time {
    let parsed = text.split_once(':').and_then(|(h, m)| {
        let hour: i8 = h.parse().ok()?;
        let minute: i8 = m.parse().ok()?;
        Time::new(hour, minute, 0, 0).ok()
    });
    match parsed {
        Some(time) => time,
        None => {
            debug_assert!(false, "invalid time of day: {text:?}");
            log::warn!("invalid time of day {text:?}, using 00:00");
            Time::midnight()
        }
    }
}
