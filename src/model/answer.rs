//! Per-item answers: configuration, schedules, and the occurrence log.

use jiff::civil::{Date, DateTime};

use super::schedule::WeeklySchedule;

/// A logged occurrence against one schedule slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// The slot the occurrence was logged against; see
    /// [`WeeklySchedule::slot_key`].
    pub slot: String,

    /// When the participant logged it.
    pub logged_at: DateTime,
}

/// The mutable per-item record: created on first selection, mutated on
/// detail entry and each logging event, never shared between items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemAnswer {
    /// Identifier of the catalog item this answer belongs to.
    pub item_id: String,

    /// Configured dosage text, once the detail step has run.
    pub dosage: Option<String>,

    /// Weekly schedules configured for the item.
    pub schedules: Vec<WeeklySchedule>,

    /// Occurrences logged so far. Stale entries are discarded at
    /// hydration; within a day, a later record for the same slot
    /// supersedes an earlier one.
    pub logs: Vec<LogRecord>,
}

impl ItemAnswer {
    /// An empty answer for a freshly selected item.
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            dosage: None,
            schedules: Vec::new(),
            logs: Vec::new(),
        }
    }

    /// Records an occurrence for a slot.
    pub fn record_log(&mut self, slot: impl Into<String>, logged_at: DateTime) {
        self.logs.push(LogRecord {
            slot: slot.into(),
            logged_at,
        });
    }

    /// The most recent record for a slot today, if any.
    pub fn latest_log_today(&self, slot: &str, today: Date) -> Option<&LogRecord> {
        self.logs
            .iter()
            .filter(|r| r.slot == slot && r.logged_at.date() == today)
            .max_by_key(|r| r.logged_at)
    }

    /// Whether the slot has already been logged today.
    pub fn logged_today(&self, slot: &str, today: Date) -> bool {
        self.latest_log_today(slot, today).is_some()
    }

    /// Drops records not dated today.
    pub fn discard_stale_logs(&mut self, today: Date) {
        self.logs.retain(|r| r.logged_at.date() == today);
    }

    /// Whether the detail step has everything it needs: a dosage and at
    /// least one schedule. Items without a detail step are always
    /// complete.
    pub fn detail_complete(&self, has_detail: bool) -> bool {
        !has_detail || (self.dosage.is_some() && !self.schedules.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::{Weekday, date, time};

    fn at(day: i8, hour: i8, minute: i8) -> DateTime {
        date(2026, 8, day).at(hour, minute, 0, 0)
    }

    #[test]
    fn later_record_supersedes_for_the_same_slot() {
        let mut answer = ItemAnswer::new("ibuprofen");
        answer.record_log("08:00", at(24, 8, 5));
        answer.record_log("08:00", at(24, 9, 30));

        let latest = answer.latest_log_today("08:00", date(2026, 8, 24)).unwrap();
        assert_eq!(latest.logged_at, at(24, 9, 30));
    }

    #[test]
    fn records_from_other_days_do_not_count() {
        let mut answer = ItemAnswer::new("ibuprofen");
        answer.record_log("08:00", at(23, 8, 5));

        assert!(!answer.logged_today("08:00", date(2026, 8, 24)));
    }

    #[test]
    fn discard_stale_logs_keeps_today_only() {
        let mut answer = ItemAnswer::new("ibuprofen");
        answer.record_log("08:00", at(23, 8, 5));
        answer.record_log("12:00", at(24, 12, 10));

        answer.discard_stale_logs(date(2026, 8, 24));
        assert_eq!(answer.logs.len(), 1);
        assert_eq!(answer.logs[0].slot, "12:00");
    }

    #[test]
    fn detail_completeness() {
        let mut answer = ItemAnswer::new("ibuprofen");
        assert!(answer.detail_complete(false), "no-detail items are always complete");
        assert!(!answer.detail_complete(true));

        answer.dosage = Some("200mg".into());
        assert!(!answer.detail_complete(true), "a schedule is still required");

        answer
            .schedules
            .push(WeeklySchedule::at(vec![Weekday::Monday], time(8, 0, 0, 0)));
        assert!(answer.detail_complete(true));
    }
}
