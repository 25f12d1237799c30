//! Weekly schedules: a weekday set plus an optional time of day.

use jiff::civil::{Time, Weekday};

use super::time_window::TimeWindow;

/// A recurring weekly time specification governing when an item is due.
///
/// `time_of_day: None` means "anytime" — the schedule has no meaningful
/// clock time, generates no reminder triggers, and is always in the
/// current window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklySchedule {
    /// Weekdays the schedule applies on. Set semantics; deduplicated
    /// at construction.
    pub days: Vec<Weekday>,

    /// Time of day the occurrence is due, or `None` for anytime.
    pub time_of_day: Option<Time>,
}

/// One recurrence point derived from a schedule.
///
/// `weekday: None` means the trigger repeats daily.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub weekday: Option<Weekday>,
    pub time: Time,
}

impl WeeklySchedule {
    /// A schedule due at a specific time on the given weekdays.
    pub fn at(days: Vec<Weekday>, time_of_day: Time) -> Self {
        Self {
            days: dedupe(days),
            time_of_day: Some(time_of_day),
        }
    }

    /// An anytime schedule on the given weekdays.
    pub fn anytime(days: Vec<Weekday>) -> Self {
        Self {
            days: dedupe(days),
            time_of_day: None,
        }
    }

    pub fn is_anytime(&self) -> bool {
        self.time_of_day.is_none()
    }

    /// Whether an occurrence is applicable at the given moment: the
    /// weekday is in the set, and the scheduled time has already arrived
    /// (anytime schedules apply all day).
    pub fn applies_on(&self, weekday: Weekday, now: Time) -> bool {
        self.days.contains(&weekday) && self.time_of_day.is_none_or(|t| t <= now)
    }

    /// Whether the schedule falls in the same day-part bucket as `now`.
    ///
    /// Separates "due in the current window" from "earlier today,
    /// unacted on". Anytime schedules are always current.
    pub fn is_current_window(&self, now: Time) -> bool {
        match self.time_of_day {
            None => true,
            Some(t) => TimeWindow::of(t) == TimeWindow::of(now),
        }
    }

    /// The logging slot this schedule belongs to.
    ///
    /// Two schedules are the same slot iff their slot keys match,
    /// independent of their weekday sets.
    pub fn slot_key(&self) -> String {
        match self.time_of_day {
            Some(t) => format!("{:02}:{:02}", t.hour(), t.minute()),
            None => "anytime".to_string(),
        }
    }

    /// Recurrence points for reminders.
    ///
    /// Anytime schedules yield nothing (there is no moment to remind
    /// about). A schedule covering all seven weekdays collapses to a
    /// single daily trigger; otherwise one trigger per weekday.
    pub fn recurrence_triggers(&self) -> Vec<Trigger> {
        let Some(time) = self.time_of_day else {
            return Vec::new();
        };
        if self.covers_every_day() {
            return vec![Trigger {
                weekday: None,
                time,
            }];
        }
        self.days
            .iter()
            .map(|&weekday| Trigger {
                weekday: Some(weekday),
                time,
            })
            .collect()
    }

    /// Sort key for displaying slots: anytime first, then timed slots in
    /// day-part order.
    pub fn order_key(&self) -> (u8, u8, u8, u8) {
        match self.time_of_day {
            None => (0, 0, 0, 0),
            Some(t) => {
                let (rank, index, minute) = TimeWindow::order_key(t);
                (1, rank, index, minute)
            }
        }
    }

    fn covers_every_day(&self) -> bool {
        use Weekday::{Friday, Monday, Saturday, Sunday, Thursday, Tuesday, Wednesday};
        [Sunday, Monday, Tuesday, Wednesday, Thursday, Friday, Saturday]
            .iter()
            .all(|d| self.days.contains(d))
    }
}

fn dedupe(days: Vec<Weekday>) -> Vec<Weekday> {
    let mut out: Vec<Weekday> = Vec::with_capacity(days.len());
    for day in days {
        if !out.contains(&day) {
            out.push(day);
        }
    }
    out
}

/// All seven weekdays, Sunday first.
pub fn every_day() -> Vec<Weekday> {
    use Weekday::{Friday, Monday, Saturday, Sunday, Thursday, Tuesday, Wednesday};
    vec![
        Sunday, Monday, Tuesday, Wednesday, Thursday, Friday, Saturday,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::time;

    #[test]
    fn applies_only_once_the_time_has_arrived() {
        let schedule = WeeklySchedule::at(vec![Weekday::Monday], time(12, 0, 0, 0));
        assert!(!schedule.applies_on(Weekday::Monday, time(10, 0, 0, 0)));
        assert!(schedule.applies_on(Weekday::Monday, time(12, 0, 0, 0)));
        assert!(schedule.applies_on(Weekday::Monday, time(15, 0, 0, 0)));
    }

    #[test]
    fn does_not_apply_on_other_weekdays() {
        let schedule = WeeklySchedule::at(vec![Weekday::Monday], time(8, 0, 0, 0));
        assert!(!schedule.applies_on(Weekday::Tuesday, time(9, 0, 0, 0)));
    }

    #[test]
    fn anytime_applies_all_day() {
        let schedule = WeeklySchedule::anytime(vec![Weekday::Monday]);
        assert!(schedule.applies_on(Weekday::Monday, time(0, 0, 0, 0)));
        assert!(schedule.is_current_window(time(3, 0, 0, 0)));
        assert!(schedule.is_current_window(time(14, 0, 0, 0)));
    }

    #[test]
    fn current_window_matches_day_part() {
        let schedule = WeeklySchedule::at(vec![Weekday::Monday], time(8, 0, 0, 0));
        assert!(schedule.is_current_window(time(10, 0, 0, 0)));
        assert!(!schedule.is_current_window(time(12, 40, 0, 0)));
    }

    #[test]
    fn slot_key_ignores_weekdays() {
        let a = WeeklySchedule::at(vec![Weekday::Monday], time(8, 30, 0, 0));
        let b = WeeklySchedule::at(vec![Weekday::Friday], time(8, 30, 0, 0));
        assert_eq!(a.slot_key(), b.slot_key());
        assert_eq!(a.slot_key(), "08:30");
        assert_eq!(WeeklySchedule::anytime(vec![Weekday::Monday]).slot_key(), "anytime");
    }

    #[test]
    fn triggers_per_weekday() {
        let schedule =
            WeeklySchedule::at(vec![Weekday::Monday, Weekday::Thursday], time(20, 0, 0, 0));
        let triggers = schedule.recurrence_triggers();
        assert_eq!(triggers.len(), 2);
        assert_eq!(triggers[0].weekday, Some(Weekday::Monday));
        assert_eq!(triggers[1].weekday, Some(Weekday::Thursday));
    }

    #[test]
    fn full_week_collapses_to_a_daily_trigger() {
        let schedule = WeeklySchedule::at(every_day(), time(9, 0, 0, 0));
        let triggers = schedule.recurrence_triggers();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].weekday, None);
    }

    #[test]
    fn anytime_yields_no_triggers() {
        let schedule = WeeklySchedule::anytime(every_day());
        assert!(schedule.recurrence_triggers().is_empty());
    }

    #[test]
    fn anytime_sorts_before_timed_slots() {
        let anytime = WeeklySchedule::anytime(vec![Weekday::Monday]);
        let timed = WeeklySchedule::at(vec![Weekday::Monday], time(6, 0, 0, 0));
        assert!(anytime.order_key() < timed.order_key());
    }

    #[test]
    fn duplicate_days_collapse() {
        let schedule =
            WeeklySchedule::at(vec![Weekday::Monday, Weekday::Monday], time(8, 0, 0, 0));
        assert_eq!(schedule.days.len(), 1);
    }
}
