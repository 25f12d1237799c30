//! Partitioning today's schedules into "due now" and "missed today".
//!
//! For each item answer, every schedule applicable at this moment lands
//! in exactly one of three buckets: current (same day-part window as
//! now, unlogged), missed (an earlier window today, unlogged), or
//! logged-and-excluded. Items whose applicable slots are all logged
//! contribute to neither display section.

use jiff::Zoned;

use crate::model::{ResultAggregate, WeeklySchedule};

/// One item's due slots, feeding a display section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueGroup {
    pub item_id: String,

    /// Slots in ascending schedule-time order (anytime first).
    pub slots: Vec<WeeklySchedule>,
}

/// The two display sections: due in the current window, and missed
/// earlier today. Groups keep the aggregate's item input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Availability {
    pub current: Vec<DueGroup>,
    pub missed: Vec<DueGroup>,
}

impl Availability {
    /// True when there is nothing to show in either section.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.missed.is_empty()
    }
}

/// Partitions the aggregate's applicable schedules against `now`.
///
/// `include_logged_current` additionally surfaces already-logged slots
/// whose window is current, for UIs that show them checked off. Logged
/// slots outside the current window are always excluded — an anytime
/// slot that has been logged today is considered fully accounted.
pub fn partition(
    aggregate: &ResultAggregate,
    now: &Zoned,
    include_logged_current: bool,
) -> Availability {
    let weekday = now.weekday();
    let time = now.time();
    let today = now.date();

    let mut availability = Availability::default();
    for answer in &aggregate.answers {
        let mut current = Vec::new();
        let mut missed = Vec::new();

        for schedule in &answer.schedules {
            if !schedule.applies_on(weekday, time) {
                continue;
            }
            let logged = answer.logged_today(&schedule.slot_key(), today);
            if schedule.is_current_window(time) {
                if !logged || include_logged_current {
                    current.push(schedule.clone());
                }
            } else if !logged {
                missed.push(schedule.clone());
            }
        }

        current.sort_by_key(WeeklySchedule::order_key);
        missed.sort_by_key(WeeklySchedule::order_key);

        if !current.is_empty() {
            availability.current.push(DueGroup {
                item_id: answer.item_id.clone(),
                slots: current,
            });
        }
        if !missed.is_empty() {
            availability.missed.push(DueGroup {
                item_id: answer.item_id.clone(),
                slots: missed,
            });
        }
    }
    availability
}
