//! Reminder reconciliation: diffing notification requests against the
//! configured schedules and lead-times.
//!
//! The core computation is a pure diff — given the aggregate, the lead
//! configuration, and the keys already scheduled with the OS, it
//! decides what to add and what to cancel. Requests whose key is
//! already pending are left untouched, so two consecutive runs with
//! unchanged answers produce zero OS mutations on the second.
//!
//! The OS itself sits behind [`NotificationPort`]; the read/diff/write
//! sequence is not atomic against a concurrent refresh and must be
//! serialized by the caller.

use std::collections::HashSet;

use jiff::civil::{Time, Weekday};

use crate::model::{ResultAggregate, Trigger};

/// Lead-time configuration, kept as an explicit three-state value so
/// "never configured" and "explicitly cleared" stay distinguishable
/// across a snapshot round-trip. Both behave as "nothing to schedule".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReminderConfig {
    /// The participant never reached the reminder step.
    #[default]
    Unset,

    /// The participant explicitly turned reminders off.
    Cleared,

    /// Minutes of notice ahead of each scheduled time.
    Leads(Vec<u16>),
}

impl ReminderConfig {
    pub fn lead_minutes(&self) -> &[u16] {
        match self {
            Self::Unset | Self::Cleared => &[],
            Self::Leads(leads) => leads,
        }
    }

    /// Whether there is anything to schedule.
    pub fn is_active(&self) -> bool {
        !self.lead_minutes().is_empty()
    }
}

/// A local-notification request to hand to the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    /// Canonical key: `<itemId> <Weekday-or-Daily> <HH:MM> <leadMinutes>`.
    /// The time in the key is the *scheduled* time, not the fire time.
    pub key: String,

    /// Weekday the reminder repeats on; `None` repeats daily.
    pub weekday: Option<Weekday>,

    /// When the reminder fires: scheduled time minus the lead.
    pub fire_time: Time,
}

/// What to add and what to cancel to bring the OS in line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderDiff {
    pub add: Vec<ReminderRequest>,
    pub cancel: Vec<String>,
}

impl ReminderDiff {
    /// True when a pass would perform no OS mutations.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.cancel.is_empty()
    }
}

/// The injected OS-notification boundary: query pending requests,
/// cancel by key, add new requests. Calls are best-effort — a failed
/// pass is simply re-attempted by the next refresh cycle's diff.
pub trait NotificationPort {
    fn pending_keys(&self) -> Result<Vec<String>, PortError>;
    fn cancel(&mut self, keys: &[String]) -> Result<(), PortError>;
    fn add(&mut self, requests: &[ReminderRequest]) -> Result<(), PortError>;
}

/// A notification call failed. No automatic retry.
#[derive(Debug, thiserror::Error)]
#[error("notification port error: {0}")]
pub struct PortError(pub String);

/// Computes the reconciliation diff. Pure; does not touch the port.
///
/// With no lead-times configured, everything pending is cancelled.
/// Otherwise every (answer × schedule × trigger × lead) combination
/// produces one canonical key: keys already pending are kept as-is,
/// missing ones become requests, and pending keys no longer produced
/// are cancelled.
pub fn diff(
    aggregate: &ResultAggregate,
    config: &ReminderConfig,
    pending: &[String],
) -> ReminderDiff {
    let leads = config.lead_minutes();
    if leads.is_empty() {
        return ReminderDiff {
            add: Vec::new(),
            cancel: pending.to_vec(),
        };
    }

    let mut wanted_keys = HashSet::new();
    let mut wanted = Vec::new();
    for answer in &aggregate.answers {
        for schedule in &answer.schedules {
            for trigger in schedule.recurrence_triggers() {
                for &lead in leads {
                    let key = canonical_key(&answer.item_id, &trigger, lead);
                    if !wanted_keys.insert(key.clone()) {
                        continue;
                    }
                    let (weekday, fire_time) = fire_point(&trigger, lead);
                    wanted.push(ReminderRequest {
                        key,
                        weekday,
                        fire_time,
                    });
                }
            }
        }
    }

    let pending_set: HashSet<&str> = pending.iter().map(String::as_str).collect();
    ReminderDiff {
        add: wanted
            .into_iter()
            .filter(|r| !pending_set.contains(r.key.as_str()))
            .collect(),
        cancel: pending
            .iter()
            .filter(|k| !wanted_keys.contains(k.as_str()))
            .cloned()
            .collect(),
    }
}

/// One read/diff/write pass against the port.
///
/// Returns the applied diff. An error leaves the OS partially updated;
/// the next pass re-diffs from scratch.
pub fn reconcile(
    port: &mut dyn NotificationPort,
    aggregate: &ResultAggregate,
    config: &ReminderConfig,
) -> Result<ReminderDiff, PortError> {
    let pending = port.pending_keys()?;
    let diff = diff(aggregate, config, &pending);
    if !diff.cancel.is_empty() {
        port.cancel(&diff.cancel)?;
    }
    if !diff.add.is_empty() {
        port.add(&diff.add)?;
    }
    Ok(diff)
}

fn canonical_key(item_id: &str, trigger: &Trigger, lead: u16) -> String {
    format!(
        "{item_id} {} {:02}:{:02} {lead}",
        weekday_label(trigger.weekday),
        trigger.time.hour(),
        trigger.time.minute(),
    )
}

fn weekday_label(weekday: Option<Weekday>) -> &'static str {
    match weekday {
        None => "Daily",
        Some(Weekday::Sunday) => "Sunday",
        Some(Weekday::Monday) => "Monday",
        Some(Weekday::Tuesday) => "Tuesday",
        Some(Weekday::Wednesday) => "Wednesday",
        Some(Weekday::Thursday) => "Thursday",
        Some(Weekday::Friday) => "Friday",
        Some(Weekday::Saturday) => "Saturday",
    }
}

/// The fire point for a trigger: scheduled time minus the lead, with
/// minute/hour borrow and previous-day wraparound. Daily triggers stay
/// daily regardless of the wrap.
fn fire_point(trigger: &Trigger, lead: u16) -> (Option<Weekday>, Time) {
    let scheduled = i32::from(trigger.time.hour()) * 60 + i32::from(trigger.time.minute());
    let mut fire = scheduled - i32::from(lead);
    let mut weekday = trigger.weekday;
    while fire < 0 {
        fire += 24 * 60;
        weekday = weekday.map(previous_day);
    }
    #[allow(clippy::cast_possible_truncation)] // 0..1440 after the wrap.
    let time = Time::new((fire / 60) as i8, (fire % 60) as i8, 0, 0).unwrap_or_default();
    (weekday, time)
}

fn previous_day(weekday: Weekday) -> Weekday {
    match weekday {
        Weekday::Sunday => Weekday::Saturday,
        Weekday::Monday => Weekday::Sunday,
        Weekday::Tuesday => Weekday::Monday,
        Weekday::Wednesday => Weekday::Tuesday,
        Weekday::Thursday => Weekday::Wednesday,
        Weekday::Friday => Weekday::Thursday,
        Weekday::Saturday => Weekday::Friday,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::{Weekday, time};

    use crate::model::{ItemAnswer, WeeklySchedule, every_day};

    fn aggregate_with_daily_dose() -> ResultAggregate {
        let mut aggregate = ResultAggregate::new();
        let mut answer = ItemAnswer::new("ibuprofen");
        answer.schedules = vec![WeeklySchedule::at(every_day(), time(8, 0, 0, 0))];
        aggregate.answers = vec![answer];
        aggregate
    }

    /// Fake port recording every OS mutation.
    #[derive(Default)]
    struct FakePort {
        scheduled: Vec<String>,
        cancel_calls: usize,
        add_calls: usize,
    }

    impl NotificationPort for FakePort {
        fn pending_keys(&self) -> Result<Vec<String>, PortError> {
            Ok(self.scheduled.clone())
        }

        fn cancel(&mut self, keys: &[String]) -> Result<(), PortError> {
            self.cancel_calls += 1;
            self.scheduled.retain(|k| !keys.contains(k));
            Ok(())
        }

        fn add(&mut self, requests: &[ReminderRequest]) -> Result<(), PortError> {
            self.add_calls += 1;
            self.scheduled
                .extend(requests.iter().map(|r| r.key.clone()));
            Ok(())
        }
    }

    #[test]
    fn daily_schedule_yields_one_key_per_lead() {
        let aggregate = aggregate_with_daily_dose();
        let config = ReminderConfig::Leads(vec![15, 60]);

        let diff = diff(&aggregate, &config, &[]);
        let keys: Vec<&str> = diff.add.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["ibuprofen Daily 08:00 15", "ibuprofen Daily 08:00 60"]);
    }

    #[test]
    fn lead_subtraction_borrows_minutes() {
        let aggregate = aggregate_with_daily_dose();
        let config = ReminderConfig::Leads(vec![30]);

        let diff = diff(&aggregate, &config, &[]);
        assert_eq!(diff.add[0].fire_time, time(7, 30, 0, 0));
        assert_eq!(diff.add[0].weekday, None);
    }

    #[test]
    fn lead_subtraction_wraps_to_the_previous_day() {
        let mut aggregate = ResultAggregate::new();
        let mut answer = ItemAnswer::new("x");
        answer.schedules = vec![WeeklySchedule::at(
            vec![Weekday::Monday],
            time(0, 15, 0, 0),
        )];
        aggregate.answers = vec![answer];

        let diff = diff(&aggregate, &ReminderConfig::Leads(vec![30]), &[]);
        assert_eq!(diff.add[0].weekday, Some(Weekday::Sunday));
        assert_eq!(diff.add[0].fire_time, time(23, 45, 0, 0));
        assert_eq!(diff.add[0].key, "x Monday 00:15 30");
    }

    #[test]
    fn no_leads_cancels_everything() {
        let aggregate = aggregate_with_daily_dose();
        let pending = vec!["ibuprofen Daily 08:00 15".to_string()];

        for config in [
            ReminderConfig::Unset,
            ReminderConfig::Cleared,
            ReminderConfig::Leads(Vec::new()),
        ] {
            let diff = diff(&aggregate, &config, &pending);
            assert!(diff.add.is_empty());
            assert_eq!(diff.cancel, pending);
        }
    }

    #[test]
    fn pending_keys_are_left_untouched() {
        let aggregate = aggregate_with_daily_dose();
        let config = ReminderConfig::Leads(vec![15]);
        let pending = vec!["ibuprofen Daily 08:00 15".to_string()];

        let diff = diff(&aggregate, &config, &pending);
        assert!(diff.is_empty(), "nothing to add or cancel: {diff:?}");
    }

    #[test]
    fn stale_pending_keys_are_cancelled() {
        let aggregate = aggregate_with_daily_dose();
        let config = ReminderConfig::Leads(vec![15]);
        let pending = vec![
            "ibuprofen Daily 08:00 15".to_string(),
            "ibuprofen Daily 20:00 15".to_string(),
        ];

        let diff = diff(&aggregate, &config, &pending);
        assert!(diff.add.is_empty());
        assert_eq!(diff.cancel, vec!["ibuprofen Daily 20:00 15".to_string()]);
    }

    #[test]
    fn anytime_schedules_produce_no_reminders() {
        let mut aggregate = ResultAggregate::new();
        let mut answer = ItemAnswer::new("x");
        answer.schedules = vec![WeeklySchedule::anytime(every_day())];
        aggregate.answers = vec![answer];

        let diff = diff(&aggregate, &ReminderConfig::Leads(vec![15]), &[]);
        assert!(diff.add.is_empty());
    }

    #[test]
    fn reconcile_is_idempotent() {
        let aggregate = aggregate_with_daily_dose();
        let config = ReminderConfig::Leads(vec![15, 60]);
        let mut port = FakePort::default();

        let first = reconcile(&mut port, &aggregate, &config).unwrap();
        assert_eq!(first.add.len(), 2);
        assert_eq!(port.add_calls, 1);

        let second = reconcile(&mut port, &aggregate, &config).unwrap();
        assert!(second.is_empty());
        assert_eq!(port.add_calls, 1, "second run must not touch the OS");
        assert_eq!(port.cancel_calls, 0);
    }

    #[test]
    fn reconcile_converges_after_a_schedule_change() {
        let mut aggregate = aggregate_with_daily_dose();
        let config = ReminderConfig::Leads(vec![15]);
        let mut port = FakePort::default();
        reconcile(&mut port, &aggregate, &config).unwrap();

        // Move the dose to the evening.
        aggregate.answers[0].schedules =
            vec![WeeklySchedule::at(every_day(), time(20, 0, 0, 0))];
        let diff = reconcile(&mut port, &aggregate, &config).unwrap();

        assert_eq!(diff.cancel, vec!["ibuprofen Daily 08:00 15".to_string()]);
        assert_eq!(diff.add[0].key, "ibuprofen Daily 20:00 15");
        assert_eq!(port.scheduled, vec!["ibuprofen Daily 20:00 15".to_string()]);
    }
}
