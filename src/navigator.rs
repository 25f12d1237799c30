//! Step sequencing for the tracked-item flow.
//!
//! The navigator owns the run's [`ResultAggregate`] and decides which
//! step comes next given the step that just finished and its result.
//! Steps are tagged variants dispatched by matching; the host's UI
//! renders them and hands back a [`StepOutcome`] for merging.
//!
//! The flow: Introduction → Selection → Review → Detail(loop) →
//! Logging → Reminder → exit. All merges into the aggregate are
//! synchronous; exactly one in-flight transition at a time is assumed,
//! so there is no internal locking.

use jiff::Zoned;
use jiff::civil::{Date, DateTime};

use crate::availability;
use crate::catalog::Catalog;
use crate::model::{ResultAggregate, WeeklySchedule};
use crate::reminder::ReminderConfig;
use crate::snapshot::{self, Snapshot};

/// A screen the host should show. Terminal is represented by the
/// absence of a next step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Optional opening screen.
    Introduction,

    /// Pick the items to monitor.
    Selection,

    /// Review the selection; the anchor the detail loop returns to.
    Review,

    /// Structured details (dosage, weekly schedule) for one item.
    Detail { item_id: String },

    /// Log today's occurrences against the schedules.
    Logging,

    /// Configure reminder lead-times.
    Reminder,
}

impl Step {
    /// Stable identifier the UI collaborator can request steps by.
    pub fn identifier(&self) -> String {
        match self {
            Self::Introduction => "introduction".to_string(),
            Self::Selection => "selection".to_string(),
            Self::Review => "review".to_string(),
            Self::Detail { item_id } => format!("detail:{item_id}"),
            Self::Logging => "logging".to_string(),
            Self::Reminder => "reminder".to_string(),
        }
    }
}

/// Where a review step explicitly sends the participant, overriding the
/// completeness scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Back to item selection.
    Selection,

    /// Straight to one item's detail step.
    Detail { item_id: String },
}

/// One logged occurrence reported by the logging step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub item_id: String,
    pub slot: String,
    pub logged_at: DateTime,
}

/// The discrete result of a finished step, handed back by the UI for
/// merging into the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The introduction was acknowledged.
    Introduction,

    /// The participant chose these items, in display order.
    Selection { item_ids: Vec<String> },

    /// The review step finished, optionally redirecting.
    Review { redirect: Option<Redirect> },

    /// A detail step completed for one item.
    Detail {
        item_id: String,
        dosage: Option<String>,
        schedules: Vec<WeeklySchedule>,
    },

    /// The participant removed an item mid-flow.
    Removal { item_id: String },

    /// The logging step reported today's occurrences.
    Logging { entries: Vec<LogEntry> },

    /// The reminder step configured lead-times.
    Reminder { config: ReminderConfig },
}

/// Host-supplied flow options.
#[derive(Debug, Clone, Default)]
pub struct FlowConfig {
    /// Show an introduction screen before selection on a fresh run.
    pub include_introduction: bool,

    /// Offer the reminder step after logging.
    pub offer_reminders: bool,
}

/// The state machine deciding the next screen. Exclusively owns one
/// in-memory result per run; every step's outcome merges into it.
#[derive(Debug)]
pub struct StepNavigator {
    catalog: Catalog,
    flow: FlowConfig,
    aggregate: ResultAggregate,
    reminders: ReminderConfig,
    resumed: bool,
}

impl StepNavigator {
    /// A navigator for a fresh run with an empty aggregate.
    pub fn new(catalog: Catalog, flow: FlowConfig) -> Self {
        Self {
            catalog,
            flow,
            aggregate: ResultAggregate::new(),
            reminders: ReminderConfig::Unset,
            resumed: false,
        }
    }

    /// A navigator hydrated from a persisted snapshot. Log records not
    /// dated `today` are discarded.
    pub fn resume(catalog: Catalog, flow: FlowConfig, prior: &Snapshot, today: Date) -> Self {
        let (aggregate, reminders) = snapshot::hydrate(prior, today);
        Self {
            catalog,
            flow,
            aggregate,
            reminders,
            resumed: true,
        }
    }

    /// The first step of the run.
    ///
    /// A resumed run with at least one selected item jumps straight to
    /// logging; otherwise selection, via the introduction if configured.
    pub fn start(&self) -> Step {
        if self.resumed && !self.aggregate.answers.is_empty() {
            return Step::Logging;
        }
        if self.flow.include_introduction {
            Step::Introduction
        } else {
            Step::Selection
        }
    }

    /// Merges a finished step's outcome and returns the next step, or
    /// `None` when the flow is over.
    pub fn advance(&mut self, outcome: StepOutcome) -> Option<Step> {
        match outcome {
            StepOutcome::Introduction => Some(Step::Selection),

            StepOutcome::Selection { item_ids } => {
                let known: Vec<&String> = item_ids
                    .iter()
                    .filter(|id| self.catalog.item(id.as_str()).is_some())
                    .collect();
                self.aggregate.apply_selection(&known);
                Some(Step::Review)
            }

            StepOutcome::Review { redirect } => match redirect {
                Some(Redirect::Selection) => Some(Step::Selection),
                Some(Redirect::Detail { item_id }) => Some(Step::Detail { item_id }),
                None => match self.first_incomplete() {
                    Some(item_id) => Some(Step::Detail { item_id }),
                    None => Some(Step::Logging),
                },
            },

            StepOutcome::Detail {
                item_id,
                dosage,
                schedules,
            } => {
                self.aggregate.merge_detail(&item_id, dosage, schedules);
                match self.next_incomplete_after(&item_id) {
                    Some(next) => Some(Step::Detail { item_id: next }),
                    None => Some(Step::Review),
                }
            }

            StepOutcome::Removal { item_id } => {
                self.aggregate.remove(&item_id);
                if self.aggregate.answers.is_empty() {
                    Some(Step::Selection)
                } else {
                    Some(Step::Review)
                }
            }

            StepOutcome::Logging { entries } => {
                for entry in entries {
                    self.aggregate
                        .record_log(&entry.item_id, &entry.slot, entry.logged_at);
                }
                if self.flow.offer_reminders {
                    Some(Step::Reminder)
                } else {
                    self.aggregate.finish();
                    None
                }
            }

            StepOutcome::Reminder { config } => {
                self.reminders = config;
                self.aggregate.finish();
                None
            }
        }
    }

    /// The step shown when navigating backward from `step`.
    ///
    /// Only detail steps go back (to review); selection, review,
    /// logging, and reminder are flow anchors with no back-step.
    pub fn step_before(&self, step: &Step) -> Option<Step> {
        match step {
            Step::Detail { .. } => Some(Step::Review),
            _ => None,
        }
    }

    /// Resolves a step by its identifier for the UI collaborator.
    ///
    /// Detail steps resolve only for currently selected items.
    pub fn step_with_identifier(&self, identifier: &str) -> Option<Step> {
        if let Some(item_id) = identifier.strip_prefix("detail:") {
            return self.aggregate.answer(item_id).map(|_| Step::Detail {
                item_id: item_id.to_string(),
            });
        }
        match identifier {
            "introduction" => Some(Step::Introduction),
            "selection" => Some(Step::Selection),
            "review" => Some(Step::Review),
            "logging" => Some(Step::Logging),
            "reminder" => Some(Step::Reminder),
            _ => None,
        }
    }

    /// Whether a step should be skipped entirely when this flow runs
    /// embedded as a sub-flow.
    ///
    /// Logging skips when nothing is currently due or missed; the
    /// reminder step skips when no schedule generates a trigger.
    pub fn should_skip(&self, step: &Step, now: &Zoned) -> bool {
        match step {
            Step::Logging => availability::partition(&self.aggregate, now, false).is_empty(),
            Step::Reminder => {
                !self.flow.offer_reminders
                    || self
                        .aggregate
                        .answers
                        .iter()
                        .flat_map(|a| &a.schedules)
                        .all(|s| s.recurrence_triggers().is_empty())
            }
            _ => false,
        }
    }

    /// The in-memory result.
    pub fn aggregate(&self) -> &ResultAggregate {
        &self.aggregate
    }

    pub fn reminders(&self) -> &ReminderConfig {
        &self.reminders
    }

    /// An independent copy of the aggregate for recording a discrete
    /// per-step result.
    pub fn step_result(&self) -> ResultAggregate {
        self.aggregate.copy_with_new_id()
    }

    /// Captures the current state for the persistence collaborator.
    pub fn snapshot(&self) -> Snapshot {
        snapshot::capture(&self.aggregate, &self.reminders)
    }

    /// Whether an item's answer still needs its detail step.
    fn needs_detail(&self, item_id: &str) -> bool {
        let has_detail = self.catalog.item(item_id).is_some_and(|i| i.has_detail);
        self.aggregate
            .answer(item_id)
            .is_some_and(|a| !a.detail_complete(has_detail))
    }

    /// First selected item whose detail is incomplete, in answer order.
    fn first_incomplete(&self) -> Option<String> {
        self.aggregate
            .answers
            .iter()
            .map(|a| a.item_id.as_str())
            .find(|id| self.needs_detail(id))
            .map(String::from)
    }

    /// Next incomplete item after `item_id`, scanning forward and
    /// wrapping once, stopping before revisiting the start. Bounds the
    /// detail loop at K+1 visits for K selected items.
    fn next_incomplete_after(&self, item_id: &str) -> Option<String> {
        let ids: Vec<&str> = self.aggregate.answers.iter().map(|a| a.item_id.as_str()).collect();
        let start = ids.iter().position(|id| *id == item_id)?;
        ids[start + 1..]
            .iter()
            .chain(&ids[..start])
            .copied()
            .find(|id| self.needs_detail(id))
            .map(ToString::to_string)
    }
}
