//! The in-memory result: one mutable aggregate per run.

use jiff::Timestamp;
use jiff::civil::DateTime;
use uuid::Uuid;

use super::answer::ItemAnswer;
use super::schedule::WeeklySchedule;

/// The single mutable source of truth for a run's answers.
///
/// Exclusively owned by the navigator; every step's result is merged
/// into it. An independent copy (same content, new identifier) is
/// produced only when a discrete per-step result must be recorded
/// separately — never implicit aliasing.
#[derive(Debug, Clone)]
pub struct ResultAggregate {
    pub id: Uuid,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub answers: Vec<ItemAnswer>,
}

impl ResultAggregate {
    /// An empty aggregate for a fresh run.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            start_date: Timestamp::now(),
            end_date: None,
            answers: Vec::new(),
        }
    }

    /// Reconciles the answer list with a new selection: answers for
    /// deselected items are dropped, empty answers are created for newly
    /// selected ones, and the result takes the selection's order.
    pub fn apply_selection<S: AsRef<str>>(&mut self, item_ids: &[S]) {
        let mut previous = std::mem::take(&mut self.answers);
        for id in item_ids {
            let id = id.as_ref();
            let answer = match previous.iter().position(|a| a.item_id == id) {
                Some(index) => previous.swap_remove(index),
                None => ItemAnswer::new(id),
            };
            self.answers.push(answer);
        }
    }

    /// Merges a completed detail step into the item's answer.
    ///
    /// No-op if the item is not currently selected.
    pub fn merge_detail(
        &mut self,
        item_id: &str,
        dosage: Option<String>,
        schedules: Vec<WeeklySchedule>,
    ) {
        if let Some(answer) = self.answer_mut(item_id) {
            answer.dosage = dosage;
            answer.schedules = schedules;
        }
    }

    /// Records a logged occurrence against an item's slot.
    pub fn record_log(&mut self, item_id: &str, slot: &str, logged_at: DateTime) {
        if let Some(answer) = self.answer_mut(item_id) {
            answer.record_log(slot, logged_at);
        }
    }

    /// Drops an item from the selection entirely.
    pub fn remove(&mut self, item_id: &str) {
        self.answers.retain(|a| a.item_id != item_id);
    }

    pub fn answer(&self, item_id: &str) -> Option<&ItemAnswer> {
        self.answers.iter().find(|a| a.item_id == item_id)
    }

    pub fn answer_mut(&mut self, item_id: &str) -> Option<&mut ItemAnswer> {
        self.answers.iter_mut().find(|a| a.item_id == item_id)
    }

    pub fn selected_ids(&self) -> Vec<&str> {
        self.answers.iter().map(|a| a.item_id.as_str()).collect()
    }

    /// Marks the run finished.
    pub fn finish(&mut self) {
        self.end_date = Some(Timestamp::now());
    }

    /// An independent copy with a fresh identifier, for recording a
    /// discrete per-step result.
    pub fn copy_with_new_id(&self) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy
    }
}

impl Default for ResultAggregate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::{Weekday, date, time};

    use crate::model::schedule::WeeklySchedule;

    #[test]
    fn selection_creates_empty_answers_in_order() {
        let mut aggregate = ResultAggregate::new();
        aggregate.apply_selection(&["b", "a"]);

        assert_eq!(aggregate.selected_ids(), vec!["b", "a"]);
        assert!(aggregate.answer("a").unwrap().schedules.is_empty());
    }

    #[test]
    fn reselection_keeps_existing_answers_and_drops_deselected() {
        let mut aggregate = ResultAggregate::new();
        aggregate.apply_selection(&["a", "b"]);
        aggregate.merge_detail(
            "a",
            Some("200mg".into()),
            vec![WeeklySchedule::at(vec![Weekday::Monday], time(8, 0, 0, 0))],
        );

        aggregate.apply_selection(&["c", "a"]);

        assert_eq!(aggregate.selected_ids(), vec!["c", "a"]);
        assert_eq!(aggregate.answer("a").unwrap().dosage.as_deref(), Some("200mg"));
        assert!(aggregate.answer("b").is_none());
    }

    #[test]
    fn removal_drops_the_answer() {
        let mut aggregate = ResultAggregate::new();
        aggregate.apply_selection(&["a", "b"]);
        aggregate.remove("a");

        assert_eq!(aggregate.selected_ids(), vec!["b"]);
    }

    #[test]
    fn record_log_lands_on_the_right_item() {
        let mut aggregate = ResultAggregate::new();
        aggregate.apply_selection(&["a", "b"]);
        aggregate.record_log("b", "08:00", date(2026, 8, 24).at(8, 5, 0, 0));

        assert!(aggregate.answer("a").unwrap().logs.is_empty());
        assert_eq!(aggregate.answer("b").unwrap().logs.len(), 1);
    }

    #[test]
    fn copy_with_new_id_is_independent() {
        let mut aggregate = ResultAggregate::new();
        aggregate.apply_selection(&["a"]);

        let copy = aggregate.copy_with_new_id();
        assert_ne!(copy.id, aggregate.id);
        assert_eq!(copy.selected_ids(), aggregate.selected_ids());

        aggregate.remove("a");
        assert_eq!(copy.selected_ids(), vec!["a"]);
    }
}
