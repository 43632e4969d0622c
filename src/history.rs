use crate::spin::SpinOutcome;
use chrono::{
    DateTime,
    Local,
};
use std::collections::VecDeque;

pub const WINNER_HISTORY_DEPTH: usize = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct WinnerRecord {
    pub winner: String,
    pub at: DateTime<Local>,
}

/// Most recent winners, newest first.
#[derive(Clone, Debug, Default)]
pub struct WinnerHistory {
    records: VecDeque<WinnerRecord>,
}

impl WinnerHistory {
    pub fn record(&mut self, outcome: &SpinOutcome, at: DateTime<Local>) {
        self.records.push_front(WinnerRecord {
            winner: outcome.winner.clone(),
            at,
        });
        self.records.truncate(WINNER_HISTORY_DEPTH);
    }

    pub fn iter(&self) -> impl Iterator<Item = &WinnerRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(winner: &str, index: usize) -> SpinOutcome {
        SpinOutcome {
            index,
            winner: winner.to_string(),
            rotation: 0.0,
            ticks: 1,
            forced: false,
        }
    }

    #[test]
    fn keeps_newest_first_and_caps_depth() {
        let mut history = WinnerHistory::default();
        for i in 0..(WINNER_HISTORY_DEPTH + 3) {
            history.record(&outcome(&format!("P{i}"), i), Local::now());
        }
        assert_eq!(history.len(), WINNER_HISTORY_DEPTH);
        let latest = history.iter().next().unwrap();
        assert_eq!(latest.winner, format!("P{}", WINNER_HISTORY_DEPTH + 2));
        let oldest = history.iter().last().unwrap();
        assert_eq!(oldest.winner, "P3");
    }
}
