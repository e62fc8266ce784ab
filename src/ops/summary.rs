use chrono::NaiveDate;
use serde::Serialize;

use crate::model::board::Board;
use crate::model::task::{Priority, Status};

/// Board statistics for the summary page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    pub todo: usize,
    pub in_progress: usize,
    pub await_feedback: usize,
    pub done: usize,
    pub total: usize,
    /// Urgent tasks that are not done yet
    pub urgent: usize,
    /// Earliest due date among open urgent tasks on or after `today`
    pub upcoming_deadline: Option<NaiveDate>,
}

pub fn summarize(board: &Board, today: NaiveDate) -> BoardSummary {
    let count = |s: Status| board.column(s).count();
    let open_urgent = || {
        board
            .tasks
            .iter()
            .filter(|t| t.priority == Priority::Urgent && t.status != Status::Done)
    };
    BoardSummary {
        todo: count(Status::Todo),
        in_progress: count(Status::InProgress),
        await_feedback: count(Status::AwaitFeedback),
        done: count(Status::Done),
        total: board.len(),
        urgent: open_urgent().count(),
        upcoming_deadline: open_urgent()
            .map(|t| t.due_date)
            .filter(|d| *d >= today)
            .min(),
    }
}

/// Greeting for the summary header, by hour of day
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}
