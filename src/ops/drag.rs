use tracing::debug;

use crate::model::board::Board;
use crate::model::task::Status;

/// Error type for drag-and-drop transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DragError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("already dragging task {0}")]
    AlreadyDragging(String),
    #[error("no task is being dragged")]
    NotDragging,
}

/// Controller state. `Dropped` and `Cancelled` are reported as outcomes and
/// immediately return the controller to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        task_id: String,
        /// Column currently under the pointer, if it is a valid target
        over: Option<Status>,
    },
}

/// How a drag ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Released over a column; the caller moves the task there
    Dropped { task_id: String, status: Status },
    /// Released outside any column, or cancelled; nothing changes
    Cancelled { task_id: String },
}

/// Tracks the single task being dragged across board columns
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

/// Resolve a drop-target identifier to a column. Anything that is not one of
/// the four column names is not a valid target.
pub fn drop_target(target: Option<&str>) -> Option<Status> {
    target.and_then(|t| t.parse().ok())
}

impl DragController {
    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Id of the task being dragged
    pub fn dragging(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { task_id, .. } => Some(task_id),
            DragState::Idle => None,
        }
    }

    /// Column to highlight while dragging
    pub fn hovered(&self) -> Option<Status> {
        match &self.state {
            DragState::Dragging { over, .. } => *over,
            DragState::Idle => None,
        }
    }

    /// Idle → Dragging
    pub fn begin(&mut self, board: &Board, task_id: &str) -> Result<(), DragError> {
        if let Some(current) = self.dragging() {
            return Err(DragError::AlreadyDragging(current.to_string()));
        }
        if board.get(task_id).is_none() {
            return Err(DragError::NotFound(task_id.to_string()));
        }
        debug!(task_id, "drag started");
        self.state = DragState::Dragging {
            task_id: task_id.to_string(),
            over: None,
        };
        Ok(())
    }

    /// Pointer moved over `target`; returns the column to highlight
    pub fn hover(&mut self, target: Option<&str>) -> Result<Option<Status>, DragError> {
        match &mut self.state {
            DragState::Dragging { over, .. } => {
                *over = drop_target(target);
                Ok(*over)
            }
            DragState::Idle => Err(DragError::NotDragging),
        }
    }

    /// Dragging → Dropped | Cancelled → Idle
    pub fn drop(&mut self, target: Option<&str>) -> Result<DropOutcome, DragError> {
        let DragState::Dragging { task_id, .. } = std::mem::take(&mut self.state) else {
            return Err(DragError::NotDragging);
        };
        let outcome = match drop_target(target) {
            Some(status) => DropOutcome::Dropped { task_id, status },
            None => DropOutcome::Cancelled { task_id },
        };
        debug!(?outcome, "drag ended");
        Ok(outcome)
    }

    /// Dragging → Cancelled → Idle. Cancelling while idle is a no-op.
    pub fn cancel(&mut self) -> Option<DropOutcome> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging { task_id, .. } => Some(DropOutcome::Cancelled { task_id }),
            DragState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Category, Priority, Task};
    use chrono::NaiveDate;

    fn board() -> Board {
        let task = |id: &str| Task {
            id: Some(id.into()),
            title: format!("Task {id}"),
            description: String::new(),
            due_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            priority: Priority::Medium,
            category: Category::Technical,
            status: Status::Todo,
            assignees: vec![],
            subtasks: vec![],
            created_by: String::new(),
        };
        Board::new(vec![task("t1"), task("t2")])
    }

    #[test]
    fn test_drop_on_column() {
        let b = board();
        let mut drag = DragController::default();
        drag.begin(&b, "t1").unwrap();
        assert_eq!(drag.dragging(), Some("t1"));
        let outcome = drag.drop(Some("inprogress")).unwrap();
        assert_eq!(
            outcome,
            DropOutcome::Dropped {
                task_id: "t1".into(),
                status: Status::InProgress
            }
        );
        assert_eq!(drag.state(), &DragState::Idle);
    }

    #[test]
    fn test_drop_outside_columns_cancels() {
        let b = board();
        let mut drag = DragController::default();
        for target in [None, Some("trash"), Some("")] {
            drag.begin(&b, "t2").unwrap();
            assert_eq!(
                drag.drop(target).unwrap(),
                DropOutcome::Cancelled {
                    task_id: "t2".into()
                }
            );
            assert_eq!(drag.state(), &DragState::Idle);
        }
    }

    #[test]
    fn test_only_one_task_at_a_time() {
        let b = board();
        let mut drag = DragController::default();
        drag.begin(&b, "t1").unwrap();
        assert_eq!(
            drag.begin(&b, "t2"),
            Err(DragError::AlreadyDragging("t1".into()))
        );
        assert_eq!(drag.dragging(), Some("t1"));
    }

    #[test]
    fn test_begin_unknown_task() {
        let mut drag = DragController::default();
        assert_eq!(
            drag.begin(&board(), "zz"),
            Err(DragError::NotFound("zz".into()))
        );
        assert_eq!(drag.state(), &DragState::Idle);
    }

    #[test]
    fn test_hover_highlights_valid_targets_only() {
        let b = board();
        let mut drag = DragController::default();
        assert_eq!(drag.hover(Some("done")), Err(DragError::NotDragging));
        drag.begin(&b, "t1").unwrap();
        assert_eq!(drag.hover(Some("done")).unwrap(), Some(Status::Done));
        assert_eq!(drag.hovered(), Some(Status::Done));
        assert_eq!(drag.hover(Some("sidebar")).unwrap(), None);
        assert_eq!(drag.hovered(), None);
    }

    #[test]
    fn test_cancel() {
        let b = board();
        let mut drag = DragController::default();
        assert_eq!(drag.cancel(), None);
        drag.begin(&b, "t1").unwrap();
        assert_eq!(
            drag.cancel(),
            Some(DropOutcome::Cancelled {
                task_id: "t1".into()
            })
        );
        assert_eq!(drag.drop(Some("done")), Err(DragError::NotDragging));
    }
}
