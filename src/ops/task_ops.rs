use tracing::{info, warn};

use crate::io::store::{Collection, Operation, Store, StoreError, fetch_typed, to_record_value};
use crate::model::board::Board;
use crate::model::session::SessionUser;
use crate::model::task::{Assignee, Category, ParseStatusError, Priority, Status, Subtask, Task};
use crate::ops::validate::{self, ValidationError};

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("task {task} has no subtask #{index}")]
    SubtaskNotFound { task: String, index: usize },
    #[error(transparent)]
    InvalidStatus(#[from] ParseStatusError),
    #[error("guest sessions cannot modify tasks")]
    Forbidden,
}

/// Raw input of the add-task form
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub due_date: String,
    pub priority: Priority,
    pub category: String,
    /// Column pre-selected through a column's "+" control; `todo` if absent
    pub status: Option<Status>,
    pub assignees: Vec<Assignee>,
    pub subtasks: Vec<String>,
}

/// Fields changed by the edit form. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub status: Option<Status>,
    pub assignees: Option<Vec<Assignee>>,
    pub subtasks: Option<Vec<Subtask>>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check the required fields of a draft and build the task it describes.
pub fn validate_draft(draft: &TaskDraft, created_by: &str) -> Result<Task, ValidationError> {
    let mut errors = ValidationError::default();
    validate::require(&mut errors, "title", &draft.title);
    let due_date = validate::parse_due_date(&mut errors, &draft.due_date);
    validate::require(&mut errors, "category", &draft.category);

    match due_date {
        Some(due_date) if errors.is_empty() => Ok(Task {
            id: None,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            due_date,
            priority: draft.priority,
            category: Category::from(draft.category.clone()),
            status: draft.status.unwrap_or_default(),
            assignees: draft.assignees.clone(),
            subtasks: draft
                .subtasks
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(Subtask::new)
                .collect(),
            created_by: created_by.to_string(),
        }),
        _ => Err(errors),
    }
}

/// Apply a patch to a task, validating the fields it touches.
pub fn apply_patch(task: &mut Task, patch: &TaskPatch) -> Result<(), ValidationError> {
    let mut errors = ValidationError::default();
    if let Some(title) = &patch.title
        && validate::require(&mut errors, "title", title)
    {
        task.title = title.trim().to_string();
    }
    if let Some(description) = &patch.description {
        task.description = description.trim().to_string();
    }
    if let Some(due) = &patch.due_date
        && let Some(d) = validate::parse_due_date(&mut errors, due)
    {
        task.due_date = d;
    }
    if let Some(priority) = patch.priority {
        task.priority = priority;
    }
    if let Some(category) = &patch.category
        && validate::require(&mut errors, "category", category)
    {
        task.category = Category::from(category.clone());
    }
    if let Some(status) = patch.status {
        task.status = status;
    }
    if let Some(assignees) = &patch.assignees {
        task.assignees = assignees.clone();
    }
    if let Some(subtasks) = &patch.subtasks {
        task.subtasks = subtasks.clone();
    }
    errors.into_result()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Replace the local mirror with the store's task collection.
pub fn load_tasks(board: &mut Board, store: &mut dyn Store) -> Result<(), StoreError> {
    board.tasks = fetch_tasks(store)?;
    Ok(())
}

/// Fetch every task in store order, with ids filled in from the record keys
pub fn fetch_tasks(store: &mut dyn Store) -> Result<Vec<Task>, StoreError> {
    Ok(fetch_typed::<Task>(store, Collection::Tasks)?
        .into_iter()
        .map(|(key, mut task)| {
            task.id = Some(key);
            task
        })
        .collect())
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// Validate and persist a new task, then append it to the board.
/// Nothing is sent to the store unless validation passes.
pub fn create_task(
    board: &mut Board,
    store: &mut dyn Store,
    user: &SessionUser,
    draft: &TaskDraft,
) -> Result<Task, TaskError> {
    ensure_writable(user)?;
    let mut task = validate_draft(draft, &user.email)?;
    let value = to_record_value(Operation::Create, Collection::Tasks, &task)?;
    let key = store.create(Collection::Tasks, &value)?;
    info!(id = %key, title = %task.title, status = %task.status, "task created");
    task.id = Some(key);
    board.tasks.push(task.clone());
    Ok(task)
}

/// Merge `patch` into a task and re-persist the full record.
pub fn update_task(
    board: &mut Board,
    store: &mut dyn Store,
    user: &SessionUser,
    task_id: &str,
    patch: &TaskPatch,
) -> Result<Task, TaskError> {
    commit(board, store, user, task_id, |task| {
        apply_patch(task, patch)?;
        Ok(())
    })
}

/// Move a task to another column. Moving to its current column is a no-op
/// that does not touch the store; returns whether the status changed.
pub fn move_task(
    board: &mut Board,
    store: &mut dyn Store,
    user: &SessionUser,
    task_id: &str,
    status: Status,
) -> Result<bool, TaskError> {
    ensure_writable(user)?;
    let current = board
        .get(task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?
        .status;
    if current == status {
        return Ok(false);
    }
    commit(board, store, user, task_id, |task| {
        task.status = status;
        Ok(())
    })?;
    info!(id = task_id, from = %current, to = %status, "task moved");
    Ok(true)
}

/// Like [`move_task`], with the column given as its wire name. Unknown
/// names are rejected before anything changes.
pub fn move_task_to(
    board: &mut Board,
    store: &mut dyn Store,
    user: &SessionUser,
    task_id: &str,
    status: &str,
) -> Result<bool, TaskError> {
    let status = status
        .parse::<Status>()
        .inspect_err(|e| warn!("move rejected: {e}"))?;
    move_task(board, store, user, task_id, status)
}

/// Delete a task from the store and the board.
pub fn delete_task(
    board: &mut Board,
    store: &mut dyn Store,
    user: &SessionUser,
    task_id: &str,
) -> Result<Task, TaskError> {
    ensure_writable(user)?;
    let idx = board
        .position(task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    store.delete(Collection::Tasks, task_id)?;
    info!(id = task_id, "task deleted");
    Ok(board.tasks.remove(idx))
}

// ---------------------------------------------------------------------------
// Subtasks
// ---------------------------------------------------------------------------

/// Flip one subtask's completion; the whole task is re-persisted.
/// Returns the new completion state.
pub fn toggle_subtask(
    board: &mut Board,
    store: &mut dyn Store,
    user: &SessionUser,
    task_id: &str,
    index: usize,
) -> Result<bool, TaskError> {
    let task = commit(board, store, user, task_id, |task| {
        let sub = subtask_mut(task, task_id, index)?;
        sub.completed = !sub.completed;
        Ok(())
    })?;
    Ok(task.subtasks[index].completed)
}

/// Append a subtask; returns its index.
pub fn add_subtask(
    board: &mut Board,
    store: &mut dyn Store,
    user: &SessionUser,
    task_id: &str,
    title: &str,
) -> Result<usize, TaskError> {
    let task = commit(board, store, user, task_id, |task| {
        let mut errors = ValidationError::default();
        validate::require(&mut errors, "subtask", title);
        errors.into_result()?;
        task.subtasks.push(Subtask::new(title.trim()));
        Ok(())
    })?;
    Ok(task.subtasks.len() - 1)
}

pub fn remove_subtask(
    board: &mut Board,
    store: &mut dyn Store,
    user: &SessionUser,
    task_id: &str,
    index: usize,
) -> Result<Subtask, TaskError> {
    let mut removed = None;
    commit(board, store, user, task_id, |task| {
        subtask_mut(task, task_id, index)?;
        removed = Some(task.subtasks.remove(index));
        Ok(())
    })?;
    removed.ok_or(TaskError::SubtaskNotFound {
        task: task_id.to_string(),
        index,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ensure_writable(user: &SessionUser) -> Result<(), TaskError> {
    if user.can_write() {
        Ok(())
    } else {
        warn!("guest attempted to modify tasks");
        Err(TaskError::Forbidden)
    }
}

fn subtask_mut<'a>(
    task: &'a mut Task,
    task_id: &str,
    index: usize,
) -> Result<&'a mut Subtask, TaskError> {
    task.subtasks
        .get_mut(index)
        .ok_or_else(|| TaskError::SubtaskNotFound {
            task: task_id.to_string(),
            index,
        })
}

/// Edit a copy of the task, persist the full record, and only then replace
/// the board's copy. A failed edit or store call leaves the board untouched.
fn commit<F>(
    board: &mut Board,
    store: &mut dyn Store,
    user: &SessionUser,
    task_id: &str,
    edit: F,
) -> Result<Task, TaskError>
where
    F: FnOnce(&mut Task) -> Result<(), TaskError>,
{
    ensure_writable(user)?;
    let slot = board
        .get_mut(task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    let mut updated = slot.clone();
    edit(&mut updated)?;
    let value = to_record_value(Operation::Update, Collection::Tasks, &updated)?;
    store.update(Collection::Tasks, task_id, &value)?;
    *slot = updated.clone();
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::local::LocalStore;

    fn user() -> SessionUser {
        SessionUser::new("Anja Schulz", "anja@example.com")
    }

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.into(),
            due_date: "2024-05-01".into(),
            category: "technical".into(),
            ..Default::default()
        }
    }

    fn setup() -> (Board, LocalStore, String) {
        let mut board = Board::default();
        let mut store = LocalStore::in_memory();
        let mut d = draft("Fix bug");
        d.subtasks = vec!["Reproduce".into(), "Patch".into()];
        let task = create_task(&mut board, &mut store, &user(), &d).unwrap();
        let id = task.id.unwrap();
        (board, store, id)
    }

    // --- Create ---

    #[test]
    fn test_create_then_fetch_round_trip() {
        let mut board = Board::default();
        let mut store = LocalStore::in_memory();
        let mut d = draft("Fix bug");
        d.priority = Priority::Low;
        d.description = "Crash on save".into();
        d.assignees = vec![Assignee {
            name: "Eva Fischer".into(),
            color: "#FF7A00".into(),
        }];
        let created = create_task(&mut board, &mut store, &user(), &d).unwrap();

        let mut fresh = Board::default();
        load_tasks(&mut fresh, &mut store).unwrap();
        assert_eq!(fresh.tasks, vec![created.clone()]);
        assert_eq!(created.status, Status::Todo);
        assert_eq!(created.created_by, "anja@example.com");
    }

    #[test]
    fn test_create_in_preselected_column() {
        let mut board = Board::default();
        let mut store = LocalStore::in_memory();
        let mut d = draft("Review");
        d.status = Some(Status::AwaitFeedback);
        create_task(&mut board, &mut store, &user(), &d).unwrap();
        assert_eq!(board.column(Status::AwaitFeedback).count(), 1);
    }

    #[test]
    fn test_load_skips_tasks_that_do_not_decode() {
        let mut board = Board::default();
        let mut store = LocalStore::in_memory();
        let good = create_task(&mut board, &mut store, &user(), &draft("Kept")).unwrap();
        store
            .create(
                Collection::Tasks,
                &serde_json::json!({"title": "Legacy", "dueDate": "", "category": "technical"}),
            )
            .unwrap();

        let mut fresh = Board::default();
        load_tasks(&mut fresh, &mut store).unwrap();
        assert_eq!(fresh.tasks, vec![good]);
    }

    #[test]
    fn test_create_blank_fields_never_reach_store() {
        let mut board = Board::default();
        let mut store = LocalStore::in_memory();
        let d = TaskDraft {
            title: "  ".into(),
            ..Default::default()
        };
        let err = create_task(&mut board, &mut store, &user(), &d).unwrap_err();
        let TaskError::Validation(v) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(v.message_for("title").is_some());
        assert!(v.message_for("dueDate").is_some());
        assert!(v.message_for("category").is_some());
        assert_eq!(store.count(Collection::Tasks), 0);
        assert!(board.is_empty());
    }

    #[test]
    fn test_create_drops_blank_subtasks() {
        let mut board = Board::default();
        let mut store = LocalStore::in_memory();
        let mut d = draft("Plan");
        d.subtasks = vec!["one".into(), "   ".into()];
        let task = create_task(&mut board, &mut store, &user(), &d).unwrap();
        assert_eq!(task.subtasks, vec![Subtask::new("one")]);
    }

    #[test]
    fn test_guest_cannot_create() {
        let mut board = Board::default();
        let mut store = LocalStore::in_memory();
        let err = create_task(&mut board, &mut store, &SessionUser::guest(), &draft("x"))
            .unwrap_err();
        assert!(matches!(err, TaskError::Forbidden));
        assert_eq!(store.count(Collection::Tasks), 0);
    }

    #[test]
    fn test_store_failure_leaves_board_unchanged() {
        let mut board = Board::default();
        let mut store = LocalStore::in_memory();
        store.fail_next(1);
        let err = create_task(&mut board, &mut store, &user(), &draft("x")).unwrap_err();
        assert!(matches!(err, TaskError::Store(_)));
        assert!(board.is_empty());
    }

    // --- Update ---

    #[test]
    fn test_update_merges_patch() {
        let (mut board, mut store, id) = setup();
        let patch = TaskPatch {
            title: Some("Fix crash".into()),
            priority: Some(Priority::Urgent),
            ..Default::default()
        };
        let task = update_task(&mut board, &mut store, &user(), &id, &patch).unwrap();
        assert_eq!(task.title, "Fix crash");
        assert_eq!(task.priority, Priority::Urgent);
        assert_eq!(task.category, Category::Technical);

        let mut fresh = Board::default();
        load_tasks(&mut fresh, &mut store).unwrap();
        assert_eq!(fresh.get(&id).unwrap().title, "Fix crash");
    }

    #[test]
    fn test_update_rejects_blank_title() {
        let (mut board, mut store, id) = setup();
        let patch = TaskPatch {
            title: Some(String::new()),
            ..Default::default()
        };
        let err = update_task(&mut board, &mut store, &user(), &id, &patch).unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
        assert_eq!(board.get(&id).unwrap().title, "Fix bug");
    }

    #[test]
    fn test_update_unknown_task() {
        let (mut board, mut store, _) = setup();
        let err = update_task(&mut board, &mut store, &user(), "nope", &TaskPatch::default())
            .unwrap_err();
        assert!(matches!(err, TaskError::NotFound(id) if id == "nope"));
    }

    // --- Move ---

    #[test]
    fn test_move_to_every_column() {
        let (mut board, mut store, id) = setup();
        for status in Status::ALL {
            move_task(&mut board, &mut store, &user(), &id, status).unwrap();
            let columns_containing: Vec<Status> = Status::ALL
                .into_iter()
                .filter(|s| board.column(*s).any(|t| t.id.as_deref() == Some(id.as_str())))
                .collect();
            assert_eq!(columns_containing, vec![status]);
        }
    }

    #[test]
    fn test_move_invalid_status_is_rejected() {
        let (mut board, mut store, id) = setup();
        let err = move_task_to(&mut board, &mut store, &user(), &id, "review").unwrap_err();
        assert!(matches!(err, TaskError::InvalidStatus(_)));
        assert_eq!(board.get(&id).unwrap().status, Status::Todo);
    }

    #[test]
    fn test_move_same_column_skips_store() {
        let (mut board, mut store, id) = setup();
        store.fail_next(1);
        let changed = move_task(&mut board, &mut store, &user(), &id, Status::Todo).unwrap();
        assert!(!changed);
    }

    #[test]
    fn test_move_store_failure_keeps_status() {
        let (mut board, mut store, id) = setup();
        store.fail_next(1);
        assert!(move_task(&mut board, &mut store, &user(), &id, Status::Done).is_err());
        assert_eq!(board.get(&id).unwrap().status, Status::Todo);
    }

    // --- Delete ---

    #[test]
    fn test_delete_removes_everywhere() {
        let (mut board, mut store, id) = setup();
        let removed = delete_task(&mut board, &mut store, &user(), &id).unwrap();
        assert_eq!(removed.title, "Fix bug");
        assert!(board.get(&id).is_none());
        assert!(store.fetch_all(Collection::Tasks).unwrap().is_empty());
    }

    #[test]
    fn test_guest_cannot_delete() {
        let (mut board, mut store, id) = setup();
        let err = delete_task(&mut board, &mut store, &SessionUser::guest(), &id).unwrap_err();
        assert!(matches!(err, TaskError::Forbidden));
        assert_eq!(board.len(), 1);
    }

    // --- Subtasks ---

    #[test]
    fn test_toggle_subtask_persists_full_list() {
        let (mut board, mut store, id) = setup();
        assert!(toggle_subtask(&mut board, &mut store, &user(), &id, 1).unwrap());
        let rec = store.fetch_all(Collection::Tasks).unwrap().remove(0);
        assert_eq!(
            rec.value["subtasks"],
            serde_json::json!([
                {"title": "Reproduce", "completed": false},
                {"title": "Patch", "completed": true}
            ])
        );
        assert!(!toggle_subtask(&mut board, &mut store, &user(), &id, 1).unwrap());
    }

    #[test]
    fn test_toggle_subtask_out_of_range() {
        let (mut board, mut store, id) = setup();
        let err = toggle_subtask(&mut board, &mut store, &user(), &id, 5).unwrap_err();
        assert!(matches!(err, TaskError::SubtaskNotFound { index: 5, .. }));
    }

    #[test]
    fn test_add_and_remove_subtask() {
        let (mut board, mut store, id) = setup();
        let idx = add_subtask(&mut board, &mut store, &user(), &id, " Write test ").unwrap();
        assert_eq!(idx, 2);
        assert_eq!(board.get(&id).unwrap().subtasks[2].title, "Write test");
        assert!(add_subtask(&mut board, &mut store, &user(), &id, "").is_err());

        let removed = remove_subtask(&mut board, &mut store, &user(), &id, 0).unwrap();
        assert_eq!(removed.title, "Reproduce");
        assert_eq!(board.get(&id).unwrap().subtasks.len(), 2);
    }
}
