//! Application state and the event dispatcher that a front end drives.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::io::store::{Store, StoreError};
use crate::model::board::Board;
use crate::model::config::UiConfig;
use crate::model::session::SessionUser;
use crate::model::task::{Assignee, Status, Task};
use crate::ops::contact_ops::{self, ContactDirectory, ContactDraft, ContactError, ContactPatch};
use crate::ops::drag::{DragController, DragError, DropOutcome};
use crate::ops::summary::{self, BoardSummary};
use crate::ops::task_ops::{self, TaskDraft, TaskError, TaskPatch};
use crate::render;

/// Error type for dispatched events
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Contact(#[from] ContactError),
    #[error(transparent)]
    Drag(#[from] DragError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A user interaction
#[derive(Debug, Clone)]
pub enum Event {
    /// Re-fetch tasks and contacts from the store
    Refresh,
    /// Open the add-task form, optionally pre-selecting a column
    OpenAddTask { column: Option<Status> },
    OpenTask { task_id: String },
    CloseTask,
    /// Check or uncheck a contact in the assign-to dropdown
    ToggleAssignee { contact_id: String },
    /// Submit the add-task form. Without explicit assignees the contacts
    /// checked in the dropdown are used.
    SubmitTask(TaskDraft),
    SaveTask { task_id: String, patch: TaskPatch },
    DeleteTask { task_id: String },
    /// Move by column name, as the edit form's status select does
    MoveTask { task_id: String, status: String },
    ToggleSubtask { task_id: String, index: usize },
    AddSubtask { task_id: String, title: String },
    RemoveSubtask { task_id: String, index: usize },
    DragStart { task_id: String },
    DragOver { target: Option<String> },
    Drop { target: Option<String> },
    DragCancel,
    Search(String),
    AddContact(ContactDraft),
    EditContact { contact_id: String, patch: ContactPatch },
    DeleteContact { contact_id: String },
    SelectContact { contact_id: String },
}

/// A part of the interface that needs redrawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Board,
    TaskDetail,
    TaskForm,
    AssigneePicker,
    ContactList,
    ContactDetail,
    Summary,
}

/// What changed as a result of an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Redraw(Vec<Region>),
}

impl Transition {
    fn redraw(regions: &[Region]) -> Self {
        Transition::Redraw(regions.to_vec())
    }

    pub fn redraws(&self, region: Region) -> bool {
        match self {
            Transition::Unchanged => false,
            Transition::Redraw(regions) => regions.contains(&region),
        }
    }
}

/// All client state: the board and contact mirrors, drag and form state,
/// the session user and the store they persist to.
pub struct App {
    pub board: Board,
    pub contacts: ContactDirectory,
    pub drag: DragController,
    /// Contact ids checked in the assign-to dropdown
    pub selected_assignees: Vec<String>,
    pub search: String,
    pub user: SessionUser,
    /// Column pre-selected for the next submitted task
    pub pending_column: Option<Status>,
    /// Task shown in the detail modal
    pub open_task: Option<String>,
    palette: Vec<String>,
    description_width: usize,
    store: Box<dyn Store>,
}

impl App {
    pub fn new(store: Box<dyn Store>, user: SessionUser, ui: &UiConfig) -> Self {
        App {
            board: Board::default(),
            contacts: ContactDirectory::default(),
            drag: DragController::default(),
            selected_assignees: Vec::new(),
            search: String::new(),
            user,
            pending_column: None,
            open_task: None,
            palette: ui.palette.clone(),
            description_width: ui.description_width,
            store,
        }
    }

    /// Fetch both collections
    pub fn load(&mut self) -> Result<(), StoreError> {
        let tasks = task_ops::fetch_tasks(&mut *self.store)?;
        let contacts = contact_ops::fetch_contacts(&mut *self.store)?;
        self.board.tasks = tasks;
        self.contacts.replace(contacts);
        if let Some(id) = &self.open_task
            && self.board.get(id).is_none()
        {
            self.open_task = None;
        }
        self.selected_assignees
            .retain(|id| self.contacts.get(id).is_some());
        debug!(
            tasks = self.board.len(),
            contacts = self.contacts.contacts.len(),
            "state loaded"
        );
        Ok(())
    }

    /// Assignees for the contacts checked in the dropdown, in directory order
    pub fn checked_assignees(&self) -> Vec<Assignee> {
        self.contacts
            .contacts
            .iter()
            .filter(|c| {
                c.id
                    .as_deref()
                    .is_some_and(|id| self.selected_assignees.iter().any(|s| s == id))
            })
            .map(|c| c.as_assignee())
            .collect()
    }

    pub fn summary(&self, today: NaiveDate) -> BoardSummary {
        summary::summarize(&self.board, today)
    }

    /// Apply one event and report which regions changed.
    pub fn handle(&mut self, event: Event) -> Result<Transition, AppError> {
        let store = &mut *self.store;
        let transition = match event {
            Event::Refresh => {
                self.load()?;
                Transition::redraw(&[
                    Region::Board,
                    Region::TaskDetail,
                    Region::ContactList,
                    Region::ContactDetail,
                    Region::Summary,
                ])
            }
            Event::OpenAddTask { column } => {
                self.pending_column = column;
                self.selected_assignees.clear();
                Transition::redraw(&[Region::TaskForm, Region::AssigneePicker])
            }
            Event::OpenTask { task_id } => {
                if self.board.get(&task_id).is_none() {
                    return Err(TaskError::NotFound(task_id).into());
                }
                self.open_task = Some(task_id);
                Transition::redraw(&[Region::TaskDetail])
            }
            Event::CloseTask => match self.open_task.take() {
                Some(_) => Transition::redraw(&[Region::TaskDetail]),
                None => Transition::Unchanged,
            },
            Event::ToggleAssignee { contact_id } => {
                if self.contacts.get(&contact_id).is_none() {
                    return Err(ContactError::NotFound(contact_id).into());
                }
                if let Some(pos) = self.selected_assignees.iter().position(|id| *id == contact_id)
                {
                    self.selected_assignees.remove(pos);
                } else {
                    self.selected_assignees.push(contact_id);
                }
                Transition::redraw(&[Region::AssigneePicker])
            }
            Event::SubmitTask(mut draft) => {
                if draft.assignees.is_empty() {
                    draft.assignees = self.checked_assignees();
                }
                draft.status = draft.status.or(self.pending_column);
                let store = &mut *self.store;
                task_ops::create_task(&mut self.board, store, &self.user, &draft)?;
                self.pending_column = None;
                self.selected_assignees.clear();
                Transition::redraw(&[
                    Region::Board,
                    Region::TaskForm,
                    Region::AssigneePicker,
                    Region::Summary,
                ])
            }
            Event::SaveTask { task_id, patch } => {
                task_ops::update_task(&mut self.board, store, &self.user, &task_id, &patch)?;
                Transition::redraw(&[Region::Board, Region::TaskDetail, Region::Summary])
            }
            Event::DeleteTask { task_id } => {
                task_ops::delete_task(&mut self.board, store, &self.user, &task_id)?;
                if self.open_task.as_deref() == Some(task_id.as_str()) {
                    self.open_task = None;
                }
                Transition::redraw(&[Region::Board, Region::TaskDetail, Region::Summary])
            }
            Event::MoveTask { task_id, status } => {
                let moved =
                    task_ops::move_task_to(&mut self.board, store, &self.user, &task_id, &status)?;
                if moved {
                    Transition::redraw(&[Region::Board, Region::TaskDetail, Region::Summary])
                } else {
                    Transition::Unchanged
                }
            }
            Event::ToggleSubtask { task_id, index } => {
                task_ops::toggle_subtask(&mut self.board, store, &self.user, &task_id, index)?;
                Transition::redraw(&[Region::Board, Region::TaskDetail])
            }
            Event::AddSubtask { task_id, title } => {
                task_ops::add_subtask(&mut self.board, store, &self.user, &task_id, &title)?;
                Transition::redraw(&[Region::Board, Region::TaskDetail])
            }
            Event::RemoveSubtask { task_id, index } => {
                task_ops::remove_subtask(&mut self.board, store, &self.user, &task_id, index)?;
                Transition::redraw(&[Region::Board, Region::TaskDetail])
            }
            Event::DragStart { task_id } => {
                self.drag.begin(&self.board, &task_id)?;
                Transition::redraw(&[Region::Board])
            }
            Event::DragOver { target } => {
                let before = self.drag.hovered();
                let after = self.drag.hover(target.as_deref())?;
                if before == after {
                    Transition::Unchanged
                } else {
                    Transition::redraw(&[Region::Board])
                }
            }
            Event::Drop { target } => match self.drag.drop(target.as_deref())? {
                DropOutcome::Dropped { task_id, status } => {
                    task_ops::move_task(&mut self.board, store, &self.user, &task_id, status)?;
                    Transition::redraw(&[Region::Board, Region::Summary])
                }
                DropOutcome::Cancelled { task_id } => {
                    info!(task_id, "drop outside columns, task left in place");
                    Transition::redraw(&[Region::Board])
                }
            },
            Event::DragCancel => match self.drag.cancel() {
                Some(_) => Transition::redraw(&[Region::Board]),
                None => Transition::Unchanged,
            },
            Event::Search(query) => {
                self.search = query;
                Transition::redraw(&[Region::Board])
            }
            Event::AddContact(draft) => {
                self.contacts
                    .add_contact(store, &self.user, &draft, &self.palette)?;
                Transition::redraw(&[Region::ContactList, Region::AssigneePicker])
            }
            Event::EditContact { contact_id, patch } => {
                self.contacts
                    .edit_contact(store, &self.user, &contact_id, &patch)?;
                Transition::redraw(&[
                    Region::ContactList,
                    Region::ContactDetail,
                    Region::AssigneePicker,
                ])
            }
            Event::DeleteContact { contact_id } => {
                self.contacts.delete_contact(store, &self.user, &contact_id)?;
                self.selected_assignees.retain(|id| *id != contact_id);
                Transition::redraw(&[
                    Region::ContactList,
                    Region::ContactDetail,
                    Region::AssigneePicker,
                ])
            }
            Event::SelectContact { contact_id } => {
                self.contacts.select(&contact_id)?;
                Transition::redraw(&[Region::ContactList, Region::ContactDetail])
            }
        };
        Ok(transition)
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    pub fn render_board(&self) -> String {
        render::board::render_board(
            &self.board,
            &self.search,
            self.drag.hovered(),
            self.description_width,
        )
    }

    /// Detail modal of the open task; empty when none is open
    pub fn render_task_detail(&self) -> String {
        self.open_task
            .as_deref()
            .and_then(|id| self.board.get(id))
            .map(render::task_detail::render_task_detail)
            .unwrap_or_default()
    }

    pub fn render_assignee_picker(&self) -> String {
        let contacts = &self.contacts.contacts;
        format!(
            "{}{}",
            render::assignees::render_assignee_dropdown(contacts, &self.selected_assignees),
            render::assignees::render_selected_badges(contacts, &self.selected_assignees)
        )
    }

    pub fn render_contact_list(&self) -> String {
        let selected = self.contacts.selected().and_then(|c| c.id.as_deref());
        render::contacts::render_contact_list(&self.contacts.contacts, selected)
    }

    pub fn render_contact_detail(&self) -> String {
        render::contacts::render_contact_detail(self.contacts.selected())
    }

    pub fn render_summary(&self, today: NaiveDate, hour: u32) -> String {
        render::summary::render_summary(&self.summary(today), &self.user, summary::greeting(hour))
    }

    /// Task by id, for front ends that show single records
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.board.get(task_id)
    }
}
