use serde::Serialize;

use crate::model::contact::Contact;
use crate::model::session::SessionUser;
use crate::model::task::{Status, Task};
use crate::ops::summary::BoardSummary;
use crate::render::format_date;
use crate::util::unicode::pad_to_width;

const TITLE_WIDTH: usize = 32;
const ID_WIDTH: usize = 12;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson<'a> {
    pub id: &'a str,
    #[serde(flatten)]
    pub task: &'a Task,
}

#[derive(Serialize)]
pub struct ContactJson<'a> {
    pub id: &'a str,
    #[serde(flatten)]
    pub contact: &'a Contact,
}

#[derive(Serialize)]
pub struct ColumnJson<'a> {
    pub status: Status,
    pub label: &'static str,
    pub tasks: Vec<TaskJson<'a>>,
}

#[derive(Serialize)]
pub struct LetterGroupJson<'a> {
    pub letter: String,
    pub contacts: Vec<ContactJson<'a>>,
}

#[derive(Serialize)]
pub struct CreatedJson<'a> {
    pub id: &'a str,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson<'_> {
    TaskJson {
        id: task.id.as_deref().unwrap_or_default(),
        task,
    }
}

pub fn contact_to_json(contact: &Contact) -> ContactJson<'_> {
    ContactJson {
        id: contact.id.as_deref().unwrap_or_default(),
        contact,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// One board row: id, title, priority, due date and subtask progress
pub fn format_task_line(task: &Task) -> String {
    let (done, total) = task.subtask_progress();
    format!(
        "{} {} {} {}  {done}/{total}",
        pad_to_width(task.id.as_deref().unwrap_or("-"), ID_WIDTH),
        pad_to_width(&task.title, TITLE_WIDTH),
        pad_to_width(task.priority.as_str(), 6),
        format_date(task.due_date)
    )
}

pub fn format_column_header(status: Status, count: usize) -> String {
    format!("== {} ({}) ==", status.label(), count)
}

pub fn format_task_detail(task: &Task) -> Vec<String> {
    let mut lines = vec![
        format!("{} {}", task.id.as_deref().unwrap_or("-"), task.title),
        format!("category: {}", task.category.label()),
        format!("status: {}", task.status.label()),
        format!("priority: {}", task.priority.label()),
        format!("due: {}", format_date(task.due_date)),
    ];
    if !task.created_by.is_empty() {
        lines.push(format!("created by: {}", task.created_by));
    }
    if !task.description.is_empty() {
        lines.push("description:".to_string());
        for line in task.description.lines() {
            lines.push(format!("  {}", line));
        }
    }
    if task.assignees.is_empty() {
        lines.push("assignees: none".to_string());
    } else {
        let names: Vec<&str> = task.assignees.iter().map(|a| a.name.as_str()).collect();
        lines.push(format!("assignees: {}", names.join(", ")));
    }
    if !task.subtasks.is_empty() {
        lines.push(String::new());
        lines.push("subtasks:".to_string());
        for (i, sub) in task.subtasks.iter().enumerate() {
            let mark = if sub.completed { 'x' } else { ' ' };
            lines.push(format!("  {}. [{}] {}", i + 1, mark, sub.title));
        }
    }
    lines
}

pub fn format_contact_line(contact: &Contact) -> String {
    format!(
        "  {} {} {} {}",
        pad_to_width(contact.id.as_deref().unwrap_or("-"), ID_WIDTH),
        pad_to_width(&contact.initials(), 2),
        pad_to_width(&contact.name, TITLE_WIDTH),
        contact.email
    )
}

pub fn format_contact_detail(contact: &Contact) -> Vec<String> {
    vec![
        format!("{} {}", contact.id.as_deref().unwrap_or("-"), contact.name),
        format!("email: {}", contact.email),
        format!(
            "phone: {}",
            if contact.phone.is_empty() {
                "-"
            } else {
                contact.phone.as_str()
            }
        ),
        format!("color: {}", contact.color),
    ]
}

pub fn format_user(user: &SessionUser) -> String {
    if user.guest {
        "Guest (read-only)".to_string()
    } else {
        format!("{} <{}>", user.name, user.email)
    }
}

pub fn format_summary(summary: &BoardSummary) -> Vec<String> {
    let deadline = summary
        .upcoming_deadline
        .map(format_date)
        .unwrap_or_else(|| "none".to_string());
    vec![
        format!("{} {}", pad_to_width("To do", 18), summary.todo),
        format!("{} {}", pad_to_width("In progress", 18), summary.in_progress),
        format!("{} {}", pad_to_width("Await feedback", 18), summary.await_feedback),
        format!("{} {}", pad_to_width("Done", 18), summary.done),
        format!("{} {}", pad_to_width("Tasks in board", 18), summary.total),
        format!("{} {} (next deadline: {deadline})", pad_to_width("Urgent", 18), summary.urgent),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Assignee, Category, Priority, Subtask};
    use chrono::NaiveDate;

    fn task() -> Task {
        Task {
            id: Some("-J00000001".into()),
            title: "Fix bug".into(),
            description: "line one\nline two".into(),
            due_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            priority: Priority::Low,
            category: Category::Technical,
            status: Status::Todo,
            assignees: vec![Assignee {
                name: "Eva Fischer".into(),
                color: "#1FD7C1".into(),
            }],
            subtasks: vec![Subtask::new("Reproduce")],
            created_by: "anja@example.com".into(),
        }
    }

    #[test]
    fn task_line_is_column_aligned() {
        let line = format_task_line(&task());
        assert!(line.starts_with("-J00000001   Fix bug "));
        assert!(line.ends_with("low    01/05/2024  0/1"));
    }

    #[test]
    fn task_detail_lists_everything() {
        let lines = format_task_detail(&task());
        assert_eq!(lines[0], "-J00000001 Fix bug");
        assert!(lines.contains(&"category: Technical Task".to_string()));
        assert!(lines.contains(&"due: 01/05/2024".to_string()));
        assert!(lines.contains(&"  line two".to_string()));
        assert!(lines.contains(&"assignees: Eva Fischer".to_string()));
        assert_eq!(lines.last().unwrap(), "  1. [ ] Reproduce");
    }

    #[test]
    fn json_flattens_record_with_id() {
        let t = task();
        let v = serde_json::to_value(task_to_json(&t)).unwrap();
        assert_eq!(v["id"], "-J00000001");
        assert_eq!(v["dueDate"], "2024-05-01");
        assert_eq!(v["status"], "todo");
    }
}
