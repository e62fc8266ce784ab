use crate::model::contact::initials;
use crate::model::task::Task;

use super::{
    NO_ASSIGNEES, NO_SUBTASKS, badge, category_tag, escape_html, format_date, placeholder,
    priority_icon,
};

/// Task detail modal: everything on the card plus the due date, assignee
/// names and the subtask checklist.
pub fn render_task_detail(task: &Task) -> String {
    let mut out = format!(
        "<div class=\"task-detail\" data-id=\"{}\">",
        escape_html(task.id.as_deref().unwrap_or_default())
    );
    out.push_str(&category_tag(&task.category));
    out.push_str(&format!("<h2>{}</h2>", escape_html(&task.title)));
    if !task.description.is_empty() {
        out.push_str(&format!(
            "<p class=\"description\">{}</p>",
            escape_html(&task.description)
        ));
    }
    out.push_str(&format!(
        "<dl><dt>Due date:</dt><dd>{}</dd><dt>Priority:</dt><dd>{} {}</dd></dl>",
        format_date(task.due_date),
        task.priority.label(),
        priority_icon(task.priority)
    ));

    out.push_str("<h4>Assigned To:</h4>");
    if task.assignees.is_empty() {
        out.push_str(&placeholder(NO_ASSIGNEES));
    } else {
        out.push_str("<ul class=\"assignees\">");
        for a in &task.assignees {
            out.push_str(&format!(
                "<li>{}<span>{}</span></li>",
                badge(&initials(&a.name), &a.color),
                escape_html(&a.name)
            ));
        }
        out.push_str("</ul>");
    }

    out.push_str("<h4>Subtasks</h4>");
    if task.subtasks.is_empty() {
        out.push_str(&placeholder(NO_SUBTASKS));
    } else {
        out.push_str("<ul class=\"subtasks\">");
        for (i, s) in task.subtasks.iter().enumerate() {
            let checked = if s.completed { " checked" } else { "" };
            out.push_str(&format!(
                "<li><input type=\"checkbox\" data-index=\"{i}\"{checked}><span>{}</span></li>",
                escape_html(&s.title)
            ));
        }
        out.push_str("</ul>");
    }
    out.push_str("</div>");
    out
}
