use crate::model::session::SessionUser;
use crate::ops::summary::BoardSummary;

use super::escape_html;

fn tile(class: &str, count: usize, label: &str) -> String {
    format!("<div class=\"tile {class}\"><span class=\"count\">{count}</span><span>{label}</span></div>")
}

/// Summary page: per-column counts, urgent tasks with the next deadline,
/// and the greeting for the signed-in user. Guests are greeted without a name.
pub fn render_summary(summary: &BoardSummary, user: &SessionUser, greeting: &str) -> String {
    let deadline = match summary.upcoming_deadline {
        Some(d) => d.format("%B %-d, %Y").to_string(),
        None => "No upcoming deadline".to_string(),
    };
    let mut out = String::from("<div class=\"summary\">");
    out.push_str(&tile("todo", summary.todo, "To-do"));
    out.push_str(&tile("done", summary.done, "Done"));
    out.push_str(&format!(
        "<div class=\"tile urgent\"><span class=\"count\">{}</span><span>Urgent</span><span class=\"deadline\">{deadline}</span><span>Upcoming Deadline</span></div>",
        summary.urgent
    ));
    out.push_str(&tile("total", summary.total, "Tasks in Board"));
    out.push_str(&tile("inprogress", summary.in_progress, "Tasks in Progress"));
    out.push_str(&tile("awaitfeedback", summary.await_feedback, "Awaiting Feedback"));
    if user.guest {
        out.push_str(&format!("<h2 class=\"greeting\">{greeting}!</h2>"));
    } else {
        out.push_str(&format!(
            "<h2 class=\"greeting\">{greeting},</h2><span class=\"greeting-name\">{}</span>",
            escape_html(&user.name)
        ));
    }
    out.push_str("</div>");
    out
}
