//! Markup fragments for the board, task detail, assignee picker, contact
//! directory and summary page. Every function is pure: it reads only the
//! state passed in and escapes all user text.

pub mod assignees;
pub mod board;
pub mod contacts;
pub mod summary;
pub mod task_detail;

use chrono::NaiveDate;

use crate::model::task::{Category, Priority};

pub const NO_CONTACTS: &str = "No contacts available";
pub const NO_ASSIGNEES: &str = "No assignees";
pub const NO_SUBTASKS: &str = "No subtasks";

/// Escape text for use in element content and quoted attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `DD/MM/YYYY`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Round badge with a person's initials on their color
pub(crate) fn badge(initials: &str, color: &str) -> String {
    format!(
        "<span class=\"badge\" style=\"background-color:{}\">{}</span>",
        escape_html(color),
        escape_html(initials)
    )
}

pub(crate) fn priority_icon(priority: Priority) -> String {
    format!(
        "<img class=\"priority-icon\" src=\"./assets/img/prio-{p}.svg\" alt=\"{p}\">",
        p = priority.as_str()
    )
}

pub(crate) fn category_tag(category: &Category) -> String {
    let class = match category {
        Category::Technical | Category::UserStory => category.as_str(),
        Category::Other(_) => "other",
    };
    format!(
        "<span class=\"category category-{class}\">{}</span>",
        escape_html(category.label())
    )
}

pub(crate) fn placeholder(text: &str) -> String {
    format!("<p class=\"placeholder\">{}</p>", escape_html(text))
}
