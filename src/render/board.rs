use crate::model::board::Board;
use crate::model::contact::initials;
use crate::model::task::{Assignee, Status, Task};
use crate::util::unicode::truncate_to_width;

use super::{NO_ASSIGNEES, badge, category_tag, escape_html, placeholder, priority_icon};

/// Badges shown on a card before collapsing the rest into `+N`
const CARD_BADGE_LIMIT: usize = 3;

/// All four columns. `hovered` is the drop target to highlight during a
/// drag; `query` filters cards by title and description.
pub fn render_board(
    board: &Board,
    query: &str,
    hovered: Option<Status>,
    description_width: usize,
) -> String {
    Status::ALL
        .iter()
        .map(|&status| {
            render_column(board, status, query, hovered == Some(status), description_width)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One column with its cards, or a "No tasks …" placeholder
pub fn render_column(
    board: &Board,
    status: Status,
    query: &str,
    highlighted: bool,
    description_width: usize,
) -> String {
    let cards: Vec<String> = board
        .column_matching(status, query)
        .map(|t| render_card(t, description_width))
        .collect();
    let body = if cards.is_empty() {
        placeholder(&format!("No tasks {}", status.label()))
    } else {
        cards.join("")
    };
    let class = if highlighted {
        "column highlight"
    } else {
        "column"
    };
    format!(
        "<section class=\"{class}\" data-status=\"{}\"><h2>{}</h2><div class=\"cards\">{body}</div></section>",
        status.as_str(),
        status.label()
    )
}

/// A draggable board card
pub fn render_card(task: &Task, description_width: usize) -> String {
    let mut out = format!(
        "<div class=\"card\" draggable=\"true\" data-id=\"{}\">",
        escape_html(task.id.as_deref().unwrap_or_default())
    );
    out.push_str(&category_tag(&task.category));
    out.push_str(&format!(
        "<h3 class=\"card-title\">{}</h3>",
        escape_html(&task.title)
    ));
    if !task.description.is_empty() {
        out.push_str(&format!(
            "<p class=\"card-description\">{}</p>",
            escape_html(&truncate_to_width(&task.description, description_width))
        ));
    }
    out.push_str(&subtask_progress(task));
    out.push_str(&format!(
        "<div class=\"card-footer\"><div class=\"card-assignees\">{}</div>{}</div></div>",
        card_badges(&task.assignees),
        priority_icon(task.priority)
    ));
    out
}

fn subtask_progress(task: &Task) -> String {
    let (done, total) = task.subtask_progress();
    if total == 0 {
        return String::new();
    }
    format!(
        "<div class=\"subtask-progress\"><div class=\"progress\"><div class=\"progress-bar\" style=\"width:{}%\"></div></div><span>{done}/{total} Subtasks</span></div>",
        done * 100 / total
    )
}

fn card_badges(assignees: &[Assignee]) -> String {
    if assignees.is_empty() {
        return placeholder(NO_ASSIGNEES);
    }
    let mut out: String = assignees
        .iter()
        .take(CARD_BADGE_LIMIT)
        .map(|a| badge(&initials(&a.name), &a.color))
        .collect();
    if assignees.len() > CARD_BADGE_LIMIT {
        out.push_str(&format!(
            "<span class=\"badge badge-more\">+{}</span>",
            assignees.len() - CARD_BADGE_LIMIT
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Priority, Subtask};
    use crate::ops::task_ops::{TaskDraft, validate_draft};
    use insta::assert_snapshot;

    fn fix_bug() -> Task {
        let draft = TaskDraft {
            title: "Fix bug".into(),
            due_date: "2024-05-01".into(),
            category: "technical".into(),
            priority: Priority::Low,
            ..Default::default()
        };
        let mut task = validate_draft(&draft, "anja@example.com").unwrap();
        task.id = Some("t1".into());
        task
    }

    fn column_markup(board: &str, status: Status) -> &str {
        let start = board
            .find(&format!("data-status=\"{}\"", status.as_str()))
            .unwrap();
        let end = board[start..]
            .find("</section>")
            .map_or(board.len(), |e| start + e);
        &board[start..end]
    }

    #[test]
    fn new_low_priority_task_lands_in_todo() {
        let board = Board::new(vec![fix_bug()]);
        let out = render_board(&board, "", None, 48);

        let todo = column_markup(&out, Status::Todo);
        assert!(todo.contains("<h3 class=\"card-title\">Fix bug</h3>"));
        assert!(todo.contains("prio-low.svg"));
        assert!(todo.contains(NO_ASSIGNEES));
        assert!(todo.contains("Technical Task"));

        for status in [Status::InProgress, Status::AwaitFeedback, Status::Done] {
            let col = column_markup(&out, status);
            assert!(!col.contains("Fix bug"));
            assert!(col.contains(&format!("No tasks {}", status.label())));
        }
    }

    #[test]
    fn card_fragment() {
        assert_snapshot!(
            render_card(&fix_bug(), 48),
            @r#"<div class="card" draggable="true" data-id="t1"><span class="category category-technical">Technical Task</span><h3 class="card-title">Fix bug</h3><div class="card-footer"><div class="card-assignees"><p class="placeholder">No assignees</p></div><img class="priority-icon" src="./assets/img/prio-low.svg" alt="low"></div></div>"#
        );
    }

    #[test]
    fn card_shows_progress_and_truncated_description() {
        let mut task = fix_bug();
        task.description = "Reproduce the crash on the login page first".into();
        task.subtasks = vec![Subtask::new("a"), Subtask::new("b")];
        task.subtasks[0].completed = true;
        let out = render_card(&task, 15);
        assert!(out.contains("<p class=\"card-description\">Reproduce the\u{2026}</p>"));
        assert!(out.contains("style=\"width:50%\""));
        assert!(out.contains("<span>1/2 Subtasks</span>"));
    }

    #[test]
    fn card_collapses_extra_badges() {
        let mut task = fix_bug();
        task.assignees = ["Anja Schulz", "Benedikt Ziegler", "David Eisenberg", "Eva Fischer", "Tom Kraus"]
            .iter()
            .map(|n| Assignee {
                name: n.to_string(),
                color: "#FF7A00".into(),
            })
            .collect();
        let out = render_card(&task, 48);
        assert!(out.contains(">AS<"));
        assert!(out.contains(">DE<"));
        assert!(!out.contains(">EF<"));
        assert!(out.contains("<span class=\"badge badge-more\">+2</span>"));
        assert!(!out.contains(NO_ASSIGNEES));
    }

    #[test]
    fn user_text_is_escaped() {
        let mut task = fix_bug();
        task.title = "<script>alert(1)</script>".into();
        let out = render_card(&task, 48);
        assert!(out.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!out.contains("<script>"));
    }

    #[test]
    fn search_and_highlight() {
        let mut other = fix_bug();
        other.id = Some("t2".into());
        other.title = "Write docs".into();
        let board = Board::new(vec![fix_bug(), other]);

        let out = render_column(&board, Status::Todo, "DOCS", true, 48);
        assert!(out.starts_with("<section class=\"column highlight\" data-status=\"todo\">"));
        assert!(out.contains("Write docs"));
        assert!(!out.contains("Fix bug"));

        let out = render_board(&board, "nothing", Some(Status::Done), 48);
        assert!(out.contains("No tasks To do"));
        assert!(out.contains("<section class=\"column highlight\" data-status=\"done\">"));
    }
}
