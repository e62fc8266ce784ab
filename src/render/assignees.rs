use crate::model::contact::Contact;

use super::{NO_CONTACTS, badge, escape_html, placeholder};

fn is_selected(contact: &Contact, selected: &[String]) -> bool {
    contact
        .id
        .as_deref()
        .is_some_and(|id| selected.iter().any(|s| s == id))
}

/// Assign-to dropdown of the task form. `selected` holds contact ids.
pub fn render_assignee_dropdown(contacts: &[Contact], selected: &[String]) -> String {
    if contacts.is_empty() {
        return placeholder(NO_CONTACTS);
    }
    let mut sorted: Vec<&Contact> = contacts.iter().collect();
    sorted.sort_by_key(|c| c.name.to_lowercase());

    let mut out = String::from("<ul class=\"assignee-dropdown\">");
    for c in sorted {
        let (class, checked) = if is_selected(c, selected) {
            ("assignee-option selected", " checked")
        } else {
            ("assignee-option", "")
        };
        out.push_str(&format!(
            "<li class=\"{class}\" data-id=\"{}\">{}<span>{}</span><input type=\"checkbox\"{checked}></li>",
            escape_html(c.id.as_deref().unwrap_or_default()),
            badge(&c.initials(), &c.color),
            escape_html(&c.name)
        ));
    }
    out.push_str("</ul>");
    out
}

/// Badge row under the dropdown showing who is currently selected
pub fn render_selected_badges(contacts: &[Contact], selected: &[String]) -> String {
    let badges: String = contacts
        .iter()
        .filter(|c| is_selected(c, selected))
        .map(|c| badge(&c.initials(), &c.color))
        .collect();
    format!("<div class=\"selected-assignees\">{badges}</div>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn contact(id: &str, name: &str, color: &str) -> Contact {
        Contact {
            id: Some(id.into()),
            name: name.into(),
            email: String::new(),
            phone: String::new(),
            color: color.into(),
        }
    }

    fn contacts() -> Vec<Contact> {
        vec![
            contact("c2", "tom Kraus", "#FF7A00"),
            contact("c1", "Anja Schulz", "#9327FF"),
        ]
    }

    #[test]
    fn dropdown_without_contacts() {
        assert_snapshot!(
            render_assignee_dropdown(&[], &[]),
            @r#"<p class="placeholder">No contacts available</p>"#
        );
    }

    #[test]
    fn dropdown_sorted_with_checked_state() {
        let out = render_assignee_dropdown(&contacts(), &["c2".to_string()]);
        let anja = out.find("Anja Schulz").unwrap();
        let tom = out.find("tom Kraus").unwrap();
        assert!(anja < tom);
        assert!(out.contains(
            "<li class=\"assignee-option selected\" data-id=\"c2\"><span class=\"badge\" style=\"background-color:#FF7A00\">TK</span><span>tom Kraus</span><input type=\"checkbox\" checked></li>"
        ));
        assert!(out.contains("<li class=\"assignee-option\" data-id=\"c1\">"));
    }

    #[test]
    fn selected_badge_row() {
        assert_snapshot!(
            render_selected_badges(&contacts(), &["c1".to_string(), "gone".to_string()]),
            @r#"<div class="selected-assignees"><span class="badge" style="background-color:#9327FF">AS</span></div>"#
        );
        assert_eq!(
            render_selected_badges(&contacts(), &[]),
            "<div class=\"selected-assignees\"></div>"
        );
    }
}
