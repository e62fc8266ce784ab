use crate::model::contact::Contact;
use crate::ops::contact_ops::group_by_letter;

use super::{NO_CONTACTS, badge, escape_html, placeholder};

/// Contact list grouped under letter headings. The entry whose id equals
/// `selected` is marked active.
pub fn render_contact_list(contacts: &[Contact], selected: Option<&str>) -> String {
    if contacts.is_empty() {
        return placeholder(NO_CONTACTS);
    }
    let mut out = String::from("<div class=\"contact-list\">");
    for (letter, group) in group_by_letter(contacts) {
        out.push_str(&format!(
            "<div class=\"letter-group\"><h3>{}</h3>",
            escape_html(&letter)
        ));
        for c in group {
            let active = selected.is_some() && c.id.as_deref() == selected;
            out.push_str(&format!(
                "<div class=\"{}\" data-id=\"{}\">{}<div><span class=\"contact-name\">{}</span><span class=\"contact-email\">{}</span></div></div>",
                if active { "contact active" } else { "contact" },
                escape_html(c.id.as_deref().unwrap_or_default()),
                badge(&c.initials(), &c.color),
                escape_html(&c.name),
                escape_html(&c.email)
            ));
        }
        out.push_str("</div>");
    }
    out.push_str("</div>");
    out
}

/// Details pane for the selected contact; empty when nothing is selected
pub fn render_contact_detail(contact: Option<&Contact>) -> String {
    let Some(c) = contact else {
        return "<div class=\"contact-detail\"></div>".to_string();
    };
    let email = escape_html(&c.email);
    let phone = if c.phone.is_empty() {
        "-".to_string()
    } else {
        escape_html(&c.phone)
    };
    format!(
        "<div class=\"contact-detail\" data-id=\"{}\"><div class=\"contact-header\">{}<h2>{}</h2></div><h4>Contact Information</h4><dl><dt>Email</dt><dd><a href=\"mailto:{email}\">{email}</a></dd><dt>Phone</dt><dd>{phone}</dd></dl></div>",
        escape_html(c.id.as_deref().unwrap_or_default()),
        badge(&c.initials(), &c.color),
        escape_html(&c.name)
    )
}
