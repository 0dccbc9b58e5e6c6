//! HTML fragment rendering
//!
//! Every fragment is swapped into the page by HTMX, so each one is a single
//! element (or a run of table rows) rather than a full document. Values that
//! came from the request are escaped before they are echoed back.

use crate::domain::{Profile, Reading, User};

/// Escape text for use in element content and double-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn bmi_result(height_m: f64, weight_kg: f64, reading: &Reading) -> String {
    format!(
        "<p>Height of {height_m}m and Weight of {weight_kg}kg gives a BMI of {:.2}kg/m²</p>\n\
         <p>Category: {}</p>\n",
        reading.rounded(),
        reading.category,
    )
}

pub fn bmi_error(message: &str) -> String {
    format!(
        "<p class=\"text-danger\">Cannot calculate BMI: {}</p>\n",
        escape_html(message)
    )
}

/// Placeholder row sent when there is nothing to search for
pub const EMPTY_ROW: &str = "<tr></tr>";

pub fn search_rows(users: &[&User]) -> String {
    users
        .iter()
        .map(|user| {
            format!(
                "<tr>\n    <td>{}</td>\n    <td>{}</td>\n</tr>\n",
                escape_html(&user.name),
                escape_html(&user.email)
            )
        })
        .collect()
}

pub fn email_field(submitted: &str, valid: bool) -> String {
    let (alert_class, alert_text) = if valid {
        ("alert-success", "That email is valid")
    } else {
        ("alert-danger", "Please enter a valid email address")
    };

    format!(
        r#"<div class="mb-3" hx-target="this" hx-swap="outerHTML">
    <label class="form-label">Email address</label>
    <input type="email" class="form-control" name="email" hx-post="/email" value="{value}">
    <div class="alert {alert_class}" role="alert">{alert_text}</div>
</div>
"#,
        value = escape_html(submitted),
    )
}

pub fn profile_form(id: u64, profile: &Profile) -> String {
    format!(
        r#"<form hx-put="/user/{id}" hx-target="this" hx-swap="outerHTML">
    <div class="mb-3">
        <label for="name" class="form-label">Name</label>
        <input type="text" class="form-control" id="name" name="name" value="{name}">
    </div>
    <div class="mb-3">
        <label for="bio" class="form-label">Bio</label>
        <textarea class="form-control" id="bio" name="bio">{bio}</textarea>
    </div>
    <button type="submit" class="btn btn-primary">Save Changes</button>
</form>
"#,
        name = escape_html(&profile.name),
        bio = escape_html(&profile.bio),
    )
}

pub fn profile_card(id: u64, profile: &Profile) -> String {
    format!(
        r#"<div class="card" style="width: 18rem;" hx-target="this" hx-swap="outerHTML">
    <div class="card-body">
        <h5 class="card-title">{name}</h5>
        <p class="card-text">{bio}</p>
        <button class="btn btn-primary" hx-get="/user/{id}/edit">Click To Edit</button>
    </div>
</div>
"#,
        name = escape_html(&profile.name),
        bio = escape_html(&profile.bio),
    )
}

pub fn price(value: f64) -> String {
    format!("${value:.1}")
}
