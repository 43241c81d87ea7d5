//! Index page rendering.

use crate::probe::DependencyStatus;

/// Inputs for one rendering of the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    /// Text of the page heading.
    pub heading: String,
    /// Local server time, if known.
    pub server_time: Option<String>,
    /// Result of the database check, when one is configured.
    pub dependency: Option<DependencyStatus>,
}

/// Render the index page.
pub fn render_page(ctx: &PageContext) -> String {
    let mut html = String::with_capacity(256);

    html.push_str("<!DOCTYPE html>\n<html lang=\"pl\">\n<head>\n<meta charset=\"utf-8\">\n<title>");
    html.push_str(&escape_html(&ctx.heading));
    html.push_str("</title>\n</head>\n<body>\n<h1>");
    html.push_str(&escape_html(&ctx.heading));
    html.push_str("</h1>\n");

    match &ctx.server_time {
        Some(time) => {
            html.push_str("<p>Serwer działa: ");
            html.push_str(&escape_html(time));
            html.push_str("</p>\n");
        }
        None => html.push_str("<p>Serwer działa</p>\n"),
    }

    if let Some(status) = &ctx.dependency {
        html.push_str("<p class=\"db ");
        html.push_str(status.label());
        html.push_str("\">Czas z bazy danych: ");
        html.push_str(&escape_html(status.display_text()));
        html.push_str("</p>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Escape text for use inside HTML elements and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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
