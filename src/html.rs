//! HTML escaping utilities.

/// Escape for embedding in HTML attribute values and general code content.
///
/// Escapes: `& < > " '`
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&#34;")
        .replace('\'', "&#39;")
}

/// Escape for embedding in HTML element content.
///
/// Quotes are left alone, they are safe in element text.
pub fn escape_html_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
