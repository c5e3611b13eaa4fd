//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Generate an image tag
///
/// # Examples
/// ```ignore
/// image_tag("https://images.prismic.io/a.png", Some("Banner"), None)
/// // -> <img src="https://images.prismic.io/a.png" alt="Banner" />
/// ```
pub fn image_tag(src: &str, alt: Option<&str>, size: Option<(u32, u32)>) -> String {
    let size_attrs = size
        .map(|(w, h)| format!(r#" width="{}" height="{}""#, w, h))
        .unwrap_or_default();

    format!(
        r#"<img src="{}" alt="{}"{} />"#,
        html_escape(src),
        html_escape(alt.unwrap_or("")),
        size_attrs
    )
}

/// Generate an anchor tag around already-rendered inner HTML
pub fn anchor(href: &str, inner_html: &str, new_tab: bool) -> String {
    if new_tab {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            html_escape(href),
            inner_html
        )
    } else {
        format!(r#"<a href="{}">{}</a>"#, html_escape(href), inner_html)
    }
}
