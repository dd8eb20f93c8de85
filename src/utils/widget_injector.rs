//! Inserts the embeddable widget `<script>` tag into HTML documents.

/// File name under which the widget script is served.
pub const WIDGET_SCRIPT_NAME: &str = "urlai-widget.js";

/// Builds the `<script>` tag loading the widget from `public_base_url`.
pub fn widget_script_tag(public_base_url: &str) -> String {
    format!(
        r#"<script src="{}/{}"></script>"#,
        public_base_url.trim_end_matches('/'),
        WIDGET_SCRIPT_NAME
    )
}

/// Adds the widget script tag to an HTML document.
///
/// # Rules
///
/// 1. A document that already references the widget is returned unchanged
/// 2. Otherwise the tag goes right before the first `</body>`
/// 3. Documents without a body close tag get the tag appended on a new line
///
/// # Examples
///
/// ```ignore
/// let html = "<html><body><p>Hi</p></body></html>";
/// let injected = inject_widget(html, "https://urlai.example");
/// assert!(injected.contains("urlai-widget.js\"></script>\n</body>"));
/// ```
pub fn inject_widget(html: &str, public_base_url: &str) -> String {
    if html.contains(WIDGET_SCRIPT_NAME) {
        return html.to_string();
    }

    let tag = widget_script_tag(public_base_url);

    match html.find("</body>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + tag.len() + 1);
            out.push_str(&html[..pos]);
            out.push_str(&tag);
            out.push('\n');
            out.push_str(&html[pos..]);
            out
        }
        None => format!("{html}\n{tag}"),
    }
}

/// Derives the download name for an injected copy of `file_name`.
///
/// `page.html` becomes `page-with-urlai.html`; names without an `.html`
/// suffix keep their full name as the stem. Directory components are
/// dropped, and so is anything that cannot appear in a quoted
/// `Content-Disposition` file name.
pub fn injected_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let stem = match base.len().checked_sub(".html".len()) {
        Some(cut) if base.is_char_boundary(cut) && base[cut..].eq_ignore_ascii_case(".html") => {
            &base[..cut]
        }
        _ => base,
    };
    let stem: String = stem
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && *c != '"')
        .collect();
    let stem = if stem.trim().is_empty() { "page" } else { stem.trim() };
    format!("{stem}-with-urlai.html")
}
