//! Markdown-subset to HTML conversion for analysis text.
//!
//! Supports exactly the constructs the synthesis prompt asks for: `###` and
//! `##` headings, `**bold**`, and `- ` bullet lines. Anything else passes
//! through as escaped text.

use std::sync::LazyLock;

use regex::Regex;

static H3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^### (.*)$").unwrap());
static H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^## (.*)$").unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^- (.*)$").unwrap());

/// Escape the characters that would otherwise be interpreted as markup.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Convert an analysis body to HTML.
///
/// Escapes first, so provider text can never inject markup. The line-anchored
/// patterns (headings, bullets) must run before newlines collapse to `<br>`,
/// which destroys the line starts they match on.
pub fn analysis_to_html(analysis: &str) -> String {
    let escaped = escape_html(analysis);

    let html = H3.replace_all(&escaped, "<h4>$1</h4>");
    let html = H2.replace_all(&html, r#"<h3 class="section-title">$1</h3>"#);
    let html = BOLD.replace_all(&html, "<strong>$1</strong>");
    let html = BULLET.replace_all(&html, "<li>$1</li>");
    html.replace('\n', "<br>")
}
