use once_cell::sync::Lazy;
use regex::Regex;

use crate::event::truncate_chars;

/// Elements whose whole subtree is chrome rather than content.
const DROPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "header", "footer", "nav"];

static DROPPED_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    // No backreferences in Rust regex, so one pattern per element.
    DROPPED_ELEMENTS
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).unwrap())
        .collect()
});

/// Wrap width handed to the renderer. Wide enough that sentences stay on one line.
const RENDER_WIDTH: usize = 160;

/// Flatten an HTML document to plain text, one text run per line, bounded to `max_chars`.
pub fn html_to_text(html: &str, max_chars: usize) -> Result<String, html2text::Error> {
    let mut s = html.to_string();
    for re in DROPPED_RES.iter() {
        s = re.replace_all(&s, "").into_owned();
    }
    let rendered = html2text::from_read(s.as_bytes(), RENDER_WIDTH)?;
    Ok(truncate_chars(&collapse_lines(&rendered), max_chars))
}

/// Trim each line and squeeze runs of blank lines down to a single line break.
fn collapse_lines(text: &str) -> String {
    text.lines()
        .map(|l| l.replace('\u{a0}', " "))
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
