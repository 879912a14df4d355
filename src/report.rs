use owo_colors::{OwoColorize, Stream::Stderr};

use crate::{
    collector::CollectSummary,
    event::{Category, Event},
    registry::Registry,
};

/// Store filters for `list`. `None` matches everything.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub country: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
}

impl ListFilter {
    fn matches(&self, ev: &Event) -> bool {
        if let Some(c) = &self.country
            && !ev.country.eq_ignore_ascii_case(c.trim())
        {
            return false;
        }
        if let Some(y) = self.year
            && !ev.start_date.starts_with(&format!("{y:04}-"))
        {
            return false;
        }
        if let Some(cat) = &self.category
            && ev.category != Category::from_label(cat)
        {
            return false;
        }
        true
    }
}

/// Events that pass `filter`, ordered by start date then name.
pub fn calendar<'a>(events: &'a [Event], filter: &ListFilter) -> Vec<&'a Event> {
    let mut rows: Vec<&Event> = events.iter().filter(|e| filter.matches(e)).collect();
    rows.sort_by(|a, b| (&a.start_date, &a.name).cmp(&(&b.start_date, &b.name)));
    rows
}

/// One line per event, calendar style.
pub fn format_event(ev: &Event, registry: &Registry) -> String {
    let mut dates = if ev.start_date.is_empty() {
        "????-??-??".to_string()
    } else {
        ev.start_date.clone()
    };
    if !ev.end_date.is_empty() && ev.end_date != ev.start_date {
        dates.push_str(" – ");
        dates.push_str(&ev.end_date);
    }
    let glyph = ev.category.map(Category::glyph).unwrap_or("📅");
    let mut line = format!(
        "{dates}  {glyph} {}  {} {}",
        ev.name,
        registry.glyph_for(&ev.country),
        ev.country
    );
    if !ev.location.is_empty() {
        line.push_str(" · ");
        line.push_str(&ev.location);
    }
    if let Some(cat) = ev.category {
        line.push_str(&format!(" [{cat}]"));
    }
    line
}

/// The closing summary line of a collection run, for stderr.
pub fn summary_line(s: &CollectSummary) -> String {
    format!(
        "Found {} events from {} sources: {} {} new after deduplication, {} {} sources failed, {} extraction errors",
        s.found,
        s.sources_fetched,
        "✓".if_supports_color(Stderr, |t| t.green()),
        s.added,
        "✗".if_supports_color(Stderr, |t| t.red()),
        s.sources_failed,
        s.extraction_failures,
    )
}
