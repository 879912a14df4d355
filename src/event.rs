use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;

/// Upper bound on a stored description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 280;

/// The fixed category vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    Festival,
    Carnival,
    Music,
    Cultural,
    Religious,
    Sports,
    #[serde(rename = "National Holiday")]
    NationalHoliday,
    Tourism,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Festival,
        Category::Carnival,
        Category::Music,
        Category::Cultural,
        Category::Religious,
        Category::Sports,
        Category::NationalHoliday,
        Category::Tourism,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Festival => "Festival",
            Category::Carnival => "Carnival",
            Category::Music => "Music",
            Category::Cultural => "Cultural",
            Category::Religious => "Religious",
            Category::Sports => "Sports",
            Category::NationalHoliday => "National Holiday",
            Category::Tourism => "Tourism",
            Category::Other => "Other",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Category::Festival => "🎪",
            Category::Carnival => "🎭",
            Category::Music => "🎵",
            Category::Cultural => "🎨",
            Category::Religious => "⛪",
            Category::Sports => "🏆",
            Category::NationalHoliday => "🏛️",
            Category::Tourism => "🏖️",
            Category::Other => "📅",
        }
    }

    /// Case-insensitive label lookup. Blank labels have no category; any other unknown label is
    /// `Other`.
    pub fn from_label(label: &str) -> Option<Category> {
        let l = normalize_ws(label);
        if l.is_empty() {
            return None;
        }
        Some(
            Category::ALL
                .into_iter()
                .find(|c| c.as_str().eq_ignore_ascii_case(&l))
                .unwrap_or(Category::Other),
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cultural event. Dates are `YYYY-MM-DD` or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub name: String,
    pub country: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub description: String,
    #[serde(serialize_with = "serialize_category")]
    pub category: Option<Category>,
    pub source_url: String,
    pub created_at: String,
}

fn serialize_category<S: serde::Serializer>(
    c: &Option<Category>,
    s: S,
) -> Result<S::Ok, S::Error> {
    s.serialize_str(c.map(Category::as_str).unwrap_or(""))
}

/// Loose field bag for building an [`Event`]; only `name` and `country` are required.
#[derive(Debug, Clone, Default)]
pub struct EventFields {
    pub name: String,
    pub country: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub description: String,
    pub category: String,
    pub source_url: String,
    pub created_at: String,
}

impl Event {
    /// Validate and normalise a candidate. Fails only when `name` or `country` is blank.
    pub fn new(fields: EventFields) -> Result<Event, ValidationError> {
        let name = normalize_ws(&fields.name);
        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        let country = normalize_ws(&fields.country);
        if country.is_empty() {
            return Err(ValidationError::MissingField("country"));
        }
        let created_at = if fields.created_at.trim().is_empty() {
            now_timestamp()
        } else {
            fields.created_at.trim().to_string()
        };
        Ok(Event {
            name,
            country,
            start_date: normalize_date(&fields.start_date),
            end_date: normalize_date(&fields.end_date),
            location: normalize_ws(&fields.location),
            description: truncate_chars(fields.description.trim(), MAX_DESCRIPTION_CHARS),
            category: Category::from_label(&fields.category),
            source_url: fields.source_url.trim().to_string(),
            created_at,
        })
    }

    /// Decode one model-produced JSON value.
    pub fn from_json(value: &Value) -> Result<Event, ValidationError> {
        let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;
        let field = |key: &str| obj.get(key).map(scalar_text).unwrap_or_default();
        Event::new(EventFields {
            name: field("name"),
            country: field("country"),
            start_date: field("start_date"),
            end_date: field("end_date"),
            location: field("location"),
            description: field("description"),
            category: field("category"),
            source_url: field("source_url"),
            created_at: String::new(),
        })
    }

    pub fn category_label(&self) -> &'static str {
        self.category.map(Category::as_str).unwrap_or("")
    }
}

fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn now_timestamp() -> String {
    chrono::Utc::now()
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

pub(crate) fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

// ----------------------------
// Date normalisation
// ----------------------------

static ORDINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").unwrap());
static SEPT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bsept\b\.?").unwrap());
static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:mon|tue|tues|wed|thu|thur|thurs|fri|sat|sun)[a-z]*\.?,?\s+").unwrap()
});
static ISO_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:[T\s].*)?$").unwrap());
static YEAR_MONTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})$").unwrap());
static COMPACT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})$").unwrap());

const DAY_FORMATS: &[&str] = &[
    "%B %d %Y",
    "%d %B %Y",
    "%Y %B %d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%B %d %y",
    "%d %B %y",
];

const MONTH_FORMATS: &[&str] = &["%d %B %Y"];

/// Free-text years below this are a day number read as a year ("May 5" as year 5).
const MIN_FREE_TEXT_YEAR: i32 = 1000;

/// Permissively parse a date and render it as `YYYY-MM-DD`. Anything unparseable becomes `""`.
pub fn normalize_date(raw: &str) -> String {
    parse_date(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let t = raw.trim();
    if t.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(dt.date());
        }
    }
    if let Some(c) = ISO_PREFIX_RE.captures(t) {
        return ymd(&c[1], &c[2], &c[3]);
    }
    if let Some(c) = YEAR_MONTH_RE.captures(t) {
        return ymd(&c[1], &c[2], "1");
    }
    // %Y%m%d
    if let Some(c) = COMPACT_RE.captures(t) {
        return ymd(&c[1], &c[2], &c[3]);
    }

    // Free-form text: drop weekday, ordinal suffixes and punctuation chrono does not expect.
    let cleaned = ORDINAL_RE.replace_all(t, "$1");
    let cleaned = WEEKDAY_RE.replace(&cleaned, "");
    let cleaned = SEPT_RE.replace_all(&cleaned, "Sep");
    let cleaned = cleaned.replace([',', '\u{2013}', '\u{2014}'], " ");
    let cleaned = normalize_ws(cleaned.trim_end_matches('.'));

    for fmt in DAY_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&cleaned, fmt)
            && d.year() >= MIN_FREE_TEXT_YEAR
        {
            return Some(d);
        }
    }
    // Month and year only: first of the month.
    let first = format!("1 {cleaned}");
    for fmt in MONTH_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&first, fmt)
            && d.year() >= MIN_FREE_TEXT_YEAR
        {
            return Some(d);
        }
    }
    None
}

fn ymd(y: &str, m: &str, d: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
}
