use tracing::debug;

use crate::{
    error::ExtractionCallError,
    event::{Category, Event, MAX_DESCRIPTION_CHARS, truncate_chars},
    generator::Generator,
};

pub mod parse;

/// Cap on page text embedded in a single prompt.
pub const MAX_PROMPT_TEXT_CHARS: usize = 12_000;

/// Turns fetched page text into validated events through a generative model.
pub struct Extractor<G> {
    generator: G,
    max_text_chars: usize,
}

impl<G: Generator> Extractor<G> {
    pub fn new(generator: G) -> Self {
        Extractor {
            generator,
            max_text_chars: MAX_PROMPT_TEXT_CHARS,
        }
    }

    /// Extract the events in `country` during `year` from `text`.
    ///
    /// `Err` means the model call itself failed. A response that cannot be parsed, or whose
    /// candidates are all invalid, is `Ok` with an empty list. Every returned event carries the
    /// caller's `country`, and the caller's `source_url` when one was given.
    pub fn extract_events(
        &self,
        text: &str,
        country: &str,
        year: i32,
        source_url: &str,
    ) -> Result<Vec<Event>, ExtractionCallError> {
        let prompt = build_prompt(
            &truncate_chars(text, self.max_text_chars),
            country,
            year,
            source_url,
        );
        let raw = self.generator.generate(&prompt)?;
        Ok(events_from_response(&raw, country, source_url))
    }
}

/// Decode every candidate in a model response, dropping the ones that fail validation.
pub fn events_from_response(raw: &str, country: &str, source_url: &str) -> Vec<Event> {
    let candidates = parse::parse_response(raw);
    if candidates.is_empty() {
        debug!(chars = raw.len(), "model response held no recoverable JSON array");
    }
    candidates
        .iter()
        .filter_map(|item| match Event::from_json(&with_caller_fields(item, country, source_url)) {
            Ok(ev) => Some(ev),
            Err(e) => {
                debug!(error = %e, "dropping extracted candidate");
                None
            }
        })
        .collect()
}

fn with_caller_fields(item: &serde_json::Value, country: &str, source_url: &str) -> serde_json::Value {
    let mut item = item.clone();
    if let Some(obj) = item.as_object_mut() {
        obj.insert("country".to_string(), country.into());
        if !source_url.trim().is_empty() {
            obj.insert("source_url".to_string(), source_url.into());
        }
    }
    item
}

pub fn build_prompt(text: &str, country: &str, year: i32, source_url: &str) -> String {
    let categories = Category::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"You are an expert extractor for a Caribbean cultural events calendar.

From the text below, extract ONLY real public cultural events in **{country}** that occur in **{year}**.
Focus on festivals, carnivals, cultural celebrations, music events, national holidays, and tourism events.

If an event spans multiple days, include the full range.
If only month/year is present, set start_date to the 1st of that month and leave end_date empty.
Keep description <= {MAX_DESCRIPTION_CHARS} chars. Do not invent events.

Categorize each event as one of: {categories}

Return ONLY a JSON array of objects with keys:
name, country (use: {country}), start_date (YYYY-MM-DD), end_date (YYYY-MM-DD or empty), location, description, category, source_url (use: {source_url}).

TEXT:
---
{text}
---
JSON:
"#
    )
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct Canned(&'static str);

    impl Generator for Canned {
        fn generate(&self, _prompt: &str) -> Result<String, ExtractionCallError> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct Recording {
        prompts: RefCell<Vec<String>>,
    }

    impl Generator for Recording {
        fn generate(&self, prompt: &str) -> Result<String, ExtractionCallError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok("[]".to_string())
        }
    }

    struct Failing;

    impl Generator for Failing {
        fn generate(&self, _prompt: &str) -> Result<String, ExtractionCallError> {
            Err(ExtractionCallError::Status { status: 429 })
        }
    }

    const SOURCE: &str = "https://www.stluciajazz.org/";

    #[test]
    fn jazz_festival_end_to_end() {
        let model = Canned(
            r#"```json
[{"name": "Jazz Festival", "country": "St. Lucia", "start_date": "May 5, 2025", "end_date": "2025-05-09",
  "location": "Pigeon Island", "description": "Annual jazz and arts festival.", "category": "Music",
  "source_url": "https://made-up.example/"}]
```"#,
        );
        let extractor = Extractor::new(model);
        let events = extractor
            .extract_events("Jazz Festival, Saint Lucia, May 5–9, 2025", "Saint Lucia", 2025, SOURCE)
            .expect("model call succeeds");
        assert_eq!(events.len(), 1);
        let ev = &events[0];
        assert_eq!(ev.name, "Jazz Festival");
        assert_eq!(ev.country, "Saint Lucia");
        assert_eq!(ev.start_date, "2025-05-05");
        assert_eq!(ev.end_date, "2025-05-09");
        assert_eq!(ev.source_url, SOURCE);
        assert_eq!(ev.category, Some(Category::Music));
    }

    #[test]
    fn one_bad_candidate_does_not_sink_the_batch() {
        let model = Canned(
            r#"[
  {"name": "Carnival", "start_date": "2025-07-18"},
  {"start_date": "2025-08-01", "description": "no name"},
  {"name": "Emancipation Day", "start_date": "2025-08-01"}
]"#,
        );
        let events = Extractor::new(model)
            .extract_events("...", "Saint Lucia", 2025, SOURCE)
            .unwrap();
        let names: Vec<_> = events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Carnival", "Emancipation Day"]);
    }

    #[test]
    fn non_object_candidates_are_dropped() {
        let events = events_from_response(r#"["Carnival", 7, null, {"name": "Jounen Kwéyòl"}]"#, "Saint Lucia", "");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Jounen Kwéyòl");
    }

    #[test]
    fn empty_source_url_keeps_model_value() {
        let events = events_from_response(
            r#"[{"name": "Reggae Sumfest", "source_url": "https://reggaesumfest.com/"}]"#,
            "Jamaica",
            "",
        );
        assert_eq!(events[0].source_url, "https://reggaesumfest.com/");
        assert_eq!(events[0].country, "Jamaica");
    }

    #[test]
    fn garbage_response_is_ok_and_empty() {
        let events = Extractor::new(Canned("I could not find any events, sorry."))
            .extract_events("...", "Cuba", 2025, "")
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn model_failure_is_reported() {
        let res = Extractor::new(Failing).extract_events("...", "Cuba", 2025, "");
        assert_eq!(res, Err(ExtractionCallError::Status { status: 429 }));
    }

    #[test]
    fn prompt_is_scoped_and_bounded() {
        let model = Recording::default();
        let extractor = Extractor::new(&model);
        let text = format!("{}{}", "a".repeat(MAX_PROMPT_TEXT_CHARS), "SHOULD_NOT_APPEAR");
        extractor
            .extract_events(&text, "Trinidad and Tobago", 2026, "https://www.ncctt.org/")
            .unwrap();
        let prompts = model.prompts.borrow();
        let prompt = &prompts[0];
        assert!(prompt.contains("**Trinidad and Tobago**"));
        assert!(prompt.contains("**2026**"));
        assert!(prompt.contains("source_url (use: https://www.ncctt.org/)"));
        assert!(prompt.contains("National Holiday"));
        assert!(prompt.contains(&"a".repeat(MAX_PROMPT_TEXT_CHARS)));
        assert!(!prompt.contains("SHOULD_NOT_APPEAR"));
    }
}
