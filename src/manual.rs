use anyhow::Context;
use tracing::{info, warn};

use crate::{
    dedup,
    event::Event,
    extractor::Extractor,
    fetcher::PageSource,
    generator::Generator,
    registry::Country,
    store::Store,
};

/// Where manually supplied event text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualInput {
    Text(String),
    Url(String),
}

/// Extract events from one pasted text or one URL, without touching the store.
///
/// A failed fetch is an error (there is nothing to extract from); a failed model call is logged
/// and yields no events.
pub fn extract<P: PageSource, G: Generator>(
    pages: &P,
    extractor: &Extractor<G>,
    input: &ManualInput,
    country: &Country,
    year: i32,
) -> anyhow::Result<Vec<Event>> {
    let (text, source_url) = match input {
        ManualInput::Text(text) => (text.clone(), ""),
        ManualInput::Url(url) => {
            let text = pages
                .fetch(url)
                .map_err(|e| anyhow::anyhow!(e.to_sentinel()))?;
            (text, url.as_str())
        }
    };
    match extractor.extract_events(&text, country.name, year, source_url) {
        Ok(events) => {
            info!(country = country.name, year, found = events.len(), "manual extraction");
            Ok(events)
        }
        Err(e) => {
            warn!(country = country.name, year, error = %e, "extraction failed");
            Ok(Vec::new())
        }
    }
}

/// Merge confirmed events into the store and persist it. Returns how many were new.
pub fn save(store: &Store, events: Vec<Event>) -> anyhow::Result<usize> {
    let existing = store
        .load()
        .with_context(|| format!("loading {}", store.path().display()))?;
    let (merged, added) = dedup::merge(existing, events);
    store
        .save(&merged)
        .with_context(|| format!("saving {}", store.path().display()))?;
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionCallError, FetchError, is_error_sentinel};
    use tempfile::TempDir;

    const HAITI: Country = Country {
        name: "Haiti",
        glyph: "🇭🇹",
        sources: &[],
    };

    struct OnePage;

    impl PageSource for OnePage {
        fn fetch(&self, url: &str) -> Result<String, FetchError> {
            if url == "https://carnaval.example/" {
                Ok("Kanaval, Port-au-Prince, March 2, 2025".to_string())
            } else {
                Err(FetchError::Status { url: url.to_string(), status: 404 })
            }
        }
    }

    struct Kanaval;

    impl Generator for Kanaval {
        fn generate(&self, prompt: &str) -> Result<String, ExtractionCallError> {
            if prompt.contains("Kanaval") {
                Ok(r#"[{"name": "Kanaval", "start_date": "2025-03-02", "location": "Port-au-Prince"}]"#.to_string())
            } else {
                Err(ExtractionCallError::Status { status: 500 })
            }
        }
    }

    #[test]
    fn url_input_is_fetched_and_tagged() {
        let extractor = Extractor::new(Kanaval);
        let input = ManualInput::Url("https://carnaval.example/".to_string());
        let events = extract(&OnePage, &extractor, &input, &HAITI, 2025).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].country, "Haiti");
        assert_eq!(events[0].source_url, "https://carnaval.example/");
    }

    #[test]
    fn failed_fetch_surfaces_the_sentinel() {
        let extractor = Extractor::new(Kanaval);
        let input = ManualInput::Url("https://gone.example/".to_string());
        let err = extract(&OnePage, &extractor, &input, &HAITI, 2025).unwrap_err();
        assert!(is_error_sentinel(&err.to_string()));
    }

    #[test]
    fn model_failure_yields_no_events() {
        let extractor = Extractor::new(Kanaval);
        let input = ManualInput::Text("nothing relevant".to_string());
        assert!(extract(&OnePage, &extractor, &input, &HAITI, 2025).unwrap().is_empty());
    }

    #[test]
    fn save_merges_and_reports_new_rows() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("events.csv"));
        let extractor = Extractor::new(Kanaval);
        let input = ManualInput::Text("Kanaval".to_string());
        let events = extract(&OnePage, &extractor, &input, &HAITI, 2025).unwrap();

        assert_eq!(save(&store, events.clone()).unwrap(), 1);
        assert_eq!(save(&store, events).unwrap(), 0);
        assert_eq!(store.load().unwrap().len(), 1);
    }
}
