use std::{thread, time::Duration};

use anyhow::{Context, bail};
use indicatif::ProgressBar;
use tracing::{info, warn};

use crate::{
    dedup,
    event::Event,
    extractor::Extractor,
    fetcher::PageSource,
    generator::Generator,
    registry::{Country, Registry},
    store::Store,
};

/// Pause between source fetches.
pub const DEFAULT_SOURCE_DELAY: Duration = Duration::from_millis(500);

/// Totals for one collection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectSummary {
    /// Valid events the model returned, before deduplication.
    pub found: usize,
    /// Events new to the store.
    pub added: usize,
    pub sources_fetched: usize,
    pub sources_failed: usize,
    pub extraction_failures: usize,
}

/// Drives country × source × year collection. Strictly sequential.
pub struct Collector<'a, P, G> {
    pages: &'a P,
    extractor: &'a Extractor<G>,
    delay: Duration,
    progress: ProgressBar,
}

impl<'a, P: PageSource, G: Generator> Collector<'a, P, G> {
    pub fn new(pages: &'a P, extractor: &'a Extractor<G>) -> Self {
        Collector {
            pages,
            extractor,
            delay: DEFAULT_SOURCE_DELAY,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Load `store`, collect every (country, source, year), and write the store back once at the
    /// end. Nothing is persisted if the run does not reach the end.
    pub fn collect(
        &self,
        countries: &[&Country],
        years: &[i32],
        store: &Store,
    ) -> anyhow::Result<CollectSummary> {
        let existing = store
            .load()
            .with_context(|| format!("loading {}", store.path().display()))?;
        let (events, summary) = self.run(countries, years, existing);
        store
            .save(&events)
            .with_context(|| format!("saving {}", store.path().display()))?;
        Ok(summary)
    }

    /// The in-memory part of a run: takes ownership of the table and hands it back grown.
    pub fn run(
        &self,
        countries: &[&Country],
        years: &[i32],
        mut events: Vec<Event>,
    ) -> (Vec<Event>, CollectSummary) {
        let mut summary = CollectSummary::default();
        let total: usize = countries.iter().map(|c| c.sources.len() * years.len()).sum();
        self.progress.set_length(total as u64);
        self.progress.set_position(0);

        let mut first_fetch = true;
        for country in countries {
            self.progress
                .set_message(format!("{} {}", country.glyph, country.name));
            info!(country = country.name, sources = country.sources.len(), "collecting");

            for &url in country.sources {
                if !first_fetch && !self.delay.is_zero() {
                    thread::sleep(self.delay);
                }
                first_fetch = false;

                let text = match self.pages.fetch(url) {
                    Ok(text) => text,
                    Err(e) => {
                        summary.sources_failed += 1;
                        self.progress
                            .suspend(|| warn!(country = country.name, url, error = %e, "skipping source"));
                        self.progress.inc(years.len() as u64);
                        continue;
                    }
                };
                summary.sources_fetched += 1;

                for &year in years {
                    match self.extractor.extract_events(&text, country.name, year, url) {
                        Ok(extracted) => {
                            let found = extracted.len();
                            let (merged, added) = dedup::merge(events, extracted);
                            events = merged;
                            summary.found += found;
                            summary.added += added;
                            info!(country = country.name, url, year, found, added, "extracted");
                        }
                        Err(e) => {
                            summary.extraction_failures += 1;
                            self.progress.suspend(|| {
                                warn!(country = country.name, url, year, error = %e, "extraction failed")
                            });
                        }
                    }
                    self.progress.inc(1);
                }
            }
        }
        self.progress.finish_and_clear();
        (events, summary)
    }
}

/// Resolve country names against the registry, rejecting unknown names up front.
pub fn resolve_countries(registry: &Registry, names: &[String]) -> anyhow::Result<Vec<&'static Country>> {
    let mut out: Vec<&'static Country> = Vec::new();
    for name in names {
        let Some(country) = registry.get(name) else {
            bail!("unknown country: {name}");
        };
        if !out.iter().any(|c| c.name == country.name) {
            out.push(country);
        }
    }
    Ok(out)
}

/// The target year, plus the next one when asked.
pub fn target_years(year: i32, include_next: bool) -> Vec<i32> {
    if include_next { vec![year, year + 1] } else { vec![year] }
}
