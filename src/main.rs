use std::{fs, time::Duration};

use anyhow::{Context, bail};
use chrono::Datelike;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Stream::Stderr};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Cli, Command, InputArgs},
    collector::Collector,
    config::Config,
    error::is_error_sentinel,
    extractor::Extractor,
    fetcher::PageSource,
    manual::ManualInput,
    registry::Registry,
    report::ListFilter,
};

mod cli;
mod collector;
mod config;
mod dedup;
mod error;
mod event;
mod extractor;
mod fetcher;
mod generator;
mod manual;
mod registry;
mod report;
mod store;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("caribcal=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let config = Config::from(&args);
    config.log_redacted();
    let registry = Registry::caribbean();

    match args.command {
        Command::Collect {
            countries,
            all,
            year,
            next_year,
            delay_ms,
        } => {
            config.require_api_key()?;
            let names: Vec<String> = if all {
                registry.countries().iter().map(|c| c.name.to_string()).collect()
            } else if countries.is_empty() {
                vec!["Saint Lucia".to_string()]
            } else {
                countries
            };
            let selected = collector::resolve_countries(&registry, &names)?;
            let years = collector::target_years(year.unwrap_or_else(current_year), next_year);

            let fetcher = config.fetcher();
            let extractor = Extractor::new(config.generator());
            let summary = Collector::new(&fetcher, &extractor)
                .with_delay(Duration::from_millis(delay_ms))
                .with_progress(progress_bar())
                .collect(&selected, &years, &config.store())?;
            eprintln!("{}", report::summary_line(&summary));
        }
        Command::Extract {
            input,
            country,
            year,
            save,
        } => {
            config.require_api_key()?;
            let Some(country) = registry.get(&country) else {
                bail!("unknown country: {country}");
            };
            let input = manual_input(input)?;
            let fetcher = config.fetcher();
            let extractor = Extractor::new(config.generator());
            let events = manual::extract(
                &fetcher,
                &extractor,
                &input,
                country,
                year.unwrap_or_else(current_year),
            )?;
            println!("{}", serde_json::to_string_pretty(&events)?);

            if save {
                let added = manual::save(&config.store(), events)?;
                eprintln!(
                    "{} saved {added} new events to {}",
                    "✓".if_supports_color(Stderr, |t| t.green()),
                    config.store_path.display()
                );
            } else if !events.is_empty() {
                eprintln!("found {} events; re-run with --save to store them", events.len());
            }
        }
        Command::Fetch { url } => {
            let text = config.fetcher().fetch_text(&url);
            if is_error_sentinel(&text) {
                bail!(text);
            }
            println!("{text}");
        }
        Command::Sources { country } => {
            for c in registry.countries() {
                if country.as_deref().is_some_and(|name| name != c.name) {
                    continue;
                }
                println!("{} {}", c.glyph, c.name);
                for url in c.sources {
                    println!("    {url}");
                }
            }
        }
        Command::List {
            country,
            year,
            category,
        } => {
            let events = config
                .store()
                .load()
                .with_context(|| format!("loading {}", config.store_path.display()))?;
            let filter = ListFilter {
                country,
                year,
                category,
            };
            let rows = report::calendar(&events, &filter);
            if rows.is_empty() {
                eprintln!("No events match. Collect some with `caribcal collect`.");
            }
            for ev in rows {
                println!("{}", report::format_event(ev, &registry));
            }
        }
    }
    Ok(())
}

fn manual_input(args: InputArgs) -> anyhow::Result<ManualInput> {
    if let Some(text) = args.text {
        Ok(ManualInput::Text(text))
    } else if let Some(path) = args.text_file {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(ManualInput::Text(text))
    } else if let Some(url) = args.url {
        Ok(ManualInput::Url(url))
    } else {
        bail!("one of --text, --text-file or --url is required")
    }
}

fn current_year() -> i32 {
    chrono::Utc::now().year()
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}
