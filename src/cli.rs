use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{generator::gemini::DEFAULT_MODEL, registry::Registry};

#[derive(Parser, Debug)]
#[command(version, about = "Collect Caribbean cultural events into a deduplicated calendar", long_about = None)]
pub struct Cli {
    /// CSV file the accumulated events live in
    #[arg(long, global = true, env = "CARIBCAL_STORE", default_value = "caribbean_events.csv")]
    pub store: PathBuf,

    /// Gemini API key
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model used for extraction
    #[arg(long, global = true, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Page fetch timeout, in seconds
    #[arg(long, global = true, value_name = "SECS", default_value_t = 20)]
    pub fetch_timeout: u64,

    /// Model call timeout, in seconds
    #[arg(long, global = true, value_name = "SECS", default_value_t = 120)]
    pub generate_timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch every registered source of the chosen countries and store new events
    Collect {
        /// Country to collect (repeatable)
        #[arg(long = "country", value_name = "NAME", value_parser = known_country)]
        countries: Vec<String>,
        /// Collect every registered country
        #[arg(long, conflicts_with = "countries")]
        all: bool,
        /// Target year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
        /// Also collect the year after the target year
        #[arg(long)]
        next_year: bool,
        /// Pause between source fetches, in milliseconds
        #[arg(long, value_name = "MS", default_value_t = 500)]
        delay_ms: u64,
    },
    /// Extract events from pasted text or a single URL
    Extract {
        #[command(flatten)]
        input: InputArgs,
        /// Country the events belong to
        #[arg(long, value_name = "NAME", value_parser = known_country)]
        country: String,
        /// Target year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
        /// Merge the extracted events into the store
        #[arg(long)]
        save: bool,
    },
    /// Fetch a page and print its cleaned text
    Fetch {
        #[arg(value_name = "URL")]
        url: String,
    },
    /// List the source registry
    Sources {
        #[arg(long, value_name = "NAME", value_parser = known_country)]
        country: Option<String>,
    },
    /// Print stored events in calendar order
    List {
        #[arg(long, value_name = "NAME")]
        country: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        category: Option<String>,
    },
}

/// Exactly one source of text for a manual extraction.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
    /// Event text to extract from
    #[arg(long)]
    pub text: Option<String>,
    /// File holding the event text
    #[arg(long, value_name = "PATH")]
    pub text_file: Option<PathBuf>,
    /// Page to fetch and extract from
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
}

/// Canonicalise a country name against the registry.
fn known_country(s: &str) -> Result<String, String> {
    Registry::caribbean()
        .get(s)
        .map(|c| c.name.to_string())
        .ok_or_else(|| format!("unknown country `{s}` (see `caribcal sources`)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("caribcal").chain(args.iter().copied()))
    }

    #[test]
    fn collect_canonicalises_countries() {
        let cli = parse(&["collect", "--country", "saint lucia", "--country", "JAMAICA", "--next-year"]).unwrap();
        match cli.command {
            Command::Collect { countries, next_year, all, delay_ms, .. } => {
                assert_eq!(countries, ["Saint Lucia", "Jamaica"]);
                assert!(next_year);
                assert!(!all);
                assert_eq!(delay_ms, 500);
            }
            other => panic!("expected collect, got {other:?}"),
        }
    }

    #[test]
    fn unknown_country_is_rejected_at_parse_time() {
        let err = parse(&["extract", "--text", "x", "--country", "Atlantis"]).unwrap_err();
        assert!(err.to_string().contains("unknown country `Atlantis`"));
    }

    #[test]
    fn extract_needs_exactly_one_input() {
        assert!(parse(&["extract", "--country", "Cuba"]).is_err());
        assert!(parse(&["extract", "--country", "Cuba", "--text", "a", "--url", "https://x.example/"]).is_err());
        let cli = parse(&["extract", "--country", "Cuba", "--url", "https://x.example/", "--save"]).unwrap();
        match cli.command {
            Command::Extract { input, save, .. } => {
                assert_eq!(input.url.as_deref(), Some("https://x.example/"));
                assert!(save);
            }
            other => panic!("expected extract, got {other:?}"),
        }
    }

    #[test]
    fn all_conflicts_with_country() {
        assert!(parse(&["collect", "--all", "--country", "Cuba"]).is_err());
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let cli = parse(&["list", "--store", "/tmp/x.csv", "--model", "gemini-pro"]).unwrap();
        assert_eq!(cli.store, PathBuf::from("/tmp/x.csv"));
        assert_eq!(cli.model, "gemini-pro");
    }

    #[test]
    fn every_registered_country_parses() {
        let reg = Registry::caribbean();
        proptest::proptest!(|(idx in 0..reg.countries().len(), upper in proptest::bool::ANY)| {
            let name = reg.countries()[idx].name;
            let typed = if upper { name.to_uppercase() } else { name.to_lowercase() };
            proptest::prop_assert_eq!(known_country(&typed), Ok(name.to_string()));
        })
    }
}
