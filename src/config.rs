use std::{path::PathBuf, time::Duration};

use tracing::info;

use crate::{
    cli::Cli,
    error::ExtractionCallError,
    fetcher::Fetcher,
    generator::gemini::GeminiClient,
    store::Store,
};

/// Everything the pipeline needs from the environment, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_path: PathBuf,
    pub api_key: Option<String>,
    pub model: String,
    pub fetch_timeout: Duration,
    pub generate_timeout: Duration,
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Config {
            store_path: cli.store.clone(),
            api_key: cli.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: cli.model.clone(),
            fetch_timeout: Duration::from_secs(cli.fetch_timeout.max(1)),
            generate_timeout: Duration::from_secs(cli.generate_timeout.max(1)),
        }
    }
}

impl Config {
    pub fn store(&self) -> Store {
        Store::new(&self.store_path)
    }

    pub fn fetcher(&self) -> Fetcher {
        Fetcher::new(self.fetch_timeout)
    }

    pub fn generator(&self) -> GeminiClient {
        GeminiClient::new(self.api_key.clone(), self.model.clone(), self.generate_timeout)
    }

    /// Fail fast for commands that cannot do anything without the model.
    pub fn require_api_key(&self) -> Result<(), ExtractionCallError> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(ExtractionCallError::MissingApiKey),
        }
    }

    pub fn log_redacted(&self) {
        info!(
            store = %self.store_path.display(),
            model = %self.model,
            api_key = if self.api_key.is_some() { "set" } else { "unset" },
            fetch_timeout_secs = self.fetch_timeout.as_secs(),
            generate_timeout_secs = self.generate_timeout.as_secs(),
            "configuration"
        );
    }
}
