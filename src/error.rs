use thiserror::Error;

/// Prefix shared by every rendered fetch failure.
pub const ERROR_SENTINEL_PREFIX: &str = "[ERROR";

/// Failure to retrieve a source page. A failed source is skipped for the rest of the run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not read body of {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::InvalidUrl { url, .. }
            | FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Body { url, .. } => url,
        }
    }

    /// Render as the tagged string handed to text-only callers.
    pub fn to_sentinel(&self) -> String {
        format!("{ERROR_SENTINEL_PREFIX} fetching {}: {self}]", self.url())
    }
}

/// Whether `text` is a rendered [`FetchError`] rather than page content.
pub fn is_error_sentinel(text: &str) -> bool {
    text.starts_with(ERROR_SENTINEL_PREFIX)
}

/// The generative model call itself failed. Distinct from a response that parsed to nothing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionCallError {
    #[error("no API key configured (set GEMINI_API_KEY or pass --api-key)")]
    MissingApiKey,
    #[error("model API returned HTTP {status}")]
    Status { status: u16 },
    #[error("model request failed: {0}")]
    Transport(String),
    #[error("could not decode model response: {0}")]
    Decode(String),
    #[error("model returned no text ({0})")]
    EmptyResponse(String),
}

/// A single extracted candidate could not become an event.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("candidate is not a JSON object")]
    NotAnObject,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}

/// Reading or writing the persisted table failed. Terminal for a run.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed store {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}
