use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::FetchError;

pub mod html;

/// Cap on cleaned page text handed to the extractor.
pub const MAX_PAGE_CHARS: usize = 200_000;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Anything that can turn a URL into cleaned page text.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;

    /// Like [`PageSource::fetch`], but failures come back as an `[ERROR fetching ...]` string.
    fn fetch_text(&self, url: &str) -> String {
        self.fetch(url).unwrap_or_else(|e| e.to_sentinel())
    }
}

/// Blocking HTTP fetcher. One attempt per call, no retries.
pub struct Fetcher {
    agent: ureq::Agent,
    max_chars: usize,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Self {
        let cfg = ureq::Agent::config_builder()
            .timeout_connect(Some(timeout.min(Duration::from_secs(10))))
            .timeout_global(Some(timeout))
            .build();
        Fetcher {
            agent: ureq::Agent::new_with_config(cfg),
            max_chars: MAX_PAGE_CHARS,
        }
    }
}

impl PageSource for Fetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = parse_http_url(url)?;
        let res = self
            .agent
            .get(parsed.as_str())
            .header("User-Agent", BROWSER_USER_AGENT)
            .header("Accept", "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(status) => FetchError::Status {
                    url: url.to_string(),
                    status,
                },
                other => FetchError::Transport {
                    url: url.to_string(),
                    message: other.to_string(),
                },
            })?;
        let body = res
            .into_body()
            .read_to_string()
            .map_err(|e| FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        let text = html::html_to_text(&body, self.max_chars).map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        debug!(url, bytes = body.len(), chars = text.chars().count(), "fetched page");
        Ok(text)
    }
}

fn parse_http_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url.trim()).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            message: format!("unsupported scheme `{other}`"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_error_sentinel;

    #[test]
    fn rejects_non_http_urls() {
        let f = Fetcher::new(Duration::from_secs(1));
        for bad in ["ftp://example.com/events", "not a url", "file:///etc/passwd"] {
            match f.fetch(bad) {
                Err(FetchError::InvalidUrl { url, .. }) => assert_eq!(url, bad),
                other => panic!("expected InvalidUrl for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn fetch_text_renders_sentinel_on_failure() {
        let f = Fetcher::new(Duration::from_secs(1));
        let text = f.fetch_text("gopher://example.com/");
        assert!(is_error_sentinel(&text), "got {text}");
        assert!(text.contains("gopher://example.com/"));
    }

    #[test]
    fn unreachable_host_is_an_error_not_a_panic() {
        // Port 9 (discard) is closed on loopback in any sane test environment.
        let f = Fetcher::new(Duration::from_secs(2));
        let err = f.fetch("http://127.0.0.1:9/").unwrap_err();
        assert_eq!(err.url(), "http://127.0.0.1:9/");
        assert!(!matches!(err, FetchError::InvalidUrl { .. }));
    }
}
