use anyhow::{Context, Result};
use reqwest::header;
use std::time::Duration;
use thiserror::Error;

// The listing site serves a captcha page to clients that don't look like a
// browser, so the header set mimics one.
const USER_AGENT_VALUE: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0} seconds")]
    Timeout(u64),
    #[error("server returned HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub struct Page {
    pub status: u16,
    pub body: String,
}

pub struct PageFetcher {
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl PageFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT_VALUE),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(ACCEPT_VALUE),
        );

        let client = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }

    /// One GET of the listing page. No retries here: without the source
    /// document there is nothing to scrape, so the caller logs and aborts.
    pub fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout_secs)
            } else {
                FetchError::Transport(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                detail: snippet(&detail),
            });
        }

        let body = response.text().map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout_secs)
            } else {
                FetchError::Transport(e)
            }
        })?;

        Ok(Page {
            status: status.as_u16(),
            body,
        })
    }
}

/// First 200 characters of a response body, flattened to one line, for
/// error messages.
fn snippet(text: &str) -> String {
    text.chars()
        .take(200)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}
