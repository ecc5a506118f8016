use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::{HarvestConfig, RetryPolicy};
use crate::{Error, Result};

/// Anything that can hand back the markup of one season page.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// HTTP session: one identity for its whole lifetime, fixed browser-like
/// headers and a retry loop around every GET.
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
    user_agent: Option<String>,
}

impl Fetcher {
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let user_agent = config.pick_user_agent().map(str::to_string);
        let headers = build_headers(&config.headers, user_agent.as_deref())?;

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.retry.timeout)
            .build()?;

        Ok(Self {
            client,
            retry: config.retry.clone(),
            user_agent,
        })
    }

    /// The identity this session sends on every request.
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}

impl PageSource for Fetcher {
    /// Returns the body only for a final `200`. Retryable statuses and
    /// connection-level failures are retried with exponential backoff,
    /// stretched to the server's `Retry-After` when it asks for longer.
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let mut retries = 0;
        loop {
            let (failure, retry_after) = match self.client.get(url).send().await {
                Ok(res) => {
                    let status = res.status().as_u16();
                    if status == 200 {
                        return Ok(res.text().await?);
                    }
                    if !self.retry.is_retryable(status) {
                        return Err(Error::HttpStatus {
                            status,
                            url: url.to_string(),
                        });
                    }
                    (format!("HTTP status {status}"), retry_after(res.headers()))
                }
                Err(e) if e.is_timeout() || e.is_connect() || e.is_request() => {
                    (e.to_string(), None)
                }
                Err(e) => return Err(e.into()),
            };

            if retries >= self.retry.max_retries {
                return Err(Error::RetriesExhausted {
                    attempts: retries + 1,
                    url: url.to_string(),
                    last: failure,
                });
            }
            retries += 1;
            let wait = self.retry.wait_before(retries, retry_after);
            warn!(%url, retry = retries, wait_secs = wait.as_secs_f64(), "{failure}, backing off");
            tokio::time::sleep(wait).await;
            debug!(%url, retry = retries, "retrying");
        }
    }
}

/// `Retry-After` in delta-seconds. HTTP-date values are ignored.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let secs = headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(secs))
}

fn build_headers(fixed: &[(String, String)], user_agent: Option<&str>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (key, value) in fixed {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| Error::InvalidHeader(format!("{key}: {e}")))?;
        let val =
            HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader(format!("{key}: {e}")))?;
        map.insert(name, val);
    }
    if let Some(ua) = user_agent {
        let val = HeaderValue::from_str(ua)
            .map_err(|e| Error::InvalidHeader(format!("User-Agent: {e}")))?;
        map.insert(USER_AGENT, val);
    }
    Ok(map)
}
