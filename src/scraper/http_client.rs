use crate::config::HttpConfig;
use crate::error::{DashboardError, DashboardResult};
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::sleep;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

/// A completed response whose status was not worth retrying.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub status: StatusCode,
    pub body: String,
}

struct AttemptError {
    transient: bool,
    error: DashboardError,
}

pub struct HttpClient {
    inner: reqwest::Client,
    config: HttpConfig,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> DashboardResult<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            // Yahoo hands out a session cookie on first contact
            .cookie_store(true)
            .build()?;

        Ok(Self {
            inner,
            config: config.clone(),
        })
    }

    /// GET a URL as text. Connection failures, timeouts, 429 and 5xx are
    /// retried with exponential backoff; any other status is returned as-is.
    pub async fn get(&self, url: &str) -> DashboardResult<Fetched> {
        self.polite_delay().await;

        let strategy = ExponentialBackoff::from_millis(2)
            .factor(self.config.request_delay_ms.max(1))
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.config.max_retries as usize);

        let mut attempt = 0u32;
        let action = move || {
            attempt += 1;
            debug!("GET {} (attempt {})", url, attempt);
            self.attempt(url)
        };

        RetryIf::start(strategy, action, |e: &AttemptError| {
            if e.transient {
                warn!("Transient failure for {}: {}", url, e.error);
            }
            e.transient
        })
        .await
        .map_err(|e| e.error)
    }

    /// GET a URL and require a 2xx status.
    pub async fn get_text(&self, url: &str) -> DashboardResult<String> {
        let fetched = self.get(url).await?;
        if !fetched.status.is_success() {
            return Err(DashboardError::SourceUnavailable(format!(
                "HTTP {} for {}",
                fetched.status, url
            )));
        }
        Ok(fetched.body)
    }

    async fn attempt(&self, url: &str) -> Result<Fetched, AttemptError> {
        let resp = self.inner.get(url).send().await.map_err(|e| AttemptError {
            transient: e.is_connect() || e.is_timeout(),
            error: DashboardError::Http(e),
        })?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(AttemptError {
                transient: true,
                error: DashboardError::SourceUnavailable(format!("HTTP {status} for {url}")),
            });
        }

        let body = resp.text().await.map_err(|e| AttemptError {
            transient: e.is_timeout(),
            error: DashboardError::Http(e),
        })?;
        Ok(Fetched { status, body })
    }

    /// Sleep for the configured delay + random jitter.
    async fn polite_delay(&self) {
        if self.config.request_delay_ms == 0 && self.config.jitter_ms == 0 {
            return;
        }
        let jitter = rand::random::<u64>() % (self.config.jitter_ms + 1);
        sleep(Duration::from_millis(self.config.request_delay_ms + jitter)).await;
    }
}
