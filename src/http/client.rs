//! Customer.io App API client
//!
//! A GET-only transport: every request carries the bearer token, waits on
//! the token-bucket limiter and is retried on throttling, transient server
//! errors, timeouts and refused connections. Anything else fails at once.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::config::DEFAULT_BASE_URL;
use crate::error::{Error, Result};
use crate::stream::QueryParams;
use crate::types::{BackoffType, JsonValue};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Wait applied to a 429 without a usable `Retry-After` header
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

// ============================================================================
// Configuration
// ============================================================================

/// How often and how patiently a failed request is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub backoff_type: BackoffType,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound on any single delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_type: BackoffType::Exponential,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying a request that has failed `attempt + 1` times
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = match self.backoff_type {
            BackoffType::Constant => self.initial_backoff,
            BackoffType::Linear => self.initial_backoff.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => self
                .initial_backoff
                .saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(self.max_backoff)
    }
}

/// Settings for [`HttpClient`]
#[derive(Clone)]
pub struct HttpClientConfig {
    /// API root; request paths are appended to it
    pub base_url: String,
    /// Bearer token sent with every request
    pub auth_token: Option<String>,
    /// Per-attempt timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// `None` disables client-side limiting
    pub rate_limit: Option<RateLimiterConfig>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: None,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            rate_limit: Some(RateLimiterConfig::default()),
            user_agent: format!("tap-customerio/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl std::fmt::Debug for HttpClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClientConfig")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("rate_limit", &self.rate_limit)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl HttpClientConfig {
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for [`HttpClientConfig`]
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.config.auth_token = Some(token.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.retry.max_retries = retries;
        self
    }

    /// Set the backoff curve between retries
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.retry.backoff_type = backoff_type;
        self.config.retry.initial_backoff = initial;
        self.config.retry.max_backoff = max;
        self
    }

    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

// ============================================================================
// Client
// ============================================================================

/// Why one attempt did not produce a body
enum Failure {
    /// 429 with the server-requested wait in seconds
    Throttled { retry_after: u64 },
    /// Retried after backoff
    Transient(Error),
    /// Returned to the caller without retrying
    Fatal(Error),
}

impl Failure {
    fn into_error(self) -> Error {
        match self {
            Failure::Throttled { retry_after } => Error::RateLimited {
                retry_after_seconds: retry_after,
            },
            Failure::Transient(e) | Failure::Fatal(e) => e,
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Throttled { retry_after } => write!(f, "rate limited for {retry_after}s"),
            Failure::Transient(e) | Failure::Fatal(e) => write!(f, "{e}"),
        }
    }
}

/// HTTP client for the Customer.io App API
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    limiter: Option<RateLimiter>,
}

impl HttpClient {
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        let limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            limiter,
        })
    }

    /// GET `path` under the base URL and parse the body as JSON
    pub async fn get_json(&self, path: &str, query: &QueryParams) -> Result<JsonValue> {
        let url = self.endpoint(path);
        let retry = self.config.retry;
        let mut attempt = 0;

        loop {
            if let Some(limiter) = &self.limiter {
                limiter.wait().await;
            }

            let failure = match self.attempt(&url, query).await {
                Ok(body) => {
                    debug!(url = %url, retries = attempt, "Request succeeded");
                    return serde_json::from_str(&body)
                        .map_err(|e| Error::decode(format!("Invalid JSON from {path}: {e}")));
                }
                Err(failure) => failure,
            };

            let delay = match &failure {
                _ if attempt >= retry.max_retries => None,
                Failure::Throttled { retry_after } => Some(Duration::from_secs(*retry_after)),
                Failure::Transient(_) => Some(retry.delay(attempt)),
                Failure::Fatal(_) => None,
            };
            let Some(delay) = delay else {
                return Err(failure.into_error());
            };

            attempt += 1;
            warn!(
                url = %url,
                attempt,
                max_retries = retry.max_retries,
                ?delay,
                "Retrying request: {failure}"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// One request, classified
    async fn attempt(
        &self,
        url: &str,
        query: &QueryParams,
    ) -> std::result::Result<String, Failure> {
        let mut request = self.client.get(url).query(query);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Failure::Throttled {
                retry_after: retry_after(&response),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = Error::http_status(status.as_u16(), body);
            return Err(if is_transient_status(status) {
                Failure::Transient(error)
            } else {
                Failure::Fatal(error)
            });
        }

        response.text().await.map_err(|e| self.classify(e))
    }

    fn classify(&self, e: reqwest::Error) -> Failure {
        if e.is_timeout() {
            Failure::Transient(Error::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            })
        } else if e.is_connect() {
            Failure::Transient(Error::Http(e))
        } else {
            Failure::Fatal(Error::Http(e))
        }
    }

    /// Join the base URL and a request path with exactly one slash
    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("rate_limited", &self.limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// 5xx responses worth another attempt, including Cloudflare's 52x range
fn is_transient_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 500 | 502 | 503 | 504 | 520..=524)
}

fn retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}
