//! Tap configuration
//!
//! Loaded once from a JSON or YAML file, or from inline JSON, and validated
//! before any request is made.

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::stream::DateWindow;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.customer.io/v1";

/// Default width of the messages date window in days
pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

// ============================================================================
// TapConfig
// ============================================================================

/// User-supplied tap settings
#[derive(Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// App API bearer token
    #[serde(default)]
    pub auth_token: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Explicit messages window start (RFC3339 or YYYY-MM-DD)
    #[serde(default)]
    pub start_date: Option<String>,

    /// Explicit messages window end (RFC3339 or YYYY-MM-DD)
    #[serde(default)]
    pub end_date: Option<String>,

    /// Window width when no explicit start is given
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Page ceiling per stream/context pair
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Rate limit for outgoing requests
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// HTTP retries per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_lookback_days() -> u32 {
    DEFAULT_LOOKBACK_DAYS
}

fn default_max_pages() -> u32 {
    crate::engine::DEFAULT_MAX_PAGES
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_user_agent() -> String {
    format!("tap-customerio/{}", env!("CARGO_PKG_VERSION"))
}

impl TapConfig {
    /// Config with the given token and defaults elsewhere
    pub fn new(auth_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            base_url: default_base_url(),
            start_date: None,
            end_date: None,
            lookback_days: default_lookback_days(),
            max_pages: default_max_pages(),
            requests_per_second: default_requests_per_second(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
        }
    }

    /// Load from a file (or inline JSON, which wins) and validate
    pub fn load(path: Option<&Path>, inline: Option<&str>) -> Result<Self> {
        match (inline, path) {
            (Some(json), _) => Self::from_json(json),
            (None, Some(path)) => Self::from_file(path),
            (None, None) => Err(Error::config(
                "No configuration provided (use --config or --config-json)",
            )),
        }
    }

    /// Load from a JSON or YAML file, chosen by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {e}",
                    path.display()
                ))
            }
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let config: Self = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would fail later
    pub fn validate(&self) -> Result<()> {
        if self.auth_token.trim().is_empty() {
            return Err(Error::missing_field("auth_token"));
        }
        url::Url::parse(&self.base_url)?;
        if self.max_pages == 0 {
            return Err(Error::invalid_value("max_pages", "must be at least 1"));
        }
        if self.lookback_days == 0 {
            return Err(Error::invalid_value("lookback_days", "must be at least 1"));
        }
        self.window_for(Utc::now().date_naive())?;
        Ok(())
    }

    /// Messages window relative to the current UTC date
    pub fn date_window(&self) -> Result<DateWindow> {
        self.window_for(Utc::now().date_naive())
    }

    /// Messages window relative to `today`
    ///
    /// Missing bounds default to `today` (end) and `end - lookback_days`
    /// (start), both at UTC midnight.
    pub fn window_for(&self, today: NaiveDate) -> Result<DateWindow> {
        let start = self
            .start_date
            .as_deref()
            .map(|s| parse_date("start_date", s))
            .transpose()?;
        let end = self
            .end_date
            .as_deref()
            .map(|s| parse_date("end_date", s))
            .transpose()?;

        match (start, end) {
            (None, None) => DateWindow::trailing_days(today, self.lookback_days),
            (start, end) => {
                let end = end.unwrap_or_else(|| today.and_time(NaiveTime::MIN).and_utc());
                let start = match start {
                    Some(start) => start,
                    None => DateWindow::lookback(end, self.lookback_days)?,
                };
                DateWindow::new(start, end)
            }
        }
    }

    /// HTTP client settings derived from this config
    ///
    /// A `requests_per_second` of zero turns client-side limiting off.
    pub fn http_config(&self) -> HttpClientConfig {
        let builder = HttpClientConfig::builder()
            .base_url(&self.base_url)
            .auth_token(&self.auth_token)
            .max_retries(self.max_retries)
            .user_agent(&self.user_agent);

        let builder = match self.requests_per_second {
            0 => builder.no_rate_limit(),
            rps => builder.rate_limit(RateLimiterConfig::per_second(rps)),
        };
        builder.build()
    }

    /// JSON schema describing the accepted settings
    pub fn spec() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "Customer.io",
            "type": "object",
            "required": ["auth_token"],
            "properties": {
                "auth_token": {
                    "type": "string",
                    "title": "App API Key",
                    "description": "Bearer token for the Customer.io App API",
                    "secret": true
                },
                "base_url": {
                    "type": "string",
                    "default": DEFAULT_BASE_URL
                },
                "start_date": {
                    "type": "string",
                    "description": "Start of the messages window (RFC3339 or YYYY-MM-DD)"
                },
                "end_date": {
                    "type": "string",
                    "description": "End of the messages window (RFC3339 or YYYY-MM-DD)"
                },
                "lookback_days": {
                    "type": "integer",
                    "minimum": 1,
                    "default": DEFAULT_LOOKBACK_DAYS
                },
                "max_pages": {
                    "type": "integer",
                    "minimum": 1,
                    "default": crate::engine::DEFAULT_MAX_PAGES
                },
                "requests_per_second": {
                    "type": "integer",
                    "description": "Client-side request rate; 0 disables limiting",
                    "default": default_requests_per_second()
                },
                "max_retries": {
                    "type": "integer",
                    "default": default_max_retries()
                },
                "user_agent": {
                    "type": "string"
                }
            }
        })
    }
}

impl std::fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapConfig")
            .field("auth_token", &"***")
            .field("base_url", &self.base_url)
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("lookback_days", &self.lookback_days)
            .field("max_pages", &self.max_pages)
            .field("requests_per_second", &self.requests_per_second)
            .field("max_retries", &self.max_retries)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Parse an RFC3339 timestamp or a bare date (UTC midnight)
pub fn parse_date(field: &str, value: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| {
            Error::invalid_value(
                field,
                format!("'{value}' is neither RFC3339 nor YYYY-MM-DD"),
            )
        })
}
