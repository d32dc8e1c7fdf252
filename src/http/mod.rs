//! HTTP transport module
//!
//! The sync engine only sees the [`Fetcher`] trait; [`HttpClient`] is its
//! production implementation against the Customer.io App API.
//!
//! # Features
//!
//! - **Bearer Auth**: The App API token on every request
//! - **Automatic Retries**: 429 honours `Retry-After`, transient 5xx and
//!   network failures back off per [`RetryPolicy`]
//! - **Rate Limiting**: Token bucket rate limiter using governor

mod client;
mod fetcher;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RetryPolicy};
pub use fetcher::Fetcher;
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
mod tests;
