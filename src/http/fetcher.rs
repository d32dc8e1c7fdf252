//! Transport seam used by the sync engine

use super::client::HttpClient;
use crate::error::Result;
use crate::stream::StreamRequest;
use async_trait::async_trait;
use serde_json::Value;

/// Fetches one page of JSON for a rendered stream request
///
/// Authentication, retries and rate limiting are the implementor's concern;
/// the engine treats any error as fatal for the run.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &StreamRequest) -> Result<Value>;
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, request: &StreamRequest) -> Result<Value> {
        self.get_json(&request.path, &request.query).await
    }
}
