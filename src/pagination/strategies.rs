//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern.

use super::types::{extract_token, PageParams, PageToken, Paginator};
use serde_json::Value;

// ============================================================================
// Token Pagination
// ============================================================================

/// Token pagination (HATEOAS style)
///
/// The response carries the token for the following page:
/// `{ "messages": [...], "next": "MTIzNDU2" }` → `?start=MTIzNDU2`
#[derive(Debug, Clone)]
pub struct TokenPaginator {
    /// Path to extract the token from the response
    pub token_path: String,
    /// Query parameter name for the token
    pub token_param: String,
}

impl TokenPaginator {
    /// Create a new token paginator
    pub fn new(token_path: impl Into<String>, token_param: impl Into<String>) -> Self {
        Self {
            token_path: token_path.into(),
            token_param: token_param.into(),
        }
    }
}

impl Default for TokenPaginator {
    fn default() -> Self {
        Self::new("next", "start")
    }
}

impl Paginator for TokenPaginator {
    fn initial_params(&self) -> PageParams {
        PageParams::new()
    }

    fn token_params(&self, token: &PageToken) -> PageParams {
        PageParams::from([(self.token_param.clone(), token.to_string())])
    }

    fn next_token(&self, body: &Value) -> Option<PageToken> {
        extract_token(body, &self.token_path)
    }
}

// ============================================================================
// Window Pagination
// ============================================================================

/// Token pagination with a fixed page size
///
/// Every request carries `limit=<page_size>`; continuation works like
/// [`TokenPaginator`].
#[derive(Debug, Clone)]
pub struct WindowPaginator {
    inner: TokenPaginator,
    /// Query parameter name for the page size
    pub limit_param: String,
    /// Records per page
    pub page_size: u32,
}

impl WindowPaginator {
    /// Create a new window paginator
    pub fn new(
        token_path: impl Into<String>,
        token_param: impl Into<String>,
        limit_param: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            inner: TokenPaginator::new(token_path, token_param),
            limit_param: limit_param.into(),
            page_size,
        }
    }
}

impl Paginator for WindowPaginator {
    fn initial_params(&self) -> PageParams {
        PageParams::from([(self.limit_param.clone(), self.page_size.to_string())])
    }

    fn token_params(&self, token: &PageToken) -> PageParams {
        self.inner.token_params(token)
    }

    fn next_token(&self, body: &Value) -> Option<PageToken> {
        self.inner.next_token(body)
    }
}

// ============================================================================
// Single Page
// ============================================================================

/// No pagination - single request
#[derive(Debug, Clone, Default)]
pub struct SinglePagePaginator;

impl Paginator for SinglePagePaginator {
    fn initial_params(&self) -> PageParams {
        PageParams::new()
    }

    fn token_params(&self, _token: &PageToken) -> PageParams {
        PageParams::new()
    }

    fn next_token(&self, _body: &Value) -> Option<PageToken> {
        None
    }
}
