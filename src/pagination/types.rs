//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use super::strategies::{SinglePagePaginator, TokenPaginator, WindowPaginator};
use crate::error::{Error, Result};
use crate::types::scalar_to_string;
use serde_json::Value;
use std::collections::BTreeMap;

/// Query parameters contributed by a paginator
pub type PageParams = BTreeMap<String, String>;

/// Opaque continuation marker returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageToken(String);

impl PageToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration for pagination behavior
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaginationConfig {
    /// One request per context
    #[default]
    SinglePage,

    /// Token read from the response body, sent back as a query parameter
    Token {
        /// Path to the token in the response (e.g. "next")
        token_path: String,
        /// Query parameter carrying the token (e.g. "start")
        token_param: String,
    },

    /// Token pagination with a fixed page size on every request
    Window {
        /// Path to the token in the response
        token_path: String,
        /// Query parameter carrying the token
        token_param: String,
        /// Query parameter for the page size (e.g. "limit")
        limit_param: String,
        /// Records per page
        page_size: u32,
    },
}

impl PaginationConfig {
    /// `next` in the body, sent back as `start`
    pub fn token() -> Self {
        Self::Token {
            token_path: "next".to_string(),
            token_param: "start".to_string(),
        }
    }

    /// `next`/`start` tokens with a `limit` page size
    pub fn window(page_size: u32) -> Self {
        Self::Window {
            token_path: "next".to_string(),
            token_param: "start".to_string(),
            limit_param: "limit".to_string(),
            page_size,
        }
    }

    /// Build the paginator for this config
    pub fn build(&self) -> Box<dyn Paginator> {
        match self {
            Self::SinglePage => Box::new(SinglePagePaginator),
            Self::Token {
                token_path,
                token_param,
            } => Box::new(TokenPaginator::new(token_path, token_param)),
            Self::Window {
                token_path,
                token_param,
                limit_param,
                page_size,
            } => Box::new(WindowPaginator::new(
                token_path,
                token_param,
                limit_param,
                *page_size,
            )),
        }
    }
}

/// Tracks one pagination run (one stream/context pair)
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages fetched so far
    pub page: u32,
    /// Token that fetches the next page
    pub token: Option<PageToken>,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a fetched page
    pub fn record_page(&mut self) {
        self.page += 1;
    }

    /// Move to the next token, or finish when there is none.
    ///
    /// Fails when the server repeats the current token or when another page
    /// would exceed `max_pages`.
    pub fn advance(&mut self, next: Option<PageToken>, max_pages: u32) -> Result<()> {
        let Some(token) = next else {
            self.done = true;
            self.token = None;
            return Ok(());
        };

        if self.token.as_ref() == Some(&token) {
            return Err(Error::RepeatedPageToken {
                token: token.to_string(),
            });
        }
        if self.page >= max_pages {
            return Err(Error::PageLimitExceeded { max_pages });
        }

        self.token = Some(token);
        Ok(())
    }
}

/// Core trait for pagination strategies
///
/// Implementations are stateless: the next token depends only on the last
/// response body.
pub trait Paginator: Send + Sync {
    /// Parameters sent with every request
    fn initial_params(&self) -> PageParams;

    /// Parameters that fetch the page identified by `token`
    fn token_params(&self, token: &PageToken) -> PageParams;

    /// Extract the next token from the last response body
    fn next_token(&self, body: &Value) -> Option<PageToken>;
}

/// Read a non-empty token from a dotted path in the body
pub fn extract_token(body: &Value, path: &str) -> Option<PageToken> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = body;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    scalar_to_string(current)
        .filter(|token| !token.is_empty())
        .map(PageToken::new)
}
