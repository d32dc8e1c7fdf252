//! Pagination module
//!
//! Supports: response token (HATEOAS), token with fixed page size, single page
//!
//! # Overview
//!
//! A paginator answers one question about the last response: is there a next
//! page, and which token fetches it. `PaginationState` tracks a single run
//! and enforces the page ceiling and the repeated-token guard.

mod strategies;
mod types;

pub use strategies::{SinglePagePaginator, TokenPaginator, WindowPaginator};
pub use types::{
    extract_token, PageParams, PageToken, PaginationConfig, PaginationState, Paginator,
};

#[cfg(test)]
mod tests;
