//! # plaprice
//!
//! A multi-shop price comparison scraper.
//!
//! ## Architecture
//!
//! plaprice follows a fan-out pipeline:
//!
//! ```text
//! Store → Aggregator ─┬─ Fetcher → Extractor ─┐
//!                     ├─ Fetcher → Extractor ─┼→ SearchOutcome → Display
//!                     └─ Fetcher → Extractor ─┘
//! ```
//!
//! - [`store`]: shop configurations persisted as JSON
//! - [`fetcher`]: HTTP transport with per-shop TLS and encoding options
//! - [`extractor`]: CSS-selector driven listing extraction
//! - [`aggregator`]: concurrent per-shop search with failure isolation
//! - [`display`]: tables, JSON and CSV output
//!
//! ## Quick Start
//!
//! ```bash
//! # Register a shop
//! plaprice shop add --name "Example" --url https://shop.example.com \
//!     --search-template "https://shop.example.com/search?q={keyword}" \
//!     --container ".item" --name-selector ".title" --price-selector ".price"
//!
//! # Compare prices across every enabled shop
//! plaprice search "무선 마우스" --sort
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// fetcher and aggregator.
pub mod app;

/// Configuration loaded from `~/.config/plaprice/config.toml`.
pub mod config;

/// Command-line interface using clap.
///
/// - `search <keyword>` - Search every enabled shop
/// - `shop <action>` - Manage shop configurations
/// - `config <action>` - Show or initialize configuration
/// - `test <shop-id>` - Try a single shop's selectors
pub mod cli;

/// Core domain models.
///
/// - [`Shop`](domain::Shop): one target site and its selectors
/// - [`Listing`](domain::Listing): one extracted product listing
/// - [`StockStatus`](domain::StockStatus): availability classification
pub mod domain;

/// Listing extraction from search result pages.
pub mod extractor;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for page fetching
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Multi-shop search with partial-failure semantics and derived views.
pub mod aggregator;

/// Shop configuration persistence.
///
/// - [`Store`](store::Store): Trait defining storage operations
/// - [`JsonStore`](store::JsonStore): JSON file implementation
pub mod store;

/// Rendering of search results for the terminal and for export.
pub mod display;

#[cfg(test)]
pub(crate) mod test_support;
