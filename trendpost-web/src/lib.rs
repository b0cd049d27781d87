//! Trend discovery from public trend-tracking pages.
//!
//! - [`TrendSource`]: seam the pipeline calls, so tests can substitute it
//! - [`TrendsPage`]: scrapes an HTML page (trends24-style layout) with `scraper`
//! - [`extract_trends`]: the pure HTML → [`TrendList`](trendpost_common::TrendList) step

pub mod trends;

pub use trends::{DEFAULT_TREND_LIMIT, TrendSource, TrendsPage, extract_trends};
