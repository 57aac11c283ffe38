//! Tag-filtered rating statistics for a paginated catalog.
//!
//! A run fetches a user's catalog listings page by page, keeps the
//! items matching a boolean tag expression, merges tag spelling
//! variants and derives weighted rating statistics per canonical tag
//! along with an overall rating histogram.

pub mod canon;
pub mod data;
pub mod expr;
pub mod fetch;
pub mod report;
pub mod stats;

pub use data::{Category, Item, Rating, State, MAX_RATING};
pub use expr::{ParseError, TagExpr};
pub use stats::{Aggregator, Histogram, Merged};
