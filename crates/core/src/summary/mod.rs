//! Group summary loading.
//!
//! Wraps the pure balance engine with the pieces a caller needs around it:
//! - An explicit data source seam (no global clients)
//! - A TTL cache of computed summaries with invalidation
//! - The all-zero fallback when data cannot be loaded

pub mod cache;
pub mod error;
pub mod service;
pub mod source;

pub use cache::SummaryCache;
pub use error::{SourceError, SummaryError};
pub use service::GroupSummaryService;
pub use source::{GroupDataSource, GroupSnapshot, InMemorySource};
