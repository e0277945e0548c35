//! Service layer: the operations exposed to the outside
//!
//! - full-site indexing and single-page indexing (`indexing.rs`)
//! - aggregate and per-site statistics (`statistics.rs`)

mod indexing;
mod statistics;

pub use indexing::IndexingService;
pub use statistics::{SiteStatistics, StatisticsReport, StatisticsService, TotalStatistics};
