//! Batch analytics for multi-channel sales data.
//!
//! The crate has two halves. The cleaning half turns heterogeneous raw
//! sales exports into one deduplicated, catalog-enriched canonical
//! dataset. The runtime half is a small map/reduce engine (typed
//! mapper/reducer stages with an exhaustive key-grouping shuffle between
//! them) that the three aggregation jobs are written against, so the
//! same job logic could later run under a distributed execution engine.

pub mod api;
pub mod catalog;
pub mod clean;
pub mod error;
pub mod io;
pub mod jobs;
pub mod record;
pub mod report;
pub mod runtime;
pub mod schema;
pub mod stats;

pub use api::{FinalReducer, Mapper, Reducer};
pub use error::CleanError;
pub use runtime::Pipeline;
