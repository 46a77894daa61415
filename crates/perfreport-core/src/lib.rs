//! perfreport-core — data model, aggregation and fallback for student
//! performance reports.
//!
//! This crate defines the snapshot every report is rendered from, the
//! collaborator traits the data sources implement, and the pipeline that
//! ties aggregation, fallback and rendering together.

pub mod aggregator;
pub mod error;
pub mod fallback;
pub mod model;
pub mod pipeline;
pub mod retry;
pub mod snapshot;
pub mod statistics;
pub mod traits;

#[cfg(test)]
mod testing;

pub use error::ReportError;
