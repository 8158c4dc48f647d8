//! Read-only aggregation over the record tables.

pub mod engine;
pub mod handlers;
pub mod resolution;

pub use engine::AnalyticsEngine;
