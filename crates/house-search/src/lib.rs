//! Listing desirability scoring: commute-time scores per travel mode, weighted
//! composites per listing, and a blended total score persisted to a shared
//! key-value store.

pub mod commute;
pub mod config;
pub mod error;
pub mod listings;
pub mod scoring;
pub mod telemetry;
