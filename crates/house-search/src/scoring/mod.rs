//! Commute and desirability scoring.
//!
//! Per-mode durations map onto a 0..=10 scale ([`curves`]), a validated weight
//! set blends the modes into a composite ([`aggregate`]), the engine runs that
//! over every listing's downtown and custom destinations ([`engine`]), and the
//! total scorer folds the commute result together with price and lot-size fit
//! ([`total`]). Each listing yields a [`ListingOutcome`]; one bad listing never
//! stops a batch.

pub mod aggregate;
pub mod curves;
pub mod engine;
pub mod outcome;
pub mod total;
pub mod weights;

#[cfg(test)]
mod tests;

pub use aggregate::{ModeScores, WeightedAggregator};
pub use curves::{mode_score, ScoreCurve, MAX_SCORE};
pub use engine::CommuteScoringEngine;
pub use outcome::{BatchReport, ListingOutcome, ScoringError, SkipReason};
pub use total::{TotalBreakdown, TotalScoreCriteria, TotalScorer};
pub use weights::{FactorWeights, ModeWeights, WeightAdjustment};
