use serde::Serialize;
use std::fmt;
use tracing::{debug, error, info};

use crate::listings::{ListingKey, StoreError};

/// Why a listing was left without a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingListing,
    NoDowntownRecord,
    NoPointsOfInterest,
    NoWeightedObservations,
}

impl SkipReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::MissingListing => "no listing record",
            Self::NoDowntownRecord => "no downtown commute record",
            Self::NoPointsOfInterest => "no points of interest attached",
            Self::NoWeightedObservations => "no observed travel mode carries weight",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error raised while scoring a single listing.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of scoring one listing. Skipped and failed listings keep whatever
/// score they had before.
#[derive(Debug)]
pub enum ListingOutcome {
    Scored(f64),
    Skipped(SkipReason),
    Failed(ScoringError),
}

impl ListingOutcome {
    pub fn score(&self) -> Option<f64> {
        match self {
            Self::Scored(score) => Some(*score),
            _ => None,
        }
    }
}

impl From<Result<ListingOutcome, ScoringError>> for ListingOutcome {
    fn from(result: Result<ListingOutcome, ScoringError>) -> Self {
        result.unwrap_or_else(ListingOutcome::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredListing {
    pub listing: ListingKey,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedListing {
    pub listing: ListingKey,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedListing {
    pub listing: ListingKey,
    pub error: String,
}

/// Per-listing results of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub scored: Vec<ScoredListing>,
    pub skipped: Vec<SkippedListing>,
    pub failed: Vec<FailedListing>,
}

impl BatchReport {
    /// File an outcome and log it under `score_name`.
    pub fn record(&mut self, score_name: &'static str, listing: ListingKey, outcome: ListingOutcome) {
        match outcome {
            ListingOutcome::Scored(score) => {
                debug!(listing = %listing, score, kind = score_name, "score written");
                self.scored.push(ScoredListing { listing, score });
            }
            ListingOutcome::Skipped(reason) => {
                info!(listing = %listing, %reason, kind = score_name, "listing skipped");
                self.skipped.push(SkippedListing { listing, reason });
            }
            ListingOutcome::Failed(err) => {
                error!(listing = %listing, error = %err, error_detail = ?err, kind = score_name, "listing scoring failed");
                self.failed.push(FailedListing {
                    listing,
                    error: err.to_string(),
                });
            }
        }
    }

    pub fn total(&self) -> usize {
        self.scored.len() + self.skipped.len() + self.failed.len()
    }

    pub fn score_for(&self, listing: &ListingKey) -> Option<f64> {
        self.scored
            .iter()
            .find(|entry| &entry.listing == listing)
            .map(|entry| entry.score)
    }
}
