use tracing::info;

use super::aggregate::{ModeScores, WeightedAggregator};
use super::outcome::{BatchReport, ListingOutcome, ScoringError, SkipReason};
use super::weights::ModeWeights;
use crate::listings::{ListingKey, ListingRepository, ListingStore, ScoreKind, StoreError};

/// Computes downtown and custom commute scores from stored commute records.
pub struct CommuteScoringEngine<S> {
    repository: ListingRepository<S>,
    aggregator: WeightedAggregator,
}

impl<S: ListingStore> CommuteScoringEngine<S> {
    pub fn new(repository: ListingRepository<S>, weights: ModeWeights) -> Self {
        Self {
            repository,
            aggregator: WeightedAggregator::new(weights),
        }
    }

    /// Composite against the single downtown reference, written to
    /// `downtown_commute_score`.
    pub fn score_downtown_one(&self, key: &ListingKey) -> ListingOutcome {
        self.try_score_downtown(key).into()
    }

    /// Equal-share composite over every attached point of interest, written
    /// to `custom_commute_score`.
    pub fn score_custom_one(&self, key: &ListingKey) -> ListingOutcome {
        self.try_score_custom(key).into()
    }

    pub fn score_downtown_all(&self) -> Result<BatchReport, StoreError> {
        self.run_batch(ScoreKind::DowntownCommute, |key| self.score_downtown_one(key))
    }

    pub fn score_custom_all(&self) -> Result<BatchReport, StoreError> {
        self.run_batch(ScoreKind::CustomCommute, |key| self.score_custom_one(key))
    }

    fn run_batch<F>(&self, kind: ScoreKind, score: F) -> Result<BatchReport, StoreError>
    where
        F: Fn(&ListingKey) -> ListingOutcome,
    {
        let keys = self.repository.listing_keys()?;
        info!(listings = keys.len(), kind = kind.suffix(), "scoring listings");

        let mut report = BatchReport::default();
        for key in keys {
            let outcome = score(&key);
            report.record(kind.suffix(), key, outcome);
        }
        Ok(report)
    }

    fn try_score_downtown(&self, key: &ListingKey) -> Result<ListingOutcome, ScoringError> {
        let Some(record) = self.repository.downtown_record(key)? else {
            return Ok(ListingOutcome::Skipped(SkipReason::NoDowntownRecord));
        };

        let scores = ModeScores::from_record(&record);
        let Some(score) = self.aggregator.composite(&scores) else {
            return Ok(ListingOutcome::Skipped(SkipReason::NoWeightedObservations));
        };

        self.repository
            .put_score(key, ScoreKind::DowntownCommute, score)?;
        Ok(ListingOutcome::Scored(score))
    }

    fn try_score_custom(&self, key: &ListingKey) -> Result<ListingOutcome, ScoringError> {
        let records = self.repository.poi_records(key)?;
        if records.is_empty() {
            return Ok(ListingOutcome::Skipped(SkipReason::NoPointsOfInterest));
        }

        let destinations: Vec<ModeScores> = records
            .iter()
            .map(|(_, record)| ModeScores::from_record(record))
            .collect();
        let Some(score) = self.aggregator.composite_across(&destinations) else {
            return Ok(ListingOutcome::Skipped(SkipReason::NoWeightedObservations));
        };

        self.repository
            .put_score(key, ScoreKind::CustomCommute, score)?;
        Ok(ListingOutcome::Scored(score))
    }
}
