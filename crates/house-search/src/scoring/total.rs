use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use super::curves::MAX_SCORE;
use super::outcome::{BatchReport, ListingOutcome, ScoringError, SkipReason};
use super::weights::FactorWeights;
use crate::listings::{Listing, ListingKey, ListingRepository, ListingStore, ScoreKind, StoreError};

/// Buyer criteria the price and lot-size fits are judged against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotalScoreCriteria {
    pub min_price: f64,
    pub max_price: f64,
    pub min_lot_size: u64,
}

impl Default for TotalScoreCriteria {
    fn default() -> Self {
        Self {
            min_price: 0.0,
            max_price: 10_000_000.0,
            min_lot_size: 0,
        }
    }
}

/// Sub-scores behind a total score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TotalBreakdown {
    pub price_fit: f64,
    pub size_fit: f64,
    pub transit_fit: f64,
    pub total: f64,
}

/// Blends price fit, lot-size fit, and the downtown commute score.
pub struct TotalScorer<S> {
    repository: ListingRepository<S>,
    criteria: TotalScoreCriteria,
    weights: FactorWeights,
    normalizer: f64,
}

impl<S: ListingStore> TotalScorer<S> {
    pub fn new(
        repository: ListingRepository<S>,
        criteria: TotalScoreCriteria,
        weights: FactorWeights,
    ) -> Self {
        let (weights, normalizer, _) = weights.normalized();
        Self {
            repository,
            criteria,
            weights,
            normalizer,
        }
    }

    pub fn weights(&self) -> FactorWeights {
        self.weights
    }

    pub fn price_fit(&self, listing: &Listing) -> f64 {
        match listing.price {
            Some(price) if price >= self.criteria.min_price && price <= self.criteria.max_price => {
                MAX_SCORE
            }
            Some(_) => 0.0,
            None => {
                warn!("listing has no price; price fit is 0");
                0.0
            }
        }
    }

    pub fn size_fit(&self, listing: &Listing) -> f64 {
        match listing.lot_size_value() {
            Some(size) if size > self.criteria.min_lot_size => MAX_SCORE,
            Some(_) => 0.0,
            None => {
                if let Some(raw) = listing.lot_size.as_deref() {
                    warn!(lot_size = raw, "lot size not parsed; size fit is 0");
                }
                0.0
            }
        }
    }

    /// Pure blend of the three fits; a missing commute score counts as 0.
    pub fn breakdown(&self, listing: &Listing, downtown_commute: Option<f64>) -> TotalBreakdown {
        let price_fit = self.price_fit(listing);
        let size_fit = self.size_fit(listing);
        let transit_fit = downtown_commute.unwrap_or(0.0);
        let share = |weight: f64| weight / self.normalizer;
        let total = price_fit * share(self.weights.price)
            + size_fit * share(self.weights.size)
            + transit_fit * share(self.weights.transit);

        TotalBreakdown {
            price_fit,
            size_fit,
            transit_fit,
            total,
        }
    }

    pub fn score_total_one(&self, key: &ListingKey) -> ListingOutcome {
        self.try_score_total(key).into()
    }

    pub fn score_total_all(&self) -> Result<BatchReport, StoreError> {
        let keys = self.repository.listing_keys()?;
        info!(listings = keys.len(), kind = ScoreKind::Total.suffix(), "scoring listings");

        let mut report = BatchReport::default();
        for key in keys {
            let outcome = self.score_total_one(&key);
            report.record(ScoreKind::Total.suffix(), key, outcome);
        }
        Ok(report)
    }

    fn try_score_total(&self, key: &ListingKey) -> Result<ListingOutcome, ScoringError> {
        let _span = info_span!("total_score", listing = %key).entered();
        let Some(listing) = self.repository.listing(key)? else {
            return Ok(ListingOutcome::Skipped(SkipReason::MissingListing));
        };
        let downtown = self.repository.score(key, ScoreKind::DowntownCommute)?;

        let breakdown = self.breakdown(&listing, downtown);
        self.repository
            .put_score(key, ScoreKind::Total, breakdown.total)?;
        Ok(ListingOutcome::Scored(breakdown.total))
    }
}
