use serde::Serialize;

use super::curves::mode_score;
use super::weights::{ModeWeights, WeightAdjustment};
use crate::commute::{CommuteRecord, TravelMode};

/// Per-mode scores for one destination; `None` marks an unobserved mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ModeScores {
    pub walk: Option<f64>,
    pub bike: Option<f64>,
    pub transit: Option<f64>,
    pub drive: Option<f64>,
}

impl ModeScores {
    pub fn from_record(record: &CommuteRecord) -> Self {
        let sections = record.transit_sections();
        let score = |mode| {
            record
                .minutes(mode)
                .map(|minutes| mode_score(mode, minutes, sections))
        };
        Self {
            walk: score(TravelMode::Walk),
            bike: score(TravelMode::Bike),
            transit: score(TravelMode::Transit),
            drive: score(TravelMode::Drive),
        }
    }

    pub fn get(&self, mode: TravelMode) -> Option<f64> {
        match mode {
            TravelMode::Walk => self.walk,
            TravelMode::Bike => self.bike,
            TravelMode::Drive => self.drive,
            TravelMode::Transit => self.transit,
        }
    }
}

/// Blends per-mode scores with a validated weight set.
#[derive(Debug, Clone)]
pub struct WeightedAggregator {
    weights: ModeWeights,
    normalizer: f64,
    adjustments: Vec<WeightAdjustment>,
}

impl WeightedAggregator {
    pub fn new(weights: ModeWeights) -> Self {
        let (weights, normalizer, adjustments) = weights.normalized();
        Self {
            weights,
            normalizer,
            adjustments,
        }
    }

    pub fn weights(&self) -> ModeWeights {
        self.weights
    }

    pub fn normalizer(&self) -> f64 {
        self.normalizer
    }

    pub fn adjustments(&self) -> &[WeightAdjustment] {
        &self.adjustments
    }

    fn weight(&self, mode: TravelMode) -> f64 {
        match mode {
            TravelMode::Walk => self.weights.walk,
            TravelMode::Bike => self.weights.bike,
            TravelMode::Drive => self.weights.drive,
            TravelMode::Transit => self.weights.transit,
        }
    }

    /// `Σ(score × weight) / Σ(weight)` over the observed modes. With every
    /// mode observed the denominator is the full normalizer. Returns `None`
    /// when no observed mode carries weight. Not clamped: the transit bonus
    /// may lift the result slightly.
    pub fn composite(&self, scores: &ModeScores) -> Option<f64> {
        let observed: Vec<(f64, f64)> = TravelMode::ordered()
            .into_iter()
            .filter_map(|mode| scores.get(mode).map(|score| (score, self.weight(mode))))
            .collect();
        let denominator: f64 = observed.iter().map(|(_, weight)| weight).sum();
        if denominator <= 0.0 {
            return None;
        }

        // Weight shares stay within 0..=1, so very large weights cannot overflow.
        Some(
            observed
                .iter()
                .map(|(score, weight)| score * (weight / denominator))
                .sum(),
        )
    }

    /// Equal-share composite across destinations:
    /// `Σ_poi Σ_mode(score × weight) / (normalizer × N)` when every mode is
    /// observed. Destinations with no weighted observation are left out of `N`.
    pub fn composite_across(&self, destinations: &[ModeScores]) -> Option<f64> {
        let composites: Vec<f64> = destinations
            .iter()
            .filter_map(|scores| self.composite(scores))
            .collect();
        if composites.is_empty() {
            return None;
        }
        Some(composites.iter().sum::<f64>() / composites.len() as f64)
    }
}
