use serde::{Deserialize, Serialize};
use tracing::warn;

const RESET_WEIGHT: f64 = 1.0;

/// A correction applied to caller-supplied weights.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeightAdjustment {
    /// A negative (or non-finite) weight was replaced by 1.
    ResetNegative { factor: &'static str, supplied: f64 },
    /// The weights summed to zero (or overflowed) after the per-weight reset;
    /// all were set to 1.
    ResetAll { supplied_sum: f64 },
}

/// Negative weights become 1 one at a time; if the sum is then not positive
/// or overflows, every weight becomes 1. A caller asking to "disable every
/// factor" therefore gets a uniform blend instead.
fn normalize<const N: usize>(
    labels: [&'static str; N],
    weights: &mut [f64; N],
) -> (f64, Vec<WeightAdjustment>) {
    let mut adjustments = Vec::new();

    for (label, weight) in labels.into_iter().zip(weights.iter_mut()) {
        if !weight.is_finite() || *weight < 0.0 {
            warn!(factor = label, supplied = *weight, "reset negative weight to 1");
            adjustments.push(WeightAdjustment::ResetNegative {
                factor: label,
                supplied: *weight,
            });
            *weight = RESET_WEIGHT;
        }
    }

    let sum: f64 = weights.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        warn!(sum, "weights do not sum to a positive finite value; resetting every weight to 1");
        adjustments.push(WeightAdjustment::ResetAll { supplied_sum: sum });
        weights.fill(RESET_WEIGHT);
        return (RESET_WEIGHT * N as f64, adjustments);
    }

    (sum, adjustments)
}

/// Per-mode weights for the commute composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeWeights {
    pub walk: f64,
    pub bike: f64,
    pub transit: f64,
    pub drive: f64,
}

impl Default for ModeWeights {
    fn default() -> Self {
        Self::uniform()
    }
}

impl ModeWeights {
    pub const fn uniform() -> Self {
        Self {
            walk: 1.0,
            bike: 1.0,
            transit: 1.0,
            drive: 1.0,
        }
    }

    /// Validated copy of the weights plus their sum (the normalizer).
    pub fn normalized(self) -> (Self, f64, Vec<WeightAdjustment>) {
        let mut values = [self.walk, self.bike, self.transit, self.drive];
        let (normalizer, adjustments) =
            normalize(["walk", "bike", "transit", "drive"], &mut values);
        let [walk, bike, transit, drive] = values;
        (
            Self {
                walk,
                bike,
                transit,
                drive,
            },
            normalizer,
            adjustments,
        )
    }
}

/// Weights for the listing-level total score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub price: f64,
    pub transit: f64,
    pub size: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self::uniform()
    }
}

impl FactorWeights {
    pub const fn uniform() -> Self {
        Self {
            price: 1.0,
            transit: 1.0,
            size: 1.0,
        }
    }

    pub fn normalized(self) -> (Self, f64, Vec<WeightAdjustment>) {
        let mut values = [self.price, self.transit, self.size];
        let (normalizer, adjustments) = normalize(["price", "transit", "size"], &mut values);
        let [price, transit, size] = values;
        (
            Self {
                price,
                transit,
                size,
            },
            normalizer,
            adjustments,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_weights_pass_through() {
        let weights = ModeWeights {
            walk: 2.0,
            bike: 0.0,
            transit: 3.0,
            drive: 1.0,
        };
        let (normalized, normalizer, adjustments) = weights.normalized();
        assert_eq!(normalized, weights);
        assert_eq!(normalizer, 6.0);
        assert!(adjustments.is_empty());
    }

    #[test]
    fn negative_weights_reset_individually() {
        let (normalized, normalizer, adjustments) = ModeWeights {
            walk: -5.0,
            bike: 0.0,
            transit: -0.5,
            drive: 2.0,
        }
        .normalized();
        assert_eq!(
            normalized,
            ModeWeights {
                walk: 1.0,
                bike: 0.0,
                transit: 1.0,
                drive: 2.0,
            }
        );
        assert_eq!(normalizer, 4.0);
        assert_eq!(adjustments.len(), 2);
        assert!(matches!(
            adjustments[0],
            WeightAdjustment::ResetNegative { factor: "walk", .. }
        ));
    }

    #[test]
    fn all_zero_weights_fall_back_to_uniform() {
        let (normalized, normalizer, adjustments) = ModeWeights {
            walk: 0.0,
            bike: 0.0,
            transit: 0.0,
            drive: 0.0,
        }
        .normalized();
        assert_eq!(normalized, ModeWeights::uniform());
        assert_eq!(normalizer, 4.0);
        assert_eq!(
            adjustments,
            vec![WeightAdjustment::ResetAll { supplied_sum: 0.0 }]
        );
    }

    #[test]
    fn factor_weights_fall_back_to_three() {
        let (normalized, normalizer, _) = FactorWeights {
            price: 0.0,
            transit: 0.0,
            size: 0.0,
        }
        .normalized();
        assert_eq!(normalized, FactorWeights::uniform());
        assert_eq!(normalizer, 3.0);
    }

    #[test]
    fn overflowing_sum_falls_back_to_uniform() {
        let (normalized, normalizer, adjustments) = ModeWeights {
            walk: 1e308,
            bike: 1e308,
            transit: 1e308,
            drive: 1e308,
        }
        .normalized();
        assert_eq!(normalized, ModeWeights::uniform());
        assert_eq!(normalizer, 4.0);
        assert!(matches!(
            adjustments.as_slice(),
            [WeightAdjustment::ResetAll { supplied_sum }] if supplied_sum.is_infinite()
        ));
    }

    #[test]
    fn non_finite_weight_is_treated_as_negative() {
        let (normalized, _, adjustments) = FactorWeights {
            price: f64::NAN,
            transit: 1.0,
            size: 1.0,
        }
        .normalized();
        assert_eq!(normalized.price, 1.0);
        assert_eq!(adjustments.len(), 1);
    }
}
