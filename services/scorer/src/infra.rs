use house_search::config::AppConfig;
use house_search::error::AppError;
use house_search::listings::{
    KeySpace, ListingRepository, ListingStore, SqliteListingStore, StoreError,
};
use house_search::scoring::{
    BatchReport, CommuteScoringEngine, FactorWeights, ModeWeights, TotalScoreCriteria,
    TotalScorer,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Weights and buyer criteria for one scoring run. Every field falls back to
/// its default when omitted from a request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct ScoreSettings {
    pub(crate) weights: ModeWeights,
    pub(crate) criteria: TotalScoreCriteria,
    pub(crate) factors: FactorWeights,
}

impl ScoreSettings {
    pub(crate) fn validate(&self) -> Result<(), AppError> {
        validate_criteria(&self.criteria)
    }
}

pub(crate) fn validate_criteria(criteria: &TotalScoreCriteria) -> Result<(), AppError> {
    if criteria.min_price <= criteria.max_price {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "price range {}..={} is empty",
            criteria.min_price, criteria.max_price
        )))
    }
}

/// Outcome of the three scoring batches, in the order they ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct RecomputeReport {
    pub(crate) custom_commute: BatchReport,
    pub(crate) downtown_commute: BatchReport,
    pub(crate) total: BatchReport,
}

/// Custom commute first, then downtown commute, then the total score that
/// reads the freshly written downtown values.
pub(crate) fn recompute_all<S: ListingStore>(
    repository: &ListingRepository<S>,
    settings: &ScoreSettings,
) -> Result<RecomputeReport, StoreError> {
    let engine = CommuteScoringEngine::new(repository.clone(), settings.weights);
    let custom_commute = engine.score_custom_all()?;
    let downtown_commute = engine.score_downtown_all()?;
    let total = TotalScorer::new(repository.clone(), settings.criteria, settings.factors)
        .score_total_all()?;

    Ok(RecomputeReport {
        custom_commute,
        downtown_commute,
        total,
    })
}

pub(crate) fn open_repository(
    config: &AppConfig,
    db: Option<PathBuf>,
) -> Result<ListingRepository<SqliteListingStore>, AppError> {
    let path = db.unwrap_or_else(|| config.store.db_path.clone());
    let store = SqliteListingStore::open(&path)?;
    info!(
        path = %path.display(),
        namespace = %config.store.namespace,
        "opened listing store"
    );
    Ok(ListingRepository::new(
        Arc::new(store),
        KeySpace::new(&config.store.namespace),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use house_search::listings::{InMemoryListingStore, Listing, ListingKey, ScoreKind};

    #[test]
    fn settings_fill_omitted_fields_with_defaults() {
        let settings: ScoreSettings =
            serde_json::from_str(r#"{ "weights": { "walk": 3.0 }, "criteria": { "max_price": 600000 } }"#)
                .expect("settings parse");

        assert_eq!(settings.weights.walk, 3.0);
        assert_eq!(settings.weights.drive, 1.0);
        assert_eq!(settings.criteria.min_price, 0.0);
        assert_eq!(settings.criteria.max_price, 600000.0);
        assert_eq!(settings.factors, FactorWeights::uniform());
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let mut settings = ScoreSettings::default();
        settings.criteria.min_price = 900000.0;
        settings.criteria.max_price = 100000.0;

        assert!(matches!(settings.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn recompute_runs_every_batch() {
        let repository = ListingRepository::new(
            Arc::new(InMemoryListingStore::new()),
            KeySpace::new("house-search"),
        );
        let key = ListingKey::new("a");
        repository
            .put_listing(
                &key,
                &Listing {
                    price: Some(500000.0),
                    ..Listing::default()
                },
            )
            .expect("listing stored");

        let report = recompute_all(&repository, &ScoreSettings::default()).expect("recompute");

        assert_eq!(report.custom_commute.skipped.len(), 1);
        assert_eq!(report.downtown_commute.skipped.len(), 1);
        // price fit only: (10 + 0 + 0) / 3
        let total = report.total.score_for(&key).expect("total scored");
        assert!((total - 10.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            repository.score(&key, ScoreKind::Total).expect("read"),
            Some(total)
        );
    }
}
