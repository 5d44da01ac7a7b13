use crate::infra::{recompute_all, AppState, RecomputeReport, ScoreSettings};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use house_search::error::AppError;
use house_search::listings::{ListingKey, ListingRepository, ListingScores, ListingStore};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Serialize)]
pub(crate) struct ListingScoresResponse {
    pub(crate) listing: ListingKey,
    #[serde(flatten)]
    pub(crate) scores: ListingScores,
}

pub(crate) fn with_scoring_routes<S>(repository: ListingRepository<S>) -> Router
where
    S: ListingStore + 'static,
{
    Router::new()
        .route("/api/v1/listings/:key/scores", get(listing_scores::<S>))
        .route("/api/v1/scores/recompute", post(recompute_scores::<S>))
        .with_state(repository)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn listing_scores<S>(
    State(repository): State<ListingRepository<S>>,
    Path(key): Path<String>,
) -> Result<Json<ListingScoresResponse>, AppError>
where
    S: ListingStore + 'static,
{
    let key = ListingKey::new(key);
    if repository.listing(&key)?.is_none() {
        return Err(AppError::NotFound(format!("listing '{key}'")));
    }

    let scores = repository.scores(&key)?;
    Ok(Json(ListingScoresResponse {
        listing: key,
        scores,
    }))
}

pub(crate) async fn recompute_scores<S>(
    State(repository): State<ListingRepository<S>>,
    Json(settings): Json<ScoreSettings>,
) -> Result<Json<RecomputeReport>, AppError>
where
    S: ListingStore + 'static,
{
    settings.validate()?;
    let report = tokio::task::spawn_blocking(move || recompute_all(&repository, &settings))
        .await
        .map_err(|err| AppError::Interrupted(err.to_string()))??;

    Ok(Json(report))
}
