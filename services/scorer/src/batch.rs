use crate::infra::{open_repository, recompute_all, validate_criteria, ScoreSettings};
use clap::Args;
use house_search::commute::{CommuteFetcher, CommuteRecord, FetchReport, HereClient, TravelMode};
use house_search::config::AppConfig;
use house_search::error::AppError;
use house_search::listings::{
    Coordinate, ListingKey, ListingRepository, ScoreKind, SqliteListingStore, StoreError,
};
use house_search::scoring::{
    BatchReport, CommuteScoringEngine, FactorWeights, ListingOutcome, ModeWeights, ScoringError,
    TotalScoreCriteria, TotalScorer,
};
use house_search::telemetry;
use std::path::PathBuf;
use std::sync::Arc;

type Engine = CommuteScoringEngine<SqliteListingStore>;

#[derive(Args, Debug, Default)]
pub(crate) struct StoreArgs {
    /// Override the configured SQLite listing store
    #[arg(long)]
    pub(crate) db: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Copy)]
pub(crate) struct ModeWeightArgs {
    /// Weight of the walking score in the commute composite
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub(crate) walk_weight: f64,
    /// Weight of the cycling score in the commute composite
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub(crate) bike_weight: f64,
    /// Weight of the transit score in the commute composite
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub(crate) transit_weight: f64,
    /// Weight of the driving score in the commute composite
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub(crate) drive_weight: f64,
}

impl From<ModeWeightArgs> for ModeWeights {
    fn from(args: ModeWeightArgs) -> Self {
        ModeWeights {
            walk: args.walk_weight,
            bike: args.bike_weight,
            transit: args.transit_weight,
            drive: args.drive_weight,
        }
    }
}

#[derive(Args, Debug, Clone, Copy)]
pub(crate) struct TotalCriteriaArgs {
    /// Lowest acceptable asking price (inclusive)
    #[arg(long, default_value_t = 0.0)]
    pub(crate) min_price: f64,
    /// Highest acceptable asking price (inclusive)
    #[arg(long, default_value_t = 10_000_000.0)]
    pub(crate) max_price: f64,
    /// Lot sizes must exceed this value to earn the size fit
    #[arg(long, default_value_t = 0)]
    pub(crate) min_lot_size: u64,
    /// Weight of the price fit in the total score
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub(crate) price_weight: f64,
    /// Weight of the downtown commute score in the total score
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub(crate) commute_weight: f64,
    /// Weight of the lot-size fit in the total score
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub(crate) size_weight: f64,
}

impl TotalCriteriaArgs {
    fn criteria(&self) -> TotalScoreCriteria {
        TotalScoreCriteria {
            min_price: self.min_price,
            max_price: self.max_price,
            min_lot_size: self.min_lot_size,
        }
    }

    fn factors(&self) -> FactorWeights {
        FactorWeights {
            price: self.price_weight,
            transit: self.commute_weight,
            size: self.size_weight,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct FetchDowntownArgs {
    #[command(flatten)]
    pub(crate) store: StoreArgs,
    /// Refetch listings that already have a downtown record
    #[arg(long)]
    pub(crate) refresh: bool,
    /// Fetch (and overwrite) a single listing instead of the whole namespace
    #[arg(long)]
    pub(crate) listing: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct PoiAddArgs {
    #[command(flatten)]
    pub(crate) store: StoreArgs,
    /// Listing the point of interest is attached to
    #[arg(long)]
    pub(crate) listing: String,
    /// Latitude of the point of interest
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) latitude: f64,
    /// Longitude of the point of interest
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) longitude: f64,
}

#[derive(Args, Debug)]
pub(crate) struct CommuteScoreArgs {
    #[command(flatten)]
    pub(crate) store: StoreArgs,
    /// Score a single listing instead of the whole namespace
    #[arg(long)]
    pub(crate) listing: Option<String>,
    #[command(flatten)]
    pub(crate) weights: ModeWeightArgs,
}

#[derive(Args, Debug)]
pub(crate) struct TotalScoreArgs {
    #[command(flatten)]
    pub(crate) store: StoreArgs,
    /// Score a single listing instead of the whole namespace
    #[arg(long)]
    pub(crate) listing: Option<String>,
    #[command(flatten)]
    pub(crate) criteria: TotalCriteriaArgs,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreAllArgs {
    #[command(flatten)]
    pub(crate) store: StoreArgs,
    #[command(flatten)]
    pub(crate) weights: ModeWeightArgs,
    #[command(flatten)]
    pub(crate) criteria: TotalCriteriaArgs,
}

#[derive(Args, Debug)]
pub(crate) struct ShowArgs {
    #[command(flatten)]
    pub(crate) store: StoreArgs,
    /// Listing to print
    #[arg(long)]
    pub(crate) listing: String,
}

struct BatchContext {
    config: AppConfig,
    repository: ListingRepository<SqliteListingStore>,
}

impl BatchContext {
    fn prepare(store: StoreArgs) -> Result<Self, AppError> {
        let config = AppConfig::load()?;
        telemetry::init(&config.telemetry)?;
        let repository = open_repository(&config, store.db)?;
        Ok(Self { config, repository })
    }

    fn fetcher(
        &self,
    ) -> Result<CommuteFetcher<SqliteListingStore, HereClient, HereClient>, AppError> {
        let client = Arc::new(HereClient::new(self.config.provider.require_api_key()?)?);
        Ok(CommuteFetcher::new(
            self.repository.clone(),
            client.clone(),
            client,
            self.config.downtown,
        ))
    }
}

pub(crate) fn run_fetch_downtown(args: FetchDowntownArgs) -> Result<(), AppError> {
    let FetchDowntownArgs {
        store,
        refresh,
        listing,
    } = args;
    let context = BatchContext::prepare(store)?;
    let fetcher = context.fetcher()?;

    match listing {
        Some(key) => {
            let key = ListingKey::new(key);
            let record = fetcher.fetch_downtown_for_one(&key)?;
            println!("Downtown commute for {key}");
            render_record(&record);
        }
        None => {
            let report = fetcher.fetch_downtown_for_all(refresh)?;
            render_fetch_report(&report);
        }
    }
    Ok(())
}

pub(crate) fn run_poi_add(args: PoiAddArgs) -> Result<(), AppError> {
    let PoiAddArgs {
        store,
        listing,
        latitude,
        longitude,
    } = args;
    let context = BatchContext::prepare(store)?;
    let key = ListingKey::new(listing);
    let id = context
        .fetcher()?
        .attach_point_of_interest(&key, Coordinate::new(latitude, longitude))?;

    println!("Attached point of interest {id} to {key}");
    Ok(())
}

pub(crate) fn run_score_downtown(args: CommuteScoreArgs) -> Result<(), AppError> {
    run_commute_score(
        args,
        ScoreKind::DowntownCommute,
        Engine::score_downtown_one,
        Engine::score_downtown_all,
    )
}

pub(crate) fn run_score_custom(args: CommuteScoreArgs) -> Result<(), AppError> {
    run_commute_score(
        args,
        ScoreKind::CustomCommute,
        Engine::score_custom_one,
        Engine::score_custom_all,
    )
}

fn run_commute_score(
    args: CommuteScoreArgs,
    kind: ScoreKind,
    one: fn(&Engine, &ListingKey) -> ListingOutcome,
    all: fn(&Engine) -> Result<BatchReport, StoreError>,
) -> Result<(), AppError> {
    let CommuteScoreArgs {
        store,
        listing,
        weights,
    } = args;
    let context = BatchContext::prepare(store)?;
    let engine = CommuteScoringEngine::new(context.repository.clone(), weights.into());

    match listing {
        Some(key) => {
            let key = ListingKey::new(key);
            render_outcome(kind, &key, one(&engine, &key))
        }
        None => {
            render_batch(kind, &all(&engine)?);
            Ok(())
        }
    }
}

pub(crate) fn run_score_total(args: TotalScoreArgs) -> Result<(), AppError> {
    let TotalScoreArgs {
        store,
        listing,
        criteria,
    } = args;
    validate_criteria(&criteria.criteria())?;
    let context = BatchContext::prepare(store)?;
    let scorer = TotalScorer::new(
        context.repository.clone(),
        criteria.criteria(),
        criteria.factors(),
    );

    match listing {
        Some(key) => {
            let key = ListingKey::new(key);
            render_outcome(ScoreKind::Total, &key, scorer.score_total_one(&key))
        }
        None => {
            render_batch(ScoreKind::Total, &scorer.score_total_all()?);
            Ok(())
        }
    }
}

pub(crate) fn run_score_all(args: ScoreAllArgs) -> Result<(), AppError> {
    let ScoreAllArgs {
        store,
        weights,
        criteria,
    } = args;
    let settings = ScoreSettings {
        weights: weights.into(),
        criteria: criteria.criteria(),
        factors: criteria.factors(),
    };
    settings.validate()?;
    let context = BatchContext::prepare(store)?;

    let report = recompute_all(&context.repository, &settings)?;
    render_batch(ScoreKind::CustomCommute, &report.custom_commute);
    render_batch(ScoreKind::DowntownCommute, &report.downtown_commute);
    render_batch(ScoreKind::Total, &report.total);
    Ok(())
}

pub(crate) fn run_show(args: ShowArgs) -> Result<(), AppError> {
    let context = BatchContext::prepare(args.store)?;
    let repository = &context.repository;
    let key = ListingKey::new(args.listing);
    let listing = repository
        .listing(&key)?
        .ok_or_else(|| AppError::NotFound(format!("listing '{key}'")))?;

    println!("Listing {key}");
    println!("  address: {}", listing.address.as_deref().unwrap_or("-"));
    println!("  price: {}", optional_number(listing.price));
    println!("  lot size: {}", listing.lot_size.as_deref().unwrap_or("-"));
    match repository.cached_coordinate(&key)? {
        Some(coordinate) => println!(
            "  coordinate: {:.5}, {:.5}",
            coordinate.latitude, coordinate.longitude
        ),
        None => println!("  coordinate: not resolved"),
    }

    match repository.downtown_record(&key)? {
        Some(record) => {
            println!("\nDowntown commute");
            render_record(&record);
        }
        None => println!("\nDowntown commute: not fetched"),
    }

    let points = repository.poi_records(&key)?;
    println!("\nPoints of interest: {}", points.len());
    for (id, record) in &points {
        println!("  {id}");
        render_record(record);
    }

    println!("\nScores");
    for kind in ScoreKind::ordered() {
        println!(
            "  {:<24} {}",
            kind.suffix(),
            optional_number(repository.score(&key, kind)?)
        );
    }
    Ok(())
}

fn render_record(record: &CommuteRecord) {
    for mode in TravelMode::ordered() {
        match record.minutes(mode) {
            Some(minutes) => println!("    {:<8} {minutes:>4} min", mode.label()),
            None => println!("    {:<8} unobserved", mode.label()),
        }
    }
    if let Some(sections) = record.transit_sections() {
        println!("    transit sections: {sections}");
    }
}

fn render_fetch_report(report: &FetchReport) {
    println!(
        "Downtown commute fetch: {} fetched, {} already cached, {} failed",
        report.fetched.len(),
        report.cached.len(),
        report.failed.len()
    );
    for (key, reason) in &report.failed {
        println!("  {key} failed: {reason}");
    }
}

fn render_batch(kind: ScoreKind, report: &BatchReport) {
    println!(
        "{}: {} scored, {} skipped, {} failed",
        kind.suffix(),
        report.scored.len(),
        report.skipped.len(),
        report.failed.len()
    );
    for entry in &report.scored {
        println!("  {:<32} {:.2}", entry.listing, entry.score);
    }
    for entry in &report.skipped {
        println!("  {:<32} skipped ({})", entry.listing, entry.reason);
    }
    for entry in &report.failed {
        println!("  {:<32} failed: {}", entry.listing, entry.error);
    }
}

fn render_outcome(
    kind: ScoreKind,
    key: &ListingKey,
    outcome: ListingOutcome,
) -> Result<(), AppError> {
    match outcome {
        ListingOutcome::Scored(score) => {
            println!("{} for {key}: {score:.2}", kind.suffix());
            Ok(())
        }
        ListingOutcome::Skipped(reason) => {
            println!("{} for {key}: skipped ({reason})", kind.suffix());
            Ok(())
        }
        ListingOutcome::Failed(ScoringError::Store(err)) => Err(err.into()),
    }
}

fn optional_number(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{value:.2}"))
}
