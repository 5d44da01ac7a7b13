use crate::batch::{
    run_fetch_downtown, run_poi_add, run_score_all, run_score_custom, run_score_downtown,
    run_score_total, run_show, CommuteScoreArgs, FetchDowntownArgs, PoiAddArgs, ScoreAllArgs,
    ShowArgs, TotalScoreArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use house_search::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "house-search-scorer",
    about = "Fetch commute data and score real-estate listings from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Query travel times and cache commute records
    Fetch {
        #[command(subcommand)]
        command: FetchCommand,
    },
    /// Manage custom points of interest attached to listings
    Poi {
        #[command(subcommand)]
        command: PoiCommand,
    },
    /// Compute and store listing scores
    Score {
        #[command(subcommand)]
        command: ScoreCommand,
    },
    /// Print a listing with its cached commute data and scores
    Show(ShowArgs),
}

#[derive(Subcommand, Debug)]
enum FetchCommand {
    /// Fetch listing-to-downtown commute records
    Downtown(FetchDowntownArgs),
}

#[derive(Subcommand, Debug)]
enum PoiCommand {
    /// Fetch a commute record towards a point of interest and attach it to a listing
    Add(PoiAddArgs),
}

#[derive(Subcommand, Debug)]
enum ScoreCommand {
    /// Score the commute to downtown
    Downtown(CommuteScoreArgs),
    /// Score the commute to each listing's attached points of interest
    Custom(CommuteScoreArgs),
    /// Blend price fit, lot-size fit, and the downtown commute score
    Total(TotalScoreArgs),
    /// Run the custom, downtown, and total batches in that order
    All(ScoreAllArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured SQLite listing store
    #[arg(long)]
    pub(crate) db: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Fetch {
            command: FetchCommand::Downtown(args),
        } => blocking(move || run_fetch_downtown(args)).await,
        Command::Poi {
            command: PoiCommand::Add(args),
        } => blocking(move || run_poi_add(args)).await,
        Command::Score { command } => match command {
            ScoreCommand::Downtown(args) => blocking(move || run_score_downtown(args)).await,
            ScoreCommand::Custom(args) => blocking(move || run_score_custom(args)).await,
            ScoreCommand::Total(args) => blocking(move || run_score_total(args)).await,
            ScoreCommand::All(args) => blocking(move || run_score_all(args)).await,
        },
        Command::Show(args) => blocking(move || run_show(args)).await,
    }
}

/// Batch commands use the blocking HTTP client and SQLite, so they run off
/// the async worker threads.
async fn blocking<F>(job: F) -> Result<(), AppError>
where
    F: FnOnce() -> Result<(), AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|err| AppError::Interrupted(err.to_string()))?
}
