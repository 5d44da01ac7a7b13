mod batch;
mod cli;
mod infra;
mod routes;
mod server;

use house_search::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
