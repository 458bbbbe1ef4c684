mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use hk_card_compare::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
