mod cli;
mod config;
mod ingest;
mod recon;
mod table;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = cli::Cli::parse();
    let db_path = match &args.db {
        Some(path) => path.clone(),
        None => config::database_path()?,
    };
    log::debug!("using database at {}", db_path.display());

    let pool = config::connect(&db_path).await?;
    config::repository::migrations::ensure_schema(&pool).await?;
    config::repository::lists::seed_defaults(&pool).await?;

    cli::run(args.command, &pool).await
}
