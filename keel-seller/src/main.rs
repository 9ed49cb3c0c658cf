use keel::{
    ConnectionConfig, ConnectionProvider, Result,
    seller::{NewSeller, insert_seller, report},
};
use keel_sqlite::SqliteDriver;
use std::process::ExitCode;

/// Used when `KEEL_DATABASE_URL` is not set. The database must already exist.
const DEFAULT_URL: &str = "sqlite://seller.sqlite?mode=rw";

async fn run() -> Result<Vec<String>> {
    let config = match ConnectionConfig::from_env()? {
        Some(config) => config,
        None => ConnectionConfig::parse(DEFAULT_URL)?,
    };
    let provider = ConnectionProvider::new(SqliteDriver::new(), config);
    let result = insert_seller(&provider, &NewSeller::carl_purple()).await?;
    Ok(report(result))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match run().await {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Could not insert the seller ({} error): {:#}", e.kind(), e);
            ExitCode::FAILURE
        }
    }
}
