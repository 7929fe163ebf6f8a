//! Rates Import CLI
//!
//! Command-line driver for the daily and bulk rate imports, the job the
//! nightly scheduler runs with the `daily` command.

use anyhow::Result;
use chrono::{Days, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rates_hex::Importer;
use rates_repo::{OpenExchangeRates, build_store};

#[derive(Parser)]
#[command(name = "rates-import")]
#[command(author, version, about = "Exchange rate import CLI", long_about = None)]
struct Cli {
    /// Database URL of the rate store
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// openexchangerates.org application id
    #[arg(long, env = "OPEN_EXCHANGE_RATE_APP_ID")]
    app_id: String,

    /// Override the provider host (testing against a stub)
    #[arg(long, env = "OPEN_EXCHANGE_RATE_URL")]
    provider_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import one calendar day
    Date {
        /// Day to import (YYYY-MM-DD)
        date: NaiveDate,
    },
    /// Import a range of days; start inclusive, end exclusive
    Range {
        /// First day to import (YYYY-MM-DD)
        start: NaiveDate,
        /// Day to stop before (YYYY-MM-DD)
        end: NaiveDate,
    },
    /// Import yesterday's rates (the nightly cron entry point)
    Daily,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rates_cli=debug,rates_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let store = build_store(&cli.database_url).await?;
    let mut provider = OpenExchangeRates::new(&cli.app_id);
    if let Some(url) = &cli.provider_url {
        provider = provider.with_base_url(url);
    }
    let importer = Importer::new(store, provider);

    match cli.command {
        Commands::Date { date } => {
            let written = importer.import_date(date).await?;
            println!("Imported {}: {} base currencies", date, written);
        }

        Commands::Range { start, end } => {
            if end <= start {
                anyhow::bail!("end must be after start (end is exclusive)");
            }
            let summary = importer.import_date_range(start, end).await?;
            for day in &summary.days {
                match &day.result {
                    Ok(written) => println!("{}: {} base currencies", day.date, written),
                    Err(err) => println!("{}: FAILED ({})", day.date, err),
                }
            }
            println!(
                "Imported {} day(s), {} failed",
                summary.imported(),
                summary.failed()
            );
            if summary.failed() > 0 {
                std::process::exit(1);
            }
        }

        Commands::Daily => {
            let yesterday = Utc::now()
                .date_naive()
                .checked_sub_days(Days::new(1))
                .ok_or_else(|| anyhow::anyhow!("cannot compute yesterday"))?;
            let written = importer.import_date(yesterday).await?;
            println!("Imported {}: {} base currencies", yesterday, written);
        }
    }

    Ok(())
}
