mod config;
mod error;
mod loader;
mod models;
mod pipeline;
mod scraper;
mod storage;
mod utils;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;
use crate::loader::load_raw_csv;
use crate::pipeline::Pipeline;
use crate::storage::files::write_csv;
use crate::storage::Repository;

#[derive(Parser)]
#[command(name = "fashion-etl", about = "Fashion catalog scrape → clean → load", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Args)]
struct RangeArgs {
    /// First catalog page (default from config: 1)
    #[arg(long)]
    start: Option<u32>,

    /// Last catalog page (default from config: 50)
    #[arg(long)]
    end: Option<u32>,

    /// Stop after this many products (default from config: 1000)
    #[arg(long)]
    max: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape, clean and load into every sink
    Run {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Scrape only, writing the raw CSV
    Extract {
        #[command(flatten)]
        range: RangeArgs,

        /// Raw CSV path (default from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Clean a previously extracted raw CSV
    Transform {
        /// Raw CSV path (default from config)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Clean CSV path (default from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show database statistics
    Stats,

    /// Apply schema migrations without loading data
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "fashion_etl=info,warn",
        1 => "fashion_etl=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Run { range } => {
            let _t = utils::Timer::start("ETL run");
            let pipeline = Pipeline::new(config.clone());
            let outcome = match config.scraper.page_range(range.start, range.end, range.max) {
                Ok(range) => pipeline.run(range).await,
                Err(e) => Err(e.into()),
            };
            if let Err(e) = outcome {
                error!("ETL run failed: {:#}", e);
            }
        }

        Command::Extract { range, output } => {
            let range = config.scraper.page_range(range.start, range.end, range.max)?;
            let raw = Pipeline::new(config.clone()).extract(range).await?;
            let path = output.unwrap_or(config.storage.raw_csv_path);
            write_csv(&path, &raw)?;
            info!("Extracted {} products to {:?}", raw.len(), path);
        }

        Command::Transform { input, output } => {
            let input = input.unwrap_or_else(|| config.storage.raw_csv_path.clone());
            let output = output.unwrap_or_else(|| config.storage.clean_csv_path.clone());
            let raw = load_raw_csv(&input)?;
            let clean = Pipeline::new(config).transform(raw)?;
            write_csv(&output, &clean)?;
            info!("Saved {} clean rows to {:?}", clean.len(), output);
        }

        Command::Stats => {
            let repo = Repository::open(&config.storage.db_path)?;
            repo.run_migrations()?;
            let products = repo.product_count()?;
            let (min, max) = repo.price_range().unwrap_or((None, None));
            let last = repo.last_run()?;
            let amount = |v: Option<f64>| v.map(utils::fmt_amount).unwrap_or("—".into());
            println!("─────────────────────────────────");
            println!("  Fashion ETL — Database Stats");
            println!("─────────────────────────────────");
            println!("  Products  : {}", products);
            println!("  Min price : {}", amount(min));
            println!("  Max price : {}", amount(max));
            match last {
                Some((at, n)) => println!("  Last run  : {} ({} rows)", at, n),
                None => println!("  Last run  : —"),
            }
            println!("─────────────────────────────────");
        }

        Command::Migrate => {
            Repository::open(&config.storage.db_path)?.run_migrations()?;
            println!("Migrations applied.");
        }
    }

    Ok(())
}
