mod calendar;
mod garde;
mod list;
mod seed;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "gardes-cli")]
#[command(about = "Pharmacy on-call directory command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Upsert pharmacies from the YAML seed file.
    Seed {
        /// Seed file path; defaults to GARDES_PHARMACIES_PATH or ./config/pharmacies.yaml.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Manage and inspect on-call assignments.
    Garde {
        #[command(subcommand)]
        action: garde::GardeAction,
    },
    /// Render a calendar view of the on-call schedule.
    Calendar {
        /// View granularity: day, week, or month.
        #[arg(long, default_value = "month")]
        mode: String,
        /// Reference date (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List pharmacies, optionally filtered.
    List {
        /// Case-insensitive substring match on name or address.
        #[arg(long)]
        search: Option<String>,
        /// Only pharmacies flagged on-call.
        #[arg(long)]
        on_call: bool,
        /// Only pharmacies with parking.
        #[arg(long)]
        parking: bool,
        /// Only pharmacies with reduced-mobility access.
        #[arg(long)]
        pmr: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Seed { file } => seed::run(file).await,
        Commands::Garde { action } => garde::run(action).await,
        Commands::Calendar { mode, date } => calendar::run(&mode, date).await,
        Commands::List {
            search,
            on_call,
            parking,
            pmr,
        } => list::run(search, on_call, parking, pmr).await,
    }
}
