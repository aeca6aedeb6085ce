//! `garde` command: manage and inspect on-call assignments.

use anyhow::Context;
use chrono::NaiveDate;
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum GardeAction {
    /// Assign a pharmacy to on-call duty on a date.
    Assign {
        /// Pharmacy slug (as listed by `gardes-cli list`).
        #[arg(long)]
        pharmacy: String,
        /// Date (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,
    },
    /// Remove a pharmacy's on-call assignment for a date.
    Remove {
        #[arg(long)]
        pharmacy: String,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Show the pharmacies on call for a date.
    Show {
        /// Date (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub async fn run(action: GardeAction) -> anyhow::Result<()> {
    let pool = gardes_db::connect_pool_from_env()
        .await
        .context("connecting to database")?;

    match action {
        GardeAction::Assign { pharmacy, date } => {
            gardes_db::assign_on_call(&pool, &pharmacy, date)
                .await
                .with_context(|| format!("assigning '{pharmacy}' to {date}"))?;
            println!("{pharmacy} is on call on {date}");
        }
        GardeAction::Remove { pharmacy, date } => {
            let removed = gardes_db::unassign_on_call(&pool, &pharmacy, date)
                .await
                .with_context(|| format!("removing '{pharmacy}' from {date}"))?;
            if removed {
                println!("{pharmacy} is no longer on call on {date}");
            } else {
                println!("{pharmacy} had no assignment on {date}");
            }
        }
        GardeAction::Show { date } => {
            let date = date.unwrap_or_else(gardes_core::calendar::today);
            let rows = gardes_db::list_on_call_for_date(&pool, date)
                .await
                .context("querying on-call pharmacies")?;
            if rows.is_empty() {
                println!("{date}: no pharmacy on call");
            } else {
                println!("{date}: {} pharmacie(s) de garde", rows.len());
                for row in rows {
                    let phone = row.phone.as_deref().unwrap_or("-");
                    println!("  {}  {}  {}", row.name, row.address, phone);
                }
            }
        }
    }

    Ok(())
}
