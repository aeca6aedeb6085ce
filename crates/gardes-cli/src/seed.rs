//! `seed` command: upsert pharmacies from the YAML seed file.

use std::path::PathBuf;

use anyhow::Context;

pub async fn run(file: Option<PathBuf>) -> anyhow::Result<()> {
    let path = file.unwrap_or_else(|| {
        PathBuf::from(
            std::env::var("GARDES_PHARMACIES_PATH")
                .unwrap_or_else(|_| "./config/pharmacies.yaml".to_string()),
        )
    });

    let file = gardes_core::load_pharmacies(&path)
        .with_context(|| format!("loading pharmacies from {}", path.display()))?;
    tracing::info!(count = file.pharmacies.len(), path = %path.display(), "loaded seed file");

    let pool = gardes_db::connect_pool_from_env()
        .await
        .context("connecting to database")?;
    let applied = gardes_db::run_migrations(&pool)
        .await
        .context("running migrations")?;
    if applied > 0 {
        tracing::info!(applied, "applied pending migrations");
    }

    let count = gardes_db::seed_pharmacies(&pool, &file.pharmacies)
        .await
        .context("seeding pharmacies")?;
    println!("seeded {count} pharmacies from {}", path.display());

    Ok(())
}
