use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

pub mod app_config;
pub mod calendar;
pub mod config;
pub mod filters;
pub mod hours;
pub mod links;
pub mod pharmacies;
pub mod schedule;

pub use app_config::{AppConfig, Environment};
pub use calendar::{
    month_grid, start_of_week, today, week_days, DayCell, Direction, MonthGrid, ViewCursor,
    ViewMode,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use filters::PharmacyFilters;
pub use hours::OpeningHours;
pub use links::{dial_link, maps_search_link};
pub use pharmacies::{load_pharmacies, PharmaciesFile, PharmacyConfig};
pub use schedule::{DaySchedule, OnCallSchedule};

/// A pharmacy as seen by calendar projection and the API layer.
///
/// Database row types live in `gardes-db`; this is the shared domain shape.
#[derive(Debug, Clone)]
pub struct Pharmacy {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub opening_hours: OpeningHours,
    pub is_on_call: bool,
    pub has_parking: bool,
    pub is_pmr: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read pharmacies file {path}: {source}")]
    PharmaciesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse pharmacies file: {0}")]
    PharmaciesFileParse(#[from] serde_yaml::Error),
    #[error("pharmacies file validation failed: {0}")]
    Validation(String),
}
