//! Database operations for the `pharmacies` table.

use chrono::{DateTime, Utc};
use gardes_core::{OpeningHours, Pharmacy, PharmacyConfig, PharmacyFilters};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `pharmacies` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PharmacyRow {
    pub id: i64,
    pub public_id: Uuid,
    pub slug: String,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub opening_hours: serde_json::Value,
    pub is_on_call: bool,
    pub has_parking: bool,
    pub is_pmr: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PharmacyRow {
    /// Convert into the shared domain type.
    ///
    /// Malformed `opening_hours` JSON degrades to empty hours rather than
    /// failing the whole query; the seed path validates the structure, so
    /// this only covers rows written outside the application.
    #[must_use]
    pub fn into_domain(self) -> Pharmacy {
        let opening_hours: OpeningHours =
            serde_json::from_value(self.opening_hours).unwrap_or_default();
        Pharmacy {
            id: self.public_id,
            slug: self.slug,
            name: self.name,
            address: self.address,
            phone: self.phone,
            latitude: self.latitude,
            longitude: self.longitude,
            opening_hours,
            is_on_call: self.is_on_call,
            has_parking: self.has_parking,
            is_pmr: self.is_pmr,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const PHARMACY_COLUMNS: &str = "id, public_id, slug, name, address, phone, latitude, longitude, \
     opening_hours, is_on_call, has_parking, is_pmr, is_active, created_at, updated_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// List active pharmacies matching the filter set, ordered by name.
///
/// Absent filter fields are passed as NULL binds so a single statement
/// covers every filter combination. The text search is a case-insensitive
/// substring match ORed across name and address.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_pharmacies(
    pool: &PgPool,
    filters: &PharmacyFilters,
) -> Result<Vec<PharmacyRow>, DbError> {
    let sql = format!(
        "SELECT {PHARMACY_COLUMNS} \
         FROM pharmacies \
         WHERE is_active = TRUE \
           AND ($1::boolean IS NULL OR is_on_call = $1) \
           AND ($2::boolean IS NULL OR has_parking = $2) \
           AND ($3::boolean IS NULL OR is_pmr = $3) \
           AND ($4::text IS NULL OR name ILIKE '%' || $4 || '%' OR address ILIKE '%' || $4 || '%') \
         ORDER BY name"
    );

    let rows = sqlx::query_as::<_, PharmacyRow>(&sql)
        .bind(filters.is_on_call)
        .bind(filters.has_parking)
        .bind(filters.is_pmr)
        .bind(filters.search_query.as_deref())
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Return a single active pharmacy by public id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_pharmacy(pool: &PgPool, public_id: Uuid) -> Result<Option<PharmacyRow>, DbError> {
    let sql = format!(
        "SELECT {PHARMACY_COLUMNS} \
         FROM pharmacies \
         WHERE public_id = $1 AND is_active = TRUE"
    );

    let row = sqlx::query_as::<_, PharmacyRow>(&sql)
        .bind(public_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Upsert pharmacies from the seed file into the database.
///
/// Returns the number of pharmacies processed (inserted or updated).
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_pharmacies(
    pool: &PgPool,
    pharmacies: &[PharmacyConfig],
) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for pharmacy in pharmacies {
        let slug = pharmacy.slug();
        let opening_hours =
            serde_json::to_value(&pharmacy.opening_hours).unwrap_or_else(|_| serde_json::json!({}));

        sqlx::query(
            "INSERT INTO pharmacies \
                 (slug, name, address, phone, latitude, longitude, opening_hours, \
                  is_on_call, has_parking, is_pmr, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE) \
             ON CONFLICT (slug) DO UPDATE SET \
                 name          = EXCLUDED.name, \
                 address       = EXCLUDED.address, \
                 phone         = EXCLUDED.phone, \
                 latitude      = EXCLUDED.latitude, \
                 longitude     = EXCLUDED.longitude, \
                 opening_hours = EXCLUDED.opening_hours, \
                 is_on_call    = EXCLUDED.is_on_call, \
                 has_parking   = EXCLUDED.has_parking, \
                 is_pmr        = EXCLUDED.is_pmr, \
                 is_active     = TRUE, \
                 updated_at    = NOW()",
        )
        .bind(&slug)
        .bind(&pharmacy.name)
        .bind(&pharmacy.address)
        .bind(&pharmacy.phone)
        .bind(pharmacy.latitude)
        .bind(pharmacy.longitude)
        .bind(&opening_hours)
        .bind(pharmacy.is_on_call)
        .bind(pharmacy.has_parking)
        .bind(pharmacy.is_pmr)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
