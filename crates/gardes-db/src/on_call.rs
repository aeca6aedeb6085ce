//! Database operations for the `on_call_assignments` table.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::pharmacies::PharmacyRow;
use crate::DbError;

/// One (date, pharmacy public id) assignment pair within a queried range.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssignmentRow {
    pub on_date: NaiveDate,
    pub pharmacy_id: Uuid,
}

/// Return the pharmacies assigned to on-call duty on `date`, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_on_call_for_date(
    pool: &PgPool,
    date: NaiveDate,
) -> Result<Vec<PharmacyRow>, DbError> {
    let rows = sqlx::query_as::<_, PharmacyRow>(
        "SELECT p.id, p.public_id, p.slug, p.name, p.address, p.phone, \
                p.latitude, p.longitude, p.opening_hours, p.is_on_call, \
                p.has_parking, p.is_pmr, p.is_active, p.created_at, p.updated_at \
         FROM pharmacies p \
         JOIN on_call_assignments a ON a.pharmacy_id = p.id \
         WHERE a.on_date = $1 AND p.is_active = TRUE \
         ORDER BY p.name",
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Return the dates in the inclusive range with at least one assignment,
/// ordered by date.
///
/// Feeds the month grid's has-on-call markers.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_on_call_dates_in_range(
    pool: &PgPool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<NaiveDate>, DbError> {
    let dates = sqlx::query_scalar::<_, NaiveDate>(
        "SELECT DISTINCT a.on_date \
         FROM on_call_assignments a \
         JOIN pharmacies p ON p.id = a.pharmacy_id \
         WHERE a.on_date BETWEEN $1 AND $2 AND p.is_active = TRUE \
         ORDER BY a.on_date",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(dates)
}

/// Return the (date, pharmacy public id) assignment pairs in the inclusive
/// range, ordered by date.
///
/// Backs in-memory schedule projection over a cursor's range.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_assignments_in_range(
    pool: &PgPool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<AssignmentRow>, DbError> {
    let rows = sqlx::query_as::<_, AssignmentRow>(
        "SELECT a.on_date, p.public_id AS pharmacy_id \
         FROM on_call_assignments a \
         JOIN pharmacies p ON p.id = a.pharmacy_id \
         WHERE a.on_date BETWEEN $1 AND $2 AND p.is_active = TRUE \
         ORDER BY a.on_date",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Assign a pharmacy (by slug) to on-call duty on `date`.
///
/// Assigning the same pharmacy to the same date twice is a no-op.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no active pharmacy has the slug, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn assign_on_call(pool: &PgPool, slug: &str, date: NaiveDate) -> Result<(), DbError> {
    let result = sqlx::query(
        "INSERT INTO on_call_assignments (pharmacy_id, on_date) \
         SELECT id, $2 FROM pharmacies WHERE slug = $1 AND is_active = TRUE \
         ON CONFLICT (pharmacy_id, on_date) DO NOTHING",
    )
    .bind(slug)
    .bind(date)
    .execute(pool)
    .await?;

    // Zero rows means either the slug matched nothing or the assignment
    // already existed; disambiguate with a lookup.
    if result.rows_affected() == 0 {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM pharmacies WHERE slug = $1 AND is_active = TRUE)",
        )
        .bind(slug)
        .fetch_one(pool)
        .await?;
        if !exists {
            return Err(DbError::NotFound);
        }
    }

    Ok(())
}

/// Remove a pharmacy's (by slug) on-call assignment for `date`.
///
/// Returns `true` if an assignment was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn unassign_on_call(pool: &PgPool, slug: &str, date: NaiveDate) -> Result<bool, DbError> {
    let result = sqlx::query(
        "DELETE FROM on_call_assignments a \
         USING pharmacies p \
         WHERE a.pharmacy_id = p.id AND p.slug = $1 AND a.on_date = $2",
    )
    .bind(slug)
    .bind(date)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
