//! Database operations for the `pharmacy_reviews` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `pharmacy_reviews` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub pharmacy_id: i64,
    pub author: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Average rating and review count for one pharmacy.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RatingSummaryRow {
    pub average_rating: Option<f64>,
    pub review_count: i64,
}

/// List reviews for a pharmacy (by public id), newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reviews(pool: &PgPool, public_id: Uuid) -> Result<Vec<ReviewRow>, DbError> {
    let rows = sqlx::query_as::<_, ReviewRow>(
        "SELECT r.id, r.pharmacy_id, r.author, r.rating, r.comment, r.created_at \
         FROM pharmacy_reviews r \
         JOIN pharmacies p ON p.id = r.pharmacy_id \
         WHERE p.public_id = $1 \
         ORDER BY r.created_at DESC",
    )
    .bind(public_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Insert a review for a pharmacy (by public id) and return the stored row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the pharmacy does not exist, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn insert_review(
    pool: &PgPool,
    public_id: Uuid,
    author: &str,
    rating: i16,
    comment: Option<&str>,
) -> Result<ReviewRow, DbError> {
    let row = sqlx::query_as::<_, ReviewRow>(
        "INSERT INTO pharmacy_reviews (pharmacy_id, author, rating, comment) \
         SELECT id, $2, $3, $4 FROM pharmacies WHERE public_id = $1 AND is_active = TRUE \
         RETURNING id, pharmacy_id, author, rating, comment, created_at",
    )
    .bind(public_id)
    .bind(author)
    .bind(rating)
    .bind(comment)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Average rating and count for a pharmacy (by public id).
///
/// A pharmacy with no reviews yields `average_rating = None`, `review_count = 0`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_rating_summary(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<RatingSummaryRow, DbError> {
    let row = sqlx::query_as::<_, RatingSummaryRow>(
        "SELECT AVG(r.rating)::float8 AS average_rating, COUNT(r.id) AS review_count \
         FROM pharmacies p \
         LEFT JOIN pharmacy_reviews r ON r.pharmacy_id = p.id \
         WHERE p.public_id = $1",
    )
    .bind(public_id)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
