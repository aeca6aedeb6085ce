//! Pharmacy directory endpoints: filtered list, detail, reviews.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use gardes_core::{dial_link, maps_search_link, OpeningHours, PharmacyFilters};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    search: Option<String>,
    on_call: Option<bool>,
    parking: Option<bool>,
    pmr: Option<bool>,
}

impl ListQuery {
    fn into_filters(self) -> PharmacyFilters {
        PharmacyFilters {
            search_query: self.search.filter(|s| !s.trim().is_empty()),
            is_on_call: self.on_call,
            has_parking: self.parking,
            is_pmr: self.pmr,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct PharmacyListItem {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_on_call: bool,
    pub has_parking: bool,
    pub is_pmr: bool,
}

impl From<gardes_db::PharmacyRow> for PharmacyListItem {
    fn from(row: gardes_db::PharmacyRow) -> Self {
        Self {
            id: row.public_id,
            slug: row.slug,
            name: row.name,
            address: row.address,
            phone: row.phone,
            latitude: row.latitude,
            longitude: row.longitude,
            is_on_call: row.is_on_call,
            has_parking: row.has_parking,
            is_pmr: row.is_pmr,
        }
    }
}

pub(super) async fn list_pharmacies(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<PharmacyListItem>>>, ApiError> {
    let filters = query.into_filters();
    let rows = gardes_db::list_pharmacies(&state.pool, &filters)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(PharmacyListItem::from).collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct PharmacyDetailResponse {
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
    /// `tel:` deep link, present when a phone number is on file.
    pub dial_link: Option<String>,
    /// Maps search deep link, present when coordinates are on file.
    pub maps_link: Option<String>,
    pub average_rating: Option<f64>,
    pub review_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(super) async fn get_pharmacy(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PharmacyDetailResponse>>, ApiError> {
    let row = gardes_db::get_pharmacy(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "pharmacy not found"))?;

    let rating = gardes_db::get_rating_summary(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let pharmacy = row.into_domain();
    let dial = pharmacy.phone.as_deref().map(dial_link);
    let maps = match (pharmacy.latitude, pharmacy.longitude) {
        (Some(lat), Some(lng)) => Some(maps_search_link(lat, lng)),
        _ => None,
    };

    let data = PharmacyDetailResponse {
        id: pharmacy.id,
        slug: pharmacy.slug,
        name: pharmacy.name,
        address: pharmacy.address,
        phone: pharmacy.phone,
        latitude: pharmacy.latitude,
        longitude: pharmacy.longitude,
        opening_hours: pharmacy.opening_hours,
        is_on_call: pharmacy.is_on_call,
        has_parking: pharmacy.has_parking,
        is_pmr: pharmacy.is_pmr,
        dial_link: dial,
        maps_link: maps,
        average_rating: rating.average_rating,
        review_count: rating.review_count,
        created_at: pharmacy.created_at,
        updated_at: pharmacy.updated_at,
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct ReviewItem {
    pub id: i64,
    pub author: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<gardes_db::ReviewRow> for ReviewItem {
    fn from(row: gardes_db::ReviewRow) -> Self {
        Self {
            id: row.id,
            author: row.author,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

pub(super) async fn list_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ReviewItem>>>, ApiError> {
    let rows = gardes_db::list_reviews(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(ReviewItem::from).collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateReviewRequest {
    author: String,
    rating: i16,
    comment: Option<String>,
}

pub(super) async fn create_review(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateReviewRequest>,
) -> Result<Json<ApiResponse<ReviewItem>>, ApiError> {
    if body.author.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "author must be non-empty",
        ));
    }
    if !(1..=5).contains(&body.rating) {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "rating must be between 1 and 5",
        ));
    }

    let row = gardes_db::insert_review(
        &state.pool,
        id,
        body.author.trim(),
        body.rating,
        body.comment.as_deref().map(str::trim).filter(|c| !c.is_empty()),
    )
    .await
    .map_err(|e| match e {
        gardes_db::DbError::NotFound => {
            ApiError::new(req_id.0.clone(), "not_found", "pharmacy not found")
        }
        other => map_db_error(req_id.0.clone(), &other),
    })?;

    Ok(Json(ApiResponse {
        data: ReviewItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}
