mod garde;
mod pharmacies;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<gardes_core::AppConfig>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &gardes_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/pharmacies", get(pharmacies::list_pharmacies))
        .route("/api/v1/pharmacies/{id}", get(pharmacies::get_pharmacy))
        .route(
            "/api/v1/pharmacies/{id}/reviews",
            get(pharmacies::list_reviews).post(pharmacies::create_review),
        )
        .route("/api/v1/garde", get(garde::list_on_call))
        .route("/api/v1/garde/week", get(garde::week_schedule))
        .route("/api/v1/garde/calendar", get(garde::month_calendar))
        .route("/api/v1/config/map", get(map_config))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match gardes_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[derive(Debug, Serialize)]
struct MapConfigData {
    token: String,
}

/// Hand the configured map-provider token to the client.
///
/// The token is explicit configuration (`GARDES_MAP_TOKEN`); when unset the
/// client falls back to prompting the user for one.
async fn map_config(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<MapConfigData>>, ApiError> {
    let token = state
        .config
        .map_token
        .clone()
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "no map token configured"))?;

    Ok(Json(ApiResponse {
        data: MapConfigData { token },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::path::PathBuf;

    use super::garde::{CalendarCellItem, OnCallDayItem};
    use super::pharmacies::PharmacyListItem;
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::NaiveDate;
    use gardes_core::{AppConfig, Environment};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn test_config(map_token: Option<&str>) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            database_url: "postgres://example".to_string(),
            env: Environment::Test,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            log_level: "info".to_string(),
            pharmacies_path: PathBuf::from("./config/pharmacies.yaml"),
            map_token: map_token.map(ToOwned::to_owned),
            db_max_connections: 10,
            db_min_connections: 1,
            db_acquire_timeout_secs: 10,
        })
    }

    fn test_app(pool: sqlx::PgPool, map_token: Option<&str>) -> Router {
        let auth = crate::middleware::AuthState::from_env(&Environment::Test).expect("auth");
        build_app(
            AppState {
                pool,
                config: test_config(map_token),
            },
            auth,
            default_rate_limit_state(),
        )
    }

    // -------------------------------------------------------------------------
    // Serialization unit tests (no DB)
    // -------------------------------------------------------------------------

    #[test]
    fn pharmacy_list_item_is_serializable() {
        let item = PharmacyListItem {
            id: Uuid::new_v4(),
            slug: "pharmacie-du-nord".to_string(),
            name: "Pharmacie du Nord".to_string(),
            address: "Quartier Pitoaré, Route de Kousséri".to_string(),
            phone: Some("+237 696 456 789".to_string()),
            latitude: Some(9.3017),
            longitude: Some(13.3921),
            is_on_call: true,
            has_parking: true,
            is_pmr: false,
        };
        let json = serde_json::to_string(&item).expect("serialize");
        assert!(json.contains("\"slug\":\"pharmacie-du-nord\""));
        assert!(json.contains("\"is_on_call\":true"));
    }

    #[test]
    fn calendar_cell_item_serializes_blanks_as_null() {
        let cells = vec![
            None,
            Some(CalendarCellItem {
                date: NaiveDate::from_ymd_opt(2025, 11, 4).unwrap(),
                is_today: false,
                has_on_call: true,
            }),
        ];
        let json = serde_json::to_string(&cells).expect("serialize");
        assert!(json.starts_with("[null,"));
        assert!(json.contains("\"has_on_call\":true"));
    }

    #[test]
    fn on_call_day_item_is_serializable() {
        let item = OnCallDayItem {
            date: NaiveDate::from_ymd_opt(2025, 11, 28).unwrap(),
            pharmacy_count: 2,
            pharmacies: vec![],
        };
        let json = serde_json::to_string(&item).expect("serialize");
        assert!(json.contains("\"date\":\"2025-11-28\""));
        assert!(json.contains("\"pharmacy_count\":2"));
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_not_found_maps_to_404() {
        let response = ApiError::new("req-1", "not_found", "missing").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // -------------------------------------------------------------------------
    // Route integration tests (with DB)
    // -------------------------------------------------------------------------

    /// Insert a minimal pharmacy row and return its public id.
    async fn seed_pharmacy(pool: &sqlx::PgPool, slug: &str, on_call: bool) -> Uuid {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO pharmacies (slug, name, address, phone, latitude, longitude, is_on_call, has_parking, is_pmr) \
             VALUES ($1, $2, $3, '+237 697 345 678', 9.3017, 13.3921, $4, true, false) \
             RETURNING public_id",
        )
        .bind(slug)
        .bind(format!("Pharmacie {slug}"))
        .bind(format!("Avenue {slug}, Garoua"))
        .bind(on_call)
        .fetch_one(pool)
        .await
        .expect("seed_pharmacy failed")
    }

    async fn assign(pool: &sqlx::PgPool, slug: &str, date: &str) {
        sqlx::query(
            "INSERT INTO on_call_assignments (pharmacy_id, on_date) \
             SELECT id, $2::date FROM pharmacies WHERE slug = $1",
        )
        .bind(slug)
        .bind(date)
        .execute(pool)
        .await
        .expect("assign failed");
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        (status, json)
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_pharmacies_returns_filtered_set(pool: sqlx::PgPool) {
        seed_pharmacy(&pool, "espoir", true).await;
        seed_pharmacy(&pool, "centre", false).await;

        let (status, json) = get_json(
            test_app(pool.clone(), None),
            "/api/v1/pharmacies?on_call=true",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["slug"].as_str(), Some("espoir"));

        let (status, json) = get_json(test_app(pool, None), "/api/v1/pharmacies").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().map(Vec::len), Some(2));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_pharmacies_search_matches_name_or_address(pool: sqlx::PgPool) {
        seed_pharmacy(&pool, "espoir", true).await;
        seed_pharmacy(&pool, "nord", false).await;

        let (status, json) = get_json(
            test_app(pool, None),
            "/api/v1/pharmacies?search=ESPOIR",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1, "case-insensitive name match expected");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn get_pharmacy_returns_detail_with_links(pool: sqlx::PgPool) {
        let id = seed_pharmacy(&pool, "espoir", true).await;

        let (status, json) =
            get_json(test_app(pool, None), &format!("/api/v1/pharmacies/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["slug"].as_str(), Some("espoir"));
        assert_eq!(
            json["data"]["dial_link"].as_str(),
            Some("tel:+237697345678")
        );
        assert!(json["data"]["maps_link"]
            .as_str()
            .expect("maps link")
            .starts_with("https://www.google.com/maps/search/"));
        assert_eq!(json["data"]["review_count"].as_i64(), Some(0));
        assert!(json["data"]["average_rating"].is_null());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn get_pharmacy_returns_404_for_unknown_id(pool: sqlx::PgPool) {
        let (status, json) = get_json(
            test_app(pool, None),
            &format!("/api/v1/pharmacies/{}", Uuid::new_v4()),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"].as_str(), Some("not_found"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn create_review_validates_rating_bounds(pool: sqlx::PgPool) {
        let id = seed_pharmacy(&pool, "espoir", true).await;

        let app = test_app(pool.clone(), None);
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(format!("/api/v1/pharmacies/{id}/reviews"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"author": "Isaac Touza", "rating": 6, "comment": "Service à améliorer"}"#,
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let app = test_app(pool.clone(), None);
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(format!("/api/v1/pharmacies/{id}/reviews"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"author": "Isaac Touza", "rating": 4, "comment": "Service à améliorer"}"#,
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let (status, json) = get_json(
            test_app(pool, None),
            &format!("/api/v1/pharmacies/{id}/reviews"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["rating"].as_i64(), Some(4));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn garde_returns_assignments_for_date_only(pool: sqlx::PgPool) {
        seed_pharmacy(&pool, "espoir", true).await;
        seed_pharmacy(&pool, "nord", true).await;
        assign(&pool, "espoir", "2025-11-28").await;

        let (status, json) = get_json(
            test_app(pool.clone(), None),
            "/api/v1/garde?date=2025-11-28",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = &json["data"];
        assert_eq!(data["date"].as_str(), Some("2025-11-28"));
        assert_eq!(data["pharmacies"].as_array().map(Vec::len), Some(1));
        assert_eq!(data["pharmacies"][0]["slug"].as_str(), Some("espoir"));

        // A date with no assignments projects to an empty set, even though
        // both pharmacies carry the static on-call flag.
        let (status, json) = get_json(test_app(pool, None), "/api/v1/garde?date=2025-11-29").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["data"]["pharmacies"].as_array().map(Vec::len),
            Some(0)
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn garde_week_spans_monday_to_sunday(pool: sqlx::PgPool) {
        seed_pharmacy(&pool, "espoir", true).await;
        assign(&pool, "espoir", "2025-11-26").await;

        // Friday the 28th; the week runs from Monday the 24th.
        let (status, json) = get_json(
            test_app(pool, None),
            "/api/v1/garde/week?date=2025-11-28",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let days = json["data"].as_array().expect("data array");
        assert_eq!(days.len(), 7);
        assert_eq!(days[0]["date"].as_str(), Some("2025-11-24"));
        assert_eq!(days[6]["date"].as_str(), Some("2025-11-30"));
        assert_eq!(days[2]["pharmacy_count"].as_i64(), Some(1));
        assert_eq!(days[3]["pharmacy_count"].as_i64(), Some(0));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn garde_calendar_grid_shape_matches_month(pool: sqlx::PgPool) {
        seed_pharmacy(&pool, "espoir", true).await;
        assign(&pool, "espoir", "2025-11-05").await;

        let (status, json) = get_json(
            test_app(pool, None),
            "/api/v1/garde/calendar?date=2025-11-15",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let cells = json["data"]["cells"].as_array().expect("cells");
        // 2025-11-01 is a Saturday: 5 leading blanks + 30 days.
        assert_eq!(cells.len(), 35);
        assert!(cells[0].is_null());
        assert!(cells[4].is_null());
        assert_eq!(cells[5]["date"].as_str(), Some("2025-11-01"));
        let day5 = cells
            .iter()
            .find(|c| c["date"].as_str() == Some("2025-11-05"))
            .expect("day 5 cell");
        assert_eq!(day5["has_on_call"].as_bool(), Some(true));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn map_config_returns_token_or_404(pool: sqlx::PgPool) {
        let (status, json) = get_json(
            test_app(pool.clone(), Some("pk.test-token")),
            "/api/v1/config/map",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["token"].as_str(), Some("pk.test-token"));

        let (status, json) = get_json(test_app(pool, None), "/api/v1/config/map").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"].as_str(), Some("not_found"));
    }
}
