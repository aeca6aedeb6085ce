//! On-call ("garde") calendar endpoints: per-date set, week schedule,
//! month grid.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use gardes_core::calendar::{self, ViewCursor, ViewMode};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::pharmacies::PharmacyListItem;
use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct GardeQuery {
    /// Reference date, `YYYY-MM-DD`; defaults to today.
    date: Option<NaiveDate>,
}

impl GardeQuery {
    fn date_or_today(&self) -> NaiveDate {
        self.date.unwrap_or_else(calendar::today)
    }
}

#[derive(Debug, Serialize)]
pub(super) struct OnCallDayItem {
    pub date: NaiveDate,
    pub pharmacy_count: i64,
    pub pharmacies: Vec<PharmacyListItem>,
}

/// GET /api/v1/garde — pharmacies assigned to on-call duty on one date.
pub(super) async fn list_on_call(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<GardeQuery>,
) -> Result<Json<ApiResponse<OnCallDayItem>>, ApiError> {
    let date = query.date_or_today();
    let rows = gardes_db::list_on_call_for_date(&state.pool, date)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let pharmacies: Vec<PharmacyListItem> =
        rows.into_iter().map(PharmacyListItem::from).collect();
    let data = OnCallDayItem {
        date,
        pharmacy_count: pharmacies.len() as i64,
        pharmacies,
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/garde/week — seven per-day entries starting at the Monday of
/// the week containing the reference date.
pub(super) async fn week_schedule(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<GardeQuery>,
) -> Result<Json<ApiResponse<Vec<OnCallDayItem>>>, ApiError> {
    let start = calendar::start_of_week(query.date_or_today());

    let mut data = Vec::with_capacity(7);
    for date in calendar::week_days(start) {
        let rows = gardes_db::list_on_call_for_date(&state.pool, date)
            .await
            .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
        let pharmacies: Vec<PharmacyListItem> =
            rows.into_iter().map(PharmacyListItem::from).collect();
        data.push(OnCallDayItem {
            date,
            pharmacy_count: pharmacies.len() as i64,
            pharmacies,
        });
    }

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct CalendarCellItem {
    pub date: NaiveDate,
    pub is_today: bool,
    pub has_on_call: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct MonthCalendarData {
    /// First day of the rendered month.
    pub first: NaiveDate,
    /// 7-column grid; `null` entries are the leading blanks that align day 1
    /// under its weekday column (week starts Monday).
    pub cells: Vec<Option<CalendarCellItem>>,
}

/// GET /api/v1/garde/calendar — month grid for the month containing the
/// reference date, with per-day on-call markers.
pub(super) async fn month_calendar(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<GardeQuery>,
) -> Result<Json<ApiResponse<MonthCalendarData>>, ApiError> {
    let reference = query.date_or_today();
    let (from, to) = ViewCursor::new(reference, ViewMode::Month).range();

    let covered = gardes_db::list_on_call_dates_in_range(&state.pool, from, to)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let on_call_dates = covered.into_iter().collect();

    let grid = calendar::month_grid(reference, calendar::today(), &on_call_dates);
    let cells = grid
        .cells
        .into_iter()
        .map(|cell| {
            cell.map(|c| CalendarCellItem {
                date: c.date,
                is_today: c.is_today,
                has_on_call: c.has_on_call,
            })
        })
        .collect();

    Ok(Json(ApiResponse {
        data: MonthCalendarData {
            first: grid.first,
            cells,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
