use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::domain::{CompanyId, ScoringPeriod, SnapshotSubmission};
use super::provider::{ComplianceFactProvider, ProviderError, VendorId};
use super::service::{CsrRatingService, CsrServiceError};
use super::views::CsrRatingView;

/// Trailing window used when a request names no period.
const DEFAULT_PERIOD_DAYS: i64 = 90;

/// Router builder exposing the rating endpoints.
pub fn csr_router<P>(service: Arc<CsrRatingService<P>>) -> Router
where
    P: ComplianceFactProvider + 'static,
{
    Router::new()
        .route("/api/v1/csr/score", post(score_handler::<P>))
        .route(
            "/api/v1/companies/:company_id/csr",
            get(company_handler::<P>),
        )
        .route("/api/v1/vendors/:vendor_id/csr", get(vendor_handler::<P>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PeriodQuery {
    #[serde(default)]
    pub(crate) start: Option<String>,
    #[serde(default)]
    pub(crate) end: Option<String>,
}

impl PeriodQuery {
    pub(crate) fn resolve(&self, today: NaiveDate) -> Result<ScoringPeriod, String> {
        let end = match self.end.as_deref() {
            Some(raw) => parse_query_date("end", raw)?,
            None => today,
        };
        let start = match self.start.as_deref() {
            Some(raw) => parse_query_date("start", raw)?,
            None => end
                .checked_sub_signed(Duration::days(DEFAULT_PERIOD_DAYS - 1))
                .ok_or_else(|| format!("no {DEFAULT_PERIOD_DAYS}-day period ends on {end}"))?,
        };
        ScoringPeriod::new(start, end).map_err(|error| error.to_string())
    }
}

fn parse_query_date(field: &str, raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse {field} '{raw}' as YYYY-MM-DD ({err})"))
}

fn bad_period(detail: String) -> Response {
    let payload = json!({ "error": detail });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

pub(crate) fn service_error_response(error: CsrServiceError) -> Response {
    match error {
        CsrServiceError::Snapshot(error) => {
            let payload = json!({
                "error": error.to_string(),
                "kind": error.kind(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        CsrServiceError::Provider(
            error @ (ProviderError::UnknownCompany(_) | ProviderError::UnknownVendor(_)),
        ) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        CsrServiceError::Provider(ProviderError::Unavailable(detail)) => {
            warn!(%detail, "rating unavailable");
            let payload = json!({
                "error": "rating unavailable",
                "detail": detail,
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn score_handler<P>(
    State(service): State<Arc<CsrRatingService<P>>>,
    axum::Json(submission): axum::Json<SnapshotSubmission>,
) -> Response
where
    P: ComplianceFactProvider + 'static,
{
    match service.rate_submission(submission) {
        Ok(result) => {
            let view = CsrRatingView::from_result(&result, None);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn company_handler<P>(
    State(service): State<Arc<CsrRatingService<P>>>,
    Path(company_id): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Response
where
    P: ComplianceFactProvider + 'static,
{
    let period = match query.resolve(Utc::now().date_naive()) {
        Ok(period) => period,
        Err(detail) => return bad_period(detail),
    };

    match service.rate_company(&CompanyId(company_id), &period) {
        Ok(result) => {
            let view = CsrRatingView::from_result(&result, Some(period));
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn vendor_handler<P>(
    State(service): State<Arc<CsrRatingService<P>>>,
    Path(vendor_id): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Response
where
    P: ComplianceFactProvider + 'static,
{
    let period = match query.resolve(Utc::now().date_naive()) {
        Ok(period) => period,
        Err(detail) => return bad_period(detail),
    };

    match service.compare_vendor(&VendorId(vendor_id), &period) {
        Ok(comparison) => (StatusCode::OK, axum::Json(comparison)).into_response(),
        Err(error) => service_error_response(error),
    }
}
