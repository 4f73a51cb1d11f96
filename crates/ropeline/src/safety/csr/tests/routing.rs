use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;

use crate::safety::csr::csr_router;
use crate::safety::csr::router::{score_handler, PeriodQuery};

fn company_uri(company: &str) -> String {
    format!(
        "/api/v1/companies/{company}/csr?start={}&end={}",
        period().start(),
        period().end()
    )
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn score_handler_rejects_missing_snapshot_data() {
    let service = build_service(MemoryProvider::default());
    let mut submission = clean_submission("summit");
    submission.acknowledgable_documents = None;

    let response = score_handler::<MemoryProvider>(State(service), axum::Json(submission)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "missing_snapshot_data");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("acknowledgable_documents"));
}

#[tokio::test]
async fn score_route_returns_rating_view() {
    let router = csr_router(build_service(MemoryProvider::default()));

    let response = router
        .oneshot(
            Request::post("/api/v1/csr/score")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&clean_submission("summit")).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["company_id"], "summit");
    assert_eq!(body["overall_score"], 100.0);
    assert_eq!(body["band"], "excellent");
    assert_eq!(body["color"], "green");
    assert_eq!(body["categories"].as_array().unwrap().len(), 5);
    assert!(body.get("improvement_prompts").is_none());
}

#[tokio::test]
async fn score_route_flags_invariant_violations() {
    let router = csr_router(build_service(MemoryProvider::default()));
    let mut submission = clean_submission("summit");
    submission.acknowledgable_documents = Some(acknowledgments(2, [3, 0, 0, 0]));

    let response = router
        .oneshot(
            Request::post("/api/v1/csr/score")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&submission).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "invariant_violation");
}

#[tokio::test]
async fn company_route_scores_requested_period() {
    let mut submission = clean_submission("harbour");
    submission.required_documents = Some(documents([true, true, false]));
    let router = csr_router(build_service(
        MemoryProvider::default().with_company(submission),
    ));

    let response = router.oneshot(get(&company_uri("harbour"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["overall_score"], 91.67);
    assert_eq!(body["band"], "excellent");
    assert_eq!(body["period"]["start"], "2025-03-03");
    let prompts = body["improvement_prompts"].as_array().unwrap();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0]["category"], "documentation");
}

#[tokio::test]
async fn company_route_reports_unknown_company() {
    let router = csr_router(build_service(MemoryProvider::default()));

    let response = router.oneshot(get(&company_uri("ghost"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn company_route_reports_unavailable_rating() {
    let router = csr_router(build_service(MemoryProvider::offline()));

    let response = router.oneshot(get(&company_uri("summit"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "rating unavailable");
    assert!(body.get("overall_score").is_none());
}

#[tokio::test]
async fn company_route_rejects_malformed_period() {
    let router = csr_router(build_service(
        MemoryProvider::default().with_company(clean_submission("summit")),
    ));

    let response = router
        .clone()
        .oneshot(get("/api/v1/companies/summit/csr?start=03-03-2025"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = router
        .oneshot(get(
            "/api/v1/companies/summit/csr?start=2025-04-01&end=2025-03-01",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn default_period_that_would_leave_the_calendar_is_rejected() {
    let provider = MemoryProvider::default()
        .with_company(clean_submission("summit"))
        .with_vendor("skyline-group", &["summit"]);
    let router = csr_router(build_service(provider));

    for uri in [
        "/api/v1/companies/summit/csr?end=-262143-01-05",
        "/api/v1/vendors/skyline-group/csr?end=-262143-01-05",
    ] {
        let response = router.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body = read_json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("-262143-01-05"));
    }
}

#[tokio::test]
async fn vendor_route_rolls_up_companies() {
    let mut lagging = clean_submission("harbour");
    lagging.toolbox_meetings = Some(Vec::new());
    let provider = MemoryProvider::default()
        .with_company(clean_submission("summit"))
        .with_company(lagging)
        .with_vendor("skyline-group", &["summit", "harbour"]);
    let router = csr_router(build_service(provider));

    let response = router
        .oneshot(get(&format!(
            "/api/v1/vendors/skyline-group/csr?start={}&end={}",
            period().start(),
            period().end()
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["company_count"], 2);
    assert_eq!(body["average_score"], 87.5);
    assert_eq!(body["band"], "good");
    let companies: Vec<&Value> = body["companies"].as_array().unwrap().iter().collect();
    assert_eq!(companies[0]["company_id"], "summit");
    assert_eq!(companies[1]["overall_score"], 75.0);
}

#[tokio::test]
async fn vendor_route_reports_unknown_vendor() {
    let router = csr_router(build_service(MemoryProvider::default()));

    let response = router
        .oneshot(get("/api/v1/vendors/nobody/csr"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn period_query_defaults_to_trailing_ninety_days() {
    let today = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
    let period = PeriodQuery::default().resolve(today).expect("default period");

    assert_eq!(period.end(), today);
    assert_eq!(period.start(), NaiveDate::from_ymd_opt(2025, 4, 2).unwrap());

    let query = PeriodQuery {
        start: Some("2025-06-01".to_string()),
        end: None,
    };
    let period = query.resolve(today).expect("explicit start");
    assert_eq!(period.start(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
}

#[test]
fn period_query_reports_underflowing_default_start() {
    let query = PeriodQuery {
        start: None,
        end: Some("-262143-01-05".to_string()),
    };

    let error = query
        .resolve(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap())
        .expect_err("start before the calendar");
    assert!(error.contains("90-day"));
}
