use crate::cli::ServeArgs;
use crate::infra::{seed_demo_store, AppState, InMemoryComplianceStore};
use crate::routes::with_csr_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use ropeline::config::{AppConfig, AppEnvironment};
use ropeline::error::AppError;
use ropeline::safety::csr::{CsrEngine, CsrRatingService, CsrServiceError, RatingCache};
use ropeline::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let policy = config.rating.scoring_policy();
    let store = Arc::new(InMemoryComplianceStore::new(
        policy.toolbox_rule().reach_days(),
    ));
    if config.environment != AppEnvironment::Production || args.seed_demo {
        seed_demo_store(&store, Utc::now().date_naive()).map_err(CsrServiceError::from)?;
        info!("seeded in-memory compliance store with demo companies");
    }

    let cache = RatingCache::new(config.rating.cache_ttl, config.rating.cache_max_entries);
    let rating_service = Arc::new(CsrRatingService::new(
        store,
        CsrEngine::new(policy),
        cache,
    ));

    let app = with_csr_routes(rating_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        toolbox_window_days = policy.toolbox_window_days(),
        cache_entries = config.rating.cache_max_entries,
        "company safety rating service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
