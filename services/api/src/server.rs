use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_leaderboard_routes;
use axum::extract::DefaultBodyLimit;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use wikijury::config::AppConfig;
use wikijury::error::AppError;
use wikijury::leaderboard::router::LeaderboardDefaults;
use wikijury::telemetry;

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

    let defaults = LeaderboardDefaults {
        include_time_bonus: config.scoring.include_time_bonus,
    };
    let app = with_leaderboard_routes(defaults)
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_upload_bytes = config.server.max_upload_bytes,
        time_bonus = config.scoring.include_time_bonus,
        "wikijury leaderboard service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
